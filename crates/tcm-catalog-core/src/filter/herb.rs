//! Herb filter criteria.

use serde::{Deserialize, Serialize};

use super::criterion;
use crate::models::{contains_lower, Herb};

/// Herb search criteria. `None` or an empty string leaves a field unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HerbFilters {
    /// Case-insensitive substring over name, pinyin, English name,
    /// functions and indications
    pub search_term: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Exact nature
    pub nature: Option<String>,
    /// Exact element of the taste list
    pub taste: Option<String>,
    /// Exact element of the meridian list
    pub meridian: Option<String>,
    /// Exact element of the origin list
    pub origin: Option<String>,
    /// Case-insensitive substring over chemical component names
    pub chemical_component: Option<String>,
    /// Case-insensitive substring over pharmacological action names
    pub pharmacological_action: Option<String>,
    /// Exact pharmacopoeia grade
    pub quality_grade: Option<String>,
}

impl HerbFilters {
    /// True when no criterion is populated.
    pub fn is_empty(&self) -> bool {
        self.search_term
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
            && [
                &self.category,
                &self.nature,
                &self.taste,
                &self.meridian,
                &self.origin,
                &self.chemical_component,
                &self.pharmacological_action,
                &self.quality_grade,
            ]
            .iter()
            .all(|c| criterion(c).is_none())
    }

    /// Check a single herb against every populated criterion.
    pub fn matches(&self, herb: &Herb) -> bool {
        if let Some(term) = self.search_term.as_deref() {
            if !term.trim().is_empty() && !herb.matches_text(&term.to_lowercase()) {
                return false;
            }
        }

        if let Some(category) = criterion(&self.category) {
            if herb.category != category {
                return false;
            }
        }

        if let Some(nature) = criterion(&self.nature) {
            if herb.nature != nature {
                return false;
            }
        }

        if let Some(taste) = criterion(&self.taste) {
            if !herb.has_taste(taste) {
                return false;
            }
        }

        if let Some(meridian) = criterion(&self.meridian) {
            if !herb.has_meridian(meridian) {
                return false;
            }
        }

        if let Some(origin) = criterion(&self.origin) {
            if !herb.is_from(origin) {
                return false;
            }
        }

        if let Some(component) = criterion(&self.chemical_component) {
            let needle = component.to_lowercase();
            if !herb
                .chemical_components
                .iter()
                .any(|c| contains_lower(&c.name, &needle))
            {
                return false;
            }
        }

        if let Some(action) = criterion(&self.pharmacological_action) {
            let needle = action.to_lowercase();
            if !herb
                .pharmacological_actions
                .iter()
                .any(|a| contains_lower(&a.action, &needle))
            {
                return false;
            }
        }

        if let Some(grade) = criterion(&self.quality_grade) {
            if herb.quality_grade() != Some(grade) {
                return false;
            }
        }

        true
    }
}

/// Return the herbs matching `filters`, in collection order.
pub fn filter_herbs(herbs: &[Herb], filters: &HerbFilters) -> Vec<Herb> {
    herbs.iter().filter(|h| filters.matches(h)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChemicalComponent, PharmacopoeiaInfo};

    fn herb(id: &str, name: &str, nature: &str, taste: &[&str]) -> Herb {
        let mut h = Herb::new(id, name);
        h.nature = nature.into();
        h.taste = taste.iter().map(|t| t.to_string()).collect();
        h
    }

    fn sample() -> Vec<Herb> {
        vec![
            herb("h1", "Ginseng", "warm", &["sweet"]),
            herb("h2", "Licorice", "neutral", &["sweet"]),
        ]
    }

    fn ids(herbs: &[Herb]) -> Vec<&str> {
        herbs.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_taste_filter_keeps_both() {
        let filters = HerbFilters {
            taste: Some("sweet".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_herbs(&sample(), &filters)), vec!["h1", "h2"]);
    }

    #[test]
    fn test_nature_filter() {
        let filters = HerbFilters {
            nature: Some("warm".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_herbs(&sample(), &filters)), vec!["h1"]);
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let filters = HerbFilters {
            category: Some(String::new()),
            search_term: Some("   ".into()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert_eq!(filter_herbs(&sample(), &filters).len(), 2);
    }

    #[test]
    fn test_search_term_case_insensitive() {
        let mut herbs = sample();
        herbs[1].indications = vec!["Cough with phlegm".into()];

        let filters = HerbFilters {
            search_term: Some("COUGH".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_herbs(&herbs, &filters)), vec!["h2"]);
    }

    #[test]
    fn test_missing_lists_never_match_membership() {
        let herbs = vec![Herb::new("h1", "Bare")];
        for filters in [
            HerbFilters {
                meridian: Some("脾".into()),
                ..Default::default()
            },
            HerbFilters {
                origin: Some("吉林".into()),
                ..Default::default()
            },
            HerbFilters {
                chemical_component: Some("皂苷".into()),
                ..Default::default()
            },
            HerbFilters {
                quality_grade: Some("premium".into()),
                ..Default::default()
            },
        ] {
            assert!(filter_herbs(&herbs, &filters).is_empty());
        }
    }

    #[test]
    fn test_extended_criteria() {
        let mut h = Herb::new("h1", "人参");
        h.chemical_components = vec![ChemicalComponent {
            name: "人参皂苷Rg1".into(),
            ..Default::default()
        }];
        h.pharmacopoeia_info = Some(PharmacopoeiaInfo {
            grade: "premium".into(),
            ..Default::default()
        });
        let herbs = vec![h, Herb::new("h2", "甘草")];

        let filters = HerbFilters {
            chemical_component: Some("rg1".into()),
            quality_grade: Some("premium".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_herbs(&herbs, &filters)), vec!["h1"]);
    }

    #[test]
    fn test_criteria_are_anded() {
        let filters = HerbFilters {
            taste: Some("sweet".into()),
            nature: Some("neutral".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_herbs(&sample(), &filters)), vec!["h2"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let herbs = sample();
        let before = herbs.clone();
        let _ = filter_herbs(
            &herbs,
            &HerbFilters {
                nature: Some("warm".into()),
                ..Default::default()
            },
        );
        assert_eq!(herbs, before);
    }
}
