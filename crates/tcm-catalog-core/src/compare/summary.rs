//! Derived views over a comparison selection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{Expert, Herb};

/// Birth years closer than this are reported as the same era.
const SAME_ERA_SPAN: i32 = 20;

/// Push each value once, keeping first-seen order.
fn push_unique<'a>(seen: &mut HashSet<&'a str>, out: &mut Vec<String>, value: &'a str) {
    if seen.insert(value) {
        out.push(value.to_string());
    }
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        push_unique(&mut seen, &mut out, v);
    }
    out
}

/// Union of the properties of the compared herbs.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HerbComparison {
    pub categories: Vec<String>,
    pub natures: Vec<String>,
    pub tastes: Vec<String>,
    pub origins: Vec<String>,
    pub meridians: Vec<String>,
    pub functions: Vec<String>,
    pub indications: Vec<String>,
}

impl HerbComparison {
    pub fn from_herbs(herbs: &[Herb]) -> Self {
        Self {
            categories: distinct(herbs.iter().map(|h| h.category.as_str())),
            natures: distinct(herbs.iter().map(|h| h.nature.as_str())),
            tastes: distinct(herbs.iter().flat_map(|h| h.taste.iter().map(String::as_str))),
            origins: distinct(herbs.iter().flat_map(|h| h.origin.iter().map(String::as_str))),
            meridians: distinct(
                herbs
                    .iter()
                    .flat_map(|h| h.meridians.iter().map(String::as_str)),
            ),
            functions: distinct(
                herbs
                    .iter()
                    .flat_map(|h| h.functions.iter().map(String::as_str)),
            ),
            indications: distinct(
                herbs
                    .iter()
                    .flat_map(|h| h.indications.iter().map(String::as_str)),
            ),
        }
    }
}

/// Names of the compared herbs that list `function`.
pub fn herbs_with_function<'a>(herbs: &'a [Herb], function: &str) -> Vec<&'a str> {
    herbs
        .iter()
        .filter(|h| h.functions.iter().any(|f| f == function))
        .map(|h| h.name.as_str())
        .collect()
}

/// A single observation about a group of compared experts.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpertFinding {
    /// Every expert with a school belongs to this one
    SharedSchool { school: String },
    /// Specialties listed by more than one expert
    CommonSpecialties { specialties: Vec<String> },
    /// Birth years span less than twenty years
    SameEra { earliest: i32, latest: i32 },
    /// More than one national master in the group
    MultipleNationalMasters { count: usize },
    DistinctSchools { schools: Vec<String> },
    DistinctOrigins { origins: Vec<String> },
    ExperienceSpan { min: u32, max: u32, average: f64 },
    DistinctPrimarySpecialties { specialties: Vec<String> },
}

/// Aggregate analysis of two or more compared experts.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ExpertComparison {
    pub similarities: Vec<ExpertFinding>,
    pub differences: Vec<ExpertFinding>,
    pub national_masters: usize,
    pub total_books: usize,
    pub total_innovations: usize,
    pub total_classic_cases: usize,
    pub total_disciples: usize,
}

impl ExpertComparison {
    /// Analyse the selection. Returns `None` for fewer than two experts.
    pub fn from_experts(experts: &[Expert]) -> Option<Self> {
        if experts.len() < 2 {
            return None;
        }

        let mut similarities = Vec::new();
        let mut differences = Vec::new();

        let schools: Vec<&str> = experts
            .iter()
            .map(|e| e.school.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        let unique_schools = distinct(schools.iter().copied());
        if unique_schools.len() == 1 && schools.len() > 1 {
            similarities.push(ExpertFinding::SharedSchool {
                school: unique_schools[0].clone(),
            });
        }

        let mut specialty_counts: HashMap<&str, usize> = HashMap::new();
        let mut specialty_order = Vec::new();
        for s in experts.iter().flat_map(|e| e.specialty.iter()) {
            let count = specialty_counts.entry(s.as_str()).or_insert(0);
            if *count == 0 {
                specialty_order.push(s.as_str());
            }
            *count += 1;
        }
        let common: Vec<String> = specialty_order
            .into_iter()
            .filter(|s| specialty_counts.get(s).copied().unwrap_or(0) > 1)
            .map(str::to_string)
            .collect();
        if !common.is_empty() {
            similarities.push(ExpertFinding::CommonSpecialties {
                specialties: common,
            });
        }

        let birth_years: Vec<i32> = experts.iter().filter_map(|e| e.birth_year).collect();
        if birth_years.len() > 1 {
            let earliest = birth_years.iter().copied().min().unwrap_or_default();
            let latest = birth_years.iter().copied().max().unwrap_or_default();
            if latest - earliest < SAME_ERA_SPAN {
                similarities.push(ExpertFinding::SameEra { earliest, latest });
            }
        }

        let national_masters = experts.iter().filter(|e| e.is_national_master()).count();
        if national_masters > 1 {
            similarities.push(ExpertFinding::MultipleNationalMasters {
                count: national_masters,
            });
        }

        if unique_schools.len() > 1 {
            differences.push(ExpertFinding::DistinctSchools {
                schools: unique_schools,
            });
        }

        let origins = distinct(
            experts
                .iter()
                .map(|e| e.place_of_origin.as_str())
                .filter(|o| !o.is_empty()),
        );
        if origins.len() > 1 {
            differences.push(ExpertFinding::DistinctOrigins { origins });
        }

        let experience: Vec<u32> = experts
            .iter()
            .map(|e| e.experience)
            .filter(|&y| y > 0)
            .collect();
        if experience.len() > 1 {
            let min = experience.iter().copied().min().unwrap_or_default();
            let max = experience.iter().copied().max().unwrap_or_default();
            let sum: u64 = experience.iter().map(|&y| u64::from(y)).sum();
            differences.push(ExpertFinding::ExperienceSpan {
                min,
                max,
                average: sum as f64 / experience.len() as f64,
            });
        }

        let primary = distinct(experts.iter().filter_map(|e| e.primary_specialty()));
        if primary.len() > 1 {
            differences.push(ExpertFinding::DistinctPrimarySpecialties {
                specialties: primary,
            });
        }

        Some(Self {
            similarities,
            differences,
            national_masters,
            total_books: experts.iter().map(|e| e.books.len()).sum(),
            total_innovations: experts.iter().map(|e| e.academic_innovations.len()).sum(),
            total_classic_cases: experts.iter().map(|e| e.classic_cases.len()).sum(),
            total_disciples: experts.iter().map(|e| e.disciples.len()).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    #[test]
    fn test_herb_union_keeps_first_seen_order() {
        let mut a = Herb::new("h1", "人参");
        a.taste = vec!["甘".into(), "微苦".into()];
        a.functions = vec!["大补元气".into(), "补脾益肺".into()];
        let mut b = Herb::new("h2", "甘草");
        b.taste = vec!["甘".into()];
        b.functions = vec!["补脾益气".into(), "补脾益肺".into()];

        let herbs = vec![a, b];
        let summary = HerbComparison::from_herbs(&herbs);
        assert_eq!(summary.tastes, vec!["甘", "微苦"]);
        assert_eq!(summary.functions, vec!["大补元气", "补脾益肺", "补脾益气"]);
        assert!(summary.origins.is_empty());
        assert_eq!(herbs_with_function(&herbs, "补脾益肺"), vec!["人参", "甘草"]);
    }

    #[test]
    fn test_expert_comparison_needs_two() {
        assert!(ExpertComparison::from_experts(&[Expert::new("e1", "A")]).is_none());
    }

    #[test]
    fn test_expert_findings() {
        let mut a = Expert::new("e1", "A");
        a.school = "伤寒派".into();
        a.specialty = vec!["内科".into(), "妇科".into()];
        a.birth_year = Some(1916);
        a.academic_title = "国医大师".into();
        a.place_of_origin = "广东".into();
        a.experience = 70;
        a.books = vec![Book::default(), Book::default()];

        let mut b = Expert::new("e2", "B");
        b.school = "伤寒派".into();
        b.specialty = vec!["内科".into()];
        b.birth_year = Some(1920);
        b.academic_title = "国医大师、教授".into();
        b.place_of_origin = "河北".into();
        b.experience = 50;

        let result = ExpertComparison::from_experts(&[a, b]).unwrap();
        assert!(result.similarities.contains(&ExpertFinding::SharedSchool {
            school: "伤寒派".into()
        }));
        assert!(result
            .similarities
            .contains(&ExpertFinding::CommonSpecialties {
                specialties: vec!["内科".into()]
            }));
        assert!(result.similarities.contains(&ExpertFinding::SameEra {
            earliest: 1916,
            latest: 1920
        }));
        assert_eq!(result.national_masters, 2);
        assert!(result.differences.contains(&ExpertFinding::ExperienceSpan {
            min: 50,
            max: 70,
            average: 60.0
        }));
        assert_eq!(result.total_books, 2);
        // Same primary specialty, so no divergence reported
        assert!(!result
            .differences
            .iter()
            .any(|f| matches!(f, ExpertFinding::DistinctPrimarySpecialties { .. })));
    }

    #[test]
    fn test_experience_average_handles_large_values() {
        let experts: Vec<Expert> = (0..3)
            .map(|i| {
                let mut e = Expert::new(format!("e{i}"), "X");
                e.experience = u32::MAX;
                e
            })
            .collect();
        let result = ExpertComparison::from_experts(&experts).unwrap();
        assert!(result.differences.contains(&ExpertFinding::ExperienceSpan {
            min: u32::MAX,
            max: u32::MAX,
            average: f64::from(u32::MAX)
        }));
    }
}
