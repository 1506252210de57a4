//! Expert filter criteria.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{criterion, FilterError};
use crate::models::{contains_lower, Expert, InfluenceMetrics};

/// Inclusive range of practice years, `min-max` or open-ended `min`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperienceRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl ExperienceRange {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, years: u32) -> bool {
        years >= self.min && self.max.map_or(true, |max| years <= max)
    }
}

impl FromStr for ExperienceRange {
    type Err = FilterError;

    /// Accepts `"41-60"`, `"60-"` and `"60"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FilterError::InvalidExperienceRange(s.to_string());
        let text = s.trim();

        let (min_text, max_text) = match text.split_once('-') {
            Some((min, max)) => (min.trim(), Some(max.trim())),
            None => (text, None),
        };

        let min = min_text.parse::<u32>().map_err(|_| invalid())?;
        let max = match max_text {
            None | Some("") => None,
            Some(max) => Some(max.parse::<u32>().map_err(|_| invalid())?),
        };

        if max.is_some_and(|max| max < min) {
            return Err(invalid());
        }

        Ok(Self { min, max })
    }
}

impl fmt::Display for ExperienceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}", self.min),
        }
    }
}

/// Composite influence: `(0.4 * citations + 0.3 * students + 0.3 * awards) / 100`.
pub fn influence_score(metrics: &InfluenceMetrics) -> f64 {
    metrics.composite_score()
}

/// Expert search criteria. `None` or an empty string leaves a field unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpertFilters {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
    /// Exact element of `specialty` or `specializations`
    pub specialty: Option<String>,
    /// Substring of place of origin or any region's province, or an exact influence area
    pub region: Option<String>,
    /// Case-insensitive substring of the mentor's name
    pub mentor: Option<String>,
    /// Case-insensitive substring of the lineage name or academic lineage
    pub lineage: Option<String>,
    /// Substring of the lineage inheritance method, or exact inheritance type
    pub inheritance_type: Option<String>,
    pub specialized_disease: Option<String>,
    pub clinical_strength: Option<String>,
    pub theoretical_contribution: Option<String>,
    pub experience_range: Option<ExperienceRange>,
    /// Minimum composite influence score
    pub influence_level: Option<f64>,
    /// Minimum overall reputation rating
    pub reputation_level: Option<f64>,
}

impl ExpertFilters {
    pub fn is_empty(&self) -> bool {
        self.search_term
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
            && [
                &self.category,
                &self.school,
                &self.grade,
                &self.specialty,
                &self.region,
                &self.mentor,
                &self.lineage,
                &self.inheritance_type,
                &self.specialized_disease,
                &self.clinical_strength,
                &self.theoretical_contribution,
            ]
            .iter()
            .all(|c| criterion(c).is_none())
            && self.experience_range.is_none()
            && self.influence_level.is_none()
            && self.reputation_level.is_none()
    }

    /// Check a single expert against every populated criterion.
    pub fn matches(&self, expert: &Expert) -> bool {
        if let Some(term) = self.search_term.as_deref() {
            if !term.trim().is_empty() && !expert.matches_text(&term.to_lowercase()) {
                return false;
            }
        }

        if let Some(category) = criterion(&self.category) {
            if expert.category != category {
                return false;
            }
        }

        if let Some(school) = criterion(&self.school) {
            if expert.school != school {
                return false;
            }
        }

        if let Some(grade) = criterion(&self.grade) {
            if expert.grade != grade {
                return false;
            }
        }

        if let Some(specialty) = criterion(&self.specialty) {
            let listed = expert.specialty.iter().any(|s| s == specialty)
                || expert.specializations.iter().any(|s| s == specialty);
            if !listed {
                return false;
            }
        }

        if let Some(region) = criterion(&self.region) {
            let matched = expert.place_of_origin.contains(region)
                || expert.regions.iter().any(|r| r.province.contains(region))
                || expert.influence_areas.iter().any(|a| a == region);
            if !matched {
                return false;
            }
        }

        if let Some(mentor) = criterion(&self.mentor) {
            let needle = mentor.to_lowercase();
            let matched = expert
                .mentor_name()
                .is_some_and(|m| contains_lower(m, &needle))
                || expert
                    .mentor
                    .as_deref()
                    .is_some_and(|m| contains_lower(m, &needle));
            if !matched {
                return false;
            }
        }

        if let Some(lineage) = criterion(&self.lineage) {
            let needle = lineage.to_lowercase();
            let matched = expert
                .lineage
                .as_ref()
                .is_some_and(|l| contains_lower(&l.lineage_name, &needle))
                || expert
                    .academic_lineage
                    .as_deref()
                    .is_some_and(|l| contains_lower(l, &needle));
            if !matched {
                return false;
            }
        }

        if let Some(kind) = criterion(&self.inheritance_type) {
            let matched = expert
                .lineage
                .as_ref()
                .is_some_and(|l| l.inheritance_method.contains(kind))
                || expert
                    .inheritance_info
                    .as_ref()
                    .is_some_and(|i| i.inheritance_type == kind);
            if !matched {
                return false;
            }
        }

        if let Some(disease) = criterion(&self.specialized_disease) {
            let needle = disease.to_lowercase();
            if !expert
                .specialized_diseases
                .iter()
                .any(|d| contains_lower(d, &needle))
            {
                return false;
            }
        }

        if let Some(strength) = criterion(&self.clinical_strength) {
            let needle = strength.to_lowercase();
            if !expert
                .clinical_strengths
                .iter()
                .any(|s| contains_lower(s, &needle))
            {
                return false;
            }
        }

        if let Some(contribution) = criterion(&self.theoretical_contribution) {
            let needle = contribution.to_lowercase();
            if !expert
                .theoretical_contributions
                .iter()
                .any(|c| contains_lower(c, &needle))
            {
                return false;
            }
        }

        if let Some(range) = &self.experience_range {
            if !range.contains(expert.experience) {
                return false;
            }
        }

        if let Some(level) = self.influence_level {
            // Experts without influence metrics never meet a threshold
            let passes = expert
                .influence
                .as_ref()
                .is_some_and(|i| influence_score(i) >= level);
            if !passes {
                return false;
            }
        }

        if let Some(level) = self.reputation_level {
            if !expert.overall_rating().is_some_and(|r| r >= level) {
                return false;
            }
        }

        true
    }
}

/// Return the experts matching `filters`, in collection order.
pub fn filter_experts(experts: &[Expert], filters: &ExpertFilters) -> Vec<Expert> {
    experts
        .iter()
        .filter(|e| filters.matches(e))
        .cloned()
        .collect()
}
