//! Expert (practitioner) models.

use serde::{Deserialize, Serialize};

use super::{contains_lower, lenient_string, null_as_default};

/// Title marker identifying a national master (国医大师).
pub const NATIONAL_MASTER_TITLE: &str = "国医大师";

/// A practitioner record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    /// Unique identifier (e.g., "expert_1")
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinyin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub english_name: Option<String>,

    /// Expert category (国医大师, 全国名中医, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Medical school affiliation (伤寒派, 温病派, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specialty: Vec<String>,
    /// Expert grade (国家级, 省部级, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub grade: String,

    #[serde(default, rename = "academic_title", deserialize_with = "null_as_default")]
    pub academic_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default, rename = "place_of_origin", deserialize_with = "null_as_default")]
    pub place_of_origin: String,
    /// Years of practice; missing means 0
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: u32,

    #[serde(default)]
    pub lineage: Option<Lineage>,
    #[serde(default)]
    pub mentor: Option<String>,
    #[serde(default)]
    pub academic_lineage: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub specializations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unique_therapies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clinical_strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theoretical_contributions: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<ExpertRegion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub influence_areas: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub books: Vec<Book>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub papers: Vec<Paper>,

    #[serde(default, alias = "specialized_diseases", deserialize_with = "null_as_default")]
    pub specialized_diseases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clinical_cases: Vec<ClinicalCase>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classic_cases: Vec<ClassicCase>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub academic_innovations: Vec<AcademicInnovation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disciples: Vec<Disciple>,

    #[serde(default)]
    pub inheritance_info: Option<InheritanceInfo>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub related_herbs: Vec<RelatedHerb>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_experts: Vec<RelatedExpert>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_formulas: Vec<RelatedFormula>,

    #[serde(default)]
    pub reputation: Option<ExpertReputation>,
    #[serde(default)]
    pub influence: Option<InfluenceMetrics>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub biography: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_image: String,
}

/// Mentor-based or familial transmission record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Lineage {
    pub mentor_name: Option<String>,
    pub mentor_school: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub lineage_generation: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub lineage_name: String,
    pub learning_period: Option<String>,
    /// 师承, 家传, 自学, ...
    #[serde(deserialize_with = "null_as_default")]
    pub inheritance_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub certification_status: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpertRegion {
    #[serde(deserialize_with = "null_as_default")]
    pub province: String,
    pub city: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    /// high | medium | low
    #[serde(deserialize_with = "null_as_default")]
    pub influence: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contributions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub institutions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Book {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    pub publisher: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Paper {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub journal: String,
    pub year: Option<i32>,
    pub citations: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicalCase {
    #[serde(deserialize_with = "null_as_default")]
    pub disease_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub patient_profile: String,
    #[serde(deserialize_with = "null_as_default")]
    pub diagnosis: String,
    #[serde(deserialize_with = "null_as_default")]
    pub treatment: String,
    pub formula: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub outcome: String,
    #[serde(deserialize_with = "null_as_default")]
    pub significance: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassicCase {
    #[serde(deserialize_with = "null_as_default")]
    pub case_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chief_complaint: String,
    #[serde(deserialize_with = "null_as_default")]
    pub diagnosis: String,
    #[serde(deserialize_with = "null_as_default")]
    pub prescription: String,
    #[serde(deserialize_with = "null_as_default")]
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AcademicInnovation {
    #[serde(deserialize_with = "null_as_default")]
    pub innovation_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub clinical_application: String,
    #[serde(deserialize_with = "null_as_default")]
    pub academic_impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Disciple {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub specialty: String,
    #[serde(deserialize_with = "null_as_default")]
    pub achievement: String,
}

/// Inheritance (传承) bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InheritanceInfo {
    /// family | mentorship | institutional | academic
    #[serde(deserialize_with = "null_as_default")]
    pub inheritance_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_students: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub active_inheritors: u32,
    /// active | completed | ongoing
    #[serde(deserialize_with = "null_as_default")]
    pub inheritance_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub inheritance_materials: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub inheritance_programs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RelatedHerb {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relationship: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RelatedExpert {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relationship: String,
    pub collaboration: Option<String>,
}

/// A link from an expert to a formula, with a free-text relationship label
/// such as "创制者" or "研究方向".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RelatedFormula {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relationship: String,
    pub category: Option<String>,
    /// Effectiveness score (1-10)
    pub effectiveness: Option<f64>,
}

/// Reputation scores, each on a 1-10 scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpertReputation {
    #[serde(deserialize_with = "null_as_default")]
    pub national_recognition: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub academic_influence: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub clinical_reputation: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub public_recognition: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_rating: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InfluenceMetrics {
    #[serde(deserialize_with = "null_as_default")]
    pub citation_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub student_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub media_appearances: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub award_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub consultation_cases: u32,
}

impl InfluenceMetrics {
    /// Weighted composite: `(0.4 * citations + 0.3 * students + 0.3 * awards) / 100`.
    pub fn composite_score(&self) -> f64 {
        (f64::from(self.citation_count) * 0.4
            + f64::from(self.student_count) * 0.3
            + f64::from(self.award_count) * 0.3)
            / 100.0
    }
}

impl Expert {
    /// Create a new expert with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Free-text match over names, specialties, diseases and contributions.
    ///
    /// `term_lower` must already be lowercase.
    pub fn matches_text(&self, term_lower: &str) -> bool {
        let any = |items: &[String]| items.iter().any(|s| contains_lower(s, term_lower));

        contains_lower(&self.name, term_lower)
            || contains_lower(&self.pinyin, term_lower)
            || self
                .english_name
                .as_deref()
                .is_some_and(|n| contains_lower(n, term_lower))
            || any(&self.specialty)
            || any(&self.specializations)
            || any(&self.specialized_diseases)
            || any(&self.theoretical_contributions)
    }

    /// Overall reputation rating, if present.
    pub fn overall_rating(&self) -> Option<f64> {
        self.reputation.as_ref().map(|r| r.overall_rating)
    }

    pub fn is_national_master(&self) -> bool {
        self.academic_title.contains(NATIONAL_MASTER_TITLE)
    }

    pub fn mentor_name(&self) -> Option<&str> {
        self.lineage.as_ref().and_then(|l| l.mentor_name.as_deref())
    }

    /// First specialty, falling back to the first specialization.
    pub fn primary_specialty(&self) -> Option<&str> {
        self.specialty
            .first()
            .or_else(|| self.specializations.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_nulls_default() {
        let json = r#"{
            "id": "e2",
            "name": "路志正",
            "specializations": null,
            "experience": null,
            "regions": [{"province": "北京", "contributions": null}],
            "reputation": {"overallRating": null, "clinicalReputation": 9.0},
            "relatedFormulas": null
        }"#;
        let expert: Expert = serde_json::from_str(json).unwrap();
        assert!(expert.specializations.is_empty());
        assert_eq!(expert.experience, 0);
        assert!(expert.regions[0].contributions.is_empty());
        assert_eq!(expert.overall_rating(), Some(0.0));
        assert!(expert.related_formulas.is_empty());
    }

    #[test]
    fn test_minimal_expert() {
        let expert: Expert = serde_json::from_str(r#"{"id": "e1", "name": "邓铁涛"}"#).unwrap();
        assert_eq!(expert.experience, 0);
        assert!(expert.lineage.is_none());
        assert!(expert.related_formulas.is_empty());
        assert!(expert.overall_rating().is_none());
    }

    #[test]
    fn test_snake_case_fields_and_nested_defaults() {
        let json = r#"{
            "id": "expert_1",
            "name": "邓铁涛",
            "academic_title": "国医大师",
            "place_of_origin": "广东开平",
            "experience": 70,
            "lineage": {"mentorName": "邓梦觉", "lineageName": "岭南医派"},
            "specialized_diseases": ["重症肌无力"],
            "books": [{"title": "学说探讨与临证", "year": 1981}],
            "relatedFormulas": [{"id": "formula_1", "name": "补中益气汤", "relationship": "改良者"}]
        }"#;
        let expert: Expert = serde_json::from_str(json).unwrap();
        assert!(expert.is_national_master());
        assert_eq!(expert.place_of_origin, "广东开平");
        assert_eq!(expert.mentor_name(), Some("邓梦觉"));
        assert_eq!(expert.lineage.as_ref().unwrap().lineage_generation, 0);
        assert_eq!(expert.specialized_diseases, vec!["重症肌无力"]);
        assert_eq!(expert.books[0].year, "1981");
        assert!(expert.related_formulas[0].effectiveness.is_none());
    }

    #[test]
    fn test_composite_influence_score() {
        let metrics = InfluenceMetrics {
            citation_count: 1000,
            student_count: 200,
            award_count: 100,
            ..Default::default()
        };
        // (400 + 60 + 30) / 100
        assert!((metrics.composite_score() - 4.9).abs() < 1e-9);
    }

    #[test]
    fn test_primary_specialty_fallback() {
        let mut expert = Expert::new("e1", "Test");
        assert_eq!(expert.primary_specialty(), None);

        expert.specializations = vec!["脾胃病学".into()];
        assert_eq!(expert.primary_specialty(), Some("脾胃病学"));

        expert.specialty = vec!["内科".into()];
        assert_eq!(expert.primary_specialty(), Some("内科"));
    }
}
