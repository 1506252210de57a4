//! Herb catalog models.

use serde::{Deserialize, Serialize};

use super::{contains_lower, null_as_default};

/// A single herb in the materia medica catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Herb {
    /// Unique catalog identifier (e.g., "herb_1")
    pub id: String,
    /// Display name (e.g., "人参")
    pub name: String,
    /// Phonetic romanization (e.g., "Ren Shen")
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinyin: String,
    #[serde(default)]
    pub english_name: Option<String>,
    /// Thermal nature: 寒, 凉, 平, 温, 热 and the 微- variants
    #[serde(default, deserialize_with = "null_as_default")]
    pub nature: String,
    /// Flavors; order carries no meaning
    #[serde(default, deserialize_with = "null_as_default")]
    pub taste: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub functions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub indications: Vec<String>,
    /// Channel associations (归经)
    #[serde(default, deserialize_with = "null_as_default")]
    pub meridians: Vec<String>,
    /// Producing regions, usually province names
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_image: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contraindications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chemical_components: Vec<ChemicalComponent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pharmacological_actions: Vec<PharmacologicalAction>,
    #[serde(default)]
    pub quality_control: Option<QualityControl>,
    #[serde(default)]
    pub pharmacopoeia_info: Option<PharmacopoeiaInfo>,
}

/// A chemical constituent of an herb.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChemicalComponent {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Constituent class (alkaloid, flavonoid, ...)
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub function: String,
    /// primary | secondary | trace
    #[serde(deserialize_with = "null_as_default")]
    pub importance: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PharmacologicalAction {
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mechanism: String,
    #[serde(deserialize_with = "null_as_default")]
    pub evidence: String,
    #[serde(deserialize_with = "null_as_default")]
    pub clinical_relevance: String,
    #[serde(deserialize_with = "null_as_default")]
    pub studies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityControl {
    #[serde(deserialize_with = "null_as_default")]
    pub identification_methods: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub content_determination: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub quality_indicators: Vec<QualityIndicator>,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_conditions: String,
    #[serde(deserialize_with = "null_as_default")]
    pub shelf_life: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityIndicator {
    #[serde(deserialize_with = "null_as_default")]
    pub parameter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub specification: String,
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub importance: String,
}

/// Pharmacopoeia listing data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PharmacopoeiaInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub latin_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    /// premium | first | second | third
    #[serde(deserialize_with = "null_as_default")]
    pub grade: String,
    pub standard_year: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub official_source: String,
}

impl Herb {
    /// Create a new herb with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Free-text match over name, pinyin, English name, functions and indications.
    ///
    /// `term_lower` must already be lowercase.
    pub fn matches_text(&self, term_lower: &str) -> bool {
        contains_lower(&self.name, term_lower)
            || contains_lower(&self.pinyin, term_lower)
            || self
                .english_name
                .as_deref()
                .is_some_and(|n| contains_lower(n, term_lower))
            || self.functions.iter().any(|f| contains_lower(f, term_lower))
            || self.indications.iter().any(|i| contains_lower(i, term_lower))
    }

    pub fn has_taste(&self, taste: &str) -> bool {
        self.taste.iter().any(|t| t == taste)
    }

    pub fn has_meridian(&self, meridian: &str) -> bool {
        self.meridians.iter().any(|m| m == meridian)
    }

    pub fn is_from(&self, origin: &str) -> bool {
        self.origin.iter().any(|o| o == origin)
    }

    /// Pharmacopoeia grade, if the herb carries pharmacopoeia data.
    pub fn quality_grade(&self) -> Option<&str> {
        self.pharmacopoeia_info.as_ref().map(|p| p.grade.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_nulls_default() {
        let json = r#"{
            "id": "h2",
            "name": "甘草",
            "pinyin": null,
            "taste": null,
            "meridians": null,
            "origin": null,
            "chemicalComponents": [{"name": "甘草酸", "category": null}],
            "pharmacopoeiaInfo": {"aliases": null, "standardYear": null}
        }"#;
        let herb: Herb = serde_json::from_str(json).unwrap();
        assert!(herb.pinyin.is_empty());
        assert!(herb.taste.is_empty());
        assert!(herb.meridians.is_empty());
        assert!(herb.origin.is_empty());
        assert!(herb.chemical_components[0].category.is_empty());
        let info = herb.pharmacopoeia_info.unwrap();
        assert!(info.aliases.is_empty());
        assert!(info.standard_year.is_none());
    }

    #[test]
    fn test_minimal_json_defaults_lists() {
        let herb: Herb = serde_json::from_str(r#"{"id": "h1", "name": "人参"}"#).unwrap();
        assert_eq!(herb.id, "h1");
        assert!(herb.taste.is_empty());
        assert!(herb.meridians.is_empty());
        assert!(herb.origin.is_empty());
        assert!(herb.english_name.is_none());
        assert!(herb.quality_control.is_none());
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "id": "herb_1",
            "name": "人参",
            "pinyin": "Ren Shen",
            "englishName": "Ginseng",
            "nature": "温",
            "taste": ["甘", "微苦"],
            "category": "补虚药",
            "functions": ["大补元气"],
            "indications": ["气虚欲脱"],
            "meridians": ["脾", "肺"],
            "origin": ["吉林"],
            "primaryImage": "/images/renshen.jpg",
            "chemicalComponents": [{"name": "人参皂苷", "category": "皂苷类"}]
        }"#;
        let herb: Herb = serde_json::from_str(json).unwrap();
        assert_eq!(herb.english_name.as_deref(), Some("Ginseng"));
        assert_eq!(herb.primary_image, "/images/renshen.jpg");
        assert_eq!(herb.chemical_components[0].name, "人参皂苷");
        assert!(herb.chemical_components[0].content.is_empty());
    }

    #[test]
    fn test_matches_text() {
        let mut herb = Herb::new("h1", "人参");
        herb.pinyin = "Ren Shen".into();
        herb.english_name = Some("Ginseng".into());
        herb.functions = vec!["大补元气".into()];

        assert!(herb.matches_text("ginseng"));
        assert!(herb.matches_text("ren"));
        assert!(herb.matches_text("元气"));
        assert!(!herb.matches_text("licorice"));
    }

    #[test]
    fn test_list_membership() {
        let mut herb = Herb::new("h1", "人参");
        herb.taste = vec!["甘".into(), "微苦".into()];
        herb.origin = vec!["吉林".into()];

        assert!(herb.has_taste("甘"));
        assert!(!herb.has_taste("苦")); // exact element match, not substring
        assert!(herb.is_from("吉林"));
        assert!(!herb.has_meridian("脾"));
    }
}
