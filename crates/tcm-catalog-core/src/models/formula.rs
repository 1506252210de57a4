//! Formula (prescription) models.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A prescription formula.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinyin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub english_name: Option<String>,

    /// Formulation type (补益方, 解表方, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Source type (经典方, 时方, 验方, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub formula_source: String,
    /// Classical text the formula is recorded in
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_book: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dynasty_period: String,

    /// Ingredients in prescription order
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<FormulaIngredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preparation: String,
    #[serde(default)]
    pub administration: Option<Administration>,
    #[serde(default)]
    pub effects: Option<FormulaEffects>,
    // The seed data writes these under misspelled keys.
    #[serde(default, alias = "clinicalIndications", deserialize_with = "null_as_default")]
    pub indications: Vec<Indication>,
    #[serde(default, alias = "contraclinicalIndications", deserialize_with = "null_as_default")]
    pub contraindications: Vec<Contraindication>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_experts: Vec<FormulaExpertLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_diseases: Vec<String>,

    #[serde(default)]
    pub effectiveness: Option<FormulaEffectiveness>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<String>,
}

/// Compositional role of an ingredient (君臣佐使).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IngredientRole {
    /// 君 - carries the primary effect
    Monarch,
    /// 臣 - reinforces the monarch
    Minister,
    /// 佐 - assists or moderates
    Assistant,
    /// 使 - guides and harmonizes
    Guide,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl IngredientRole {
    /// Centrality rank, higher is more central.
    pub fn rank(self) -> u8 {
        match self {
            IngredientRole::Monarch => 4,
            IngredientRole::Minister => 3,
            IngredientRole::Assistant => 2,
            IngredientRole::Guide => 1,
            IngredientRole::Unspecified => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IngredientRole::Monarch => "monarch",
            IngredientRole::Minister => "minister",
            IngredientRole::Assistant => "assistant",
            IngredientRole::Guide => "guide",
            IngredientRole::Unspecified => "unspecified",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FormulaIngredient {
    /// Target herb id
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Target herb name
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Dosage text, e.g. "10-15g"
    #[serde(deserialize_with = "null_as_default")]
    pub dosage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: IngredientRole,
    #[serde(deserialize_with = "null_as_default")]
    pub role_description: String,
    pub processing_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Administration {
    #[serde(deserialize_with = "null_as_default")]
    pub dosage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timing: String,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FormulaEffects {
    #[serde(deserialize_with = "null_as_default")]
    pub primary_effect: String,
    #[serde(deserialize_with = "null_as_default")]
    pub secondary_effects: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mechanism_of_action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub clinical_applications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Indication {
    #[serde(deserialize_with = "null_as_default")]
    pub disease: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tcm_syndrome: String,
    pub modern_diagnosis: Option<String>,
    /// mild | moderate | severe
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Contraindication {
    /// absolute | relative
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FormulaExpertLink {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relationship: String,
}

/// Evaluation scores for a formula.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FormulaEffectiveness {
    /// Clinical efficacy (1-10)
    #[serde(deserialize_with = "null_as_default")]
    pub clinical_efficacy: f64,
    /// Safety (1-10)
    #[serde(deserialize_with = "null_as_default")]
    pub safety_profile: f64,
    /// A | B | C | D
    #[serde(deserialize_with = "null_as_default")]
    pub evidence_level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendation_grade: f64,
}

impl Formula {
    /// Create a new formula with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn clinical_efficacy(&self) -> Option<f64> {
        self.effectiveness.as_ref().map(|e| e.clinical_efficacy)
    }

    pub fn primary_effect(&self) -> Option<&str> {
        self.effects.as_ref().map(|e| e.primary_effect.as_str())
    }
}
