//! Association tables behind the relationship graph.
//!
//! The graph is not present in the datasets verbatim. It is derived from the
//! records plus a small static knowledge base: the treatment-domain taxonomy,
//! which specializations and herbs map to which domains, and a handful of
//! mentor pairs. The defaults reproduce the tables the catalog ships with; a
//! JSON document may replace any of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Knowledge base errors.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown treatment domain referenced: {0}")]
    UnknownDomain(String),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

/// A synthetic disease-category node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TreatmentDomain {
    pub id: String,
    pub name: String,
    /// Display color, `#RRGGBB`
    pub color: String,
}

impl TreatmentDomain {
    fn new(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// A hardcoded teaching relationship between two experts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MentorLink {
    pub mentor: String,
    pub student: String,
    pub description: String,
}

/// Lookup tables used by the graph derivation rules.
///
/// Fields missing from a JSON document keep their built-in values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct KnowledgeBase {
    pub domains: Vec<TreatmentDomain>,
    /// Specialization name → domain id
    pub specialization_domains: HashMap<String, String>,
    /// Herb name → domain ids
    pub herb_domains: HashMap<String, Vec<String>>,
    pub mentor_links: Vec<MentorLink>,
    /// Relationship substrings that mark an expert as the formula's creator
    pub creation_markers: Vec<String>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            domains: Self::default_domains(),
            specialization_domains: Self::default_specialization_domains(),
            herb_domains: Self::default_herb_domains(),
            mentor_links: Self::default_mentor_links(),
            creation_markers: vec!["创制".to_string()],
        }
    }
}

impl KnowledgeBase {
    /// Parse a knowledge document and check its domain references.
    pub fn from_json_str(json: &str) -> KnowledgeResult<Self> {
        let kb: Self = serde_json::from_str(json)?;
        kb.validate()?;
        Ok(kb)
    }

    /// Every domain id referenced by a lookup table must be defined.
    pub fn validate(&self) -> KnowledgeResult<()> {
        let referenced = self
            .specialization_domains
            .values()
            .chain(self.herb_domains.values().flatten());
        for id in referenced {
            if self.domain(id).is_none() {
                return Err(KnowledgeError::UnknownDomain(id.clone()));
            }
        }
        Ok(())
    }

    pub fn domain(&self, id: &str) -> Option<&TreatmentDomain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn domain_for_specialization(&self, specialization: &str) -> Option<&str> {
        self.specialization_domains
            .get(specialization)
            .map(String::as_str)
    }

    pub fn domains_for_herb(&self, herb_name: &str) -> &[String] {
        self.herb_domains
            .get(herb_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a relationship label means "created/composed".
    pub fn is_creation(&self, relationship: &str) -> bool {
        self.creation_markers
            .iter()
            .any(|m| !m.is_empty() && relationship.contains(m.as_str()))
    }

    fn default_domains() -> Vec<TreatmentDomain> {
        vec![
            TreatmentDomain::new("domain_1", "脾胃病", "#F59E0B"),
            TreatmentDomain::new("domain_2", "风湿病", "#EF4444"),
            TreatmentDomain::new("domain_3", "心血管病", "#8B5CF6"),
            TreatmentDomain::new("domain_4", "呼吸系统病", "#06B6D4"),
            TreatmentDomain::new("domain_5", "泌尿系统病", "#84CC16"),
        ]
    }

    fn default_specialization_domains() -> HashMap<String, String> {
        [
            ("脾胃病学", "domain_1"),
            ("风湿病学", "domain_2"),
            ("心血管病学", "domain_3"),
            ("中医内科", "domain_1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn default_herb_domains() -> HashMap<String, Vec<String>> {
        let table: [(&str, &[&str]); 10] = [
            ("人参", &["domain_1", "domain_3"]),
            ("黄芪", &["domain_1", "domain_3"]),
            ("当归", &["domain_2", "domain_3"]),
            ("川芎", &["domain_2", "domain_3"]),
            ("白芍", &["domain_1", "domain_2"]),
            ("甘草", &["domain_1", "domain_4"]),
            ("茯苓", &["domain_1", "domain_5"]),
            ("白术", &["domain_1"]),
            ("陈皮", &["domain_1"]),
            ("半夏", &["domain_1", "domain_4"]),
        ];
        table
            .into_iter()
            .map(|(herb, domains)| {
                (
                    herb.to_string(),
                    domains.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect()
    }

    fn default_mentor_links() -> Vec<MentorLink> {
        vec![
            MentorLink {
                mentor: "expert_1".into(),
                student: "expert_2".into(),
                description: "学术交流".into(),
            },
            MentorLink {
                mentor: "expert_3".into(),
                student: "expert_4".into(),
                description: "理论传承".into(),
            },
        ]
    }
}
