//! Domain models for the TCM catalog.
//!
//! Every record deserializes straight from the static JSON datasets. Optional
//! lists and nested objects default at this boundary so that the filter,
//! comparison and graph layers never have to handle a missing list.

mod expert;
mod formula;
mod herb;
mod view;

pub use expert::*;
pub use formula::*;
pub use herb::*;
pub use view::*;

use serde::{Deserialize, Deserializer};

/// Anything with a stable catalog identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Herb {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Expert {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Formula {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Treat an explicit JSON `null` like a missing key.
///
/// `#[serde(default)]` alone only covers absent keys.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a JSON string, number or null and keep it as text.
///
/// The datasets are inconsistent about year fields (`"1984"` vs `1984`).
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Case-insensitive substring test. `needle_lower` must already be lowercase.
pub(crate) fn contains_lower(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Year {
        #[serde(deserialize_with = "lenient_string")]
        year: String,
    }

    #[test]
    fn test_lenient_string_accepts_numbers() {
        let a: Year = serde_json::from_str(r#"{"year": 1984}"#).unwrap();
        let b: Year = serde_json::from_str(r#"{"year": "1984"}"#).unwrap();
        let c: Year = serde_json::from_str(r#"{"year": null}"#).unwrap();
        assert_eq!(a.year, "1984");
        assert_eq!(b.year, "1984");
        assert_eq!(c.year, "");
    }

    #[derive(Deserialize)]
    struct Counts {
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        total: u32,
    }

    #[test]
    fn test_null_as_default() {
        let nulls: Counts = serde_json::from_str(r#"{"tags": null, "total": null}"#).unwrap();
        assert!(nulls.tags.is_empty());
        assert_eq!(nulls.total, 0);

        let missing: Counts = serde_json::from_str("{}").unwrap();
        assert!(missing.tags.is_empty());

        let set: Counts = serde_json::from_str(r#"{"tags": ["a"], "total": 3}"#).unwrap();
        assert_eq!(set.tags, vec!["a"]);
        assert_eq!(set.total, 3);
    }

    #[test]
    fn test_contains_lower() {
        assert!(contains_lower("Ginseng Root", "ginseng"));
        assert!(!contains_lower("Licorice", "ginseng"));
    }
}
