//! Search and filter engine.
//!
//! Filtering is a pure function of (full collection, criteria): results are
//! always recomputed from the unfiltered collection, so the order in which
//! criteria were set never matters. All populated criteria are ANDed; an
//! empty or unset criterion imposes no constraint.

mod expert;
mod herb;
mod sort;

pub use expert::*;
pub use herb::*;
pub use sort::*;

use thiserror::Error;

/// Filter criteria errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid experience range: {0}")]
    InvalidExperienceRange(String),

    #[error("Invalid numeric threshold: {0}")]
    InvalidThreshold(String),
}

pub type FilterResult<T> = Result<T, FilterError>;

/// Treat `Some("")` the same as `None`.
pub(crate) fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parse an optional numeric threshold; blank text means unset.
pub fn parse_threshold(text: &str) -> FilterResult<Option<f64>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| FilterError::InvalidThreshold(text.to_string()))
}
