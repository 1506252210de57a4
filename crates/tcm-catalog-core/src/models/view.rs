//! Top-level screens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which top-level screen is active.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Gallery,
    Detail,
    Compare,
    Map,
    #[default]
    Experts,
    ExpertDetail,
    ExpertCompare,
    Network,
}

impl View {
    pub const ALL: [View; 8] = [
        View::Gallery,
        View::Detail,
        View::Compare,
        View::Map,
        View::Experts,
        View::ExpertDetail,
        View::ExpertCompare,
        View::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            View::Gallery => "gallery",
            View::Detail => "detail",
            View::Compare => "compare",
            View::Map => "map",
            View::Experts => "experts",
            View::ExpertDetail => "expert-detail",
            View::ExpertCompare => "expert-compare",
            View::Network => "network",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown view: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for view in View::ALL {
            assert_eq!(view.as_str().parse::<View>().unwrap(), view);
        }
        assert!("nowhere".parse::<View>().is_err());
    }

    #[test]
    fn test_default_is_experts() {
        assert_eq!(View::default(), View::Experts);
    }
}
