//! Radial layout.
//!
//! Node `i` of `n` sits at angle `i / n * 2π` on a circle whose radius grows
//! with importance. Positions depend only on node order, so nodes move
//! whenever the filtered set changes.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::GraphNode;

/// Importance at which a node sits exactly on the base radius.
const NEUTRAL_IMPORTANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    /// Breakpoints: below 768 is mobile, below 1024 is tablet.
    pub fn for_width(width: u32) -> Self {
        if width < 768 {
            Viewport::Mobile
        } else if width < 1024 {
            Viewport::Tablet
        } else {
            Viewport::Desktop
        }
    }

    pub fn params(self) -> LayoutParams {
        match self {
            Viewport::Desktop => LayoutParams {
                center_x: 400.0,
                center_y: 350.0,
                base_radius: 200.0,
                importance_step: 20.0,
            },
            Viewport::Tablet => LayoutParams {
                center_x: 300.0,
                center_y: 300.0,
                base_radius: 160.0,
                importance_step: 20.0,
            },
            Viewport::Mobile => LayoutParams {
                center_x: 200.0,
                center_y: 250.0,
                base_radius: 120.0,
                importance_step: 10.0,
            },
        }
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(Viewport::Desktop),
            "tablet" => Ok(Viewport::Tablet),
            "mobile" => Ok(Viewport::Mobile),
            other => Err(format!("unknown viewport: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutParams {
    pub center_x: f64,
    pub center_y: f64,
    pub base_radius: f64,
    /// Radius added per point of importance above 5
    pub importance_step: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Viewport::Desktop.params()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionedNode {
    pub node: GraphNode,
    pub x: f64,
    pub y: f64,
}

pub fn radial_layout(nodes: &[GraphNode], params: &LayoutParams) -> Vec<PositionedNode> {
    let total = nodes.len() as f64;
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let angle = i as f64 / total * 2.0 * PI;
            let radius =
                params.base_radius + (node.importance - NEUTRAL_IMPORTANCE) * params.importance_step;
            PositionedNode {
                node: node.clone(),
                x: params.center_x + angle.cos() * radius,
                y: params.center_y + angle.sin() * radius,
            }
        })
        .collect()
}
