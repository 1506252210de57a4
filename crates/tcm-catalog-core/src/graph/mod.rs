//! Relationship graph for the network view.
//!
//! Pipeline: Knowledge Base + Collections → Builder → Filtered Network → Layout
//!
//! The graph is ephemeral. It is rebuilt from the raw collections whenever the
//! data or the network filters change, and no positions are remembered between
//! rebuilds.

mod builder;
mod filters;
mod knowledge;
mod layout;

pub use builder::*;
pub use filters::*;
pub use knowledge::*;
pub use layout::*;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Expert,
    Formula,
    Herb,
    TreatmentDomain,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Expert,
        NodeKind::Formula,
        NodeKind::Herb,
        NodeKind::TreatmentDomain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Expert => "expert",
            NodeKind::Formula => "formula",
            NodeKind::Herb => "herb",
            NodeKind::TreatmentDomain => "treatmentDomain",
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown node kind: {s}"))
    }
}

/// Fixed relation vocabulary. The builder emits a subset of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    Creates,
    Improves,
    Researches,
    Specializes,
    Treats,
    Contains,
    DerivedFrom,
    CombinedWith,
    Contraindicated,
    Alternative,
    Mentor,
    Student,
    Influences,
}

impl RelationKind {
    pub const ALL: [RelationKind; 13] = [
        RelationKind::Creates,
        RelationKind::Improves,
        RelationKind::Researches,
        RelationKind::Specializes,
        RelationKind::Treats,
        RelationKind::Contains,
        RelationKind::DerivedFrom,
        RelationKind::CombinedWith,
        RelationKind::Contraindicated,
        RelationKind::Alternative,
        RelationKind::Mentor,
        RelationKind::Student,
        RelationKind::Influences,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Creates => "creates",
            RelationKind::Improves => "improves",
            RelationKind::Researches => "researches",
            RelationKind::Specializes => "specializes",
            RelationKind::Treats => "treats",
            RelationKind::Contains => "contains",
            RelationKind::DerivedFrom => "derivedFrom",
            RelationKind::CombinedWith => "combinedWith",
            RelationKind::Contraindicated => "contraindicated",
            RelationKind::Alternative => "alternative",
            RelationKind::Mentor => "mentor",
            RelationKind::Student => "student",
            RelationKind::Influences => "influences",
        }
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown relation kind: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeStyle {
    pub color: String,
    pub size: f64,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgeStyle {
    pub color: String,
    pub width: f64,
    pub line: LineStyle,
}

/// A graph vertex wrapping one record or one treatment domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    /// Sizing score, nominally 1-10
    pub importance: f64,
    /// Incident edges in the network this node belongs to
    pub connections: usize,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: RelationKind,
    /// Relation strength, nominally 1-10
    pub strength: f64,
    pub description: String,
    pub bidirectional: bool,
    pub style: EdgeStyle,
}

impl GraphEdge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Node and edge counts of a network, broken down by kind.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_kinds: BTreeMap<NodeKind, usize>,
    pub relation_kinds: BTreeMap<RelationKind, usize>,
}

/// A filtered graph. Every edge endpoint is one of `nodes`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Network {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Network {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes sharing an edge with `id`, in edge order, without repeats.
    pub fn neighbors(&self, id: &str) -> Vec<&GraphNode> {
        let mut seen = Vec::new();
        for edge in self.edges.iter().filter(|e| e.touches(id)) {
            let other = if edge.source == id {
                &edge.target
            } else {
                &edge.source
            };
            if other != id && !seen.contains(&other) {
                seen.push(other);
            }
        }
        seen.into_iter().filter_map(|n| self.node(n)).collect()
    }

    pub fn edges_of(&self, id: &str) -> impl Iterator<Item = &GraphEdge> {
        let id = id.to_string();
        self.edges.iter().filter(move |e| e.touches(&id))
    }

    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            *stats.node_kinds.entry(node.kind).or_insert(0) += 1;
        }
        for edge in &self.edges {
            *stats.relation_kinds.entry(edge.relation).or_insert(0) += 1;
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Radial positions for the current node order.
    pub fn layout(&self, params: &LayoutParams) -> Vec<PositionedNode> {
        radial_layout(&self.nodes, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind) -> GraphNode {
        GraphNode {
            id: id.into(),
            kind,
            name: id.into(),
            category: String::new(),
            description: None,
            importance: 5.0,
            connections: 0,
            style: NodeStyle::default(),
        }
    }

    fn edge(source: &str, target: &str, relation: RelationKind) -> GraphEdge {
        GraphEdge {
            id: format!("{source}-{target}"),
            source: source.into(),
            target: target.into(),
            relation,
            strength: 5.0,
            description: String::new(),
            bidirectional: false,
            style: EdgeStyle::default(),
        }
    }

    fn sample() -> Network {
        Network {
            nodes: vec![
                node("e1", NodeKind::Expert),
                node("f1", NodeKind::Formula),
                node("h1", NodeKind::Herb),
            ],
            edges: vec![
                edge("e1", "f1", RelationKind::Creates),
                edge("f1", "h1", RelationKind::Contains),
            ],
        }
    }

    #[test]
    fn test_neighbors() {
        let network = sample();
        let ids: Vec<&str> = network
            .neighbors("f1")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["e1", "h1"]);
        assert!(network.neighbors("missing").is_empty());
        assert_eq!(network.edges_of("h1").count(), 1);
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.total_edges, 2);
        assert_eq!(stats.node_kinds.get(&NodeKind::Expert), Some(&1));
        assert_eq!(stats.relation_kinds.get(&RelationKind::Contains), Some(&1));
        assert_eq!(stats.relation_kinds.get(&RelationKind::Treats), None);
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&NodeKind::TreatmentDomain).unwrap(),
            "\"treatmentDomain\""
        );
        assert_eq!(
            serde_json::to_string(&RelationKind::DerivedFrom).unwrap(),
            "\"derivedFrom\""
        );
        assert_eq!(RelationKind::Mentor.as_str(), "mentor");
        assert_eq!("treatmentDomain".parse::<NodeKind>(), Ok(NodeKind::TreatmentDomain));
        assert_eq!("combinedWith".parse::<RelationKind>(), Ok(RelationKind::CombinedWith));
        assert!("syndrome".parse::<NodeKind>().is_err());
    }
}
