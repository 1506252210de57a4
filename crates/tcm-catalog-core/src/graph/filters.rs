//! Network view filters.

use serde::{Deserialize, Serialize};

use super::{GraphNode, NodeKind, RelationKind};

/// Which parts of the derived graph are shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkFilters {
    pub node_kinds: Vec<NodeKind>,
    pub relation_kinds: Vec<RelationKind>,
    pub importance_min: f64,
    pub connections_min: usize,
    /// Case-insensitive substring over node names
    pub search_term: Option<String>,
}

impl Default for NetworkFilters {
    fn default() -> Self {
        Self {
            node_kinds: NodeKind::ALL.to_vec(),
            relation_kinds: vec![
                RelationKind::Creates,
                RelationKind::Treats,
                RelationKind::Contains,
                RelationKind::Specializes,
            ],
            importance_min: 1.0,
            connections_min: 0,
            search_term: None,
        }
    }
}

impl NetworkFilters {
    pub fn allows_kind(&self, kind: NodeKind) -> bool {
        self.node_kinds.contains(&kind)
    }

    pub fn allows_relation(&self, relation: RelationKind) -> bool {
        self.relation_kinds.contains(&relation)
    }

    /// Node-level retention check given the node's pre-filter connection count.
    pub fn keeps_node(&self, node: &GraphNode, connections: usize) -> bool {
        if !self.allows_kind(node.kind)
            || node.importance < self.importance_min
            || connections < self.connections_min
        {
            return false;
        }
        match self.search_term.as_deref().filter(|t| !t.is_empty()) {
            Some(term) => node.name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }

    /// Toggle a node kind on or off.
    pub fn toggle_kind(&mut self, kind: NodeKind) {
        if let Some(pos) = self.node_kinds.iter().position(|k| *k == kind) {
            self.node_kinds.remove(pos);
        } else {
            self.node_kinds.push(kind);
        }
    }
}
