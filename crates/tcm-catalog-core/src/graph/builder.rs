//! Graph derivation from the raw collections.
//!
//! Edge rules, each applied independently and unioned:
//! 1. Expert → Formula from the expert's related formulas (creates/researches)
//! 2. Expert → Domain from specializations in the knowledge base
//! 3. Formula → Herb for the leading ingredients with a matching herb node
//! 4. Herb → Domain from the herb table in the knowledge base
//! 5. Expert → Expert from the knowledge base mentor links

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::{
    EdgeStyle, GraphEdge, GraphNode, KnowledgeBase, LineStyle, Network, NetworkFilters, NodeKind,
    NodeShape, NodeStyle, RelationKind,
};
use crate::models::{Expert, Formula, Herb, IngredientRole};

/// Herb nodes beyond this count are left out of the graph.
pub const DEFAULT_HERB_NODE_LIMIT: usize = 20;
/// Only this many leading ingredients of a formula produce edges.
pub const DEFAULT_INGREDIENT_LIMIT: usize = 6;

const DEFAULT_IMPORTANCE: f64 = 5.0;
const HERB_FALLBACK_IMPORTANCE: f64 = 3.0;
const DOMAIN_IMPORTANCE: f64 = 6.0;
const DOMAIN_CATEGORY: &str = "治疗领域";

const SPECIALIZES_STRENGTH: f64 = 7.0;
const TREATS_STRENGTH: f64 = 6.0;
const MENTOR_STRENGTH: f64 = 8.0;

/// Builds a filtered [`Network`] from experts, formulas and herbs.
pub struct GraphBuilder<'a> {
    knowledge: &'a KnowledgeBase,
    herb_node_limit: usize,
    ingredient_limit: usize,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(knowledge: &'a KnowledgeBase) -> Self {
        Self {
            knowledge,
            herb_node_limit: DEFAULT_HERB_NODE_LIMIT,
            ingredient_limit: DEFAULT_INGREDIENT_LIMIT,
        }
    }

    pub fn with_limits(mut self, herb_node_limit: usize, ingredient_limit: usize) -> Self {
        self.herb_node_limit = herb_node_limit;
        self.ingredient_limit = ingredient_limit;
        self
    }

    /// Derive the graph and apply `filters`.
    ///
    /// `formulas` is `None` when no formula data is available; formula nodes
    /// and every edge touching them are then omitted.
    pub fn build(
        &self,
        experts: &[Expert],
        formulas: Option<&[Formula]>,
        herbs: &[Herb],
        filters: &NetworkFilters,
    ) -> Network {
        if formulas.is_none() {
            warn!("No formula data available, formula nodes omitted from network");
        }

        let nodes = self.derive_nodes(experts, formulas, herbs, filters);
        let edges = self.derive_edges(&nodes, experts, formulas);

        // Thresholds use connection counts over every derived edge
        let raw_counts = count_connections(&edges);
        let kept_nodes: Vec<GraphNode> = nodes
            .into_iter()
            .filter(|n| {
                let count = raw_counts.get(n.id.as_str()).copied().unwrap_or(0);
                filters.keeps_node(n, count)
            })
            .collect();

        let kept_ids: HashSet<&str> = kept_nodes.iter().map(|n| n.id.as_str()).collect();
        let kept_edges: Vec<GraphEdge> = edges
            .into_iter()
            .filter(|e| {
                kept_ids.contains(e.source.as_str())
                    && kept_ids.contains(e.target.as_str())
                    && filters.allows_relation(e.relation)
            })
            .collect();

        let final_counts = count_connections(&kept_edges);
        let nodes = kept_nodes
            .into_iter()
            .map(|mut n| {
                n.connections = final_counts.get(n.id.as_str()).copied().unwrap_or(0);
                n
            })
            .collect::<Vec<_>>();

        debug!(
            nodes = nodes.len(),
            edges = kept_edges.len(),
            "Built relationship network"
        );

        Network {
            nodes,
            edges: kept_edges,
        }
    }

    fn derive_nodes(
        &self,
        experts: &[Expert],
        formulas: Option<&[Formula]>,
        herbs: &[Herb],
        filters: &NetworkFilters,
    ) -> Vec<GraphNode> {
        let mut nodes = Vec::new();

        if filters.allows_kind(NodeKind::Expert) {
            nodes.extend(experts.iter().map(expert_node));
        }
        if filters.allows_kind(NodeKind::Formula) {
            if let Some(formulas) = formulas {
                nodes.extend(formulas.iter().map(formula_node));
            }
        }
        if filters.allows_kind(NodeKind::Herb) {
            nodes.extend(herbs.iter().take(self.herb_node_limit).map(herb_node));
        }
        if filters.allows_kind(NodeKind::TreatmentDomain) {
            nodes.extend(self.knowledge.domains.iter().map(|d| GraphNode {
                id: d.id.clone(),
                kind: NodeKind::TreatmentDomain,
                name: d.name.clone(),
                category: DOMAIN_CATEGORY.to_string(),
                description: Some(format!("{}相关疾病的治疗", d.name)),
                importance: DOMAIN_IMPORTANCE,
                connections: 0,
                style: NodeStyle {
                    color: d.color.clone(),
                    size: 30.0,
                    shape: NodeShape::Diamond,
                },
            }));
        }

        // First occurrence of an id wins
        let mut seen = HashSet::new();
        nodes.retain(|n| {
            let fresh = seen.insert(n.id.clone());
            if !fresh {
                debug!(id = %n.id, "Skipping duplicate node id");
            }
            fresh
        });
        nodes
    }

    fn derive_edges(
        &self,
        nodes: &[GraphNode],
        experts: &[Expert],
        formulas: Option<&[Formula]>,
    ) -> Vec<GraphEdge> {
        let mut edges = EdgeSet::new(nodes);

        // Herb nodes by display name, first occurrence wins
        let mut herb_ids: HashMap<&str, &str> = HashMap::new();
        for n in nodes.iter().filter(|n| n.kind == NodeKind::Herb) {
            herb_ids.entry(n.name.as_str()).or_insert(n.id.as_str());
        }

        for expert in experts {
            for related in &expert.related_formulas {
                let relation = if self.knowledge.is_creation(&related.relationship) {
                    RelationKind::Creates
                } else {
                    RelationKind::Researches
                };
                let strength = nonzero_or_default(related.effectiveness);
                edges.push(
                    &expert.id,
                    &related.id,
                    relation,
                    strength,
                    related.relationship.clone(),
                    EdgeStyle {
                        color: "#6B7280".into(),
                        width: (strength / 2.0).max(1.0),
                        line: LineStyle::Solid,
                    },
                );
            }

            for specialization in &expert.specializations {
                if let Some(domain_id) = self.knowledge.domain_for_specialization(specialization) {
                    edges.push(
                        &expert.id,
                        domain_id,
                        RelationKind::Specializes,
                        SPECIALIZES_STRENGTH,
                        format!("专长于{specialization}"),
                        EdgeStyle {
                            color: "#F59E0B".into(),
                            width: 2.0,
                            line: LineStyle::Solid,
                        },
                    );
                }
            }
        }

        for formula in formulas.unwrap_or(&[]) {
            for ingredient in formula.ingredients.iter().take(self.ingredient_limit) {
                let Some(herb_id) = herb_ids.get(ingredient.name.as_str()) else {
                    continue;
                };
                let (strength, width) = match ingredient.role {
                    IngredientRole::Monarch => (10.0, 3.0),
                    IngredientRole::Minister => (8.0, 2.0),
                    _ => (6.0, 1.0),
                };
                edges.push(
                    &formula.id,
                    herb_id,
                    RelationKind::Contains,
                    strength,
                    format!(
                        "{}包含{}({})",
                        formula.name,
                        ingredient.name,
                        role_label(ingredient.role)
                    ),
                    EdgeStyle {
                        color: "#10B981".into(),
                        width,
                        line: LineStyle::Solid,
                    },
                );
            }
        }

        for herb in nodes.iter().filter(|n| n.kind == NodeKind::Herb) {
            for domain_id in self.knowledge.domains_for_herb(&herb.name) {
                let domain_name = self
                    .knowledge
                    .domain(domain_id)
                    .map(|d| d.name.as_str())
                    .unwrap_or(domain_id.as_str());
                edges.push(
                    &herb.id,
                    domain_id,
                    RelationKind::Treats,
                    TREATS_STRENGTH,
                    format!("{}用于治疗{}", herb.name, domain_name),
                    EdgeStyle {
                        color: "#059669".into(),
                        width: 1.5,
                        line: LineStyle::Dashed,
                    },
                );
            }
        }

        for link in &self.knowledge.mentor_links {
            edges.push(
                &link.mentor,
                &link.student,
                RelationKind::Mentor,
                MENTOR_STRENGTH,
                link.description.clone(),
                EdgeStyle {
                    color: "#8B5CF6".into(),
                    width: 2.0,
                    line: LineStyle::Dotted,
                },
            );
        }

        edges.into_edges()
    }
}

/// Edge accumulator that drops dangling and duplicate edges.
struct EdgeSet<'n> {
    node_ids: HashSet<&'n str>,
    keys: HashSet<(String, String, RelationKind)>,
    ids: HashSet<String>,
    edges: Vec<GraphEdge>,
}

impl<'n> EdgeSet<'n> {
    fn new(nodes: &'n [GraphNode]) -> Self {
        Self {
            node_ids: nodes.iter().map(|n| n.id.as_str()).collect(),
            keys: HashSet::new(),
            ids: HashSet::new(),
            edges: Vec::new(),
        }
    }

    fn push(
        &mut self,
        source: &str,
        target: &str,
        relation: RelationKind,
        strength: f64,
        description: String,
        style: EdgeStyle,
    ) {
        if !self.node_ids.contains(source) || !self.node_ids.contains(target) {
            return;
        }
        if !self
            .keys
            .insert((source.to_string(), target.to_string(), relation))
        {
            return;
        }

        let mut id = format!("{source}-{target}");
        if self.ids.contains(&id) {
            id = format!("{source}-{target}-{}", relation.as_str());
        }
        self.ids.insert(id.clone());

        self.edges.push(GraphEdge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            relation,
            strength,
            description,
            bidirectional: false,
            style,
        });
    }

    fn into_edges(self) -> Vec<GraphEdge> {
        self.edges
    }
}

fn count_connections(edges: &[GraphEdge]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for edge in edges {
        *counts.entry(edge.source.as_str()).or_insert(0) += 1;
        if edge.target != edge.source {
            *counts.entry(edge.target.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

fn role_label(role: IngredientRole) -> &'static str {
    match role {
        IngredientRole::Monarch => "君药",
        IngredientRole::Minister => "臣药",
        IngredientRole::Assistant => "佐药",
        _ => "使药",
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with an ellipsis.
fn excerpt(text: &str, max_chars: usize) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        Some(format!("{head}..."))
    } else {
        Some(head)
    }
}

/// A zero score counts as unrated.
fn nonzero_or_default(score: Option<f64>) -> f64 {
    score.filter(|s| *s != 0.0).unwrap_or(DEFAULT_IMPORTANCE)
}

fn expert_node(expert: &Expert) -> GraphNode {
    let importance = nonzero_or_default(expert.overall_rating());
    GraphNode {
        id: expert.id.clone(),
        kind: NodeKind::Expert,
        name: expert.name.clone(),
        category: expert.category.clone(),
        description: excerpt(&expert.biography, 100),
        importance,
        connections: 0,
        style: NodeStyle {
            color: "#3B82F6".into(),
            size: (importance * 5.0).max(24.0),
            shape: NodeShape::Circle,
        },
    }
}

fn formula_node(formula: &Formula) -> GraphNode {
    let importance = nonzero_or_default(formula.clinical_efficacy());
    GraphNode {
        id: formula.id.clone(),
        kind: NodeKind::Formula,
        name: formula.name.clone(),
        category: formula.category.clone(),
        description: formula
            .primary_effect()
            .filter(|e| !e.is_empty())
            .map(str::to_string),
        importance,
        connections: 0,
        style: NodeStyle {
            color: "#10B981".into(),
            size: (importance * 4.0).max(20.0),
            shape: NodeShape::Square,
        },
    }
}

fn herb_node(herb: &Herb) -> GraphNode {
    let importance = if herb.functions.is_empty() {
        HERB_FALLBACK_IMPORTANCE
    } else {
        herb.functions.len() as f64
    };
    GraphNode {
        id: herb.id.clone(),
        kind: NodeKind::Herb,
        name: herb.name.clone(),
        category: herb.category.clone(),
        description: excerpt(&herb.functions.join(", "), 50),
        importance,
        connections: 0,
        style: NodeStyle {
            color: "#059669".into(),
            size: (importance * 3.0).max(18.0),
            shape: NodeShape::Circle,
        },
    }
}
