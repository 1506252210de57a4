//! TCM Catalog Core Library
//!
//! Local catalog of Traditional Chinese Medicine herbs, famous experts and
//! classical formulas, with search, comparison, an origin map and a
//! relationship network.
//!
//! # Architecture
//!
//! ```text
//!   herbs.json   experts.json   formulas.json   knowledge.json
//!        │             │              │                │
//!        └─────────────┴──────┬───────┴────────────────┘
//!                             │
//!                      [DataSource loader]
//!                             │
//!                 ┌───────────▼───────────┐
//!                 │        AppState       │──── SQLite kv_store
//!                 │  collections, filters │     (formula cache,
//!                 │  selection, compare   │      view history)
//!                 └───────────┬───────────┘
//!                             │
//!        ┌──────────────┬─────┴────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!    Gallery /      Compare        Origin map     Relationship
//!    Experts        summaries      provinces      network + layout
//! ```
//!
//! # Core Principle
//!
//! **Derived views are recomputed from the full collections.** Filtered lists,
//! statistics and the network never depend on the order in which criteria
//! were applied.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Herb, Expert, Formula, View)
//! - [`filter`]: Herb and expert filter engine plus gallery sorting
//! - [`compare`]: Bounded comparison selections and their summaries
//! - [`province`]: Province normalisation and origin distribution
//! - [`graph`]: Knowledge base, network builder, filters and radial layout
//! - [`loader`]: JSON collection sources
//! - [`db`]: SQLite key/value store for cached data
//! - [`config`]: TOML configuration
//! - [`state`]: Application state container

pub mod compare;
pub mod config;
pub mod db;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod models;
pub mod province;
pub mod state;

// Re-export commonly used types
pub use compare::{ComparisonSet, ExpertComparison, HerbComparison, COMPARE_CAPACITY};
pub use config::CatalogConfig;
pub use db::Database;
pub use filter::{ExpertFilters, HerbFilters, HerbSort, HerbSortKey};
pub use graph::{GraphBuilder, KnowledgeBase, LayoutParams, Network, NetworkFilters, Viewport};
pub use loader::{DataSource, DirectorySource, StaticSource};
pub use models::{Expert, Formula, Herb, View};
pub use state::{AppState, CatalogStats};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::filter::{parse_threshold, ExperienceRange};
use crate::graph::{GraphEdge, NodeKind, PositionedNode, RelationKind};
use crate::province::ProvinceCount;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for CatalogError {
    fn from(e: db::DbError) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

impl From<loader::LoadError> for CatalogError {
    fn from(e: loader::LoadError) -> Self {
        CatalogError::LoadError(e.to_string())
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(e: config::ConfigError) -> Self {
        CatalogError::ConfigError(e.to_string())
    }
}

impl From<filter::FilterError> for CatalogError {
    fn from(e: filter::FilterError) -> Self {
        CatalogError::InvalidInput(e.to_string())
    }
}

impl From<graph::KnowledgeError> for CatalogError {
    fn from(e: graph::KnowledgeError) -> Self {
        CatalogError::LoadError(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CatalogError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CatalogError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Main FFI Interface
// =========================================================================

/// Open a catalog whose state is stored in the SQLite file at `path`.
#[uniffi::export]
pub fn open_catalog(path: String) -> Result<Arc<TcmCatalog>, CatalogError> {
    let mut state = AppState::new();
    state.attach_database(Database::open(&PathBuf::from(path))?)?;
    Ok(Arc::new(TcmCatalog::with_state(state)))
}

/// Open a catalog configured from a TOML file and load its data directory.
///
/// A missing config file means defaults. Collection failures are reported
/// through `error()` rather than failing the open.
#[uniffi::export]
pub fn open_catalog_with_config(config_path: String) -> Result<Arc<TcmCatalog>, CatalogError> {
    let config = CatalogConfig::load(&PathBuf::from(config_path))?;
    let mut state = AppState::from_config(&config)?;
    state.load_from(&DirectorySource::from_config(config.data.clone()));
    Ok(Arc::new(TcmCatalog::with_state(state)))
}

/// Open a catalog with in-memory storage (for testing).
#[uniffi::export]
pub fn open_catalog_in_memory() -> Result<Arc<TcmCatalog>, CatalogError> {
    let mut state = AppState::new();
    state.attach_database(Database::open_in_memory()?)?;
    Ok(Arc::new(TcmCatalog::with_state(state)))
}

/// Main catalog interface exposed to native shells.
#[derive(uniffi::Object)]
pub struct TcmCatalog {
    state: Arc<Mutex<AppState>>,
}

impl TcmCatalog {
    fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[uniffi::export]
impl TcmCatalog {
    // =====================================================================
    // Loading
    // =====================================================================

    /// Load every collection from a directory of JSON files.
    ///
    /// Per-collection failures are reported through `error()`.
    pub fn load_directory(&self, directory: String) -> Result<FfiCatalogStats, CatalogError> {
        let source = DirectorySource::new(directory);
        let mut state = self.state.lock()?;
        state.load_from(&source);
        Ok(state.stats().into())
    }

    /// Replace the herb collection from a JSON array. Returns the herb count.
    pub fn load_herbs_json(&self, json: String) -> Result<u32, CatalogError> {
        let herbs: Vec<Herb> = loader::parse_collection(&json)?;
        let count = herbs.len() as u32;
        self.state.lock()?.set_herbs(herbs);
        Ok(count)
    }

    pub fn load_experts_json(&self, json: String) -> Result<u32, CatalogError> {
        let experts: Vec<Expert> = loader::parse_collection(&json)?;
        let count = experts.len() as u32;
        self.state.lock()?.set_experts(experts);
        Ok(count)
    }

    pub fn load_formulas_json(&self, json: String) -> Result<u32, CatalogError> {
        let formulas: Vec<Formula> = loader::parse_collection(&json)?;
        let count = formulas.len() as u32;
        self.state.lock()?.set_formulas(formulas);
        Ok(count)
    }

    /// Override the built-in knowledge tables.
    pub fn load_knowledge_json(&self, json: String) -> Result<(), CatalogError> {
        let knowledge = KnowledgeBase::from_json_str(&json)?;
        self.state.lock()?.set_knowledge(knowledge);
        Ok(())
    }

    pub fn is_loading(&self) -> Result<bool, CatalogError> {
        Ok(self.state.lock()?.is_loading())
    }

    pub fn error(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.state.lock()?.error().map(str::to_string))
    }

    pub fn clear_error(&self) -> Result<(), CatalogError> {
        self.state.lock()?.clear_error();
        Ok(())
    }

    // =====================================================================
    // Herb gallery
    // =====================================================================

    /// Replace the herb criteria and return the matching herbs in sort order.
    pub fn set_herb_filters(
        &self,
        filters: FfiHerbFilters,
    ) -> Result<Vec<FfiHerbSummary>, CatalogError> {
        let mut state = self.state.lock()?;
        state.set_herb_filters(filters.into());
        Ok(state.sorted_herbs().iter().map(FfiHerbSummary::from).collect())
    }

    pub fn reset_herb_filters(&self) -> Result<(), CatalogError> {
        self.state.lock()?.reset_herb_filters();
        Ok(())
    }

    /// Filtered herbs in the current sort order.
    pub fn herbs(&self) -> Result<Vec<FfiHerbSummary>, CatalogError> {
        let state = self.state.lock()?;
        Ok(state.sorted_herbs().iter().map(FfiHerbSummary::from).collect())
    }

    /// Select a sort key: `name`, `category` or `nature`.
    ///
    /// Selecting the active key flips the order.
    pub fn toggle_herb_sort(&self, key: String) -> Result<(), CatalogError> {
        let key = parse_sort_key(&key)?;
        self.state.lock()?.toggle_herb_sort(key);
        Ok(())
    }

    /// Full herb record as JSON.
    pub fn herb_json(&self, id: String) -> Result<String, CatalogError> {
        let state = self.state.lock()?;
        let herb = state
            .herb(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("Herb {}", id)))?;
        Ok(serde_json::to_string(herb)?)
    }

    // =====================================================================
    // Experts
    // =====================================================================

    /// Replace the expert criteria and return the matching experts.
    pub fn set_expert_filters(
        &self,
        filters: FfiExpertFilters,
    ) -> Result<Vec<FfiExpertSummary>, CatalogError> {
        let filters = ExpertFilters::try_from(filters)?;
        let mut state = self.state.lock()?;
        state.set_expert_filters(filters);
        Ok(state
            .filtered_experts()
            .iter()
            .map(FfiExpertSummary::from)
            .collect())
    }

    pub fn reset_expert_filters(&self) -> Result<(), CatalogError> {
        self.state.lock()?.reset_expert_filters();
        Ok(())
    }

    pub fn experts(&self) -> Result<Vec<FfiExpertSummary>, CatalogError> {
        let state = self.state.lock()?;
        Ok(state
            .filtered_experts()
            .iter()
            .map(FfiExpertSummary::from)
            .collect())
    }

    pub fn expert_json(&self, id: String) -> Result<String, CatalogError> {
        let state = self.state.lock()?;
        let expert = state
            .expert(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("Expert {}", id)))?;
        Ok(serde_json::to_string(expert)?)
    }

    // =====================================================================
    // View and selection
    // =====================================================================

    pub fn current_view(&self) -> Result<String, CatalogError> {
        Ok(self.state.lock()?.current_view().as_str().to_string())
    }

    pub fn set_current_view(&self, view: String) -> Result<(), CatalogError> {
        let view: View = view.parse().map_err(CatalogError::InvalidInput)?;
        self.state.lock()?.set_current_view(view);
        Ok(())
    }

    /// Select a herb by id, or clear the selection with `None`.
    pub fn select_herb(&self, id: Option<String>) -> Result<(), CatalogError> {
        let mut state = self.state.lock()?;
        match id {
            Some(id) => {
                if !state.select_herb_by_id(&id) {
                    return Err(CatalogError::NotFound(format!("Herb {}", id)));
                }
            }
            None => state.select_herb(None),
        }
        Ok(())
    }

    pub fn selected_herb_id(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.state.lock()?.selected_herb().map(|h| h.id.clone()))
    }

    pub fn select_expert(&self, id: Option<String>) -> Result<(), CatalogError> {
        let mut state = self.state.lock()?;
        match id {
            Some(id) => {
                if !state.select_expert_by_id(&id) {
                    return Err(CatalogError::NotFound(format!("Expert {}", id)));
                }
            }
            None => state.select_expert(None),
        }
        Ok(())
    }

    pub fn selected_expert_id(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.state.lock()?.selected_expert().map(|e| e.id.clone()))
    }

    /// Recently viewed herb ids, most recent first.
    pub fn view_history(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.state.lock()?.history().ids().to_vec())
    }

    pub fn clear_view_history(&self) -> Result<(), CatalogError> {
        self.state.lock()?.clear_history();
        Ok(())
    }

    // =====================================================================
    // Comparison
    // =====================================================================

    /// Returns false when the selection is full or already holds the herb.
    pub fn add_herb_to_compare(&self, id: String) -> Result<bool, CatalogError> {
        let mut state = self.state.lock()?;
        let herb = state
            .herb(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Herb {}", id)))?;
        Ok(state.add_herb_to_compare(&herb))
    }

    pub fn remove_herb_from_compare(&self, id: String) -> Result<bool, CatalogError> {
        Ok(self.state.lock()?.remove_herb_from_compare(&id))
    }

    pub fn clear_herb_compare(&self) -> Result<(), CatalogError> {
        self.state.lock()?.clear_herb_compare();
        Ok(())
    }

    pub fn herb_compare_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.state.lock()?.herb_compare().ids())
    }

    /// Attribute table of the selected herbs as JSON.
    pub fn herb_comparison_json(&self) -> Result<String, CatalogError> {
        let comparison = self.state.lock()?.herb_comparison();
        Ok(serde_json::to_string(&comparison)?)
    }

    pub fn add_expert_to_compare(&self, id: String) -> Result<bool, CatalogError> {
        let mut state = self.state.lock()?;
        let expert = state
            .expert(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Expert {}", id)))?;
        Ok(state.add_expert_to_compare(&expert))
    }

    pub fn remove_expert_from_compare(&self, id: String) -> Result<bool, CatalogError> {
        Ok(self.state.lock()?.remove_expert_from_compare(&id))
    }

    pub fn clear_expert_compare(&self) -> Result<(), CatalogError> {
        self.state.lock()?.clear_expert_compare();
        Ok(())
    }

    pub fn expert_compare_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.state.lock()?.expert_compare().ids())
    }

    /// Similarities and differences as JSON; `None` below two experts.
    pub fn expert_comparison_json(&self) -> Result<Option<String>, CatalogError> {
        let comparison = self.state.lock()?.expert_comparison();
        comparison
            .map(|c| serde_json::to_string(&c).map_err(CatalogError::from))
            .transpose()
    }

    // =====================================================================
    // Map and statistics
    // =====================================================================

    pub fn set_selected_provinces(&self, provinces: Vec<String>) -> Result<(), CatalogError> {
        self.state.lock()?.set_selected_provinces(provinces.as_slice());
        Ok(())
    }

    pub fn selected_provinces(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.state.lock()?.selected_provinces().to_vec())
    }

    pub fn province_distribution(&self) -> Result<Vec<FfiProvinceCount>, CatalogError> {
        let distribution = self.state.lock()?.province_distribution();
        Ok(distribution.into_iter().map(FfiProvinceCount::from).collect())
    }

    pub fn stats(&self) -> Result<FfiCatalogStats, CatalogError> {
        Ok(self.state.lock()?.stats().into())
    }

    // =====================================================================
    // Relationship network
    // =====================================================================

    /// Network filters seeded from configuration.
    pub fn default_network_filters(&self) -> Result<FfiNetworkFilters, CatalogError> {
        Ok(self.state.lock()?.default_network_filters().into())
    }

    /// Build and lay out the network.
    ///
    /// `viewport_width` picks the layout preset; `None` keeps the configured one.
    pub fn build_network(
        &self,
        filters: FfiNetworkFilters,
        viewport_width: Option<u32>,
    ) -> Result<FfiNetwork, CatalogError> {
        let filters = NetworkFilters::try_from(filters)?;
        let state = self.state.lock()?;
        let layout = match viewport_width {
            Some(width) => Viewport::for_width(width).params(),
            None => state.layout_params(),
        };
        let view = state.network_view(&filters, &layout);
        info!(
            nodes = view.network.nodes.len(),
            edges = view.network.edges.len(),
            "Network built"
        );
        Ok(FfiNetwork {
            nodes: view.positions.into_iter().map(FfiGraphNode::from).collect(),
            edges: view.network.edges.into_iter().map(FfiGraphEdge::from).collect(),
        })
    }
}

fn parse_sort_key(key: &str) -> Result<HerbSortKey, CatalogError> {
    match key {
        "name" => Ok(HerbSortKey::Name),
        "category" => Ok(HerbSortKey::Category),
        "nature" => Ok(HerbSortKey::Nature),
        other => Err(CatalogError::InvalidInput(format!(
            "unknown sort key: {}",
            other
        ))),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe herb criteria. Blank strings mean unset.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiHerbFilters {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub nature: Option<String>,
    pub taste: Option<String>,
    pub meridian: Option<String>,
    pub origin: Option<String>,
    pub chemical_component: Option<String>,
    pub pharmacological_action: Option<String>,
    pub quality_grade: Option<String>,
}

impl From<FfiHerbFilters> for HerbFilters {
    fn from(f: FfiHerbFilters) -> Self {
        HerbFilters {
            search_term: f.search_term,
            category: f.category,
            nature: f.nature,
            taste: f.taste,
            meridian: f.meridian,
            origin: f.origin,
            chemical_component: f.chemical_component,
            pharmacological_action: f.pharmacological_action,
            quality_grade: f.quality_grade,
        }
    }
}

/// FFI-safe expert criteria.
///
/// `experience_range` uses the "min-max" or open "min-" form; the two levels are
/// numeric text so an empty field can be passed through unchanged.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiExpertFilters {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
    pub specialty: Option<String>,
    pub region: Option<String>,
    pub mentor: Option<String>,
    pub lineage: Option<String>,
    pub inheritance_type: Option<String>,
    pub specialized_disease: Option<String>,
    pub clinical_strength: Option<String>,
    pub theoretical_contribution: Option<String>,
    pub experience_range: Option<String>,
    pub influence_level: Option<String>,
    pub reputation_level: Option<String>,
}

impl TryFrom<FfiExpertFilters> for ExpertFilters {
    type Error = CatalogError;

    fn try_from(f: FfiExpertFilters) -> Result<Self, Self::Error> {
        let experience_range = match f.experience_range.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(text.parse::<ExperienceRange>()?),
            _ => None,
        };
        let level = |text: Option<String>| -> Result<Option<f64>, CatalogError> {
            match text {
                Some(t) => Ok(parse_threshold(&t)?),
                None => Ok(None),
            }
        };
        Ok(ExpertFilters {
            search_term: f.search_term,
            category: f.category,
            school: f.school,
            grade: f.grade,
            specialty: f.specialty,
            region: f.region,
            mentor: f.mentor,
            lineage: f.lineage,
            inheritance_type: f.inheritance_type,
            specialized_disease: f.specialized_disease,
            clinical_strength: f.clinical_strength,
            theoretical_contribution: f.theoretical_contribution,
            experience_range,
            influence_level: level(f.influence_level)?,
            reputation_level: level(f.reputation_level)?,
        })
    }
}

/// FFI-safe herb gallery card.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHerbSummary {
    pub id: String,
    pub name: String,
    pub pinyin: String,
    pub category: String,
    pub nature: String,
    pub taste: Vec<String>,
    pub meridians: Vec<String>,
    pub origin: Vec<String>,
    pub primary_image: String,
}

impl From<&Herb> for FfiHerbSummary {
    fn from(herb: &Herb) -> Self {
        Self {
            id: herb.id.clone(),
            name: herb.name.clone(),
            pinyin: herb.pinyin.clone(),
            category: herb.category.clone(),
            nature: herb.nature.clone(),
            taste: herb.taste.clone(),
            meridians: herb.meridians.clone(),
            origin: herb.origin.clone(),
            primary_image: herb.primary_image.clone(),
        }
    }
}

/// FFI-safe expert list entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExpertSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub school: String,
    pub grade: String,
    pub specialty: Vec<String>,
    pub experience: u32,
    pub overall_rating: Option<f64>,
    pub primary_image: String,
}

impl From<&Expert> for FfiExpertSummary {
    fn from(expert: &Expert) -> Self {
        Self {
            id: expert.id.clone(),
            name: expert.name.clone(),
            category: expert.category.clone(),
            school: expert.school.clone(),
            grade: expert.grade.clone(),
            specialty: expert.specialty.clone(),
            experience: expert.experience,
            overall_rating: expert.overall_rating(),
            primary_image: expert.primary_image.clone(),
        }
    }
}

/// FFI-safe herb collection summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCatalogStats {
    pub total: u32,
    pub categories: u32,
    pub provinces: u32,
}

impl From<CatalogStats> for FfiCatalogStats {
    fn from(stats: CatalogStats) -> Self {
        Self {
            total: stats.total as u32,
            categories: stats.categories as u32,
            provinces: stats.provinces as u32,
        }
    }
}

/// FFI-safe province entry of the origin map.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProvinceCount {
    pub province: String,
    pub herb_count: u32,
    pub herbs: Vec<String>,
}

impl From<ProvinceCount> for FfiProvinceCount {
    fn from(count: ProvinceCount) -> Self {
        Self {
            province: count.province,
            herb_count: count.herb_count as u32,
            herbs: count.herbs,
        }
    }
}

/// FFI-safe network filters. Kinds use their wire names, e.g. `treatmentDomain`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNetworkFilters {
    pub node_kinds: Vec<String>,
    pub relation_kinds: Vec<String>,
    pub importance_min: f64,
    pub connections_min: u32,
    pub search_term: Option<String>,
}

impl From<NetworkFilters> for FfiNetworkFilters {
    fn from(f: NetworkFilters) -> Self {
        Self {
            node_kinds: f.node_kinds.iter().map(|k| k.as_str().to_string()).collect(),
            relation_kinds: f
                .relation_kinds
                .iter()
                .map(|r| r.as_str().to_string())
                .collect(),
            importance_min: f.importance_min,
            connections_min: f.connections_min as u32,
            search_term: f.search_term,
        }
    }
}

impl TryFrom<FfiNetworkFilters> for NetworkFilters {
    type Error = CatalogError;

    fn try_from(f: FfiNetworkFilters) -> Result<Self, Self::Error> {
        let node_kinds = f
            .node_kinds
            .iter()
            .map(|k| k.parse::<NodeKind>())
            .collect::<Result<_, _>>()
            .map_err(CatalogError::InvalidInput)?;
        let relation_kinds = f
            .relation_kinds
            .iter()
            .map(|r| r.parse::<RelationKind>())
            .collect::<Result<_, _>>()
            .map_err(CatalogError::InvalidInput)?;
        Ok(NetworkFilters {
            node_kinds,
            relation_kinds,
            importance_min: f.importance_min,
            connections_min: f.connections_min as usize,
            search_term: f.search_term,
        })
    }
}

/// FFI-safe positioned network node.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGraphNode {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub importance: f64,
    pub connections: u32,
    pub color: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

impl From<PositionedNode> for FfiGraphNode {
    fn from(p: PositionedNode) -> Self {
        Self {
            id: p.node.id,
            kind: p.node.kind.as_str().to_string(),
            name: p.node.name,
            category: p.node.category,
            description: p.node.description,
            importance: p.node.importance,
            connections: p.node.connections as u32,
            color: p.node.style.color,
            size: p.node.style.size,
            x: p.x,
            y: p.y,
        }
    }
}

/// FFI-safe network edge.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: String,
    pub strength: f64,
    pub description: String,
    pub color: String,
    pub width: f64,
}

impl From<GraphEdge> for FfiGraphEdge {
    fn from(e: GraphEdge) -> Self {
        Self {
            id: e.id,
            source: e.source,
            target: e.target,
            relation: e.relation.as_str().to_string(),
            strength: e.strength,
            description: e.description,
            color: e.style.color,
            width: e.style.width,
        }
    }
}

/// FFI-safe laid-out network.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNetwork {
    pub nodes: Vec<FfiGraphNode>,
    pub edges: Vec<FfiGraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERBS: &str = r#"[
        {"id": "h1", "name": "人参", "category": "补虚药", "nature": "微温", "origin": ["吉林省"]},
        {"id": "h2", "name": "黄连", "category": "清热药", "nature": "寒", "origin": ["四川"]}
    ]"#;

    fn catalog() -> Arc<TcmCatalog> {
        let catalog = open_catalog_in_memory().unwrap();
        catalog.load_herbs_json(HERBS.to_string()).unwrap();
        catalog
    }

    #[test]
    fn test_herb_filters_through_ffi() {
        let catalog = catalog();
        let herbs = catalog
            .set_herb_filters(FfiHerbFilters {
                nature: Some("寒".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(herbs.len(), 1);
        assert_eq!(herbs[0].id, "h2");

        catalog.reset_herb_filters().unwrap();
        assert_eq!(catalog.herbs().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_expert_filters_rejected() {
        let catalog = catalog();
        let result = catalog.set_expert_filters(FfiExpertFilters {
            experience_range: Some("lots".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));

        let result = catalog.set_expert_filters(FfiExpertFilters {
            influence_level: Some("".into()),
            experience_range: Some(" ".into()),
            ..Default::default()
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_selection_and_history() {
        let catalog = catalog();
        catalog.select_herb(Some("h2".into())).unwrap();
        catalog.select_herb(Some("h1".into())).unwrap();
        assert_eq!(catalog.view_history().unwrap(), vec!["h1", "h2"]);
        assert!(matches!(
            catalog.select_herb(Some("missing".into())),
            Err(CatalogError::NotFound(_))
        ));

        catalog.select_herb(None).unwrap();
        assert_eq!(catalog.selected_herb_id().unwrap(), None);
    }

    #[test]
    fn test_view_round_trip() {
        let catalog = catalog();
        assert_eq!(catalog.current_view().unwrap(), "experts");
        catalog.set_current_view("expert-compare".into()).unwrap();
        assert_eq!(catalog.current_view().unwrap(), "expert-compare");
        assert!(catalog.set_current_view("settings".into()).is_err());
    }

    #[test]
    fn test_compare_unknown_herb() {
        let catalog = catalog();
        assert!(catalog.add_herb_to_compare("h1".into()).unwrap());
        assert!(!catalog.add_herb_to_compare("h1".into()).unwrap());
        assert!(matches!(
            catalog.add_herb_to_compare("missing".into()),
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(catalog.herb_compare_ids().unwrap(), vec!["h1"]);
        assert!(catalog.expert_comparison_json().unwrap().is_none());
    }

    #[test]
    fn test_stats_and_provinces() {
        let catalog = catalog();
        let stats = catalog.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.provinces, 2);
        catalog
            .set_selected_provinces(vec!["吉林省".into()])
            .unwrap();
        assert_eq!(catalog.selected_provinces().unwrap(), vec!["吉林"]);
    }

    #[test]
    fn test_network_filters_round_trip() {
        let catalog = catalog();
        let filters = catalog.default_network_filters().unwrap();
        assert!(filters.node_kinds.contains(&"treatmentDomain".to_string()));

        let network = catalog.build_network(filters, Some(500)).unwrap();
        assert!(network.nodes.iter().any(|n| n.id == "h1"));

        let bad = FfiNetworkFilters {
            node_kinds: vec!["syndrome".into()],
            relation_kinds: Vec::new(),
            importance_min: 0.0,
            connections_min: 0,
            search_term: None,
        };
        assert!(matches!(
            catalog.build_network(bad, None),
            Err(CatalogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_toggle_sort() {
        let catalog = catalog();
        catalog.toggle_herb_sort("name".into()).unwrap();
        let ids: Vec<String> = catalog.herbs().unwrap().into_iter().map(|h| h.id).collect();
        // Name was already active, so the order flips to descending
        assert_eq!(ids, vec!["h2", "h1"]);
        assert!(catalog.toggle_herb_sort("price".into()).is_err());
    }
}
