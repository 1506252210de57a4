//! Application state container.
//!
//! Holds the raw collections and everything derived from them. Filtered views
//! are recomputed from the full collections on every mutation, so readers
//! never see a stale view.

mod history;

pub use history::*;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::compare::{ComparisonSet, ExpertComparison, HerbComparison};
use crate::config::{CatalogConfig, NetworkConfig};
use crate::db::{Database, DbResult};
use crate::filter::{
    filter_experts, filter_herbs, sort_herbs, ExpertFilters, HerbFilters, HerbSort, HerbSortKey,
};
use crate::graph::{
    GraphBuilder, KnowledgeBase, LayoutParams, Network, NetworkFilters, PositionedNode,
};
use crate::loader::DataSource;
use crate::models::{Expert, Formula, Herb, View};
use crate::province::{normalize_province_list, normalize_short, province_distribution, ProvinceCount};

/// Herb collection summary.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    /// Distinct categories
    pub categories: usize,
    /// Distinct normalised origin provinces
    pub provinces: usize,
}

/// A network plus node positions for one layout.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NetworkView {
    pub network: Network,
    pub positions: Vec<PositionedNode>,
}

/// Single-writer state for one catalog session.
#[derive(Debug, Default)]
pub struct AppState {
    herbs: Vec<Herb>,
    experts: Vec<Expert>,
    formulas: Option<Vec<Formula>>,

    herb_filters: HerbFilters,
    expert_filters: ExpertFilters,
    herb_sort: HerbSort,
    filtered_herbs: Vec<Herb>,
    filtered_experts: Vec<Expert>,

    herb_compare: ComparisonSet<Herb>,
    expert_compare: ComparisonSet<Expert>,

    current_view: View,
    selected_herb: Option<Herb>,
    selected_expert: Option<Expert>,
    history: ViewHistory,
    selected_provinces: Vec<String>,

    loading: bool,
    error: Option<String>,

    knowledge: KnowledgeBase,
    network_config: NetworkConfig,
    layout: LayoutParams,
    database: Option<Database>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State configured from `config`.
    ///
    /// Storage lives in memory unless a database path is configured.
    pub fn from_config(config: &CatalogConfig) -> DbResult<Self> {
        let mut state = Self {
            history: ViewHistory::with_capacity(config.history.capacity),
            network_config: config.network.clone(),
            layout: config.layout.viewport.params(),
            ..Default::default()
        };
        let db = match &config.storage.database_path {
            Some(path) => Database::open(path)?,
            None => Database::open_in_memory()?,
        };
        state.attach_database(db)?;
        Ok(state)
    }

    /// Attach storage and restore the persisted view history.
    pub fn attach_database(&mut self, db: Database) -> DbResult<()> {
        let ids = db.load_history()?;
        self.history = ViewHistory::from_ids(ids, self.history.capacity());
        self.database = Some(db);
        Ok(())
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    // ---------------------------------------------------------------------
    // Collections
    // ---------------------------------------------------------------------

    pub fn set_herbs(&mut self, herbs: Vec<Herb>) {
        self.herbs = herbs;
        self.refilter_herbs();
    }

    pub fn set_experts(&mut self, experts: Vec<Expert>) {
        self.experts = experts;
        self.refilter_experts();
    }

    /// Replace the formulas and refresh the stored formula cache.
    pub fn set_formulas(&mut self, formulas: Vec<Formula>) {
        if let Some(db) = &self.database {
            if let Err(e) = db.store_formulas(&formulas) {
                warn!(error = %e, "Failed to cache formulas");
            }
        }
        self.formulas = Some(formulas);
    }

    pub fn set_knowledge(&mut self, knowledge: KnowledgeBase) {
        self.knowledge = knowledge;
    }

    pub fn herbs(&self) -> &[Herb] {
        &self.herbs
    }

    pub fn experts(&self) -> &[Expert] {
        &self.experts
    }

    /// Loaded formulas, falling back to the stored cache.
    pub fn formulas(&self) -> Option<Vec<Formula>> {
        match &self.formulas {
            Some(formulas) => Some(formulas.clone()),
            None => self.database.as_ref().and_then(Database::cached_formulas),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Load every collection from `source`.
    ///
    /// A failed collection is left empty and reported through [`Self::error`].
    /// Formula and knowledge failures only degrade the network view.
    pub fn load_from(&mut self, source: &dyn DataSource) {
        self.loading = true;
        self.error = None;
        let mut errors = Vec::new();

        match source.load_herbs() {
            Ok(herbs) => self.set_herbs(herbs),
            Err(e) => {
                warn!(error = %e, "Failed to load herbs");
                self.set_herbs(Vec::new());
                errors.push(format!("Failed to load herbs data: {e}"));
            }
        }

        match source.load_experts() {
            Ok(experts) => self.set_experts(experts),
            Err(e) => {
                warn!(error = %e, "Failed to load experts");
                self.set_experts(Vec::new());
                errors.push(format!("Failed to load experts data: {e}"));
            }
        }

        match source.load_formulas() {
            Ok(formulas) => self.set_formulas(formulas),
            Err(e) => warn!(error = %e, "Failed to load formulas, network view degraded"),
        }

        match source.load_knowledge() {
            Ok(Some(knowledge)) => self.knowledge = knowledge,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load knowledge base, using built-in tables"),
        }

        info!(
            herbs = self.herbs.len(),
            experts = self.experts.len(),
            "Catalog loaded"
        );

        if !errors.is_empty() {
            self.error = Some(errors.join("; "));
        }
        self.loading = false;
    }

    // ---------------------------------------------------------------------
    // Filtering
    // ---------------------------------------------------------------------

    /// Modify herb criteria in place and refilter.
    pub fn update_herb_filters(&mut self, update: impl FnOnce(&mut HerbFilters)) {
        update(&mut self.herb_filters);
        self.refilter_herbs();
    }

    pub fn update_expert_filters(&mut self, update: impl FnOnce(&mut ExpertFilters)) {
        update(&mut self.expert_filters);
        self.refilter_experts();
    }

    pub fn set_herb_filters(&mut self, filters: HerbFilters) {
        self.update_herb_filters(|f| *f = filters);
    }

    pub fn set_expert_filters(&mut self, filters: ExpertFilters) {
        self.update_expert_filters(|f| *f = filters);
    }

    pub fn reset_herb_filters(&mut self) {
        self.set_herb_filters(HerbFilters::default());
    }

    pub fn reset_expert_filters(&mut self) {
        self.set_expert_filters(ExpertFilters::default());
    }

    pub fn herb_filters(&self) -> &HerbFilters {
        &self.herb_filters
    }

    pub fn expert_filters(&self) -> &ExpertFilters {
        &self.expert_filters
    }

    /// Herbs matching the current criteria, in collection order.
    pub fn filtered_herbs(&self) -> &[Herb] {
        &self.filtered_herbs
    }

    pub fn filtered_experts(&self) -> &[Expert] {
        &self.filtered_experts
    }

    pub fn herb_sort(&self) -> HerbSort {
        self.herb_sort
    }

    pub fn set_herb_sort(&mut self, sort: HerbSort) {
        self.herb_sort = sort;
    }

    pub fn toggle_herb_sort(&mut self, key: HerbSortKey) {
        self.herb_sort = self.herb_sort.toggle(key);
    }

    /// Filtered herbs in the current sort order.
    pub fn sorted_herbs(&self) -> Vec<Herb> {
        let mut herbs = self.filtered_herbs.clone();
        sort_herbs(&mut herbs, self.herb_sort);
        herbs
    }

    fn refilter_herbs(&mut self) {
        self.filtered_herbs = filter_herbs(&self.herbs, &self.herb_filters);
    }

    fn refilter_experts(&mut self) {
        self.filtered_experts = filter_experts(&self.experts, &self.expert_filters);
    }

    // ---------------------------------------------------------------------
    // View and selection
    // ---------------------------------------------------------------------

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn set_current_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn selected_herb(&self) -> Option<&Herb> {
        self.selected_herb.as_ref()
    }

    pub fn selected_expert(&self) -> Option<&Expert> {
        self.selected_expert.as_ref()
    }

    /// Select a herb (or clear with `None`), recording it in the view history.
    pub fn select_herb(&mut self, herb: Option<Herb>) {
        if let Some(herb) = &herb {
            self.history.record(&herb.id);
            self.persist_history();
        }
        self.selected_herb = herb;
    }

    /// Select the herb with `id`. Returns false when it is not loaded.
    pub fn select_herb_by_id(&mut self, id: &str) -> bool {
        match self.herb(id).cloned() {
            Some(herb) => {
                self.select_herb(Some(herb));
                true
            }
            None => false,
        }
    }

    pub fn select_expert(&mut self, expert: Option<Expert>) {
        self.selected_expert = expert;
    }

    pub fn select_expert_by_id(&mut self, id: &str) -> bool {
        match self.expert(id).cloned() {
            Some(expert) => {
                self.select_expert(Some(expert));
                true
            }
            None => false,
        }
    }

    pub fn herb(&self, id: &str) -> Option<&Herb> {
        self.herbs.iter().find(|h| h.id == id)
    }

    pub fn expert(&self, id: &str) -> Option<&Expert> {
        self.experts.iter().find(|e| e.id == id)
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    fn persist_history(&self) {
        if let Some(db) = &self.database {
            if let Err(e) = db.store_history(self.history.ids()) {
                warn!(error = %e, "Failed to persist view history");
            }
        }
    }

    // ---------------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------------

    pub fn add_herb_to_compare(&mut self, herb: &Herb) -> bool {
        self.herb_compare.add(herb)
    }

    pub fn remove_herb_from_compare(&mut self, id: &str) -> bool {
        self.herb_compare.remove(id)
    }

    pub fn clear_herb_compare(&mut self) {
        self.herb_compare.clear();
    }

    pub fn herb_compare(&self) -> &ComparisonSet<Herb> {
        &self.herb_compare
    }

    pub fn herb_comparison(&self) -> HerbComparison {
        HerbComparison::from_herbs(self.herb_compare.items())
    }

    pub fn add_expert_to_compare(&mut self, expert: &Expert) -> bool {
        self.expert_compare.add(expert)
    }

    pub fn remove_expert_from_compare(&mut self, id: &str) -> bool {
        self.expert_compare.remove(id)
    }

    pub fn clear_expert_compare(&mut self) {
        self.expert_compare.clear();
    }

    pub fn expert_compare(&self) -> &ComparisonSet<Expert> {
        &self.expert_compare
    }

    pub fn expert_comparison(&self) -> Option<ExpertComparison> {
        ExpertComparison::from_experts(self.expert_compare.items())
    }

    // ---------------------------------------------------------------------
    // Map, status and statistics
    // ---------------------------------------------------------------------

    /// Store the provinces selected on the map, in short form.
    pub fn set_selected_provinces<S: AsRef<str>>(&mut self, provinces: &[S]) {
        self.selected_provinces = normalize_province_list(provinces);
    }

    pub fn selected_provinces(&self) -> &[String] {
        &self.selected_provinces
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn stats(&self) -> CatalogStats {
        let categories: HashSet<&str> = self.herbs.iter().map(|h| h.category.as_str()).collect();
        let provinces: HashSet<String> = self
            .herbs
            .iter()
            .flat_map(|h| h.origin.iter())
            .map(|o| normalize_short(o))
            .filter(|p| !p.is_empty())
            .collect();
        CatalogStats {
            total: self.herbs.len(),
            categories: categories.len(),
            provinces: provinces.len(),
        }
    }

    pub fn province_distribution(&self) -> Vec<ProvinceCount> {
        province_distribution(&self.herbs)
    }

    // ---------------------------------------------------------------------
    // Network
    // ---------------------------------------------------------------------

    /// Network filters seeded with the configured thresholds.
    pub fn default_network_filters(&self) -> NetworkFilters {
        self.network_config.filters()
    }

    pub fn layout_params(&self) -> LayoutParams {
        self.layout
    }

    pub fn set_layout_params(&mut self, layout: LayoutParams) {
        self.layout = layout;
    }

    /// Build the relationship graph from the full collections.
    pub fn build_network(&self, filters: &NetworkFilters) -> Network {
        let formulas = self.formulas();
        GraphBuilder::new(&self.knowledge)
            .with_limits(
                self.network_config.herb_node_limit,
                self.network_config.ingredient_limit,
            )
            .build(&self.experts, formulas.as_deref(), &self.herbs, filters)
    }

    /// Build the graph and lay it out with `layout`.
    pub fn network_view(&self, filters: &NetworkFilters, layout: &LayoutParams) -> NetworkView {
        let network = self.build_network(filters);
        let positions = network.layout(layout);
        NetworkView { network, positions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadError, LoadResult, StaticSource};

    fn herb(id: &str, name: &str, category: &str, origin: &[&str]) -> Herb {
        let mut h = Herb::new(id, name);
        h.category = category.into();
        h.origin = origin.iter().map(|o| o.to_string()).collect();
        h
    }

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        state.set_herbs(vec![
            herb("h1", "人参", "补虚药", &["吉林省"]),
            herb("h2", "甘草", "补虚药", &["内蒙古", "甘肃"]),
            herb("h3", "黄连", "清热药", &["四川"]),
        ]);
        state.set_experts(vec![Expert::new("expert_1", "邓铁涛"), Expert::new("expert_2", "路志正")]);
        state
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn load_herbs(&self) -> LoadResult<Vec<Herb>> {
            Err(LoadError::Source("HTTP 500".into()))
        }

        fn load_experts(&self) -> LoadResult<Vec<Expert>> {
            Ok(vec![Expert::new("expert_1", "邓铁涛")])
        }

        fn load_formulas(&self) -> LoadResult<Vec<Formula>> {
            Err(LoadError::Missing("formulas.json".into()))
        }
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert_eq!(state.current_view(), View::Experts);
        assert!(state.filtered_herbs().is_empty());
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_filters_reapply_on_data_change() {
        let mut state = sample_state();
        state.update_herb_filters(|f| f.category = Some("补虚药".into()));
        assert_eq!(state.filtered_herbs().len(), 2);

        state.set_herbs(vec![herb("h9", "黄芪", "补虚药", &[])]);
        assert_eq!(state.filtered_herbs().len(), 1);

        state.reset_herb_filters();
        assert!(state.herb_filters().is_empty());
    }

    #[test]
    fn test_sorted_herbs_leave_filtered_order() {
        let mut state = sample_state();
        state.toggle_herb_sort(HerbSortKey::Category);
        let sorted: Vec<String> = state.sorted_herbs().into_iter().map(|h| h.id).collect();
        assert_eq!(sorted, vec!["h3", "h1", "h2"]);
        assert_eq!(state.filtered_herbs()[0].id, "h1");
    }

    #[test]
    fn test_select_herb_records_history() {
        let mut state = sample_state();
        assert!(state.select_herb_by_id("h1"));
        assert!(state.select_herb_by_id("h2"));
        assert!(state.select_herb_by_id("h1"));
        assert!(!state.select_herb_by_id("missing"));

        assert_eq!(state.history().ids(), ["h1", "h2"]);
        assert_eq!(state.selected_herb().map(|h| h.id.as_str()), Some("h1"));

        state.select_herb(None);
        assert!(state.selected_herb().is_none());
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_selecting_expert_leaves_history_alone() {
        let mut state = sample_state();
        assert!(state.select_expert_by_id("expert_2"));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_history_persists_through_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let mut state = sample_state();
        state.attach_database(Database::open(&path).unwrap()).unwrap();
        state.select_herb_by_id("h3");
        state.select_herb_by_id("h2");

        let mut restored = AppState::new();
        restored
            .attach_database(Database::open(&path).unwrap())
            .unwrap();
        assert_eq!(restored.history().ids(), ["h2", "h3"]);
    }

    #[test]
    fn test_from_config_defaults_to_memory_storage() {
        let config = CatalogConfig::from_toml_str("[history]\ncapacity = 2").unwrap();
        let mut state = AppState::from_config(&config).unwrap();
        assert!(state.database().is_some());

        state.set_herbs(sample_state().herbs().to_vec());
        for id in ["h1", "h2", "h3"] {
            state.select_herb_by_id(id);
        }
        assert_eq!(state.history().ids(), ["h3", "h2"]);
    }

    #[test]
    fn test_independent_compare_sets() {
        let mut state = sample_state();
        let h1 = state.herb("h1").cloned().unwrap();
        let e1 = state.expert("expert_1").cloned().unwrap();

        assert!(state.add_herb_to_compare(&h1));
        assert!(!state.add_herb_to_compare(&h1));
        assert!(state.add_expert_to_compare(&e1));
        assert_eq!(state.herb_compare().len(), 1);
        assert_eq!(state.expert_compare().len(), 1);
        assert!(state.expert_comparison().is_none());

        state.clear_herb_compare();
        assert!(state.herb_compare().is_empty());
        assert_eq!(state.expert_compare().len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut state = sample_state();
        let mut dup = herb("h4", "党参", "补虚药", &["吉林"]);
        dup.origin.push("甘肃省".into());
        let mut herbs = state.herbs().to_vec();
        herbs.push(dup);
        state.set_herbs(herbs);

        assert_eq!(
            state.stats(),
            CatalogStats {
                total: 4,
                categories: 2,
                provinces: 4,
            }
        );
        assert_eq!(state.province_distribution()[0].herb_count, 2);
    }

    #[test]
    fn test_selected_provinces_normalised() {
        let mut state = AppState::new();
        state.set_selected_provinces(&["吉林省", "广西壮族自治区"][..]);
        assert_eq!(state.selected_provinces(), ["吉林", "广西"]);
    }

    #[test]
    fn test_load_failure_sets_error() {
        let mut state = sample_state();
        state.load_from(&FailingSource);

        assert!(state.herbs().is_empty());
        assert_eq!(state.experts().len(), 1);
        assert!(state.error().is_some_and(|e| e.contains("herbs")));
        assert!(!state.is_loading());
        assert!(state.formulas().is_none());

        state.clear_error();
        assert!(state.error().is_none());
    }

    #[test]
    fn test_load_from_static_source() {
        let source = StaticSource {
            herbs: vec![herb("h1", "人参", "补虚药", &[])],
            formulas: vec![Formula::new("formula_1", "四君子汤")],
            ..Default::default()
        };
        let mut state = AppState::new();
        state.set_error("stale");
        state.load_from(&source);

        assert!(state.error().is_none());
        assert_eq!(state.filtered_herbs().len(), 1);
        assert_eq!(state.formulas().map(|f| f.len()), Some(1));
    }

    #[test]
    fn test_formula_cache_backs_network() {
        let db = Database::open_in_memory().unwrap();
        db.store_formulas(&[Formula::new("formula_1", "四君子汤")]).unwrap();

        let mut state = AppState::new();
        state.attach_database(db).unwrap();
        let network = state.build_network(&NetworkFilters::default());
        assert!(network.node("formula_1").is_some());
    }

    #[test]
    fn test_network_view_positions_every_node() {
        let state = sample_state();
        let view = state.network_view(&NetworkFilters::default(), &state.layout_params());
        assert_eq!(view.positions.len(), view.network.nodes.len());
        assert!(view.network.node("expert_1").is_some());
    }
}
