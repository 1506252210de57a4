//! Catalog configuration.
//!
//! Read from an optional TOML file. Every key is optional; anything left out
//! keeps its built-in default.
//!
//! ```toml
//! [data]
//! directory = "public/data"
//!
//! [storage]
//! database_path = "catalog.db"
//!
//! [history]
//! capacity = 20
//!
//! [network]
//! herb_node_limit = 20
//! ingredient_limit = 6
//! importance_min = 1
//! connections_min = 0
//!
//! [layout]
//! viewport = "desktop"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::graph::{NetworkFilters, Viewport, DEFAULT_HERB_NODE_LIMIT, DEFAULT_INGREDIENT_LIMIT};
use crate::state::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogConfig {
    pub data: DataConfig,
    pub storage: StorageConfig,
    pub history: HistoryConfig,
    pub network: NetworkConfig,
    pub layout: LayoutConfig,
}

/// Where the JSON collections live.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub directory: PathBuf,
    pub herbs_file: String,
    pub experts_file: String,
    pub formulas_file: String,
    pub knowledge_file: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub herb_node_limit: usize,
    pub ingredient_limit: usize,
    pub importance_min: f64,
    pub connections_min: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutConfig {
    pub viewport: Viewport,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    storage: Option<RawStorage>,
    history: Option<RawHistory>,
    network: Option<RawNetwork>,
    layout: Option<RawLayout>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    directory: Option<PathBuf>,
    herbs_file: Option<String>,
    experts_file: Option<String>,
    formulas_file: Option<String>,
    knowledge_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    database_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawNetwork {
    herb_node_limit: Option<usize>,
    ingredient_limit: Option<usize>,
    importance_min: Option<f64>,
    connections_min: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    viewport: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            herbs_file: "herbs.json".to_string(),
            experts_file: "experts.json".to_string(),
            formulas_file: "formulas.json".to_string(),
            knowledge_file: "knowledge.json".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            herb_node_limit: DEFAULT_HERB_NODE_LIMIT,
            ingredient_limit: DEFAULT_INGREDIENT_LIMIT,
            importance_min: 1.0,
            connections_min: 0,
        }
    }
}

impl NetworkConfig {
    /// Default network filters with the configured thresholds.
    pub fn filters(&self) -> NetworkFilters {
        NetworkFilters {
            importance_min: self.importance_min,
            connections_min: self.connections_min,
            ..Default::default()
        }
    }
}

impl CatalogConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let data = match raw.data {
            Some(d) => DataConfig {
                directory: d.directory.unwrap_or(defaults.data.directory),
                herbs_file: d.herbs_file.unwrap_or(defaults.data.herbs_file),
                experts_file: d.experts_file.unwrap_or(defaults.data.experts_file),
                formulas_file: d.formulas_file.unwrap_or(defaults.data.formulas_file),
                knowledge_file: d.knowledge_file.unwrap_or(defaults.data.knowledge_file),
            },
            None => defaults.data,
        };

        let storage = StorageConfig {
            database_path: raw.storage.and_then(|s| s.database_path),
        };

        let history = HistoryConfig {
            capacity: raw
                .history
                .and_then(|h| h.capacity)
                .unwrap_or(defaults.history.capacity),
        };

        let network = match raw.network {
            Some(n) => NetworkConfig {
                herb_node_limit: n.herb_node_limit.unwrap_or(defaults.network.herb_node_limit),
                ingredient_limit: n
                    .ingredient_limit
                    .unwrap_or(defaults.network.ingredient_limit),
                importance_min: n.importance_min.unwrap_or(defaults.network.importance_min),
                connections_min: n.connections_min.unwrap_or(defaults.network.connections_min),
            },
            None => defaults.network,
        };

        let viewport = match raw.layout.and_then(|l| l.viewport) {
            Some(text) => text.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Invalid layout viewport, using desktop");
                Viewport::default()
            }),
            None => Viewport::default(),
        };

        Ok(Self {
            data,
            storage,
            history,
            network,
            layout: LayoutConfig { viewport },
        })
    }

    pub fn herbs_path(&self) -> PathBuf {
        self.data.directory.join(&self.data.herbs_file)
    }

    pub fn experts_path(&self) -> PathBuf {
        self.data.directory.join(&self.data.experts_file)
    }

    pub fn formulas_path(&self) -> PathBuf {
        self.data.directory.join(&self.data.formulas_file)
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.data.directory.join(&self.data.knowledge_file)
    }
}
