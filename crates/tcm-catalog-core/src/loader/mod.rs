//! Collection loading.
//!
//! Each collection is a JSON array of records. A [`DataSource`] supplies the
//! raw collections; the state container decides what a failure means.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataConfig;
use crate::graph::{KnowledgeBase, KnowledgeError};
use crate::models::{Expert, Formula, Herb};

/// Loader errors.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Collection not available: {0}")]
    Missing(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("{0}")]
    Source(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Supplier of the catalog collections.
pub trait DataSource {
    fn load_herbs(&self) -> LoadResult<Vec<Herb>>;

    fn load_experts(&self) -> LoadResult<Vec<Expert>>;

    fn load_formulas(&self) -> LoadResult<Vec<Formula>>;

    /// Association tables for the graph. `Ok(None)` means use the defaults.
    fn load_knowledge(&self) -> LoadResult<Option<KnowledgeBase>> {
        Ok(None)
    }
}

/// Parse a JSON array of records.
pub fn parse_collection<T: DeserializeOwned>(json: &str) -> LoadResult<Vec<T>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads collections from JSON files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    files: DataConfig,
}

impl DirectorySource {
    /// Source using the default file names under `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            files: DataConfig {
                directory: directory.into(),
                ..Default::default()
            },
        }
    }

    pub fn from_config(files: DataConfig) -> Self {
        Self { files }
    }

    pub fn directory(&self) -> &Path {
        &self.files.directory
    }

    fn path(&self, file: &str) -> PathBuf {
        self.files.directory.join(file)
    }

    fn read(&self, file: &str) -> LoadResult<String> {
        let path = self.path(file);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::Missing(path.display().to_string())
            } else {
                LoadError::Io { path, source }
            }
        })
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> LoadResult<Vec<T>> {
        let items: Vec<T> = parse_collection(&self.read(file)?)?;
        info!(file, count = items.len(), "Loaded collection");
        Ok(items)
    }
}

impl DataSource for DirectorySource {
    fn load_herbs(&self) -> LoadResult<Vec<Herb>> {
        self.load(&self.files.herbs_file)
    }

    fn load_experts(&self) -> LoadResult<Vec<Expert>> {
        self.load(&self.files.experts_file)
    }

    fn load_formulas(&self) -> LoadResult<Vec<Formula>> {
        self.load(&self.files.formulas_file)
    }

    fn load_knowledge(&self) -> LoadResult<Option<KnowledgeBase>> {
        match self.read(&self.files.knowledge_file) {
            Ok(json) => Ok(Some(KnowledgeBase::from_json_str(&json)?)),
            Err(LoadError::Missing(path)) => {
                debug!(path = %path, "No knowledge file, using built-in tables");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// In-memory source, handy for embedding fixed datasets.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub herbs: Vec<Herb>,
    pub experts: Vec<Expert>,
    pub formulas: Vec<Formula>,
    pub knowledge: Option<KnowledgeBase>,
}

impl DataSource for StaticSource {
    fn load_herbs(&self) -> LoadResult<Vec<Herb>> {
        Ok(self.herbs.clone())
    }

    fn load_experts(&self) -> LoadResult<Vec<Expert>> {
        Ok(self.experts.clone())
    }

    fn load_formulas(&self) -> LoadResult<Vec<Formula>> {
        Ok(self.formulas.clone())
    }

    fn load_knowledge(&self) -> LoadResult<Option<KnowledgeBase>> {
        Ok(self.knowledge.clone())
    }
}
