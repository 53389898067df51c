//! Local catalog of known scholars, loaded from a static JSON file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text_utils::is_valid_orcid;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A known scholar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholar {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub works_hint: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    scholars: Vec<Scholar>,
}

impl Catalog {
    pub fn new(scholars: Vec<Scholar>) -> Self {
        Self { scholars }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scholars = serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { scholars })
    }

    pub fn scholars(&self) -> &[Scholar] {
        &self.scholars
    }

    pub fn len(&self) -> usize {
        self.scholars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scholars.is_empty()
    }

    /// Find a scholar by name.
    ///
    /// Exact (case-insensitive) name or alias matches win; otherwise the first
    /// scholar whose name contains the query is returned.
    pub fn find(&self, name: &str) -> Option<&Scholar> {
        let q = name.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }

        self.scholars
            .iter()
            .find(|s| s.name.to_lowercase() == q || s.aliases.iter().any(|a| a.to_lowercase() == q))
            .or_else(|| self.scholars.iter().find(|s| s.name.to_lowercase().contains(&q)))
    }

    /// Entries whose ORCID is present but malformed, as `(name, orcid)` pairs.
    pub fn invalid_orcids(&self) -> Vec<(String, String)> {
        self.scholars
            .iter()
            .filter_map(|s| {
                let orcid = s.orcid.as_deref()?;
                (!is_valid_orcid(orcid)).then(|| (s.name.clone(), orcid.to_string()))
            })
            .collect()
    }
}

/// Lazily loads the catalog on first use and keeps it for the life of the store.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    cell: OnceCell<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// A store that is already populated, bypassing the filesystem.
    pub fn preloaded(catalog: Catalog) -> Self {
        Self {
            path: PathBuf::new(),
            cell: OnceCell::with_value(Arc::new(catalog)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The memoized catalog. An unreadable file yields an empty catalog.
    pub fn get(&self) -> Arc<Catalog> {
        self.cell
            .get_or_init(|| match Catalog::load(&self.path) {
                Ok(catalog) => {
                    tracing::info!(path = %self.path.display(), scholars = catalog.len(), "loaded scholar catalog");
                    Arc::new(catalog)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "scholar catalog unavailable, continuing with an empty catalog");
                    Arc::new(Catalog::default())
                }
            })
            .clone()
    }
}
