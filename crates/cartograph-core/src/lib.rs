use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cartography;
pub mod catalog;
pub mod config_file;
pub mod harvest;
pub mod pipeline;
pub mod prompts;
pub mod resolver;
pub mod sources;
pub mod text_utils;
pub mod tools;
pub mod works;

// Re-export for convenience
pub use cartography::{Graph, GraphMode};
pub use catalog::{Catalog, CatalogError, CatalogStore, Scholar};
pub use pipeline::Cartographer;
pub use resolver::{IdentitySource, Person};
pub use sources::{AuthorDirectory, AuthorHit, SourceError, WorkSource};
pub use works::{YearWindow, dedupe_top};

pub const DEFAULT_CATALOG_PATH: &str = "data/scholars.json";
pub const DEFAULT_ORCID_BASE: &str = "https://pub.orcid.org/v3.0";
pub const DEFAULT_OPENALEX_BASE: &str = "https://api.openalex.org";
pub const DEFAULT_CROSSREF_BASE: &str = "https://api.crossref.org";

/// A publication in the common shape every source adapter maps into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub title: String,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub url: Option<String>,
}

impl Work {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            doi: None,
            url: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime configuration for the resolution and aggregation pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub orcid_base: String,
    pub openalex_base: String,
    pub crossref_base: String,
    pub crossref_mailto: Option<String>,
    /// Soft budget for a single request to an external source.
    pub source_timeout_secs: u64,
    /// Maximum number of works kept per person.
    pub works_limit: usize,
    /// Source names to skip ("ORCID", "OpenAlex", "Crossref"), case-insensitive.
    pub disabled_sources: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            orcid_base: DEFAULT_ORCID_BASE.to_string(),
            openalex_base: DEFAULT_OPENALEX_BASE.to_string(),
            crossref_base: DEFAULT_CROSSREF_BASE.to_string(),
            crossref_mailto: None,
            source_timeout_secs: 5,
            works_limit: 5,
            disabled_sources: vec![],
        }
    }
}

impl Config {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_sources
            .iter()
            .any(|d| d.eq_ignore_ascii_case(name))
    }

    /// Overlay values from an on-disk config file.
    pub fn apply_file(mut self, file: &config_file::ConfigFile) -> Self {
        if let Some(ref catalog) = file.catalog
            && let Some(ref path) = catalog.path
        {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(ref sources) = file.sources {
            if let Some(ref v) = sources.orcid_base {
                self.orcid_base = v.clone();
            }
            if let Some(ref v) = sources.openalex_base {
                self.openalex_base = v.clone();
            }
            if let Some(ref v) = sources.crossref_base {
                self.crossref_base = v.clone();
            }
            if sources.crossref_mailto.is_some() {
                self.crossref_mailto = sources.crossref_mailto.clone();
            }
            if let Some(secs) = sources.timeout_secs {
                self.source_timeout_secs = secs;
            }
            if let Some(ref disabled) = sources.disabled {
                self.disabled_sources = disabled.clone();
            }
        }
        if let Some(limit) = file.works.as_ref().and_then(|w| w.limit) {
            self.works_limit = limit;
        }
        self
    }

    /// Overlay values from environment variables, read through `lookup`.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("SCHOLAR_CATALOG_PATH") {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("ORCID_BASE") {
            self.orcid_base = v;
        }
        if let Some(v) = lookup("OPENALEX_BASE") {
            self.openalex_base = v;
        }
        if let Some(v) = lookup("CROSSREF_BASE") {
            self.crossref_base = v;
        }
        if let Some(v) = lookup("CROSSREF_MAILTO") {
            self.crossref_mailto = Some(v);
        }
        if let Some(secs) = lookup("SOURCE_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.source_timeout_secs = secs;
        }
        self
    }

    /// Resolve configuration: environment > config file > defaults.
    pub fn load() -> Self {
        let file = config_file::load_config();
        Config::default()
            .apply_file(&file)
            .apply_env_with(|key| std::env::var(key).ok())
    }
}

/// Build the shared HTTP client used for every outbound request.
pub fn build_client() -> Result<reqwest::Client, CoreError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("cartograph/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
