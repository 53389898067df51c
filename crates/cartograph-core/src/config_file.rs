use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub sources: Option<SourcesConfig>,
    pub catalog: Option<CatalogConfig>,
    pub server: Option<ServerConfig>,
    pub works: Option<WorksConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub orcid_base: Option<String>,
    pub openalex_base: Option<String>,
    pub crossref_base: Option<String>,
    pub crossref_mailto: Option<String>,
    pub timeout_secs: Option<u64>,
    pub disabled: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub cors_allowlist: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksConfig {
    pub limit: Option<usize>,
}

/// Platform config directory path: `<config_dir>/cartograph/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cartograph").join("config.toml"))
}

/// Load config by cascading CWD `.cartograph.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".cartograph.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bs = base.sources.unwrap_or_default();
    let os = overlay.sources.unwrap_or_default();
    let bc = base.catalog.unwrap_or_default();
    let oc = overlay.catalog.unwrap_or_default();
    let bv = base.server.unwrap_or_default();
    let ov = overlay.server.unwrap_or_default();
    let bw = base.works.unwrap_or_default();
    let ow = overlay.works.unwrap_or_default();

    ConfigFile {
        sources: Some(SourcesConfig {
            orcid_base: os.orcid_base.or(bs.orcid_base),
            openalex_base: os.openalex_base.or(bs.openalex_base),
            crossref_base: os.crossref_base.or(bs.crossref_base),
            crossref_mailto: os.crossref_mailto.or(bs.crossref_mailto),
            timeout_secs: os.timeout_secs.or(bs.timeout_secs),
            disabled: os.disabled.or(bs.disabled),
        }),
        catalog: Some(CatalogConfig {
            path: oc.path.or(bc.path),
        }),
        server: Some(ServerConfig {
            port: ov.port.or(bv.port),
            cors_allowlist: ov.cors_allowlist.or(bv.cors_allowlist),
        }),
        works: Some(WorksConfig {
            limit: ow.limit.or(bw.limit),
        }),
    }
}
