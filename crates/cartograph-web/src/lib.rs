use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use cartograph_core::config_file::ConfigFile;

pub mod handlers;
pub mod models;
pub mod state;

pub use state::AppState;

pub const DEFAULT_PORT: u16 = 8000;

/// Listener and CORS settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Allowed origins; `*` allows any.
    pub cors_allowlist: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_allowlist: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Environment (`PORT`, `CORS_ALLOWLIST`) over the config file over defaults.
    pub fn resolve(file: &ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ref server) = file.server {
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(ref origins) = server.cors_allowlist {
                config.cors_allowlist = origins.clone();
            }
        }

        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(p) => config.port = p,
                Err(_) => tracing::warn!(port = %port, "ignoring invalid PORT"),
            }
        }
        if let Some(list) = lookup("CORS_ALLOWLIST") {
            config.cors_allowlist = list
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        config
    }

    pub fn load(file: &ConfigFile) -> Self {
        Self::resolve(file, |key| std::env::var(key).ok())
    }
}

pub fn cors_layer(allowlist: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowlist.is_empty() || allowlist.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowlist
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "skipping invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({ "error": "Not found" })),
    )
}

/// The full service: chat stub, tools, ingest, cartography, the scholar
/// catalog and the ORCID proxy.
pub fn app(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/healthz", get(handlers::health::healthz))
        .route("/api/know/v1/query", post(handlers::know::query))
        .route("/api/know/v1/tools", get(handlers::know::tools))
        .route("/api/know/v1/ingest", post(handlers::know::ingest))
        .route(
            "/api/know/v1/cartography/compile",
            post(handlers::know::compile),
        )
        .route("/api/orcid/{orcid}/works", get(handlers::orcid::works))
        .route("/api/scholars", get(handlers::scholars::list))
        .layer(cors_layer(&config.cors_allowlist))
        .fallback(not_found)
        .with_state(state)
}

/// The stand-alone know service: health, query, tools and ingest only.
pub fn minimal_app(config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/healthz", get(handlers::health::healthz))
        .route("/api/know/v1/query", post(handlers::know::query))
        .route("/api/know/v1/tools", get(handlers::know::tools))
        .route("/api/know/v1/ingest", post(handlers::know::ingest))
        .layer(cors_layer(&config.cors_allowlist))
        .fallback(not_found)
}

/// Install the `fmt` subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartograph_web=info,cartograph_core=info".into()),
        )
        .init();
}

/// Bind `0.0.0.0:<port>` and serve until Ctrl-C.
pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
