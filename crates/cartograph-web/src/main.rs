use std::sync::Arc;

use cartograph_core::{Cartographer, Config, config_file};
use cartograph_web::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    cartograph_web::init_tracing();

    let file = config_file::load_config();
    let server = ServerConfig::load(&file);
    let config = Config::default()
        .apply_file(&file)
        .apply_env_with(|key| std::env::var(key).ok());
    tracing::info!(
        catalog = %config.catalog_path.display(),
        timeout_secs = config.source_timeout_secs,
        cors = ?server.cors_allowlist,
        "starting cartograph service"
    );

    let state = Arc::new(AppState {
        cartographer: Cartographer::new(&config)?,
    });
    let app = cartograph_web::app(state, &server);
    cartograph_web::serve(app, server.port).await
}
