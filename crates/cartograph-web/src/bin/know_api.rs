//! Stand-alone chat service: health, query, tools and ingest.

use cartograph_core::config_file;
use cartograph_web::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    cartograph_web::init_tracing();

    let server = ServerConfig::load(&config_file::load_config());
    tracing::info!(cors = ?server.cors_allowlist, "starting know-api");
    cartograph_web::serve(cartograph_web::minimal_app(&server), server.port).await
}
