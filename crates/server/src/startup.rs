use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::banner::repo::mongo::MongoBannerRepository;
use service::banner::repository::BannerRepository;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect to MongoDB, build the app and serve until the listener fails.
/// Expects logging to be initialised by the caller.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect(&cfg.database).await?;
    let repo = MongoBannerRepository::new(&db, &cfg.database.collection);
    repo.ensure_indexes().await?;

    let state = ServerState::new(Arc::new(repo), &cfg.server.public_base_url);
    let app: Router = routes::build_router(state, build_cors(), cfg.server.enable_init);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, collection = %cfg.database.collection, enable_init = cfg.server.enable_init, "starting banner api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
