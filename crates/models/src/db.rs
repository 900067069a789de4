use std::env;
use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use once_cell::sync::Lazy;
use tracing::info;

pub static MONGODB_URI: Lazy<Option<String>> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    env::var("MONGODB_URI").ok().filter(|uri| !uri.trim().is_empty())
});

/// Open a client with the pool/timeout settings from `cfg` and ping the
/// target database so misconfiguration surfaces at startup.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&cfg.uri).await?;
    if cfg.app_name.is_some() {
        options.app_name = cfg.app_name.clone();
    }
    options.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));
    options.max_pool_size = Some(cfg.max_pool_size);
    options.min_pool_size = Some(cfg.min_pool_size);

    let client = Client::with_options(options)?;
    let db = client.database(&cfg.name);
    db.run_command(doc! { "ping": 1 }, None).await?;
    info!(database = %cfg.name, "mongodb connection established");
    Ok(db)
}

/// Connect using `MONGODB_URI` and otherwise default settings; `None` when
/// the variable is unset. Used by tests that need a live server.
pub async fn connect_from_env() -> anyhow::Result<Option<Database>> {
    let Some(uri) = MONGODB_URI.as_ref() else {
        return Ok(None);
    };
    let mut cfg = DatabaseConfig { uri: uri.clone(), ..DatabaseConfig::default() };
    cfg.normalize_from_env();
    cfg.server_selection_timeout_secs = cfg.server_selection_timeout_secs.min(5);
    connect(&cfg).await.map(Some)
}
