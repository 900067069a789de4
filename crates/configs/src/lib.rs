use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Prefix used when building `Location` headers for banner resources.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Routes `GET /api/init`, which wipes and reseeds the banner collection.
    #[serde(default)]
    pub enable_init: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            public_base_url: default_public_base_url(),
            enable_init: false,
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 50211 }
fn default_public_base_url() -> String { "http://localhost:50211/api/v1".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_server_selection_timeout")]
    pub server_selection_timeout_secs: u64,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default)]
    pub min_pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            name: default_database_name(),
            collection: default_collection(),
            app_name: None,
            connect_timeout_secs: default_connect_timeout(),
            server_selection_timeout_secs: default_server_selection_timeout(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: 0,
        }
    }
}

fn default_database_name() -> String { "bannerflow".into() }
fn default_collection() -> String { "Banner".into() }
fn default_connect_timeout() -> u64 { 10 }
fn default_server_selection_timeout() -> u64 { 10 }
fn default_max_pool_size() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Read and parse the file at `path`. A missing file is `Ok(None)`;
/// unreadable or malformed files are errors.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); when the file does not exist,
    /// start from defaults and let the environment fill in the rest.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = match load_optional(&path) {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Self::from_env(),
            Err(e) => return Err(e.context(format!("invalid config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            cfg.server.public_base_url = url;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        let trimmed = self.public_base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            self.public_base_url = default_public_base_url();
        } else if !trimmed.bytes().all(|b| b.is_ascii_graphic()) {
            // becomes the prefix of every Location header
            return Err(anyhow!("server.public_base_url must be printable ASCII without spaces"));
        } else {
            self.public_base_url = trimmed.to_string();
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.uri.trim().is_empty() {
            if let Ok(uri) = std::env::var("MONGODB_URI") {
                self.uri = uri;
            }
        }
        if let Ok(name) = std::env::var("MONGODB_DATABASE") {
            if !name.trim().is_empty() {
                self.name = name;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(anyhow!("database.uri is empty; set it in config.toml or via MONGODB_URI"));
        }
        let lower = self.uri.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.uri must start with mongodb:// or mongodb+srv://"));
        }
        if self.name.trim().is_empty() {
            return Err(anyhow!("database.name must not be empty"));
        }
        if self.collection.trim().is_empty() {
            return Err(anyhow!("database.collection must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(anyhow!("database.max_pool_size must be >= 1"));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(anyhow!("database.min_pool_size must be <= max_pool_size"));
        }
        if self.connect_timeout_secs == 0 || self.server_selection_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, 50211);
        assert_eq!(cfg.server.public_base_url, "http://localhost:50211/api/v1");
        assert!(!cfg.server.enable_init);
        assert_eq!(cfg.database.name, "bannerflow");
        assert_eq!(cfg.database.collection, "Banner");
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = parse(
            r#"
            [server]
            port = 9000
            enable_init = true

            [database]
            uri = "mongodb://localhost:27017"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert!(cfg.server.enable_init);
        assert_eq!(cfg.database.uri, "mongodb://localhost:27017");
        assert_eq!(cfg.database.max_pool_size, 10);
    }

    #[test]
    fn server_normalize_trims_base_url_and_threads() {
        let mut s = ServerConfig {
            host: "  ".into(),
            port: 8080,
            worker_threads: Some(0),
            public_base_url: "https://banners.example.com/api/v1/".into(),
            enable_init: false,
        };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
        assert_eq!(s.public_base_url, "https://banners.example.com/api/v1");
    }

    #[test]
    fn server_normalize_rejects_port_zero() {
        let mut s = ServerConfig { port: 0, ..ServerConfig::default() };
        assert!(s.normalize().is_err());
    }

    #[test]
    fn database_validate_rules() {
        let mut db = DatabaseConfig { uri: "mongodb://localhost:27017".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_ok());

        db.uri = "postgres://localhost".into();
        assert!(db.validate().is_err());

        db.uri = "mongodb+srv://cluster.example.com".into();
        db.min_pool_size = 20;
        assert!(db.validate().is_err());

        db.min_pool_size = 0;
        db.connect_timeout_secs = 0;
        assert!(db.validate().is_err());

        db.connect_timeout_secs = 5;
        db.uri = String::new();
        assert!(db.validate().is_err());
    }

    #[test]
    fn server_normalize_rejects_base_url_unfit_for_headers() {
        for url in ["http://localhost/api v1", "http://bänner.example.com/api", "http://x/\napi"] {
            let mut s = ServerConfig { public_base_url: url.into(), ..ServerConfig::default() };
            assert!(s.normalize().is_err(), "{url:?} accepted");
        }
    }

    fn temp_config(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn missing_config_file_is_none() {
        let path = std::env::temp_dir().join("bannerflow-does-not-exist.toml");
        assert!(load_optional(&path.to_string_lossy()).unwrap().is_none());
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = temp_config("bannerflow-broken", "[server\nenable_init = true\n");
        assert!(load_optional(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn present_config_file_is_parsed() {
        let path = temp_config("bannerflow-ok", "[server]\nenable_init = true\n");
        let cfg = load_optional(&path).unwrap().expect("parsed config");
        assert!(cfg.server.enable_init);
        std::fs::remove_file(&path).ok();
    }
}
