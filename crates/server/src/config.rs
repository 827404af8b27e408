use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use store::BackendConfig;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable permissive CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Which document store to talk to
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redb,
    Mongo,
}

/// Store selection and connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// File used by the redb backend
    #[serde(default = "default_redb_path")]
    pub redb_path: String,

    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redb_path: default_redb_path(),
            mongo_uri: default_mongo_uri(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl StoreSettings {
    pub fn backend_config(&self) -> BackendConfig {
        match self.backend {
            StoreBackend::Memory => BackendConfig::in_memory(),
            StoreBackend::Redb => BackendConfig::redb(self.redb_path.clone()),
            StoreBackend::Mongo => {
                BackendConfig::mongo(&self.mongo_uri, &self.database, &self.collection)
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            store: StoreSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `server.*` file, then environment
    /// variables such as `MOVIE_STORE__PORT` or `MOVIE_STORE__STORE__BACKEND`.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(environment());

        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

/// `MOVIE_STORE__*` variables, with `__` separating nested keys.
fn environment() -> config::Environment {
    config::Environment::with_prefix("MOVIE_STORE")
        .separator("__")
        .try_parsing(true)
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_redb_path() -> String {
    "movies.redb".to_string()
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "MovieStore".to_string()
}

fn default_collection() -> String {
    "movies".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.max_body_size(), 1024 * 1024);
        assert!(cfg.enable_cors);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.backend_config(), BackendConfig::InMemory);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            port = 4001
            log_format = "text"

            [store]
            backend = "mongo"
            database = "MovieStoreTest"
        "#;
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        let cfg = ServerConfig::from_builder(builder).unwrap();

        assert_eq!(cfg.port, 4001);
        assert_eq!(cfg.bind_addr, "0.0.0.0");
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(
            cfg.store.backend_config(),
            BackendConfig::mongo("mongodb://localhost:27017", "MovieStoreTest", "movies")
        );
    }

    #[test]
    fn test_redb_backend_selection() {
        let settings = StoreSettings {
            backend: StoreBackend::Redb,
            redb_path: "/data/movies.redb".into(),
            ..StoreSettings::default()
        };
        assert_eq!(settings.backend_config(), BackendConfig::redb("/data/movies.redb"));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let vars: config::Map<String, String> = [
            ("MOVIE_STORE__PORT", "4100"),
            ("MOVIE_STORE__ENABLE_CORS", "false"),
            ("MOVIE_STORE__STORE__BACKEND", "redb"),
            ("MOVIE_STORE__STORE__REDB_PATH", "/data/movies.redb"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let builder = config::Config::builder().add_source(environment().source(Some(vars)));
        let cfg = ServerConfig::from_builder(builder).unwrap();

        assert_eq!(cfg.port, 4100);
        assert!(!cfg.enable_cors);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.store.backend, StoreBackend::Redb);
        assert_eq!(
            cfg.store.backend_config(),
            BackendConfig::redb("/data/movies.redb")
        );
    }
}
