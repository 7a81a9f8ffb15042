use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Statistics cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Admin key bootstrap configuration
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Statistics cache settings.
///
/// The aggregate statistics endpoint serves results from an in-process cache
/// with this TTL. Writes do not evict it; callers may observe staleness up to
/// the full window. A TTL of zero disables caching.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_statistics_ttl")]
    pub statistics_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            statistics_ttl_secs: default_statistics_ttl(),
        }
    }
}

/// Admin key bootstrap settings.
///
/// When enabled and the api_keys table is empty, an admin key is generated at
/// startup and printed to the log once. Disable after initial setup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub bootstrap_enabled: bool,

    #[serde(default = "default_bootstrap_key_name")]
    pub bootstrap_key_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bootstrap_enabled: false,
            bootstrap_key_name: default_bootstrap_key_name(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_statistics_ttl() -> u64 {
    300
}
fn default_bootstrap_key_name() -> String {
    "Bootstrap admin key".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with WR__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("WR").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid server host/port configuration")
    }

    /// Database configuration in the form the persistence layer expects.
    pub fn database_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connect_timeout_secs: self.database.connect_timeout_secs,
            idle_timeout_secs: self.database.idle_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default_ttl() {
        let cache = CacheConfig::default();
        assert_eq!(cache.statistics_ttl_secs, 300);
    }

    #[test]
    fn test_admin_config_default_disabled() {
        let admin = AdminConfig::default();
        assert!(!admin.bootstrap_enabled);
        assert_eq!(admin.bootstrap_key_name, "Bootstrap admin key");
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 9090,
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                min_connections: 1,
                connect_timeout_secs: 10,
                idle_timeout_secs: 600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec![],
            },
            cache: CacheConfig::default(),
            admin: AdminConfig::default(),
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
    }
}
