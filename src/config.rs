use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub providers: ProvidersConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,

    /// User id used wherever a request carries no user.
    /// There is no authentication, so this stands in for the session user.
    pub placeholder_user_id: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/animedex.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            placeholder_user_id: "demo-user".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub anilist_url: String,

    pub kitsu_url: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// How long upstream responses stay cached, per adapter (default: 3600).
    /// 0 disables the cache.
    pub cache_ttl_seconds: u64,

    /// Total Kitsu attempts for a single request, first try included (default: 2)
    pub kitsu_max_attempts: u32,

    /// Fixed wait between Kitsu attempts (default: 500)
    pub kitsu_retry_delay_ms: u64,

    /// Whether `/api/anime` falls back to Kitsu when the request does not say.
    pub fallback_by_default: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            anilist_url: "https://graphql.anilist.co".to_string(),
            kitsu_url: "https://kitsu.io/api/edge".to_string(),
            request_timeout_seconds: 30,
            cache_ttl_seconds: 3600,
            kitsu_max_attempts: 2,
            kitsu_retry_delay_ms: 500,
            fallback_by_default: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "animedex".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and
    /// environment overrides for the provider URLs.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ANILIST_API_URL")
            && !url.is_empty()
        {
            self.providers.anilist_url = url;
        }

        if let Ok(url) = std::env::var("KITSU_API_URL")
            && !url.is_empty()
        {
            self.providers.kitsu_url = url;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("animedex").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".animedex").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.anilist_url.is_empty() {
            anyhow::bail!("AniList URL cannot be empty");
        }

        if self.providers.kitsu_url.is_empty() {
            anyhow::bail!("Kitsu URL cannot be empty");
        }

        url::Url::parse(&self.providers.anilist_url).context("Invalid AniList URL")?;
        url::Url::parse(&self.providers.kitsu_url).context("Invalid Kitsu URL")?;

        if self.providers.kitsu_max_attempts == 0 {
            anyhow::bail!("Kitsu attempts must be at least 1");
        }

        if self.general.placeholder_user_id.is_empty() {
            anyhow::bail!("Placeholder user id cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.providers.anilist_url, "https://graphql.anilist.co");
        assert_eq!(config.providers.cache_ttl_seconds, 3600);
        assert_eq!(config.providers.kitsu_max_attempts, 2);
        assert!(config.providers.fallback_by_default);
        assert_eq!(config.general.placeholder_user_id, "demo-user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[providers]"));
        assert!(toml_str.contains("[server]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [providers]
            kitsu_retry_delay_ms = 50
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.providers.kitsu_retry_delay_ms, 50);

        assert_eq!(config.providers.kitsu_url, "https://kitsu.io/api/edge");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.providers.kitsu_max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.providers.anilist_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
