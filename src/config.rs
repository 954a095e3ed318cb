//! Configuration loading for the `enmet` command.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.enmet/config.toml` (user)
//! 3. built-in defaults
//!
//! ```toml
//! [http]
//! query_rate = 2.0
//! timeout_secs = 60
//!
//! [cache]
//! backend = "sqlite"
//! path = "/var/cache/enmet/enmet_data.sqlite"
//! expire_after_secs = 604800
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{BackendChoice, CacheConfig, Expiration};
use crate::fetch::DEFAULT_QUERY_RATE;
use crate::session::EnmetBuilder;
use crate::{EnmetError, Result};

/// Command configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheSection,
}

/// Site and request settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Site root (default: the public catalog site).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Uncached requests per second (default: 3).
    #[serde(default = "default_query_rate")]
    pub query_rate: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout_secs: default_timeout(),
            query_rate: default_query_rate(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_query_rate() -> f64 {
    DEFAULT_QUERY_RATE
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// "sqlite", "memory" or "none" (default: "sqlite").
    #[serde(default = "default_backend")]
    pub backend: String,
    /// sqlite file (default: under the user cache directory).
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Entry lifetime in seconds; unset means entries never expire.
    #[serde(default)]
    pub expire_after_secs: Option<u64>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            expire_after_secs: None,
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

impl CacheSection {
    /// Response cache configuration described by this section.
    pub fn to_cache_config(&self) -> Result<CacheConfig> {
        let backend = match self.backend.as_str() {
            #[cfg(feature = "sqlite")]
            "sqlite" => match &self.path {
                Some(path) => BackendChoice::Sqlite { path: path.clone() },
                None => BackendChoice::default(),
            },
            "memory" => BackendChoice::Memory,
            "none" => BackendChoice::Disabled,
            other => {
                return Err(EnmetError::Configuration(format!(
                    "unknown cache backend {other:?}"
                )));
            }
        };
        let expiration = match self.expire_after_secs {
            Some(secs) => Expiration::After(Duration::from_secs(secs)),
            None => Expiration::Never,
        };
        Ok(CacheConfig::new().backend(backend).expiration(expiration))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.enmet/config.toml`
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            EnmetError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            EnmetError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path; `None` means use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(EnmetError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(dirs::home_dir()
            .map(|home| home.join(".enmet").join("config.toml"))
            .filter(|path| path.exists()))
    }

    /// Session builder carrying these settings.
    pub fn builder(&self) -> Result<EnmetBuilder> {
        let mut builder = EnmetBuilder::new()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .query_rate(self.http.query_rate)
            .response_cache(self.cache.to_cache_config()?);
        if let Some(url) = &self.http.base_url {
            builder = builder.base_url(url);
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.query_rate, 3.0);
        assert_eq!(config.cache.backend, "sqlite");
        assert!(config.cache.expire_after_secs.is_none());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [http]
            query_rate = 0.5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.query_rate, 0.5);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.cache.backend, "sqlite");
    }

    #[test]
    fn cache_section_maps_to_cache_config() {
        let toml = r#"
            [cache]
            backend = "memory"
            expire_after_secs = 60
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let cache = config.cache.to_cache_config().unwrap();
        assert!(matches!(cache.backend, BackendChoice::Memory));
        assert_eq!(cache.expiration, Expiration::After(Duration::from_secs(60)));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let section = CacheSection {
            backend: "redis".into(),
            ..CacheSection::default()
        };
        assert!(matches!(
            section.to_cache_config(),
            Err(EnmetError::Configuration(_))
        ));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = Config::load(Some(Path::new("/nonexistent/enmet.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nbackend = \"none\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(matches!(
            config.cache.to_cache_config().unwrap().backend,
            BackendChoice::Disabled
        ));
    }
}
