//! Configuration management.

use crate::api::ResponseEnvelope;
use crate::tasks::{Backoff, PollPolicy};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Name of the per-project config file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".comicmaker.toml";

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `http://127.0.0.1:8000/api`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Whether responses wrap entities under a resource key
    pub envelope: ResponseEnvelope,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: comicmaker_types::DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
            auth_token: None,
            envelope: ResponseEnvelope::Auto,
        }
    }
}

/// Task polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_interval_ms: u64,
    pub backoff: Backoff,
    pub max_wait_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_interval_ms: 10_000,
            backoff: Backoff::Exponential,
            max_wait_secs: 600,
        }
    }
}

impl PollingConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            backoff: self.backoff,
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub envelope: Option<ResponseEnvelope>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/comicmaker/ on Linux)
    /// 2. `.comicmaker.toml` in current directory
    pub fn from_figment(overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(LOCAL_CONFIG_FILE));
        Self::from_sources(user_config_path(), local_config, overrides)
    }

    fn from_sources(
        user_config: Option<PathBuf>,
        local_config: Option<PathBuf>,
        overrides: &ConfigOverrides,
    ) -> anyhow::Result<Self> {
        // Priority: defaults < user config < local config < env vars < CLI args
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in [user_config, local_config].into_iter().flatten() {
            if path.exists() {
                tracing::debug!("Reading config file {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        // COMICMAKER_API__BASE_URL -> api.base_url
        figment = figment.merge(
            Env::prefixed("COMICMAKER_").map(|key| key.as_str().replace("__", ".").into()),
        );

        if let Some(ref url) = overrides.base_url {
            figment = figment.merge(Serialized::default("api.base_url", url));
        }
        if let Some(ref token) = overrides.auth_token {
            figment = figment.merge(Serialized::default("api.auth_token", token));
        }
        if let Some(secs) = overrides.timeout_secs {
            figment = figment.merge(Serialized::default("api.timeout_secs", secs));
        }
        if let Some(envelope) = overrides.envelope {
            figment = figment.merge(Serialized::default("api.envelope", envelope));
        }
        if let Some(ref level) = overrides.log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        Ok(figment.extract()?)
    }
}

/// `config.toml` in the user config directory, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "comicmaker")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_KEYS: [&str; 3] = [
        "COMICMAKER_API__BASE_URL",
        "COMICMAKER_API__TIMEOUT_SECS",
        "COMICMAKER_POLLING__BACKOFF",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_sources(None, None, &ConfigOverrides::default()).unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.envelope, ResponseEnvelope::Auto);
        assert_eq!(config.polling.policy(), PollPolicy::default());
        assert!(config.logging.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_local_file_overrides_user_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("config.toml");
        let local = temp_dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(
            &user,
            "[api]\nbase_url = \"http://user/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        fs::write(
            &local,
            "[api]\nbase_url = \"http://local/api\"\nenvelope = \"wrapped\"\n\n[polling]\nbackoff = \"fixed\"\n",
        )
        .unwrap();

        let config =
            Config::from_sources(Some(user), Some(local), &ConfigOverrides::default()).unwrap();

        assert_eq!(config.api.base_url, "http://local/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.envelope, ResponseEnvelope::Wrapped);
        assert_eq!(config.polling.backoff, Backoff::Fixed);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_and_cli_overrides_env() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(LOCAL_CONFIG_FILE);
        fs::write(&local, "[api]\nbase_url = \"http://file/api\"\ntimeout_secs = 5\n").unwrap();

        std::env::set_var("COMICMAKER_API__BASE_URL", "http://env/api");
        std::env::set_var("COMICMAKER_API__TIMEOUT_SECS", "7");

        let from_env =
            Config::from_sources(None, Some(local.clone()), &ConfigOverrides::default()).unwrap();
        let from_cli = Config::from_sources(
            None,
            Some(local),
            &ConfigOverrides {
                base_url: Some("http://cli/api".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        clear_env();

        assert_eq!(from_env.api.base_url, "http://env/api");
        assert_eq!(from_env.api.timeout_secs, 7);
        assert_eq!(from_cli.api.base_url, "http://cli/api");
        assert_eq!(from_cli.api.timeout_secs, 7);
    }

    #[test]
    #[serial]
    fn test_from_figment_reads_local_file_in_cwd() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(LOCAL_CONFIG_FILE),
            "[logging]\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config = Config::from_figment(&ConfigOverrides::default());

        // Restore (restore dir before temp_dir is dropped, ignore errors)
        let _ = std::env::set_current_dir(&original_dir);

        assert_eq!(config.unwrap().logging.log_level.as_deref(), Some("debug"));
    }
}
