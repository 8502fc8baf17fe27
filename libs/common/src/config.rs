//! Client configuration
//!
//! Values are layered with the `config` crate: serde defaults, then an
//! optional TOML file, then `JOBBY_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Upper bound accepted for `session_ttl_days`
const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Configuration shared by every component of the client
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL every API request is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the persisted session lives
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    /// How long a sign-in survives restarts
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// Pause between a successful admin save and the redirect
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://jobby-server-delta.vercel.app".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".jobby").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".jobby-session.json"))
}

fn default_session_ttl_days() -> i64 {
    30
}

fn default_redirect_delay_ms() -> u64 {
    1500
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            session_file: default_session_file(),
            session_ttl_days: default_session_ttl_days(),
            redirect_delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from the environment
    ///
    /// # Environment Variables
    /// - `JOBBY_CONFIG`: path of the TOML file to read (default: "jobby.toml", optional)
    /// - `JOBBY_BASE_URL`, `JOBBY_REQUEST_TIMEOUT_SECS`, `JOBBY_SESSION_FILE`,
    ///   `JOBBY_SESSION_TTL_DAYS`, `JOBBY_REDIRECT_DELAY_MS`: override single keys
    pub fn from_env() -> ConfigResult<Self> {
        let file = std::env::var("JOBBY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("jobby.toml"));

        Self::load(
            Some(&file),
            Some(Environment::with_prefix("JOBBY").try_parsing(true)),
        )
    }

    /// Read the configuration from a TOML file only
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        Self::load(Some(path), None)
    }

    fn load(file: Option<&Path>, env: Option<Environment>) -> ConfigResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: format!("`{}` is not an http(s) URL", self.base_url),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if !(1..=MAX_SESSION_TTL_DAYS).contains(&self.session_ttl_days) {
            return Err(ConfigError::Invalid {
                key: "session_ttl_days",
                reason: format!("must be between 1 and {MAX_SESSION_TTL_DAYS}"),
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}
