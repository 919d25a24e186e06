//! # Client Configuration
//!
//! Where the backend lives and how the client talks to it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     POLIBEST_API_URL=https://polibest.example.com/api                  │
//! │     POLIBEST_API_TIMEOUT_SECS=30                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/polibest/client.toml (Linux)                             │
//! │     ~/Library/Application Support/com.polibest.polibest/client.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local backend on port 8001, hosted sign-in page                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! api_url = "https://polibest.example.com/api"
//! timeout_secs = 30
//! auth_url = "https://auth.emergentagent.com/"
//! app_origin = "https://polibest.example.com"
//! session_file = "/home/manager/.local/share/polibest/session.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// File name of the config inside the platform config directory.
const CONFIG_FILE_NAME: &str = "client.toml";

/// File name of the persisted session inside the platform data directory.
const SESSION_FILE_NAME: &str = "session.json";

// =============================================================================
// Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Hosted sign-in page of the identity provider.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Origin of the web front end; the sign-in page redirects back here.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Where the signed-in session is kept between runs.
    /// `None` keeps the session in memory only.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    "http://localhost:8001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_auth_url() -> String {
    "https://auth.emergentagent.com/".to_string()
}

fn default_app_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            auth_url: default_auth_url(),
            app_origin: default_app_origin(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from all sources.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from TOML file (if exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        for (name, value) in [
            ("api_url", &self.api_url),
            ("auth_url", &self.auth_url),
            ("app_origin", &self.app_origin),
        ] {
            let url = Url::parse(value)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ClientError::InvalidUrl(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, value
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("POLIBEST_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api_url = url;
        }

        if let Ok(timeout) = std::env::var("POLIBEST_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.timeout_secs = secs;
            }
        }

        if let Ok(url) = std::env::var("POLIBEST_AUTH_URL") {
            debug!(url = %url, "Overriding auth URL from environment");
            self.auth_url = url;
        }

        if let Ok(origin) = std::env::var("POLIBEST_APP_ORIGIN") {
            self.app_origin = origin;
        }

        if let Ok(path) = std::env::var("POLIBEST_SESSION_FILE") {
            debug!(path = %path, "Overriding session file from environment");
            self.session_file = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "polibest", "polibest")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Default location for a persisted session.
    pub fn default_session_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "polibest", "polibest")
            .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Page the front end returns to after sign-in.
    pub fn auth_callback_url(&self) -> String {
        format!("{}/auth/callback", self.app_origin.trim_end_matches('/'))
    }
}
