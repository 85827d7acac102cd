//! Session and application configuration.

use std::time::Duration;

use tracing::info;
use vgen_client::VeoClientConfig;

use crate::auth::AuthConfig;

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default delay between two progress-message rotations.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(3);

/// Timing of one generation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay before each status query
    pub poll_interval: Duration,
    /// Delay between progress-message rotations
    pub status_interval: Duration,
    /// Optional cap on the whole poll loop; `None` waits indefinitely
    pub poll_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            status_interval: DEFAULT_STATUS_INTERVAL,
            poll_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        // Zero periods would spin the poll loop and the ticker.
        Self {
            poll_interval: env_secs("VGEN_POLL_INTERVAL_SECS")
                .filter(|d| !d.is_zero())
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            status_interval: env_secs("VGEN_STATUS_INTERVAL_SECS")
                .filter(|d| !d.is_zero())
                .unwrap_or(DEFAULT_STATUS_INTERVAL),
            poll_timeout: env_secs("VGEN_POLL_TIMEOUT_SECS").filter(|d| !d.is_zero()),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Everything the host needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: VeoClientConfig,
    pub session: SessionConfig,
    /// `None` disables authentication
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    /// Load `.env` (if present) and read all configuration from the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let config = Self {
            client: VeoClientConfig::from_env(),
            session: SessionConfig::from_env(),
            auth: AuthConfig::from_env(),
        };

        info!(
            model = %config.client.model,
            api_key_present = config.client.api_key.is_some(),
            poll_interval = ?config.session.poll_interval,
            auth_enabled = config.auth.is_some(),
            "Configuration loaded"
        );
        config
    }
}
