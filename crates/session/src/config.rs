//! Session configuration loaded from environment variables.

use std::time::Duration;

use castkit_remote::watch::{DEFAULT_MAX_CHECKS, DEFAULT_POLL_INTERVAL};
use castkit_remote::{PollConfig, DEFAULT_BASE_URL};

/// Name under which the API credential is persisted in the host store.
pub const DEFAULT_CREDENTIAL_KEY: &str = "render_api_credential";

/// Orchestrator configuration.
///
/// All fields have defaults suitable for the hosted rendering service;
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the rendering service API.
    pub api_base_url: String,
    /// Seconds between status checks.
    pub poll_interval_secs: u64,
    /// Status-check budget; `None` polls without bound.
    pub max_poll_checks: Option<u32>,
    /// Credential-store key for the API credential.
    pub credential_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_poll_checks: Some(DEFAULT_MAX_CHECKS),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                       |
    /// |----------------------------|-------------------------------|
    /// | `CASTKIT_API_BASE_URL`     | `https://api.synthesia.io/v2` |
    /// | `CASTKIT_POLL_INTERVAL_SECS` | `5`                         |
    /// | `CASTKIT_MAX_POLL_CHECKS`  | `240` (`0` disables the cap)  |
    /// | `CASTKIT_CREDENTIAL_KEY`   | `render_api_credential`       |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url =
            std::env::var("CASTKIT_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let poll_interval_secs: u64 = std::env::var("CASTKIT_POLL_INTERVAL_SECS")
            .map(|raw| {
                raw.parse()
                    .expect("CASTKIT_POLL_INTERVAL_SECS must be a valid u64")
            })
            .unwrap_or(defaults.poll_interval_secs);

        let max_poll_checks = std::env::var("CASTKIT_MAX_POLL_CHECKS")
            .map(|raw| parse_max_checks(&raw))
            .unwrap_or(defaults.max_poll_checks);

        let credential_key =
            std::env::var("CASTKIT_CREDENTIAL_KEY").unwrap_or(defaults.credential_key);

        Self {
            api_base_url,
            poll_interval_secs,
            max_poll_checks,
            credential_key,
        }
    }

    /// The poll-loop parameters this configuration describes.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_checks: self.max_poll_checks,
        }
    }
}

/// Parse the check budget; `0` means unbounded.
fn parse_max_checks(raw: &str) -> Option<u32> {
    let checks: u32 = raw
        .parse()
        .expect("CASTKIT_MAX_POLL_CHECKS must be a valid u32");
    if checks == 0 {
        None
    } else {
        Some(checks)
    }
}
