//! Gateway configuration parameters.
//!
//! Deployment values (WiFi station, endpoints, factory secret, CA root)
//! are baked in at compile time from `TILLM_*` environment variables.
//! Timing and retry tunables default to the values the remote service
//! was sized for and are range-checked by [`GatewayConfig::validate`]
//! before the firmware starts.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::MAX_CREDENTIAL_LEN;
use crate::retry::{PollPolicy, RetryPolicy};

/// How the HTTPS client validates the server certificate chain.
///
/// Both variants verify the chain; there is no unverified mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustAnchor {
    /// PEM-encoded root certificate the server chain must terminate in.
    PinnedRoot(String),
    /// The ESP-IDF built-in CA certificate bundle.
    Bundle,
}

/// Core gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    // --- WiFi ---
    pub wifi_ssid: String,
    #[serde(skip_serializing, default)]
    pub wifi_password: String,
    /// Per-round link establishment bound (milliseconds).
    pub wifi_timeout_ms: u32,
    /// Link status poll interval within a round (milliseconds).
    pub wifi_poll_interval_ms: u32,
    /// Connection rounds before giving up.
    pub wifi_max_rounds: u8,
    /// Pause between connection rounds (milliseconds).
    pub wifi_round_delay_ms: u32,

    // --- Remote service ---
    pub provision_url: String,
    pub ask_url: String,
    pub trust_anchor: TrustAnchor,
    /// Shared factory secret used to sign provisioning requests.
    #[serde(skip_serializing, default)]
    pub factory_secret: String,

    // --- HTTP ---
    /// Per-attempt request timeout (milliseconds).
    pub http_timeout_ms: u32,
    /// Extra attempts after the first failed one.
    pub http_max_retries: u8,
    /// Pause between HTTP attempts (milliseconds).
    pub http_retry_delay_ms: u32,
    /// Largest response body accepted. A longer body fails the request
    /// instead of being cut short.
    pub http_max_response_bytes: usize,

    // --- Clock ---
    /// Wall-clock readings at or below this Unix time are not trusted.
    pub plausible_after_unix: u64,
    /// Polls after requesting network time before giving up.
    pub time_sync_polls: u32,
    /// Interval between time-sync polls (milliseconds).
    pub time_sync_interval_ms: u32,
}

const fn env_or(value: Option<&'static str>, fallback: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => fallback,
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let trust_anchor = match option_env!("TILLM_CA_PEM") {
            Some(pem) => TrustAnchor::PinnedRoot(pem.to_string()),
            None => TrustAnchor::Bundle,
        };

        Self {
            // WiFi
            wifi_ssid: env_or(option_env!("TILLM_WIFI_SSID"), "").to_string(),
            wifi_password: env_or(option_env!("TILLM_WIFI_PASS"), "").to_string(),
            wifi_timeout_ms: 10_000,
            wifi_poll_interval_ms: 200,
            wifi_max_rounds: 3,
            wifi_round_delay_ms: 500,

            // Remote service
            provision_url: env_or(option_env!("TILLM_PROVISION_URL"), "").to_string(),
            ask_url: env_or(option_env!("TILLM_ASK_URL"), "").to_string(),
            trust_anchor,
            factory_secret: env_or(option_env!("TILLM_FACTORY_SECRET"), "").to_string(),

            // HTTP
            http_timeout_ms: 8_000,
            http_max_retries: 2,
            http_retry_delay_ms: 200,
            http_max_response_bytes: 4_096,

            // Clock
            plausible_after_unix: 1_700_000_000, // ~2023-11
            time_sync_polls: 30,
            time_sync_interval_ms: 200,
        }
    }
}

impl GatewayConfig {
    /// Bound on WiFi connection rounds (round = initiate + poll).
    pub fn wifi_rounds(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.wifi_max_rounds,
            Duration::from_millis(self.wifi_timeout_ms as u64),
            Duration::from_millis(self.wifi_round_delay_ms as u64),
        )
    }

    /// Link status polling inside one WiFi round.
    pub fn wifi_poll(&self) -> PollPolicy {
        PollPolicy::within(
            Duration::from_millis(self.wifi_timeout_ms as u64),
            Duration::from_millis(self.wifi_poll_interval_ms as u64),
        )
    }

    /// Attempt policy shared by the provisioning and relay requests.
    pub fn http_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.http_max_retries.saturating_add(1),
            Duration::from_millis(self.http_timeout_ms as u64),
            Duration::from_millis(self.http_retry_delay_ms as u64),
        )
    }

    /// Polling after a network time sync request.
    pub fn time_sync_poll(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.time_sync_interval_ms as u64),
            self.time_sync_polls,
        )
    }

    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() || self.wifi_ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("wifi_ssid must be 1..=32 bytes"));
        }
        if !self.wifi_password.is_empty() && !(8..=64).contains(&self.wifi_password.len()) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8..=64 bytes",
            ));
        }
        if !(1_000..=60_000).contains(&self.wifi_timeout_ms) {
            return Err(ConfigError::ValidationFailed("wifi_timeout_ms must be 1000..=60000"));
        }
        if self.wifi_poll_interval_ms == 0 || self.wifi_poll_interval_ms > self.wifi_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "wifi_poll_interval_ms must be 1..=wifi_timeout_ms",
            ));
        }
        if !(1..=10).contains(&self.wifi_max_rounds) {
            return Err(ConfigError::ValidationFailed("wifi_max_rounds must be 1..=10"));
        }
        if !is_https_url(&self.provision_url) {
            return Err(ConfigError::ValidationFailed("provision_url must be an https:// URL"));
        }
        if !is_https_url(&self.ask_url) {
            return Err(ConfigError::ValidationFailed("ask_url must be an https:// URL"));
        }
        if let TrustAnchor::PinnedRoot(pem) = &self.trust_anchor {
            if !pem.contains("-----BEGIN CERTIFICATE-----") {
                return Err(ConfigError::ValidationFailed("pinned root is not a PEM certificate"));
            }
        }
        if self.factory_secret.is_empty() {
            return Err(ConfigError::ValidationFailed("factory_secret must not be empty"));
        }
        if !(1_000..=60_000).contains(&self.http_timeout_ms) {
            return Err(ConfigError::ValidationFailed("http_timeout_ms must be 1000..=60000"));
        }
        if self.http_max_retries > 5 {
            return Err(ConfigError::ValidationFailed("http_max_retries must be 0..=5"));
        }
        if !(MAX_CREDENTIAL_LEN..=65_536).contains(&self.http_max_response_bytes) {
            return Err(ConfigError::ValidationFailed(
                "http_max_response_bytes must hold a full credential and be at most 65536",
            ));
        }
        if self.time_sync_polls == 0 || self.time_sync_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "time sync polls and interval must be non-zero",
            ));
        }
        Ok(())
    }
}

fn is_https_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .and_then(|rest| rest.split('/').next())
        .is_some_and(|host| !host.is_empty())
}

/// Configuration rejected at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
