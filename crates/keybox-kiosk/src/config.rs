//! Kiosk configuration.
//!
//! Loaded from a TOML file, then overridden from the environment:
//!
//! ```toml
//! [device]
//! id = "esp32-matik-registration"
//! api_key = "device-secret"
//!
//! [server]
//! base_url = "http://127.0.0.1:3000"
//! timeout_ms = 3000
//!
//! [engine]
//! debounce_ms = 1000
//! fetch_failure_alarm_threshold = 3
//!
//! [kiosk]
//! poll_interval_ms = 50
//! servo_pulse_ms = 1000
//! ```
//!
//! Every field has a default except `device.api_key`, which is only needed
//! when talking to a real server.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use keybox_core::constants::{
    DEBOUNCE_COOLDOWN_MS, DEFAULT_DEVICE_ID, DEFAULT_EVENT_PATH,
    DEFAULT_FETCH_FAILURE_ALARM_THRESHOLD, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SERVER_URL, DEFAULT_SERVO_PULSE_MS, DEFAULT_STATUS_PATH, MAX_HTTP_TIMEOUT_MS,
    MIN_HTTP_TIMEOUT_MS,
};
use keybox_core::{ApiKey, DeviceId};
use keybox_engine::ReconciliationEngineBuilder;
use keybox_network::{HttpStatusClient, HttpStatusClientConfig};

use crate::error::{KioskError, Result};

pub const ENV_SERVER_URL: &str = "KEYBOX_SERVER_URL";
pub const ENV_DEVICE_ID: &str = "KEYBOX_DEVICE_ID";
pub const ENV_API_KEY: &str = "KEYBOX_API_KEY";

/// Full kiosk configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KioskConfig {
    pub device: DeviceConfig,
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub kiosk: LoopConfig,
}

/// Identity presented to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: String,

    /// Redacted in `Debug` output.
    pub api_key: Option<ApiKey>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_DEVICE_ID.to_string(),
            api_key: None,
        }
    }
}

/// Server of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub base_url: String,
    pub status_path: String,
    pub event_path: String,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            event_path: DEFAULT_EVENT_PATH.to_string(),
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

/// Reconciliation engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub debounce_ms: u64,

    /// Consecutive fetch failures before dropped taps become faults. Zero
    /// disables the alarm.
    pub fetch_failure_alarm_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_COOLDOWN_MS,
            fetch_failure_alarm_threshold: DEFAULT_FETCH_FAILURE_ALARM_THRESHOLD,
        }
    }
}

/// Control loop and actuator timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub poll_interval_ms: u64,
    pub servo_pulse_ms: u64,
    pub reader_name: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            servo_pulse_ms: DEFAULT_SERVO_PULSE_MS,
            reader_name: "Stdin Tag Reader".to_string(),
        }
    }
}

impl KioskConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| KioskError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KioskError::config(format!("Failed to parse config: {e}")))
    }

    /// Apply `KEYBOX_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `KEYBOX_*` overrides using `lookup` to read variables.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL) {
            self.server.base_url = url;
        }

        if let Some(id) = lookup(ENV_DEVICE_ID) {
            self.device.id = id;
        }

        if let Some(key) = lookup(ENV_API_KEY) {
            self.device.api_key = Some(ApiKey::new(key)?);
        }

        Ok(())
    }

    /// Check every value the kiosk will use.
    ///
    /// A missing API key is not an error here; see
    /// [`status_client_config`](Self::status_client_config).
    pub fn validate(&self) -> Result<()> {
        DeviceId::new(self.device.id.as_str())?;
        self.base_url()?;

        if !self.server.status_path.starts_with('/') || !self.server.event_path.starts_with('/') {
            return Err(KioskError::config("server paths must start with '/'"));
        }

        if !(MIN_HTTP_TIMEOUT_MS..=MAX_HTTP_TIMEOUT_MS).contains(&self.server.timeout_ms) {
            return Err(KioskError::config(format!(
                "server.timeout_ms must be between {MIN_HTTP_TIMEOUT_MS} and {MAX_HTTP_TIMEOUT_MS}, got {}",
                self.server.timeout_ms
            )));
        }

        if self.kiosk.poll_interval_ms == 0 {
            return Err(KioskError::config("kiosk.poll_interval_ms must be positive"));
        }

        if self.kiosk.servo_pulse_ms == 0 {
            return Err(KioskError::config("kiosk.servo_pulse_ms must be positive"));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.server.base_url).map_err(|e| {
            KioskError::config(format!("Invalid server.base_url {:?}: {e}", self.server.base_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(KioskError::config(format!(
                "server.base_url must be http or https, got {scheme}"
            ))),
        }
    }

    /// Build the HTTP client configuration.
    ///
    /// # Errors
    ///
    /// Fails if `device.api_key` is unset or any server value is invalid.
    pub fn status_client_config(&self) -> Result<HttpStatusClientConfig> {
        let api_key = self
            .device
            .api_key
            .clone()
            .ok_or_else(|| KioskError::config(format!("device.api_key is required (or set {ENV_API_KEY})")))?;

        Ok(HttpStatusClientConfig::new(
            self.base_url()?,
            DeviceId::new(self.device.id.as_str())?,
            api_key,
        )
        .with_timeout(Duration::from_millis(self.server.timeout_ms))
        .with_paths(
            self.server.status_path.as_str(),
            self.server.event_path.as_str(),
        ))
    }

    /// Build the HTTP client itself.
    ///
    /// # Errors
    ///
    /// Fails like [`status_client_config`](Self::status_client_config), or
    /// with `KioskError::Network` if the endpoint URLs cannot be joined.
    pub fn status_client(&self) -> Result<HttpStatusClient> {
        Ok(HttpStatusClient::new(self.status_client_config()?)?)
    }

    pub fn engine_builder(&self) -> ReconciliationEngineBuilder {
        ReconciliationEngineBuilder::default()
            .with_cooldown(Duration::from_millis(self.engine.debounce_ms))
            .with_fetch_failure_alarm_threshold(self.engine.fetch_failure_alarm_threshold)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.kiosk.poll_interval_ms)
    }

    pub fn servo_pulse(&self) -> Duration {
        Duration::from_millis(self.kiosk.servo_pulse_ms)
    }
}
