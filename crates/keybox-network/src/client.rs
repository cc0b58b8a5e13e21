//! HTTP status client for the authority server.
//!
//! This module provides the [`StatusClient`] contract the reconciliation
//! engine depends on, and [`HttpStatusClient`], its reqwest-backed
//! implementation.
//!
//! # Architecture
//!
//! ```text
//! Kiosk loop
//!     │
//!     └─> ReconciliationEngine
//!             │
//!             └─> HttpStatusClient ───(HTTP)───> Authority server
//!                     │
//!                     ├─ GET  /api/key-status-for-esp  -> {"keyTaken": bool}
//!                     └─ POST /api/log-key-event       <- {"rfid", "eventType"}
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use keybox_network::{HttpStatusClient, HttpStatusClientConfig, StatusClient};
//! use keybox_core::{ApiKey, DeviceId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpStatusClientConfig::new(
//!     "http://192.168.0.100:3000".parse()?,
//!     DeviceId::new("esp32-matik-registration")?,
//!     ApiKey::new("device-secret")?,
//! );
//!
//! let mut client = HttpStatusClient::new(config)?;
//! let taken = client.fetch_key_state().await?;
//! println!("Key taken: {taken}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! The client is a thin transport layer:
//! - **No automatic retry**: the engine retries lazily on the next tap
//! - **No caching**: every fetch hits the server
//! - **Simple error handling**: clear errors, no recovery
//!
//! # Timeout Handling
//!
//! Every request carries the configured timeout (default: 3000ms). A timeout
//! is reported as [`NetworkError::Timeout`] and handled like any other
//! transport failure.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use keybox_core::constants::{
    DEFAULT_EVENT_PATH, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_STATUS_PATH, HEADER_API_KEY,
    HEADER_DEVICE_ID,
};
use keybox_core::{ApiKey, DeviceId, TagEvent};
use reqwest::StatusCode;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{NetworkError, Result};
use crate::wire::{EventRequest, KeyStatusResponse, event_accepted};

/// Access to the server of record.
///
/// Both operations are slow (network I/O) and fallible. Callers must not
/// read anything into an error beyond "no trustworthy answer".
pub trait StatusClient {
    /// Query whether the key is currently taken.
    ///
    /// `Ok(value)` is authoritative as of the call.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-success status,
    /// or a payload that is not a boolean key state.
    async fn fetch_key_state(&mut self) -> Result<bool>;

    /// Report a custody event.
    ///
    /// Returns `Ok(true)` only when the server explicitly accepted the
    /// event, `Ok(false)` when it answered with a rejection.
    ///
    /// # Errors
    ///
    /// Returns an error when no response was obtained.
    async fn submit_event(&mut self, event: &TagEvent) -> Result<bool>;
}

/// Configuration for [`HttpStatusClient`].
///
/// # Example
///
/// ```
/// use keybox_network::HttpStatusClientConfig;
/// use keybox_core::{ApiKey, DeviceId};
/// use std::time::Duration;
///
/// let config = HttpStatusClientConfig::new(
///     "http://127.0.0.1:3000".parse().unwrap(),
///     DeviceId::new("kiosk-1").unwrap(),
///     ApiKey::new("secret").unwrap(),
/// )
/// .with_timeout(Duration::from_millis(1500));
///
/// assert_eq!(config.status_path, "/api/key-status-for-esp");
/// ```
#[derive(Debug, Clone)]
pub struct HttpStatusClientConfig {
    /// Server base URL (scheme, host, port)
    pub base_url: Url,

    /// Path of the key status endpoint
    pub status_path: String,

    /// Path of the event endpoint
    pub event_path: String,

    /// Value of the `X-Device-ID` header
    pub device_id: DeviceId,

    /// Value of the `X-API-Key` header
    pub api_key: ApiKey,

    /// Timeout for each request
    pub timeout: Duration,
}

impl HttpStatusClientConfig {
    /// Create a configuration with the default paths and timeout.
    pub fn new(base_url: Url, device_id: DeviceId, api_key: ApiKey) -> Self {
        Self {
            base_url,
            status_path: DEFAULT_STATUS_PATH.to_string(),
            event_path: DEFAULT_EVENT_PATH.to_string(),
            device_id,
            api_key,
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the endpoint paths.
    #[must_use]
    pub fn with_paths(mut self, status_path: impl Into<String>, event_path: impl Into<String>) -> Self {
        self.status_path = status_path.into();
        self.event_path = event_path.into();
        self
    }
}

/// reqwest-backed [`StatusClient`].
///
/// # Thread Safety
///
/// The client is owned by a single engine and used from the control loop
/// only; nothing is shared between tasks.
#[derive(Debug)]
pub struct HttpStatusClient {
    http: reqwest::Client,
    status_url: Url,
    event_url: Url,
    device_id: DeviceId,
    api_key: ApiKey,
    timeout: Duration,
}

impl HttpStatusClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An endpoint URL cannot be built from the base URL and path
    /// - The underlying HTTP client cannot be constructed
    pub fn new(config: HttpStatusClientConfig) -> Result<Self> {
        let status_url = endpoint_url(&config.base_url, &config.status_path)?;
        let event_url = endpoint_url(&config.base_url, &config.event_path)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        debug!(
            status_url = %status_url,
            event_url = %event_url,
            device_id = %config.device_id,
            "Created status client"
        );

        Ok(Self {
            http,
            status_url,
            event_url,
            device_id: config.device_id,
            api_key: config.api_key,
            timeout: config.timeout,
        })
    }

    /// URL of the key status endpoint.
    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    /// URL of the event endpoint.
    pub fn event_url(&self) -> &Url {
        &self.event_url
    }

    fn with_device_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(HEADER_DEVICE_ID, self.device_id.as_str())
            .header(HEADER_API_KEY, self.api_key.expose())
    }

    fn transport_error(&self, err: reqwest::Error) -> NetworkError {
        if err.is_timeout() {
            let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            warn!("Request timeout after {}ms", timeout_ms);
            NetworkError::Timeout(timeout_ms)
        } else {
            warn!("Request failed: {}", err);
            NetworkError::transport(err.to_string())
        }
    }
}

impl StatusClient for HttpStatusClient {
    async fn fetch_key_state(&mut self) -> Result<bool> {
        trace!(url = %self.status_url, "Checking key status");

        let response = self
            .with_device_headers(self.http.get(self.status_url.clone()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(code = status.as_u16(), "Failed to check key status");
            return Err(NetworkError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed = KeyStatusResponse::parse(&body).inspect_err(|e| {
            warn!(error = %e, "Key status response could not be interpreted");
        })?;

        info!(
            key_taken = parsed.key_taken,
            current_holder = parsed.current_holder.as_deref().unwrap_or("-"),
            "Fetched key status"
        );

        Ok(parsed.key_taken)
    }

    async fn submit_event(&mut self, event: &TagEvent) -> Result<bool> {
        let payload = EventRequest::from(event);

        debug!(
            event_id = %event.id(),
            tag_id = %event.tag_id(),
            event_type = %event.event_type(),
            url = %self.event_url,
            "Sending key event"
        );

        let response = self
            .with_device_headers(self.http.post(self.event_url.clone()))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                event_id = %event.id(),
                code = status.as_u16(),
                "Server rejected key event"
            );
            return Ok(false);
        }

        // a 200 whose body never fully arrived is an unknown outcome, not an acceptance
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let accepted = event_accepted(&body);
        if accepted {
            info!(event_id = %event.id(), event_type = %event.event_type(), "Key event accepted");
        } else {
            warn!(event_id = %event.id(), response = %body, "Server refused key event");
        }

        Ok(accepted)
    }
}

/// Join the base URL with an absolute endpoint path.
fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    if !path.starts_with('/') {
        return Err(NetworkError::invalid_url(format!(
            "endpoint path must start with '/': {path:?}"
        )));
    }

    if base.cannot_be_a_base() {
        return Err(NetworkError::invalid_url(format!(
            "{base} cannot be used as a base URL"
        )));
    }

    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| NetworkError::invalid_url(format!("{joined}: {e}")))
}
