//! Core constants for the key-checkout kiosk.
//!
//! This module centralizes the values shared between the reconciliation
//! engine, the status client, and the kiosk control loop: debounce timing,
//! the authority server contract (paths, headers, wire values), and the
//! default device identity.
//!
//! # Usage
//!
//! ```
//! use keybox_core::constants::*;
//! use std::time::Duration;
//!
//! let cooldown = Duration::from_millis(DEBOUNCE_COOLDOWN_MS);
//! assert_eq!(cooldown.as_secs(), 1);
//!
//! assert_eq!(EVENT_TYPE_TAKE, "take");
//! assert_eq!(EVENT_TYPE_RETURN, "return");
//! ```
//!
//! # Server Compatibility
//!
//! Paths, header names, and wire values match the existing authority server.
//! Changing them breaks compatibility with deployed servers.

// ============================================================================
// Debounce
// ============================================================================

/// Cooldown between two accepted tag reads (milliseconds).
///
/// Reads arriving within this window of an accepted read belong to the same
/// physical tap and are suppressed.
///
/// # Value: 1000ms
pub const DEBOUNCE_COOLDOWN_MS: u64 = 1000;

// ============================================================================
// Tag Identifier Constraints
// ============================================================================

/// Minimum tag identifier length (characters).
pub const MIN_TAG_ID_LENGTH: usize = 1;

/// Maximum tag identifier length (characters).
///
/// A 10-byte ISO 14443 UID renders to 20 hex characters; the extra room
/// covers readers that prefix a type marker.
pub const MAX_TAG_ID_LENGTH: usize = 32;

// ============================================================================
// Wire Values
// ============================================================================

/// Wire value for a key take event.
pub const EVENT_TYPE_TAKE: &str = "take";

/// Wire value for a key return event.
pub const EVENT_TYPE_RETURN: &str = "return";

// ============================================================================
// Server Contract
// ============================================================================

/// Key status endpoint queried by the device.
///
/// # Examples
///
/// ```
/// use keybox_core::constants::DEFAULT_STATUS_PATH;
///
/// let url = format!("http://192.168.0.10:3000{DEFAULT_STATUS_PATH}");
/// assert!(url.ends_with("/api/key-status-for-esp"));
/// ```
pub const DEFAULT_STATUS_PATH: &str = "/api/key-status-for-esp";

/// Key event submission endpoint.
pub const DEFAULT_EVENT_PATH: &str = "/api/log-key-event";

/// Header carrying the device identifier.
pub const HEADER_DEVICE_ID: &str = "X-Device-ID";

/// Header carrying the device API key.
pub const HEADER_API_KEY: &str = "X-API-Key";

/// Device identifier the authority server expects from the kiosk.
pub const DEFAULT_DEVICE_ID: &str = "esp32-matik-registration";

/// Default base URL of the authority server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

// ============================================================================
// Timeouts
// ============================================================================

/// Default HTTP request timeout (milliseconds).
///
/// A timeout is reported as an ordinary transport failure.
///
/// # Examples
///
/// ```
/// use keybox_core::constants::DEFAULT_HTTP_TIMEOUT_MS;
/// use std::time::Duration;
///
/// let timeout = Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS);
/// assert_eq!(timeout.as_secs(), 3);
/// ```
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3000;

/// Minimum accepted HTTP timeout (milliseconds).
pub const MIN_HTTP_TIMEOUT_MS: u64 = 100;

/// Maximum accepted HTTP timeout (milliseconds).
///
/// The control loop stalls for the whole request, so long timeouts freeze the
/// kiosk.
///
/// # Value: 10000ms (10 seconds)
pub const MAX_HTTP_TIMEOUT_MS: u64 = 10000;

// ============================================================================
// Control Loop
// ============================================================================

/// Default tag reader polling interval (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default servo pulse length after a successful event (milliseconds).
pub const DEFAULT_SERVO_PULSE_MS: u64 = 1000;

/// Consecutive failed key status fetches before the engine raises an alarm.
pub const DEFAULT_FETCH_FAILURE_ALARM_THRESHOLD: u32 = 3;
