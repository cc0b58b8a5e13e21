//! Common types shared across hardware device implementations.
//!
//! This module defines device metadata and the blink patterns the status LED
//! uses to tell the user what happened to a tap.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model,
/// and firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Status LED", "Release Servo").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Tag reader information.
///
/// Contains reader-specific metadata such as supported protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
        }
    }
}

/// Blink patterns shown on the single status LED.
///
/// The LED's steady level mirrors the key state (on = taken). Patterns are
/// short interruptions of that level, distinct enough that a user can tell a
/// rejected event from a tap that must be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BlinkPattern {
    /// Event was sent but the server did not accept it.
    Rejected,

    /// Tap could not be processed; present the tag again.
    TryAgain,

    /// Key state could not be fetched several times in a row.
    Alarm,
}

impl BlinkPattern {
    /// Number of on/off cycles.
    pub fn pulses(&self) -> u8 {
        match self {
            Self::Rejected => 2,
            Self::TryAgain => 4,
            Self::Alarm => 1,
        }
    }

    /// Duration the LED stays on in each cycle.
    pub fn on_time(&self) -> Duration {
        match self {
            Self::Rejected => Duration::from_millis(250),
            Self::TryAgain => Duration::from_millis(100),
            Self::Alarm => Duration::from_millis(2000),
        }
    }

    /// Duration the LED stays off in each cycle.
    pub fn off_time(&self) -> Duration {
        match self {
            Self::Rejected => Duration::from_millis(250),
            Self::TryAgain => Duration::from_millis(100),
            Self::Alarm => Duration::from_millis(500),
        }
    }

    /// Total time the pattern occupies the LED.
    pub fn total_duration(&self) -> Duration {
        (self.on_time() + self.off_time()) * u32::from(self.pulses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Status LED", "GPIO5").with_firmware_version("v1.0.0");

        assert_eq!(info.name, "Status LED");
        assert_eq!(info.model, "GPIO5");
        assert_eq!(info.firmware_version, Some("v1.0.0".to_string()));
    }

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()]);

        assert_eq!(info.name, "MFRC522");
        assert_eq!(info.protocols, vec!["ISO14443A"]);
    }

    #[test]
    fn test_blink_patterns_are_distinguishable() {
        let patterns = [BlinkPattern::Rejected, BlinkPattern::TryAgain, BlinkPattern::Alarm];

        for (i, a) in patterns.iter().enumerate() {
            for b in patterns.iter().skip(i + 1) {
                assert!(a.pulses() != b.pulses() || a.on_time() != b.on_time());
            }
        }
    }

    #[test]
    fn test_blink_total_duration() {
        assert_eq!(
            BlinkPattern::TryAgain.total_duration(),
            Duration::from_millis(800)
        );
        assert_eq!(
            BlinkPattern::Alarm.total_duration(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_blink_pattern_serialization() {
        let json = serde_json::to_string(&BlinkPattern::TryAgain).unwrap();
        assert_eq!(json, "\"try_again\"");
        let deserialized: BlinkPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, BlinkPattern::TryAgain);
    }
}
