//! Hardware device trait definitions.
//!
//! This module defines trait interfaces for the kiosk peripherals. These
//! traits establish the contract between the control loop and the devices
//! (tag reader, status LED, release servo), enabling easy substitution
//! between mock and real hardware implementations.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use keybox_core::TagId;

use crate::error::Result;
use crate::types::{BlinkPattern, DeviceInfo, ReaderInfo};

/// Minimum UID length in bytes (per ISO 14443 specification).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// A single tag detection.
///
/// Contains the raw unique identifier (UID) reported by the reader and the
/// wall-clock time of the read. The control loop converts it into a
/// [`TagId`] before handing it to the engine.
#[derive(Debug, Clone)]
pub struct TagRead {
    /// Tag unique identifier (4-10 bytes).
    pub uid: Vec<u8>,

    /// Timestamp when the tag was read.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl TagRead {
    /// Create a new tag read with the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is not within the valid range
    /// of 4-10 bytes as specified by ISO 14443.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_hardware::traits::TagRead;
    ///
    /// let read = TagRead::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
    /// assert_eq!(read.uid_hex(), "04ABCDEF");
    /// ```
    pub fn new(uid: Vec<u8>) -> Result<Self> {
        TagReadBuilder::new(uid).build()
    }

    /// Create a builder for constructing a tag read with a custom timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_hardware::traits::TagRead;
    /// use chrono::{Utc, TimeZone};
    ///
    /// let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
    /// let read = TagRead::builder(vec![0x01, 0x02, 0x03, 0x04])
    ///     .timestamp(at)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(read.timestamp, at);
    /// ```
    pub fn builder(uid: Vec<u8>) -> TagReadBuilder {
        TagReadBuilder::new(uid)
    }

    /// Get the UID as an uppercase hexadecimal string.
    pub fn uid_hex(&self) -> String {
        self.uid.iter().map(|b| format!("{:02X}", b)).collect()
    }

    /// Convert the UID into the tag id reported to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID cannot form a valid tag id.
    pub fn tag_id(&self) -> Result<TagId> {
        Ok(TagId::from_uid_bytes(&self.uid)?)
    }
}

/// Builder for constructing a [`TagRead`] with optional fields.
#[derive(Debug, Clone)]
pub struct TagReadBuilder {
    uid: Vec<u8>,
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl TagReadBuilder {
    /// Create a new builder for the given UID.
    pub fn new(uid: Vec<u8>) -> Self {
        Self {
            uid,
            timestamp: None,
        }
    }

    /// Set a custom timestamp for the read.
    ///
    /// If not set, the current time will be used when build() is called.
    pub fn timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the tag read with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is not between
    /// `MIN_UID_LENGTH` and `MAX_UID_LENGTH`.
    pub fn build(self) -> Result<TagRead> {
        let uid_len = self.uid.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&uid_len) {
            return Err(crate::HardwareError::invalid_data(format!(
                "Tag UID length must be between {} and {} bytes, got {}",
                MIN_UID_LENGTH, MAX_UID_LENGTH, uid_len
            )));
        }

        Ok(TagRead {
            uid: self.uid,
            timestamp: self.timestamp.unwrap_or_else(chrono::Utc::now),
        })
    }
}

/// Radio tag reader abstraction.
///
/// The reader is polled once per control loop tick, so reads must never
/// block waiting for a tag.
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future` (Edition 2024 RPITIT). Use generic type parameters instead
/// of `Box<dyn TagReader>`.
///
/// # Examples
///
/// ```no_run
/// use keybox_hardware::traits::TagReader;
/// use keybox_hardware::error::Result;
///
/// async fn poll_once<R: TagReader>(reader: &mut R) -> Result<Option<String>> {
///     let read = reader.try_read_tag().await?;
///     Ok(read.map(|r| r.uid_hex()))
/// }
/// ```
pub trait TagReader: Send + Sync {
    /// Return the next presented tag, if any.
    ///
    /// Returns `Ok(None)` immediately when no new tag is in the field.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tag cannot be read (communication error, bad UID)
    /// - The device is disconnected
    async fn try_read_tag(&mut self) -> Result<Option<TagRead>>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// reader information.
    async fn get_reader_info(&self) -> Result<ReaderInfo>;
}

/// Single-color status LED.
///
/// The steady level shows whether the key is checked out; blink patterns
/// report the outcome of a tap.
pub trait LedDevice: Send + Sync {
    /// Set the steady LED level.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn set_level(&mut self, on: bool) -> Result<()>;

    /// Play a blink pattern, then restore the previous steady level.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device does not support blinking
    /// - A communication error occurs
    async fn blink(&mut self, pattern: BlinkPattern) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Release servo that frees the key holder after a successful event.
pub trait ServoDevice: Send + Sync {
    /// Drive the servo for `duration`, then return it to neutral.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn pulse(&mut self, duration: Duration) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
