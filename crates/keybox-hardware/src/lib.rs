//! Hardware device abstraction layer for the key-checkout kiosk.
//!
//! This crate provides trait-based abstractions for the kiosk peripherals:
//! the radio tag reader, the status LED, and the release servo. The traits
//! allow swapping mock implementations (for development and testing) for
//! real hardware drivers without touching the control loop.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Non-blocking reads**: the tag reader is polled, never awaited until a
//!   tag shows up, so the control loop keeps ticking.
//! - **Error-aware**: All operations return `Result<T>` with detailed error
//!   information.
//!
//! # Tag Reader
//!
//! ```no_run
//! use keybox_hardware::traits::TagReader;
//! use keybox_hardware::error::Result;
//!
//! async fn next_tag<R: TagReader>(reader: &mut R) -> Result<Option<keybox_core::TagId>> {
//!     match reader.try_read_tag().await? {
//!         Some(read) => Ok(Some(read.tag_id()?)),
//!         None => Ok(None),
//!     }
//! }
//! ```
//!
//! # Actuators
//!
//! ```no_run
//! use keybox_hardware::traits::{LedDevice, ServoDevice};
//! use keybox_hardware::error::Result;
//! use std::time::Duration;
//!
//! async fn release<L: LedDevice, S: ServoDevice>(led: &mut L, servo: &mut S) -> Result<()> {
//!     led.set_level(true).await?;
//!     servo.pulse(Duration::from_millis(1000)).await
//! }
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides [`MockTagReader`](mock::MockTagReader) (with
//! a handle to present tags), [`MockLed`](mock::MockLed), and
//! [`MockServo`](mock::MockServo).

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{LedDevice, MAX_UID_LENGTH, MIN_UID_LENGTH, ServoDevice, TagRead, TagReader};
pub use types::{BlinkPattern, DeviceInfo, ReaderInfo};
