//! Key-checkout kiosk.
//!
//! Wires the tag reader, the reconciliation engine, and the actuator panel
//! into one control loop, and loads the configuration that drives them.

pub mod config;
pub mod controller;
pub mod error;
pub mod panel;

pub use config::KioskConfig;
pub use controller::{Kiosk, KioskStats};
pub use error::{KioskError, Result};
pub use panel::ActuatorPanel;
