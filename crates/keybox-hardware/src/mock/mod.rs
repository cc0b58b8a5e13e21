//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod led;
pub mod reader;
pub mod servo;

// Re-export commonly used types
pub use led::MockLed;
pub use reader::{MockTagReader, MockTagReaderHandle};
pub use servo::MockServo;
