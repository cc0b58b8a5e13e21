//! Mock release servo for testing and development.

use std::time::Duration;

use crate::{Result, traits::ServoDevice, types::DeviceInfo};

/// Mock release servo.
///
/// Pulses return immediately and are recorded for inspection.
#[derive(Debug, Default)]
pub struct MockServo {
    pulses: Vec<Duration>,
}

impl MockServo {
    /// Create a new mock servo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses requested so far, oldest first.
    pub fn pulses(&self) -> &[Duration] {
        &self.pulses
    }
}

impl ServoDevice for MockServo {
    async fn pulse(&mut self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            return Err(crate::HardwareError::invalid_data(
                "Servo pulse duration must be positive",
            ));
        }
        self.pulses.push(duration);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Mock Release Servo", "Mock"))
    }
}
