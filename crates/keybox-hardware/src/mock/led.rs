//! Mock status LED for testing and development.

use crate::{
    Result,
    traits::LedDevice,
    types::{BlinkPattern, DeviceInfo},
};

/// Mock status LED.
///
/// Records the steady level and every blink pattern played, so tests can
/// assert on what the user would have seen.
///
/// # Examples
///
/// ```
/// use keybox_hardware::mock::MockLed;
/// use keybox_hardware::traits::LedDevice;
/// use keybox_hardware::types::BlinkPattern;
///
/// #[tokio::main]
/// async fn main() -> keybox_hardware::Result<()> {
///     let mut led = MockLed::new();
///
///     led.set_level(true).await?;
///     led.blink(BlinkPattern::TryAgain).await?;
///
///     assert!(led.level());
///     assert_eq!(led.blinks(), &[BlinkPattern::TryAgain]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockLed {
    level: bool,
    level_changes: usize,
    blinks: Vec<BlinkPattern>,
}

impl MockLed {
    /// Create a new mock LED, initially off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current steady level.
    pub fn level(&self) -> bool {
        self.level
    }

    /// Number of `set_level` calls received.
    pub fn level_changes(&self) -> usize {
        self.level_changes
    }

    /// Blink patterns played, oldest first.
    pub fn blinks(&self) -> &[BlinkPattern] {
        &self.blinks
    }
}

impl LedDevice for MockLed {
    async fn set_level(&mut self, on: bool) -> Result<()> {
        self.level = on;
        self.level_changes += 1;
        Ok(())
    }

    async fn blink(&mut self, pattern: BlinkPattern) -> Result<()> {
        self.blinks.push(pattern);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Mock Status LED", "Mock"))
    }
}
