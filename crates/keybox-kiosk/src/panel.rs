//! Actuator panel: the kiosk's LED and release servo.

use std::time::Duration;

use tracing::{debug, warn};

use keybox_engine::ActuatorSignal;
use keybox_hardware::{BlinkPattern, DeviceInfo, LedDevice, Result, ServoDevice};

/// Turns engine signals into LED and servo actions.
///
/// The LED mirrors the key state (lit while taken). A successful event
/// also pulses the servo to release or latch the key; every failure mode
/// has its own blink pattern.
#[derive(Debug)]
pub struct ActuatorPanel<L, S> {
    led: L,
    servo: S,
    servo_pulse: Duration,
}

impl<L: LedDevice, S: ServoDevice> ActuatorPanel<L, S> {
    pub fn new(led: L, servo: S, servo_pulse: Duration) -> Self {
        Self {
            led,
            servo,
            servo_pulse,
        }
    }

    /// Carry out `signal`.
    ///
    /// Actuator failures are logged and swallowed; a broken LED must not
    /// stop the kiosk from recording events or releasing the key. The LED
    /// and the servo are driven independently.
    pub async fn apply(&mut self, signal: ActuatorSignal) {
        if signal == ActuatorSignal::None {
            return;
        }

        debug!(?signal, "Applying actuator signal");
        let led = self.drive_led(signal).await;
        report(signal, "led", led);

        if let ActuatorSignal::Submitted { success: true, .. } = signal {
            let servo = self.servo.pulse(self.servo_pulse).await;
            report(signal, "servo", servo);
        }
    }

    async fn drive_led(&mut self, signal: ActuatorSignal) -> Result<()> {
        match signal {
            ActuatorSignal::None => Ok(()),
            ActuatorSignal::KeyState { taken } => self.led.set_level(taken).await,
            ActuatorSignal::Submitted {
                success: true,
                key_taken,
            } => self.led.set_level(key_taken).await,
            ActuatorSignal::Submitted { success: false, .. } => {
                self.led.blink(BlinkPattern::Rejected).await
            }
            ActuatorSignal::TryAgain => self.led.blink(BlinkPattern::TryAgain).await,
            ActuatorSignal::Fault => self.led.blink(BlinkPattern::Alarm).await,
        }
    }

    /// Ask both actuators to identify themselves, labelled by role.
    pub async fn device_info(&self) -> [(&'static str, Result<DeviceInfo>); 2] {
        [
            ("led", self.led.get_info().await),
            ("servo", self.servo.get_info().await),
        ]
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn servo(&self) -> &S {
        &self.servo
    }

    pub fn servo_pulse(&self) -> Duration {
        self.servo_pulse
    }
}

fn report(signal: ActuatorSignal, device: &'static str, result: Result<()>) {
    if let Err(e) = result {
        warn!(?signal, device, error = %e, "Actuator command failed");
    }
}
