//! Results of tag handling and what the actuators should do about them.

use serde::{Deserialize, Serialize};

use keybox_core::{EventType, KeyState};
use keybox_network::StatusClient;

use crate::engine::ReconciliationEngine;
use crate::state_machine::EngineState;

/// What happened to a single tag read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EngineOutcome {
    /// Read fell inside the debounce window of an earlier tap.
    Suppressed,

    /// Key state was unknown and could not be fetched; no event was emitted.
    Dropped,

    /// An event was emitted to the server.
    Submitted { event_type: EventType, success: bool },
}

impl EngineOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, EngineOutcome::Submitted { .. })
    }

    /// Event type of a submitted outcome.
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            EngineOutcome::Submitted { event_type, .. } => Some(*event_type),
            EngineOutcome::Suppressed | EngineOutcome::Dropped => None,
        }
    }

    /// Translate this outcome into an actuator signal.
    ///
    /// Must be called right after the `handle_tag_read` that produced the
    /// outcome, since the signal reads the engine's current belief and
    /// alarm status.
    pub fn actuator_signal<C: StatusClient>(
        &self,
        engine: &ReconciliationEngine<C>,
    ) -> ActuatorSignal {
        match self {
            EngineOutcome::Suppressed => ActuatorSignal::None,
            EngineOutcome::Dropped if engine.is_alarmed() => ActuatorSignal::Fault,
            EngineOutcome::Dropped => ActuatorSignal::TryAgain,
            EngineOutcome::Submitted { success, .. } => ActuatorSignal::Submitted {
                success: *success,
                key_taken: engine.key_state().is_some_and(KeyState::is_taken),
            },
        }
    }
}

/// Instruction for the LED and servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ActuatorSignal {
    /// Leave the actuators alone.
    None,

    /// Mirror a freshly fetched key state on the LED.
    KeyState { taken: bool },

    /// Result of an event submission. `key_taken` is only meaningful when
    /// `success` is true.
    Submitted { success: bool, key_taken: bool },

    /// Tap was dropped; the user should tap again.
    TryAgain,

    /// Tap was dropped and the server has been unreachable for a while.
    Fault,
}

impl ActuatorSignal {
    /// Signal for an engine state reached outside tag handling, such as the
    /// startup fetch.
    ///
    /// ```
    /// use keybox_core::KeyState;
    /// use keybox_engine::{ActuatorSignal, EngineState};
    ///
    /// assert_eq!(
    ///     ActuatorSignal::for_state(EngineState::Ready(KeyState::Taken)),
    ///     ActuatorSignal::KeyState { taken: true }
    /// );
    /// assert_eq!(ActuatorSignal::for_state(EngineState::Degraded), ActuatorSignal::None);
    /// ```
    pub fn for_state(state: EngineState) -> Self {
        match state.key_state() {
            Some(key) => ActuatorSignal::KeyState {
                taken: key.is_taken(),
            },
            None => ActuatorSignal::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybox_network::{MockStatusClient, NetworkError};
    use std::time::{Duration, Instant};

    use keybox_core::TagId;

    #[tokio::test]
    async fn test_suppressed_maps_to_none() {
        let engine = ReconciliationEngine::new(MockStatusClient::new());
        assert_eq!(
            EngineOutcome::Suppressed.actuator_signal(&engine),
            ActuatorSignal::None
        );
    }

    #[tokio::test]
    async fn test_dropped_maps_to_try_again_then_fault() {
        let mut client = MockStatusClient::new();
        client.push_fetch(Err(NetworkError::Timeout(3000)));
        let mut engine = ReconciliationEngine::<MockStatusClient>::builder()
            .with_fetch_failure_alarm_threshold(1)
            .build(client);

        assert_eq!(
            EngineOutcome::Dropped.actuator_signal(&engine),
            ActuatorSignal::TryAgain
        );

        let outcome = engine
            .handle_tag_read(TagId::new("AB12").unwrap(), Instant::now())
            .await;
        assert_eq!(outcome, EngineOutcome::Dropped);
        assert_eq!(outcome.actuator_signal(&engine), ActuatorSignal::Fault);
    }

    #[tokio::test]
    async fn test_submitted_reports_new_key_state() {
        let mut engine = ReconciliationEngine::new(MockStatusClient::simulated(false));
        let t0 = Instant::now();

        let outcome = engine.handle_tag_read(TagId::new("AB12").unwrap(), t0).await;
        assert_eq!(
            outcome.actuator_signal(&engine),
            ActuatorSignal::Submitted {
                success: true,
                key_taken: true
            }
        );

        let outcome = engine
            .handle_tag_read(TagId::new("AB12").unwrap(), t0 + Duration::from_secs(2))
            .await;
        assert_eq!(
            outcome.actuator_signal(&engine),
            ActuatorSignal::Submitted {
                success: true,
                key_taken: false
            }
        );
    }

    #[test]
    fn test_event_type_accessor() {
        let outcome = EngineOutcome::Submitted {
            event_type: EventType::Return,
            success: false,
        };
        assert!(outcome.is_submitted());
        assert_eq!(outcome.event_type(), Some(EventType::Return));
        assert_eq!(EngineOutcome::Dropped.event_type(), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = EngineOutcome::Submitted {
            event_type: EventType::Take,
            success: true,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "submitted", "event_type": "take", "success": true})
        );
    }
}
