//! Tag-event reconciliation.
//!
//! [`ReconciliationEngine`] turns debounced tag reads into Take/Return
//! events. It keeps a cached belief of the key state, flips it optimistically
//! after each accepted event, and throws it away whenever the outcome of a
//! mutation is unknown. A discarded belief is rebuilt from the server on the
//! next tap, never by an immediate retry.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use keybox_core::constants::{DEBOUNCE_COOLDOWN_MS, DEFAULT_FETCH_FAILURE_ALARM_THRESHOLD};
use keybox_core::{KeyState, TagEvent, TagId};
use keybox_network::StatusClient;

use crate::debounce::DebounceGate;
use crate::outcome::EngineOutcome;
use crate::state_machine::{EngineState, StateMachine, StateTransition};

/// Reconciles local tag reads with the server of record.
///
/// All mutation goes through `&mut self`, so a tag is handled to completion,
/// network round trips included, before the next one starts.
///
/// # Examples
///
/// ```
/// use keybox_core::{EventType, TagId};
/// use keybox_engine::{EngineOutcome, ReconciliationEngine};
/// use keybox_network::MockStatusClient;
/// use std::time::Instant;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let mut engine = ReconciliationEngine::new(MockStatusClient::simulated(false));
///     engine.initialize().await;
///
///     let outcome = engine
///         .handle_tag_read(TagId::new("AB12").unwrap(), Instant::now())
///         .await;
///     assert_eq!(
///         outcome,
///         EngineOutcome::Submitted { event_type: EventType::Take, success: true }
///     );
/// }
/// ```
#[derive(Debug)]
pub struct ReconciliationEngine<C> {
    client: C,
    machine: StateMachine,
    debounce: DebounceGate,

    /// Consecutive failed fetches; cleared by any successful fetch.
    fetch_failure_streak: u32,

    /// Streak length at which dropped taps become faults. Zero disables.
    alarm_threshold: u32,
}

impl<C: StatusClient> ReconciliationEngine<C> {
    /// Create an engine with the default cooldown and alarm threshold.
    pub fn new(client: C) -> Self {
        Self::builder().build(client)
    }

    pub fn builder() -> ReconciliationEngineBuilder {
        ReconciliationEngineBuilder::default()
    }

    /// Fetch the key state from the server.
    ///
    /// Meant for startup, but safe to call at any time to resync the cached
    /// belief. A failure leaves the engine `Degraded`; the next tap retries.
    pub async fn initialize(&mut self) -> EngineState {
        self.refresh().await;
        self.state()
    }

    /// Handle one tag read observed at `now`.
    pub async fn handle_tag_read(&mut self, tag_id: TagId, now: Instant) -> EngineOutcome {
        if !self.debounce.accept(now) {
            debug!(tag_id = %tag_id, "Read suppressed by debounce");
            return EngineOutcome::Suppressed;
        }

        let key = match self.machine.current_state() {
            EngineState::Ready(key) => key,
            EngineState::Uninitialized | EngineState::Degraded => {
                debug!(state = %self.state(), "Key state unknown, fetching before deciding");
                match self.refresh().await {
                    Some(key) => key,
                    None => {
                        warn!(tag_id = %tag_id, "Tap dropped, key state unavailable");
                        return EngineOutcome::Dropped;
                    }
                }
            }
        };

        let event = TagEvent::new(tag_id, key.next_event(), now);
        let event_type = event.event_type();
        info!(
            event_id = %event.id(),
            tag_id = %event.tag_id(),
            event_type = %event_type,
            "Submitting key event"
        );

        let success = match self.client.submit_event(&event).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(event_id = %event.id(), "Server rejected key event");
                false
            }
            Err(e) => {
                warn!(event_id = %event.id(), error = %e, "Key event submission failed");
                false
            }
        };

        if success {
            let flipped = key.flipped();
            info!(event_id = %event.id(), key_state = %flipped, "Key state flipped");
            self.set_state(EngineState::Ready(flipped));
        } else {
            self.set_state(EngineState::Degraded);
        }

        EngineOutcome::Submitted {
            event_type,
            success,
        }
    }

    pub fn state(&self) -> EngineState {
        self.machine.current_state()
    }

    /// Cached key state, if the engine currently trusts it.
    pub fn key_state(&self) -> Option<KeyState> {
        self.state().key_state()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().is_ready()
    }

    pub fn fetch_failure_streak(&self) -> u32 {
        self.fetch_failure_streak
    }

    /// Whether consecutive fetch failures have reached the alarm threshold.
    pub fn is_alarmed(&self) -> bool {
        self.alarm_threshold > 0 && self.fetch_failure_streak >= self.alarm_threshold
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn debounce(&self) -> &DebounceGate {
        &self.debounce
    }

    /// Recent state transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.machine.last_transitions(count)
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.machine.time_in_current_state()
    }

    async fn refresh(&mut self) -> Option<KeyState> {
        match self.client.fetch_key_state().await {
            Ok(taken) => {
                if self.fetch_failure_streak > 0 {
                    info!(
                        failures = self.fetch_failure_streak,
                        "Key status fetch recovered"
                    );
                }
                self.fetch_failure_streak = 0;

                let key = KeyState::from_taken(taken);
                debug!(key_state = %key, "Fetched key state");
                self.set_state(EngineState::Ready(key));
                Some(key)
            }
            Err(e) => {
                self.fetch_failure_streak = self.fetch_failure_streak.saturating_add(1);
                if self.alarm_threshold > 0 && self.fetch_failure_streak == self.alarm_threshold {
                    error!(
                        failures = self.fetch_failure_streak,
                        error = %e,
                        "Key status unreachable, raising alarm"
                    );
                } else {
                    warn!(
                        failures = self.fetch_failure_streak,
                        error = %e,
                        "Key status fetch failed"
                    );
                }

                if !self.state().is_degraded() {
                    self.set_state(EngineState::Degraded);
                }
                None
            }
        }
    }

    fn set_state(&mut self, next: EngineState) {
        match self.machine.transition_to(next) {
            Ok(transition) => {
                debug!(from = %transition.from, to = %transition.to, "Engine state changed");
            }
            Err(e) => error!(error = %e, "Rejected engine state change"),
        }
    }
}

/// Builder for [`ReconciliationEngine`].
#[derive(Debug, Clone)]
pub struct ReconciliationEngineBuilder {
    cooldown: Duration,
    alarm_threshold: u32,
}

impl Default for ReconciliationEngineBuilder {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(DEBOUNCE_COOLDOWN_MS),
            alarm_threshold: DEFAULT_FETCH_FAILURE_ALARM_THRESHOLD,
        }
    }
}

impl ReconciliationEngineBuilder {
    /// Set the debounce cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set how many consecutive fetch failures raise the alarm. Zero
    /// disables the alarm.
    pub fn with_fetch_failure_alarm_threshold(mut self, threshold: u32) -> Self {
        self.alarm_threshold = threshold;
        self
    }

    pub fn build<C: StatusClient>(self, client: C) -> ReconciliationEngine<C> {
        ReconciliationEngine {
            client,
            machine: StateMachine::new(),
            debounce: DebounceGate::new(self.cooldown),
            fetch_failure_streak: 0,
            alarm_threshold: self.alarm_threshold,
        }
    }
}
