//! Key-state belief machine.
//!
//! This module tracks how much the kiosk trusts its cached key state.
//!
//! # States
//!
//! - `Uninitialized`: nothing fetched yet
//! - `Ready(KeyState)`: the cached belief may be used to pick the next event
//! - `Degraded`: a fetch failed or a submit had an unknown outcome; the
//!   belief was discarded and must be rebuilt from the server
//!
//! # Valid Transitions
//!
//! - Uninitialized → Ready / Degraded
//! - Degraded → Ready
//! - Ready → Ready (optimistic flip or refresh) / Degraded
//!
//! Nothing leads back to `Uninitialized`; the machine runs for the whole
//! process lifetime.
//!
//! # Examples
//!
//! ```
//! use keybox_core::KeyState;
//! use keybox_engine::{EngineState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), EngineState::Uninitialized);
//!
//! machine.transition_to(EngineState::Ready(KeyState::Available)).unwrap();
//! assert!(machine.current_state().is_ready());
//!
//! // Invalid transition
//! assert!(machine.transition_to(EngineState::Uninitialized).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use keybox_core::{Error, KeyState, Result};

/// Maximum number of state transitions to keep in history.
///
/// A busy kiosk sees a few hundred taps a day, each producing at most two
/// transitions; 100 entries cover the recent past for diagnostics at a few
/// kilobytes.
const MAX_HISTORY_SIZE: usize = 100;

/// Trust level of the engine's cached key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Started, no fetch attempted or completed yet.
    Uninitialized,

    /// Cached belief is usable.
    Ready(KeyState),

    /// Belief discarded; the next tap must fetch first.
    Degraded,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Uninitialized => write!(f, "Uninitialized"),
            EngineState::Ready(key) => write!(f, "Ready({key})"),
            EngineState::Degraded => write!(f, "Degraded"),
        }
    }
}

impl EngineState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_core::KeyState;
    /// use keybox_engine::EngineState;
    ///
    /// assert!(EngineState::Uninitialized.can_transition_to(&EngineState::Degraded));
    /// assert!(!EngineState::Degraded.can_transition_to(&EngineState::Uninitialized));
    /// assert!(!EngineState::Degraded.can_transition_to(&EngineState::Degraded));
    /// ```
    pub fn can_transition_to(&self, target: &EngineState) -> bool {
        matches!(
            (self, target),
            // From Uninitialized
            (EngineState::Uninitialized, EngineState::Ready(_) | EngineState::Degraded)
            // From Degraded
            | (EngineState::Degraded, EngineState::Ready(_))
            // From Ready
            | (EngineState::Ready(_), EngineState::Ready(_) | EngineState::Degraded)
        )
    }

    /// The usable key state, if any.
    pub fn key_state(&self) -> Option<KeyState> {
        match self {
            EngineState::Ready(key) => Some(*key),
            EngineState::Uninitialized | EngineState::Degraded => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, EngineState::Degraded)
    }
}

/// Represents a single state transition with timestamp.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: EngineState,

    /// The state transitioned to.
    pub to: EngineState,

    /// When the transition occurred.
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: EngineState, to: EngineState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State machine enforcing valid belief transitions.
///
/// # Thread Safety
///
/// This struct is not thread-safe. It is owned by a single
/// reconciliation engine that runs on the control loop.
#[derive(Debug)]
pub struct StateMachine {
    /// Current state.
    current_state: EngineState,

    /// When the current state was entered.
    state_entered_at: Instant,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Uninitialized state.
    pub fn new() -> Self {
        Self {
            current_state: EngineState::Uninitialized,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> EngineState {
        self.current_state
    }

    /// Get the time spent in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Get the transition history, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N transitions, oldest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_core::KeyState;
    /// use keybox_engine::{EngineState, StateMachine};
    ///
    /// let mut machine = StateMachine::new();
    /// machine.transition_to(EngineState::Degraded).unwrap();
    /// machine.transition_to(EngineState::Ready(KeyState::Taken)).unwrap();
    ///
    /// let last = machine.last_transitions(1);
    /// assert_eq!(last[0].from, EngineState::Degraded);
    /// ```
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Attempt to transition to a new state.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state. The state is left unchanged.
    pub fn transition_to(&mut self, new_state: EngineState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        self.add_to_history(transition.clone());

        Ok(transition)
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
