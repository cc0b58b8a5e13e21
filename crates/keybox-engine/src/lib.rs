//! Key-checkout reconciliation engine.
//!
//! This crate decides, for each tag tap, whether the key is being taken or
//! returned, and keeps the kiosk's view of the key consistent with the
//! server of record.
//!
//! # Components
//!
//! - **DebounceGate**: collapses repeated reads of one tap
//! - **StateMachine**: trust level of the cached key state, with history
//! - **ReconciliationEngine**: fetch, decide, submit, flip or discard
//! - **EngineOutcome / ActuatorSignal**: what happened, and what the LED and
//!   servo should do about it

pub mod debounce;
pub mod engine;
pub mod outcome;
pub mod state_machine;

pub use debounce::DebounceGate;
pub use engine::{ReconciliationEngine, ReconciliationEngineBuilder};
pub use outcome::{ActuatorSignal, EngineOutcome};
pub use state_machine::{EngineState, StateMachine, StateTransition};
