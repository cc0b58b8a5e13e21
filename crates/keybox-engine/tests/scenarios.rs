//! End-to-end tag handling scenarios.
//!
//! One engine is driven through a full session: startup fetch, a take, a
//! suppressed double read, a failed return, a dropped tap while the server is
//! down, and recovery through a fresh fetch.

use std::time::{Duration, Instant};

use keybox_core::{EventType, KeyState, TagId};
use keybox_engine::{ActuatorSignal, EngineOutcome, EngineState, ReconciliationEngine};
use keybox_network::{MockStatusClient, NetworkError, StatusCall};

fn tag(id: &str) -> TagId {
    TagId::new(id).unwrap()
}

fn at(t0: Instant, offset_ms: u64) -> Instant {
    t0 + Duration::from_millis(offset_ms)
}

#[tokio::test]
async fn test_full_session() {
    let mut client = MockStatusClient::new();
    client
        // Scenario 1: startup fetch, then a take
        .push_fetch(Ok(false))
        .push_submit(Ok(true))
        // Scenario 3: return fails
        .push_submit(Err(NetworkError::Timeout(3000)))
        // Scenario 4: server still unreachable
        .push_fetch(Err(NetworkError::transport("connection refused")))
        // Scenario 5: server back, key is still taken
        .push_fetch(Ok(true))
        .push_submit(Ok(true));

    let mut engine = ReconciliationEngine::new(client);
    let t0 = Instant::now();

    // Scenario 1
    assert_eq!(
        engine.initialize().await,
        EngineState::Ready(KeyState::Available)
    );
    let outcome = engine.handle_tag_read(tag("AB12"), at(t0, 0)).await;
    assert_eq!(
        outcome,
        EngineOutcome::Submitted {
            event_type: EventType::Take,
            success: true
        }
    );
    assert_eq!(engine.key_state(), Some(KeyState::Taken));

    // Scenario 2
    let outcome = engine.handle_tag_read(tag("AB12"), at(t0, 300)).await;
    assert_eq!(outcome, EngineOutcome::Suppressed);
    assert_eq!(outcome.actuator_signal(&engine), ActuatorSignal::None);
    assert_eq!(engine.key_state(), Some(KeyState::Taken));
    assert_eq!(engine.client().calls().len(), 2);

    // Scenario 3
    let outcome = engine.handle_tag_read(tag("AB12"), at(t0, 1500)).await;
    assert_eq!(
        outcome,
        EngineOutcome::Submitted {
            event_type: EventType::Return,
            success: false
        }
    );
    assert_eq!(engine.state(), EngineState::Degraded);
    assert_eq!(
        outcome.actuator_signal(&engine),
        ActuatorSignal::Submitted {
            success: false,
            key_taken: false
        }
    );

    // Scenario 4
    let outcome = engine.handle_tag_read(tag("CD34"), at(t0, 2500)).await;
    assert_eq!(outcome, EngineOutcome::Dropped);
    assert_eq!(outcome.actuator_signal(&engine), ActuatorSignal::TryAgain);
    assert_eq!(engine.state(), EngineState::Degraded);

    // Scenario 5
    let outcome = engine.handle_tag_read(tag("CD34"), at(t0, 3500)).await;
    assert_eq!(
        outcome,
        EngineOutcome::Submitted {
            event_type: EventType::Return,
            success: true
        }
    );
    assert_eq!(engine.key_state(), Some(KeyState::Available));
    assert!(engine.client().is_exhausted());
    assert_eq!(
        engine.client().submitted_event_types(),
        vec![EventType::Take, EventType::Return, EventType::Return]
    );
}

/// A tap 500 ms after a dropped tap is still inside the debounce window
#[tokio::test]
async fn test_dropped_tap_still_starts_debounce_window() {
    let mut client = MockStatusClient::new();
    client.push_fetch(Err(NetworkError::Timeout(3000)));
    let mut engine = ReconciliationEngine::new(client);
    let t0 = Instant::now();

    assert_eq!(
        engine.handle_tag_read(tag("CD34"), at(t0, 0)).await,
        EngineOutcome::Dropped
    );
    assert_eq!(
        engine.handle_tag_read(tag("CD34"), at(t0, 500)).await,
        EngineOutcome::Suppressed
    );
    assert_eq!(engine.client().fetch_count(), 1);
}

/// Debounce is per kiosk, not per tag
#[tokio::test]
async fn test_different_tag_inside_window_is_suppressed() {
    let mut engine = ReconciliationEngine::new(MockStatusClient::simulated(false));
    let t0 = Instant::now();

    assert!(engine.handle_tag_read(tag("AB12"), at(t0, 0)).await.is_submitted());
    assert_eq!(
        engine.handle_tag_read(tag("CD34"), at(t0, 400)).await,
        EngineOutcome::Suppressed
    );
}

/// A rejected take leaves the server's key available, so the next tap
/// fetches and takes again instead of returning.
#[tokio::test]
async fn test_recovery_uses_server_state_not_stale_belief() {
    let mut client = MockStatusClient::simulated(false);
    client.push_submit(Ok(false));
    let mut engine = ReconciliationEngine::new(client);
    let t0 = Instant::now();

    engine.initialize().await;
    let outcome = engine.handle_tag_read(tag("AB12"), at(t0, 0)).await;
    assert_eq!(outcome.event_type(), Some(EventType::Take));
    assert_eq!(engine.state(), EngineState::Degraded);

    // Stays Available on the server because the submit was rejected
    let outcome = engine.handle_tag_read(tag("AB12"), at(t0, 1000)).await;
    assert_eq!(
        outcome,
        EngineOutcome::Submitted {
            event_type: EventType::Take,
            success: true
        }
    );
    assert_eq!(
        engine.client().calls()[2..],
        [
            StatusCall::Fetch,
            StatusCall::Submit {
                tag_id: tag("AB12"),
                event_type: EventType::Take
            }
        ]
    );
}

#[tokio::test]
async fn test_alarm_turns_dropped_taps_into_faults() {
    let mut engine = ReconciliationEngine::<MockStatusClient>::builder()
        .with_fetch_failure_alarm_threshold(2)
        .build(MockStatusClient::new());
    let t0 = Instant::now();

    let first = engine.handle_tag_read(tag("AB12"), at(t0, 0)).await;
    assert_eq!(first.actuator_signal(&engine), ActuatorSignal::TryAgain);

    let second = engine.handle_tag_read(tag("AB12"), at(t0, 1000)).await;
    assert_eq!(second, EngineOutcome::Dropped);
    assert_eq!(second.actuator_signal(&engine), ActuatorSignal::Fault);
    assert!(engine.is_alarmed());
}
