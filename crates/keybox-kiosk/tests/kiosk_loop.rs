//! Control loop integration tests.
//!
//! The loop runs on a paused clock, so poll ticks and debounce windows
//! advance deterministically.

use std::time::Duration;

use keybox_core::{EventType, KeyState};
use keybox_engine::ReconciliationEngine;
use keybox_hardware::BlinkPattern;
use keybox_hardware::mock::{MockLed, MockServo, MockTagReader};
use keybox_kiosk::{ActuatorPanel, Kiosk, KioskConfig, KioskStats};
use keybox_network::{MockStatusClient, NetworkError};

fn panel() -> ActuatorPanel<MockLed, MockServo> {
    ActuatorPanel::new(MockLed::new(), MockServo::new(), Duration::from_millis(1000))
}

#[tokio::test(start_paused = true)]
async fn test_loop_processes_tags_until_reader_disconnects() {
    let (reader, handle) = MockTagReader::new();
    let engine = ReconciliationEngine::new(MockStatusClient::simulated(false));
    let mut kiosk = Kiosk::new(reader, engine, panel(), Duration::from_millis(50));

    // Two reads of one tap, then the reader goes away
    handle.present_hex("04:AB:CD:EF").await.unwrap();
    handle.present_hex("04:AB:CD:EF").await.unwrap();
    drop(handle);

    kiosk.run(std::future::pending()).await.unwrap();

    assert_eq!(
        kiosk.stats(),
        KioskStats {
            reads: 2,
            suppressed: 1,
            accepted: 1,
            ..KioskStats::default()
        }
    );
    assert_eq!(kiosk.engine().key_state(), Some(KeyState::Taken));
    assert_eq!(
        kiosk.engine().client().submitted_event_types(),
        vec![EventType::Take]
    );
    assert!(kiosk.panel().led().level());
    assert_eq!(kiosk.panel().servo().pulses().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_loop_stops_on_shutdown() {
    let (reader, handle) = MockTagReader::new();
    let engine = ReconciliationEngine::new(MockStatusClient::simulated(true));
    let mut kiosk = Kiosk::new(reader, engine, panel(), Duration::from_millis(50));

    kiosk
        .run(tokio::time::sleep(Duration::from_millis(500)))
        .await
        .unwrap();

    // Startup fetch ran and the LED mirrors it; the reader is still alive
    assert!(kiosk.engine().is_initialized());
    assert!(kiosk.panel().led().level());
    assert_eq!(kiosk.stats(), KioskStats::default());
    drop(handle);
}

#[tokio::test(start_paused = true)]
async fn test_loop_signals_server_outage() {
    let mut client = MockStatusClient::new();
    client
        .push_fetch(Err(NetworkError::Timeout(3000)))
        .push_fetch(Err(NetworkError::Timeout(3000)));

    let config = KioskConfig::from_toml_str("[engine]\nfetch_failure_alarm_threshold = 2\n").unwrap();
    let (reader, handle) = MockTagReader::new();
    let engine = config.engine_builder().build(client);
    let mut kiosk = Kiosk::new(reader, engine, panel(), config.poll_interval());

    handle.present_hex("04ABCDEF").await.unwrap();
    drop(handle);
    kiosk.run(std::future::pending()).await.unwrap();

    // Startup fetch failed, then the tap's fetch failed and hit the threshold
    assert_eq!(kiosk.stats().dropped, 1);
    assert!(kiosk.engine().is_alarmed());
    assert_eq!(kiosk.panel().led().blinks(), &[BlinkPattern::Alarm]);
}
