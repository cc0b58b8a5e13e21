//! The kiosk control loop.
//!
//! One loop owns the reader, the engine, and the actuator panel. Each tick
//! polls the reader once; a tag read is handled to completion (including
//! its network round trips and actuator reaction) before the next poll.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use keybox_engine::{ActuatorSignal, EngineOutcome, ReconciliationEngine};
use keybox_hardware::{LedDevice, ServoDevice, TagReader};
use keybox_network::StatusClient;

use crate::error::Result;
use crate::panel::ActuatorPanel;

/// Counters for what the loop has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KioskStats {
    pub reads: u64,
    pub invalid_reads: u64,
    pub suppressed: u64,
    pub dropped: u64,
    pub accepted: u64,
    pub failed: u64,
}

impl KioskStats {
    fn record(&mut self, outcome: &EngineOutcome) {
        match outcome {
            EngineOutcome::Suppressed => self.suppressed += 1,
            EngineOutcome::Dropped => self.dropped += 1,
            EngineOutcome::Submitted { success: true, .. } => self.accepted += 1,
            EngineOutcome::Submitted { success: false, .. } => self.failed += 1,
        }
    }
}

/// Key-checkout kiosk.
#[derive(Debug)]
pub struct Kiosk<R, C, L, S> {
    reader: R,
    engine: ReconciliationEngine<C>,
    panel: ActuatorPanel<L, S>,
    poll_interval: Duration,
    stats: KioskStats,
}

impl<R, C, L, S> Kiosk<R, C, L, S>
where
    R: TagReader,
    C: StatusClient,
    L: LedDevice,
    S: ServoDevice,
{
    pub fn new(
        reader: R,
        engine: ReconciliationEngine<C>,
        panel: ActuatorPanel<L, S>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reader,
            engine,
            panel,
            poll_interval,
            stats: KioskStats::default(),
        }
    }

    /// Report the attached devices, fetch the key state and show it on the LED.
    pub async fn start(&mut self) {
        self.log_devices().await;

        let state = self.engine.initialize().await;
        info!(state = %state, "Kiosk started");
        self.panel.apply(ActuatorSignal::for_state(state)).await;
    }

    async fn log_devices(&self) {
        match self.reader.get_reader_info().await {
            Ok(info) => info!(reader = %info.name, protocols = ?info.protocols, "Tag reader ready"),
            Err(e) => warn!(error = %e, "Tag reader did not report its info"),
        }

        for (device, info) in self.panel.device_info().await {
            match info {
                Ok(info) => info!(
                    device,
                    name = %info.name,
                    model = %info.model,
                    firmware = info.firmware_version.as_deref().unwrap_or("-"),
                    "Actuator ready"
                ),
                Err(e) => warn!(device, error = %e, "Actuator did not report its info"),
            }
        }
    }

    /// Poll the reader once and handle whatever it returns.
    ///
    /// Returns the engine outcome if a valid tag was read.
    ///
    /// # Errors
    ///
    /// Only a disconnected reader is reported; other reader faults are
    /// logged and treated as "no tag".
    pub async fn poll_once(&mut self) -> Result<Option<EngineOutcome>> {
        let read = match self.reader.try_read_tag().await {
            Ok(Some(read)) => read,
            Ok(None) => return Ok(None),
            Err(e) if e.is_disconnected() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Tag reader fault");
                return Ok(None);
            }
        };

        self.stats.reads += 1;
        let tag_id = match read.tag_id() {
            Ok(tag_id) => tag_id,
            Err(e) => {
                self.stats.invalid_reads += 1;
                warn!(uid = %read.uid_hex(), error = %e, "Ignoring unusable tag");
                return Ok(None);
            }
        };

        let outcome = self
            .engine
            .handle_tag_read(tag_id, Instant::now().into_std())
            .await;
        self.stats.record(&outcome);

        let signal = outcome.actuator_signal(&self.engine);
        self.panel.apply(signal).await;

        Ok(Some(outcome))
    }

    /// Run until `shutdown` completes or the reader disconnects.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await;

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(_) => {}
                        Err(e) if e.is_reader_disconnected() => {
                            info!(error = %e, "Tag reader disconnected");
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        info!(
            reads = self.stats.reads,
            accepted = self.stats.accepted,
            failed = self.stats.failed,
            dropped = self.stats.dropped,
            suppressed = self.stats.suppressed,
            "Kiosk stopped"
        );
        Ok(())
    }

    pub fn engine(&self) -> &ReconciliationEngine<C> {
        &self.engine
    }

    pub fn panel(&self) -> &ActuatorPanel<L, S> {
        &self.panel
    }

    pub fn stats(&self) -> KioskStats {
        self.stats
    }
}
