//! Clock driver: re-evaluates a shared circuit on a fixed tick.
//!
//! The evaluator itself is a pure function; live behaviour (running clocks,
//! animated oscillators) comes from calling it again and again. The driver
//! owns a worker thread that does exactly that and publishes every new
//! snapshot on a channel.

pub mod time;

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::editor::write_circuit;
use crate::error::LibraryError;
use crate::evaluation::{EvaluationConfig, evaluate_with_report};
use crate::model::circuit::Circuit;

pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    pub tick_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

enum DriverRequest {
    /// Evaluate now, whether or not anything is ticking.
    Tick,
    Shutdown,
}

/// One published snapshot.
pub struct DriverSnapshot {
    /// Count of passes this driver has run, starting at 1.
    pub tick: u64,
    pub circuit: Circuit,
}

pub struct ClockDriver {
    tx: Sender<DriverRequest>,
    rx_snapshot: Receiver<DriverSnapshot>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ClockDriver {
    pub fn start(
        circuit: Arc<RwLock<Circuit>>,
        engine: EvaluationConfig,
        config: DriverConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let (tx, rx) = channel::<DriverRequest>();
        let (tx_snapshot, rx_snapshot) = channel::<DriverSnapshot>();
        let interval = Duration::from_millis(config.tick_interval_ms.max(1));

        let handle = thread::spawn(move || {
            info!("Clock driver started ({} ms tick)", interval.as_millis());
            let mut tick = 0u64;

            loop {
                let forced = match rx.recv_timeout(interval) {
                    Ok(DriverRequest::Tick) => true,
                    Err(RecvTimeoutError::Timeout) => false,
                    Ok(DriverRequest::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                };

                match run_tick(&circuit, &engine, time.as_ref(), forced) {
                    Ok(Some(snapshot)) => {
                        tick += 1;
                        // Nobody listening is fine; the shared circuit is the source of truth
                        let _ = tx_snapshot.send(DriverSnapshot {
                            tick,
                            circuit: snapshot,
                        });
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("Clock driver failed: {}", e);
                        break;
                    }
                }
            }

            info!("Clock driver stopped after {} ticks", tick);
        });

        ClockDriver {
            tx,
            rx_snapshot,
            handle: Some(handle),
        }
    }

    /// Ask for an immediate pass.
    pub fn request_tick(&self) {
        let _ = self.tx.send(DriverRequest::Tick);
    }

    pub fn poll_snapshot(&self) -> Result<DriverSnapshot, TryRecvError> {
        self.rx_snapshot.try_recv()
    }

    pub fn recv_snapshot_timeout(&self, timeout: Duration) -> Result<DriverSnapshot, LibraryError> {
        self.rx_snapshot
            .recv_timeout(timeout)
            .map_err(|e| LibraryError::runtime(format!("No snapshot from clock driver: {}", e)))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop ticking and wait for the worker. A pass already underway finishes first.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.tx.send(DriverRequest::Shutdown);
        if handle.join().is_err() {
            error!("Clock driver thread panicked");
        }
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Evaluate the shared circuit in place. Returns the new snapshot, or `None`
/// when nothing needed ticking.
fn run_tick(
    circuit: &Arc<RwLock<Circuit>>,
    engine: &EvaluationConfig,
    time: &dyn TimeSource,
    forced: bool,
) -> Result<Option<Circuit>, LibraryError> {
    let mut guard = write_circuit(circuit)?;
    if !forced && !guard.needs_ticking() {
        return Ok(None);
    }

    let (next, report) = evaluate_with_report(&guard, engine, time.now_ms());
    if engine.enable_debug_logging {
        debug!(
            "Tick: {} sweeps, {} transitions, cyclic={}",
            report.sweeps, report.transitions, report.cyclic
        );
    }
    *guard = next.clone();
    Ok(Some(next))
}
