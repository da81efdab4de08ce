use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use logicsim::driver::{ClockDriver, SystemTimeSource, TimeSource};
use logicsim::editor::CircuitService;
use logicsim::{Circuit, SavedCircuit, evaluate_with_report};
use uuid::Uuid;

use crate::config::AppConfig;

/// Apply `--set` values to the loaded circuit.
pub fn apply_inputs(circuit: &mut Circuit, inputs: &[(Uuid, bool)]) -> Result<()> {
    for &(id, value) in inputs {
        circuit
            .set_input_value(id, value)
            .with_context(|| format!("Cannot set {}", id))?;
    }
    Ok(())
}

/// A single pass at the current wall time.
pub fn run_once(saved: &SavedCircuit, config: &AppConfig) -> SavedCircuit {
    let now = SystemTimeSource.now_ms();
    let (circuit, report) = evaluate_with_report(&saved.circuit, &config.engine, now);
    info!(
        "Evaluated in {} sweeps ({} memory transitions)",
        report.sweeps, report.transitions
    );
    SavedCircuit {
        circuit,
        ..saved.clone()
    }
}

/// Drive the circuit on the clock tick for `ticks` passes, printing each one.
pub fn run_ticks(saved: &SavedCircuit, config: &AppConfig, ticks: u64) -> Result<SavedCircuit> {
    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let service = CircuitService::new(saved.circuit.clone(), config.engine.clone(), time.clone());
    let ticking = service.snapshot()?.needs_ticking();

    let mut driver = ClockDriver::start(
        service.shared(),
        config.engine.clone(),
        config.driver.clone(),
        time,
    );
    let wait = Duration::from_millis(config.driver.tick_interval_ms.saturating_mul(10).max(1_000));

    for _ in 0..ticks {
        // Nothing would tick on its own; ask for every pass explicitly
        if !ticking {
            driver.request_tick();
        }
        let snapshot = driver.recv_snapshot_timeout(wait)?;
        print!("tick {:>4}: {}", snapshot.tick, describe(&snapshot.circuit));
    }
    driver.stop();

    Ok(SavedCircuit {
        circuit: service.snapshot()?,
        ..saved.clone()
    })
}

/// OUTPUT gate values as a bit string, flagged when the circuit is cyclic.
pub fn describe(circuit: &Circuit) -> String {
    let mut text = String::new();
    let outputs = circuit.output_values();
    let bits: String = outputs.iter().map(|(_, v)| if *v { '1' } else { '0' }).collect();
    let _ = writeln!(text, "{}{}", bits, if circuit.cyclic { "  (cyclic)" } else { "" });
    text
}

/// One line per OUTPUT gate followed by the cyclic advisory.
pub fn describe_long(circuit: &Circuit) -> String {
    let mut text = String::new();
    for (i, (id, value)) in circuit.output_values().into_iter().enumerate() {
        let _ = writeln!(text, "OUT{} {} = {}", i, id, u8::from(value));
    }
    let _ = writeln!(text, "cyclic: {}", circuit.cyclic);
    text
}
