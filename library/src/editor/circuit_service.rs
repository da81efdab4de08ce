use std::sync::{Arc, RwLock};

use log::{info, warn};
use uuid::Uuid;

use super::{read_circuit, write_circuit};
use crate::driver::TimeSource;
use crate::error::LibraryError;
use crate::evaluation::{EvaluationConfig, EvaluationReport, evaluate_with_report};
use crate::model::circuit::{
    Circuit, CustomGateDefinition, Gate, GateKind, PinAddress, Position, Wire,
};

/// Owns a live circuit and applies edits to it.
///
/// Every accepted mutation is followed by an evaluation pass under the same
/// write lock, so a reader never observes an edited but unevaluated circuit.
/// Rejected edits leave the circuit untouched and skip the pass.
pub struct CircuitService {
    circuit: Arc<RwLock<Circuit>>,
    config: EvaluationConfig,
    time: Arc<dyn TimeSource>,
}

impl Clone for CircuitService {
    fn clone(&self) -> Self {
        Self {
            circuit: self.circuit.clone(),
            config: self.config.clone(),
            time: self.time.clone(),
        }
    }
}

impl CircuitService {
    pub fn new(circuit: Circuit, config: EvaluationConfig, time: Arc<dyn TimeSource>) -> Self {
        Self::from_shared(Arc::new(RwLock::new(circuit)), config, time)
    }

    pub fn from_shared(
        circuit: Arc<RwLock<Circuit>>,
        config: EvaluationConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            circuit,
            config,
            time,
        }
    }

    /// The shared circuit, for handing to a [`crate::driver::ClockDriver`].
    pub fn shared(&self) -> Arc<RwLock<Circuit>> {
        self.circuit.clone()
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> Result<Circuit, LibraryError> {
        Ok(read_circuit(&self.circuit)?.clone())
    }

    pub fn is_cyclic(&self) -> Result<bool, LibraryError> {
        Ok(read_circuit(&self.circuit)?.cyclic)
    }

    pub fn output_values(&self) -> Result<Vec<(Uuid, bool)>, LibraryError> {
        Ok(read_circuit(&self.circuit)?.output_values())
    }

    pub fn display_value(&self, gate_id: Uuid) -> Result<Option<bool>, LibraryError> {
        Ok(read_circuit(&self.circuit)?.display_value(gate_id))
    }

    /// Run one pass now, without any edit.
    pub fn evaluate(&self) -> Result<EvaluationReport, LibraryError> {
        let mut circuit = write_circuit(&self.circuit)?;
        Ok(self.settle(&mut circuit))
    }

    /// Apply `edit` and, if it succeeds, evaluate.
    fn mutate<T>(
        &self,
        edit: impl FnOnce(&mut Circuit, u64) -> Result<T, LibraryError>,
    ) -> Result<T, LibraryError> {
        let mut circuit = write_circuit(&self.circuit)?;
        let result = edit(&mut circuit, self.time.now_ms())?;
        self.settle(&mut circuit);
        Ok(result)
    }

    fn settle(&self, circuit: &mut Circuit) -> EvaluationReport {
        let was_cyclic = circuit.cyclic;
        let (next, report) = evaluate_with_report(circuit, &self.config, self.time.now_ms());
        *circuit = next;

        if report.cyclic && !was_cyclic {
            warn!(
                "Circuit has {} gate(s) in a loop that does not settle",
                report.unsettled.len()
            );
        } else if !report.cyclic && was_cyclic {
            info!("Circuit settles again");
        }
        report
    }

    // -----------------------------------------------------------------------
    // Gates
    // -----------------------------------------------------------------------

    pub fn add_gate(&self, kind: GateKind, position: Position) -> Result<Uuid, LibraryError> {
        self.mutate(|circuit, now| {
            let mut gate = Gate::new(kind, position);
            // A new clock starts its first period now, not at the epoch
            if let Some(clock) = gate.clock_state_mut() {
                clock.start_time_ms = now;
            }
            Ok(circuit.insert_gate(gate))
        })
    }

    pub fn add_gate_by_tag(&self, tag: &str, position: Position) -> Result<Uuid, LibraryError> {
        let kind: GateKind = tag.parse()?;
        self.add_gate(kind, position)
    }

    pub fn add_custom_gate(
        &self,
        definition: CustomGateDefinition,
        position: Position,
    ) -> Result<Uuid, LibraryError> {
        let gate = Gate::custom(definition, position)?;
        self.mutate(|circuit, _| Ok(circuit.insert_gate(gate)))
    }

    /// Remove a gate and every wire touching it.
    pub fn remove_gate(&self, gate_id: Uuid) -> Result<(), LibraryError> {
        self.mutate(|circuit, _| {
            circuit
                .remove_gate(gate_id)
                .map(|_| ())
                .ok_or(LibraryError::GateNotFound(gate_id))
        })
    }

    /// Moving a gate changes no value, so no pass runs.
    pub fn move_gate(&self, gate_id: Uuid, position: Position) -> Result<(), LibraryError> {
        write_circuit(&self.circuit)?.move_gate(gate_id, position)
    }

    // -----------------------------------------------------------------------
    // Wires
    // -----------------------------------------------------------------------

    /// Validate and add a wire. A rejected connection comes back as
    /// [`LibraryError::Connection`] and leaves the wire list unchanged.
    pub fn try_connect(&self, from: PinAddress, to: PinAddress) -> Result<Wire, LibraryError> {
        self.mutate(|circuit, _| {
            circuit.try_connect(from, to).map_err(|e| {
                warn!("Rejected connection {:?} -> {:?}: {}", from, to, e);
                LibraryError::from(e)
            })
        })
    }

    pub fn connect(
        &self,
        from_gate: Uuid,
        from_pin: usize,
        to_gate: Uuid,
        to_pin: usize,
    ) -> Result<Wire, LibraryError> {
        self.try_connect(
            PinAddress::output(from_gate, from_pin),
            PinAddress::input(to_gate, to_pin),
        )
    }

    pub fn remove_wire(&self, wire_id: Uuid) -> Result<(), LibraryError> {
        self.mutate(|circuit, _| {
            circuit
                .remove_wire(wire_id)
                .map(|_| ())
                .ok_or(LibraryError::WireNotFound(wire_id))
        })
    }

    // -----------------------------------------------------------------------
    // Values and state
    // -----------------------------------------------------------------------

    pub fn set_input_value(&self, gate_id: Uuid, value: bool) -> Result<(), LibraryError> {
        self.mutate(|circuit, _| circuit.set_input_value(gate_id, value))
    }

    /// Flip an INPUT gate; returns its new value.
    pub fn toggle_input(&self, gate_id: Uuid) -> Result<bool, LibraryError> {
        self.mutate(|circuit, _| circuit.toggle_input(gate_id))
    }

    pub fn reset_state(&self, gate_id: Uuid) -> Result<(), LibraryError> {
        self.mutate(|circuit, now| circuit.reset_state(gate_id, now))
    }

    pub fn reset_all(&self) -> Result<(), LibraryError> {
        self.mutate(|circuit, now| {
            circuit.reset_all_state(now);
            Ok(())
        })
    }

    pub fn set_clock_running(&self, gate_id: Uuid, running: bool) -> Result<(), LibraryError> {
        self.mutate(|circuit, now| circuit.set_clock_running(gate_id, running, now))
    }

    pub fn set_clock_frequency(&self, gate_id: Uuid, frequency: f64) -> Result<(), LibraryError> {
        self.mutate(|circuit, _| circuit.set_clock_frequency(gate_id, frequency))
    }

    pub fn set_needs_animation(&self, animate: bool) -> Result<(), LibraryError> {
        write_circuit(&self.circuit)?.needs_animation = animate;
        Ok(())
    }
}
