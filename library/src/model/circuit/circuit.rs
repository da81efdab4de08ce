use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::connection::{PinAddress, PinRef, Wire};
use super::gate::{ClockState, Gate, Position};
use super::graph_analysis::validate_connection;
use super::kind::GateKind;
use crate::error::{ConnectionError, LibraryError};

/// A set of gates and the wires between them.
///
/// This is the unit the engine consumes and returns: evaluation takes a
/// snapshot and hands back a new one. Gate order is insertion order and is
/// the order the evaluator sweeps in.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    pub gates: Vec<Gate>,
    pub wires: Vec<Wire>,
    /// Set by the last evaluation when some combinational gates never settled.
    #[serde(default)]
    pub cyclic: bool,
    /// Ask the clock driver to keep re-evaluating even without a running CLOCK.
    #[serde(default)]
    pub needs_animation: bool,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Gates
    // -----------------------------------------------------------------------

    /// Create a gate of `kind` at `position` and append it. Returns the new id.
    pub fn add_gate(&mut self, kind: GateKind, position: Position) -> Uuid {
        self.insert_gate(Gate::new(kind, position))
    }

    pub fn insert_gate(&mut self, gate: Gate) -> Uuid {
        let id = gate.id;
        self.gates.push(gate);
        id
    }

    pub fn get_gate(&self, id: Uuid) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == id)
    }

    pub fn get_gate_mut(&mut self, id: Uuid) -> Option<&mut Gate> {
        self.gates.iter_mut().find(|g| g.id == id)
    }

    pub fn gate_index(&self, id: Uuid) -> Option<usize> {
        self.gates.iter().position(|g| g.id == id)
    }

    /// Remove a gate together with every wire attached to it.
    pub fn remove_gate(&mut self, id: Uuid) -> Option<Gate> {
        let index = self.gate_index(id)?;
        self.remove_connections_for_gate(id);
        Some(self.gates.remove(index))
    }

    pub fn remove_connections_for_gate(&mut self, gate_id: Uuid) {
        self.wires.retain(|w| !w.touches(gate_id));
    }

    pub fn move_gate(&mut self, id: Uuid, position: Position) -> Result<(), LibraryError> {
        let gate = self.get_gate_mut(id).ok_or(LibraryError::GateNotFound(id))?;
        gate.position = position;
        Ok(())
    }

    pub fn gates_of_kind(&self, kind: GateKind) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter(move |g| g.kind == kind)
    }

    // -----------------------------------------------------------------------
    // Wires
    // -----------------------------------------------------------------------

    /// Validate and, on success, append a wire from `from` to `to`.
    ///
    /// On rejection the circuit is left exactly as it was.
    pub fn try_connect(
        &mut self,
        from: PinAddress,
        to: PinAddress,
    ) -> Result<Wire, ConnectionError> {
        validate_connection(self, &from, &to)?;
        let wire = Wire::new(from.pin_ref(), to.pin_ref());
        self.wires.push(wire.clone());
        Ok(wire)
    }

    /// Connect output `from_pin` of one gate to input `to_pin` of another.
    pub fn connect(
        &mut self,
        from_gate: Uuid,
        from_pin: usize,
        to_gate: Uuid,
        to_pin: usize,
    ) -> Result<Wire, ConnectionError> {
        self.try_connect(
            PinAddress::output(from_gate, from_pin),
            PinAddress::input(to_gate, to_pin),
        )
    }

    pub fn remove_wire(&mut self, id: Uuid) -> Option<Wire> {
        let index = self.wires.iter().position(|w| w.id == id)?;
        Some(self.wires.remove(index))
    }

    /// The wire driving an input pin, if any.
    pub fn input_wire(&self, pin: PinRef) -> Option<&Wire> {
        self.wires.iter().find(|w| w.to == pin)
    }

    pub fn wires_from(&self, gate_id: Uuid) -> impl Iterator<Item = &Wire> {
        self.wires.iter().filter(move |w| w.from.gate_id == gate_id)
    }

    // -----------------------------------------------------------------------
    // Values and state
    // -----------------------------------------------------------------------

    /// Assign the value an INPUT gate drives.
    pub fn set_input_value(&mut self, id: Uuid, value: bool) -> Result<(), LibraryError> {
        let gate = self.get_gate_mut(id).ok_or(LibraryError::GateNotFound(id))?;
        if gate.kind != GateKind::Input {
            return Err(LibraryError::NotAnInput(id));
        }
        gate.set_output_values(&[value]);
        Ok(())
    }

    /// Flip an INPUT gate and return its new value.
    pub fn toggle_input(&mut self, id: Uuid) -> Result<bool, LibraryError> {
        let current = self
            .get_gate(id)
            .ok_or(LibraryError::GateNotFound(id))?
            .outputs
            .first()
            .map(|p| p.value)
            .unwrap_or(false);
        self.set_input_value(id, !current)?;
        Ok(!current)
    }

    /// Explicit reset of every gate's internal state.
    pub fn reset_all_state(&mut self, now_ms: u64) {
        for gate in &mut self.gates {
            gate.reset_state(now_ms);
        }
    }

    pub fn reset_state(&mut self, id: Uuid, now_ms: u64) -> Result<(), LibraryError> {
        let gate = self.get_gate_mut(id).ok_or(LibraryError::GateNotFound(id))?;
        gate.reset_state(now_ms);
        Ok(())
    }

    fn clock_mut(&mut self, id: Uuid) -> Result<&mut ClockState, LibraryError> {
        self.get_gate_mut(id)
            .ok_or(LibraryError::GateNotFound(id))?
            .clock_state_mut()
            .ok_or(LibraryError::NotAClock(id))
    }

    /// Start or stop a CLOCK. Starting restarts its phase at `now_ms`; a
    /// stopped clock holds whatever it last output.
    pub fn set_clock_running(
        &mut self,
        id: Uuid,
        running: bool,
        now_ms: u64,
    ) -> Result<(), LibraryError> {
        let clock = self.clock_mut(id)?;
        if running && !clock.is_running {
            clock.start_time_ms = now_ms;
        }
        clock.is_running = running;
        Ok(())
    }

    pub fn set_clock_frequency(&mut self, id: Uuid, frequency: f64) -> Result<(), LibraryError> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(LibraryError::invalid_argument(format!(
                "Clock frequency must be positive, got {}",
                frequency
            )));
        }
        self.clock_mut(id)?.frequency = frequency;
        Ok(())
    }

    /// A running CLOCK anywhere in the circuit, including inside CUSTOM gates.
    pub fn has_running_clock(&self) -> bool {
        self.gates.iter().any(|g| {
            g.clock_state().is_some_and(|c| c.is_running)
                || g.definition
                    .as_deref()
                    .is_some_and(|d| d.circuit.has_running_clock())
        })
    }

    /// Whether the clock driver should keep re-evaluating this circuit.
    pub fn needs_ticking(&self) -> bool {
        self.needs_animation || self.has_running_clock()
    }

    /// Values shown by OUTPUT gates, in insertion order.
    pub fn output_values(&self) -> Vec<(Uuid, bool)> {
        self.gates_of_kind(GateKind::Output)
            .map(|g| (g.id, g.inputs.first().map(|p| p.value).unwrap_or(false)))
            .collect()
    }

    /// The value a single gate displays: an OUTPUT gate's input, otherwise its first output.
    pub fn display_value(&self, id: Uuid) -> Option<bool> {
        let gate = self.get_gate(id)?;
        let pin = if gate.kind == GateKind::Output {
            gate.inputs.first()
        } else {
            gate.outputs.first()
        };
        pin.map(|p| p.value)
    }
}
