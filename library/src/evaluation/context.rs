//! Evaluation context: carries all state needed during a single pass.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::circuit::{Circuit, CustomGateDefinition, GateState};

/// Working state for one pass over a circuit.
///
/// Built fresh for every pass from the input snapshot, which is never touched;
/// the new snapshot is assembled from this context once the pass completes.
pub struct EvalContext<'a> {
    pub circuit: &'a Circuit,

    /// For each gate, for each input pin: the (gate index, output pin) driving it.
    pub drivers: Vec<Vec<Option<(usize, usize)>>>,
    /// For each gate: indices of the gates its outputs feed.
    pub fanout: Vec<Vec<usize>>,

    /// Current output values, seeded from the previous snapshot.
    pub values: Vec<Vec<bool>>,
    /// Internal state, updated as memory gates transition.
    pub states: Vec<Option<GateState>>,
    /// Evaluated inner circuits of CUSTOM gates.
    pub definitions: Vec<Option<CustomGateDefinition>>,

    /// Output available to consumers in this pass.
    pub settled: Vec<bool>,
    /// Memory gate already stepped in this pass (or frozen).
    pub transitioned: Vec<bool>,
    /// A CUSTOM gate's inner circuit was reported cyclic.
    pub inner_cyclic: Vec<bool>,
}

impl<'a> EvalContext<'a> {
    pub fn new(circuit: &'a Circuit) -> Self {
        let n = circuit.gates.len();
        let index: HashMap<Uuid, usize> = circuit
            .gates
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id, i))
            .collect();

        let mut drivers: Vec<Vec<Option<(usize, usize)>>> = circuit
            .gates
            .iter()
            .map(|g| vec![None; g.inputs.len()])
            .collect();
        let mut fanout: Vec<Vec<usize>> = vec![Vec::new(); n];

        for wire in &circuit.wires {
            let (Some(&from), Some(&to)) =
                (index.get(&wire.from.gate_id), index.get(&wire.to.gate_id))
            else {
                continue;
            };
            if wire.from.pin_index >= circuit.gates[from].outputs.len() {
                continue;
            }
            // First wire wins if a hand-edited document drives a pin twice
            if let Some(slot) = drivers[to].get_mut(wire.to.pin_index) {
                if slot.is_none() {
                    *slot = Some((from, wire.from.pin_index));
                    if !fanout[from].contains(&to) {
                        fanout[from].push(to);
                    }
                }
            }
        }

        let values = circuit.gates.iter().map(|g| g.output_values()).collect();
        let states = circuit.gates.iter().map(|g| g.state.clone()).collect();
        let definitions = circuit
            .gates
            .iter()
            .map(|g| g.definition.as_deref().cloned())
            .collect();

        Self {
            circuit,
            drivers,
            fanout,
            values,
            states,
            definitions,
            settled: vec![false; n],
            transitioned: vec![false; n],
            inner_cyclic: vec![false; n],
        }
    }

    /// Every input is unconnected or driven by a settled gate.
    pub fn is_ready(&self, gate: usize) -> bool {
        self.drivers[gate]
            .iter()
            .all(|d| d.is_none_or(|(src, _)| self.settled[src]))
    }

    /// Values currently visible on a gate's input pins. Unconnected pins read low.
    pub fn input_values(&self, gate: usize) -> Vec<bool> {
        Self::resolve_inputs(&self.drivers[gate], &self.values)
    }

    pub fn resolve_inputs(
        drivers: &[Option<(usize, usize)>],
        values: &[Vec<bool>],
    ) -> Vec<bool> {
        drivers
            .iter()
            .map(|d| match d {
                Some((src, pin)) => values[*src].get(*pin).copied().unwrap_or(false),
                None => false,
            })
            .collect()
    }

    /// Store new outputs; returns whether anything changed.
    pub fn set_values(&mut self, gate: usize, outputs: Vec<bool>) -> bool {
        let changed = self.values[gate] != outputs;
        self.values[gate] = outputs;
        changed
    }
}
