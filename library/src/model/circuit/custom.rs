//! User-defined gates built from an inner circuit.

use serde::{Deserialize, Serialize};

use super::circuit::Circuit;
use super::kind::GateKind;
use crate::error::LibraryError;

/// Definition owned by a CUSTOM gate.
///
/// The inner circuit's INPUT gates, in insertion order, map positionally onto
/// the outer gate's input pins; its OUTPUT gates map onto the output pins.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CustomGateDefinition {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(rename = "internal_circuit")]
    pub circuit: Circuit,
}

impl CustomGateDefinition {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            circuit: Circuit::new(),
        }
    }

    /// Wrap a circuit, labelling the pins `IN0..` and `OUT0..` after its boundary gates.
    pub fn from_circuit(name: &str, circuit: Circuit) -> Self {
        let inputs = (0..circuit.gates_of_kind(GateKind::Input).count())
            .map(|i| format!("IN{}", i))
            .collect();
        let outputs = (0..circuit.gates_of_kind(GateKind::Output).count())
            .map(|i| format!("OUT{}", i))
            .collect();
        Self {
            name: name.to_string(),
            inputs,
            outputs,
            circuit,
        }
    }

    /// Replace the generated pin labels.
    pub fn with_pin_names(mut self, inputs: &[&str], outputs: &[&str]) -> Self {
        self.inputs = inputs.iter().map(|s| s.to_string()).collect();
        self.outputs = outputs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Check that the declared pins line up with the inner boundary gates.
    pub fn validate(&self) -> Result<(), LibraryError> {
        let inner_inputs = self.circuit.gates_of_kind(GateKind::Input).count();
        let inner_outputs = self.circuit.gates_of_kind(GateKind::Output).count();

        if inner_inputs != self.inputs.len() {
            return Err(LibraryError::InvalidCustomDefinition(format!(
                "'{}' declares {} inputs but its circuit has {} INPUT gates",
                self.name,
                self.inputs.len(),
                inner_inputs
            )));
        }
        if inner_outputs != self.outputs.len() {
            return Err(LibraryError::InvalidCustomDefinition(format!(
                "'{}' declares {} outputs but its circuit has {} OUTPUT gates",
                self.name,
                self.outputs.len(),
                inner_outputs
            )));
        }
        Ok(())
    }
}
