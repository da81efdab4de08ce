//! Composite gates: run the engine over a CUSTOM gate's inner circuit.

use super::EvaluationConfig;
use super::engine::run_pass;
use crate::model::circuit::{CustomGateDefinition, GateKind};

pub struct CustomOutcome {
    pub outputs: Vec<bool>,
    /// The definition with its inner circuit evaluated (inner state advanced).
    pub definition: CustomGateDefinition,
    pub cyclic: bool,
}

/// Copy `inputs` onto the inner INPUT gates (in order), evaluate the inner
/// circuit, and read the inner OUTPUT gates back (in order).
///
/// Missing values read low; surplus values are ignored.
pub fn evaluate_custom(
    definition: &CustomGateDefinition,
    inputs: &[bool],
    config: &EvaluationConfig,
    now_ms: u64,
) -> CustomOutcome {
    let mut inner = definition.circuit.clone();

    let mut values = inputs.iter().copied();
    for gate in inner.gates.iter_mut().filter(|g| g.kind == GateKind::Input) {
        gate.set_output_values(&[values.next().unwrap_or(false)]);
    }

    let (evaluated, report) = run_pass(&inner, config, now_ms);

    let outputs = evaluated
        .gates_of_kind(GateKind::Output)
        .map(|g| g.inputs.first().map(|p| p.value).unwrap_or(false))
        .collect();

    CustomOutcome {
        outputs,
        definition: CustomGateDefinition {
            name: definition.name.clone(),
            inputs: definition.inputs.clone(),
            outputs: definition.outputs.clone(),
            circuit: evaluated,
        },
        cyclic: report.cyclic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::circuit::{Circuit, Position};

    fn inverter() -> CustomGateDefinition {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(GateKind::Input, Position::default());
        let not = circuit.add_gate(GateKind::Not, Position::default());
        let y = circuit.add_gate(GateKind::Output, Position::default());
        circuit.connect(a, 0, not, 0).unwrap();
        circuit.connect(not, 0, y, 0).unwrap();
        CustomGateDefinition::from_circuit("INV", circuit)
    }

    #[test]
    fn maps_boundary_positionally() {
        let def = inverter();
        let config = EvaluationConfig::default();
        assert_eq!(evaluate_custom(&def, &[false], &config, 0).outputs, vec![true]);
        assert_eq!(evaluate_custom(&def, &[true], &config, 0).outputs, vec![false]);
    }

    #[test]
    fn inner_circuit_is_written_back() {
        let def = inverter();
        let outcome = evaluate_custom(&def, &[true], &EvaluationConfig::default(), 0);
        let inner_input = outcome
            .definition
            .circuit
            .gates_of_kind(GateKind::Input)
            .next()
            .unwrap();
        assert_eq!(inner_input.output_values(), vec![true]);
        assert!(!outcome.cyclic);
        assert_eq!(outcome.definition.name, "INV");
    }
}
