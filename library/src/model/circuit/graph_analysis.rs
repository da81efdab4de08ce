//! Graph analysis utilities for the circuit graph.
//!
//! Connection validation lives here so that every mutation path (the circuit
//! itself, the editor service, loaded documents) applies the same rules.

use std::collections::HashMap;

use uuid::Uuid;

use super::circuit::Circuit;
use super::connection::{PinAddress, PinDirection};
use crate::error::ConnectionError;

/// Validate a connection before adding it.
///
/// Checks, in order, with the first violation winning:
/// - Both gates exist
/// - Output pin to input pin
/// - No self-connections
/// - The input pin is not already driven
/// - Pin indices are within the gates' arity
pub fn validate_connection(
    circuit: &Circuit,
    from: &PinAddress,
    to: &PinAddress,
) -> Result<(), ConnectionError> {
    let from_gate = circuit
        .get_gate(from.gate_id)
        .ok_or(ConnectionError::GateNotFound(from.gate_id))?;
    let to_gate = circuit
        .get_gate(to.gate_id)
        .ok_or(ConnectionError::GateNotFound(to.gate_id))?;

    if from.direction != PinDirection::Output || to.direction != PinDirection::Input {
        return Err(ConnectionError::IncompatiblePinType);
    }

    if from.gate_id == to.gate_id {
        return Err(ConnectionError::SelfLoop);
    }

    // Each input accepts at most one wire
    if circuit.input_wire(to.pin_ref()).is_some() {
        return Err(ConnectionError::AlreadyConnected);
    }

    if from.pin_index >= from_gate.pin_count(PinDirection::Output) {
        return Err(ConnectionError::InvalidPinIndex {
            gate_id: from.gate_id,
            index: from.pin_index,
        });
    }
    if to.pin_index >= to_gate.pin_count(PinDirection::Input) {
        return Err(ConnectionError::InvalidPinIndex {
            gate_id: to.gate_id,
            index: to.pin_index,
        });
    }

    Ok(())
}

/// Gates sitting on a feedback loop that passes through no memory gate.
///
/// These are the gates the evaluator can never settle. Memory gates break
/// loops, so they are left out of the graph before looking for strongly
/// connected components. Returned in circuit order.
pub fn combinational_feedback(circuit: &Circuit) -> Vec<Uuid> {
    let index: HashMap<Uuid, usize> = circuit
        .gates
        .iter()
        .enumerate()
        .map(|(i, g)| (g.id, i))
        .collect();

    let n = circuit.gates.len();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut self_loop = vec![false; n];

    for wire in &circuit.wires {
        let (Some(&from), Some(&to)) = (index.get(&wire.from.gate_id), index.get(&wire.to.gate_id))
        else {
            continue;
        };
        if circuit.gates[from].kind.is_memory() || circuit.gates[to].kind.is_memory() {
            continue;
        }
        if from == to {
            self_loop[from] = true;
        }
        adj[from].push(to);
    }

    let components = strongly_connected_components(&adj);
    let mut on_loop = self_loop;
    for component in components {
        if component.len() > 1 {
            for node in component {
                on_loop[node] = true;
            }
        }
    }

    circuit
        .gates
        .iter()
        .zip(on_loop)
        .filter(|(_, looped)| *looped)
        .map(|(g, _)| g.id)
        .collect()
}

/// Tarjan's algorithm, iterative so deep chains cannot overflow the stack.
fn strongly_connected_components(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = adj.len();
    let mut order = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut components = Vec::new();
    let mut counter = 0;

    for root in 0..n {
        if order[root] != UNVISITED {
            continue;
        }
        // (node, next edge to explore)
        let mut call_stack = vec![(root, 0usize)];
        order[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(node, edge)) = call_stack.last() {
            if let Some(&next) = adj[node].get(edge) {
                if let Some(top) = call_stack.last_mut() {
                    top.1 += 1;
                }
                if order[next] == UNVISITED {
                    order[next] = counter;
                    low[next] = counter;
                    counter += 1;
                    stack.push(next);
                    on_stack[next] = true;
                    call_stack.push((next, 0));
                } else if on_stack[next] {
                    low[node] = low[node].min(order[next]);
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                low[parent] = low[parent].min(low[node]);
            }
            if low[node] == order[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::circuit::{GateKind, Position};

    fn two_gates(kind: GateKind) -> (Circuit, Uuid, Uuid) {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(kind, Position::default());
        let b = circuit.add_gate(kind, Position::default());
        (circuit, a, b)
    }

    #[test]
    fn test_validate_connection_directions() {
        let (circuit, a, b) = two_gates(GateKind::And);

        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 0), &PinAddress::output(b, 0)),
            Err(ConnectionError::IncompatiblePinType)
        );
        assert_eq!(
            validate_connection(&circuit, &PinAddress::input(a, 0), &PinAddress::input(b, 0)),
            Err(ConnectionError::IncompatiblePinType)
        );
        assert_eq!(
            validate_connection(&circuit, &PinAddress::input(a, 0), &PinAddress::output(b, 0)),
            Err(ConnectionError::IncompatiblePinType)
        );
        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 0), &PinAddress::input(b, 1)),
            Ok(())
        );
    }

    #[test]
    fn test_validate_connection_self_loop() {
        let (circuit, a, _) = two_gates(GateKind::Nand);
        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 0), &PinAddress::input(a, 0)),
            Err(ConnectionError::SelfLoop)
        );
    }

    #[test]
    fn test_direction_checked_before_self_loop() {
        let (circuit, a, _) = two_gates(GateKind::Nand);
        assert_eq!(
            validate_connection(&circuit, &PinAddress::input(a, 0), &PinAddress::input(a, 1)),
            Err(ConnectionError::IncompatiblePinType)
        );
    }

    #[test]
    fn test_validate_connection_pin_index() {
        let (circuit, a, b) = two_gates(GateKind::Not);
        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 0), &PinAddress::input(b, 1)),
            Err(ConnectionError::InvalidPinIndex { gate_id: b, index: 1 })
        );
        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 3), &PinAddress::input(b, 0)),
            Err(ConnectionError::InvalidPinIndex { gate_id: a, index: 3 })
        );
    }

    #[test]
    fn test_validate_connection_missing_gate() {
        let (circuit, a, _) = two_gates(GateKind::Not);
        let ghost = Uuid::new_v4();
        assert_eq!(
            validate_connection(&circuit, &PinAddress::output(a, 0), &PinAddress::input(ghost, 0)),
            Err(ConnectionError::GateNotFound(ghost))
        );
    }

    #[test]
    fn test_combinational_feedback_ring() {
        let mut circuit = Circuit::new();
        let input = circuit.add_gate(GateKind::Input, Position::default());
        let n1 = circuit.add_gate(GateKind::Not, Position::default());
        let n2 = circuit.add_gate(GateKind::Not, Position::default());
        let n3 = circuit.add_gate(GateKind::Not, Position::default());
        let tail = circuit.add_gate(GateKind::Output, Position::default());
        circuit.connect(n1, 0, n2, 0).unwrap();
        circuit.connect(n2, 0, n3, 0).unwrap();
        circuit.connect(n3, 0, n1, 0).unwrap();
        circuit.connect(n3, 0, tail, 0).unwrap();
        let _ = input;

        assert_eq!(combinational_feedback(&circuit), vec![n1, n2, n3]);
    }

    #[test]
    fn test_memory_gate_breaks_feedback() {
        let mut circuit = Circuit::new();
        let clk = circuit.add_gate(GateKind::Clock, Position::default());
        let ff = circuit.add_gate(GateKind::DFlipFlop, Position::default());
        let not = circuit.add_gate(GateKind::Not, Position::default());
        circuit.connect(clk, 0, ff, 1).unwrap();
        circuit.connect(ff, 0, not, 0).unwrap();
        circuit.connect(not, 0, ff, 0).unwrap();

        assert!(combinational_feedback(&circuit).is_empty());
    }

    #[test]
    fn test_cross_coupled_nor_is_feedback() {
        let (mut circuit, a, b) = two_gates(GateKind::Nor);
        circuit.connect(a, 0, b, 0).unwrap();
        circuit.connect(b, 0, a, 1).unwrap();
        assert_eq!(combinational_feedback(&circuit), vec![a, b]);
    }
}
