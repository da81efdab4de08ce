//! Per-kind gate behaviour.
//!
//! [`behavior`] is the single dispatch point: every kind maps to exactly one
//! entry, so adding a kind without giving it behaviour fails to compile.

pub mod clock;
pub mod combinational;
pub mod sequential;

use crate::model::circuit::{FlipFlopState, GateKind, GateState, RegisterState, SrLatchState};

/// How a gate kind produces its outputs.
#[derive(Clone, Copy)]
pub enum Behavior {
    /// INPUT: the output is assigned from outside and simply held.
    Held,
    /// CLOCK: the output follows wall-clock time.
    Clock,
    /// Stateless function of the current inputs.
    Pure(fn(&[bool]) -> Vec<bool>),
    /// Stateful: see [`transition`].
    Memory,
    /// Evaluated by running the engine over the gate's inner circuit.
    Composite,
}

pub fn behavior(kind: GateKind) -> Behavior {
    use combinational as c;
    match kind {
        GateKind::And => Behavior::Pure(c::and),
        GateKind::Or => Behavior::Pure(c::or),
        GateKind::Not => Behavior::Pure(c::not),
        GateKind::Nand => Behavior::Pure(c::nand),
        GateKind::Nor => Behavior::Pure(c::nor),
        GateKind::Xor => Behavior::Pure(c::xor),
        GateKind::Xnor => Behavior::Pure(c::xnor),
        GateKind::Input => Behavior::Held,
        GateKind::Output => Behavior::Pure(c::sink),
        GateKind::Clock => Behavior::Clock,
        GateKind::SrLatch | GateKind::DFlipFlop | GateKind::Register4Bit => Behavior::Memory,
        GateKind::Mux => Behavior::Pure(c::mux),
        GateKind::HalfAdder => Behavior::Pure(c::half_adder),
        GateKind::FullAdder => Behavior::Pure(c::full_adder),
        GateKind::Adder4Bit => Behavior::Pure(c::adder_4bit),
        GateKind::Custom => Behavior::Composite,
    }
}

fn bit(inputs: &[bool], i: usize) -> bool {
    inputs.get(i).copied().unwrap_or(false)
}

/// Run one transition of a memory gate. A missing or mismatched state is
/// treated as the kind's initial state. Returns `None` for non-memory kinds.
pub fn transition(
    kind: GateKind,
    inputs: &[bool],
    state: Option<&GateState>,
) -> Option<(Vec<bool>, GateState)> {
    match kind {
        GateKind::SrLatch => {
            let prev = match state {
                Some(GateState::SrLatch(s)) => s.clone(),
                _ => SrLatchState::default(),
            };
            let next = sequential::sr_latch(bit(inputs, 0), bit(inputs, 1), &prev);
            Some((sequential::sr_latch_outputs(&next), GateState::SrLatch(next)))
        }
        GateKind::DFlipFlop => {
            let prev = match state {
                Some(GateState::DFlipFlop(s)) => s.clone(),
                _ => FlipFlopState::default(),
            };
            let next = sequential::d_flip_flop(bit(inputs, 0), bit(inputs, 1), &prev);
            Some((sequential::d_flip_flop_outputs(&next), GateState::DFlipFlop(next)))
        }
        GateKind::Register4Bit => {
            let prev = match state {
                Some(GateState::Register(s)) => s.clone(),
                _ => RegisterState::default(),
            };
            let d = [bit(inputs, 0), bit(inputs, 1), bit(inputs, 2), bit(inputs, 3)];
            let next = sequential::register_4bit(d, bit(inputs, 4), bit(inputs, 5), &prev);
            Some((sequential::register_outputs(&next), GateState::Register(next)))
        }
        _ => None,
    }
}

/// Outputs implied by a memory gate's stored state, available before it transitions.
pub fn stored_outputs(kind: GateKind, state: Option<&GateState>) -> Option<Vec<bool>> {
    match (kind, state) {
        (GateKind::SrLatch, Some(GateState::SrLatch(s))) => Some(sequential::sr_latch_outputs(s)),
        (GateKind::SrLatch, _) => Some(sequential::sr_latch_outputs(&SrLatchState::default())),
        (GateKind::DFlipFlop, Some(GateState::DFlipFlop(s))) => {
            Some(sequential::d_flip_flop_outputs(s))
        }
        (GateKind::DFlipFlop, _) => {
            Some(sequential::d_flip_flop_outputs(&FlipFlopState::default()))
        }
        (GateKind::Register4Bit, Some(GateState::Register(s))) => {
            Some(sequential::register_outputs(s))
        }
        (GateKind::Register4Bit, _) => Some(sequential::register_outputs(&RegisterState::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_behavior() {
        for kind in GateKind::all() {
            let b = behavior(kind);
            assert_eq!(matches!(b, Behavior::Memory), kind.is_memory(), "{}", kind);
        }
    }

    #[test]
    fn pure_outputs_match_arity() {
        for kind in GateKind::all() {
            if let Behavior::Pure(f) = behavior(kind) {
                let inputs = vec![true; kind.input_names().len()];
                assert_eq!(f(&inputs).len(), kind.output_names().len(), "{}", kind);
            }
        }
    }

    #[test]
    fn transition_uses_initial_state_when_missing() {
        let (outputs, state) = transition(GateKind::DFlipFlop, &[true, true], None).unwrap();
        assert_eq!(outputs, vec![true, false]);
        assert_eq!(
            state,
            GateState::DFlipFlop(FlipFlopState {
                q: true,
                last_clk: true
            })
        );
        assert!(transition(GateKind::And, &[true, true], None).is_none());
    }

    #[test]
    fn stored_outputs_of_fresh_latch() {
        assert_eq!(
            stored_outputs(GateKind::SrLatch, None),
            Some(vec![false, true])
        );
        assert_eq!(stored_outputs(GateKind::Register4Bit, None), Some(vec![false; 4]));
    }
}
