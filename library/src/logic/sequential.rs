//! Memory gates: `(inputs, previous state) -> (outputs, new state)`.

use crate::model::circuit::{FlipFlopState, RegisterState, SrLatchState};

/// SR latch step.
///
/// S=1,R=1 is the forbidden combination: both outputs go low, the stored Q is
/// forced to 0 and `invalid` is raised. Because Q is forced low, the hold that
/// follows a forbidden pass reads Q=0 rather than whatever preceded it.
pub fn sr_latch(s: bool, r: bool, prev: &SrLatchState) -> SrLatchState {
    match (s, r) {
        (false, false) => SrLatchState {
            q: prev.q,
            invalid: false,
        },
        (true, false) => SrLatchState {
            q: true,
            invalid: false,
        },
        (false, true) => SrLatchState {
            q: false,
            invalid: false,
        },
        (true, true) => SrLatchState {
            q: false,
            invalid: true,
        },
    }
}

pub fn sr_latch_outputs(state: &SrLatchState) -> Vec<bool> {
    if state.invalid {
        vec![false, false]
    } else {
        vec![state.q, !state.q]
    }
}

/// D flip-flop step: capture D on a rising CLK edge, remember CLK always.
pub fn d_flip_flop(d: bool, clk: bool, prev: &FlipFlopState) -> FlipFlopState {
    let rising = !prev.last_clk && clk;
    FlipFlopState {
        q: if rising { d } else { prev.q },
        last_clk: clk,
    }
}

pub fn d_flip_flop_outputs(state: &FlipFlopState) -> Vec<bool> {
    vec![state.q, !state.q]
}

/// 4-bit register step. RST clears every bit and wins over a clock edge.
pub fn register_4bit(d: [bool; 4], clk: bool, rst: bool, prev: &RegisterState) -> RegisterState {
    let rising = !prev.last_clk && clk;
    let bits = if rst {
        [false; 4]
    } else if rising {
        d
    } else {
        prev.bits
    };
    RegisterState {
        bits,
        last_clk: clk,
    }
}

pub fn register_outputs(state: &RegisterState) -> Vec<bool> {
    state.bits.to_vec()
}
