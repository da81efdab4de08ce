//! Circuit evaluation engine.
//!
//! [`evaluate`] is a pure function from one circuit snapshot to the next. A
//! pass seeds the boundary gates, relaxes combinational logic to a fixed point,
//! steps every memory gate once, and reports loops that never settle instead
//! of chasing a fixed point that does not exist. Callers wanting live
//! behaviour (clocks, oscillators) simply call it again; see `crate::driver`.

pub mod context;
pub mod custom;
pub mod engine;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::circuit::Circuit;

/// Sweep cap of the relaxation loop.
pub const DEFAULT_MAX_SWEEPS: usize = 20;

/// Which evaluation rules a pass applies.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Relaxation plus state-carried memory gates; unsettled loops hold their values.
    #[default]
    AutoSelect,
    /// Relaxation only: memory gates expose their stored outputs but never step.
    CombinationalOnly,
    /// As `AutoSelect`, then gates left unsettled advance one synchronous step.
    EventDriven,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EvaluationConfig {
    pub strategy: Strategy,
    pub enable_debug_logging: bool,
    pub max_sweeps: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::AutoSelect,
            enable_debug_logging: false,
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }
}

impl EvaluationConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// What happened during a pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Some gates never settled within the sweep cap.
    pub cyclic: bool,
    /// Relaxation sweeps performed.
    pub sweeps: usize,
    /// Gates left unsettled, in circuit order.
    pub unsettled: Vec<Uuid>,
    /// Memory gates stepped.
    pub transitions: usize,
}

/// Evaluate one full pass and return the new snapshot.
///
/// Never fails and always returns within the sweep cap, cyclic or not.
/// `now_ms` is wall-clock time in milliseconds since the UNIX epoch and is
/// only read by CLOCK gates.
pub fn evaluate(circuit: &Circuit, config: &EvaluationConfig, now_ms: u64) -> Circuit {
    evaluate_with_report(circuit, config, now_ms).0
}

/// Like [`evaluate`], also returning what the pass did.
pub fn evaluate_with_report(
    circuit: &Circuit,
    config: &EvaluationConfig,
    now_ms: u64,
) -> (Circuit, EvaluationReport) {
    engine::run_pass(circuit, config, now_ms)
}
