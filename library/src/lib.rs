//! Logic circuit evaluation engine.
//!
//! A circuit is a set of gates connected by single-driver wires. The engine
//! evaluates it in discrete passes: combinational logic is relaxed to a fixed
//! point, memory gates carry their state across passes, and loops that never
//! settle are detected and reported instead of hanging the caller.

pub mod driver;
pub mod editor;
pub mod error;
pub mod evaluation;
pub mod logic;
pub mod model;
pub mod prefab;
pub mod util;

pub use error::{ConnectionError, LibraryError};
pub use evaluation::{EvaluationConfig, EvaluationReport, Strategy, evaluate, evaluate_with_report};
pub use model::circuit::{
    Circuit, CustomGateDefinition, Gate, GateCategory, GateKind, GateState, Pin, PinAddress,
    PinDirection, PinRef, Position, SavedCircuit, Wire,
};
