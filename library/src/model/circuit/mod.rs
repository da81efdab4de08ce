//! Circuit model: gates, pins, wires and the documents they are saved in.

pub mod circuit;
pub mod connection;
pub mod custom;
pub mod gate;
pub mod graph_analysis;
pub mod kind;
pub mod saved;

pub use circuit::Circuit;
pub use connection::{PinAddress, PinDirection, PinRef, Wire};
pub use custom::CustomGateDefinition;
pub use gate::{
    ClockState, FlipFlopState, Gate, GateState, Pin, Position, RegisterState, SrLatchState,
};
pub use kind::{GateCategory, GateKind, KindSpec};
pub use saved::SavedCircuit;
