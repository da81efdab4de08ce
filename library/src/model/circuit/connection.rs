//! Wire model for the circuit graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a pin.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    Input,
    Output,
}

/// Identifies a pin by gate and index. The direction is implied by which end
/// of a wire the reference sits on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub gate_id: Uuid,
    pub pin_index: usize,
}

impl PinRef {
    pub fn new(gate_id: Uuid, pin_index: usize) -> Self {
        Self { gate_id, pin_index }
    }
}

/// A fully qualified pin, as named by the editor when the user drags a wire.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinAddress {
    pub gate_id: Uuid,
    pub direction: PinDirection,
    pub pin_index: usize,
}

impl PinAddress {
    pub fn output(gate_id: Uuid, pin_index: usize) -> Self {
        Self {
            gate_id,
            direction: PinDirection::Output,
            pin_index,
        }
    }

    pub fn input(gate_id: Uuid, pin_index: usize) -> Self {
        Self {
            gate_id,
            direction: PinDirection::Input,
            pin_index,
        }
    }

    pub fn pin_ref(&self) -> PinRef {
        PinRef::new(self.gate_id, self.pin_index)
    }
}

/// A directed wire from an output pin to an input pin.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Wire {
    pub id: Uuid,
    /// Source pin (output)
    pub from: PinRef,
    /// Destination pin (input)
    pub to: PinRef,
    /// Mirrors the source pin's value after the last evaluation.
    #[serde(default)]
    pub is_active: bool,
}

impl Wire {
    pub fn new(from: PinRef, to: PinRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            is_active: false,
        }
    }

    /// Whether this wire touches the given gate at either end.
    pub fn touches(&self, gate_id: Uuid) -> bool {
        self.from.gate_id == gate_id || self.to.gate_id == gate_id
    }
}
