//! Gates, pins and the state memory gates carry between passes.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::connection::PinDirection;
use super::custom::CustomGateDefinition;
use super::kind::GateKind;
use crate::error::LibraryError;
use crate::logic;

/// Default frequency of a freshly placed CLOCK gate, in Hz.
pub const DEFAULT_CLOCK_FREQUENCY: f64 = 1.0;

/// Canvas position of a gate. Only the editor cares about it; the engine
/// carries it through untouched.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: OrderedFloat<f64>,
    pub y: OrderedFloat<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: OrderedFloat(x),
            y: OrderedFloat(y),
        }
    }
}

/// A single boolean terminal on a gate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    /// Label shown next to the pin (e.g. "S", "Q'", "D2")
    pub name: String,
    pub direction: PinDirection,
    #[serde(default)]
    pub value: bool,
}

impl Pin {
    pub fn input(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: PinDirection::Input,
            value: false,
        }
    }

    pub fn output(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: PinDirection::Output,
            value: false,
        }
    }
}

/// Wall-clock driven square wave settings of a CLOCK gate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClockState {
    /// Cycles per second.
    pub frequency: f64,
    /// Milliseconds since the UNIX epoch at which the current run started.
    pub start_time_ms: u64,
    pub is_running: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_CLOCK_FREQUENCY,
            start_time_ms: 0,
            is_running: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SrLatchState {
    pub q: bool,
    /// Set while both S and R are high.
    pub invalid: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlipFlopState {
    pub q: bool,
    pub last_clk: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterState {
    pub bits: [bool; 4],
    pub last_clk: bool,
}

/// State held across evaluation passes. Only memory and CLOCK gates have one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateState {
    Clock(ClockState),
    SrLatch(SrLatchState),
    DFlipFlop(FlipFlopState),
    Register(RegisterState),
}

impl GateState {
    /// The state a gate of `kind` starts with, if it carries any.
    pub fn initial(kind: GateKind) -> Option<Self> {
        match kind {
            GateKind::Clock => Some(GateState::Clock(ClockState::default())),
            GateKind::SrLatch => Some(GateState::SrLatch(SrLatchState::default())),
            GateKind::DFlipFlop => Some(GateState::DFlipFlop(FlipFlopState::default())),
            GateKind::Register4Bit => Some(GateState::Register(RegisterState::default())),
            _ => None,
        }
    }
}

/// A node of the circuit graph.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Gate {
    pub id: Uuid,
    pub kind: GateKind,
    #[serde(default)]
    pub position: Position,
    pub inputs: Vec<Pin>,
    pub outputs: Vec<Pin>,
    #[serde(default, rename = "internal_state", skip_serializing_if = "Option::is_none")]
    pub state: Option<GateState>,
    /// Inner circuit of a CUSTOM gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Box<CustomGateDefinition>>,
}

impl Gate {
    /// Build a gate of the given kind with its declared pins and initial state.
    ///
    /// A CUSTOM gate built this way wraps an empty definition; use
    /// [`Gate::custom`] to give it an inner circuit.
    pub fn new(kind: GateKind, position: Position) -> Self {
        Self::new_with_id(Uuid::new_v4(), kind, position)
    }

    pub fn new_with_id(id: Uuid, kind: GateKind, position: Position) -> Self {
        let definition = if kind == GateKind::Custom {
            Some(Box::new(CustomGateDefinition::empty()))
        } else {
            None
        };

        Self {
            id,
            kind,
            position,
            inputs: kind.input_names().iter().map(|n| Pin::input(n)).collect(),
            outputs: kind.output_names().iter().map(|n| Pin::output(n)).collect(),
            state: GateState::initial(kind),
            definition,
        }
    }

    /// Build a gate from its serialized kind tag.
    pub fn from_tag(tag: &str, position: Position) -> Result<Self, LibraryError> {
        let kind: GateKind = tag.parse()?;
        Ok(Self::new(kind, position))
    }

    /// Build a CUSTOM gate whose pins mirror the definition's boundary.
    pub fn custom(
        definition: CustomGateDefinition,
        position: Position,
    ) -> Result<Self, LibraryError> {
        definition.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind: GateKind::Custom,
            position,
            inputs: definition.inputs.iter().map(|n| Pin::input(n)).collect(),
            outputs: definition.outputs.iter().map(|n| Pin::output(n)).collect(),
            state: None,
            definition: Some(Box::new(definition)),
        })
    }

    pub fn pin_count(&self, direction: PinDirection) -> usize {
        match direction {
            PinDirection::Input => self.inputs.len(),
            PinDirection::Output => self.outputs.len(),
        }
    }

    pub fn input_values(&self) -> Vec<bool> {
        self.inputs.iter().map(|p| p.value).collect()
    }

    pub fn output_values(&self) -> Vec<bool> {
        self.outputs.iter().map(|p| p.value).collect()
    }

    /// Copy `values` onto the output pins, ignoring any surplus.
    pub fn set_output_values(&mut self, values: &[bool]) {
        for (pin, value) in self.outputs.iter_mut().zip(values) {
            pin.value = *value;
        }
    }

    pub fn set_input_values(&mut self, values: &[bool]) {
        for (pin, value) in self.inputs.iter_mut().zip(values) {
            pin.value = *value;
        }
    }

    /// Put the gate's internal state back to what it was at construction.
    ///
    /// Clocks keep their frequency and running flag; only the phase restarts.
    /// Custom gates reset every gate of their inner circuit.
    pub fn reset_state(&mut self, now_ms: u64) {
        match &mut self.state {
            Some(GateState::Clock(clock)) => {
                clock.start_time_ms = now_ms;
            }
            Some(state) => {
                if let Some(initial) = GateState::initial(self.kind) {
                    *state = initial;
                }
                let outputs = logic::stored_outputs(self.kind, Some(&*state))
                    .unwrap_or_else(|| vec![false; self.outputs.len()]);
                self.set_output_values(&outputs);
            }
            None => {}
        }

        if let Some(definition) = &mut self.definition {
            definition.circuit.reset_all_state(now_ms);
        }
    }

    pub fn clock_state(&self) -> Option<&ClockState> {
        match &self.state {
            Some(GateState::Clock(clock)) => Some(clock),
            _ => None,
        }
    }

    pub fn clock_state_mut(&mut self) -> Option<&mut ClockState> {
        match &mut self.state {
            Some(GateState::Clock(clock)) => Some(clock),
            _ => None,
        }
    }
}
