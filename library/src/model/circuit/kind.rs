//! Gate kinds and their pin shapes.
//!
//! Every kind is described by one entry in a static table, looked up once via
//! [`GateKind::spec`]. Behaviour lives in `crate::logic`, keyed by the same enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LibraryError;

/// Broad family a gate kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateCategory {
    /// Stateless truth-function gates (AND, OR, ...).
    Combinational,
    /// INPUT, OUTPUT and CLOCK: the circuit's boundary.
    Boundary,
    /// Stateful gates whose output depends on previous passes.
    Memory,
    /// Closed-form building blocks (MUX, adders).
    Structural,
    /// User-defined gates wrapping an inner circuit.
    Custom,
}

impl fmt::Display for GateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateCategory::Combinational => "Combinational",
            GateCategory::Boundary => "Boundary",
            GateCategory::Memory => "Memory",
            GateCategory::Structural => "Structural",
            GateCategory::Custom => "Custom",
        };
        write!(f, "{}", s)
    }
}

/// The closed set of gate kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
    Input,
    Output,
    Clock,
    SrLatch,
    DFlipFlop,
    Register4Bit,
    Mux,
    HalfAdder,
    FullAdder,
    Adder4Bit,
    Custom,
}

/// Static description of a gate kind: tag, family and pin labels.
///
/// CUSTOM gates take their pins from their definition, so their entry lists none.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub tag: &'static str,
    pub category: GateCategory,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
}

const fn spec(
    tag: &'static str,
    category: GateCategory,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
) -> KindSpec {
    KindSpec {
        tag,
        category,
        inputs,
        outputs,
    }
}

const BINARY_IN: &[&str] = &["A", "B"];
const SINGLE_OUT: &[&str] = &["Y"];

const KIND_TABLE: [(GateKind, KindSpec); 18] = {
    use GateCategory::*;
    [
        (GateKind::And, spec("AND", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Or, spec("OR", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Not, spec("NOT", Combinational, &["A"], SINGLE_OUT)),
        (GateKind::Nand, spec("NAND", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Nor, spec("NOR", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Xor, spec("XOR", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Xnor, spec("XNOR", Combinational, BINARY_IN, SINGLE_OUT)),
        (GateKind::Input, spec("INPUT", Boundary, &[], &["OUT"])),
        (GateKind::Output, spec("OUTPUT", Boundary, &["IN"], &[])),
        (GateKind::Clock, spec("CLOCK", Boundary, &[], &["CLK"])),
        (GateKind::SrLatch, spec("SR_LATCH", Memory, &["S", "R"], &["Q", "Q'"])),
        (GateKind::DFlipFlop, spec("D_FF", Memory, &["D", "CLK"], &["Q", "Q'"])),
        (
            GateKind::Register4Bit,
            spec(
                "REGISTER_4BIT",
                Memory,
                &["D0", "D1", "D2", "D3", "CLK", "RST"],
                &["Q0", "Q1", "Q2", "Q3"],
            ),
        ),
        (GateKind::Mux, spec("MUX", Structural, &["A", "B", "S"], SINGLE_OUT)),
        (
            GateKind::HalfAdder,
            spec("HALF_ADDER", Structural, BINARY_IN, &["SUM", "CARRY"]),
        ),
        (
            GateKind::FullAdder,
            spec("FULL_ADDER", Structural, &["A", "B", "CIN"], &["SUM", "COUT"]),
        ),
        (
            GateKind::Adder4Bit,
            spec(
                "ADDER_4BIT",
                Structural,
                &["A0", "A1", "A2", "A3", "B0", "B1", "B2", "B3", "CIN"],
                &["S0", "S1", "S2", "S3", "COUT"],
            ),
        ),
        (GateKind::Custom, spec("CUSTOM", GateCategory::Custom, &[], &[])),
    ]
};

impl GateKind {
    /// Every kind, in palette order.
    pub fn all() -> impl Iterator<Item = GateKind> {
        KIND_TABLE.iter().map(|(kind, _)| *kind)
    }

    pub fn spec(self) -> &'static KindSpec {
        // The table is indexed by declaration order.
        &KIND_TABLE[self as usize].1
    }

    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    pub fn category(self) -> GateCategory {
        self.spec().category
    }

    pub fn input_names(self) -> &'static [&'static str] {
        self.spec().inputs
    }

    pub fn output_names(self) -> &'static [&'static str] {
        self.spec().outputs
    }

    pub fn is_memory(self) -> bool {
        self.category() == GateCategory::Memory
    }

    /// INPUT and CLOCK gates: their outputs are never computed from other gates.
    pub fn is_source(self) -> bool {
        matches!(self, GateKind::Input | GateKind::Clock)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GateKind {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KIND_TABLE
            .iter()
            .find(|(_, spec)| spec.tag == s)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| LibraryError::UnknownGateKind(s.to_string()))
    }
}

impl Serialize for GateKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for GateKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
