//! Structural gates rebuilt out of primitive gates.
//!
//! Each function returns a [`CustomGateDefinition`] whose pins line up with
//! the closed-form kind of the same name, so a CUSTOM gate built from it can
//! stand in for that kind.

use uuid::Uuid;

use crate::model::circuit::{Circuit, CustomGateDefinition, Gate, GateKind, Position};

/// Lays gates out in columns so the inner circuits look sane when opened.
struct Builder {
    circuit: Circuit,
    column: usize,
    row: usize,
}

impl Builder {
    fn new() -> Self {
        Self {
            circuit: Circuit::new(),
            column: 0,
            row: 0,
        }
    }

    fn next_column(&mut self) {
        self.column += 1;
        self.row = 0;
    }

    fn position(&mut self) -> Position {
        let position = Position::new(self.column as f64 * 120.0, self.row as f64 * 60.0);
        self.row += 1;
        position
    }

    fn gate(&mut self, kind: GateKind) -> Uuid {
        let position = self.position();
        self.circuit.add_gate(kind, position)
    }

    /// Place a nested prefab. Like `wire`, a rejected definition only means a
    /// mistake in this module.
    fn custom(&mut self, definition: CustomGateDefinition) -> Uuid {
        let position = self.position();
        let gate = Gate::custom(definition, position);
        debug_assert!(gate.is_ok(), "prefab definition rejected: {:?}", gate.as_ref().err());
        match gate {
            Ok(gate) => self.circuit.insert_gate(gate),
            Err(_) => self.circuit.add_gate(GateKind::Custom, position),
        }
    }

    /// Wire `from`'s output `out` into `to`'s input `inp`. Prefab wiring never
    /// violates the connection rules, so a rejection only means a typo here.
    fn wire(&mut self, from: Uuid, out: usize, to: Uuid, inp: usize) {
        let result = self.circuit.connect(from, out, to, inp);
        debug_assert!(result.is_ok(), "prefab wiring rejected: {:?}", result);
    }

    fn finish(self, name: &str, kind: GateKind) -> CustomGateDefinition {
        CustomGateDefinition::from_circuit(name, self.circuit)
            .with_pin_names(kind.input_names(), kind.output_names())
    }
}

/// SUM = A xor B, CARRY = A and B.
pub fn half_adder() -> CustomGateDefinition {
    let mut b = Builder::new();
    let a = b.gate(GateKind::Input);
    let bb = b.gate(GateKind::Input);
    b.next_column();
    let xor = b.gate(GateKind::Xor);
    let and = b.gate(GateKind::And);
    b.next_column();
    let sum = b.gate(GateKind::Output);
    let carry = b.gate(GateKind::Output);

    b.wire(a, 0, xor, 0);
    b.wire(bb, 0, xor, 1);
    b.wire(a, 0, and, 0);
    b.wire(bb, 0, and, 1);
    b.wire(xor, 0, sum, 0);
    b.wire(and, 0, carry, 0);
    b.finish("Half Adder", GateKind::HalfAdder)
}

/// Two half-adder stages and an OR for the carry.
pub fn full_adder() -> CustomGateDefinition {
    let mut b = Builder::new();
    let a = b.gate(GateKind::Input);
    let bb = b.gate(GateKind::Input);
    let cin = b.gate(GateKind::Input);
    b.next_column();
    let x1 = b.gate(GateKind::Xor);
    let a1 = b.gate(GateKind::And);
    b.next_column();
    let x2 = b.gate(GateKind::Xor);
    let a2 = b.gate(GateKind::And);
    let or = b.gate(GateKind::Or);
    b.next_column();
    let sum = b.gate(GateKind::Output);
    let cout = b.gate(GateKind::Output);

    b.wire(a, 0, x1, 0);
    b.wire(bb, 0, x1, 1);
    b.wire(a, 0, a1, 0);
    b.wire(bb, 0, a1, 1);
    b.wire(x1, 0, x2, 0);
    b.wire(cin, 0, x2, 1);
    b.wire(x1, 0, a2, 0);
    b.wire(cin, 0, a2, 1);
    b.wire(a1, 0, or, 0);
    b.wire(a2, 0, or, 1);
    b.wire(x2, 0, sum, 0);
    b.wire(or, 0, cout, 0);
    b.finish("Full Adder", GateKind::FullAdder)
}

/// Y = (A and not S) or (B and S).
pub fn mux() -> CustomGateDefinition {
    let mut b = Builder::new();
    let a = b.gate(GateKind::Input);
    let bb = b.gate(GateKind::Input);
    let s = b.gate(GateKind::Input);
    b.next_column();
    let not = b.gate(GateKind::Not);
    let a1 = b.gate(GateKind::And);
    let a2 = b.gate(GateKind::And);
    let or = b.gate(GateKind::Or);
    b.next_column();
    let y = b.gate(GateKind::Output);

    b.wire(s, 0, not, 0);
    b.wire(a, 0, a1, 0);
    b.wire(not, 0, a1, 1);
    b.wire(bb, 0, a2, 0);
    b.wire(s, 0, a2, 1);
    b.wire(a1, 0, or, 0);
    b.wire(a2, 0, or, 1);
    b.wire(or, 0, y, 0);
    b.finish("Multiplexer", GateKind::Mux)
}

/// Four nested full adders in a ripple-carry chain.
pub fn adder_4bit() -> CustomGateDefinition {
    let mut b = Builder::new();
    let a: Vec<Uuid> = (0..4).map(|_| b.gate(GateKind::Input)).collect();
    let bb: Vec<Uuid> = (0..4).map(|_| b.gate(GateKind::Input)).collect();
    let cin = b.gate(GateKind::Input);
    b.next_column();
    let stages: Vec<Uuid> = (0..4).map(|_| b.custom(full_adder())).collect();
    b.next_column();
    let sums: Vec<Uuid> = (0..4).map(|_| b.gate(GateKind::Output)).collect();
    let cout = b.gate(GateKind::Output);

    let mut carry = cin;
    for i in 0..4 {
        b.wire(a[i], 0, stages[i], 0);
        b.wire(bb[i], 0, stages[i], 1);
        // The initial carry comes from an INPUT's only pin; stage carries from pin 1
        let carry_pin = if i == 0 { 0 } else { 1 };
        b.wire(carry, carry_pin, stages[i], 2);
        b.wire(stages[i], 0, sums[i], 0);
        carry = stages[i];
    }
    b.wire(carry, 1, cout, 0);
    b.finish("4-bit Adder", GateKind::Adder4Bit)
}

/// The primitive expansion of a structural kind, if it has one.
pub fn expansion(kind: GateKind) -> Option<CustomGateDefinition> {
    match kind {
        GateKind::HalfAdder => Some(half_adder()),
        GateKind::FullAdder => Some(full_adder()),
        GateKind::Mux => Some(mux()),
        GateKind::Adder4Bit => Some(adder_4bit()),
        _ => None,
    }
}
