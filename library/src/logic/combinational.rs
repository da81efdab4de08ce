//! Closed-form gates: truth functions, multiplexer and adders.

fn bit(inputs: &[bool], i: usize) -> bool {
    inputs.get(i).copied().unwrap_or(false)
}

pub fn and(inputs: &[bool]) -> Vec<bool> {
    vec![bit(inputs, 0) && bit(inputs, 1)]
}

pub fn or(inputs: &[bool]) -> Vec<bool> {
    vec![bit(inputs, 0) || bit(inputs, 1)]
}

pub fn not(inputs: &[bool]) -> Vec<bool> {
    vec![!bit(inputs, 0)]
}

pub fn nand(inputs: &[bool]) -> Vec<bool> {
    vec![!(bit(inputs, 0) && bit(inputs, 1))]
}

pub fn nor(inputs: &[bool]) -> Vec<bool> {
    vec![!(bit(inputs, 0) || bit(inputs, 1))]
}

pub fn xor(inputs: &[bool]) -> Vec<bool> {
    vec![bit(inputs, 0) != bit(inputs, 1)]
}

pub fn xnor(inputs: &[bool]) -> Vec<bool> {
    vec![bit(inputs, 0) == bit(inputs, 1)]
}

/// OUTPUT gates display their input and drive nothing.
pub fn sink(_inputs: &[bool]) -> Vec<bool> {
    Vec::new()
}

/// Y = S ? B : A
pub fn mux(inputs: &[bool]) -> Vec<bool> {
    let (a, b, s) = (bit(inputs, 0), bit(inputs, 1), bit(inputs, 2));
    vec![if s { b } else { a }]
}

fn add_bits(a: bool, b: bool, carry_in: bool) -> (bool, bool) {
    let sum = a ^ b ^ carry_in;
    let carry = (a && b) || (carry_in && (a ^ b));
    (sum, carry)
}

/// SUM = A xor B, CARRY = A and B
pub fn half_adder(inputs: &[bool]) -> Vec<bool> {
    let (a, b) = (bit(inputs, 0), bit(inputs, 1));
    vec![a ^ b, a && b]
}

pub fn full_adder(inputs: &[bool]) -> Vec<bool> {
    let (sum, carry) = add_bits(bit(inputs, 0), bit(inputs, 1), bit(inputs, 2));
    vec![sum, carry]
}

/// Ripple-carry add of A0..A3 and B0..B3 (least significant first) plus CIN.
pub fn adder_4bit(inputs: &[bool]) -> Vec<bool> {
    let mut carry = bit(inputs, 8);
    let mut outputs = Vec::with_capacity(5);
    for i in 0..4 {
        let (sum, next) = add_bits(bit(inputs, i), bit(inputs, 4 + i), carry);
        outputs.push(sum);
        carry = next;
    }
    outputs.push(carry);
    outputs
}
