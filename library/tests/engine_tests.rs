//! Integration tests for the evaluation engine.
//!
//! Circuits are built through the public model API and evaluated pass by pass,
//! the way a front end or the clock driver would.

use logicsim::model::circuit::graph_analysis::combinational_feedback;
use logicsim::{
    Circuit, ConnectionError, CustomGateDefinition, EvaluationConfig, Gate, GateKind, Position,
    Strategy, evaluate, evaluate_with_report, prefab,
};
use uuid::Uuid;

fn at(x: f64) -> Position {
    Position::new(x, 0.0)
}

/// INPUT gates feeding one gate of `kind`, each output into an OUTPUT gate.
struct Bench {
    circuit: Circuit,
    inputs: Vec<Uuid>,
    gate: Uuid,
    outputs: Vec<Uuid>,
}

impl Bench {
    fn new(kind: GateKind) -> Self {
        let mut circuit = Circuit::new();
        let inputs: Vec<Uuid> = (0..kind.input_names().len())
            .map(|_| circuit.add_gate(GateKind::Input, at(0.0)))
            .collect();
        let gate = circuit.add_gate(kind, at(100.0));
        let outputs: Vec<Uuid> = (0..kind.output_names().len())
            .map(|_| circuit.add_gate(GateKind::Output, at(200.0)))
            .collect();
        Self::wire(circuit, inputs, gate, outputs)
    }

    fn custom(definition: CustomGateDefinition) -> Self {
        let mut circuit = Circuit::new();
        let inputs: Vec<Uuid> = (0..definition.inputs.len())
            .map(|_| circuit.add_gate(GateKind::Input, at(0.0)))
            .collect();
        let outputs_len = definition.outputs.len();
        let gate = circuit.insert_gate(Gate::custom(definition, at(100.0)).unwrap());
        let outputs: Vec<Uuid> = (0..outputs_len)
            .map(|_| circuit.add_gate(GateKind::Output, at(200.0)))
            .collect();
        Self::wire(circuit, inputs, gate, outputs)
    }

    fn wire(mut circuit: Circuit, inputs: Vec<Uuid>, gate: Uuid, outputs: Vec<Uuid>) -> Self {
        for (pin, &input) in inputs.iter().enumerate() {
            circuit.connect(input, 0, gate, pin).unwrap();
        }
        for (pin, &output) in outputs.iter().enumerate() {
            circuit.connect(gate, pin, output, 0).unwrap();
        }
        Self {
            circuit,
            inputs,
            gate,
            outputs,
        }
    }

    /// Drive the inputs and evaluate one pass, keeping the result.
    fn step(&mut self, values: &[bool]) -> Vec<bool> {
        for (&input, &value) in self.inputs.iter().zip(values) {
            self.circuit.set_input_value(input, value).unwrap();
        }
        self.circuit = evaluate(&self.circuit, &EvaluationConfig::default(), 0);
        self.read()
    }

    fn read(&self) -> Vec<bool> {
        self.outputs
            .iter()
            .map(|&id| self.circuit.display_value(id).unwrap())
            .collect()
    }
}

fn combinations(width: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1u32 << width).map(move |n| (0..width).map(|i| (n >> i) & 1 == 1).collect())
}

#[test]
fn test_two_input_truth_tables() {
    let cases: [(GateKind, fn(bool, bool) -> bool); 6] = [
        (GateKind::And, |a, b| a && b),
        (GateKind::Or, |a, b| a || b),
        (GateKind::Nand, |a, b| !(a && b)),
        (GateKind::Nor, |a, b| !(a || b)),
        (GateKind::Xor, |a, b| a ^ b),
        (GateKind::Xnor, |a, b| a == b),
    ];

    for (kind, expected) in cases {
        let mut bench = Bench::new(kind);
        for values in combinations(2) {
            let out = bench.step(&values);
            assert_eq!(out, vec![expected(values[0], values[1])], "{} {:?}", kind, values);
        }
    }

    let mut not = Bench::new(GateKind::Not);
    assert_eq!(not.step(&[false]), vec![true]);
    assert_eq!(not.step(&[true]), vec![false]);
}

#[test]
fn test_structural_kinds_by_table() {
    let mut mux = Bench::new(GateKind::Mux);
    assert_eq!(mux.step(&[true, false, false]), vec![true]);
    assert_eq!(mux.step(&[true, false, true]), vec![false]);
    assert_eq!(mux.step(&[false, true, true]), vec![true]);

    let mut adder = Bench::new(GateKind::Adder4Bit);
    // 0b1011 + 0b0110 + 1 = 0b1_0010
    let a = [true, true, false, true];
    let b = [false, true, true, false];
    let inputs: Vec<bool> = a.iter().chain(b.iter()).copied().chain([true]).collect();
    assert_eq!(adder.step(&inputs), vec![false, true, false, false, true]);
}

#[test]
fn test_end_to_end_and() {
    let mut bench = Bench::new(GateKind::And);
    assert_eq!(bench.step(&[true, true]), vec![true]);

    // Wires report the value their source drives
    let active = bench
        .circuit
        .wires
        .iter()
        .filter(|w| w.is_active)
        .count();
    assert_eq!(active, bench.circuit.wires.len());

    assert_eq!(bench.step(&[true, false]), vec![false]);
    assert!(!bench.circuit.cyclic);
}

#[test]
fn test_acyclic_evaluation_is_idempotent() {
    let mut bench = Bench::new(GateKind::FullAdder);
    bench.step(&[true, false, true]);

    let once = bench.circuit.clone();
    let twice = evaluate(&once, &EvaluationConfig::default(), 0);
    assert_eq!(once, twice);
}

#[test]
fn test_sr_latch_sequence() {
    let mut bench = Bench::new(GateKind::SrLatch);
    assert_eq!(bench.step(&[true, false]), vec![true, false]);
    assert_eq!(bench.step(&[false, false]), vec![true, false]);
    assert_eq!(bench.step(&[false, true]), vec![false, true]);
    assert_eq!(bench.step(&[true, false]), vec![true, false]);

    // Forbidden: both outputs low
    assert_eq!(bench.step(&[true, true]), vec![false, false]);
    // Hold after forbidden reads the forced-low Q
    assert_eq!(bench.step(&[false, false]), vec![false, true]);
}

#[test]
fn test_d_flip_flop_captures_on_rising_edge() {
    let mut bench = Bench::new(GateKind::DFlipFlop);
    // [D, CLK]
    assert_eq!(bench.step(&[true, false]), vec![false, true]);
    assert_eq!(bench.step(&[true, true]), vec![true, false]);
    // CLK held high: D changes are ignored
    assert_eq!(bench.step(&[false, true]), vec![true, false]);
    // Falling edge: no capture
    assert_eq!(bench.step(&[false, false]), vec![true, false]);
    assert_eq!(bench.step(&[false, true]), vec![false, true]);
}

#[test]
fn test_register_capture_and_reset() {
    let mut bench = Bench::new(GateKind::Register4Bit);
    // [D0, D1, D2, D3, CLK, RST]
    assert_eq!(
        bench.step(&[true, false, true, true, false, false]),
        vec![false; 4]
    );
    assert_eq!(
        bench.step(&[true, false, true, true, true, false]),
        vec![true, false, true, true]
    );
    assert_eq!(
        bench.step(&[false, false, false, false, false, false]),
        vec![true, false, true, true]
    );
    // Reset wins over a rising edge
    assert_eq!(
        bench.step(&[true, true, true, true, true, true]),
        vec![false; 4]
    );
}

#[test]
fn test_ring_oscillator_is_cyclic() {
    let mut circuit = Circuit::new();
    let ring: Vec<Uuid> = (0..3)
        .map(|i| circuit.add_gate(GateKind::Not, at(i as f64 * 50.0)))
        .collect();
    for i in 0..3 {
        circuit.connect(ring[i], 0, ring[(i + 1) % 3], 0).unwrap();
    }
    assert_eq!(combinational_feedback(&circuit), ring);

    let auto = EvaluationConfig::default();
    let (first, report) = evaluate_with_report(&circuit, &auto, 0);
    assert!(report.cyclic);
    assert!(first.cyclic);
    assert_eq!(report.unsettled, ring);
    assert!(report.sweeps <= auto.max_sweeps);

    // Unsettled gates hold their values between passes
    let second = evaluate(&first, &auto, 0);
    assert!(second.cyclic);
    assert_eq!(
        second.display_value(ring[0]),
        first.display_value(ring[0])
    );

    // Event-driven passes advance the oscillator one step each
    let event = EvaluationConfig::default().with_strategy(Strategy::EventDriven);
    let a = evaluate(&circuit, &event, 0);
    let b = evaluate(&a, &event, 0);
    assert!(a.cyclic && b.cyclic);
    assert_ne!(a.display_value(ring[0]), b.display_value(ring[0]));
}

#[test]
fn test_already_connected_leaves_wires_unchanged() {
    let mut circuit = Circuit::new();
    let a = circuit.add_gate(GateKind::Input, at(0.0));
    let b = circuit.add_gate(GateKind::Input, at(0.0));
    let not = circuit.add_gate(GateKind::Not, at(100.0));
    circuit.connect(a, 0, not, 0).unwrap();

    let before = circuit.wires.clone();
    assert_eq!(
        circuit.connect(b, 0, not, 0),
        Err(ConnectionError::AlreadyConnected)
    );
    assert_eq!(circuit.wires, before);
}

#[test]
fn test_combinational_only_freezes_memory() {
    let mut bench = Bench::new(GateKind::DFlipFlop);
    bench.step(&[true, false]);

    let config = EvaluationConfig::default().with_strategy(Strategy::CombinationalOnly);
    bench.circuit.set_input_value(bench.inputs[1], true).unwrap();
    let frozen = evaluate(&bench.circuit, &config, 0);

    let before = bench.circuit.get_gate(bench.gate).unwrap();
    let after = frozen.get_gate(bench.gate).unwrap();
    assert_eq!(after.state, before.state);
    assert_eq!(frozen.display_value(bench.outputs[0]), Some(false));
}

#[test]
fn test_clock_follows_time() {
    let mut circuit = Circuit::new();
    let clk = circuit.add_gate(GateKind::Clock, at(0.0));
    let out = circuit.add_gate(GateKind::Output, at(100.0));
    circuit.connect(clk, 0, out, 0).unwrap();
    circuit.set_clock_frequency(clk, 2.0).unwrap();
    circuit.set_clock_running(clk, false, 0).unwrap();
    circuit.set_clock_running(clk, true, 1_000).unwrap();

    let config = EvaluationConfig::default();
    // 2 Hz: 250 ms low, 250 ms high
    for (now, level) in [(1_100, false), (1_300, true), (1_600, false), (1_800, true)] {
        let next = evaluate(&circuit, &config, now);
        assert_eq!(next.display_value(out), Some(level), "t={}", now);
    }

    // Stopped: the last level is held
    let high = evaluate(&circuit, &config, 1_300);
    let mut stopped = high.clone();
    stopped.set_clock_running(clk, false, 1_300).unwrap();
    let later = evaluate(&stopped, &config, 1_600);
    assert_eq!(later.display_value(out), Some(true));
}

#[test]
fn test_clocked_counter_bit() {
    // CLOCK drives a toggle flip-flop: Q flips once per period
    let mut circuit = Circuit::new();
    let clk = circuit.add_gate(GateKind::Clock, at(0.0));
    let ff = circuit.add_gate(GateKind::DFlipFlop, at(100.0));
    let not = circuit.add_gate(GateKind::Not, at(200.0));
    circuit.connect(clk, 0, ff, 1).unwrap();
    circuit.connect(ff, 0, not, 0).unwrap();
    circuit.connect(not, 0, ff, 0).unwrap();

    let config = EvaluationConfig::default();
    let mut q = Vec::new();
    for now in (0..4_000).step_by(250) {
        circuit = evaluate(&circuit, &config, now);
        assert!(!circuit.cyclic);
        q.push(circuit.display_value(ff).unwrap());
    }
    // Rising edges at 500, 1500, 2500 and 3500 ms
    let flips = q.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(flips, 4);
}

/// D and CLK inputs feeding a chain of D flip-flops, Q of each stage into D of
/// the next. `order[i]` is the stage inserted i-th, so the same register can
/// be laid out in any gate order. Returns (circuit, d, clk, stages).
fn shift_register(order: &[usize]) -> (Circuit, Uuid, Uuid, Vec<Uuid>) {
    let mut circuit = Circuit::new();
    let d = circuit.add_gate(GateKind::Input, at(0.0));
    let clk = circuit.add_gate(GateKind::Input, at(0.0));
    let mut stages = vec![Uuid::nil(); order.len()];
    for &stage in order {
        stages[stage] = circuit.add_gate(GateKind::DFlipFlop, at(100.0 * (stage + 1) as f64));
    }
    circuit.connect(d, 0, stages[0], 0).unwrap();
    for (i, &ff) in stages.iter().enumerate() {
        circuit.connect(clk, 0, ff, 1).unwrap();
        if let Some(&next) = stages.get(i + 1) {
            circuit.connect(ff, 0, next, 0).unwrap();
        }
    }
    (circuit, d, clk, stages)
}

fn read_stages(circuit: &Circuit, stages: &[Uuid]) -> Vec<bool> {
    stages
        .iter()
        .map(|&id| circuit.display_value(id).unwrap())
        .collect()
}

#[test]
fn test_shift_register_edge_moves_one_stage() {
    let config = EvaluationConfig::default();
    for order in [[0, 1], [1, 0]] {
        let (mut circuit, d, clk, stages) = shift_register(&order);
        circuit.set_input_value(d, true).unwrap();
        circuit = evaluate(&circuit, &config, 0);
        assert_eq!(read_stages(&circuit, &stages), vec![false, false]);

        circuit.set_input_value(clk, true).unwrap();
        circuit = evaluate(&circuit, &config, 0);
        assert_eq!(
            read_stages(&circuit, &stages),
            vec![true, false],
            "insertion order {:?}",
            order
        );
    }
}

#[test]
fn test_shift_register_any_insertion_order() {
    let bits = [true, false, true, true, false, false];
    let config = EvaluationConfig::default();

    for order in [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ] {
        let (mut circuit, d, clk, stages) = shift_register(&order);
        circuit = evaluate(&circuit, &config, 0);

        let mut history: Vec<bool> = Vec::new();
        for &bit in &bits {
            circuit.set_input_value(d, bit).unwrap();
            circuit.set_input_value(clk, true).unwrap();
            circuit = evaluate(&circuit, &config, 0);
            circuit.set_input_value(clk, false).unwrap();
            circuit = evaluate(&circuit, &config, 0);
            assert!(!circuit.cyclic);

            history.insert(0, bit);
            let expected: Vec<bool> = (0..stages.len())
                .map(|i| history.get(i).copied().unwrap_or(false))
                .collect();
            assert_eq!(
                read_stages(&circuit, &stages),
                expected,
                "insertion order {:?}",
                order
            );
        }
    }
}

#[test]
fn test_ripple_counter_any_insertion_order() {
    // Each stage toggles (D = NOT Q) and clocks the next from its Q, so the pair
    // counts down; the second stage sees the first one's edge a pass later.
    let config = EvaluationConfig::default();
    for second_first in [false, true] {
        let mut circuit = Circuit::new();
        let clk = circuit.add_gate(GateKind::Input, at(0.0));
        let (low, high) = if second_first {
            let high = circuit.add_gate(GateKind::DFlipFlop, at(200.0));
            (circuit.add_gate(GateKind::DFlipFlop, at(100.0)), high)
        } else {
            let low = circuit.add_gate(GateKind::DFlipFlop, at(100.0));
            (low, circuit.add_gate(GateKind::DFlipFlop, at(200.0)))
        };
        circuit.connect(clk, 0, low, 1).unwrap();
        circuit.connect(low, 0, high, 1).unwrap();
        for ff in [low, high] {
            let not = circuit.add_gate(GateKind::Not, at(150.0));
            circuit.connect(ff, 0, not, 0).unwrap();
            circuit.connect(not, 0, ff, 0).unwrap();
        }

        circuit = evaluate(&circuit, &config, 0);
        let mut counts = Vec::new();
        for _ in 0..8 {
            for level in [true, false] {
                circuit.set_input_value(clk, level).unwrap();
                circuit = evaluate(&circuit, &config, 0);
            }
            let value = read_stages(&circuit, &[low, high]);
            counts.push(u8::from(value[0]) + 2 * u8::from(value[1]));
        }
        assert_eq!(counts, vec![3, 2, 1, 0, 3, 2, 1, 0], "second stage first: {}", second_first);
    }
}

#[test]
fn test_custom_gate_matches_closed_form() {
    let mut closed = Bench::new(GateKind::FullAdder);
    let mut custom = Bench::custom(prefab::full_adder());
    for values in combinations(3) {
        assert_eq!(custom.step(&values), closed.step(&values), "{:?}", values);
    }
    assert!(!custom.circuit.cyclic);
}

#[test]
fn test_custom_gate_keeps_inner_state() {
    // A custom gate wrapping a D flip-flop remembers across passes
    let mut inner = Circuit::new();
    let d = inner.add_gate(GateKind::Input, at(0.0));
    let clk = inner.add_gate(GateKind::Input, at(0.0));
    let ff = inner.add_gate(GateKind::DFlipFlop, at(100.0));
    let q = inner.add_gate(GateKind::Output, at(200.0));
    inner.connect(d, 0, ff, 0).unwrap();
    inner.connect(clk, 0, ff, 1).unwrap();
    inner.connect(ff, 0, q, 0).unwrap();
    let definition = CustomGateDefinition::from_circuit("DFF wrapper", inner);

    let mut bench = Bench::custom(definition);
    assert_eq!(bench.step(&[true, false]), vec![false]);
    assert_eq!(bench.step(&[true, true]), vec![true]);
    assert_eq!(bench.step(&[false, false]), vec![true]);
    assert_eq!(bench.step(&[false, true]), vec![false]);
}

#[test]
fn test_inner_loop_marks_outer_cyclic() {
    let mut inner = Circuit::new();
    let a = inner.add_gate(GateKind::Not, at(0.0));
    let b = inner.add_gate(GateKind::Not, at(0.0));
    let c = inner.add_gate(GateKind::Not, at(0.0));
    let y = inner.add_gate(GateKind::Output, at(0.0));
    inner.connect(a, 0, b, 0).unwrap();
    inner.connect(b, 0, c, 0).unwrap();
    inner.connect(c, 0, a, 0).unwrap();
    inner.connect(c, 0, y, 0).unwrap();

    let bench = Bench::custom(CustomGateDefinition::from_circuit("Ring", inner));
    let next = evaluate(&bench.circuit, &EvaluationConfig::default(), 0);
    assert!(next.cyclic);
}

#[test]
fn test_reset_all_state() {
    let mut bench = Bench::new(GateKind::SrLatch);
    bench.step(&[true, false]);
    bench.step(&[false, false]);
    assert_eq!(bench.read(), vec![true, false]);

    bench.circuit.reset_all_state(0);
    assert_eq!(bench.step(&[false, false]), vec![false, true]);
}
