//! Hybrid evaluator: relaxation for combinational logic, state-carried
//! evaluation through memory gates, bounded sweeps for loops that never settle.

use std::collections::{HashMap, VecDeque};

use log::debug;
use uuid::Uuid;

use super::context::EvalContext;
use super::custom::evaluate_custom;
use super::{EvaluationConfig, EvaluationReport, Strategy};
use crate::logic::{self, Behavior};
use crate::model::circuit::Circuit;
use crate::util::timing::ScopedTimer;

/// Run a single pass over `circuit`, producing a new snapshot.
pub fn run_pass(
    circuit: &Circuit,
    config: &EvaluationConfig,
    now_ms: u64,
) -> (Circuit, EvaluationReport) {
    let _timer = config.enable_debug_logging.then(|| {
        ScopedTimer::debug(format!("Evaluating {} gates", circuit.gates.len()))
    });

    let mut ctx = EvalContext::new(circuit);
    let mut report = EvaluationReport::default();

    seed(&mut ctx, config, now_ms);
    relax(&mut ctx, config, now_ms, &mut report);

    let unsettled: Vec<usize> = (0..ctx.values.len())
        .filter(|&i| needs_settling(&ctx, i) && !ctx.settled[i])
        .collect();

    if !unsettled.is_empty() && config.strategy == Strategy::EventDriven {
        step_unsettled(&mut ctx, &unsettled, config, now_ms);
    }

    report.unsettled = unsettled.iter().map(|&i| circuit.gates[i].id).collect();
    report.cyclic = !unsettled.is_empty() || ctx.inner_cyclic.iter().any(|&c| c);

    if config.enable_debug_logging && report.cyclic {
        debug!(
            "Circuit did not settle after {} sweeps ({} gates unsettled)",
            report.sweeps,
            report.unsettled.len()
        );
    }

    (assemble(ctx, report.cyclic), report)
}

/// Gates whose outputs come from relaxation: everything but sources and memory.
fn needs_settling(ctx: &EvalContext, gate: usize) -> bool {
    let kind = ctx.circuit.gates[gate].kind;
    !kind.is_source() && !kind.is_memory()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Mark INPUT, CLOCK and memory gates as available and give them their outputs
/// for this pass.
fn seed(ctx: &mut EvalContext, config: &EvaluationConfig, now_ms: u64) {
    let circuit = ctx.circuit;
    for (i, gate) in circuit.gates.iter().enumerate() {
        let arity = gate.outputs.len();
        match logic::behavior(gate.kind) {
            Behavior::Held => {
                ctx.settled[i] = true;
            }
            Behavior::Clock => {
                let held = ctx.values[i].first().copied().unwrap_or(false);
                let level = gate
                    .clock_state()
                    .and_then(|c| logic::clock::clock_level(c, now_ms))
                    .unwrap_or(held);
                ctx.values[i] = vec![level; arity];
                ctx.settled[i] = true;
            }
            Behavior::Memory => {
                // Consumers may read the previous output right away
                if let Some(outputs) = logic::stored_outputs(gate.kind, gate.state.as_ref()) {
                    ctx.values[i] = outputs;
                }
                ctx.settled[i] = true;
                ctx.transitioned[i] = config.strategy == Strategy::CombinationalOnly;
            }
            Behavior::Pure(_) | Behavior::Composite => {}
        }
        ctx.values[i].resize(arity, false);
    }
}

// ---------------------------------------------------------------------------
// Relaxation
// ---------------------------------------------------------------------------

/// Settle combinational logic against the stored memory outputs, step every
/// memory gate together from those values, then settle whatever the new
/// memory outputs disturbed. The sweep cap covers both rounds.
fn relax(
    ctx: &mut EvalContext,
    config: &EvaluationConfig,
    now_ms: u64,
    report: &mut EvaluationReport,
) {
    settle_combinational(ctx, config, now_ms, report);
    if step_memory_gates(ctx, config, report) {
        settle_combinational(ctx, config, now_ms, report);
    }
}

fn settle_combinational(
    ctx: &mut EvalContext,
    config: &EvaluationConfig,
    now_ms: u64,
    report: &mut EvaluationReport,
) {
    let gate_count = ctx.values.len();

    while report.sweeps < config.max_sweeps {
        report.sweeps += 1;
        let mut progress = false;

        for i in 0..gate_count {
            if ctx.settled[i] || !ctx.is_ready(i) {
                continue;
            }
            match logic::behavior(ctx.circuit.gates[i].kind) {
                Behavior::Pure(f) => {
                    let outputs = f(&ctx.input_values(i));
                    ctx.set_values(i, outputs);
                    ctx.settled[i] = true;
                    progress = true;
                }
                Behavior::Composite => {
                    settle_composite(ctx, i, config, now_ms);
                    progress = true;
                }
                Behavior::Held | Behavior::Clock | Behavior::Memory => {}
            }
        }

        if config.enable_debug_logging {
            let settled = ctx.settled.iter().filter(|&&s| s).count();
            debug!("Sweep {}: {}/{} gates settled", report.sweeps, settled, gate_count);
        }

        if !progress {
            break;
        }
    }
}

/// Step every memory gate not yet stepped in this pass. All transitions read
/// the values visible before any of them publishes, so no memory gate sees
/// another's new output in the same pass. Returns whether any output changed.
fn step_memory_gates(
    ctx: &mut EvalContext,
    config: &EvaluationConfig,
    report: &mut EvaluationReport,
) -> bool {
    let pending: Vec<(usize, Vec<bool>)> = (0..ctx.values.len())
        .filter(|&i| ctx.circuit.gates[i].kind.is_memory() && !ctx.transitioned[i])
        .map(|i| (i, ctx.input_values(i)))
        .collect();

    let mut stepped = Vec::with_capacity(pending.len());
    for (gate, inputs) in pending {
        ctx.transitioned[gate] = true;
        let kind = ctx.circuit.gates[gate].kind;
        let Some((outputs, state)) = logic::transition(kind, &inputs, ctx.states[gate].as_ref())
        else {
            continue;
        };
        report.transitions += 1;

        if config.enable_debug_logging {
            debug!(
                "{} {} stepped: inputs {:?} -> outputs {:?}",
                kind, ctx.circuit.gates[gate].id, inputs, outputs
            );
        }
        ctx.states[gate] = Some(state);
        stepped.push((gate, outputs));
    }

    let mut changed = false;
    for (gate, outputs) in stepped {
        if ctx.set_values(gate, outputs) {
            unsettle_downstream(ctx, gate);
            changed = true;
        }
    }
    changed
}

/// Unsettle every settled gate reachable from `gate` without crossing a
/// source or memory gate.
fn unsettle_downstream(ctx: &mut EvalContext, gate: usize) {
    let mut queue: VecDeque<usize> = ctx.fanout[gate].iter().copied().collect();
    while let Some(next) = queue.pop_front() {
        if !needs_settling(ctx, next) || !ctx.settled[next] {
            continue;
        }
        ctx.settled[next] = false;
        queue.extend(ctx.fanout[next].iter().copied());
    }
}

/// Evaluate a CUSTOM gate from the pass's starting inner circuit, so settling
/// it again after an upstream change replaces rather than stacks results.
fn settle_composite(ctx: &mut EvalContext, gate: usize, config: &EvaluationConfig, now_ms: u64) {
    let circuit = ctx.circuit;
    let inputs = ctx.input_values(gate);
    let arity = circuit.gates[gate].outputs.len();

    if let Some(definition) = circuit.gates[gate].definition.as_deref() {
        let outcome = evaluate_custom(definition, &inputs, config, now_ms);
        let mut outputs = outcome.outputs;
        outputs.resize(arity, false);
        ctx.set_values(gate, outputs);
        ctx.definitions[gate] = Some(outcome.definition);
        ctx.inner_cyclic[gate] = outcome.cyclic;
    }
    ctx.settled[gate] = true;
}

// ---------------------------------------------------------------------------
// Event-driven stepping
// ---------------------------------------------------------------------------

/// Advance every unsettled gate by one synchronous step: all of them read the
/// values visible at the end of relaxation, then all are updated together.
fn step_unsettled(
    ctx: &mut EvalContext,
    unsettled: &[usize],
    config: &EvaluationConfig,
    now_ms: u64,
) {
    let circuit = ctx.circuit;
    let snapshot = ctx.values.clone();
    for &i in unsettled {
        let inputs = EvalContext::resolve_inputs(&ctx.drivers[i], &snapshot);
        let gate = &circuit.gates[i];
        match logic::behavior(gate.kind) {
            Behavior::Pure(f) => {
                ctx.values[i] = f(&inputs);
            }
            Behavior::Composite => {
                if let Some(definition) = gate.definition.as_deref() {
                    let outcome = evaluate_custom(definition, &inputs, config, now_ms);
                    let mut outputs = outcome.outputs;
                    outputs.resize(gate.outputs.len(), false);
                    ctx.values[i] = outputs;
                    ctx.definitions[i] = Some(outcome.definition);
                    ctx.inner_cyclic[i] = outcome.cyclic;
                }
            }
            Behavior::Held | Behavior::Clock | Behavior::Memory => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Build the new snapshot: outputs, resolved input pins, states, wire activity.
fn assemble(ctx: EvalContext, cyclic: bool) -> Circuit {
    let EvalContext {
        circuit,
        drivers,
        values,
        states,
        definitions,
        ..
    } = ctx;

    let mut next = circuit.clone();
    next.cyclic = cyclic;

    for (i, gate) in next.gates.iter_mut().enumerate() {
        let inputs = EvalContext::resolve_inputs(&drivers[i], &values);
        gate.set_input_values(&inputs);
        gate.set_output_values(&values[i]);
        gate.state = states[i].clone();
        if let Some(definition) = &definitions[i] {
            gate.definition = Some(Box::new(definition.clone()));
        }
    }

    let index: HashMap<Uuid, usize> = circuit
        .gates
        .iter()
        .enumerate()
        .map(|(i, g)| (g.id, i))
        .collect();
    for wire in &mut next.wires {
        wire.is_active = index
            .get(&wire.from.gate_id)
            .and_then(|&src| values[src].get(wire.from.pin_index).copied())
            .unwrap_or(false);
    }

    next
}
