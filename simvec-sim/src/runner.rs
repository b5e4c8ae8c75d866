//! Circuit runner: fuse, apply, and dispatch measurement callbacks
//!
//! The runner drives a whole simulation: it builds the state-space kernel
//! and simulator over a shared executor, zero-initializes the state, fuses
//! the circuit against the measurement times, then applies the fused groups
//! in order. Measurement groups draw their outcome from a seeded generator
//! and collapse the state through the kernel. After the last group of each
//! time window the user callback observes (and may mutate) the state.

use crate::config::Parameter;
use crate::error::Result;
use crate::fused::apply_fused_gate;
use crate::simulator::Simulator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simvec_compiler::fuse_gates;
use simvec_core::{Circuit, GateKind};
use simvec_state::{AnyExecutor, Precision, State, StateSpace};
use std::sync::Arc;
use std::time::Instant;

/// The kernel type the runner hands to measurement callbacks
pub type RunnerStateSpace<P> = StateSpace<P, Arc<AnyExecutor>>;

/// Run a circuit, invoking `measure` at each requested time window
///
/// `times_to_measure_at` is an ordered list of time steps; fusion never
/// crosses them, and after the last fused group of each window the callback
/// receives `(time_window_index, kernel, state)`. The callback may read or
/// mutate the state through the kernel, but must leave it normalized if
/// further gates follow.
///
/// # Errors
/// Returns the allocation failure, fusion failure, or gate-application
/// failure that stopped the run; the state is dropped in that case.
///
/// # Example
///
/// ```
/// use simvec_core::{Circuit, Gate};
/// use simvec_sim::{run, Parameter};
///
/// let mut circuit: Circuit<f32> = Circuit::new(2);
/// circuit.push(Gate::hadamard(0, 0)).unwrap();
/// circuit.push(Gate::cnot(1, 0, 1)).unwrap();
///
/// let mut windows = 0;
/// run(&Parameter::new(), &[1], &circuit, |_, space, state| {
///     windows += 1;
///     assert!((space.norm(state).unwrap() - 1.0).abs() < 1e-5);
/// })
/// .unwrap();
/// assert_eq!(windows, 1);
/// ```
pub fn run<P, F>(
    param: &Parameter,
    times_to_measure_at: &[u32],
    circuit: &Circuit<P>,
    mut measure: F,
) -> Result<()>
where
    P: Precision,
    F: FnMut(usize, &RunnerStateSpace<P>, &mut State<P>),
{
    let t0 = Instant::now();

    let executor = Arc::new(AnyExecutor::from_threads(param.num_threads)?);
    let space: RunnerStateSpace<P> = StateSpace::new(circuit.num_qubits, executor.clone());

    let mut state = match space.create_state() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("not enough memory: is the number of qubits too large?");
            return Err(e.into());
        }
    };
    space.set_state_zero(&mut state)?;

    let simulator = Simulator::new(circuit.num_qubits, executor);
    let fused = fuse_gates(circuit.num_qubits, &circuit.gates, times_to_measure_at)?;

    let mut rng = StdRng::seed_from_u64(param.seed);
    let mut cur_time_index = 0usize;

    for (i, group) in fused.iter().enumerate() {
        let t1 = Instant::now();

        if group.kind == GateKind::Measurement {
            space.measure(&group.qubits, rng.gen::<f64>(), &mut state)?;
        } else {
            apply_fused_gate(&simulator, &circuit.gates, group, &mut state)?;
        }

        if param.verbosity > 1 {
            println!("gate {} done in {:.6} seconds", i, t1.elapsed().as_secs_f64());
        }

        if cur_time_index < times_to_measure_at.len() {
            let t = times_to_measure_at[cur_time_index];
            if i == fused.len() - 1 || t < fused[i + 1].time {
                measure(cur_time_index, &space, &mut state);
                cur_time_index += 1;
            }
        }
    }

    if param.verbosity > 0 {
        println!("time elapsed {:.6} seconds", t0.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Run a circuit up to `maxtime` with a single measurement window at the end
pub fn run_with_maxtime<P, F>(
    param: &Parameter,
    maxtime: u32,
    circuit: &Circuit<P>,
    measure: F,
) -> Result<()>
where
    P: Precision,
    F: FnMut(usize, &RunnerStateSpace<P>, &mut State<P>),
{
    run(param, &[maxtime], circuit, measure)
}

/// Run a circuit and hand the final state back to the caller
///
/// No callbacks are dispatched; measurement gates inside the circuit still
/// collapse the state.
///
/// # Errors
/// Returns the allocation failure, fusion failure, or gate-application
/// failure that stopped the run.
pub fn run_to_final_state<P>(
    param: &Parameter,
    maxtime: u32,
    circuit: &Circuit<P>,
) -> Result<State<P>>
where
    P: Precision,
{
    let t0 = Instant::now();

    let executor = Arc::new(AnyExecutor::from_threads(param.num_threads)?);
    let space: RunnerStateSpace<P> = StateSpace::new(circuit.num_qubits, executor.clone());

    let mut state = match space.create_state() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("not enough memory: is the number of qubits too large?");
            return Err(e.into());
        }
    };
    space.set_state_zero(&mut state)?;

    let simulator = Simulator::new(circuit.num_qubits, executor);
    let fused = fuse_gates(circuit.num_qubits, &circuit.gates, &[maxtime])?;

    let mut rng = StdRng::seed_from_u64(param.seed);

    for (i, group) in fused.iter().enumerate() {
        let t1 = Instant::now();

        if group.kind == GateKind::Measurement {
            space.measure(&group.qubits, rng.gen::<f64>(), &mut state)?;
        } else {
            apply_fused_gate(&simulator, &circuit.gates, group, &mut state)?;
        }

        if param.verbosity > 1 {
            println!("gate {} done in {:.6} seconds", i, t1.elapsed().as_secs_f64());
        }
    }

    if param.verbosity > 0 {
        println!("time elapsed {:.6} seconds", t0.elapsed().as_secs_f64());
    }

    Ok(state)
}
