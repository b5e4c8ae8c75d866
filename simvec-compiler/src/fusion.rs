//! Greedy gate fusion over time windows
//!
//! The fuser walks the circuit one time window at a time. Window boundaries
//! come from the user-supplied split times merged with the times of all
//! measurement gates, so no group ever spans a measurement or a requested
//! split. Inside a window, every two-qubit gate and every unfusible
//! single-qubit gate drives a group; fusible single-qubit gates are absorbed
//! into the neighboring group on their qubit. Fused gates are not multiplied
//! here; groups reference the caller's gates by index and the simulator
//! composes the matrices when a group is applied.
//!
//! The bookkeeping is a per-qubit lattice: for each qubit, the ordered list
//! of gates in the window touching it, with one cursor per qubit marking how
//! far that qubit has been consumed. A two-qubit group repeatedly lines both
//! cursors up on the next gate the pair shares; single-qubit gates skipped
//! during a probe that finds no further shared gate are left behind for
//! later groups.

use crate::error::{FusionError, Result};
use ahash::AHashMap;
use num_traits::Float;
use simvec_core::{Gate, GateKind};
use smallvec::{smallvec, SmallVec};

/// A group of gates that can be applied as one composed matrix
///
/// Groups do not own their gates: `anchor` and `gates` index into the gate
/// slice the fuser was called with, which must outlive the groups.
///
/// For a single-qubit group every member acts on `qubits[0]`; for a
/// two-qubit group every member acts on a subset of `{qubits[0], qubits[1]}`
/// with the pair order taken from the anchor. A measurement group aggregates
/// all measurement gates at one time; its `qubits` is their concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusedGate {
    /// Kind tag copied from the anchor gate
    pub kind: GateKind,

    /// Anchor time; every member's time lies in the group's window
    pub time: u32,

    /// Qubits the composed matrix acts on
    pub qubits: SmallVec<[usize; 4]>,

    /// Index of the gate that opened the group
    pub anchor: usize,

    /// Member gate indices in application order
    pub gates: Vec<usize>,
}

impl FusedGate {
    /// Number of qubits the group acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}

/// Advance cursor `k` over fusible single-qubit gates, collecting them
///
/// Stops at the first two-qubit or unfusible gate, which must be consumed by
/// its own driver.
fn advance<P: Float>(
    mut k: usize,
    lattice: &[usize],
    gates: &[Gate<P>],
    members: &mut Vec<usize>,
) -> usize {
    while k < lattice.len() {
        let gate = &gates[lattice[k]];
        if gate.num_qubits() != 1 || gate.unfusible {
            break;
        }
        members.push(lattice[k]);
        k += 1;
    }
    k
}

/// Whether a two-qubit driver at time `t` was already consumed on this qubit
fn consumed<P: Float>(k: usize, t: u32, lattice: &[usize], gates: &[Gate<P>]) -> bool {
    k >= lattice.len() || gates[lattice[k]].time > t
}

/// Whether both cursors point at the same two-qubit gate
fn next_shared(k0: usize, lattice0: &[usize], k1: usize, lattice1: &[usize]) -> bool {
    k0 < lattice0.len() && k1 < lattice1.len() && lattice0[k0] == lattice1[k1]
}

/// Merge user split times with measurement times into window boundaries
///
/// The result is the deduplicated union in circuit order; the last boundary
/// is at least the last gate's time so the final window closes.
fn merge_with_measurement_times<P: Float>(gates: &[Gate<P>], times: &[u32]) -> Vec<u32> {
    let mut merged = Vec::with_capacity(gates.len() + times.len());
    let mut next = 0usize;

    for gate in gates {
        if gate.is_measurement() && merged.last().map_or(true, |&t| t < gate.time) {
            merged.push(gate.time);
        }

        if next < times.len() && gate.time > times[next] {
            while next < times.len() && times[next] <= gate.time {
                let prev = times[next];
                next += 1;
                merged.push(prev);
                while next < times.len() && times[next] <= prev {
                    next += 1;
                }
            }
        }
    }

    let last_time = gates[gates.len() - 1].time;
    if merged.last().map_or(true, |&t| t < last_time) {
        merged.push(last_time);
    }

    merged
}

/// Fuse a time-ordered gate list into groups of one- and two-qubit gates
///
/// `times_to_split_at` is an ordered list of additional window boundaries; a
/// window contains all gates with time greater than the previous boundary
/// and at most the current one. Measurement gates always end their window,
/// and all measurement gates at one time aggregate into a single group
/// emitted after everything else in the window.
///
/// Empty input yields empty output.
///
/// # Errors
/// Returns [`FusionError::UnorderedTimes`] if a gate's time precedes its
/// predecessor's; no groups are produced in that case.
///
/// # Example
///
/// ```
/// use simvec_core::Gate;
/// use simvec_compiler::fuse_gates;
///
/// let gates: Vec<Gate<f32>> = vec![
///     Gate::hadamard(0, 0),
///     Gate::cnot(1, 0, 1),
/// ];
/// let fused = fuse_gates(2, &gates, &[]).unwrap();
/// assert_eq!(fused.len(), 1);
/// assert_eq!(fused[0].gates, vec![0, 1]);
/// ```
pub fn fuse_gates<P: Float>(
    num_qubits: usize,
    gates: &[Gate<P>],
    times_to_split_at: &[u32],
) -> Result<Vec<FusedGate>> {
    let mut fused = Vec::new();

    if gates.is_empty() {
        return Ok(fused);
    }

    fused.reserve(gates.len());

    let times = merge_with_measurement_times(gates, times_to_split_at);

    // Measurement gate indices grouped by time.
    let mut measurement_gates: AHashMap<u32, Vec<usize>> = AHashMap::new();

    // Drivers in circuit order; the other gates get fused onto them.
    let mut seq: Vec<usize> = Vec::with_capacity(gates.len());

    // Lattice of gates: qubit "hyperplane" and time direction.
    let mut lattice: Vec<Vec<usize>> = vec![Vec::new(); num_qubits];

    let mut gi = 0usize;

    for &boundary in &times {
        seq.clear();
        for wl in lattice.iter_mut() {
            wl.clear();
        }

        let mut prev_time = gates[gi].time;

        // Fill seq and the lattice for this window.
        while gi < gates.len() {
            let gate = &gates[gi];

            if gate.time > boundary {
                break;
            }

            if gate.time < prev_time {
                return Err(FusionError::UnorderedTimes {
                    time: gate.time,
                    previous: prev_time,
                });
            }
            prev_time = gate.time;

            if gate.is_measurement() {
                let at_time = measurement_gates.entry(gate.time).or_default();
                if at_time.is_empty() {
                    seq.push(gi);
                }
                at_time.push(gi);
            } else if gate.num_qubits() == 1 {
                lattice[gate.qubits[0]].push(gi);
                if gate.unfusible {
                    seq.push(gi);
                }
            } else if gate.num_qubits() == 2 {
                lattice[gate.qubits[0]].push(gi);
                lattice[gate.qubits[1]].push(gi);
                seq.push(gi);
            }

            gi += 1;
        }

        let mut last = vec![0usize; num_qubits];
        let mut delayed_measurement: Option<usize> = None;

        for &driver in &seq {
            let gate = &gates[driver];

            if gate.is_measurement() {
                // Everything before the measurement fuses first; the
                // aggregated group closes the window.
                delayed_measurement = Some(driver);
            } else if gate.num_qubits() == 1 {
                let q0 = gate.qubits[0];

                let mut members = Vec::new();
                last[q0] = advance(last[q0], &lattice[q0], gates, &mut members);
                members.push(lattice[q0][last[q0]]);
                last[q0] = advance(last[q0] + 1, &lattice[q0], gates, &mut members);

                fused.push(FusedGate {
                    kind: gate.kind,
                    time: gate.time,
                    qubits: smallvec![q0],
                    anchor: driver,
                    gates: members,
                });
            } else {
                let q0 = gate.qubits[0];
                let q1 = gate.qubits[1];

                if consumed(last[q0], gate.time, &lattice[q0], gates) {
                    continue;
                }

                let mut members = Vec::new();
                loop {
                    let save0 = last[q0];
                    let save1 = last[q1];
                    let mark = members.len();

                    last[q0] = advance(last[q0], &lattice[q0], gates, &mut members);
                    last[q1] = advance(last[q1], &lattice[q1], gates, &mut members);

                    if next_shared(last[q0], &lattice[q0], last[q1], &lattice[q1]) {
                        members.push(lattice[q0][last[q0]]);
                        last[q0] += 1;
                        last[q1] += 1;
                    } else {
                        // The probe found no further shared gate; the
                        // single-qubit gates it skipped stay behind for
                        // later groups on their qubits.
                        last[q0] = save0;
                        last[q1] = save1;
                        members.truncate(mark);
                        break;
                    }
                }

                fused.push(FusedGate {
                    kind: gate.kind,
                    time: gate.time,
                    qubits: smallvec![q0, q1],
                    anchor: driver,
                    gates: members,
                });
            }
        }

        // Orphaned qubits: single-qubit runs no driver reached.
        for q in 0..num_qubits {
            let l = last[q];
            if l == lattice[q].len() {
                continue;
            }

            let anchor = lattice[q][l];
            let mut members = vec![anchor];
            let end = advance(l + 1, &lattice[q], gates, &mut members);
            debug_assert_eq!(end, lattice[q].len());

            fused.push(FusedGate {
                kind: gates[anchor].kind,
                time: gates[anchor].time,
                qubits: smallvec![q],
                anchor,
                gates: members,
            });
        }

        if let Some(anchor) = delayed_measurement {
            let at_time = &measurement_gates[&gates[anchor].time];

            let mut qubits = SmallVec::new();
            for &mi in at_time {
                qubits.extend_from_slice(&gates[mi].qubits);
            }

            fused.push(FusedGate {
                kind: GateKind::Measurement,
                time: gates[anchor].time,
                qubits,
                anchor,
                gates: at_time.clone(),
            });
        }

        if gi == gates.len() {
            break;
        }
    }

    Ok(fused)
}
