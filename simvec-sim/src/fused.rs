//! Composing and applying fused gate groups
//!
//! A fused group references its member gates by index; the group matrix is
//! the chain product of the member matrices in application order, with
//! single-qubit members of a two-qubit group lifted onto the group's
//! component index by an identity expansion.

use crate::error::{Result, SimulatorError};
use crate::matrix::{
    expand_high, expand_low, identity2, identity4, matrix2_from_slice, matrix4_from_slice,
    multiply_2x2, multiply_4x4, swap_qubit_order, Matrix2, Matrix4,
};
use crate::simulator::Simulator;
use simvec_compiler::FusedGate;
use simvec_core::Gate;
use simvec_state::{Executor, Precision, State};

/// Product matrix of a single-qubit fused group
///
/// # Errors
/// Returns [`SimulatorError::InvalidMatrix`] if a member matrix has the
/// wrong shape.
pub fn fused_matrix1<P: Precision>(gates: &[Gate<P>], group: &FusedGate) -> Result<Matrix2<P>> {
    let mut acc = identity2();
    for &idx in &group.gates {
        let m = matrix2_from_slice(&gates[idx].matrix)?;
        acc = multiply_2x2(&m, &acc);
    }
    Ok(acc)
}

/// Product matrix of a two-qubit fused group
///
/// Single-qubit members are lifted onto the component index bit of their
/// qubit; two-qubit members stored for the reversed pair are reindexed.
///
/// # Errors
/// Returns [`SimulatorError::GroupMismatch`] if a member acts outside the
/// group's qubit pair, or [`SimulatorError::InvalidMatrix`] for a malformed
/// member matrix.
pub fn fused_matrix2<P: Precision>(gates: &[Gate<P>], group: &FusedGate) -> Result<Matrix4<P>> {
    let q0 = group.qubits[0];
    let q1 = group.qubits[1];

    let mut acc = identity4();
    for &idx in &group.gates {
        let gate = &gates[idx];
        let m = match gate.num_qubits() {
            1 => {
                let u = matrix2_from_slice(&gate.matrix)?;
                if gate.qubits[0] == q0 {
                    expand_low(&u)
                } else if gate.qubits[0] == q1 {
                    expand_high(&u)
                } else {
                    return Err(SimulatorError::GroupMismatch);
                }
            }
            2 => {
                let u = matrix4_from_slice(&gate.matrix)?;
                if gate.qubits[0] == q0 && gate.qubits[1] == q1 {
                    u
                } else if gate.qubits[0] == q1 && gate.qubits[1] == q0 {
                    swap_qubit_order(&u)
                } else {
                    return Err(SimulatorError::GroupMismatch);
                }
            }
            _ => return Err(SimulatorError::GroupMismatch),
        };
        acc = multiply_4x4(&m, &acc);
    }
    Ok(acc)
}

/// Compose a fused group's matrix and apply it to the state
///
/// Measurement groups carry no matrix and are handled by the runner, not
/// here.
///
/// # Errors
/// Returns [`SimulatorError::UnsupportedGroup`] for group arities other
/// than one or two, plus any composition error.
pub fn apply_fused_gate<P: Precision, E: Executor>(
    simulator: &Simulator<P, E>,
    gates: &[Gate<P>],
    group: &FusedGate,
    state: &mut State<P>,
) -> Result<()> {
    match group.num_qubits() {
        1 => {
            let m = fused_matrix1(gates, group)?;
            simulator.apply_gate1(&m, group.qubits[0], state)
        }
        2 => {
            let m = fused_matrix2(gates, group)?;
            simulator.apply_gate2(&m, group.qubits[0], group.qubits[1], state)
        }
        n => Err(SimulatorError::UnsupportedGroup { num_qubits: n }),
    }
}
