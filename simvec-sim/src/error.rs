//! Error types for gate application and circuit running

use simvec_compiler::FusionError;
use simvec_state::StateError;
use thiserror::Error;

/// Errors that can occur while applying gates or running a circuit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit simulator")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// A state handle has the wrong raw length for the configured layout
    #[error("State size mismatch: expected {expected} raw elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A gate matrix has the wrong number of elements
    #[error("Invalid matrix length {actual}, expected {expected}")]
    InvalidMatrix { expected: usize, actual: usize },

    /// A fused group spans more qubits than a matrix can be composed for
    #[error("Fused group with {num_qubits} qubits cannot be applied as a matrix")]
    UnsupportedGroup { num_qubits: usize },

    /// A fused group member acts on qubits outside the group
    #[error("Fused group member acts outside the group qubits")]
    GroupMismatch,

    /// Kernel-level failure
    #[error(transparent)]
    State(#[from] StateError),

    /// Fusion-level failure
    #[error(transparent)]
    Fusion(#[from] FusionError),
}

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;
