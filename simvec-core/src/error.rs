//! Error types for the circuit data model

use thiserror::Error;

/// Errors that can occur while building gates and circuits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    /// Qubit index out of range for the circuit
    #[error("Invalid qubit index {index} for {num_qubits}-qubit circuit")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// The same qubit was given twice to a multi-qubit gate
    #[error("Duplicate qubit {index} in gate operand list")]
    DuplicateQubit { index: usize },

    /// A gate matrix has the wrong number of elements for its qubit count
    #[error("Invalid matrix length {actual}, expected {expected}")]
    InvalidMatrixSize { expected: usize, actual: usize },
}

/// Result type for circuit construction
pub type Result<T> = std::result::Result<T, CircuitError>;
