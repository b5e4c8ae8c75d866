//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Memory allocation for the amplitude buffer failed
    #[error("Failed to allocate {size} bytes for state vector")]
    Allocation { size: usize },

    /// A state handle has the wrong raw length for the configured layout
    #[error("State size mismatch: expected {expected} raw elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// A collapse was requested onto an outcome with zero probability
    #[error("Measurement outcome mask={mask:#x} bits={bits:#x} has zero probability")]
    ZeroProbability { mask: u64, bits: u64 },

    /// Drawing a measurement outcome failed to locate a basis state
    #[error("Failed to locate a measurement outcome in the sampled partition")]
    MeasurementFailed,

    /// The worker pool backing the parallel executor could not be built
    #[error("Failed to build worker pool: {reason}")]
    ThreadPool { reason: String },
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
