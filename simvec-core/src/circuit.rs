//! Circuit container: a time-ordered gate list over a fixed qubit count

use crate::error::{CircuitError, Result};
use crate::gate::Gate;
use num_traits::Float;

/// A quantum circuit: the number of qubits and a time-ordered gate list
///
/// The container validates qubit indices on insertion but does not enforce
/// time ordering; the fuser reports unordered input when it encounters it.
///
/// # Example
///
/// ```
/// use simvec_core::{Circuit, Gate};
///
/// let mut circuit: Circuit<f32> = Circuit::new(2);
/// circuit.push(Gate::hadamard(0, 0)).unwrap();
/// circuit.push(Gate::cnot(1, 0, 1)).unwrap();
/// circuit.push(Gate::measurement(2, &[0, 1])).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Circuit<P: Float> {
    /// Number of qubits the circuit acts on
    pub num_qubits: usize,

    /// Gates in circuit order
    pub gates: Vec<Gate<P>>,
}

impl<P: Float> Circuit<P> {
    /// Create an empty circuit over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Create an empty circuit with gate capacity reserved
    pub fn with_capacity(num_qubits: usize, capacity: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::with_capacity(capacity),
        }
    }

    /// Append a gate after validating its qubit operands
    ///
    /// # Errors
    /// Returns [`CircuitError::InvalidQubitIndex`] if any operand is out of
    /// range, or [`CircuitError::DuplicateQubit`] if a multi-qubit gate names
    /// the same qubit twice.
    pub fn push(&mut self, gate: Gate<P>) -> Result<()> {
        for (i, &q) in gate.qubits.iter().enumerate() {
            if q >= self.num_qubits {
                return Err(CircuitError::InvalidQubitIndex {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
            if gate.qubits[..i].contains(&q) {
                return Err(CircuitError::DuplicateQubit { index: q });
            }
        }

        self.gates.push(gate);
        Ok(())
    }

    /// Number of gates in the circuit
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the circuit contains no gates
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_valid_gates() {
        let mut circuit: Circuit<f32> = Circuit::new(3);
        circuit.push(Gate::hadamard(0, 0)).unwrap();
        circuit.push(Gate::cnot(1, 0, 2)).unwrap();
        assert_eq!(circuit.len(), 2);
        assert!(!circuit.is_empty());
    }

    #[test]
    fn test_push_out_of_range_qubit() {
        let mut circuit: Circuit<f32> = Circuit::new(2);
        let result = circuit.push(Gate::x(0, 5));
        assert!(matches!(
            result,
            Err(CircuitError::InvalidQubitIndex { index: 5, .. })
        ));
    }

    #[test]
    fn test_push_duplicate_qubit() {
        let mut circuit: Circuit<f64> = Circuit::new(2);
        let result = circuit.push(Gate::cnot(0, 1, 1));
        assert!(matches!(
            result,
            Err(CircuitError::DuplicateQubit { index: 1 })
        ));
    }

    #[test]
    fn test_measurement_of_all_qubits() {
        let mut circuit: Circuit<f32> = Circuit::new(4);
        circuit.push(Gate::measurement(0, &[0, 1, 2, 3])).unwrap();
        assert_eq!(circuit.gates[0].num_qubits(), 4);
    }
}
