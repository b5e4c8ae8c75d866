//! Gate and circuit data model for the simvec quantum simulator
//!
//! This crate defines the input data types shared by the state kernel, the
//! gate fuser and the simulator: a plain [`Gate`] record carrying a kind tag,
//! a time ordinal, the acted-on qubits and a row-major matrix, plus the
//! [`Circuit`] container that owns a time-ordered gate list.
//!
//! Gates are precision-generic: a circuit built over `f32` feeds the
//! single-precision kernel, one built over `f64` the double-precision kernel.
//!
//! # Example
//!
//! ```
//! use simvec_core::{Circuit, Gate};
//!
//! let mut circuit: Circuit<f32> = Circuit::new(2);
//! circuit.push(Gate::hadamard(0, 0)).unwrap();
//! circuit.push(Gate::cnot(1, 0, 1)).unwrap();
//! assert_eq!(circuit.gates.len(), 2);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;

pub use circuit::Circuit;
pub use error::{CircuitError, Result};
pub use gate::{Gate, GateKind};
