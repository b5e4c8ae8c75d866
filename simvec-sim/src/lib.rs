//! Gate application and circuit runner for the simvec quantum simulator
//!
//! This crate closes the loop between the state kernel and the fuser: the
//! [`Simulator`] applies one- and two-qubit matrices to the blocked state
//! layout, [`fused`] composes fused groups into single matrices, and the
//! [`runner`] entry points drive a full simulation with measurement
//! callbacks at requested time windows.
//!
//! # Example
//!
//! ```
//! use simvec_core::{Circuit, Gate};
//! use simvec_sim::{run_to_final_state, Parameter};
//!
//! // Bell pair: H then CNOT.
//! let mut circuit: Circuit<f32> = Circuit::new(2);
//! circuit.push(Gate::hadamard(0, 0)).unwrap();
//! circuit.push(Gate::cnot(1, 0, 1)).unwrap();
//!
//! let state = run_to_final_state(&Parameter::new(), 1, &circuit).unwrap();
//! let h = std::f32::consts::FRAC_1_SQRT_2;
//! assert!((state.get_ampl(0).re - h).abs() < 1e-5);
//! assert!((state.get_ampl(3).re - h).abs() < 1e-5);
//! ```

pub mod config;
pub mod error;
pub mod fused;
pub mod matrix;
pub mod runner;
pub mod simulator;

pub use config::Parameter;
pub use error::{Result, SimulatorError};
pub use fused::{apply_fused_gate, fused_matrix1, fused_matrix2};
pub use runner::{run, run_to_final_state, run_with_maxtime, RunnerStateSpace};
pub use simulator::Simulator;
