//! SIMD-blocked state vectors and bulk executors for the simvec simulator
//!
//! This crate owns the amplitude buffer and every primitive operation over
//! it: initialization, arithmetic, inner products, sampling, measurement
//! collapse and layout conversion. Amplitudes are stored in SIMD-sized
//! blocks (`W` real parts followed by `W` imaginary parts) so the matrix
//! kernels can feed full-width register loads; see [`state`] for the exact
//! layout contract.
//!
//! All bulk loops are dispatched through an [`Executor`], which is either a
//! plain sequential loop or a fixed-size rayon worker pool. The two are
//! interchangeable: any state produced under one executor is a valid input
//! to a kernel built over the other.
//!
//! # Example
//!
//! ```
//! use simvec_state::{SequentialExecutor, StateSpace};
//!
//! let space: StateSpace<f32, _> = StateSpace::new(3, SequentialExecutor::new());
//! let mut state = space.create_state().unwrap();
//! space.set_state_uniform(&mut state).unwrap();
//!
//! let samples = space.sample(&state, 100, 42).unwrap();
//! assert_eq!(samples.len(), 100);
//! ```

pub mod error;
pub mod executor;
pub mod measurement;
pub mod precision;
pub mod simd;
pub mod state;
pub mod state_space;

pub use error::{Result, StateError};
pub use executor::{AnyExecutor, Executor, ParallelExecutor, SendPtr, SequentialExecutor};
pub use measurement::MeasurementResult;
pub use precision::Precision;
pub use state::{raw_len, State};
pub use state_space::StateSpace;
