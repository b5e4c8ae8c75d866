//! Gate fusion scheduling for the simvec quantum simulator
//!
//! This crate turns a flat, time-ordered gate list into a sequence of fused
//! gate groups, each acting on one or two qubits, so the simulator can apply
//! one composed matrix per group instead of one sweep per gate. Fusion honors
//! measurement barriers and user-supplied split times; see [`fusion`] for the
//! scheduling algorithm.

pub mod error;
pub mod fusion;

pub use error::{FusionError, Result};
pub use fusion::{fuse_gates, FusedGate};
