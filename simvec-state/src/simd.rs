//! SIMD kernels for the blocked amplitude layout

pub mod kernels;
