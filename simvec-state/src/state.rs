//! Aligned amplitude buffer with the SIMD-blocked layout
//!
//! Amplitudes are stored in blocks of `W = P::LANES` basis states. Each block
//! occupies `2W` contiguous floats: the first `W` hold the real parts of the
//! `W` amplitudes, the next `W` their imaginary parts. Blocks follow each
//! other in natural index order. The amplitude at natural index `i` therefore
//! lives at float offsets `2W·(i/W) + (i mod W)` (real) and `W` further on
//! (imaginary).
//!
//! The raw buffer length is `max(2W, 2·2^N)` floats, so very small states are
//! padded up to one full block. The buffer is 64-byte aligned.

use crate::error::{Result, StateError};
use crate::precision::Precision;
use num_complex::Complex;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

/// Alignment of the amplitude buffer (one cache line / AVX-512 register)
const BUFFER_ALIGNMENT: usize = 64;

/// Raw float length of a state over `num_qubits` qubits at precision `P`
pub fn raw_len<P: Precision>(num_qubits: usize) -> usize {
    (2usize << num_qubits).max(2 * P::LANES)
}

/// SIMD-blocked amplitude buffer
///
/// The handle owns its allocation and exposes raw float access for the
/// kernel. Consumers that do not want to know the blocked layout use
/// [`State::get_ampl`] and [`State::set_ampl`], which translate natural
/// amplitude indices into it.
///
/// # Example
///
/// ```
/// use num_complex::Complex;
/// use simvec_state::State;
///
/// let mut state: State<f32> = State::new(2).unwrap();
/// state.set_ampl(3, Complex::new(1.0, 0.0));
/// assert_eq!(state.get_ampl(3), Complex::new(1.0, 0.0));
/// assert_eq!(state.len(), 16); // padded to one 8-lane block
/// ```
pub struct State<P: Precision> {
    len: usize,
    data: NonNull<P>,
    layout: Layout,
}

impl<P: Precision> State<P> {
    /// Allocate a zeroed state buffer for `num_qubits` qubits
    ///
    /// # Errors
    /// Returns [`StateError::Allocation`] if the buffer cannot be allocated.
    pub fn new(num_qubits: usize) -> Result<Self> {
        let len = raw_len::<P>(num_qubits);
        let size = len * std::mem::size_of::<P>();

        let layout = Layout::from_size_align(size, BUFFER_ALIGNMENT)
            .map_err(|_| StateError::Allocation { size })?;

        let data = unsafe {
            let ptr = alloc_zeroed(layout) as *mut P;
            match NonNull::new(ptr) {
                Some(nn) => nn,
                None => return Err(StateError::Allocation { size }),
            }
        };

        Ok(Self { len, data, layout })
    }

    /// Raw float length of the buffer, `max(2W, 2·2^N)`
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// A state buffer is never empty; one padded block at minimum
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// View the raw floats in blocked order
    #[inline]
    pub fn as_slice(&self) -> &[P] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Mutable view of the raw floats in blocked order
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [P] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const P {
        self.data.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut P {
        self.data.as_ptr()
    }

    /// Float offset of the real part of amplitude `i`
    #[inline]
    pub fn real_offset(i: u64) -> usize {
        let w = P::LANES as u64;
        (2 * w * (i / w) + (i % w)) as usize
    }

    /// Amplitude at natural index `i`
    #[inline]
    pub fn get_ampl(&self, i: u64) -> Complex<P> {
        let k = Self::real_offset(i);
        let s = self.as_slice();
        Complex::new(s[k], s[k + P::LANES])
    }

    /// Overwrite the amplitude at natural index `i`
    #[inline]
    pub fn set_ampl(&mut self, i: u64, ampl: Complex<P>) {
        let k = Self::real_offset(i);
        let w = P::LANES;
        let s = self.as_mut_slice();
        s[k] = ampl.re;
        s[k + w] = ampl.im;
    }

    /// Whether the buffer start satisfies the SIMD alignment requirement
    #[inline]
    pub fn is_aligned(&self) -> bool {
        (self.data.as_ptr() as usize) % BUFFER_ALIGNMENT == 0
    }
}

impl<P: Precision> Drop for State<P> {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.data.as_ptr() as *mut u8, self.layout);
        }
    }
}

// Safety: the state owns its buffer; shared access only reads, and bulk
// loops write disjoint index ranges.
unsafe impl<P: Precision> Send for State<P> {}
unsafe impl<P: Precision> Sync for State<P> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_len_padding() {
        assert_eq!(raw_len::<f32>(1), 16);
        assert_eq!(raw_len::<f32>(3), 16);
        assert_eq!(raw_len::<f32>(4), 32);
        assert_eq!(raw_len::<f64>(1), 8);
        assert_eq!(raw_len::<f64>(2), 8);
        assert_eq!(raw_len::<f64>(3), 16);
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let state: State<f32> = State::new(3).unwrap();
        assert!(state.as_slice().iter().all(|&v| v == 0.0));
        assert!(state.is_aligned());
    }

    #[test]
    fn test_ampl_roundtrip_blocked_layout() {
        let mut state: State<f32> = State::new(4).unwrap();

        for i in 0..16u64 {
            state.set_ampl(i, Complex::new(i as f32, -(i as f32)));
        }
        for i in 0..16u64 {
            assert_eq!(state.get_ampl(i), Complex::new(i as f32, -(i as f32)));
        }

        // Amplitude 9 sits in block 1, lane 1: real at 2W + 1, imag W later.
        let s = state.as_slice();
        assert_eq!(s[17], 9.0);
        assert_eq!(s[25], -9.0);
    }

    #[test]
    fn test_ampl_layout_f64() {
        let mut state: State<f64> = State::new(3).unwrap();
        state.set_ampl(6, Complex::new(0.25, 0.75));

        // Block 1 (indices 4..8), lane 2: real at 8 + 2, imag at 8 + 2 + 4.
        let s = state.as_slice();
        assert_eq!(s[10], 0.25);
        assert_eq!(s[14], 0.75);
    }
}
