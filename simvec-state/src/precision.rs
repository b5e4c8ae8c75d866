//! Precision abstraction over the amplitude float type
//!
//! The state kernel is generic over [`Precision`], which fixes the SIMD lane
//! count `W` of the blocked layout and supplies the per-block arithmetic
//! primitives. A block holds `W` amplitudes as `W` contiguous real parts
//! followed by `W` contiguous imaginary parts, sized so one register load
//! picks up all real (or all imaginary) parts at once: 8 lanes of `f32` or
//! 4 lanes of `f64` for 256-bit registers.
//!
//! All reductions accumulate at `f64` regardless of the storage precision.

use num_complex::Complex64;
use num_traits::Float;
use std::fmt::Debug;

/// Amplitude float type with an associated SIMD lane count
///
/// The per-block primitives have scalar defaults; the `f32` implementation
/// overrides them with AVX2 kernels under runtime feature detection.
pub trait Precision: Float + Debug + Send + Sync + 'static {
    /// SIMD lane count `W`; one block stores `W` amplitudes
    const LANES: usize;

    /// Widen to f64 for accumulation
    fn as_f64(self) -> f64;

    /// Narrow from f64
    fn from_f64(v: f64) -> Self;

    /// `Σ |a|²` over one block, accumulated at f64
    fn block_norm_sqr(re: &[Self], im: &[Self]) -> f64 {
        scalar_norm_sqr(re, im)
    }

    /// Multiply one block by a real scalar in place
    fn block_scale(a: Self, re: &mut [Self], im: &mut [Self]) {
        scalar_scale(a, re, im)
    }

    /// Elementwise complex add of one source block into a destination block
    fn block_add(src_re: &[Self], src_im: &[Self], dst_re: &mut [Self], dst_im: &mut [Self]) {
        scalar_add(src_re, src_im, dst_re, dst_im)
    }

    /// `Σ conj(a1)·a2` over one block, accumulated at f64
    fn block_inner(re1: &[Self], im1: &[Self], re2: &[Self], im2: &[Self]) -> Complex64 {
        scalar_inner(re1, im1, re2, im2)
    }
}

fn scalar_norm_sqr<P: Precision>(re: &[P], im: &[P]) -> f64 {
    let mut sum = 0.0;
    for j in 0..re.len() {
        let r = re[j].as_f64();
        let i = im[j].as_f64();
        sum += r * r + i * i;
    }
    sum
}

fn scalar_scale<P: Precision>(a: P, re: &mut [P], im: &mut [P]) {
    for j in 0..re.len() {
        re[j] = re[j] * a;
        im[j] = im[j] * a;
    }
}

fn scalar_add<P: Precision>(src_re: &[P], src_im: &[P], dst_re: &mut [P], dst_im: &mut [P]) {
    for j in 0..src_re.len() {
        dst_re[j] = dst_re[j] + src_re[j];
        dst_im[j] = dst_im[j] + src_im[j];
    }
}

fn scalar_inner<P: Precision>(re1: &[P], im1: &[P], re2: &[P], im2: &[P]) -> Complex64 {
    let mut re = 0.0;
    let mut im = 0.0;
    for j in 0..re1.len() {
        let r1 = re1[j].as_f64();
        let i1 = im1[j].as_f64();
        let r2 = re2[j].as_f64();
        let i2 = im2[j].as_f64();
        re += r1 * r2 + i1 * i2;
        im += r1 * i2 - i1 * r2;
    }
    Complex64::new(re, im)
}

impl Precision for f32 {
    const LANES: usize = 8;

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn block_norm_sqr(re: &[f32], im: &[f32]) -> f64 {
        #[cfg(target_arch = "x86_64")]
        {
            if re.len() == Self::LANES && crate::simd::kernels::avx2_available() {
                return unsafe { crate::simd::kernels::block_norm_sqr_avx2(re, im) };
            }
        }
        scalar_norm_sqr(re, im)
    }

    fn block_scale(a: f32, re: &mut [f32], im: &mut [f32]) {
        #[cfg(target_arch = "x86_64")]
        {
            if re.len() == Self::LANES && crate::simd::kernels::avx2_available() {
                return unsafe { crate::simd::kernels::block_scale_avx2(a, re, im) };
            }
        }
        scalar_scale(a, re, im)
    }

    fn block_add(src_re: &[f32], src_im: &[f32], dst_re: &mut [f32], dst_im: &mut [f32]) {
        #[cfg(target_arch = "x86_64")]
        {
            if src_re.len() == Self::LANES && crate::simd::kernels::avx2_available() {
                return unsafe {
                    crate::simd::kernels::block_add_avx2(src_re, src_im, dst_re, dst_im)
                };
            }
        }
        scalar_add(src_re, src_im, dst_re, dst_im)
    }

    fn block_inner(re1: &[f32], im1: &[f32], re2: &[f32], im2: &[f32]) -> Complex64 {
        #[cfg(target_arch = "x86_64")]
        {
            if re1.len() == Self::LANES && crate::simd::kernels::avx2_available() {
                return unsafe { crate::simd::kernels::block_inner_avx2(re1, im1, re2, im2) };
            }
        }
        scalar_inner(re1, im1, re2, im2)
    }
}

impl Precision for f64 {
    const LANES: usize = 4;

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lane_counts() {
        assert_eq!(<f32 as Precision>::LANES, 8);
        assert_eq!(<f64 as Precision>::LANES, 4);
    }

    #[test]
    fn test_block_norm_sqr_f32() {
        let re = [1.0f32, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0];
        let im = [0.0f32, 1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_relative_eq!(f32::block_norm_sqr(&re, &im), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_block_inner_matches_scalar() {
        let re1 = [0.5f32, 0.25, 0.0, 1.0, 0.0, 0.0, 0.5, 0.0];
        let im1 = [0.0f32, 0.5, 1.0, 0.0, 0.0, 0.25, 0.0, 0.0];
        let re2 = [1.0f32, 0.0, 0.5, 0.5, 0.0, 0.0, 0.0, 0.25];
        let im2 = [0.0f32, 0.5, 0.0, 0.0, 1.0, 0.5, 0.25, 0.0];

        let fast = f32::block_inner(&re1, &im1, &re2, &im2);
        let slow = scalar_inner(&re1, &im1, &re2, &im2);
        assert_relative_eq!(fast.re, slow.re, epsilon = 1e-6);
        assert_relative_eq!(fast.im, slow.im, epsilon = 1e-6);
    }

    #[test]
    fn test_block_scale_and_add_f64() {
        let mut re = [1.0f64, 2.0, 3.0, 4.0];
        let mut im = [0.5f64, 0.5, 0.5, 0.5];
        f64::block_scale(2.0, &mut re, &mut im);
        assert_relative_eq!(re[3], 8.0, epsilon = 1e-12);
        assert_relative_eq!(im[0], 1.0, epsilon = 1e-12);

        let src_re = [1.0f64; 4];
        let src_im = [1.0f64; 4];
        f64::block_add(&src_re, &src_im, &mut re, &mut im);
        assert_relative_eq!(re[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(im[2], 2.0, epsilon = 1e-12);
    }
}
