//! AVX2 kernels over single-precision amplitude blocks
//!
//! A block is eight real parts followed by eight imaginary parts, so each
//! half fills one 256-bit register. Callers must pass slices of exactly
//! eight lanes; the safe dispatch lives in the `Precision` impl for `f32`.

#![cfg(target_arch = "x86_64")]

use num_complex::Complex64;
use std::arch::x86_64::*;

/// Whether the AVX2 + FMA kernels can be used on this machine
///
/// Detection results are cached by the standard library, so this is cheap
/// enough to call per block.
#[inline]
pub fn avx2_available() -> bool {
    is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
}

#[inline]
unsafe fn horizontal_sum(s: __m256) -> f64 {
    let mut buf = [0.0f32; 8];
    _mm256_storeu_ps(buf.as_mut_ptr(), s);
    buf.iter().map(|&v| v as f64).sum()
}

/// `Σ re² + im²` over one block
///
/// # Safety
/// Requires AVX2 and FMA support; both slices must have eight lanes.
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn block_norm_sqr_avx2(re: &[f32], im: &[f32]) -> f64 {
    debug_assert_eq!(re.len(), 8);
    debug_assert_eq!(im.len(), 8);

    let r = _mm256_loadu_ps(re.as_ptr());
    let i = _mm256_loadu_ps(im.as_ptr());
    let s = _mm256_fmadd_ps(i, i, _mm256_mul_ps(r, r));

    horizontal_sum(s)
}

/// Multiply one block by a real scalar in place
///
/// # Safety
/// Requires AVX2 and FMA support; both slices must have eight lanes.
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn block_scale_avx2(a: f32, re: &mut [f32], im: &mut [f32]) {
    debug_assert_eq!(re.len(), 8);
    debug_assert_eq!(im.len(), 8);

    let s = _mm256_set1_ps(a);
    let r = _mm256_mul_ps(_mm256_loadu_ps(re.as_ptr()), s);
    let i = _mm256_mul_ps(_mm256_loadu_ps(im.as_ptr()), s);

    _mm256_storeu_ps(re.as_mut_ptr(), r);
    _mm256_storeu_ps(im.as_mut_ptr(), i);
}

/// Elementwise complex add of a source block into a destination block
///
/// # Safety
/// Requires AVX2 and FMA support; all slices must have eight lanes.
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn block_add_avx2(src_re: &[f32], src_im: &[f32], dst_re: &mut [f32], dst_im: &mut [f32]) {
    debug_assert_eq!(src_re.len(), 8);
    debug_assert_eq!(dst_re.len(), 8);

    let r1 = _mm256_loadu_ps(src_re.as_ptr());
    let i1 = _mm256_loadu_ps(src_im.as_ptr());
    let r2 = _mm256_loadu_ps(dst_re.as_ptr());
    let i2 = _mm256_loadu_ps(dst_im.as_ptr());

    _mm256_storeu_ps(dst_re.as_mut_ptr(), _mm256_add_ps(r1, r2));
    _mm256_storeu_ps(dst_im.as_mut_ptr(), _mm256_add_ps(i1, i2));
}

/// `Σ conj(a1)·a2` over one block
///
/// # Safety
/// Requires AVX2 and FMA support; all slices must have eight lanes.
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn block_inner_avx2(
    re1: &[f32],
    im1: &[f32],
    re2: &[f32],
    im2: &[f32],
) -> Complex64 {
    debug_assert_eq!(re1.len(), 8);
    debug_assert_eq!(re2.len(), 8);

    let r1 = _mm256_loadu_ps(re1.as_ptr());
    let i1 = _mm256_loadu_ps(im1.as_ptr());
    let r2 = _mm256_loadu_ps(re2.as_ptr());
    let i2 = _mm256_loadu_ps(im2.as_ptr());

    let ip_re = _mm256_fmadd_ps(i1, i2, _mm256_mul_ps(r1, r2));
    let ip_im = _mm256_fnmadd_ps(i1, r2, _mm256_mul_ps(r1, i2));

    Complex64::new(horizontal_sum(ip_re), horizontal_sum(ip_im))
}
