//! Small complex matrix utilities for gate composition

use crate::error::{Result, SimulatorError};
use num_complex::Complex;
use num_traits::Float;

/// Row-major 2×2 complex matrix
pub type Matrix2<P> = [[Complex<P>; 2]; 2];

/// Row-major 4×4 complex matrix
pub type Matrix4<P> = [[Complex<P>; 4]; 4];

/// 2×2 identity
pub fn identity2<P: Float>() -> Matrix2<P> {
    let zero = Complex::new(P::zero(), P::zero());
    let one = Complex::new(P::one(), P::zero());
    [[one, zero], [zero, one]]
}

/// 4×4 identity
pub fn identity4<P: Float>() -> Matrix4<P> {
    let zero = Complex::new(P::zero(), P::zero());
    let one = Complex::new(P::one(), P::zero());
    let mut m = [[zero; 4]; 4];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = one;
    }
    m
}

/// Shape a flat row-major slice into a 2×2 matrix
///
/// # Errors
/// Returns [`SimulatorError::InvalidMatrix`] unless the slice has 4 elements.
pub fn matrix2_from_slice<P: Float>(m: &[Complex<P>]) -> Result<Matrix2<P>> {
    if m.len() != 4 {
        return Err(SimulatorError::InvalidMatrix {
            expected: 4,
            actual: m.len(),
        });
    }
    Ok([[m[0], m[1]], [m[2], m[3]]])
}

/// Shape a flat row-major slice into a 4×4 matrix
///
/// # Errors
/// Returns [`SimulatorError::InvalidMatrix`] unless the slice has 16 elements.
pub fn matrix4_from_slice<P: Float>(m: &[Complex<P>]) -> Result<Matrix4<P>> {
    if m.len() != 16 {
        return Err(SimulatorError::InvalidMatrix {
            expected: 16,
            actual: m.len(),
        });
    }
    let zero = Complex::new(P::zero(), P::zero());
    let mut out = [[zero; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            out[r][c] = m[4 * r + c];
        }
    }
    Ok(out)
}

/// `C = A · B` for 2×2 matrices; `B` is applied first
#[inline]
pub fn multiply_2x2<P: Float>(a: &Matrix2<P>, b: &Matrix2<P>) -> Matrix2<P> {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

/// `C = A · B` for 4×4 matrices; `B` is applied first
pub fn multiply_4x4<P: Float>(a: &Matrix4<P>, b: &Matrix4<P>) -> Matrix4<P> {
    let zero = Complex::new(P::zero(), P::zero());
    let mut out = [[zero; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            let mut acc = zero;
            for k in 0..4 {
                acc = acc + a[r][k] * b[k][c];
            }
            out[r][c] = acc;
        }
    }
    out
}

/// Lift a single-qubit matrix onto the low bit of the component index
///
/// The component index of a two-qubit group is `(x1 << 1) | x0`; this embeds
/// `U` acting on `x0` while `x1` passes through.
pub fn expand_low<P: Float>(u: &Matrix2<P>) -> Matrix4<P> {
    let zero = Complex::new(P::zero(), P::zero());
    let mut m = [[zero; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            if r >> 1 == c >> 1 {
                m[r][c] = u[r & 1][c & 1];
            }
        }
    }
    m
}

/// Lift a single-qubit matrix onto the high bit of the component index
pub fn expand_high<P: Float>(u: &Matrix2<P>) -> Matrix4<P> {
    let zero = Complex::new(P::zero(), P::zero());
    let mut m = [[zero; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            if r & 1 == c & 1 {
                m[r][c] = u[r >> 1][c >> 1];
            }
        }
    }
    m
}

/// Reindex a two-qubit matrix for swapped qubit order
///
/// A gate stored for pair `(a, b)` acts on component index
/// `(x_b << 1) | x_a`; viewing it from pair `(b, a)` swaps the two index
/// bits of both rows and columns.
pub fn swap_qubit_order<P: Float>(m: &Matrix4<P>) -> Matrix4<P> {
    #[inline]
    fn p(i: usize) -> usize {
        ((i & 1) << 1) | (i >> 1)
    }

    let zero = Complex::new(P::zero(), P::zero());
    let mut out = [[zero; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            out[r][c] = m[p(r)][p(c)];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c64(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_multiply_2x2_identity() {
        let x = [[c64(0.0, 0.0), c64(1.0, 0.0)], [c64(1.0, 0.0), c64(0.0, 0.0)]];
        let result = multiply_2x2(&identity2(), &x);
        assert_eq!(result, x);
    }

    #[test]
    fn test_x_squared_is_identity() {
        let x = [[c64(0.0, 0.0), c64(1.0, 0.0)], [c64(1.0, 0.0), c64(0.0, 0.0)]];
        let result = multiply_2x2(&x, &x);
        assert_relative_eq!(result[0][0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result[1][1].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result[0][1].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_expand_low_acts_on_bit_zero() {
        let x = [[c64(0.0, 0.0), c64(1.0, 0.0)], [c64(1.0, 0.0), c64(0.0, 0.0)]];
        let m = expand_low(&x);
        // |00⟩ -> |01⟩ and |10⟩ -> |11⟩
        assert_relative_eq!(m[1][0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[3][2].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[0][0].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_expand_high_acts_on_bit_one() {
        let x = [[c64(0.0, 0.0), c64(1.0, 0.0)], [c64(1.0, 0.0), c64(0.0, 0.0)]];
        let m = expand_high(&x);
        // |00⟩ -> |10⟩ and |01⟩ -> |11⟩
        assert_relative_eq!(m[2][0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[3][1].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_swap_qubit_order_round_trip() {
        let mut m = [[c64(0.0, 0.0); 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                m[r][c] = c64((4 * r + c) as f64, 0.0);
            }
        }

        let swapped = swap_qubit_order(&m);
        assert_eq!(swap_qubit_order(&swapped), m);
        // Row/column 1 and 2 trade places.
        assert_relative_eq!(swapped[1][1].re, m[2][2].re, epsilon = 1e-12);
        assert_relative_eq!(swapped[1][3].re, m[2][3].re, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_from_slice_checks_length() {
        let short = vec![c64(1.0, 0.0); 3];
        assert!(matrix2_from_slice(&short).is_err());
        assert!(matrix4_from_slice(&short).is_err());
    }
}
