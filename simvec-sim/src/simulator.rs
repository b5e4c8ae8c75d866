//! Gate application over the blocked state layout
//!
//! [`Simulator`] applies 2×2 and 4×4 matrices to the state in place, touching
//! only the amplitude pairs (or quads) whose natural indices differ in the
//! gate's qubit bits. Sweeps run through the same executor abstraction as
//! the state kernel, so a simulator sharing the kernel's worker pool applies
//! gates with the kernel's parallelism.
//!
//! Results are independent of the executor choice up to floating-point
//! reassociation in the expectation-value reductions.

use crate::error::{Result, SimulatorError};
use crate::matrix::{Matrix2, Matrix4};
use num_complex::{Complex, Complex64};
use simvec_state::{raw_len, Executor, Precision, SendPtr, State};

/// Natural index with bit `b` inserted as zero
#[inline]
fn insert_zero_bit(i: u64, b: usize) -> u64 {
    ((i >> b) << (b + 1)) | (i & ((1u64 << b) - 1))
}

#[inline]
fn to_c64<P: Precision>(c: Complex<P>) -> Complex64 {
    Complex64::new(c.re.as_f64(), c.im.as_f64())
}

/// Matrix application engine for one- and two-qubit gates
///
/// # Example
///
/// ```
/// use simvec_state::{SequentialExecutor, StateSpace};
/// use simvec_sim::{matrix::Matrix2, Simulator};
/// use num_complex::Complex;
///
/// let space: StateSpace<f32, _> = StateSpace::sequential(1);
/// let mut state = space.create_state().unwrap();
/// space.set_state_zero(&mut state).unwrap();
///
/// let simulator = Simulator::new(1, SequentialExecutor::new());
/// let x: Matrix2<f32> = [
///     [Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)],
///     [Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)],
/// ];
/// simulator.apply_gate1(&x, 0, &mut state).unwrap();
/// assert_eq!(state.get_ampl(1), Complex::new(1.0, 0.0));
/// ```
pub struct Simulator<P: Precision, E: Executor> {
    num_qubits: usize,
    raw_len: usize,
    executor: E,
    _precision: std::marker::PhantomData<P>,
}

impl<P: Precision, E: Executor> Simulator<P, E> {
    /// Engine for `num_qubits` qubits over an explicit executor
    pub fn new(num_qubits: usize, executor: E) -> Self {
        Self {
            num_qubits,
            raw_len: raw_len::<P>(num_qubits),
            executor,
            _precision: std::marker::PhantomData,
        }
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    fn size(&self) -> u64 {
        1u64 << self.num_qubits
    }

    fn check_state(&self, state: &State<P>) -> Result<()> {
        if state.len() != self.raw_len {
            return Err(SimulatorError::SizeMismatch {
                expected: self.raw_len,
                actual: state.len(),
            });
        }
        Ok(())
    }

    fn check_qubit(&self, q: usize) -> Result<()> {
        if q >= self.num_qubits {
            return Err(SimulatorError::InvalidQubitIndex {
                index: q,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply a 2×2 matrix to qubit `q` in place
    ///
    /// Touches only pairs of amplitudes whose natural indices differ in bit
    /// `q`.
    pub fn apply_gate1(&self, matrix: &Matrix2<P>, q: usize, state: &mut State<P>) -> Result<()> {
        self.check_state(state)?;
        self.check_qubit(q)?;

        let m = *matrix;
        let w = P::LANES;
        let mask = 1u64 << q;
        let ptr = SendPtr::new(state.as_mut_ptr());

        self.executor.run(self.size() / 2, move |i| {
            let i0 = insert_zero_bit(i, q);
            let i1 = i0 | mask;
            let k0 = State::<P>::real_offset(i0);
            let k1 = State::<P>::real_offset(i1);

            unsafe {
                let p = ptr.get();
                let a0 = Complex::new(*p.add(k0), *p.add(k0 + w));
                let a1 = Complex::new(*p.add(k1), *p.add(k1 + w));

                let b0 = m[0][0] * a0 + m[0][1] * a1;
                let b1 = m[1][0] * a0 + m[1][1] * a1;

                *p.add(k0) = b0.re;
                *p.add(k0 + w) = b0.im;
                *p.add(k1) = b1.re;
                *p.add(k1 + w) = b1.im;
            }
        });

        Ok(())
    }

    /// Apply a 4×4 matrix to qubits `(q0, q1)` in place
    ///
    /// `q0` supplies the low-order bit of the 4-dimensional component index,
    /// matching the gate matrix convention of the core data model.
    pub fn apply_gate2(
        &self,
        matrix: &Matrix4<P>,
        q0: usize,
        q1: usize,
        state: &mut State<P>,
    ) -> Result<()> {
        self.check_state(state)?;
        self.check_qubit(q0)?;
        self.check_qubit(q1)?;
        if q0 == q1 {
            return Err(SimulatorError::InvalidQubitIndex {
                index: q0,
                num_qubits: self.num_qubits,
            });
        }

        let m = *matrix;
        let w = P::LANES;
        let lo = q0.min(q1);
        let hi = q0.max(q1);
        let m0 = 1u64 << q0;
        let m1 = 1u64 << q1;
        let ptr = SendPtr::new(state.as_mut_ptr());

        self.executor.run(self.size() / 4, move |i| {
            let base = insert_zero_bit(insert_zero_bit(i, lo), hi);
            let idx = [base, base | m0, base | m1, base | m0 | m1];

            unsafe {
                let p = ptr.get();
                let mut v = [Complex::new(P::zero(), P::zero()); 4];
                let mut offs = [0usize; 4];
                for c in 0..4 {
                    let k = State::<P>::real_offset(idx[c]);
                    offs[c] = k;
                    v[c] = Complex::new(*p.add(k), *p.add(k + w));
                }

                for r in 0..4 {
                    let b = m[r][0] * v[0] + m[r][1] * v[1] + m[r][2] * v[2] + m[r][3] * v[3];
                    *p.add(offs[r]) = b.re;
                    *p.add(offs[r] + w) = b.im;
                }
            }
        });

        Ok(())
    }

    /// `⟨s| U |s⟩` for a 2×2 matrix on qubit `q`, without mutating the state
    pub fn expectation_value1(
        &self,
        matrix: &Matrix2<P>,
        q: usize,
        state: &State<P>,
    ) -> Result<Complex64> {
        self.check_state(state)?;
        self.check_qubit(q)?;

        let m = *matrix;
        let w = P::LANES;
        let mask = 1u64 << q;
        let s = state.as_slice();

        Ok(self.executor.run_reduce(
            self.size() / 2,
            Complex64::new(0.0, 0.0),
            move |i| {
                let i0 = insert_zero_bit(i, q);
                let i1 = i0 | mask;
                let k0 = State::<P>::real_offset(i0);
                let k1 = State::<P>::real_offset(i1);

                let a0 = Complex::new(s[k0], s[k0 + w]);
                let a1 = Complex::new(s[k1], s[k1 + w]);

                let b0 = m[0][0] * a0 + m[0][1] * a1;
                let b1 = m[1][0] * a0 + m[1][1] * a1;

                to_c64(a0.conj() * b0 + a1.conj() * b1)
            },
            |a, b| a + b,
        ))
    }

    /// `⟨s| U |s⟩` for a 4×4 matrix on `(q0, q1)`, without mutating the state
    pub fn expectation_value2(
        &self,
        matrix: &Matrix4<P>,
        q0: usize,
        q1: usize,
        state: &State<P>,
    ) -> Result<Complex64> {
        self.check_state(state)?;
        self.check_qubit(q0)?;
        self.check_qubit(q1)?;
        if q0 == q1 {
            return Err(SimulatorError::InvalidQubitIndex {
                index: q0,
                num_qubits: self.num_qubits,
            });
        }

        let m = *matrix;
        let w = P::LANES;
        let lo = q0.min(q1);
        let hi = q0.max(q1);
        let m0 = 1u64 << q0;
        let m1 = 1u64 << q1;
        let s = state.as_slice();

        Ok(self.executor.run_reduce(
            self.size() / 4,
            Complex64::new(0.0, 0.0),
            move |i| {
                let base = insert_zero_bit(insert_zero_bit(i, lo), hi);
                let idx = [base, base | m0, base | m1, base | m0 | m1];

                let mut v = [Complex::new(P::zero(), P::zero()); 4];
                for c in 0..4 {
                    let k = State::<P>::real_offset(idx[c]);
                    v[c] = Complex::new(s[k], s[k + w]);
                }

                let mut e = Complex::new(P::zero(), P::zero());
                for r in 0..4 {
                    let b = m[r][0] * v[0] + m[r][1] * v[1] + m[r][2] * v[2] + m[r][3] * v[3];
                    e = e + v[r].conj() * b;
                }
                to_c64(e)
            },
            |a, b| a + b,
        ))
    }
}
