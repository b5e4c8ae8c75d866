//! State-space kernel: bulk operations over the blocked amplitude buffer
//!
//! [`StateSpace`] owns the layout parameters and an executor; every bulk
//! sweep over the state runs through the executor so the same code serves
//! the single-threaded and worker-pool builds. Reductions accumulate at
//! `f64` regardless of the storage precision.
//!
//! Each operation first checks that the handle's raw length matches the
//! configured layout and fails with [`StateError::SizeMismatch`] otherwise;
//! that check is a debugging guard for callers mixing kernels of different
//! qubit counts, not a normal-operation code path.

use crate::error::{Result, StateError};
use crate::executor::{AnyExecutor, Executor, ParallelExecutor, SendPtr, SequentialExecutor};
use crate::measurement::MeasurementResult;
use crate::precision::Precision;
use crate::state::{raw_len, State};
use num_complex::{Complex, Complex64};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// State-space kernel over `num_qubits` qubits at precision `P`
///
/// # Example
///
/// ```
/// use simvec_state::{SequentialExecutor, StateSpace};
///
/// let space: StateSpace<f32, _> = StateSpace::new(2, SequentialExecutor::new());
/// let mut state = space.create_state().unwrap();
/// space.set_state_uniform(&mut state).unwrap();
///
/// let ip = space.inner_product(&state, &state).unwrap();
/// assert!((ip.re - 1.0).abs() < 1e-6);
/// ```
pub struct StateSpace<P: Precision, E: Executor> {
    num_qubits: usize,
    raw_len: usize,
    executor: E,
    _precision: std::marker::PhantomData<P>,
}

impl<P: Precision> StateSpace<P, SequentialExecutor> {
    /// Single-threaded kernel
    pub fn sequential(num_qubits: usize) -> Self {
        Self::new(num_qubits, SequentialExecutor::new())
    }
}

impl<P: Precision> StateSpace<P, ParallelExecutor> {
    /// Worker-pool kernel with a fixed thread count
    ///
    /// # Errors
    /// Returns [`StateError::ThreadPool`] if the pool cannot be built.
    pub fn parallel(num_qubits: usize, num_threads: usize) -> Result<Self> {
        Ok(Self::new(num_qubits, ParallelExecutor::new(num_threads)?))
    }
}

impl<P: Precision> StateSpace<P, AnyExecutor> {
    /// Kernel with the executor selected from a configured thread count
    ///
    /// # Errors
    /// Returns [`StateError::ThreadPool`] if the pool cannot be built.
    pub fn with_threads(num_qubits: usize, num_threads: usize) -> Result<Self> {
        Ok(Self::new(num_qubits, AnyExecutor::from_threads(num_threads)?))
    }
}

impl<P: Precision, E: Executor> StateSpace<P, E> {
    /// Kernel over an explicit executor
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

    /// Number of basis states, `2^N`
    #[inline]
    pub fn size(&self) -> u64 {
        1u64 << self.num_qubits
    }

    /// Raw float length every state handle must have
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// The executor bulk loops are dispatched through
    #[inline]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    #[inline]
    fn num_blocks(&self) -> u64 {
        (self.raw_len / (2 * P::LANES)) as u64
    }

    fn check(&self, state: &State<P>) -> Result<()> {
        if state.len() != self.raw_len {
            return Err(StateError::SizeMismatch {
                expected: self.raw_len,
                actual: state.len(),
            });
        }
        Ok(())
    }

    /// Allocate a zeroed state buffer matching this kernel's layout
    ///
    /// # Errors
    /// Returns [`StateError::Allocation`] if the buffer cannot be allocated.
    pub fn create_state(&self) -> Result<State<P>> {
        State::new(self.num_qubits)
    }

    /// Write zero to every raw slot
    pub fn set_all_zeros(&self, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| unsafe {
            let p = ptr.get().add(2 * w * b as usize);
            for j in 0..2 * w {
                *p.add(j) = P::zero();
            }
        });

        Ok(())
    }

    /// Prepare `|0...0⟩`
    pub fn set_state_zero(&self, state: &mut State<P>) -> Result<()> {
        self.set_all_zeros(state)?;
        state.set_ampl(0, Complex::new(P::one(), P::zero()));
        Ok(())
    }

    /// Prepare the uniform superposition, amplitude `1/√(2^N)` everywhere
    ///
    /// Padding lanes of sub-block states stay zero.
    pub fn set_state_uniform(&self, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let size = self.size();
        let v = P::from_f64(1.0 / (size as f64).sqrt());

        if (size as usize) < w {
            self.set_all_zeros(state)?;
            for i in 0..size {
                state.set_ampl(i, Complex::new(v, P::zero()));
            }
            return Ok(());
        }

        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| unsafe {
            let p = ptr.get().add(2 * w * b as usize);
            for j in 0..w {
                *p.add(j) = v;
                *p.add(w + j) = P::zero();
            }
        });

        Ok(())
    }

    /// Elementwise `dest += src`
    pub fn add_state(&self, src: &State<P>, dest: &mut State<P>) -> Result<()> {
        self.check(src)?;
        self.check(dest)?;

        let w = P::LANES;
        let src_slice = src.as_slice();
        let dst = SendPtr::new(dest.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| {
            let off = 2 * w * b as usize;
            let src_re = &src_slice[off..off + w];
            let src_im = &src_slice[off + w..off + 2 * w];
            unsafe {
                let dst_re = std::slice::from_raw_parts_mut(dst.get().add(off), w);
                let dst_im = std::slice::from_raw_parts_mut(dst.get().add(off + w), w);
                P::block_add(src_re, src_im, dst_re, dst_im);
            }
        });

        Ok(())
    }

    /// Elementwise real scalar multiply `state *= a`
    pub fn multiply(&self, a: P, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| {
            let off = 2 * w * b as usize;
            unsafe {
                let re = std::slice::from_raw_parts_mut(ptr.get().add(off), w);
                let im = std::slice::from_raw_parts_mut(ptr.get().add(off + w), w);
                P::block_scale(a, re, im);
            }
        });

        Ok(())
    }

    /// `Σ conj(a1)·a2`, accumulated at f64
    pub fn inner_product(&self, s1: &State<P>, s2: &State<P>) -> Result<Complex64> {
        self.check(s1)?;
        self.check(s2)?;

        let w = P::LANES;
        let p1 = s1.as_slice();
        let p2 = s2.as_slice();
        let ip = self.executor.run_reduce(
            self.num_blocks(),
            Complex64::new(0.0, 0.0),
            move |b| {
                let off = 2 * w * b as usize;
                P::block_inner(
                    &p1[off..off + w],
                    &p1[off + w..off + 2 * w],
                    &p2[off..off + w],
                    &p2[off + w..off + 2 * w],
                )
            },
            |a, b| a + b,
        );

        Ok(ip)
    }

    /// Real part of the inner product
    pub fn real_inner_product(&self, s1: &State<P>, s2: &State<P>) -> Result<f64> {
        Ok(self.inner_product(s1, s2)?.re)
    }

    /// Total `Σ |a|²`
    pub fn norm(&self, state: &State<P>) -> Result<f64> {
        self.check(state)?;

        let w = P::LANES;
        let p = state.as_slice();
        Ok(self.executor.run_reduce(
            self.num_blocks(),
            0.0f64,
            move |b| {
                let off = 2 * w * b as usize;
                P::block_norm_sqr(&p[off..off + w], &p[off + w..off + 2 * w])
            },
            |a, b| a + b,
        ))
    }

    /// One `Σ |a|²` partial per executor partition, in partition order
    pub fn partial_norms(&self, state: &State<P>) -> Result<Vec<f64>> {
        self.check(state)?;

        let w = P::LANES;
        let p = state.as_slice();
        Ok(self.executor.run_reduce_partitioned(
            self.num_blocks(),
            0.0f64,
            move |b| {
                let off = 2 * w * b as usize;
                P::block_norm_sqr(&p[off..off + w], &p[off + w..off + 2 * w])
            },
            |a, b| a + b,
        ))
    }

    /// Draw `num_samples` basis states with probability `|a|²`
    ///
    /// The total norm is swept up in natural index order and used as-is
    /// (it may differ from 1 by floating-point error). The thresholds are
    /// sorted, so one further sweep emits all samples; ties and numerical
    /// boundaries favor the earlier basis state.
    pub fn sample(&self, state: &State<P>, num_samples: usize, seed: u64) -> Result<Vec<u64>> {
        self.check(state)?;

        if num_samples == 0 {
            return Ok(Vec::new());
        }

        let w = P::LANES;
        let s = state.as_slice();
        let blocks = self.num_blocks() as usize;

        let mut norm = 0.0f64;
        for k in 0..blocks {
            for j in 0..w {
                let re = s[2 * w * k + j].as_f64();
                let im = s[2 * w * k + w + j].as_f64();
                norm += re * re + im * im;
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut thresholds: Vec<f64> = (0..num_samples).map(|_| rng.gen::<f64>() * norm).collect();
        thresholds.sort_by(|a, b| a.total_cmp(b));

        let mut bitstrings = Vec::with_capacity(num_samples);
        let mut m = 0;
        let mut csum = 0.0f64;
        for k in 0..blocks {
            for j in 0..w {
                let re = s[2 * w * k + j].as_f64();
                let im = s[2 * w * k + w + j].as_f64();
                csum += re * re + im * im;
                while m < num_samples && thresholds[m] < csum {
                    bitstrings.push((w * k + j) as u64);
                    m += 1;
                }
            }
        }

        Ok(bitstrings)
    }

    /// Project onto a measurement outcome and renormalize the survivors
    ///
    /// Amplitudes whose natural index does not satisfy
    /// `(i & mask) == bits` are zeroed; the rest are scaled by
    /// `1/√norm` of the surviving probability.
    ///
    /// # Errors
    /// Returns [`StateError::ZeroProbability`] when no probability survives.
    pub fn collapse_state(&self, mr: &MeasurementResult, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let mask = mr.mask;
        let bits = mr.bits;

        let norm = {
            let s = state.as_slice();
            self.executor.run_reduce(
                self.num_blocks(),
                0.0f64,
                move |k| {
                    let mut sum = 0.0f64;
                    for j in 0..w {
                        let idx = w as u64 * k + j as u64;
                        if idx & mask == bits {
                            let re = s[2 * w * k as usize + j].as_f64();
                            let im = s[2 * w * k as usize + w + j].as_f64();
                            sum += re * re + im * im;
                        }
                    }
                    sum
                },
                |a, b| a + b,
            )
        };

        if norm == 0.0 {
            return Err(StateError::ZeroProbability { mask, bits });
        }

        let renorm = P::from_f64(1.0 / norm.sqrt());
        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |k| unsafe {
            let p = ptr.get().add(2 * w * k as usize);
            for j in 0..w {
                let idx = w as u64 * k + j as u64;
                if idx & mask == bits {
                    *p.add(j) = *p.add(j) * renorm;
                    *p.add(w + j) = *p.add(w + j) * renorm;
                } else {
                    *p.add(j) = P::zero();
                    *p.add(w + j) = P::zero();
                }
            }
        });

        Ok(())
    }

    /// Scan partition `m` for the basis state where the running probability
    /// sum first exceeds `r`
    ///
    /// Returns the crossing index masked by `mask`, or `None` when `r`
    /// exceeds the partition's total. Used together with
    /// [`StateSpace::partial_norms`] to draw a measurement outcome without a
    /// full-state sweep per worker.
    pub fn find_measured_bits(
        &self,
        m: usize,
        r: f64,
        mask: u64,
        state: &State<P>,
    ) -> Result<Option<u64>> {
        self.check(state)?;

        let w = P::LANES;
        let s = state.as_slice();
        let (k0, k1) = self.executor.partition_bounds(self.num_blocks(), m);

        let mut csum = 0.0f64;
        for k in k0..k1 {
            for j in 0..w {
                let re = s[2 * w * k as usize + j].as_f64();
                let im = s[2 * w * k as usize + w + j].as_f64();
                csum += re * re + im * im;
                if r < csum {
                    return Ok(Some((w as u64 * k + j as u64) & mask));
                }
            }
        }

        Ok(None)
    }

    /// Measure `qubits` in the computational basis and collapse the state
    ///
    /// `r` is a uniform draw from `[0, 1)` supplied by the caller so that
    /// outcomes are reproducible from a seeded generator.
    ///
    /// # Errors
    /// Returns [`StateError::InvalidQubitIndex`] for an out-of-range qubit
    /// and [`StateError::MeasurementFailed`] when no basis state crosses the
    /// drawn threshold.
    pub fn measure(
        &self,
        qubits: &[usize],
        r: f64,
        state: &mut State<P>,
    ) -> Result<MeasurementResult> {
        for &q in qubits {
            if q >= self.num_qubits {
                return Err(StateError::InvalidQubitIndex {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
        }

        let mask = qubits.iter().fold(0u64, |m, &q| m | (1u64 << q));

        let partials = self.partial_norms(state)?;
        let total: f64 = partials.iter().sum();

        let mut rscaled = r * total;
        let mut m = 0;
        while m + 1 < partials.len() && rscaled >= partials[m] {
            rscaled -= partials[m];
            m += 1;
        }

        let bits = self
            .find_measured_bits(m, rscaled, mask, state)?
            .ok_or(StateError::MeasurementFailed)?;

        let result = MeasurementResult { mask, bits };
        self.collapse_state(&result, state)?;
        Ok(result)
    }

    /// Convert the blocked layout to `[re0, im0, re1, im1, ...]` in place
    ///
    /// For states smaller than one block this is a fixed reshuffle with
    /// padding zeroed; otherwise each block transposes independently through
    /// the executor.
    pub fn internal_to_normal_order(&self, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let size = self.size() as usize;

        if size < w {
            let s = state.as_mut_slice();
            let mut re = [P::zero(); 8];
            let mut im = [P::zero(); 8];
            for i in 0..size {
                re[i] = s[i];
                im[i] = s[w + i];
            }
            for v in s.iter_mut() {
                *v = P::zero();
            }
            for i in 0..size {
                s[2 * i] = re[i];
                s[2 * i + 1] = im[i];
            }
            return Ok(());
        }

        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| unsafe {
            let p = ptr.get().add(2 * w * b as usize);
            let mut re = [P::zero(); 8];
            let mut im = [P::zero(); 8];
            for j in 0..w {
                re[j] = *p.add(j);
                im[j] = *p.add(w + j);
            }
            for j in 0..w {
                *p.add(2 * j) = re[j];
                *p.add(2 * j + 1) = im[j];
            }
        });

        Ok(())
    }

    /// Convert `[re0, im0, re1, im1, ...]` back to the blocked layout in place
    pub fn normal_to_internal_order(&self, state: &mut State<P>) -> Result<()> {
        self.check(state)?;

        let w = P::LANES;
        let size = self.size() as usize;

        if size < w {
            let s = state.as_mut_slice();
            let mut re = [P::zero(); 8];
            let mut im = [P::zero(); 8];
            for i in 0..size {
                re[i] = s[2 * i];
                im[i] = s[2 * i + 1];
            }
            for v in s.iter_mut() {
                *v = P::zero();
            }
            for i in 0..size {
                s[i] = re[i];
                s[w + i] = im[i];
            }
            return Ok(());
        }

        let ptr = SendPtr::new(state.as_mut_ptr());
        self.executor.run(self.num_blocks(), move |b| unsafe {
            let p = ptr.get().add(2 * w * b as usize);
            let mut re = [P::zero(); 8];
            let mut im = [P::zero(); 8];
            for j in 0..w {
                re[j] = *p.add(2 * j);
                im[j] = *p.add(2 * j + 1);
            }
            for j in 0..w {
                *p.add(j) = re[j];
                *p.add(w + j) = im[j];
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_state_zero() {
        let space: StateSpace<f32, _> = StateSpace::sequential(3);
        let mut state = space.create_state().unwrap();
        space.set_state_zero(&mut state).unwrap();

        assert_eq!(state.get_ampl(0), Complex::new(1.0, 0.0));
        for i in 1..8 {
            assert_eq!(state.get_ampl(i), Complex::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let space: StateSpace<f32, _> = StateSpace::sequential(5);
        let mut small: State<f32> = State::new(2).unwrap();

        assert!(matches!(
            space.set_state_zero(&mut small),
            Err(StateError::SizeMismatch { .. })
        ));
        assert!(matches!(
            space.norm(&small),
            Err(StateError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_multiply_by_zero_clears_state() {
        let space: StateSpace<f64, _> = StateSpace::sequential(3);
        let mut state = space.create_state().unwrap();
        space.set_state_uniform(&mut state).unwrap();
        space.multiply(0.0, &mut state).unwrap();

        for i in 0..8 {
            assert_eq!(state.get_ampl(i), Complex::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_add_state_identity() {
        let space: StateSpace<f32, _> = StateSpace::sequential(4);
        let mut state = space.create_state().unwrap();
        space.set_state_uniform(&mut state).unwrap();

        let mut zeros = space.create_state().unwrap();
        space.set_all_zeros(&mut zeros).unwrap();
        space.add_state(&zeros, &mut state).unwrap();

        let quarter = 0.25f32;
        for i in 0..16 {
            assert_relative_eq!(state.get_ampl(i).re, quarter, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_partial_norms_sum_to_norm() {
        let space: StateSpace<f32, _> = StateSpace::parallel(6, 3).unwrap();
        let mut state = space.create_state().unwrap();
        space.set_state_uniform(&mut state).unwrap();

        let partials = space.partial_norms(&state).unwrap();
        assert_eq!(partials.len(), 3);
        assert_relative_eq!(partials.iter().sum::<f64>(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sample_zero_state_is_all_zero_index() {
        let space: StateSpace<f32, _> = StateSpace::sequential(4);
        let mut state = space.create_state().unwrap();
        space.set_state_zero(&mut state).unwrap();

        let samples = space.sample(&state, 10, 7).unwrap();
        assert_eq!(samples.len(), 10);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_measure_zero_state() {
        let space: StateSpace<f32, _> = StateSpace::sequential(3);
        let mut state = space.create_state().unwrap();
        space.set_state_zero(&mut state).unwrap();

        let mr = space.measure(&[0, 1, 2], 0.5, &mut state).unwrap();
        assert_eq!(mr.mask, 0b111);
        assert_eq!(mr.bits, 0);
        assert_relative_eq!(space.norm(&state).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_collapse_zero_probability_fails() {
        let space: StateSpace<f32, _> = StateSpace::sequential(2);
        let mut state = space.create_state().unwrap();
        space.set_state_zero(&mut state).unwrap();

        // |00⟩ has no support on qubit 0 being 1.
        let mr = MeasurementResult { mask: 1, bits: 1 };
        assert!(matches!(
            space.collapse_state(&mr, &mut state),
            Err(StateError::ZeroProbability { .. })
        ));
    }
}
