//! Integration tests for the state-space kernel over both executors and
//! both precisions

use approx::assert_relative_eq;
use num_complex::Complex;
use simvec_state::{
    Executor, MeasurementResult, Precision, SequentialExecutor, State, StateSpace,
};

fn norm_from_ampls<P: Precision, E: Executor>(space: &StateSpace<P, E>, state: &State<P>) -> f64 {
    (0..space.size())
        .map(|i| {
            let a = state.get_ampl(i);
            a.re.as_f64() * a.re.as_f64() + a.im.as_f64() * a.im.as_f64()
        })
        .sum()
}

#[test]
fn zero_state_single_qubit() {
    let space: StateSpace<f32, _> = StateSpace::sequential(1);
    let mut state = space.create_state().unwrap();
    space.set_state_zero(&mut state).unwrap();

    assert_eq!(state.get_ampl(0), Complex::new(1.0, 0.0));
    assert_eq!(state.get_ampl(1), Complex::new(0.0, 0.0));
}

#[test]
fn uniform_state_two_qubits() {
    let space: StateSpace<f32, _> = StateSpace::sequential(2);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    for i in 0..4 {
        let a = state.get_ampl(i);
        assert_relative_eq!(a.re, 0.5, epsilon = 1e-6);
        assert_relative_eq!(a.im, 0.0, epsilon = 1e-6);
    }

    let ip = space.inner_product(&state, &state).unwrap();
    assert_relative_eq!(ip.re, 1.0, epsilon = 1e-6);
    assert_relative_eq!(ip.im, 0.0, epsilon = 1e-6);
}

#[test]
fn uniform_state_has_unit_norm_for_all_sizes() {
    for n in 1..=6 {
        let space: StateSpace<f32, _> = StateSpace::sequential(n);
        let mut state = space.create_state().unwrap();
        space.set_state_uniform(&mut state).unwrap();

        assert_relative_eq!(space.norm(&state).unwrap(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(norm_from_ampls(&space, &state), 1.0, epsilon = 1e-5);

        let expected = 1.0 / (1u64 << n) as f64;
        let a = state.get_ampl((1u64 << n) - 1);
        assert_relative_eq!(
            a.re.as_f64() * a.re.as_f64(),
            expected,
            epsilon = 1e-6
        );
    }
}

#[test]
fn collapse_on_lowest_qubit_three_qubits() {
    let space: StateSpace<f32, _> = StateSpace::sequential(3);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    let mr = MeasurementResult {
        mask: 0b001,
        bits: 0b001,
    };
    space.collapse_state(&mr, &mut state).unwrap();

    let half = 0.5f32; // 1/sqrt(4)
    for i in 0..8u64 {
        let a = state.get_ampl(i);
        if i & 1 == 1 {
            assert_relative_eq!(a.re, half, epsilon = 1e-6);
            assert_relative_eq!(a.im, 0.0, epsilon = 1e-6);
        } else {
            assert_eq!(a, Complex::new(0.0, 0.0));
        }
    }
    assert_relative_eq!(space.norm(&state).unwrap(), 1.0, epsilon = 1e-5);
}

#[test]
fn order_conversion_round_trip() {
    fn round_trip<P: Precision>(n: usize) {
        let space: StateSpace<P, _> = StateSpace::sequential(n);
        let mut state = space.create_state().unwrap();

        for i in 0..space.size() {
            state.set_ampl(
                i,
                Complex::new(
                    P::from_f64(0.25 + i as f64),
                    P::from_f64(-(i as f64) - 0.5),
                ),
            );
        }
        let before: Vec<_> = (0..space.size()).map(|i| state.get_ampl(i)).collect();

        space.internal_to_normal_order(&mut state).unwrap();
        space.normal_to_internal_order(&mut state).unwrap();

        for i in 0..space.size() {
            assert_eq!(state.get_ampl(i), before[i as usize]);
        }
    }

    // Below, at and above one block for both lane widths.
    for n in 1..=5 {
        round_trip::<f32>(n);
        round_trip::<f64>(n);
    }
}

#[test]
fn normal_order_is_interleaved() {
    let space: StateSpace<f32, _> = StateSpace::sequential(4);
    let mut state = space.create_state().unwrap();
    for i in 0..16u64 {
        state.set_ampl(i, Complex::new(i as f32, 100.0 + i as f32));
    }

    space.internal_to_normal_order(&mut state).unwrap();

    let s = state.as_slice();
    for i in 0..16usize {
        assert_eq!(s[2 * i], i as f32);
        assert_eq!(s[2 * i + 1], 100.0 + i as f32);
    }
}

#[test]
fn small_state_normal_order_zeroes_padding() {
    let space: StateSpace<f32, _> = StateSpace::sequential(1);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    space.internal_to_normal_order(&mut state).unwrap();

    let h = std::f64::consts::FRAC_1_SQRT_2 as f32;
    let s = state.as_slice();
    assert_relative_eq!(s[0], h, epsilon = 1e-6);
    assert_relative_eq!(s[2], h, epsilon = 1e-6);
    assert_eq!(s[1], 0.0);
    assert_eq!(s[3], 0.0);
    assert!(s[4..].iter().all(|&v| v == 0.0));
}

#[test]
fn inner_product_is_conjugate_symmetric() {
    let space: StateSpace<f64, _> = StateSpace::sequential(3);
    let mut s1 = space.create_state().unwrap();
    let mut s2 = space.create_state().unwrap();

    for i in 0..8u64 {
        s1.set_ampl(i, Complex::new(0.1 * i as f64, 0.05 * (7 - i) as f64));
        s2.set_ampl(i, Complex::new(0.2 - 0.01 * i as f64, 0.03 * i as f64));
    }

    let ip12 = space.inner_product(&s1, &s2).unwrap();
    let ip21 = space.inner_product(&s2, &s1).unwrap();
    assert_relative_eq!(ip12.re, ip21.re, epsilon = 1e-12);
    assert_relative_eq!(ip12.im, -ip21.im, epsilon = 1e-12);
}

#[test]
fn inner_product_self_matches_amplitude_sum() {
    let space: StateSpace<f32, _> = StateSpace::sequential(5);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    let z = norm_from_ampls(&space, &state);
    let ip = space.inner_product(&state, &state).unwrap();
    assert!((ip.re - z).abs() <= (1e-6 * z).max(1e-6));
    assert_relative_eq!(ip.im, 0.0, epsilon = 1e-6);
}

#[test]
fn multiply_one_is_identity() {
    let space: StateSpace<f32, _> = StateSpace::sequential(4);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();
    let before: Vec<_> = (0..16).map(|i| state.get_ampl(i)).collect();

    space.multiply(1.0, &mut state).unwrap();

    for i in 0..16u64 {
        assert_eq!(state.get_ampl(i), before[i as usize]);
    }
}

#[test]
fn parallel_matches_sequential_kernel() {
    let seq: StateSpace<f32, _> = StateSpace::sequential(6);
    let par: StateSpace<f32, _> = StateSpace::parallel(6, 4).unwrap();

    let mut s_seq = seq.create_state().unwrap();
    let mut s_par = par.create_state().unwrap();
    seq.set_state_uniform(&mut s_seq).unwrap();
    par.set_state_uniform(&mut s_par).unwrap();

    for i in 0..64u64 {
        assert_eq!(s_seq.get_ampl(i), s_par.get_ampl(i));
    }

    let mr = MeasurementResult { mask: 0b11, bits: 0b10 };
    seq.collapse_state(&mr, &mut s_seq).unwrap();
    par.collapse_state(&mr, &mut s_par).unwrap();

    for i in 0..64u64 {
        let a = s_seq.get_ampl(i);
        let b = s_par.get_ampl(i);
        assert_relative_eq!(a.re, b.re, epsilon = 1e-5);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-5);
    }
}

#[test]
fn sample_respects_collapsed_support() {
    let space: StateSpace<f32, _> = StateSpace::sequential(4);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    let mr = MeasurementResult { mask: 0b1, bits: 0b1 };
    space.collapse_state(&mr, &mut state).unwrap();

    let samples = space.sample(&state, 200, 123).unwrap();
    assert_eq!(samples.len(), 200);
    assert!(samples.iter().all(|&s| s & 1 == 1 && s < 16));

    // Same seed, same draw.
    let again = space.sample(&state, 200, 123).unwrap();
    assert_eq!(samples, again);
}

#[test]
fn find_measured_bits_with_partial_norms() {
    let space: StateSpace<f32, _> = StateSpace::parallel(5, 4).unwrap();
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    let partials = space.partial_norms(&state).unwrap();
    assert_eq!(partials.len(), 4);

    // Walk into the third partition and locate the crossing index there.
    let r = 0.5 * partials[2];
    let bits = space
        .find_measured_bits(2, r, u64::MAX, &state)
        .unwrap()
        .expect("threshold lies inside the partition");

    let blocks = (space.raw_len() / 16) as u64;
    let (k0, k1) = space.executor().partition_bounds(blocks, 2);
    assert!(bits >= 8 * k0 && bits < 8 * k1);

    // A threshold beyond the partition's sum reports no crossing.
    let none = space
        .find_measured_bits(2, partials[2] + 1.0, u64::MAX, &state)
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn measure_superposed_qubit_collapses_consistently() {
    // (|00⟩ + |01⟩)/√2 measured on qubit 0: both draws leave unit norm and a
    // one-hot state consistent with the reported outcome.
    for (r, expected_bit) in [(0.1, 0u64), (0.9, 1u64)] {
        let space: StateSpace<f64, _> = StateSpace::sequential(2);
        let mut state = space.create_state().unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        state.set_ampl(0, Complex::new(h, 0.0));
        state.set_ampl(1, Complex::new(h, 0.0));

        let mr = space.measure(&[0], r, &mut state).unwrap();
        assert_eq!(mr.mask, 1);
        assert_eq!(mr.bits, expected_bit);
        assert_relative_eq!(space.norm(&state).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(
            state.get_ampl(expected_bit).re,
            1.0,
            epsilon = 1e-10
        );
    }
}

#[test]
fn kernel_works_with_shared_executor() {
    use std::sync::Arc;

    let executor = Arc::new(SequentialExecutor::new());
    let space: StateSpace<f32, _> = StateSpace::new(3, executor.clone());
    let other: StateSpace<f32, _> = StateSpace::new(3, executor);

    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();
    assert_relative_eq!(other.norm(&state).unwrap(), 1.0, epsilon = 1e-5);
}
