//! Quantum gate records with pre-computed matrices
//!
//! A [`Gate`] is a plain data record: a kind tag, a time ordinal, the qubits
//! it acts on, a row-major matrix and an `unfusible` flag. Construction
//! helpers are provided for the standard gate set; anything else can be built
//! through [`Gate::custom1`] and [`Gate::custom2`].
//!
//! Basis-state conventions: the natural index of a basis state is the integer
//! whose bit `k` is the value of qubit `k`. For a two-qubit gate on
//! `(q0, q1)`, `q0` supplies the low-order bit of the 4-dimensional component
//! index, so the matrix row for `|q1 q0⟩ = |1 0⟩` is row 1.

use crate::error::{CircuitError, Result};
use num_complex::Complex;
use num_traits::Float;
use smallvec::{smallvec, SmallVec};
use std::f64::consts::FRAC_1_SQRT_2;

/// Tag identifying a gate for fusion and dispatch purposes
///
/// The tag never carries parameters; rotation angles are baked into the
/// matrix at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    T,
    Rx,
    Ry,
    Rz,
    CNot,
    CZ,
    Swap,
    /// User-supplied single-qubit matrix
    Custom1,
    /// User-supplied two-qubit matrix
    Custom2,
    /// Computational-basis measurement; carries no matrix
    Measurement,
}

/// A gate scheduled at a specific time step of a circuit
///
/// Gates are precision-generic over the amplitude float type. The matrix is
/// stored row-major: 4 elements for a single-qubit gate, 16 for a two-qubit
/// gate, empty for a measurement.
///
/// # Example
///
/// ```
/// use simvec_core::{Gate, GateKind};
///
/// let g: Gate<f32> = Gate::hadamard(0, 3);
/// assert_eq!(g.kind, GateKind::H);
/// assert_eq!(g.num_qubits(), 1);
/// assert_eq!(g.matrix.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Gate<P: Float> {
    /// Gate tag
    pub kind: GateKind,

    /// Time step ordinal; the fuser requires these to be non-decreasing
    pub time: u32,

    /// Qubits acted on, in gate order
    pub qubits: SmallVec<[usize; 2]>,

    /// Row-major matrix; empty for measurements
    pub matrix: Vec<Complex<P>>,

    /// An unfusible gate anchors its own fused group instead of being
    /// absorbed into a neighboring run
    pub unfusible: bool,
}

/// Narrow a f64 constant into the target precision.
fn real<P: Float>(v: f64) -> P {
    P::from(v).expect("gate constant representable in target precision")
}

fn c<P: Float>(re: f64, im: f64) -> Complex<P> {
    Complex::new(real(re), real(im))
}

impl<P: Float> Gate<P> {
    /// Number of qubits this gate acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Whether this gate is a measurement
    #[inline]
    pub fn is_measurement(&self) -> bool {
        self.kind == GateKind::Measurement
    }

    /// Mark this gate as unfusible
    pub fn with_unfusible(mut self) -> Self {
        self.unfusible = true;
        self
    }

    fn gate1(kind: GateKind, time: u32, q: usize, matrix: Vec<Complex<P>>) -> Self {
        Self {
            kind,
            time,
            qubits: smallvec![q],
            matrix,
            unfusible: false,
        }
    }

    fn gate2(kind: GateKind, time: u32, q0: usize, q1: usize, matrix: Vec<Complex<P>>) -> Self {
        Self {
            kind,
            time,
            qubits: smallvec![q0, q1],
            matrix,
            unfusible: false,
        }
    }

    /// Hadamard gate: `H|0⟩ = (|0⟩ + |1⟩)/√2`
    pub fn hadamard(time: u32, q: usize) -> Self {
        let h = FRAC_1_SQRT_2;
        Self::gate1(
            GateKind::H,
            time,
            q,
            vec![c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)],
        )
    }

    /// Pauli-X (NOT) gate
    pub fn x(time: u32, q: usize) -> Self {
        Self::gate1(
            GateKind::X,
            time,
            q,
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)],
        )
    }

    /// Pauli-Y gate
    pub fn y(time: u32, q: usize) -> Self {
        Self::gate1(
            GateKind::Y,
            time,
            q,
            vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)],
        )
    }

    /// Pauli-Z gate
    pub fn z(time: u32, q: usize) -> Self {
        Self::gate1(
            GateKind::Z,
            time,
            q,
            vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)],
        )
    }

    /// Phase gate S = diag(1, i)
    pub fn s(time: u32, q: usize) -> Self {
        Self::gate1(
            GateKind::S,
            time,
            q,
            vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0)],
        )
    }

    /// T gate = diag(1, e^{iπ/4})
    pub fn t(time: u32, q: usize) -> Self {
        Self::gate1(
            GateKind::T,
            time,
            q,
            vec![
                c(1.0, 0.0),
                c(0.0, 0.0),
                c(0.0, 0.0),
                c(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            ],
        )
    }

    /// Rotation about the X axis by `theta`
    pub fn rx(time: u32, q: usize, theta: f64) -> Self {
        let (sin, cos) = (theta / 2.0).sin_cos();
        Self::gate1(
            GateKind::Rx,
            time,
            q,
            vec![c(cos, 0.0), c(0.0, -sin), c(0.0, -sin), c(cos, 0.0)],
        )
    }

    /// Rotation about the Y axis by `theta`
    pub fn ry(time: u32, q: usize, theta: f64) -> Self {
        let (sin, cos) = (theta / 2.0).sin_cos();
        Self::gate1(
            GateKind::Ry,
            time,
            q,
            vec![c(cos, 0.0), c(-sin, 0.0), c(sin, 0.0), c(cos, 0.0)],
        )
    }

    /// Rotation about the Z axis by `theta`
    pub fn rz(time: u32, q: usize, theta: f64) -> Self {
        let (sin, cos) = (theta / 2.0).sin_cos();
        Self::gate1(
            GateKind::Rz,
            time,
            q,
            vec![c(cos, -sin), c(0.0, 0.0), c(0.0, 0.0), c(cos, sin)],
        )
    }

    /// Controlled-NOT gate; flips `target` when `control` is 1
    pub fn cnot(time: u32, control: usize, target: usize) -> Self {
        let mut m = vec![c(0.0, 0.0); 16];
        // Component index: bit 0 = control, bit 1 = target.
        m[0] = c(1.0, 0.0);
        m[1 * 4 + 3] = c(1.0, 0.0);
        m[2 * 4 + 2] = c(1.0, 0.0);
        m[3 * 4 + 1] = c(1.0, 0.0);
        Self::gate2(GateKind::CNot, time, control, target, m)
    }

    /// Controlled-Z gate; symmetric in its qubits
    pub fn cz(time: u32, q0: usize, q1: usize) -> Self {
        let mut m = vec![c(0.0, 0.0); 16];
        m[0] = c(1.0, 0.0);
        m[5] = c(1.0, 0.0);
        m[10] = c(1.0, 0.0);
        m[15] = c(-1.0, 0.0);
        Self::gate2(GateKind::CZ, time, q0, q1, m)
    }

    /// Swap gate
    pub fn swap(time: u32, q0: usize, q1: usize) -> Self {
        let mut m = vec![c(0.0, 0.0); 16];
        m[0] = c(1.0, 0.0);
        m[1 * 4 + 2] = c(1.0, 0.0);
        m[2 * 4 + 1] = c(1.0, 0.0);
        m[15] = c(1.0, 0.0);
        Self::gate2(GateKind::Swap, time, q0, q1, m)
    }

    /// Single-qubit gate with a user-supplied row-major 2×2 matrix
    ///
    /// # Errors
    /// Returns [`CircuitError::InvalidMatrixSize`] if `matrix` does not have
    /// exactly 4 elements.
    pub fn custom1(time: u32, q: usize, matrix: Vec<Complex<P>>) -> Result<Self> {
        if matrix.len() != 4 {
            return Err(CircuitError::InvalidMatrixSize {
                expected: 4,
                actual: matrix.len(),
            });
        }
        Ok(Self::gate1(GateKind::Custom1, time, q, matrix))
    }

    /// Two-qubit gate with a user-supplied row-major 4×4 matrix
    ///
    /// `q0` supplies the low-order bit of the component index.
    ///
    /// # Errors
    /// Returns [`CircuitError::InvalidMatrixSize`] if `matrix` does not have
    /// exactly 16 elements.
    pub fn custom2(time: u32, q0: usize, q1: usize, matrix: Vec<Complex<P>>) -> Result<Self> {
        if matrix.len() != 16 {
            return Err(CircuitError::InvalidMatrixSize {
                expected: 16,
                actual: matrix.len(),
            });
        }
        Ok(Self::gate2(GateKind::Custom2, time, q0, q1, matrix))
    }

    /// Computational-basis measurement of the given qubits
    pub fn measurement(time: u32, qubits: &[usize]) -> Self {
        Self {
            kind: GateKind::Measurement,
            time,
            qubits: SmallVec::from_slice(qubits),
            matrix: Vec::new(),
            unfusible: false,
        }
    }
}
