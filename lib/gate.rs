//! Gate descriptions.
//!
//! Circuits handed to the checker are sequences of [`GateRecord`]s, each a
//! [`GateKind`] applied to a list of qubit indices. Before propagation every
//! record is lowered to the three gates generating the *n*-qubit Clifford
//! group, represented by [`Gate`]. Records outside the Clifford group can be
//! described (so that they can be reported) but not propagated.
//!
//! See also: <https://en.wikipedia.org/wiki/Clifford_gates>

use std::fmt;
use rand::Rng;

/// One of the generators of the *n*-qubit Clifford group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π/2 rotation about Z
    S(usize),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
}

impl Gate {
    /// Return `true` if `self` is `H`.
    pub fn is_h(&self) -> bool { matches!(self, Self::H(..)) }

    /// Return `true` if `self` is `S`.
    pub fn is_s(&self) -> bool { matches!(self, Self::S(..)) }

    /// Return `true` if `self` is `CX`.
    pub fn is_cx(&self) -> bool { matches!(self, Self::CX(..)) }

    /// Return `true` if every qubit index is below `n` and no qubit is used
    /// twice.
    pub fn fits(&self, n: usize) -> bool {
        match *self {
            Self::H(k) | Self::S(k) => k < n,
            Self::CX(a, b) => a < n && b < n && a != b,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::H(k) => write!(f, "h {}", k),
            Self::S(k) => write!(f, "s {}", k),
            Self::CX(a, b) => write!(f, "cx {} {}", a, b),
        }
    }
}

/// The kind of a gate in an input circuit.
///
/// Rotation angles are in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GateKind {
    /// Identity
    I,
    /// Hadamard
    H,
    /// π/2 rotation about Z
    S,
    /// -π/2 rotation about Z
    Sdg,
    /// π rotation about X
    X,
    /// π rotation about Y
    Y,
    /// π rotation about Z
    Z,
    /// Controlled X; the first qubit is the control.
    CX,
    /// Controlled Z
    CZ,
    /// Swap
    Swap,
    /// π/4 rotation about Z
    T,
    /// -π/4 rotation about Z
    Tdg,
    /// Arbitrary rotation about X
    Rx(f64),
    /// Arbitrary rotation about Y
    Ry(f64),
    /// Arbitrary rotation about Z
    Rz(f64),
    /// Toffoli; the first two qubits are the controls.
    CCX,
}

impl GateKind {
    /// Return `true` if gates of this kind belong to the Clifford group.
    ///
    /// Rotations are always treated as non-Clifford, regardless of angle.
    pub fn is_clifford(&self) -> bool {
        matches!(
            self,
            Self::I | Self::H | Self::S | Self::Sdg | Self::X | Self::Y
            | Self::Z | Self::CX | Self::CZ | Self::Swap
        )
    }

    /// Return the number of qubits a gate of this kind acts on.
    pub fn arity(&self) -> usize {
        match self {
            Self::CX | Self::CZ | Self::Swap => 2,
            Self::CCX => 3,
            _ => 1,
        }
    }

    /// Return the conventional lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "id",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::CX => "cx",
            Self::CZ => "cz",
            Self::Swap => "swap",
            Self::T => "t",
            Self::Tdg => "tdg",
            Self::Rx(_) => "rx",
            Self::Ry(_) => "ry",
            Self::Rz(_) => "rz",
            Self::CCX => "ccx",
        }
    }

    /// Sample a random single-qubit Clifford kind (`H`, `S`, `Sdg`, `X`, `Y`,
    /// or `Z`).
    pub fn sample_single<R>(rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        match rng.gen_range(0..6_usize) {
            0 => Self::H,
            1 => Self::S,
            2 => Self::Sdg,
            3 => Self::X,
            4 => Self::Y,
            5 => Self::Z,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Rx(theta) | Self::Ry(theta) | Self::Rz(theta)
                => write!(f, "{}({})", self.name(), theta),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// A single gate applied to specific qubits.
///
/// No validation happens on construction; malformed records are rejected when
/// a circuit is propagated.
#[derive(Clone, Debug, PartialEq)]
pub struct GateRecord {
    pub kind: GateKind,
    pub qubits: Vec<usize>,
}

impl GateRecord {
    pub fn new<Q>(kind: GateKind, qubits: Q) -> Self
    where Q: Into<Vec<usize>>
    {
        Self { kind, qubits: qubits.into() }
    }
}

impl fmt::Display for GateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        self.qubits.iter().try_for_each(|q| write!(f, " {}", q))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ rngs::StdRng, SeedableRng };

    #[test]
    fn clifford_kinds() {
        let clifford = [
            GateKind::I, GateKind::H, GateKind::S, GateKind::Sdg, GateKind::X,
            GateKind::Y, GateKind::Z, GateKind::CX, GateKind::CZ, GateKind::Swap,
        ];
        assert!(clifford.iter().all(|k| k.is_clifford()));
        let non_clifford = [
            GateKind::T, GateKind::Tdg, GateKind::Rx(0.5), GateKind::Ry(1.0),
            GateKind::Rz(std::f64::consts::FRAC_PI_2), GateKind::CCX,
        ];
        assert!(non_clifford.iter().all(|k| !k.is_clifford()));
    }

    #[test]
    fn arities() {
        assert_eq!(GateKind::H.arity(), 1);
        assert_eq!(GateKind::Rz(0.1).arity(), 1);
        assert_eq!(GateKind::Swap.arity(), 2);
        assert_eq!(GateKind::CCX.arity(), 3);
    }

    #[test]
    fn display() {
        assert_eq!(GateRecord::new(GateKind::CX, [0, 3]).to_string(), "cx 0 3");
        assert_eq!(GateRecord::new(GateKind::Rz(0.25), [1]).to_string(), "rz(0.25) 1");
        assert_eq!(Gate::CX(2, 1).to_string(), "cx 2 1");
    }

    #[test]
    fn generators_fit_registers() {
        assert!(Gate::H(2).fits(3));
        assert!(!Gate::S(3).fits(3));
        assert!(Gate::CX(0, 2).fits(3));
        assert!(!Gate::CX(1, 1).fits(3));
        assert!(!Gate::CX(0, 4).fits(3));
    }

    #[test]
    fn sampled_kinds_are_single_qubit_cliffords() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..200 {
            let kind = GateKind::sample_single(&mut rng);
            assert!(kind.is_clifford());
            assert_eq!(kind.arity(), 1);
        }
    }
}
