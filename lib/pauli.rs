//! *N*-qubit Pauli operators in the binary symplectic representation.
//!
//! A Pauli string is stored as two bit vectors, one marking the qubits carrying
//! an *X* component and one marking the qubits carrying a *Z* component, plus
//! an overall phase that is a power of *i*. A qubit with both bits set carries
//! a *Y*, which is treated as a primitive symbol here (i.e. a string with
//! phase +1 and all symbols drawn from {*I*, *X*, *Y*, *Z*} is Hermitian).
//! Keeping the full phase in ℤ<sub>4</sub> rather than a single sign bit makes
//! multiplication closed and associative even for anticommuting operands.
//!
//! Like the tableau rows in [`tableau`][crate::tableau], the bit vectors are
//! packed into `u32`s.

use std::{
    fmt,
    ops::{ Add, AddAssign, Mul, Neg, Sub, SubAssign },
    str::FromStr,
};
use crate::error::{ EquivError, Result };

pub(crate) const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// A complex phase factor limited to integer powers of *i*.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// +1
    #[default]
    Pi0,
    /// +*i*
    Pi1h,
    /// -1
    Pi,
    /// -*i*
    Pi3h,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pi0 => write!(f, "+1"),
            Self::Pi1h => write!(f, "+i"),
            Self::Pi => write!(f, "-1"),
            Self::Pi3h => write!(f, "-i"),
        }
    }
}

impl Phase {
    /// Convert to the bare power of *i*.
    pub fn to_int(self) -> u8 {
        match self {
            Self::Pi0  => 0,
            Self::Pi1h => 1,
            Self::Pi   => 2,
            Self::Pi3h => 3,
        }
    }

    /// Convert from a bare power of *i* (modulo 4).
    pub fn from_int(i: i64) -> Self {
        match i.rem_euclid(4) {
            0 => Self::Pi0,
            1 => Self::Pi1h,
            2 => Self::Pi,
            3 => Self::Pi3h,
            _ => unreachable!(),
        }
    }

    /// Return `true` if `self` is ±1.
    pub fn is_real(self) -> bool { matches!(self, Self::Pi0 | Self::Pi) }

    /// Complex conjugate.
    pub fn conj(self) -> Self { Self::from_int(-i64::from(self.to_int())) }
}

/// Multiplication by -1.
impl Neg for Phase {
    type Output = Self;

    fn neg(self) -> Self::Output { Self::from_int(i64::from(self.to_int()) + 2) }
}

// phases compose by adding exponents
macro_rules! impl_phase_math {
    (
        $trait:ident,
        $trait_fn:ident,
        $trait_assign:ident,
        $trait_assign_fn:ident,
        $op:tt
    ) => {
        impl $trait for Phase {
            type Output = Self;

            fn $trait_fn(self, rhs: Self) -> Self::Output {
                Self::from_int(i64::from(self.to_int()) $op i64::from(rhs.to_int()))
            }
        }

        impl $trait_assign for Phase {
            fn $trait_assign_fn(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    }
}
impl_phase_math!(Add, add, AddAssign, add_assign, +);
impl_phase_math!(Sub, sub, SubAssign, sub_assign, -);

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Return `true` if `self` and `other` commute.
    pub fn commutes_with(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::I) => true,
            (Self::I, _) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }

    /// Build from an (*x*, *z*) bit pair.
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Self::I,
            (true,  false) => Self::X,
            (true,  true ) => Self::Y,
            (false, true ) => Self::Z,
        }
    }

    /// Return the (*x*, *z*) bit pair.
    pub fn to_bits(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true,  false),
            Self::Y => (true,  true ),
            Self::Z => (false, true ),
        }
    }

    pub(crate) fn from_int(u: usize) -> Self {
        match u % 4 {
            0 => Self::I,
            1 => Self::X,
            2 => Self::Y,
            3 => Self::Z,
            _ => unreachable!(),
        }
    }
}

/// A single `n`-qubit Pauli operator with a phase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PauliString {
    n: usize,
    // bits are packed into u32s; size floor(n / 32) + 1 each
    x: Vec<u32>,
    z: Vec<u32>,
    phase: Phase,
}

impl PauliString {
    /// Create the `n`-qubit identity with phase +1.
    pub fn identity(n: usize) -> Self {
        let over32: usize = (n >> 5) + 1;
        Self { n, x: vec![0; over32], z: vec![0; over32], phase: Phase::Pi0 }
    }

    /// Create an `n`-qubit string acting as `p` on qubit `k` and as the
    /// identity elsewhere.
    pub fn single(n: usize, k: usize, p: Pauli) -> Self {
        let mut s = Self::identity(n);
        s.set(k, p);
        s
    }

    /// Collect a sequence of single-qubit operators into a string.
    pub fn from_paulis<I>(phase: Phase, ops: I) -> Self
    where I: IntoIterator<Item = Pauli>
    {
        let ops: Vec<Pauli> = ops.into_iter().collect();
        let mut s = Self::identity(ops.len());
        s.phase = phase;
        ops.into_iter().enumerate().for_each(|(k, p)| { s.set(k, p); });
        s
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn set_phase(&mut self, phase: Phase) { self.phase = phase; }

    /// Return the operator on the `k`-th qubit, or the identity if `k` is out
    /// of bounds.
    pub fn get(&self, k: usize) -> Pauli {
        if k >= self.n { return Pauli::I; }
        Pauli::from_bits(self.x_bit(k), self.z_bit(k))
    }

    /// Set the operator on the `k`-th qubit.
    ///
    /// Does nothing if `k` is out of bounds.
    pub fn set(&mut self, k: usize, p: Pauli) {
        if k >= self.n { return; }
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        let (x, z) = p.to_bits();
        if x { self.x[k5] |= pw; } else { self.x[k5] &= !pw; }
        if z { self.z[k5] |= pw; } else { self.z[k5] &= !pw; }
    }

    /// Iterate over the single-qubit operators.
    pub fn iter(&self) -> impl Iterator<Item = Pauli> + '_ {
        (0..self.n).map(|k| self.get(k))
    }

    /// Return the number of non-identity operators.
    pub fn weight(&self) -> usize {
        self.x.iter().zip(&self.z)
            .map(|(x, z)| (x | z).count_ones() as usize)
            .sum()
    }

    /// Return the number of *Y* operators.
    pub fn y_count(&self) -> usize {
        self.x.iter().zip(&self.z)
            .map(|(x, z)| (x & z).count_ones() as usize)
            .sum()
    }

    /// Return `true` if the phase is ±1, i.e. the operator is Hermitian.
    pub fn is_hermitian(&self) -> bool { self.phase.is_real() }

    /// Return `true` if the phase is -1.
    pub fn is_negative(&self) -> bool { self.phase == Phase::Pi }

    /// Return the phase φ such that `self` = *i*<sup>φ</sup>
    /// *X*<sup>**x**</sup>*Z*<sup>**z**</sup>, with all *X*s ordered before
    /// all *Z*s.
    pub fn xz_phase(&self) -> Phase {
        self.phase + Phase::from_int(self.y_count() as i64)
    }

    /// Return `true` if `self` and `other` commute.
    ///
    /// This is the parity of the symplectic inner product; qubits beyond the
    /// end of the shorter operand are treated as identities.
    pub fn commutes_with(&self, other: &Self) -> bool {
        let anti: u32
            = self.x.iter().zip(&self.z)
            .zip(other.x.iter().zip(&other.z))
            .map(|((xa, za), (xb, zb))| ((xa & zb) ^ (za & xb)).count_ones())
            .sum();
        anti % 2 == 0
    }

    /// Compute the product `self · rhs`.
    ///
    /// Fails if the two operands act on different numbers of qubits.
    pub fn multiply(&self, rhs: &Self) -> Result<Self> {
        let mut out = self.clone();
        out.mul_assign_checked(rhs)?;
        Ok(out)
    }

    /// Right-multiply `self` by `rhs` in place.
    ///
    /// Fails if the two operands act on different numbers of qubits.
    pub fn mul_assign_checked(&mut self, rhs: &Self) -> Result<()> {
        if self.n != rhs.n {
            return Err(EquivError::LengthMismatch { left: self.n, right: rhs.n });
        }
        // pass through the X^x Z^z form: reordering Z^za X^xb costs a sign per
        // overlapping bit, then convert back to Hermitian Ys
        let mut e: i64
            = i64::from(self.phase.to_int()) + i64::from(rhs.phase.to_int());
        for ((xa, za), (xb, zb)) in
            self.x.iter_mut().zip(self.z.iter_mut())
                .zip(rhs.x.iter().zip(&rhs.z))
        {
            e += i64::from((*xa & *za).count_ones());
            e += i64::from((xb & zb).count_ones());
            e += 2 * i64::from((*za & xb).count_ones());
            *xa ^= xb;
            *za ^= zb;
            e -= i64::from((*xa & *za).count_ones());
        }
        self.phase = Phase::from_int(e);
        Ok(())
    }

    /// Return the tensor product `self ⊗ rhs`, with the qubits of `rhs`
    /// following those of `self`.
    pub fn tensor(&self, rhs: &Self) -> Self {
        let mut out = Self::identity(self.n + rhs.n);
        out.x[..self.x.len()].copy_from_slice(&self.x);
        out.z[..self.z.len()].copy_from_slice(&self.z);
        for k in 0..rhs.n {
            out.set(self.n + k, rhs.get(k));
        }
        out.phase = self.phase + rhs.phase;
        out
    }

    pub(crate) fn x_bit(&self, k: usize) -> bool {
        self.x[k >> 5] & PW[k & 31] != 0
    }

    pub(crate) fn z_bit(&self, k: usize) -> bool {
        self.z[k >> 5] & PW[k & 31] != 0
    }

    // parity of |z_self ∧ x_other|
    pub(crate) fn zx_parity(&self, other: &Self) -> bool {
        let n: u32
            = self.z.iter().zip(&other.x)
            .map(|(z, x)| (z & x).count_ones())
            .sum();
        n % 2 == 1
    }

    fn flip_sign(&mut self) { self.phase = -self.phase; }

    // conjugation by H on qubit k
    pub(crate) fn conj_h(&mut self, k: usize) {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        let tmp: u32 = self.x[k5];
        self.x[k5] ^= (self.x[k5] ^ self.z[k5]) & pw;
        self.z[k5] ^= (self.z[k5] ^ tmp) & pw;
        if self.x[k5] & pw != 0 && self.z[k5] & pw != 0 { self.flip_sign(); }
    }

    // conjugation by S on qubit k
    pub(crate) fn conj_s(&mut self, k: usize) {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        if self.x[k5] & pw != 0 && self.z[k5] & pw != 0 { self.flip_sign(); }
        self.z[k5] ^= self.x[k5] & pw;
    }

    // conjugation by CNOT with control c and target t
    pub(crate) fn conj_cnot(&mut self, c: usize, t: usize) {
        let (c5, t5): (usize, usize) = (c >> 5, t >> 5);
        let (pwc, pwt): (u32, u32) = (PW[c & 31], PW[t & 31]);
        let xc: bool = self.x[c5] & pwc != 0;
        let zt: bool = self.z[t5] & pwt != 0;
        let xt: bool = self.x[t5] & pwt != 0;
        let zc: bool = self.z[c5] & pwc != 0;
        if xc && zt && xt == zc { self.flip_sign(); }
        if xc { self.x[t5] ^= pwt; }
        if zt { self.z[c5] ^= pwc; }
    }
}

/// *Panics if the operands act on different numbers of qubits; see
/// [`PauliString::multiply`] for a fallible version.*
impl Mul for &PauliString {
    type Output = PauliString;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(rhs).unwrap_or_else(|e| panic!("PauliString::mul: {e}"))
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.phase.fmt(f)?;
        write!(f, " ")?;
        self.iter().try_for_each(|p| p.fmt(f))
    }
}

/// Parses strings like `"XYZ"`, `"-ZZ"`, `"+i X.Z"` or `"-1 XIX"`, i.e. an
/// optional sign, an optional *i*, an optional `1`, and then one of `I`, `.`,
/// `X`, `Y`, or `Z` per qubit.
impl FromStr for PauliString {
    type Err = EquivError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (neg, rest)
            = match trimmed.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
            };
        let (imag, rest)
            = match rest.strip_prefix('i') {
                Some(rest) => (true, rest),
                None => (false, rest),
            };
        let rest = rest.strip_prefix('1').unwrap_or(rest).trim_start();
        let ops: Vec<Pauli>
            = rest.chars()
            .map(|c| match c {
                'I' | '.' => Ok(Pauli::I),
                'X' => Ok(Pauli::X),
                'Y' => Ok(Pauli::Y),
                'Z' => Ok(Pauli::Z),
                _ => Err(EquivError::InvalidPauli(s.to_string())),
            })
            .collect::<Result<_>>()?;
        let phase = Phase::from_int(2 * i64::from(neg) + i64::from(imag));
        Ok(Self::from_paulis(phase, ops))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn ps(s: &str) -> PauliString { s.parse().unwrap() }

    #[test]
    fn single_qubit_table() {
        assert_eq!(&ps("X") * &ps("Y"), ps("+i Z"));
        assert_eq!(&ps("Y") * &ps("X"), ps("-i Z"));
        assert_eq!(&ps("Y") * &ps("Z"), ps("+i X"));
        assert_eq!(&ps("Z") * &ps("Y"), ps("-i X"));
        assert_eq!(&ps("Z") * &ps("X"), ps("+i Y"));
        assert_eq!(&ps("X") * &ps("Z"), ps("-i Y"));
        for p in ["X", "Y", "Z", "I"] {
            assert_eq!(&ps(p) * &ps(p), ps("I"));
            assert_eq!(&ps("I") * &ps(p), ps(p));
        }
    }

    #[test]
    fn multi_qubit_products() {
        // (XX)(ZZ) = (XZ)(XZ) = (-iY)(-iY) = -YY
        assert_eq!(&ps("XX") * &ps("ZZ"), ps("-YY"));
        assert_eq!(&ps("-XZ") * &ps("ZX"), ps("-YY"));
        assert_eq!(&ps("+i XI") * &ps("+i XI"), ps("-II"));
    }

    #[test]
    fn length_mismatch() {
        let err = ps("XX").multiply(&ps("XXX")).unwrap_err();
        assert!(matches!(
            err, EquivError::LengthMismatch { left: 2, right: 3 }));
    }

    #[test]
    fn wide_strings() {
        // cross the u32 word boundary
        let mut a = PauliString::identity(70);
        let mut b = PauliString::identity(70);
        a.set(33, Pauli::X);
        a.set(69, Pauli::Z);
        b.set(33, Pauli::Z);
        b.set(69, Pauli::Z);
        assert!(!a.commutes_with(&b));
        let c = &a * &b;
        assert_eq!(c.get(33), Pauli::Y);
        assert_eq!(c.get(69), Pauli::I);
        assert_eq!(c.phase(), Phase::Pi3h);
        assert_eq!(c.weight(), 1);
    }

    #[test]
    fn tensor_product() {
        let t = ps("-XY").tensor(&ps("+i Z"));
        assert_eq!(t, ps("-i XYZ"));
        let wide = PauliString::single(40, 39, Pauli::Y).tensor(&ps("X"));
        assert_eq!(wide.num_qubits(), 41);
        assert_eq!(wide.get(39), Pauli::Y);
        assert_eq!(wide.get(40), Pauli::X);
    }

    #[test]
    fn parse_and_display() {
        let p = ps("-1 X.YZ");
        assert_eq!(p.to_string(), "-1 XIYZ");
        assert_eq!(format!("{:#}", p), "-1 X.YZ");
        assert_eq!(ps("+i Z").phase(), Phase::Pi1h);
        assert!(matches!(
            "XQ".parse::<PauliString>(), Err(EquivError::InvalidPauli(_))));
    }

    #[test]
    fn xz_phase_counts_ys() {
        assert_eq!(ps("YY").xz_phase(), Phase::Pi);
        assert_eq!(ps("-Y").xz_phase(), Phase::Pi3h);
        assert_eq!(ps("XZ").xz_phase(), Phase::Pi0);
    }

    fn build(phase: u8, ops: &[u8]) -> PauliString {
        PauliString::from_paulis(
            Phase::from_int(i64::from(phase)),
            ops.iter().map(|&u| Pauli::from_int(u as usize)),
        )
    }

    fn pauli_triple()
        -> impl Strategy<Value = (PauliString, PauliString, PauliString)>
    {
        (1_usize..70)
            .prop_flat_map(|n| {
                (
                    (0_u8..4, prop::collection::vec(0_u8..4, n)),
                    (0_u8..4, prop::collection::vec(0_u8..4, n)),
                    (0_u8..4, prop::collection::vec(0_u8..4, n)),
                )
            })
            .prop_map(|((pa, a), (pb, b), (pc, c))| {
                (build(pa, &a), build(pb, &b), build(pc, &c))
            })
    }

    proptest! {
        #[test]
        fn commutation_is_symmetric((a, b, _) in pauli_triple()) {
            prop_assert_eq!(a.commutes_with(&b), b.commutes_with(&a));
        }

        #[test]
        fn commutation_matches_qubitwise_count((a, b, _) in pauli_triple()) {
            let anti
                = a.iter().zip(b.iter())
                .filter(|(pa, pb)| !pa.commutes_with(*pb))
                .count();
            prop_assert_eq!(a.commutes_with(&b), anti % 2 == 0);
        }

        #[test]
        fn multiplication_is_associative((a, b, c) in pauli_triple()) {
            prop_assert_eq!(&(&a * &b) * &c, &a * &(&b * &c));
        }

        #[test]
        fn commuting_products_agree((a, b, _) in pauli_triple()) {
            let ab = &a * &b;
            let ba = &b * &a;
            if a.commutes_with(&b) {
                prop_assert_eq!(ab, ba);
            } else {
                prop_assert_eq!(ab.phase(), -ba.phase());
            }
        }
    }
}
