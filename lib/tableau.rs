//! *N*-qubit Clifford operations in the Aaronson-Gottesman tableau
//! representation.
//!
//! A Clifford unitary *U* is identified, up to a global phase, by where it
//! sends the single-qubit Paulis under conjugation: the 2*N* images
//! *U* *X*<sub>*i*</sub> *U*<sup>†</sup> and *U* *Z*<sub>*i*</sub>
//! *U*<sup>†</sup>. Following Aaronson and Gottesman[^1], the images of the
//! *X*<sub>*i*</sub> are called destabilizers and stored in rows 0..*N*, while
//! the images of the *Z*<sub>*i*</sub> are the stabilizers (of *U*∣0...0⟩) and
//! stored in rows *N*..2*N*. Each row is a [`PauliString`] with its own phase.
//!
//! The generating gates of the Clifford group (Hadamard, π/2 phase, and CNOT)
//! act on each row by simple bitwise operations on a single column, so a gate
//! costs *O*(*N*) and a whole circuit *O*(*N* × gates).
//!
//! # Example
//! ```
//! use clifford_equiv::{ gate::Gate, tableau::StabilizerTableau };
//!
//! // start from the canonical basis
//! let mut tab = StabilizerTableau::new(2);
//!
//! // generate a Bell state on qubits 0, 1
//! tab.apply_gate(Gate::H(0)).apply_gate(Gate::CX(0, 1));
//!
//! // stabilizers on the left, destabilizers on the right
//! assert_eq!(format!("{:#}", tab), "+1 XX | +1 Z.\n+1 ZZ | +1 .X");
//! ```
//!
//! [^1]: [arXiv:quant-ph/0406196](https://arxiv.org/abs/quant-ph/0406196)

use std::{ fmt, str::FromStr };
use crate::{
    error::{ EquivError, Result },
    gate::Gate,
    pauli::{ Pauli, PauliString },
};

/// Description of a product state, one character per qubit.
///
/// | Character | State  |
/// |:---------:|:------:|
/// | `Z`       | ∣1⟩    |
/// | `x`       | ∣+⟩    |
/// | `X`       | ∣−⟩    |
/// | `y`       | ∣+*i*⟩ |
/// | `Y`       | ∣−*i*⟩ |
/// | other     | ∣0⟩    |
///
/// Qubits past the end of the string are left in ∣0⟩.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputState(String);

impl InputState {
    pub fn new<S>(s: S) -> Self
    where S: Into<String>
    {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Return the number of qubits explicitly described.
    pub fn len(&self) -> usize { self.0.chars().count() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Return the gates preparing this state from ∣0...0⟩ on `n` qubits.
    ///
    /// Fails if the description is longer than the register.
    pub fn preparation(&self, n: usize) -> Result<Vec<Gate>> {
        if self.len() > n {
            return Err(EquivError::InvalidInputState {
                input: self.0.clone(),
                n,
            });
        }
        let mut gates: Vec<Gate> = Vec::new();
        for (k, c) in self.0.chars().enumerate() {
            match c {
                'Z' => gates.extend([Gate::H(k), Gate::S(k), Gate::S(k), Gate::H(k)]),
                'x' => gates.push(Gate::H(k)),
                'X' => gates.extend([Gate::H(k), Gate::S(k), Gate::S(k)]),
                'y' => gates.extend([Gate::H(k), Gate::S(k)]),
                'Y' => gates.extend([Gate::H(k), Gate::S(k), Gate::S(k), Gate::S(k)]),
                _ => { },
            }
        }
        Ok(gates)
    }
}

impl From<&str> for InputState {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl FromStr for InputState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The images of the *N*-qubit Pauli basis under a Clifford operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StabilizerTableau {
    n: usize,
    // destabilizers in 0..n, stabilizers in n..2n
    rows: Vec<PauliString>,
}

impl StabilizerTableau {
    /// Create a new tableau for the identity operation, i.e. destabilizers
    /// *X*<sub>*i*</sub> and stabilizers *Z*<sub>*i*</sub>, the latter
    /// stabilizing ∣0...0⟩.
    pub fn new(n: usize) -> Self {
        let rows: Vec<PauliString>
            = (0..n).map(|i| PauliString::single(n, i, Pauli::X))
            .chain((0..n).map(|i| PauliString::single(n, i, Pauli::Z)))
            .collect();
        Self { n, rows }
    }

    /// Create a tableau whose stabilizers stabilize the given product state.
    ///
    /// Fails if the description is longer than the register.
    pub fn from_input(input: &InputState, n: usize) -> Result<Self> {
        let mut tab = Self::new(n);
        tab.apply_circuit(&input.preparation(n)?);
        Ok(tab)
    }

    /// Build a tableau from explicit rows, destabilizers first.
    ///
    /// Fails if there are not exactly 2*N* rows of *N* qubits. The rows are
    /// not otherwise checked; see [`Self::is_well_formed`].
    pub fn from_rows(n: usize, rows: Vec<PauliString>) -> Result<Self> {
        if rows.len() != 2 * n {
            return Err(EquivError::LengthMismatch {
                left: 2 * n,
                right: rows.len(),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.num_qubits() != n) {
            return Err(EquivError::LengthMismatch {
                left: n,
                right: bad.num_qubits(),
            });
        }
        Ok(Self { n, rows })
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return all rows, destabilizers first.
    pub fn rows(&self) -> &[PauliString] { &self.rows }

    pub fn destabilizers(&self) -> &[PauliString] { &self.rows[..self.n] }

    pub fn stabilizers(&self) -> &[PauliString] { &self.rows[self.n..] }

    pub fn apply_h(&mut self, k: usize) -> &mut Self {
        self.rows.iter_mut().for_each(|row| { row.conj_h(k); });
        self
    }

    pub fn apply_s(&mut self, k: usize) -> &mut Self {
        self.rows.iter_mut().for_each(|row| { row.conj_s(k); });
        self
    }

    pub fn apply_sinv(&mut self, k: usize) -> &mut Self {
        self.apply_s(k).apply_s(k).apply_s(k)
    }

    pub fn apply_x(&mut self, k: usize) -> &mut Self {
        self.apply_h(k).apply_z(k).apply_h(k)
    }

    pub fn apply_y(&mut self, k: usize) -> &mut Self {
        self.apply_x(k).apply_z(k)
    }

    pub fn apply_z(&mut self, k: usize) -> &mut Self {
        self.apply_s(k).apply_s(k)
    }

    pub fn apply_cnot(&mut self, a: usize, b: usize) -> &mut Self {
        self.rows.iter_mut().for_each(|row| { row.conj_cnot(a, b); });
        self
    }

    pub fn apply_cz(&mut self, a: usize, b: usize) -> &mut Self {
        self.apply_h(b).apply_cnot(a, b).apply_h(b)
    }

    pub fn apply_swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.apply_cnot(a, b).apply_cnot(b, a).apply_cnot(a, b)
    }

    /// Perform the action of a gate.
    ///
    /// Does nothing if any qubit indices are out of bounds or if a `CX` acts
    /// twice on the same qubit.
    pub fn apply_gate(&mut self, gate: Gate) -> &mut Self {
        match gate {
            Gate::H(k) if k < self.n => self.apply_h(k),
            Gate::S(k) if k < self.n => self.apply_s(k),
            Gate::CX(a, b) if a < self.n && b < self.n && a != b
                => self.apply_cnot(a, b),
            _ => self,
        }
    }

    /// Perform a series of gates.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> &mut Self
    where I: IntoIterator<Item = &'a Gate>
    {
        gates.into_iter().copied().for_each(|g| { self.apply_gate(g); });
        self
    }

    /// Return `true` if the rows satisfy the tableau invariants: all rows are
    /// Hermitian, the stabilizers commute pairwise, the destabilizers commute
    /// pairwise, and each destabilizer anticommutes with exactly the
    /// stabilizer of the same index.
    pub fn is_well_formed(&self) -> bool {
        let n = self.n;
        if !self.rows.iter().all(|r| r.is_hermitian() && r.num_qubits() == n) {
            return false;
        }
        for i in 0..n {
            for j in 0..n {
                if i < j {
                    if !self.rows[i].commutes_with(&self.rows[j]) { return false; }
                    if !self.rows[n + i].commutes_with(&self.rows[n + j]) { return false; }
                }
                let comm = self.rows[i].commutes_with(&self.rows[n + j]);
                if comm == (i == j) { return false; }
            }
        }
        true
    }

    /// Lift the tableau to the 2*N* stabilizer generators of the Choi state
    /// (*U* ⊗ *I*)∣Φ⟩, where ∣Φ⟩ is the maximally entangled state on 2*N*
    /// qubits.
    ///
    /// Destabilizer *i* becomes *U* *X*<sub>*i*</sub> *U*<sup>†</sup> ⊗
    /// *X*<sub>*i*</sub> and stabilizer *i* becomes *U* *Z*<sub>*i*</sub>
    /// *U*<sup>†</sup> ⊗ *Z*<sub>*i*</sub>. Two operations are equal up to
    /// global phase if and only if their Choi generators generate the same
    /// signed group.
    pub fn choi_generators(&self) -> Vec<PauliString> {
        let n = self.n;
        self.rows.iter().enumerate()
            .map(|(i, row)| {
                let partner
                    = if i < n {
                        PauliString::single(n, i, Pauli::X)
                    } else {
                        PauliString::single(n, i - n, Pauli::Z)
                    };
                row.tensor(&partner)
            })
            .collect()
    }
}

impl fmt::Display for StabilizerTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, (stab, destab)) in
            self.stabilizers().iter().zip(self.destabilizers()).enumerate()
        {
            stab.fmt(f)?;
            write!(f, " | ")?;
            destab.fmt(f)?;
            if k < self.n - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}
