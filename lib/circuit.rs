//! Input circuit descriptions.
//!
//! A [`Circuit`] is a qubit count plus an ordered list of [`GateRecord`]s.
//! Records are appended with the builder methods, which chain:
//! ```
//! use clifford_equiv::circuit::Circuit;
//!
//! let mut bell = Circuit::new(2);
//! bell.h(0).cx(0, 1);
//! assert_eq!(bell.len(), 2);
//! assert_eq!(bell.depth(), 2);
//! ```

use rand::Rng;
use crate::gate::{ Gate, GateKind, GateRecord };

/// An ordered sequence of gates on a fixed register of qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    n: usize,
    gates: Vec<GateRecord>,
}

impl IntoIterator for Circuit {
    type Item = GateRecord;
    type IntoIter = <Vec<GateRecord> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.into_iter() }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a GateRecord;
    type IntoIter = <&'a Vec<GateRecord> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.iter() }
}

impl Circuit {
    /// Create a new, empty circuit on `n` qubits.
    pub fn new(n: usize) -> Self { Self { n, gates: Vec::new() } }

    /// Create a circuit from a series of records.
    ///
    /// Records are not checked here; see
    /// [`CircuitPropagator::propagate`][crate::propagate::CircuitPropagator::propagate].
    pub fn from_records<I>(n: usize, records: I) -> Self
    where I: IntoIterator<Item = GateRecord>
    {
        Self { n, gates: records.into_iter().collect() }
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    pub fn len(&self) -> usize { self.gates.len() }

    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    pub fn gates(&self) -> &[GateRecord] { &self.gates }

    pub fn iter(&self) -> std::slice::Iter<'_, GateRecord> { self.gates.iter() }

    /// Append a record.
    pub fn push(&mut self, kind: GateKind, qubits: &[usize]) -> &mut Self {
        self.gates.push(GateRecord::new(kind, qubits));
        self
    }

    /// Append all records of `other`.
    pub fn extend_from(&mut self, other: &Self) -> &mut Self {
        self.gates.extend(other.gates.iter().cloned());
        self
    }

    pub fn i(&mut self, k: usize) -> &mut Self { self.push(GateKind::I, &[k]) }

    pub fn h(&mut self, k: usize) -> &mut Self { self.push(GateKind::H, &[k]) }

    pub fn s(&mut self, k: usize) -> &mut Self { self.push(GateKind::S, &[k]) }

    pub fn sdg(&mut self, k: usize) -> &mut Self { self.push(GateKind::Sdg, &[k]) }

    pub fn x(&mut self, k: usize) -> &mut Self { self.push(GateKind::X, &[k]) }

    pub fn y(&mut self, k: usize) -> &mut Self { self.push(GateKind::Y, &[k]) }

    pub fn z(&mut self, k: usize) -> &mut Self { self.push(GateKind::Z, &[k]) }

    pub fn t(&mut self, k: usize) -> &mut Self { self.push(GateKind::T, &[k]) }

    pub fn tdg(&mut self, k: usize) -> &mut Self { self.push(GateKind::Tdg, &[k]) }

    pub fn rx(&mut self, theta: f64, k: usize) -> &mut Self {
        self.push(GateKind::Rx(theta), &[k])
    }

    pub fn ry(&mut self, theta: f64, k: usize) -> &mut Self {
        self.push(GateKind::Ry(theta), &[k])
    }

    pub fn rz(&mut self, theta: f64, k: usize) -> &mut Self {
        self.push(GateKind::Rz(theta), &[k])
    }

    /// The first qubit index is the control.
    pub fn cx(&mut self, a: usize, b: usize) -> &mut Self {
        self.push(GateKind::CX, &[a, b])
    }

    pub fn cz(&mut self, a: usize, b: usize) -> &mut Self {
        self.push(GateKind::CZ, &[a, b])
    }

    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.push(GateKind::Swap, &[a, b])
    }

    pub fn ccx(&mut self, a: usize, b: usize, c: usize) -> &mut Self {
        self.push(GateKind::CCX, &[a, b, c])
    }

    /// Return the number of layers of the circuit when every gate is placed
    /// as early as the gates before it on the same qubits allow.
    ///
    /// Qubit indices outside the register are ignored.
    pub fn depth(&self) -> usize {
        let mut level: Vec<usize> = vec![0; self.n];
        let mut depth: usize = 0;
        for rec in self.gates.iter() {
            let d: usize
                = rec.qubits.iter()
                .filter(|q| **q < self.n)
                .map(|q| level[*q])
                .max()
                .map(|l| l + 1)
                .unwrap_or(0);
            rec.qubits.iter()
                .filter(|q| **q < self.n)
                .for_each(|q| { level[*q] = d; });
            depth = depth.max(d);
        }
        depth
    }

    /// Generate a random Clifford circuit of `layers` layers.
    ///
    /// Each layer applies a random single-qubit Clifford (see
    /// [`GateKind::sample_single`]) to every qubit, followed by CNOTs on
    /// adjacent pairs of qubits, alternating between left and right
    /// neighbors on each layer.
    pub fn random_clifford<R>(n: usize, layers: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let mut circuit = Self::new(n);
        for d in 0..layers {
            (0..n).for_each(|k| {
                circuit.push(GateKind::sample_single(rng), &[k]);
            });
            CNots::new(d % 2 == 1, n)
                .for_each(|cx| {
                    if let Gate::CX(a, b) = cx {
                        // randomize the direction
                        if rng.gen::<bool>() { circuit.cx(a, b); }
                        else { circuit.cx(b, a); }
                    }
                });
        }
        circuit
    }
}

struct CNots {
    iter: std::ops::Range<usize>
}

impl CNots {
    fn new(offs: bool, stop: usize) -> Self {
        Self { iter: if offs { 1 } else { 0 } .. stop }
    }
}

impl Iterator for CNots {
    type Item = Gate;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
            .zip(self.iter.next())
            .map(|(a, b)| Gate::CX(a, b))
    }
}
