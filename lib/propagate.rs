//! Propagation of the Pauli basis through an input circuit.
//!
//! Every [`GateRecord`] is first checked and lowered to a short sequence of
//! Clifford generators:
//!
//! | Record       | Generators                       |
//! |:-------------|:---------------------------------|
//! | `I`          | (none)                           |
//! | `Sdg`        | *S* *S* *S*                      |
//! | `Z`          | *S* *S*                          |
//! | `X`          | *H* *S* *S* *H*                  |
//! | `Y`          | *H* *S* *S* *H* *S* *S*          |
//! | `CZ(a, b)`   | *H*(b) CX(a, b) *H*(b)           |
//! | `Swap(a, b)` | CX(a, b) CX(b, a) CX(a, b)       |
//!
//! and the generators are then applied to every row of a tableau. Global
//! phases are lost along the way, which is harmless since equivalence is only
//! decided up to a global phase.

use tracing::{ debug, trace };
use crate::{
    circuit::Circuit,
    error::{ EquivError, Result },
    gate::{ Gate, GateKind, GateRecord },
    tableau::StabilizerTableau,
};

/// Drives tableaux through circuits.
#[derive(Copy, Clone, Debug, Default)]
pub struct CircuitPropagator;

impl CircuitPropagator {
    pub fn new() -> Self { Self }

    /// Apply a single generator to every row of `tableau`.
    ///
    /// Fails if the generator does not fit the tableau's register; the
    /// tableau is left untouched in that case.
    pub fn apply(&self, tableau: &mut StabilizerTableau, gate: Gate)
        -> Result<()>
    {
        let n = tableau.num_qubits();
        if !gate.fits(n) {
            return Err(EquivError::InvalidGenerator { gate, n });
        }
        tableau.apply_gate(gate);
        Ok(())
    }

    /// Check a record against an `n`-qubit register and push its lowering
    /// onto `buf`.
    ///
    /// `position` is the index of the record in its circuit and is only used
    /// for error reporting.
    pub fn lower_into(
        &self,
        record: &GateRecord,
        position: usize,
        n: usize,
        buf: &mut Vec<Gate>,
    ) -> Result<()>
    {
        let kind = record.kind;
        if !kind.is_clifford() {
            return Err(EquivError::UnsupportedGate { position, kind });
        }
        let qubits: &[usize] = &record.qubits;
        if qubits.len() != kind.arity() {
            return Err(EquivError::InvalidGate {
                position,
                reason: format!(
                    "{} expects {} qubit(s) but got {}",
                    kind, kind.arity(), qubits.len(),
                ),
            });
        }
        if let Some(q) = qubits.iter().find(|q| **q >= n) {
            return Err(EquivError::InvalidGate {
                position,
                reason: format!(
                    "qubit index {} out of range for {} qubit(s)", q, n),
            });
        }
        if qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(EquivError::InvalidGate {
                position,
                reason: format!("repeated qubit index {}", qubits[0]),
            });
        }

        match (kind, qubits) {
            (GateKind::I, _) => { },
            (GateKind::H, &[k]) => { buf.push(Gate::H(k)); },
            (GateKind::S, &[k]) => { buf.push(Gate::S(k)); },
            (GateKind::Sdg, &[k]) => {
                buf.extend([Gate::S(k), Gate::S(k), Gate::S(k)]);
            },
            (GateKind::Z, &[k]) => { buf.extend([Gate::S(k), Gate::S(k)]); },
            (GateKind::X, &[k]) => {
                buf.extend([Gate::H(k), Gate::S(k), Gate::S(k), Gate::H(k)]);
            },
            (GateKind::Y, &[k]) => {
                buf.extend([Gate::H(k), Gate::S(k), Gate::S(k), Gate::H(k)]);
                buf.extend([Gate::S(k), Gate::S(k)]);
            },
            (GateKind::CX, &[a, b]) => { buf.push(Gate::CX(a, b)); },
            (GateKind::CZ, &[a, b]) => {
                buf.extend([Gate::H(b), Gate::CX(a, b), Gate::H(b)]);
            },
            (GateKind::Swap, &[a, b]) => {
                buf.extend([Gate::CX(a, b), Gate::CX(b, a), Gate::CX(a, b)]);
            },
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Propagate the canonical basis through `circuit`.
    ///
    /// Errors carry the position of the offending record.
    pub fn propagate(&self, circuit: &Circuit) -> Result<StabilizerTableau> {
        self.propagate_from(circuit, StabilizerTableau::new(circuit.num_qubits()))
    }

    /// Propagate an explicit starting tableau through `circuit`.
    pub fn propagate_from(&self, circuit: &Circuit, mut tableau: StabilizerTableau)
        -> Result<StabilizerTableau>
    {
        let n = circuit.num_qubits();
        if tableau.num_qubits() != n {
            return Err(EquivError::QubitCountMismatch {
                a: n,
                b: tableau.num_qubits(),
            });
        }
        let mut buf: Vec<Gate> = Vec::new();
        let mut applied: usize = 0;
        for (position, record) in circuit.iter().enumerate() {
            self.lower_into(record, position, n, &mut buf)?;
            trace!(position, record = %record, generators = buf.len(), "lowered gate");
            for g in buf.drain(..) {
                self.apply(&mut tableau, g)?;
                applied += 1;
            }
        }
        debug!(qubits = n, gates = circuit.len(), generators = applied, "propagated circuit");
        Ok(tableau)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pauli::PauliString;

    fn ps(s: &str) -> PauliString { s.parse().unwrap() }

    fn propagate(c: &Circuit) -> StabilizerTableau {
        CircuitPropagator::new().propagate(c).unwrap()
    }

    #[test]
    fn lowering_lengths() {
        let prop = CircuitPropagator::new();
        let mut buf: Vec<Gate> = Vec::new();
        let cases = [
            (GateKind::I, vec![0], 0),
            (GateKind::H, vec![0], 1),
            (GateKind::Sdg, vec![1], 3),
            (GateKind::Y, vec![1], 6),
            (GateKind::CZ, vec![0, 1], 3),
            (GateKind::Swap, vec![1, 0], 3),
        ];
        for (kind, qubits, len) in cases {
            prop.lower_into(&GateRecord::new(kind, qubits), 0, 2, &mut buf)
                .unwrap();
            assert_eq!(buf.len(), len);
            buf.clear();
        }
    }

    #[test]
    fn single_qubit_paulis() {
        let mut c = Circuit::new(1);
        c.x(0);
        let tab = propagate(&c);
        assert_eq!(tab.destabilizers()[0], ps("X"));
        assert_eq!(tab.stabilizers()[0], ps("-Z"));

        let mut c = Circuit::new(1);
        c.y(0);
        let tab = propagate(&c);
        assert_eq!(tab.destabilizers()[0], ps("-X"));
        assert_eq!(tab.stabilizers()[0], ps("-Z"));

        let mut c = Circuit::new(1);
        c.z(0);
        let tab = propagate(&c);
        assert_eq!(tab.destabilizers()[0], ps("-X"));
        assert_eq!(tab.stabilizers()[0], ps("Z"));
    }

    #[test]
    fn phase_inverse() {
        let mut c = Circuit::new(1);
        c.sdg(0);
        let tab = propagate(&c);
        assert_eq!(tab.destabilizers()[0], ps("-Y"));

        c.s(0);
        assert_eq!(propagate(&c), StabilizerTableau::new(1));
    }

    #[test]
    fn two_qubit_gates() {
        let mut a = Circuit::new(2);
        a.cz(0, 1);
        let mut b = Circuit::new(2);
        b.cz(1, 0);
        assert_eq!(propagate(&a), propagate(&b));
        assert_eq!(propagate(&a).destabilizers()[0], ps("XZ"));

        let mut c = Circuit::new(2);
        c.swap(0, 1);
        let tab = propagate(&c);
        assert_eq!(tab.destabilizers(), &[ps(".X"), ps("X.")]);
        assert_eq!(tab.stabilizers(), &[ps(".Z"), ps("Z.")]);
    }

    #[test]
    fn errors_carry_positions() {
        let prop = CircuitPropagator::new();

        let mut c = Circuit::new(2);
        c.h(0).cx(0, 1).t(1);
        let err = prop.propagate(&c).unwrap_err();
        assert!(matches!(
            err, EquivError::UnsupportedGate { position: 2, kind: GateKind::T }));

        let mut c = Circuit::new(2);
        c.h(0).rz(0.3, 1);
        assert!(matches!(
            prop.propagate(&c).unwrap_err(),
            EquivError::UnsupportedGate { position: 1, kind: GateKind::Rz(_) },
        ));

        let mut c = Circuit::new(2);
        c.h(2);
        assert!(matches!(
            prop.propagate(&c).unwrap_err(),
            EquivError::InvalidGate { position: 0, .. },
        ));

        let mut c = Circuit::new(2);
        c.h(0).cx(1, 1);
        assert!(matches!(
            prop.propagate(&c).unwrap_err(),
            EquivError::InvalidGate { position: 1, .. },
        ));

        let mut c = Circuit::new(3);
        c.push(GateKind::CX, &[0]);
        assert!(matches!(
            prop.propagate(&c).unwrap_err(),
            EquivError::InvalidGate { position: 0, .. },
        ));
    }

    #[test]
    fn generators_must_fit() {
        let prop = CircuitPropagator::new();
        let mut tab = StabilizerTableau::new(2);
        prop.apply(&mut tab, Gate::H(1)).unwrap();
        assert_eq!(tab.stabilizers()[1], ps(".X"));

        for gate in [Gate::H(2), Gate::S(5), Gate::CX(0, 2), Gate::CX(1, 1)] {
            let before = tab.clone();
            assert!(matches!(
                prop.apply(&mut tab, gate).unwrap_err(),
                EquivError::InvalidGenerator { n: 2, .. },
            ));
            assert_eq!(tab, before);
        }
    }

    #[test]
    fn start_tableau_must_fit() {
        let c = Circuit::new(3);
        let err
            = CircuitPropagator::new()
            .propagate_from(&c, StabilizerTableau::new(2))
            .unwrap_err();
        assert!(matches!(err, EquivError::QubitCountMismatch { a: 3, b: 2 }));
    }
}
