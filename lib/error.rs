//! Error types shared by every stage of a check.

use std::fmt;
use thiserror::Error;
use crate::gate::{ Gate, GateKind };

/// Identifies which of the two circuits in a check an error came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CircuitId {
    /// The first (left-hand) circuit.
    A,
    /// The second (right-hand) circuit.
    B,
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EquivError {
    /// A gate outside the Clifford group was encountered during propagation.
    #[error("unsupported non-Clifford gate {kind} at position {position}")]
    UnsupportedGate { position: usize, kind: GateKind },

    /// A gate record is malformed: wrong number of qubits, a repeated qubit,
    /// or a qubit index outside the register.
    #[error("invalid gate at position {position}: {reason}")]
    InvalidGate { position: usize, reason: String },

    /// A lowered generator addresses qubits outside the register or uses the
    /// same qubit twice.
    #[error("generator {gate} does not act on a {n}-qubit register")]
    InvalidGenerator { gate: Gate, n: usize },

    /// The two circuits act on registers of different sizes.
    #[error("qubit count mismatch: {a} != {b}")]
    QubitCountMismatch { a: usize, b: usize },

    /// Two Pauli strings (or generator sets) act on different qubit counts.
    #[error("Pauli length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid Pauli string: {0:?}")]
    InvalidPauli(String),

    #[error("input state {input:?} does not fit a {n}-qubit register")]
    InvalidInputState { input: String, n: usize },

    /// The encoding ran out of SAT variable indices.
    #[error("encoding needs more than {max} SAT variables")]
    TooManyVariables { max: usize },

    /// Wraps an error with the identity of the circuit that produced it.
    #[error("circuit {circuit}: {source}")]
    InCircuit {
        circuit: CircuitId,
        #[source]
        source: Box<EquivError>,
    },
}

impl EquivError {
    pub(crate) fn in_circuit(self, circuit: CircuitId) -> Self {
        Self::InCircuit { circuit, source: Box::new(self) }
    }

    /// Return the circuit an error is attributed to, if any.
    pub fn circuit(&self) -> Option<CircuitId> {
        match self {
            Self::InCircuit { circuit, .. } => Some(*circuit),
            _ => None,
        }
    }

    /// Strip any circuit annotations and return the underlying error.
    pub fn root(&self) -> &Self {
        match self {
            Self::InCircuit { source, .. } => source.root(),
            e => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, EquivError>;
