#![allow(clippy::needless_range_loop)]

//! Equivalence checking for Clifford circuits.
//!
//! Two circuits built from Hadamard, phase, and CNOT gates (or gates that
//! decompose into them) are compared by propagating the Pauli basis through
//! each of them, encoding the question "do the resulting stabilizer groups
//! coincide, signs included?" as a CNF formula, and handing that formula to an
//! incremental SAT solver. The verdict comes back together with structural
//! statistics about the encoding and the search.
//!
//! # Example
//! ```
//! use clifford_equiv::{ circuit::Circuit, checker::{ CheckOptions, EquivalenceChecker } };
//!
//! // CNOT(0, 1) is CNOT(1, 0) conjugated by Hadamards on both qubits
//! let mut a = Circuit::new(2);
//! a.cx(0, 1);
//! let mut b = Circuit::new(2);
//! b.h(0).h(1).cx(1, 0).h(0).h(1);
//!
//! let checker = EquivalenceChecker::new();
//! let res = checker.check(&a, &b, &CheckOptions::default()).unwrap();
//! assert!(res.equivalent);
//! ```

pub mod error;
pub mod pauli;
pub mod gate;
pub mod circuit;
pub mod tableau;
pub mod propagate;
pub mod encode;
pub mod solver;
pub mod checker;

pub use error::{ CircuitId, EquivError, Result };

/// Check two circuits for operator equivalence with default options and the
/// Z3 backend.
pub fn check_equivalence(a: &circuit::Circuit, b: &circuit::Circuit)
    -> Result<checker::VerificationResult>
{
    checker::EquivalenceChecker::new()
        .check(a, b, &checker::CheckOptions::default())
}
