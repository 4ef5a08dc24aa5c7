//! Top-level equivalence checks.
//!
//! [`EquivalenceChecker::check`] runs the whole pipeline for a pair of
//! circuits: both are propagated (concurrently) into tableaux, the tableaux
//! are encoded into one CNF formula, and the formula is handed to a fresh SAT
//! backend under the [`CheckOptions`] budget. By default the question is
//! whether the two circuits implement the same unitary up to a global phase;
//! if input states are given, it is instead whether they produce the same
//! state from each of them.
//!
//! # Example
//! ```
//! use clifford_equiv::{ circuit::Circuit, checker::{ CheckOptions, EquivalenceChecker } };
//!
//! // two circuits that differ only by a Z gate, which acts trivially on ∣0⟩
//! let mut a = Circuit::new(1);
//! a.h(0).h(0);
//! let mut b = Circuit::new(1);
//! b.z(0);
//!
//! let checker = EquivalenceChecker::new();
//! let res = checker.check(&a, &b, &CheckOptions::default()).unwrap();
//! assert!(!res.equivalent);
//!
//! let opts = CheckOptions::default().add_input("0");
//! let res = checker.check(&a, &b, &opts).unwrap();
//! assert!(res.equivalent);
//! ```

use std::time::{ Duration, Instant };
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    circuit::Circuit,
    encode::{ ArityCounts, ClauseSet, SatEncoder },
    error::{ CircuitId, EquivError, Result },
    propagate::CircuitPropagator,
    solver::{
        z3::Z3Backend,
        Budget,
        EquivalenceSolver,
        SatBackend,
        SolveStatus,
        SolverStats,
        Verdict,
    },
    tableau::{ InputState, StabilizerTableau },
};

/// How much a verdict can be trusted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    /// The solver settled the question.
    Proven,
    /// The budget ran out; the result is "not shown equivalent".
    Timeout,
    /// The solver gave up; the result is "not shown equivalent".
    Unknown,
}

// durations as integer milliseconds
mod millis {
    use std::time::Duration;
    use serde::{ Deserialize, Deserializer, Serializer };

    pub fn serialize<S>(d: &Duration, ser: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        ser.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(de: D) -> Result<Duration, D::Error>
    where D: Deserializer<'de>
    {
        u64::deserialize(de).map(Duration::from_millis)
    }
}

/// Structural and timing data gathered during a check.
///
/// Serialized field names follow the benchmark record layout, e.g.
/// `nrOfQubits`, `numSatVarsCreated`, `preprocTime`; times are serialized in
/// milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(rename = "nrOfQubits")]
    pub num_qubits: usize,
    /// Total over both circuits.
    pub num_gates: usize,
    pub num_sat_vars_created: usize,
    /// Total over both sides of every encoded group pair.
    pub num_generators: usize,
    /// Larger of the two circuit depths.
    pub circ_depth: usize,
    pub num_inputs: usize,
    pub equivalent: bool,
    pub satisfiable: bool,
    /// Propagation of both circuits.
    #[serde(with = "millis")]
    pub preproc_time: Duration,
    #[serde(with = "millis")]
    pub solving_time: Duration,
    #[serde(with = "millis")]
    pub sat_construction_time: Duration,
    pub num_clauses: usize,
    pub clauses: ArityCounts,
    pub solver: SolverStats,
}

impl Statistics {
    /// Serialize to a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Shortcut for the solver's conflict count.
    pub fn conflicts(&self) -> u64 { self.solver.conflicts }
}

/// Result of [`EquivalenceChecker::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    /// `true` only if equivalence was proven.
    pub equivalent: bool,
    pub confidence: Confidence,
    pub statistics: Statistics,
}

/// Options for a single check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    /// Wall-clock limit for the solver.
    pub time_limit: Duration,
    /// Conflict limit for the solver.
    pub conflict_limit: Option<u64>,
    /// If `false`, [`VerificationResult::statistics`] is left at its default.
    pub collect_statistics: bool,
    /// Input states for a state-equivalence check; operator equivalence is
    /// checked if empty.
    pub inputs: Vec<InputState>,
    /// Let the encoder settle coefficients by unit propagation (see
    /// [`SatEncoder::preprocessing`]).
    pub preprocess: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            conflict_limit: None,
            collect_statistics: true,
            inputs: Vec::new(),
            preprocess: true,
        }
    }
}

impl CheckOptions {
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn conflict_limit(mut self, limit: Option<u64>) -> Self {
        self.conflict_limit = limit;
        self
    }

    pub fn collect_statistics(mut self, collect: bool) -> Self {
        self.collect_statistics = collect;
        self
    }

    pub fn preprocess(mut self, on: bool) -> Self {
        self.preprocess = on;
        self
    }

    pub fn inputs<I>(mut self, inputs: I) -> Self
    where I: IntoIterator<Item = InputState>
    {
        self.inputs = inputs.into_iter().collect();
        self
    }

    pub fn add_input<S>(mut self, input: S) -> Self
    where S: Into<InputState>
    {
        self.inputs.push(input.into());
        self
    }
}

// what gets handed to the encoder
enum Propagated {
    Operator(StabilizerTableau, StabilizerTableau),
    States(Vec<StabilizerTableau>, Vec<StabilizerTableau>),
}

fn propagate_inputs(
    prop: &CircuitPropagator,
    circuit: &Circuit,
    inputs: &[InputState],
) -> Result<Vec<StabilizerTableau>>
{
    let n = circuit.num_qubits();
    inputs.iter()
        .map(|input| {
            prop.propagate_from(circuit, StabilizerTableau::from_input(input, n)?)
        })
        .collect()
}

/// Drives checks with backends produced by a factory.
///
/// Each check gets its own backend, so a checker can be shared across threads
/// whenever its factory can.
#[derive(Copy, Clone, Debug)]
pub struct EquivalenceChecker<F = fn() -> Z3Backend> {
    factory: F,
}

impl Default for EquivalenceChecker {
    fn default() -> Self { Self::new() }
}

impl EquivalenceChecker {
    /// Create a checker using the [`Z3Backend`].
    pub fn new() -> Self { Self { factory: Z3Backend::new } }
}

impl<F, B> EquivalenceChecker<F>
where
    F: Fn() -> B,
    B: SatBackend,
{
    /// Create a checker using backends produced by `factory`.
    pub fn with_backend(factory: F) -> Self { Self { factory } }

    /// Check `a` and `b` for equivalence.
    ///
    /// Fails if the circuits act on different numbers of qubits, if either
    /// contains a non-Clifford or malformed gate (annotated with the
    /// offending circuit), or if an input state does not fit the register.
    /// Running out of budget is not an error; see [`Confidence`].
    pub fn check(&self, a: &Circuit, b: &Circuit, options: &CheckOptions)
        -> Result<VerificationResult>
    {
        let n = a.num_qubits();
        if n != b.num_qubits() {
            return Err(EquivError::QubitCountMismatch { a: n, b: b.num_qubits() });
        }
        if let Some(bad) = options.inputs.iter().find(|input| input.len() > n) {
            return Err(EquivError::InvalidInputState {
                input: bad.as_str().to_string(),
                n,
            });
        }
        let prop = CircuitPropagator::new();

        let t0 = Instant::now();
        let propagated
            = if options.inputs.is_empty() {
                let (ta, tb)
                    = rayon::join(|| prop.propagate(a), || prop.propagate(b));
                Propagated::Operator(
                    ta.map_err(|e| e.in_circuit(CircuitId::A))?,
                    tb.map_err(|e| e.in_circuit(CircuitId::B))?,
                )
            } else {
                let (sa, sb)
                    = rayon::join(
                        || propagate_inputs(&prop, a, &options.inputs),
                        || propagate_inputs(&prop, b, &options.inputs),
                    );
                Propagated::States(
                    sa.map_err(|e| e.in_circuit(CircuitId::A))?,
                    sb.map_err(|e| e.in_circuit(CircuitId::B))?,
                )
            };
        let preproc_time = t0.elapsed();
        debug!(qubits = n, time = ?preproc_time, "propagation finished");

        let t1 = Instant::now();
        let mut enc = SatEncoder::new().preprocessing(options.preprocess);
        match propagated {
            Propagated::Operator(ta, tb) => { enc.add_tableaux(&ta, &tb)?; },
            Propagated::States(sa, sb) => {
                for (ta, tb) in sa.iter().zip(&sb) {
                    enc.add_pair(ta.stabilizers(), tb.stabilizers())?;
                }
            },
        }
        let clauses: ClauseSet = enc.finish();
        let sat_construction_time = t1.elapsed();
        debug!(
            vars = clauses.num_vars(),
            clauses = clauses.len(),
            time = ?sat_construction_time,
            "encoding finished",
        );

        let budget
            = Budget::with_time_limit(options.time_limit)
            .conflicts(options.conflict_limit);
        let t2 = Instant::now();
        let outcome
            = EquivalenceSolver::new((self.factory)()).solve(&clauses, &budget);
        let solving_time = t2.elapsed();
        debug!(verdict = ?outcome.verdict, time = ?solving_time, "solving finished");

        let (equivalent, confidence)
            = match outcome.verdict {
                Verdict::Proven { equivalent } => (equivalent, Confidence::Proven),
                Verdict::Timeout => (false, Confidence::Timeout),
                Verdict::Unknown => (false, Confidence::Unknown),
            };
        let statistics
            = if options.collect_statistics {
                Statistics {
                    num_qubits: n,
                    num_gates: a.len() + b.len(),
                    num_sat_vars_created: clauses.num_vars(),
                    num_generators: clauses.num_generators(),
                    circ_depth: a.depth().max(b.depth()),
                    num_inputs: options.inputs.len(),
                    equivalent,
                    satisfiable: outcome.status == SolveStatus::Sat,
                    preproc_time,
                    solving_time,
                    sat_construction_time,
                    num_clauses: clauses.len(),
                    clauses: clauses.arity_counts(),
                    solver: outcome.stats,
                }
            } else {
                Statistics::default()
            };
        Ok(VerificationResult { equivalent, confidence, statistics })
    }
}
