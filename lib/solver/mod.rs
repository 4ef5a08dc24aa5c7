//! SAT backends and the equivalence query built on top of them.
//!
//! A backend is anything implementing [`SatBackend`]: it accepts clauses one
//! at a time and answers a single query under assumption literals and a
//! [`Budget`]. [`EquivalenceSolver`] loads a [`ClauseSet`] into a fresh
//! backend, asks whether the formula is satisfiable under its
//! phase-consistency literal, and translates the answer into a [`Verdict`].
//!
//! The default backend is [`Z3Backend`](self::z3::Z3Backend), built on the Z3
//! solver.

pub mod z3;

use std::time::{ Duration, Instant };
use serde::{ Deserialize, Serialize };
use tracing::{ debug, warn };
use crate::encode::{ ClauseSet, Lit };

/// Resource limits for a single query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Budget {
    /// Wall-clock instant after which the query is abandoned.
    pub deadline: Option<Instant>,
    /// Maximum number of conflicts in the query.
    pub conflict_limit: Option<u64>,
}

impl Budget {
    /// No limits at all.
    pub fn unlimited() -> Self { Self::default() }

    /// Limit the query to `limit` from now.
    pub fn with_time_limit(limit: Duration) -> Self {
        Self { deadline: Instant::now().checked_add(limit), conflict_limit: None }
    }

    /// Set the conflict limit.
    pub fn conflicts(mut self, limit: Option<u64>) -> Self {
        self.conflict_limit = limit;
        self
    }

    /// Return `true` if the deadline has passed.
    pub fn time_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return `true` if `conflicts` reaches the conflict limit.
    pub fn conflicts_exceeded(&self, conflicts: u64) -> bool {
        self.conflict_limit.is_some_and(|l| conflicts >= l)
    }
}

/// Raw answer of a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// A model was found.
    Sat,
    /// The formula is unsatisfiable under the assumptions.
    Unsat,
    /// The budget ran out first.
    Interrupted,
    /// The backend gave up for another reason.
    Unknown,
}

/// Search counters, cumulative over the lifetime of a backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverStats {
    pub conflicts: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub restarts: u64,
    pub learnt_clauses: u64,
}

/// An incremental SAT solver.
pub trait SatBackend {
    /// Add a clause. The empty clause makes the formula unsatisfiable.
    fn assert_clause(&mut self, clause: &[Lit]);

    /// Decide satisfiability of all clauses asserted so far together with
    /// `assumptions`, within `budget`.
    fn solve_with_budget(&mut self, assumptions: &[Lit], budget: &Budget)
        -> SolveStatus;

    fn statistics(&self) -> SolverStats;
}

/// Interpretation of a query's answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The question was settled.
    Proven { equivalent: bool },
    /// The budget ran out.
    Timeout,
    /// The backend gave up.
    Unknown,
}

impl From<SolveStatus> for Verdict {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Sat => Self::Proven { equivalent: true },
            SolveStatus::Unsat => Self::Proven { equivalent: false },
            SolveStatus::Interrupted => Self::Timeout,
            SolveStatus::Unknown => Self::Unknown,
        }
    }
}

/// Result of [`EquivalenceSolver::solve`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SolverOutcome {
    pub verdict: Verdict,
    pub status: SolveStatus,
    pub stats: SolverStats,
}

/// Runs one equivalence query on one backend.
#[derive(Clone, Debug)]
pub struct EquivalenceSolver<B> {
    backend: B,
}

impl<B> EquivalenceSolver<B>
where B: SatBackend
{
    /// Wrap a fresh backend.
    pub fn new(backend: B) -> Self { Self { backend } }

    /// Load `clauses` into the backend and ask for a model under the
    /// phase-consistency assumption.
    ///
    /// The backend is dropped afterwards.
    pub fn solve(mut self, clauses: &ClauseSet, budget: &Budget) -> SolverOutcome {
        clauses.clauses().iter()
            .for_each(|clause| { self.backend.assert_clause(clause); });
        let status
            = self.backend.solve_with_budget(&[clauses.phase_lit()], budget);
        let stats = self.backend.statistics();
        let verdict = Verdict::from(status);
        match verdict {
            Verdict::Proven { equivalent } => {
                debug!(equivalent, conflicts = stats.conflicts, "query settled");
            },
            Verdict::Timeout => {
                warn!(conflicts = stats.conflicts, "query ran out of budget");
            },
            Verdict::Unknown => {
                warn!(conflicts = stats.conflicts, "backend gave up on query");
            },
        }
        SolverOutcome { verdict, status, stats }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ encode::SatEncoder, pauli::PauliString };
    use self::z3::Z3Backend;

    fn ps(s: &str) -> PauliString { s.parse().unwrap() }

    // a backend that never gets anywhere
    #[derive(Default)]
    struct Stubborn { clauses: usize }

    impl SatBackend for Stubborn {
        fn assert_clause(&mut self, _clause: &[Lit]) { self.clauses += 1; }

        fn solve_with_budget(&mut self, _assumptions: &[Lit], _budget: &Budget)
            -> SolveStatus
        {
            SolveStatus::Unknown
        }

        fn statistics(&self) -> SolverStats { SolverStats::default() }
    }

    #[test]
    fn verdicts() {
        assert_eq!(Verdict::from(SolveStatus::Sat), Verdict::Proven { equivalent: true });
        assert_eq!(Verdict::from(SolveStatus::Unsat), Verdict::Proven { equivalent: false });
        assert_eq!(Verdict::from(SolveStatus::Interrupted), Verdict::Timeout);
        assert_eq!(Verdict::from(SolveStatus::Unknown), Verdict::Unknown);
    }

    #[test]
    fn budgets() {
        let b = Budget::unlimited();
        assert!(!b.time_exceeded());
        assert!(!b.conflicts_exceeded(u64::MAX));
        let b = Budget::with_time_limit(Duration::ZERO).conflicts(Some(5));
        assert!(b.time_exceeded());
        assert!(!b.conflicts_exceeded(4));
        assert!(b.conflicts_exceeded(5));
    }

    #[test]
    fn equal_and_unequal_groups() {
        let same
            = SatEncoder::encode_groups(&[ps("XX"), ps("ZZ")], &[ps("ZZ"), ps("XX")])
            .unwrap();
        let outcome = EquivalenceSolver::new(Z3Backend::new()).solve(&same, &Budget::unlimited());
        assert_eq!(outcome.verdict, Verdict::Proven { equivalent: true });
        assert_eq!(outcome.status, SolveStatus::Sat);

        let signs
            = SatEncoder::encode_groups(&[ps("XX"), ps("ZZ")], &[ps("-ZZ"), ps("XX")])
            .unwrap();
        let outcome = EquivalenceSolver::new(Z3Backend::new()).solve(&signs, &Budget::unlimited());
        assert_eq!(outcome.verdict, Verdict::Proven { equivalent: false });
    }

    #[test]
    fn unknown_passes_through() {
        let cs = SatEncoder::encode_groups(&[ps("Z")], &[ps("Z")]).unwrap();
        let outcome
            = EquivalenceSolver::new(Stubborn::default())
            .solve(&cs, &Budget::unlimited());
        assert_eq!(outcome.verdict, Verdict::Unknown);
    }
}
