//! [`SatBackend`] on top of the [Z3](https://github.com/Z3Prover/z3) solver.
//!
//! Clauses are buffered as they are asserted and loaded into a fresh Z3
//! context when a query is made, so that the backend itself owns no native
//! state between queries. The budget is handed to Z3 as its `timeout` and
//! `max_conflicts` parameters, and search counters are read back from Z3's
//! statistics after every query.

use std::time::Instant;
use ::z3::{
    ast::Bool,
    Config,
    Context,
    Params,
    SatResult,
    Solver,
    StatisticsValue,
};
use tracing::trace;
use crate::encode::Lit;
use super::{ Budget, SatBackend, SolveStatus, SolverStats };

/// A [`SatBackend`] backed by Z3.
#[derive(Clone, Debug, Default)]
pub struct Z3Backend {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    stats: SolverStats,
    reason_unknown: Option<String>,
}

impl Z3Backend {
    pub fn new() -> Self { Self::default() }

    /// Return the number of variables seen so far.
    pub fn num_vars(&self) -> usize { self.num_vars }

    /// Return Z3's explanation for the last query that ended undecided.
    pub fn reason_unknown(&self) -> Option<&str> { self.reason_unknown.as_deref() }

    fn grow(&mut self, lits: &[Lit]) {
        if let Some(max) = lits.iter().map(|l| l.var().index()).max() {
            self.num_vars = self.num_vars.max(max + 1);
        }
    }

    // fold one Z3 statistics entry into the counters
    fn absorb(&mut self, key: &str, value: u64) {
        let key = key.strip_prefix("sat ").unwrap_or(key);
        match key {
            "conflicts" => { self.stats.conflicts += value; },
            "decisions" => { self.stats.decisions += value; },
            "propagations"
            | "binary propagations"
            | "propagations 2ary"
            | "propagations nary"
                => { self.stats.propagations += value; },
            "restarts" => { self.stats.restarts += value; },
            "learned" | "lemmas" => { self.stats.learnt_clauses += value; },
            _ => { },
        }
    }
}

// Z3's reasons for giving up when a limit was hit
fn is_limit(reason: &str) -> bool {
    ["timeout", "cancel", "conflict", "resource"].iter()
        .any(|pat| reason.contains(pat))
}

impl SatBackend for Z3Backend {
    fn assert_clause(&mut self, clause: &[Lit]) {
        self.grow(clause);
        self.clauses.push(clause.to_vec());
    }

    fn solve_with_budget(&mut self, assumptions: &[Lit], budget: &Budget)
        -> SolveStatus
    {
        self.grow(assumptions);
        self.reason_unknown = None;
        // a zero budget is spent before the query starts
        if budget.time_exceeded() || budget.conflicts_exceeded(0) {
            return SolveStatus::Interrupted;
        }

        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mut params = Params::new(&ctx);
        if let Some(deadline) = budget.deadline {
            let ms: u128
                = deadline.saturating_duration_since(Instant::now()).as_millis()
                .clamp(1, u128::from(u32::MAX));
            params.set_u32("timeout", ms as u32);
        }
        if let Some(limit) = budget.conflict_limit {
            params.set_u32("max_conflicts", u32::try_from(limit).unwrap_or(u32::MAX));
        }
        solver.set_params(&params);

        let vars: Vec<Bool>
            = (0..self.num_vars).map(|_| Bool::fresh_const(&ctx, "v")).collect();
        let to_z3 = |l: &Lit| {
            let v = &vars[l.var().index()];
            if l.is_negated() { v.not() } else { v.clone() }
        };
        for clause in self.clauses.iter() {
            match clause.as_slice() {
                [] => { solver.assert(&Bool::from_bool(&ctx, false)); },
                [l] => { solver.assert(&to_z3(l)); },
                lits => {
                    let terms: Vec<Bool> = lits.iter().map(to_z3).collect();
                    let refs: Vec<&Bool> = terms.iter().collect();
                    solver.assert(&Bool::or(&ctx, &refs));
                },
            }
        }
        let assumed: Vec<Bool> = assumptions.iter().map(to_z3).collect();
        let result = solver.check_assumptions(&assumed);

        for entry in solver.get_statistics().entries() {
            if let StatisticsValue::UInt(value) = entry.value {
                self.absorb(&entry.key, u64::from(value));
            }
        }
        let status
            = match result {
                SatResult::Sat => SolveStatus::Sat,
                SatResult::Unsat => SolveStatus::Unsat,
                SatResult::Unknown => {
                    let reason = solver.get_reason_unknown().unwrap_or_default();
                    let status
                        = if budget.time_exceeded() || is_limit(&reason) {
                            SolveStatus::Interrupted
                        } else {
                            SolveStatus::Unknown
                        };
                    self.reason_unknown = Some(reason);
                    status
                },
            };
        trace!(
            ?status,
            vars = self.num_vars,
            clauses = self.clauses.len(),
            conflicts = self.stats.conflicts,
            "z3 query finished",
        );
        status
    }

    fn statistics(&self) -> SolverStats { self.stats }
}
