//! CNF encoding of stabilizer group equality.
//!
//! Given two lists of generators *A* and *B*, each an independent set of
//! commuting Hermitian Pauli strings, the groups they generate are equal
//! (signs included) if and only if every generator of *A* is a product of
//! generators of *B* and vice versa. For a target *t* and a basis
//! *B*<sub>1</sub>, ..., *B*<sub>*m*</sub> the question "is *t* =
//! ∏<sub>*j*</sub> *B*<sub>*j*</sub><sup>*c*<sub>*j*</sub></sup> for some
//! bits *c*<sub>*j*</sub>?" splits into two parts.
//!
//! 1. **Parity.** Every *X* and *Z* bit of *t* is the XOR of the
//!    corresponding bits of the chosen *B*<sub>*j*</sub>.
//! 2. **Phase.** Writing each string as *i*<sup>φ</sup>
//!    *X*<sup>**x**</sup>*Z*<sup>**z**</sup>, the ordered product has phase
//!    Σ *c*<sub>*j*</sub> φ<sub>*j*</sub> + 2 Σ<sub>*j*<*l*</sub>
//!    *c*<sub>*j*</sub> *c*<sub>*l*</sub> (**z**<sub>*j*</sub> ·
//!    **x**<sub>*l*</sub>) (mod 4). With φ<sub>*j*</sub> = *a*<sub>*j*</sub> +
//!    2*b*<sub>*j*</sub>, its low bit is ⊕ *c*<sub>*j*</sub>
//!    *a*<sub>*j*</sub> and its high bit is ⊕ *c*<sub>*j*</sub>
//!    *b*<sub>*j*</sub> ⊕ ⊕<sub>*j*<*l*</sub> γ<sub>*jl*</sub>
//!    *c*<sub>*j*</sub> *c*<sub>*l*</sub>, where γ<sub>*jl*</sub> =
//!    *a*<sub>*j*</sub> *a*<sub>*l*</sub> ⊕ (**z**<sub>*j*</sub> ·
//!    **x**<sub>*l*</sub> mod 2). Both bits must match *t*.
//!
//! XORs become Tseitin chains and products become AND gadgets. The phase
//! constraints of target *t* are only enforced under a sign variable
//! σ<sub>*t*</sub>, and every σ<sub>*t*</sub> is implied by a single
//! phase-consistency literal that the solver assumes, so that a refutation
//! under the assumption means "same group up to signs, but different signs".
//!
//! Parity constraints are unit-propagated before anything is emitted: a
//! constraint with one unresolved coefficient fixes it, fixed coefficients are
//! emitted as unit clauses and substituted everywhere, and quadratic phase
//! terms over fixed coefficients fold into constants or linear terms. For
//! Choi-state generators (see
//! [`StabilizerTableau::choi_generators`][crate::tableau::StabilizerTableau::choi_generators])
//! the partner half of every generator is a single-qubit Pauli, so every
//! coefficient is resolved here and the formula collapses to unit clauses.
//! Preprocessing can be switched off with [`SatEncoder::preprocessing`], in
//! which case every constraint is emitted as a full chain or gadget.

use std::{ fmt, ops::Not };
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{ Deserialize, Serialize };
use tracing::{ debug, trace };
use crate::{
    error::{ EquivError, Result },
    pauli::PauliString,
    tableau::StabilizerTableau,
};

/// A SAT variable, numbered from 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u32);

impl Var {
    /// Largest valid variable index; both literals of every variable must fit
    /// in a `u32`.
    pub const MAX_INDEX: usize = (u32::MAX >> 1) as usize;

    /// Fails if `idx` exceeds [`Self::MAX_INDEX`].
    pub fn from_index(idx: usize) -> Result<Self> {
        u32::try_from(idx).ok()
            .filter(|i| *i as usize <= Self::MAX_INDEX)
            .map(Self)
            .ok_or(EquivError::TooManyVariables { max: Self::MAX_INDEX + 1 })
    }

    pub fn index(self) -> usize { self.0 as usize }

    pub fn positive(self) -> Lit { Lit(self.0 << 1) }

    pub fn negative(self) -> Lit { Lit((self.0 << 1) | 1) }

    /// Return the literal that is true when `self` takes value `value`.
    pub fn lit(self, value: bool) -> Lit {
        if value { self.positive() } else { self.negative() }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// A variable with a polarity.
///
/// Encoded as `2 * var` for the positive and `2 * var + 1` for the negative
/// literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn var(self) -> Var { Var(self.0 >> 1) }

    pub fn is_negated(self) -> bool { self.0 & 1 == 1 }

    /// Index for per-literal arrays.
    pub fn index(self) -> usize { self.0 as usize }

    /// Signed, 1-based DIMACS number.
    pub fn to_dimacs(self) -> i64 {
        let v = i64::from(self.var().0) + 1;
        if self.is_negated() { -v } else { v }
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output { Self(self.0 ^ 1) }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Clause counts by length.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArityCounts {
    /// Clauses with at most one literal (the empty clause included).
    pub unit: usize,
    pub binary: usize,
    pub ternary: usize,
    /// Clauses with four or more literals.
    pub n_ary: usize,
}

impl ArityCounts {
    fn record(&mut self, len: usize) {
        match len {
            0 | 1 => { self.unit += 1; },
            2 => { self.binary += 1; },
            3 => { self.ternary += 1; },
            _ => { self.n_ary += 1; },
        }
    }

    pub fn total(&self) -> usize {
        self.unit + self.binary + self.ternary + self.n_ary
    }
}

/// A finished CNF formula together with its phase-consistency assumption.
///
/// The [`Display`][fmt::Display] implementation renders DIMACS text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseSet {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    phase_lit: Lit,
    arity: ArityCounts,
    generators: usize,
}

impl ClauseSet {
    pub fn num_vars(&self) -> usize { self.num_vars }

    pub fn clauses(&self) -> &[Vec<Lit>] { &self.clauses }

    pub fn len(&self) -> usize { self.clauses.len() }

    pub fn is_empty(&self) -> bool { self.clauses.is_empty() }

    /// The literal to assume when asking whether signs agree.
    pub fn phase_lit(&self) -> Lit { self.phase_lit }

    pub fn arity_counts(&self) -> ArityCounts { self.arity }

    /// Return the total number of generators over all encoded group pairs.
    pub fn num_generators(&self) -> usize { self.generators }
}

impl fmt::Display for ClauseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "c assume {}", self.phase_lit)?;
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in self.clauses.iter() {
            for lit in clause.iter() {
                write!(f, "{} ", lit)?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

// per-basis data shared by all targets expressed in that basis
struct Basis {
    m: usize,
    // for each of the 2n bit columns (x bits first), the generators having it
    cols: Vec<Vec<usize>>,
    // for each generator, the columns it appears in
    var_cols: Vec<Vec<usize>>,
    // low and high bits of the xz-phase
    a: Vec<bool>,
    b: Vec<bool>,
    // upper triangle of γ, row-major over m × m
    gamma: Vec<bool>,
}

impl Basis {
    fn new(gens: &[PauliString], n: usize) -> Self {
        let m = gens.len();
        let mut cols: Vec<Vec<usize>> = vec![Vec::new(); 2 * n];
        let mut var_cols: Vec<Vec<usize>> = vec![Vec::new(); m];
        for (j, g) in gens.iter().enumerate() {
            for q in 0..n {
                if g.x_bit(q) { cols[q].push(j); var_cols[j].push(q); }
            }
            for q in 0..n {
                if g.z_bit(q) { cols[n + q].push(j); var_cols[j].push(n + q); }
            }
        }
        let phases: Vec<u8>
            = gens.iter().map(|g| g.xz_phase().to_int()).collect();
        let a: Vec<bool> = phases.iter().map(|ph| ph & 1 == 1).collect();
        let b: Vec<bool> = phases.iter().map(|ph| ph & 2 == 2).collect();
        let mut gamma: Vec<bool> = vec![false; m * m];
        for j in 0..m {
            for l in j + 1..m {
                gamma[j * m + l] = (a[j] && a[l]) ^ gens[j].zx_parity(&gens[l]);
            }
        }
        Self { m, cols, var_cols, a, b, gamma }
    }

    fn gamma(&self, j: usize, l: usize) -> bool {
        if j < l { self.gamma[j * self.m + l] } else { self.gamma[l * self.m + j] }
    }
}

/// Builds a [`ClauseSet`] from one or more pairs of generator lists.
#[derive(Clone, Debug)]
pub struct SatEncoder {
    preprocess: bool,
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    arity: ArityCounts,
    phase_lit: Lit,
    generators: usize,
}

impl Default for SatEncoder {
    fn default() -> Self { Self::new() }
}

impl SatEncoder {
    /// Create a new encoder. The phase-consistency literal is always the
    /// first variable.
    pub fn new() -> Self {
        Self {
            preprocess: true,
            num_vars: 1,
            clauses: Vec::new(),
            arity: ArityCounts::default(),
            phase_lit: Var(0).positive(),
            generators: 0,
        }
    }

    /// Turn unit propagation over the parity constraints on or off (default
    /// on).
    ///
    /// With preprocessing off, no coefficient is fixed by the encoder: every
    /// parity constraint becomes a full XOR chain and every quadratic phase
    /// term an AND gadget, leaving all of the work to the solver.
    pub fn preprocessing(mut self, on: bool) -> Self {
        self.preprocess = on;
        self
    }

    /// Encode operator equivalence of the operations described by two
    /// tableaux via their Choi-state generators.
    pub fn encode(a: &StabilizerTableau, b: &StabilizerTableau)
        -> Result<ClauseSet>
    {
        let mut enc = Self::new();
        enc.add_tableaux(a, b)?;
        Ok(enc.finish())
    }

    /// Add the constraints for operator equivalence of two tableaux to the
    /// formula.
    pub fn add_tableaux(&mut self, a: &StabilizerTableau, b: &StabilizerTableau)
        -> Result<()>
    {
        if a.num_qubits() != b.num_qubits() {
            return Err(EquivError::LengthMismatch {
                left: a.num_qubits(),
                right: b.num_qubits(),
            });
        }
        self.add_pair(&a.choi_generators(), &b.choi_generators())
    }

    /// Encode equality of the groups generated by `gens_a` and `gens_b`.
    pub fn encode_groups(gens_a: &[PauliString], gens_b: &[PauliString])
        -> Result<ClauseSet>
    {
        let mut enc = Self::new();
        enc.add_pair(gens_a, gens_b)?;
        Ok(enc.finish())
    }

    /// Add the constraints for equality of the groups generated by `gens_a`
    /// and `gens_b` to the formula.
    ///
    /// Fails if the generators do not all act on the same number of qubits.
    pub fn add_pair(&mut self, gens_a: &[PauliString], gens_b: &[PauliString])
        -> Result<()>
    {
        let n
            = gens_a.first().or(gens_b.first())
            .map(|g| g.num_qubits())
            .unwrap_or(0);
        if let Some(bad)
            = gens_a.iter().chain(gens_b).find(|g| g.num_qubits() != n)
        {
            return Err(EquivError::LengthMismatch {
                left: n,
                right: bad.num_qubits(),
            });
        }
        let clauses0 = self.clauses.len();
        let vars0 = self.num_vars;
        self.express_all(gens_a, gens_b, n)?;
        self.express_all(gens_b, gens_a, n)?;
        self.generators += gens_a.len() + gens_b.len();
        debug!(
            qubits = n,
            generators = gens_a.len() + gens_b.len(),
            vars = self.num_vars - vars0,
            clauses = self.clauses.len() - clauses0,
            "encoded group pair",
        );
        Ok(())
    }

    /// Finish the formula.
    pub fn finish(self) -> ClauseSet {
        ClauseSet {
            num_vars: self.num_vars,
            clauses: self.clauses,
            phase_lit: self.phase_lit,
            arity: self.arity,
            generators: self.generators,
        }
    }

    fn new_var(&mut self) -> Result<Var> {
        let v = Var::from_index(self.num_vars)?;
        self.num_vars += 1;
        Ok(v)
    }

    fn add_clause(&mut self, clause: Vec<Lit>) {
        self.arity.record(clause.len());
        self.clauses.push(clause);
    }

    // return a literal equal to the XOR of `lits`, or `None` if `lits` is
    // empty
    fn xor_chain(&mut self, lits: &[Lit]) -> Result<Option<Lit>> {
        let Some((&first, rest)) = lits.split_first() else { return Ok(None); };
        let mut acc = first;
        for &l in rest {
            let t = self.new_var()?.positive();
            self.add_clause(vec![!t, acc, l]);
            self.add_clause(vec![!t, !acc, !l]);
            self.add_clause(vec![t, !acc, l]);
            self.add_clause(vec![t, acc, !l]);
            acc = t;
        }
        Ok(Some(acc))
    }

    // require XOR(lits) = rhs
    fn add_xor(&mut self, lits: &[Lit], rhs: bool) -> Result<()> {
        match self.xor_chain(lits)? {
            Some(y) => { self.add_clause(vec![if rhs { y } else { !y }]); },
            None => { if rhs { self.add_clause(Vec::new()); } },
        }
        Ok(())
    }

    // require (XOR(lits) ⊕ constant = rhs) whenever `guard` holds
    fn add_guarded_xor(&mut self, guard: Lit, lits: &[Lit], rhs: bool)
        -> Result<()>
    {
        match self.xor_chain(lits)? {
            Some(y) => { self.add_clause(vec![!guard, if rhs { y } else { !y }]); },
            None => { if rhs { self.add_clause(vec![!guard]); } },
        }
        Ok(())
    }

    fn and_gate(&mut self, a: Lit, b: Lit) -> Result<Lit> {
        let d = self.new_var()?.positive();
        self.add_clause(vec![!d, a]);
        self.add_clause(vec![!d, b]);
        self.add_clause(vec![d, !a, !b]);
        Ok(d)
    }

    fn express_all(&mut self, targets: &[PauliString], basis: &[PauliString], n: usize)
        -> Result<()>
    {
        let basis = Basis::new(basis, n);
        let mut seen: FxHashSet<(Vec<usize>, bool)> = FxHashSet::default();
        for target in targets.iter() {
            self.express(target, &basis, n, &mut seen)?;
            seen.clear();
        }
        Ok(())
    }

    fn express(
        &mut self,
        target: &PauliString,
        basis: &Basis,
        n: usize,
        seen: &mut FxHashSet<(Vec<usize>, bool)>,
    ) -> Result<()>
    {
        let m = basis.m;
        let coeffs: Vec<Var>
            = (0..m).map(|_| self.new_var()).collect::<Result<_>>()?;
        let sigma = self.new_var()?.positive();
        self.add_clause(vec![!self.phase_lit, sigma]);

        // unit propagation over the parity constraints
        let mut value: Vec<Option<bool>> = vec![None; m];
        let mut unresolved: Vec<usize>
            = basis.cols.iter().map(|col| col.len()).collect();
        let mut rhs: Vec<bool>
            = (0..n).map(|q| target.x_bit(q))
            .chain((0..n).map(|q| target.z_bit(q)))
            .collect();
        let mut queue: Vec<usize>
            = if self.preprocess {
                (0..2 * n).filter(|c| unresolved[*c] == 1).collect()
            } else {
                Vec::new()
            };
        while let Some(c) = queue.pop() {
            if unresolved[c] != 1 { continue; }
            let Some(&j)
                = basis.cols[c].iter().find(|j| value[**j].is_none())
                else { continue; };
            let v = rhs[c];
            value[j] = Some(v);
            for &d in basis.var_cols[j].iter() {
                unresolved[d] -= 1;
                rhs[d] ^= v;
                if unresolved[d] == 1 { queue.push(d); }
            }
        }
        for (val, c) in value.iter().zip(&coeffs) {
            if let Some(v) = val { self.add_clause(vec![c.lit(*v)]); }
        }

        // residual parity constraints
        let mut fixed_violated: usize = 0;
        for (c, col) in basis.cols.iter().enumerate() {
            if unresolved[c] == 0 {
                if rhs[c] {
                    // emit verbatim over the fixed coefficients
                    fixed_violated += 1;
                    let lits: Vec<Lit>
                        = col.iter().map(|j| coeffs[*j].positive()).collect();
                    let orig
                        = if c < n { target.x_bit(c) } else { target.z_bit(c - n) };
                    self.add_xor(&lits, orig)?;
                }
                continue;
            }
            let free: Vec<usize>
                = col.iter().copied().filter(|j| value[*j].is_none()).collect();
            if !seen.insert((free.clone(), rhs[c])) { continue; }
            let lits: Vec<Lit>
                = free.iter().map(|j| coeffs[*j].positive()).collect();
            self.add_xor(&lits, rhs[c])?;
        }

        // phase constraints
        let ones: Vec<usize>
            = (0..m).filter(|j| value[*j] == Some(true)).collect();
        let free: Vec<usize>
            = (0..m).filter(|j| value[*j].is_none()).collect();
        let mut const_lo = false;
        let mut const_hi = false;
        for &j in ones.iter() {
            const_lo ^= basis.a[j];
            const_hi ^= basis.b[j];
        }
        for (&j, &l) in ones.iter().tuple_combinations() {
            const_hi ^= basis.gamma(j, l);
        }
        let mut lo: Vec<Lit> = Vec::new();
        let mut hi: Vec<Lit> = Vec::new();
        for &j in free.iter() {
            if basis.a[j] { lo.push(coeffs[j].positive()); }
            let toggle
                = ones.iter().fold(basis.b[j], |acc, o| acc ^ basis.gamma(*o, j));
            if toggle { hi.push(coeffs[j].positive()); }
        }
        for (&j, &l) in free.iter().tuple_combinations() {
            if basis.gamma(j, l) {
                let d = self.and_gate(coeffs[j].positive(), coeffs[l].positive())?;
                hi.push(d);
            }
        }
        let ph = target.xz_phase().to_int();
        let (target_lo, target_hi) = (ph & 1 == 1, ph & 2 == 2);
        self.add_guarded_xor(sigma, &lo, target_lo ^ const_lo)?;
        self.add_guarded_xor(sigma, &hi, target_hi ^ const_hi)?;
        trace!(
            fixed = m - free.len(),
            free = free.len(),
            fixed_violated,
            "encoded target",
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ rngs::StdRng, Rng, SeedableRng };
    use crate::{
        circuit::Circuit,
        propagate::CircuitPropagator,
        solver::{ z3::Z3Backend, Budget, SatBackend, SolveStatus },
    };

    fn ps(s: &str) -> PauliString { s.parse().unwrap() }

    fn solve(cs: &ClauseSet, assume: bool) -> SolveStatus {
        let mut solver = Z3Backend::new();
        cs.clauses().iter().for_each(|cl| { solver.assert_clause(cl); });
        let assumptions = if assume { vec![cs.phase_lit()] } else { vec![] };
        solver.solve_with_budget(&assumptions, &Budget::unlimited())
    }

    #[test]
    fn literals() {
        let v = Var::from_index(4).unwrap();
        assert_eq!(v.positive().var(), v);
        assert_eq!(!v.positive(), v.negative());
        assert!(v.negative().is_negated());
        assert_eq!(v.negative().to_dimacs(), -5);
        assert_eq!(v.lit(true).to_string(), "5");
    }

    #[test]
    fn variable_indices_are_bounded() {
        let last = Var::from_index(Var::MAX_INDEX).unwrap();
        assert_eq!(last.negative().var(), last);
        assert!(last.negative().is_negated());
        assert!(!last.positive().is_negated());
        assert!(matches!(
            Var::from_index(Var::MAX_INDEX + 1).unwrap_err(),
            EquivError::TooManyVariables { .. },
        ));
        assert!(Var::from_index(usize::MAX).is_err());

        let mut enc = SatEncoder::new();
        enc.num_vars = Var::MAX_INDEX;
        let err
            = enc.add_pair(&[ps("XX"), ps("ZZ")], &[ps("ZZ"), ps("XX")])
            .unwrap_err();
        assert!(matches!(err, EquivError::TooManyVariables { .. }));
    }

    #[test]
    fn arity_buckets() {
        let mut counts = ArityCounts::default();
        [0, 1, 2, 3, 4, 9].into_iter().for_each(|k| counts.record(k));
        assert_eq!(
            counts,
            ArityCounts { unit: 2, binary: 1, ternary: 1, n_ary: 2 },
        );
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn xor_chain_semantics() {
        // XOR(a, b, c) = 1 together with a = b = 1 forces c = 1
        let mut enc = SatEncoder::new();
        let vars: Vec<Var> = (0..3).map(|_| enc.new_var().unwrap()).collect();
        let lits: Vec<Lit> = vars.iter().map(|v| v.positive()).collect();
        enc.add_xor(&lits, true).unwrap();
        enc.add_clause(vec![vars[0].positive()]);
        enc.add_clause(vec![vars[1].positive()]);
        enc.add_clause(vec![vars[2].negative()]);
        let cs = enc.finish();
        // two links, four ternary clauses each, one unit on the last link
        assert_eq!(cs.arity_counts().ternary, 8);
        assert_eq!(solve(&cs, false), SolveStatus::Unsat);
    }

    #[test]
    fn empty_parity_is_the_empty_clause() {
        // a target bit no basis element has
        let cs = SatEncoder::encode_groups(&[ps("X")], &[ps("Z")]).unwrap();
        assert!(cs.clauses().iter().any(|cl| cl.is_empty()));
        assert_eq!(solve(&cs, false), SolveStatus::Unsat);
    }

    #[test]
    fn equal_groups() {
        let cs
            = SatEncoder::encode_groups(
                &[ps("XX"), ps("ZZ")],
                &[ps("-YY"), ps("XX")],
            )
            .unwrap();
        assert_eq!(cs.num_generators(), 4);
        assert_eq!(solve(&cs, true), SolveStatus::Sat);
    }

    #[test]
    fn sign_mismatch_needs_the_assumption() {
        let cs
            = SatEncoder::encode_groups(
                &[ps("XX"), ps("ZZ")],
                &[ps("YY"), ps("XX")],
            )
            .unwrap();
        assert_eq!(solve(&cs, false), SolveStatus::Sat);
        assert_eq!(solve(&cs, true), SolveStatus::Unsat);
    }

    #[test]
    fn different_groups() {
        let cs
            = SatEncoder::encode_groups(
                &[ps("XX"), ps("ZZ")],
                &[ps("Z."), ps(".Z")],
            )
            .unwrap();
        assert_eq!(solve(&cs, false), SolveStatus::Unsat);
    }

    #[test]
    fn length_mismatch() {
        let err
            = SatEncoder::encode_groups(&[ps("XX")], &[ps("XXX")])
            .unwrap_err();
        assert!(matches!(err, EquivError::LengthMismatch { left: 2, right: 3 }));
    }

    // generators of the same group, mixed by random row multiplications so
    // that unit propagation alone cannot resolve every coefficient
    fn mixed(gens: &[PauliString], rng: &mut StdRng) -> Vec<PauliString> {
        let mut out = gens.to_vec();
        let k = out.len();
        for _ in 0..4 * k {
            let i = rng.gen_range(0..k);
            let j = (i + rng.gen_range(1..k)) % k;
            out[i] = out[i].multiply(&out[j]).unwrap();
        }
        out
    }

    #[test]
    fn mixed_generators_of_random_states() {
        let mut rng = StdRng::seed_from_u64(10546);
        let prop = CircuitPropagator::new();
        for _ in 0..5 {
            let c = Circuit::random_clifford(8, 8, &mut rng);
            let tab = prop.propagate(&c).unwrap();
            let stabs = tab.stabilizers().to_vec();
            let other = mixed(&stabs, &mut rng);
            let cs = SatEncoder::encode_groups(&stabs, &other).unwrap();
            assert_eq!(solve(&cs, true), SolveStatus::Sat);

            let mut flipped = other.clone();
            let ph = flipped[3].phase();
            flipped[3].set_phase(-ph);
            let cs = SatEncoder::encode_groups(&stabs, &flipped).unwrap();
            assert_eq!(solve(&cs, false), SolveStatus::Sat);
            assert_eq!(solve(&cs, true), SolveStatus::Unsat);
        }
    }

    #[test]
    fn choi_encoding_resolves_every_coefficient() {
        let mut rng = StdRng::seed_from_u64(10546);
        let c = Circuit::random_clifford(6, 6, &mut rng);
        let tab = CircuitPropagator::new().propagate(&c).unwrap();
        let cs = SatEncoder::encode(&tab, &tab).unwrap();
        // only the σ implications are binary; everything else is a unit
        assert_eq!(cs.arity_counts().binary, 2 * 12);
        assert_eq!(cs.arity_counts().ternary, 0);
        assert_eq!(cs.arity_counts().n_ary, 0);
        assert_eq!(solve(&cs, true), SolveStatus::Sat);
    }

    #[test]
    fn preprocessing_off_keeps_full_constraints() {
        let mut rng = StdRng::seed_from_u64(10546);
        let prop = CircuitPropagator::new();
        let c = Circuit::random_clifford(3, 3, &mut rng);
        let tab = prop.propagate(&c).unwrap();
        let mut flipped = c.clone();
        flipped.z(1);
        let tab_flipped = prop.propagate(&flipped).unwrap();

        let full = |a: &StabilizerTableau, b: &StabilizerTableau| {
            let mut enc = SatEncoder::new().preprocessing(false);
            enc.add_tableaux(a, b).unwrap();
            enc.finish()
        };
        let reduced = SatEncoder::encode(&tab, &tab).unwrap();
        let cs = full(&tab, &tab);
        assert_eq!(reduced.arity_counts().ternary, 0);
        assert!(cs.arity_counts().ternary > 0);
        assert!(cs.num_vars() > reduced.num_vars());
        assert_eq!(cs.num_generators(), reduced.num_generators());
        assert_eq!(solve(&cs, true), SolveStatus::Sat);

        let cs = full(&tab, &tab_flipped);
        assert_eq!(solve(&cs, false), SolveStatus::Sat);
        assert_eq!(solve(&cs, true), SolveStatus::Unsat);

        let mut enc = SatEncoder::new().preprocessing(false);
        enc.add_pair(&[ps("XX"), ps("ZZ")], &[ps("Z."), ps(".Z")]).unwrap();
        assert_eq!(solve(&enc.finish(), false), SolveStatus::Unsat);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(10546);
        let c = Circuit::random_clifford(5, 5, &mut rng);
        let d = Circuit::random_clifford(5, 5, &mut rng);
        let prop = CircuitPropagator::new();
        let (ta, tb) = (prop.propagate(&c).unwrap(), prop.propagate(&d).unwrap());
        let first = SatEncoder::encode(&ta, &tb).unwrap().to_string();
        let second = SatEncoder::encode(&ta, &tb).unwrap().to_string();
        assert_eq!(first, second);
        assert!(first.starts_with("c assume 1\np cnf "));
    }
}
