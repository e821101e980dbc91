//! Weighted CNF formulas in DIMACS-style signed integer literals.

use crate::model::FlightId;
use std::fmt::Write;

/// A signed variable reference; `0` is never a valid literal.
pub type Lit = i32;

pub type Clause = Vec<Lit>;

/// Weighted partial MaxSAT instance: hard clauses, weighted soft clauses,
/// and a shared variable namespace `1..=num_vars`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedCnf {
    num_vars: u32,
    hard: Vec<Clause>,
    soft: Vec<(Clause, u64)>,
}

impl WeightedCnf {
    /// A formula whose first `num_vars` variables are already reserved.
    pub fn with_vars(num_vars: u32) -> Self {
        WeightedCnf { num_vars, ..Default::default() }
    }

    /// Allocates a fresh variable above every variable seen so far.
    pub fn new_var(&mut self) -> Lit {
        self.num_vars += 1;
        self.num_vars as Lit
    }

    pub fn num_vars(&self) -> u32 { self.num_vars }

    /// Makes sure variables `1..=num_vars` are all declared.
    pub fn reserve_vars(&mut self, num_vars: u32) {
        self.num_vars = self.num_vars.max(num_vars);
    }

    fn reserve(&mut self, clause: &[Lit]) {
        for lit in clause {
            debug_assert!(*lit != 0);
            self.num_vars = self.num_vars.max(lit.unsigned_abs());
        }
    }

    pub fn add_hard(&mut self, clause: Clause) {
        self.reserve(&clause);
        self.hard.push(clause);
    }

    pub fn add_soft(&mut self, clause: Clause, weight: u64) {
        self.reserve(&clause);
        self.soft.push((clause, weight));
    }

    pub fn hard(&self) -> &[Clause] { &self.hard }

    pub fn soft(&self) -> &[(Clause, u64)] { &self.soft }

    /// Forces the given flights to be taken.
    pub fn require_selected(&mut self, flights: impl IntoIterator<Item = FlightId>) {
        for flight in flights {
            self.add_hard(vec![flight.lit()]);
        }
    }

    /// Total weight of the soft clauses that `value` leaves unsatisfied,
    /// saturating at `u64::MAX`.
    pub fn cost_of(&self, value: impl Fn(Lit) -> bool) -> u64 {
        self.soft.iter()
            .filter(|(clause, _)| !clause.iter().any(|l| value(*l)))
            .fold(0u64, |acc, (_, w)| acc.saturating_add(*w))
    }

    /// One more than the total soft weight, the weight that marks hard
    /// clauses in WCNF. `None` when that does not fit in a `u64`.
    pub fn top(&self) -> Option<u64> {
        self.soft.iter()
            .try_fold(0u64, |acc, (_, w)| acc.checked_add(*w))?
            .checked_add(1)
    }

    /// Whether `value` satisfies every hard clause.
    pub fn satisfies_hard(&self, value: impl Fn(Lit) -> bool) -> bool {
        self.hard.iter().all(|clause| clause.iter().any(|l| value(*l)))
    }

    /// Writes the formula in the classic `p wcnf` format, hard clauses
    /// weighted with [`top`](Self::top). Zero-weight soft clauses are left
    /// out. Fails without writing anything when `top` overflows.
    pub fn write(&self, out: &mut impl Write) -> std::fmt::Result {
        let top = self.top().ok_or(std::fmt::Error)?;
        let soft = self.soft.iter().filter(|(_, w)| *w > 0).collect::<Vec<_>>();
        writeln!(out, "p wcnf {} {} {}", self.num_vars, self.hard.len() + soft.len(), top)?;
        for clause in self.hard.iter() {
            write!(out, "{}", top)?;
            for lit in clause.iter() {
                write!(out, " {}", lit)?;
            }
            writeln!(out, " 0")?;
        }
        for (clause, weight) in soft {
            write!(out, "{}", weight)?;
            for lit in clause.iter() {
                write!(out, " {}", lit)?;
            }
            writeln!(out, " 0")?;
        }
        Ok(())
    }
}
