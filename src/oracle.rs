//! The solver oracle seam: anything that can optimize a [`WeightedCnf`].

use crate::error::Result;
use crate::formula::{Lit, WeightedCnf};
use crate::model::FlightId;

/// A weighted MaxSAT solver.
///
/// Implementations return `Outcome::Optimal` with an assignment covering
/// every variable `1..=formula.num_vars()` and the total weight of the soft
/// clauses it violates, or `Outcome::Infeasible` when the hard clauses have
/// no model. Errors are reserved for failures of the oracle itself.
pub trait Oracle {
    fn solve(&mut self, formula: &WeightedCnf) -> Result<Outcome>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn solve(&mut self, formula: &WeightedCnf) -> Result<Outcome> {
        (**self).solve(formula)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Optimal { assignment: Assignment, cost: u64 },
    Infeasible,
}

impl Outcome {
    pub fn cost(&self) -> Option<u64> {
        match self {
            Outcome::Optimal { cost, .. } => Some(*cost),
            Outcome::Infeasible => None,
        }
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Outcome::Optimal { assignment, .. } => Some(assignment),
            Outcome::Infeasible => None,
        }
    }
}

/// A model as signed literals, entry `i` holding `±(i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment(Vec<Lit>);

impl Assignment {
    pub fn new(values: Vec<Lit>) -> Assignment {
        debug_assert!(values.iter().enumerate().all(|(i, l)| l.unsigned_abs() as usize == i + 1));
        Assignment(values)
    }

    /// Exactly the given flights true, every other variable up to
    /// `num_vars` false.
    pub fn from_selected(num_vars: u32, selected: impl IntoIterator<Item = FlightId>) -> Assignment {
        let mut values = (1..=num_vars as Lit).map(|v| -v).collect::<Vec<_>>();
        for f in selected {
            values[f.get() as usize - 1] = f.lit();
        }
        Assignment(values)
    }

    /// Truth value of a literal. Variables outside the model are false.
    pub fn value(&self, lit: Lit) -> bool {
        let value = (lit.unsigned_abs() as usize).checked_sub(1).and_then(|idx| self.0.get(idx));
        match value {
            Some(v) => (*v > 0) == (lit > 0),
            None => lit < 0,
        }
    }

    pub fn is_selected(&self, flight: FlightId) -> bool {
        self.value(flight.lit())
    }

    pub fn num_vars(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn as_slice(&self) -> &[Lit] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_values() {
        let a = Assignment::new(vec![1, -2, 3]);
        assert!(a.value(1));
        assert!(!a.value(-1));
        assert!(a.value(-2));
        assert!(!a.value(2));
        assert!(!a.value(7));
        assert!(a.value(-7));
        assert!(a.is_selected(FlightId::new(3)));
        assert!(!a.is_selected(FlightId::new(2)));
    }

    #[test]
    fn assignment_from_selection() {
        let a = Assignment::from_selected(4, vec![FlightId::new(2), FlightId::new(4)]);
        assert_eq!(a.as_slice(), &[-1, 2, -3, 4]);
        assert_eq!(a.num_vars(), 4);
    }

    #[test]
    fn outcome_accessors() {
        let o = Outcome::Optimal { assignment: Assignment::new(vec![-1]), cost: 0 };
        assert_eq!(o.cost(), Some(0));
        assert!(o.assignment().is_some());
        assert_eq!(Outcome::Infeasible.cost(), None);
    }
}
