//! Stratified core-guided optimization on top of an incremental SAT solver.
//!
//! Soft clauses become assumption literals. Assumptions are handed to the
//! solver heaviest first, in batches that grow while the solver keeps
//! answering SAT. Each unsatisfiable core raises the lower bound by its
//! cheapest member and is relaxed by a totalizer whose bound is extended
//! lazily each time the relaxation itself ends up in a core. The first SAT
//! answer with every soft constraint assumed is optimal.

use crate::error::Result;
use crate::formula::{self, WeightedCnf};
use crate::oracle::{Assignment, Oracle, Outcome};
use itertools::Itertools;
use log::*;
use satcoder::constraints::*;
use satcoder::solvers::cadical::Cadical as Solver;
use satcoder::*;
use std::collections::HashMap;
use std::iter::once;

pub const DEFAULT_STRATIFICATION: usize = 10;

/// [`Oracle`] backed by a fresh CaDiCaL instance per call.
#[derive(Debug, Clone)]
pub struct CadicalOracle {
    /// How many more soft constraints to assume each time a restricted
    /// problem turns out satisfiable.
    pub stratification: usize,
}

impl Default for CadicalOracle {
    fn default() -> Self {
        CadicalOracle { stratification: DEFAULT_STRATIFICATION }
    }
}

impl Oracle for CadicalOracle {
    fn solve(&mut self, formula: &WeightedCnf) -> Result<Outcome> {
        let mut solver = Solver::new();
        Ok(minimize(&mut solver, formula, self.stratification))
    }
}

enum Soft<L: Lit> {
    Undef,
    Relaxable(u64, Bool<L>, Option<(u64, Relax<L>)>),
    Constructable(u64, Relax<L>),
}

impl<L: Lit> Default for Soft<L> {
    fn default() -> Self {
        Soft::Undef
    }
}

impl<L: Lit> Soft<L> {
    fn weight(&self) -> u64 {
        match self {
            Soft::Relaxable(w, _, _) => *w,
            Soft::Constructable(w, _) => *w,
            Soft::Undef => 0,
        }
    }
}

enum Relax<L: Lit> {
    NewTotalizer { lits: Vec<Bool<L>>, bound: u32 },
    ExtendTotalizer(Totalizer<L>, u32),
}

enum Step<L> {
    Model(Vec<formula::Lit>),
    Core(Vec<L>),
}

pub fn minimize<L: Lit + std::fmt::Debug>(
    solver: &mut (impl SatInstance<L> + SatSolverWithCore<Lit = L>),
    formula: &WeightedCnf,
    stratification: usize,
) -> Outcome {
    if formula.hard().iter().any(|c| c.is_empty()) {
        info!("Empty hard clause, the problem is infeasible!");
        return Outcome::Infeasible;
    }

    let vars = (0..formula.num_vars()).map(|_| SatInstance::new_var(solver)).collect::<Vec<Bool<L>>>();
    let bool_of = |lit: formula::Lit| {
        let v = vars[lit.unsigned_abs() as usize - 1];
        if lit > 0 { v } else { !v }
    };

    for clause in formula.hard() {
        SatInstance::add_clause(solver, clause.iter().map(|l| bool_of(*l)));
    }

    let mut current_lb = 0;
    let mut soft: Vec<Soft<L>> = Vec::new();
    let mut soft_idx: HashMap<Bool<L>, usize> = HashMap::new();
    for (clause, weight) in formula.soft().iter().filter(|(_, w)| *w > 0) {
        let lit = match clause.as_slice() {
            [] => {
                current_lb = current_lb.saturating_add(*weight);
                continue;
            }
            [l] => bool_of(*l),
            lits => {
                let selector = SatInstance::new_var(solver);
                SatInstance::add_clause(solver, lits.iter().map(|l| bool_of(*l)).chain(once(!selector)));
                selector
            }
        };
        // Equal soft literals share one assumption.
        if let Some(idx) = soft_idx.get(&lit) {
            if let Soft::Relaxable(w, _, _) = &mut soft[*idx] {
                *w = w.saturating_add(*weight);
            }
        } else {
            soft_idx.insert(lit, soft.len());
            soft.push(Soft::Relaxable(*weight, lit, None));
        }
    }
    drop(soft_idx);

    info!("Optimizing {} vars, {} hard clauses, {} soft constraints",
          vars.len(), formula.hard().len(), soft.len());

    let step_size = stratification.max(1);
    let mut max_constraints = step_size;

    loop {
        soft.sort_by_key(|s| std::cmp::Reverse(s.weight()));
        debug!("Weight groups: {:?}", soft.iter().group_by(|s| s.weight()).into_iter()
               .map(|(w, g)| (w, g.count())).collect::<Vec<_>>());

        // Make sure the first `max_constraints` soft constraints have an
        // assumption literal.
        let mut n_assumptions = 0;
        while n_assumptions < soft.len() && n_assumptions < max_constraints {
            if let Soft::Relaxable(..) = &soft[n_assumptions] {
                n_assumptions += 1;
                continue;
            }

            match std::mem::take(&mut soft[n_assumptions]) {
                Soft::Constructable(cost, Relax::NewTotalizer { lits, bound }) => {
                    let tot = Totalizer::count(solver, lits, bound);
                    assert!((bound as usize) < tot.rhs().len(), "created an unnecessary totalizer");
                    let lit = !tot.rhs()[bound as usize];
                    soft[n_assumptions] = Soft::Relaxable(cost, lit, Some((cost, Relax::ExtendTotalizer(tot, bound + 1))));
                    n_assumptions += 1;
                }
                Soft::Constructable(cost, Relax::ExtendTotalizer(mut tot, bound)) => {
                    tot.increase_bound(solver, bound);
                    if (bound as usize) < tot.rhs().len() {
                        let lit = !tot.rhs()[bound as usize];
                        soft[n_assumptions] = Soft::Relaxable(cost, lit, Some((cost, Relax::ExtendTotalizer(tot, bound + 1))));
                        n_assumptions += 1;
                    } else {
                        soft.remove(n_assumptions);
                    }
                }
                _ => unreachable!("soft constraint without representation"),
            }
        }

        let assumptions = soft[..n_assumptions].iter().map(|s| match s {
            Soft::Relaxable(_, lit, _) => *lit,
            _ => unreachable!("assumed soft constraint is not relaxable"),
        }).collect::<Vec<Bool<L>>>();
        assert!(assumptions.iter().all(|l| l.lit().is_some()));
        let lit_map: HashMap<Bool<L>, usize> = assumptions.iter().copied().enumerate().map(|(idx, l)| (l, idx)).collect();

        info!("Solving with {}/{} assumptions, weights {} to {}, LB {}",
              n_assumptions, soft.len(),
              soft[..n_assumptions].iter().map(|s| s.weight()).min().unwrap_or(0),
              soft[..n_assumptions].iter().map(|s| s.weight()).max().unwrap_or(0),
              current_lb);

        let step = match solver.solve_with_assumptions(assumptions.iter().copied()) {
            SatResultWithCore::Sat(model) => Step::Model(
                vars.iter().enumerate().map(|(idx, v)| {
                    let var = idx as formula::Lit + 1;
                    if model.value(v) { var } else { -var }
                }).collect()),
            SatResultWithCore::Unsat(core) => Step::Core(core.iter().copied().collect()),
        };

        match step {
            Step::Model(values) => {
                if n_assumptions < soft.len() {
                    let old = max_constraints;
                    max_constraints += step_size;
                    info!("Increasing number of soft constraints from {} to {}.", old, max_constraints);
                } else {
                    let assignment = Assignment::new(values);
                    let cost = formula.cost_of(|l| assignment.value(l));
                    info!("All done, optimum found at cost {} (LB {})", cost, current_lb);
                    return Outcome::Optimal { assignment, cost };
                }
            }
            Step::Core(core) => {
                if core.is_empty() {
                    info!("The problem is infeasible!");
                    return Outcome::Infeasible;
                }
                debug!("Conflict set: {:?}", core);

                let conflict_cost = core.iter()
                    .map(|l| soft[lit_map[&Bool::Lit(*l)]].weight())
                    .min()
                    .unwrap_or(0);
                debug!("Conflict cost {}", conflict_cost);

                let mut remove_softs = Vec::new();
                for l in core.iter().copied() {
                    let idx = lit_map[&Bool::Lit(l)];
                    let mut replacement = None;
                    if let Soft::Relaxable(cost, _, relax) = &mut soft[idx] {
                        assert!(*cost >= conflict_cost);
                        if *cost > conflict_cost {
                            *cost -= conflict_cost;
                        } else if let Some((new_cost, relax)) = relax.take() {
                            replacement = Some(Soft::Constructable(new_cost, relax));
                        } else {
                            remove_softs.push(idx);
                        }
                    } else {
                        panic!("conflict includes not-yet-constructed constraint");
                    }
                    if let Some(r) = replacement {
                        soft[idx] = r;
                    }
                }

                remove_softs.sort_unstable_by(|a, b| b.cmp(a));
                for idx in remove_softs {
                    soft.remove(idx);
                }

                if core.len() > 1 {
                    soft.push(Soft::Constructable(conflict_cost, Relax::NewTotalizer {
                        lits: core.iter().map(|l| Bool::Lit(!*l)).collect(),
                        bound: 1,
                    }));
                } else {
                    SatInstance::add_clause(solver, vec![Bool::Lit(!core[0])]);
                }

                let old_lb = current_lb;
                current_lb = current_lb.saturating_add(conflict_cost);
                info!("LB increased from {} to {}", old_lb, current_lb);
            }
        }
    }
}
