//! Exactly-one constraints over flight literals.
//!
//! Every encoding adds an at-least-one clause and an at-most-one part built
//! by `rustsat`'s at-most-one encoders. Auxiliary variables are numbered
//! after [`WeightedCnf::num_vars`], so they never collide with flight
//! variables or with each other.

use crate::error::{Error, Result};
use crate::formula::{Lit, WeightedCnf};
use rustsat::encodings::am1::{Bitwise, Encode, Ladder, Pairwise};
use rustsat::instances::{BasicVarManager, Cnf, ManageVars};
use rustsat::types::{Lit as RsLit, Var};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEncoding {
    /// Binary at-most-one: one auxiliary bit per `ceil(log2 n)`.
    Bitwise,
    /// All pairs excluded; quadratic, no auxiliaries.
    Pairwise,
    /// Sequential counter (ladder) with `n - 1` auxiliaries.
    Sequential,
}

impl Default for CardEncoding {
    fn default() -> Self {
        CardEncoding::Bitwise
    }
}

impl FromStr for CardEncoding {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bitwise" => Ok(CardEncoding::Bitwise),
            "pairwise" => Ok(CardEncoding::Pairwise),
            "sequential" | "ladder" => Ok(CardEncoding::Sequential),
            _ => Err(format!("unknown encoding '{}' (bitwise, pairwise, sequential)", s)),
        }
    }
}

impl fmt::Display for CardEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CardEncoding::Bitwise => "bitwise",
            CardEncoding::Pairwise => "pairwise",
            CardEncoding::Sequential => "sequential",
        };
        write!(f, "{}", name)
    }
}

/// Exactly one of `lits` is true. An empty set gives the empty clause.
pub fn exactly_one(cnf: &mut WeightedCnf, lits: &[Lit], encoding: CardEncoding) -> Result<()> {
    cnf.add_hard(lits.to_vec());
    at_most_one(cnf, lits, encoding)
}

pub fn at_most_one(cnf: &mut WeightedCnf, lits: &[Lit], encoding: CardEncoding) -> Result<()> {
    if lits.len() < 2 {
        return Ok(());
    }
    let inputs = lits.iter().map(|l| to_rustsat(*l));
    match encoding {
        CardEncoding::Bitwise => encode_with(cnf, inputs.collect::<Bitwise>()),
        CardEncoding::Pairwise => encode_with(cnf, inputs.collect::<Pairwise>()),
        CardEncoding::Sequential => encode_with(cnf, inputs.collect::<Ladder>()),
    }
}

// rustsat variables are 0-based, ours start at 1.
fn to_rustsat(lit: Lit) -> RsLit {
    debug_assert!(lit != 0);
    let var = Var::new(lit.unsigned_abs() - 1);
    if lit > 0 { var.pos_lit() } else { var.neg_lit() }
}

fn encode_with<E: Encode>(cnf: &mut WeightedCnf, mut encoder: E) -> Result<()> {
    let mut var_manager = BasicVarManager::default();
    var_manager.increase_next_free(Var::new(cnf.num_vars()));

    let mut clauses = Cnf::new();
    encoder.encode(&mut clauses, &mut var_manager)
        .map_err(|e| Error::Encoding(format!("{:?}", e)))?;

    cnf.reserve_vars(var_manager.n_used());
    for clause in clauses {
        cnf.add_hard(clause.iter().map(|l| l.to_ipasir()).collect());
    }
    Ok(())
}
