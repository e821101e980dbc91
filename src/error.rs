//! Error types for parsing, lookups and solving

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, encoding or solving a trip.
///
/// An infeasible trip is not an error; see [`crate::oracle::Outcome::Infeasible`].
#[derive(Debug, Error)]
pub enum Error {
    /// The input ended before a required line
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A line has the wrong number of fields
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// A field that should be a non-negative integer is not
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    /// A field that should be a `DD/MM` date is not
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    /// A flight refers to a city code that was never declared
    #[error("unknown city code '{0}'")]
    UnknownCity(String),

    /// The same city code is declared twice
    #[error("duplicate city code '{0}'")]
    DuplicateCity(String),

    /// The fares of all flights together do not fit in a `u64`
    #[error("total flight cost overflows at fare {0}")]
    CostOverflow(u64),

    /// Any of the above, located at a 1-based input line
    #[error("line {line}: {source}")]
    Line { line: usize, source: Box<Error> },

    /// A cardinality encoder could not build its clauses
    #[error("encoding failure: {0}")]
    Encoding(String),

    /// The solver oracle failed
    #[error("solver failure: {0}")]
    Oracle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attaches an input line number to this error.
    pub fn at_line(self, line: usize) -> Error {
        match self {
            Error::Line { .. } => self,
            other => Error::Line { line, source: Box::new(other) },
        }
    }
}
