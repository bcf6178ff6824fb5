// src/error.rs

use crate::io::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    /// Declared atom total disagrees with the rows actually present.
    #[error("atom numbers mismatch: declared {declared}, found {found}")]
    StructureValue { declared: usize, found: usize },

    #[error("shape mismatch: expected {expected} rows, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("atom type '{0}' is listed more than once")]
    DuplicateType(String),

    #[error("lattice basis is singular (determinant {determinant:e})")]
    SingularBasis { determinant: f64 },

    #[error("system has no lattice basis")]
    MissingLattice,

    #[error("invalid constraint flag '{0}' (expected T or F)")]
    InvalidFlag(String),

    #[error("invalid axis '{0}' (expected x, y, z or all)")]
    InvalidAxis(String),

    #[error("the '{0}' format is not supported for this write operation")]
    UnsupportedWrite(Format),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
