// src/error.rs

use thiserror::Error;

/// Broad classification of a [`VectorFieldPcaError`].
///
/// Callers that only need to know whether the inputs were rejected, or whether
/// the numerics broke down, can match on this instead of the full error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input is missing or a parameter is out of range.
    Configuration,
    /// Two inputs disagree on shape or size.
    ShapeMismatch,
    /// The eigensolver could not produce a usable decomposition.
    NumericalFailure,
    /// Saving or loading a result set failed.
    Persistence,
}

/// Errors raised by the vector field PCA pipeline.
#[derive(Error, Debug)]
pub enum VectorFieldPcaError {
    #[error("Vector field set not specified or empty.")]
    EmptyFieldSet,

    #[error("Component count ({requested}) must satisfy 0 < n <= vector field set size ({set_size}).")]
    InvalidComponentCount { requested: usize, set_size: usize },

    #[error("A kernel function is set but no point set is available.")]
    MissingPointSet,

    #[error("Kernel sigma must be finite and strictly positive, but was {0}.")]
    InvalidKernelSigma(f64),

    #[error("Eigenvalue epsilon must be finite and non-negative, but was {0}.")]
    InvalidEigenvalueEpsilon(f64),

    #[error(
        "Vector field {index} dimensions (rows, cols) = {found:?} do not match the other vector field dimensions {expected:?}."
    )]
    FieldShapeMismatch {
        index: usize,
        found: (usize, usize),
        expected: (usize, usize),
    },

    #[error("Point set count ({points}) does not match vector field point count ({rows}).")]
    PointCountMismatch { points: usize, rows: usize },

    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    #[error("Result persistence failed: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VectorFieldPcaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFieldSet
            | Self::InvalidComponentCount { .. }
            | Self::MissingPointSet
            | Self::InvalidKernelSigma(_)
            | Self::InvalidEigenvalueEpsilon(_) => ErrorKind::Configuration,
            Self::FieldShapeMismatch { .. } | Self::PointCountMismatch { .. } => {
                ErrorKind::ShapeMismatch
            }
            Self::NumericalFailure(_) => ErrorKind::NumericalFailure,
            Self::Persistence(_) | Self::Io(_) => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, VectorFieldPcaError>;
