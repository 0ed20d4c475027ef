//! Error types for shape construction.

use std::error::Error;
use std::fmt;

/// A tensor shape or index region was constructed from inconsistent inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// Dimension, rank, symmetry or extent values are not admissible.
    InvalidShape {
        /// Human-readable description of the violated constraint.
        reason: String,
    },
}

impl ShapeError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
        }
    }
}

impl Error for ShapeError {}
