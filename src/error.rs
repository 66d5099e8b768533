//! Typed errors raised while translating a scenario into a reliability model.
//!
//! These are returned wrapped in [`anyhow::Error`] so that file and region context can be attached
//! as they propagate. Callers wanting the specific failure can recover it with
//! [`anyhow::Error::downcast_ref`].
use thiserror::Error;

/// A failure that aborts building a reliability model
#[derive(Error, Debug)]
pub enum BuildError {
    /// Reliability or scenario parameters are invalid (e.g. zero repair time)
    #[error("invalid configuration for {subject}: {reason}")]
    Configuration {
        /// What the parameter belongs to (e.g. a category or region)
        subject: String,
        /// Which constraint was violated
        reason: String,
    },

    /// A technology category is missing from the classification table
    #[error(
        "technology category '{category}' (region '{region}') is missing from the technology \
        classification table"
    )]
    UnclassifiedCategory {
        /// The unknown category
        category: String,
        /// The region in which the category was found
        region: String,
    },

    /// Two series which must be timestep-aligned have different lengths
    #[error("{subject} has {found} timesteps but {expected} were expected")]
    ShapeMismatch {
        /// The offending series
        subject: String,
        /// The required number of timesteps
        expected: usize,
        /// The number of timesteps found
        found: usize,
    },

    /// A capacity or transfer limit is negative or not a number
    #[error("invalid capacity for {subject}: {value} (must be a finite, non-negative number)")]
    InvalidCapacity {
        /// The asset or corridor the capacity belongs to
        subject: String,
        /// The offending value
        value: f64,
    },

    /// The assembled model violates one of its structural invariants
    #[error("model integrity violated: {0}")]
    Integrity(String),
}

impl BuildError {
    /// Create a [`BuildError::Configuration`]
    pub fn configuration(subject: impl ToString, reason: impl ToString) -> Self {
        Self::Configuration {
            subject: subject.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a [`BuildError::ShapeMismatch`]
    pub fn shape_mismatch(subject: impl ToString, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            subject: subject.to_string(),
            expected,
            found,
        }
    }

    /// Create a [`BuildError::InvalidCapacity`]
    pub fn invalid_capacity(subject: impl ToString, value: f64) -> Self {
        Self::InvalidCapacity {
            subject: subject.to_string(),
            value,
        }
    }
}

/// Check that a series has the expected number of timesteps
pub fn check_series_len<T>(subject: &str, series: &[T], expected: usize) -> Result<(), BuildError> {
    if series.len() == expected {
        Ok(())
    } else {
        Err(BuildError::shape_mismatch(subject, expected, series.len()))
    }
}
