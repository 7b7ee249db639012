use thiserror::Error;

/// Unified error type for `hsolve` operations.
///
/// A vanishing update denominator is not an error: it surfaces as an
/// infinite or NaN entry in the solution array and keeps flowing through the
/// iteration like any other value.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Raised before iterating when a solver parameter is unusable.
    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfiguration {
        /// Name of the offending option.
        parameter: &'static str,
        /// Human-readable explanation of the constraint that was violated.
        reason: String,
    },

    /// Raised when two arrays that must share the grid length disagree.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required length, usually the grid size.
        expected: usize,
        /// The length that was actually supplied.
        found: usize,
    },

    /// Raised only when a tolerance is configured and convergence was required.
    #[error("iteration did not converge after {iterations} iterations; last residual {residual}")]
    DidNotConverge {
        /// Number of outer iterations performed.
        iterations: usize,
        /// Residual observed on the final iteration.
        residual: f64,
    },

    /// Raised when a cancellation flag is observed between outer iterations.
    #[error("iteration cancelled after {iterations} iterations")]
    Cancelled {
        /// Number of outer iterations completed before the flag was seen.
        iterations: usize,
    },

    /// Raised when reading configuration or writing output fails.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// Raised while reading or writing JSON.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SolveError {
    /// Helper to format an [`InvalidConfiguration`](SolveError::InvalidConfiguration) error.
    pub fn invalid<S: Into<String>>(parameter: &'static str, reason: S) -> Self {
        Self::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }

    /// Helper to format a [`DimensionMismatch`](SolveError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_not_tied_to_export() {
        let err: SolveError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "hsolve.json").into();
        assert_eq!(err.to_string(), "i/o failure: hsolve.json");
    }
}
