//! Solver configuration and diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};
use crate::relaxation::Relaxation;
use crate::solution::{serialize_float, serialize_floats};

/// Configuration for the successive-substitution iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Number of midpoint cells `n` on `[0, 1]`.
    pub grid_size: usize,
    /// Kernel weight `w` entering the update denominator `1 - (w / 2n) * I_i`.
    pub kernel_weight: f64,
    /// Relaxation weight `alpha` blending candidate and previous iterate (1.0 is undamped).
    pub relaxation: f64,
    /// Number of outer iterations to run.
    pub max_iterations: usize,
    /// Optional early-exit threshold on the RMS residual. `None` always runs the full cap.
    pub tolerance: Option<f64>,
    /// Whether reaching the cap without meeting `tolerance` is an error.
    pub require_convergence: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            grid_size: 500,
            kernel_weight: 0.5,
            relaxation: 1.0,
            max_iterations: 1_000,
            tolerance: None,
            require_convergence: false,
        }
    }
}

impl SolverOptions {
    /// Override the grid size while preserving other defaults.
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Override the kernel weight `w`.
    pub fn with_kernel_weight(mut self, kernel_weight: f64) -> Self {
        self.kernel_weight = kernel_weight;
        self
    }

    /// Override the relaxation weight `alpha`.
    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Set the number of outer iterations.
    pub fn max_iters(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable early exit once the residual drops below `tolerance`.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Turn a missed tolerance into [`SolveError::DidNotConverge`].
    pub fn require_convergence(mut self, require: bool) -> Self {
        self.require_convergence = require;
        self
    }

    /// Checks every parameter and returns the validated relaxation weight.
    ///
    /// The relaxation weight must lie in `[0, 1]`; the kernel weight may take any
    /// finite value.
    pub fn validate(&self) -> Result<Relaxation> {
        if self.grid_size == 0 {
            return Err(SolveError::invalid(
                "grid_size",
                "at least one grid cell is required",
            ));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::invalid(
                "max_iterations",
                "at least one iteration is required",
            ));
        }
        if !self.kernel_weight.is_finite() {
            return Err(SolveError::invalid(
                "kernel_weight",
                format!("must be finite, found {}", self.kernel_weight),
            ));
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(SolveError::invalid(
                    "tolerance",
                    format!("must be positive and finite, found {tolerance}"),
                ));
            }
        } else if self.require_convergence {
            return Err(SolveError::invalid(
                "require_convergence",
                "a tolerance must be set when convergence is required",
            ));
        }
        Relaxation::new(self.relaxation)
    }
}

/// Why the iteration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The iteration cap was exhausted.
    MaxIterationsReached,
    /// The residual dropped below the configured tolerance.
    ToleranceReached,
}

impl TerminationReason {
    fn text(self) -> &'static str {
        match self {
            TerminationReason::MaxIterationsReached => "maximum number of iterations reached",
            TerminationReason::ToleranceReached => "target tolerance reached",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Diagnostics returned alongside the final iterate.
///
/// Non-finite residuals serialize as the strings `"inf"`, `"-inf"` and `"NaN"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolveSummary {
    /// Number of outer iterations performed.
    pub iterations: usize,
    /// Residual of the last iteration (NaN if none ran).
    #[serde(serialize_with = "serialize_float")]
    pub final_residual: f64,
    /// Reason the driver stopped.
    pub termination: TerminationReason,
    /// Residual of every iteration, in order.
    #[serde(serialize_with = "serialize_floats")]
    pub residuals: Vec<f64>,
}

impl SolveSummary {
    /// True when the residual met the configured tolerance.
    pub fn converged(&self) -> bool {
        self.termination == TerminationReason::ToleranceReached
    }
}
