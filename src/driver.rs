//! Iteration driver: grid setup, the outer substitution loop, and termination.
//!
//! The driver moves through three states:
//!
//! - `Init`: grid built, solution set to all ones, no iteration performed yet;
//! - `Iterating`: at least one outer iteration has run and the cap has not been hit;
//! - `Done`: the cap was exhausted (or the optional tolerance met) and the final
//!   iterate is ready to hand off.
//!
//! Each outer iteration runs quadrature, update, residual, and relaxation on the
//! retained iterate of the previous pass, then reports `(iteration, residual)`
//! to a [`ProgressObserver`].

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, trace, warn};
use nalgebra::DVector;

use crate::error::{Result, SolveError};
use crate::grid::Grid;
use crate::quadrature::QuadratureOperator;
use crate::relaxation::Relaxation;
use crate::residual::residual;
use crate::solution::Solution;
use crate::solving::{SolveSummary, SolverOptions, TerminationReason};
use crate::update::apply_update;

/// Lifecycle of an [`IterationDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Grid built and solution set to all ones; nothing has run yet.
    Init,
    /// At least one iteration completed and the driver has not stopped.
    Iterating,
    /// The final iterate is ready to hand off.
    Done,
}

/// One completed outer iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationRecord {
    /// Zero-based index of the iteration.
    pub iteration: usize,
    /// RMS distance between the candidate and the previous iterate.
    pub residual: f64,
}

/// Sink for per-iteration progress, called once per completed iteration in order.
pub trait ProgressObserver {
    /// Receives the record of the iteration that just completed.
    fn on_iteration(&mut self, record: IterationRecord);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, f64),
{
    fn on_iteration(&mut self, record: IterationRecord) {
        self(record.iteration, record.residual)
    }
}

/// Reports progress through the `log` facade at `info` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_iteration(&mut self, record: IterationRecord) {
        info!("iteration {} residual {:e}", record.iteration, record.residual);
    }
}

/// Collects every residual in iteration order.
#[derive(Clone, Debug, Default)]
pub struct ResidualHistory {
    records: Vec<IterationRecord>,
}

impl ResidualHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records seen so far.
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Residual values seen so far.
    pub fn residuals(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.residual).collect()
    }
}

impl ProgressObserver for ResidualHistory {
    fn on_iteration(&mut self, record: IterationRecord) {
        self.records.push(record);
    }
}

/// Drives the successive-substitution loop for one configuration.
#[derive(Clone, Debug)]
pub struct IterationDriver {
    options: SolverOptions,
    relaxation: Relaxation,
    grid: Grid,
    operator: QuadratureOperator,
    solution: DVector<f64>,
    state: DriverState,
    residuals: Vec<f64>,
    termination: Option<TerminationReason>,
    reported_non_finite: bool,
}

impl IterationDriver {
    /// Validates `options` and performs the INIT step.
    pub fn new(options: SolverOptions) -> Result<Self> {
        let relaxation = options.validate()?;
        let n = options.grid_size;
        let grid = Grid::new(n)?;
        Ok(Self {
            relaxation,
            grid,
            operator: QuadratureOperator::new(n),
            solution: DVector::from_element(n, 1.0),
            state: DriverState::Init,
            residuals: Vec::with_capacity(options.max_iterations),
            termination: None,
            reported_non_finite: false,
            options,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Options the driver was validated against.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Midpoint grid shared with the final solution.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Retained iterate after the most recent completed iteration.
    pub fn current(&self) -> &DVector<f64> {
        &self.solution
    }

    /// Number of completed outer iterations.
    pub fn iterations(&self) -> usize {
        self.residuals.len()
    }

    /// Performs one outer iteration. Returns `None` once the driver is done.
    pub fn step(&mut self) -> Result<Option<IterationRecord>> {
        if self.state == DriverState::Done {
            return Ok(None);
        }
        self.state = DriverState::Iterating;

        let n = self.options.grid_size;
        let previous = &self.solution;
        let terms = self.operator.apply(previous)?;
        let candidate = apply_update(previous, &terms, self.options.kernel_weight, n)?;
        let residual = residual(&candidate, previous)?;
        let retained = self.relaxation.apply(&candidate, previous)?;
        self.solution = retained;

        let record = IterationRecord {
            iteration: self.residuals.len(),
            residual,
        };
        self.residuals.push(residual);
        trace!("iteration {} residual {:e}", record.iteration, residual);

        if !residual.is_finite() && !self.reported_non_finite {
            warn!(
                "non-finite residual {} at iteration {}; continuing",
                residual, record.iteration
            );
            self.reported_non_finite = true;
        }

        // NaN never satisfies the tolerance, so a diverged run keeps iterating.
        let termination = match self.options.tolerance {
            Some(tolerance) if residual < tolerance => Some(TerminationReason::ToleranceReached),
            _ if self.residuals.len() >= self.options.max_iterations => {
                Some(TerminationReason::MaxIterationsReached)
            }
            _ => None,
        };
        if let Some(reason) = termination {
            debug!("stopping after {} iterations: {}", self.residuals.len(), reason);
            self.termination = Some(reason);
            self.state = DriverState::Done;
        }

        Ok(Some(record))
    }

    /// Runs to completion without reporting progress.
    pub fn run(self) -> Result<Solution> {
        self.run_with(&mut |_: usize, _: f64| {})
    }

    /// Runs to completion, reporting every iteration to `observer`.
    pub fn run_with<O: ProgressObserver + ?Sized>(self, observer: &mut O) -> Result<Solution> {
        self.run_with_cancellation(observer, &AtomicBool::new(false))
    }

    /// Runs to completion, checking `cancel` before every outer iteration.
    pub fn run_with_cancellation<O: ProgressObserver + ?Sized>(
        mut self,
        observer: &mut O,
        cancel: &AtomicBool,
    ) -> Result<Solution> {
        debug!(
            "starting substitution: n = {}, w = {}, alpha = {}, max_iterations = {}",
            self.options.grid_size,
            self.options.kernel_weight,
            self.relaxation.weight(),
            self.options.max_iterations
        );
        while self.state != DriverState::Done {
            if cancel.load(Ordering::Relaxed) {
                debug!("cancelled after {} iterations", self.iterations());
                return Err(SolveError::Cancelled {
                    iterations: self.iterations(),
                });
            }
            if let Some(record) = self.step()? {
                observer.on_iteration(record);
            }
        }
        self.finish()
    }

    fn finish(self) -> Result<Solution> {
        let termination = self
            .termination
            .unwrap_or(TerminationReason::MaxIterationsReached);
        let final_residual = self.residuals.last().copied().unwrap_or(f64::NAN);

        if self.options.require_convergence && termination != TerminationReason::ToleranceReached {
            return Err(SolveError::DidNotConverge {
                iterations: self.residuals.len(),
                residual: final_residual,
            });
        }

        let summary = SolveSummary {
            iterations: self.residuals.len(),
            final_residual,
            termination,
            residuals: self.residuals,
        };
        Ok(Solution::new(self.grid, self.solution, summary))
    }
}

/// Convenience wrapper: validate, iterate to completion, and return the solution.
pub fn solve(options: SolverOptions) -> Result<Solution> {
    IterationDriver::new(options)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn driver_walks_through_states() {
        let options = SolverOptions::default().with_grid_size(4).max_iters(2);
        let mut driver = IterationDriver::new(options).unwrap();
        assert_eq!(driver.state(), DriverState::Init);
        assert_eq!(driver.current(), &DVector::from_element(4, 1.0));

        let first = driver.step().unwrap().unwrap();
        assert_eq!(first.iteration, 0);
        assert_eq!(driver.state(), DriverState::Iterating);

        let second = driver.step().unwrap().unwrap();
        assert_eq!(second.iteration, 1);
        assert_eq!(driver.state(), DriverState::Done);
        assert!(driver.step().unwrap().is_none());
        assert_eq!(driver.iterations(), 2);
    }

    #[test]
    fn zero_weight_first_iteration_matches_hand_computation() {
        let options = SolverOptions::default()
            .with_grid_size(2)
            .with_kernel_weight(0.0)
            .max_iters(1);
        let solution = solve(options).unwrap();
        assert_eq!(solution.values().as_slice(), &[0.0, 0.0]);
        assert_relative_eq!(solution.summary().final_residual, 0.5_f64.sqrt());
    }

    #[test]
    fn tolerance_stops_early() {
        // With n = 1 the residual is 1.0 on the first pass and 0 afterwards.
        let options = SolverOptions::default()
            .with_grid_size(1)
            .max_iters(50)
            .tolerance(0.5);
        let solution = solve(options).unwrap();
        assert_eq!(solution.summary().iterations, 2);
        assert!(solution.summary().converged());
    }
}
