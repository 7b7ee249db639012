//! Successive-substitution solver for a nonlinear H-type integral equation on `[0, 1]`.
//!
//! The unknown `h(u)` is discretized on a uniform midpoint grid of `n` cells and
//! iterated to a fixed point. Every outer iteration
//!
//! - evaluates the discretized integral term at each grid index (`quadrature` module),
//! - maps it to a candidate iterate through the closed-form rearrangement (`update` module),
//! - measures the RMS change against the previous iterate (`residual` module), and
//! - blends candidate and previous iterate by a relaxation weight (`relaxation` module).
//!
//! The `driver` module orchestrates that loop and hands the final iterate, paired
//! with the grid abscissas, to reporting consumers through [`Solution`].
//!
//! # Quick start
//!
//! ```no_run
//! use hsolve::{IterationDriver, LogProgress, SolverOptions};
//!
//! let options = SolverOptions::default()
//!     .with_grid_size(200)
//!     .with_kernel_weight(0.5)
//!     .max_iters(100);
//!
//! let solution = IterationDriver::new(options)
//!     .expect("valid options")
//!     .run_with(&mut LogProgress)
//!     .expect("iteration finished");
//!
//! for (u, h) in solution.points() {
//!     println!("{u} {h}");
//! }
//! ```
//!
//! Index 0 of the solution is never written by the quadrature or update stages,
//! so with undamped relaxation it collapses to zero after the first iteration.

pub mod driver;
pub mod error;
pub mod grid;
pub mod quadrature;
pub mod relaxation;
pub mod residual;
pub mod solution;
pub mod solving;
pub mod update;

pub use driver::{
    solve, DriverState, IterationDriver, IterationRecord, LogProgress, ProgressObserver,
    ResidualHistory,
};
pub use error::{Result, SolveError};
pub use solution::Solution;
pub use solving::{SolveSummary, SolverOptions, TerminationReason};
