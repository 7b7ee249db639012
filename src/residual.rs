//! Root-mean-square distance between successive iterates.

use nalgebra::DVector;

use crate::error::{Result, SolveError};

/// Computes `sqrt(sum_i (h_new[i] - h_prev[i])^2 / n)` over every index, index 0 included.
///
/// Non-finite entries yield a non-finite residual rather than an error.
pub fn residual(h_new: &DVector<f64>, h_prev: &DVector<f64>) -> Result<f64> {
    if h_new.len() != h_prev.len() {
        return Err(SolveError::dimension_mismatch(
            "residual operands",
            h_prev.len(),
            h_new.len(),
        ));
    }
    let n = h_new.len() as f64;
    let sum: f64 = h_new
        .iter()
        .zip(h_prev.iter())
        .map(|(new, prev)| (new - prev).powi(2) / n)
        .sum();
    Ok(sum.sqrt())
}
