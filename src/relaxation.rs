//! Relaxation (linear damping) between the candidate and the previous iterate.

use nalgebra::DVector;

use crate::error::{Result, SolveError};

/// Blends `alpha * h_new + (1 - alpha) * h_prev` elementwise.
///
/// `alpha == 1` returns `h_new` and `alpha == 0` returns `h_prev` unchanged, even
/// when the discarded array holds non-finite values.
pub fn combine(h_new: &DVector<f64>, h_prev: &DVector<f64>, alpha: f64) -> Result<DVector<f64>> {
    if h_new.len() != h_prev.len() {
        return Err(SolveError::dimension_mismatch(
            "relaxation operands",
            h_prev.len(),
            h_new.len(),
        ));
    }
    if alpha == 1.0 {
        return Ok(h_new.clone());
    }
    if alpha == 0.0 {
        return Ok(h_prev.clone());
    }
    Ok(h_new * alpha + h_prev * (1.0 - alpha))
}

/// Validated relaxation weight in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Relaxation(f64);

impl Relaxation {
    /// No damping: the candidate iterate is retained as-is.
    pub const UNDAMPED: Relaxation = Relaxation(1.0);

    /// Validates `alpha`; values outside `[0, 1]` or non-finite values are rejected.
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(SolveError::invalid(
                "relaxation",
                format!("weight must lie in [0, 1], found {alpha}"),
            ));
        }
        Ok(Self(alpha))
    }

    /// Raw blend factor.
    pub fn weight(self) -> f64 {
        self.0
    }

    /// Applies [`combine`] with this weight.
    pub fn apply(self, h_new: &DVector<f64>, h_prev: &DVector<f64>) -> Result<DVector<f64>> {
        combine(h_new, h_prev, self.0)
    }
}

impl Default for Relaxation {
    fn default() -> Self {
        Self::UNDAMPED
    }
}
