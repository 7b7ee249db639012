//! Closed-form update that turns quadrature terms into the next candidate iterate.

use nalgebra::DVector;

use crate::error::{Result, SolveError};

/// Applies `h_new[i] = h[i] - 1 / (1 - (w / 2n) * terms[i])` for `i` in `1..n`.
///
/// Index 0 of the result stays at zero. A denominator of exactly zero is not
/// guarded against and produces an infinite (or NaN) entry.
pub fn apply_update(
    h: &DVector<f64>,
    integral_terms: &DVector<f64>,
    w: f64,
    n: usize,
) -> Result<DVector<f64>> {
    if h.len() != n {
        return Err(SolveError::dimension_mismatch("solution length", n, h.len()));
    }
    if integral_terms.len() != n {
        return Err(SolveError::dimension_mismatch(
            "integral term length",
            n,
            integral_terms.len(),
        ));
    }

    let scale = w / 2.0 / n as f64;
    let mut h_new = DVector::zeros(n);
    for i in 1..n {
        let final_term = 1.0 / (1.0 - scale * integral_terms[i]);
        h_new[i] = h[i] - final_term;
    }
    Ok(h_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_weight_subtracts_exactly_one() {
        let h = DVector::from_vec(vec![5.0, 1.0, -2.5, 10.0]);
        let terms = DVector::from_vec(vec![0.0, 123.0, -9.0, 1e9]);
        let h_new = apply_update(&h, &terms, 0.0, 4).unwrap();
        assert_eq!(h_new.as_slice(), &[0.0, 0.0, -3.5, 9.0]);
    }

    #[test]
    fn applies_closed_form() {
        let h = DVector::from_vec(vec![1.0, 1.0]);
        let terms = DVector::from_vec(vec![0.0, 2.0]);
        // scale = 0.5 / 4 = 0.125, denom = 0.75
        let h_new = apply_update(&h, &terms, 0.5, 2).unwrap();
        assert_eq!(h_new[0], 0.0);
        assert_relative_eq!(h_new[1], 1.0 - 1.0 / 0.75);
    }

    #[test]
    fn zero_denominator_propagates_infinity() {
        // scale = 1 / 4, so terms[1] = 4 gives a zero denominator.
        let h = DVector::from_vec(vec![1.0, 1.0]);
        let terms = DVector::from_vec(vec![0.0, 4.0]);
        let h_new = apply_update(&h, &terms, 1.0, 2).unwrap();
        assert!(h_new[1].is_infinite());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let h = DVector::from_element(3, 1.0);
        let terms = DVector::from_element(2, 1.0);
        assert!(matches!(
            apply_update(&h, &terms, 0.5, 3),
            Err(SolveError::DimensionMismatch { expected: 3, found: 2, .. })
        ));
    }
}
