//! Discretized integral operator evaluated once per outer iteration.
//!
//! For every outer index `i >= 1` the operator accumulates
//!
//! ```text
//! sum_{j=1}^{n-1} (u_i * h[i]) / (u_i + u_j),   u_k = (k - 0.5) / n
//! ```
//!
//! Index 0 is never computed and stays at zero. The numerator carries `h` at the
//! outer index for every term of the inner sum.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{Result, SolveError};
use crate::grid::quadrature_node;

/// Computes the integral term for every grid index of `h`.
pub fn compute_integral_terms(h: &DVector<f64>) -> DVector<f64> {
    QuadratureOperator::new(h.len()).evaluate(h)
}

/// Quadrature operator with the `(k - 0.5) / n` nodes cached for a fixed grid size.
#[derive(Clone, Debug)]
pub struct QuadratureOperator {
    nodes: Vec<f64>,
}

impl QuadratureOperator {
    /// Prepares the operator for arrays of length `n`.
    pub fn new(n: usize) -> Self {
        let nodes = (0..n).map(|k| quadrature_node(k, n)).collect();
        Self { nodes }
    }

    /// Length of the arrays this operator accepts.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when built for an empty grid.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Evaluates the operator on `h`, which must have the length the operator was built for.
    ///
    /// Outer indices are independent and evaluated in parallel; each inner sum is
    /// accumulated sequentially in `j` order, so the result does not depend on the
    /// thread count.
    pub fn apply(&self, h: &DVector<f64>) -> Result<DVector<f64>> {
        if h.len() != self.nodes.len() {
            return Err(SolveError::dimension_mismatch(
                "quadrature operand",
                self.nodes.len(),
                h.len(),
            ));
        }
        Ok(self.evaluate(h))
    }

    fn evaluate(&self, h: &DVector<f64>) -> DVector<f64> {
        let n = self.nodes.len();
        let mut terms = DVector::zeros(n);
        if n < 2 {
            return terms;
        }

        let nodes = &self.nodes;
        let inner = &nodes[1..];
        terms.as_mut_slice()[1..]
            .par_iter_mut()
            .enumerate()
            .for_each(|(offset, out)| {
                let i = offset + 1;
                let ui = nodes[i];
                let numerator = ui * h[i];
                *out = inner.iter().fold(0.0, |acc, uj| acc + numerator / (ui + uj));
            });
        terms
    }
}
