//! Uniform midpoint grid on the unit interval.

use nalgebra::DVector;

use crate::error::{Result, SolveError};

/// Builds the `n` midpoint abscissas `u_i = (i + 0.5) / n` for `i` in `0..n`.
///
/// Every value lies strictly inside `(0, 1)` and the sequence is strictly increasing.
pub fn build_grid(n: usize) -> Result<DVector<f64>> {
    if n == 0 {
        return Err(SolveError::invalid("grid_size", "at least one grid cell is required"));
    }
    let size = n as f64;
    Ok(DVector::from_fn(n, |i, _| (i as f64 + 0.5) / size))
}

/// Abscissa used inside the quadrature sum: `(index - 0.5) / n`.
///
/// This is offset by one full cell from [`build_grid`]; the quadrature only ever
/// evaluates it for `index >= 1`.
#[inline]
pub fn quadrature_node(index: usize, n: usize) -> f64 {
    (index as f64 - 0.5) / n as f64
}

/// Midpoint grid together with its cell count.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    abscissas: DVector<f64>,
}

impl Grid {
    /// Constructs the grid with `n` cells.
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            abscissas: build_grid(n)?,
        })
    }

    /// Number of grid cells.
    pub fn len(&self) -> usize {
        self.abscissas.len()
    }

    /// Never true for a grid built by [`Grid::new`].
    pub fn is_empty(&self) -> bool {
        self.abscissas.is_empty()
    }

    /// Width of a single cell, `1 / n`.
    pub fn step(&self) -> f64 {
        1.0 / self.len() as f64
    }

    /// Read-only view of the abscissas.
    pub fn abscissas(&self) -> &DVector<f64> {
        &self.abscissas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_is_increasing_and_interior() {
        for n in [1usize, 2, 7, 500] {
            let grid = build_grid(n).unwrap();
            assert_eq!(grid.len(), n);
            for (i, u) in grid.iter().enumerate() {
                assert!(*u > 0.0 && *u < 1.0);
                assert_relative_eq!(*u, (i as f64 + 0.5) / n as f64);
            }
            for pair in grid.as_slice().windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn single_cell_grid_is_the_midpoint() {
        let grid = Grid::new(1).unwrap();
        assert_eq!(grid.abscissas()[0], 0.5);
        assert_eq!(grid.step(), 1.0);
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            build_grid(0),
            Err(SolveError::InvalidConfiguration { parameter: "grid_size", .. })
        ));
    }

    #[test]
    fn quadrature_node_lags_the_plot_grid_by_one_cell() {
        let grid = build_grid(4).unwrap();
        for i in 1..4 {
            assert_relative_eq!(quadrature_node(i, 4), grid[i - 1]);
        }
    }
}
