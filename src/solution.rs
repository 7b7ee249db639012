//! Final iterate handed to reporting and plotting consumers.

use std::io::Write;

use nalgebra::DVector;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::grid::Grid;
use crate::solving::SolveSummary;

/// Grid abscissas paired with the final solution values, plus run diagnostics.
#[derive(Clone, Debug)]
pub struct Solution {
    grid: Grid,
    values: DVector<f64>,
    summary: SolveSummary,
}

/// Row written by the JSON exporter.
#[derive(Serialize)]
struct Point {
    u: f64,
    #[serde(serialize_with = "serialize_float")]
    h: f64,
}

/// Writes finite values as numbers and non-finite ones as `"inf"`, `"-inf"` or `"NaN"`.
///
/// JSON has no literal for them and `serde_json` would otherwise emit `null`.
pub(crate) fn serialize_float<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

/// Sequence form of [`serialize_float`].
pub(crate) fn serialize_floats<S: Serializer>(
    values: &[f64],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    struct Float(f64);

    impl Serialize for Float {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serialize_float(&self.0, serializer)
        }
    }

    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        seq.serialize_element(&Float(*value))?;
    }
    seq.end()
}

/// Layout of the JSON export.
#[derive(Serialize)]
struct Export<'a> {
    summary: &'a SolveSummary,
    points: Vec<Point>,
}

impl Solution {
    pub(crate) fn new(grid: Grid, values: DVector<f64>, summary: SolveSummary) -> Self {
        debug_assert_eq!(grid.len(), values.len());
        Self {
            grid,
            values,
            summary,
        }
    }

    /// Midpoint grid the values are defined on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Final solution values, one per grid cell.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// Iteration count, termination reason and residual history.
    pub fn summary(&self) -> &SolveSummary {
        &self.summary
    }

    /// Number of grid cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true for a solution produced by the driver.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(u_i, h_i)` pairs in grid order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.grid
            .abscissas()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Writes `u,h` rows with a header line.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "u,h")?;
        for (u, h) in self.points() {
            writeln!(writer, "{u},{h}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the summary and the `(u, h)` points as pretty-printed JSON.
    ///
    /// Non-finite values are written as the strings `"inf"`, `"-inf"` and `"NaN"`,
    /// matching the CSV export.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let export = Export {
            summary: &self.summary,
            points: self.points().map(|(u, h)| Point { u, h }).collect(),
        };
        serde_json::to_writer_pretty(writer, &export)?;
        Ok(())
    }
}
