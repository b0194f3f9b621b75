use crate::error::ImputeError;
use serde::{Deserialize, Serialize};

/// Mean imputation over a fixed number of columns. Fitted once on training
/// data; the means travel with the model artifact so inference never refits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    /// Fits per-column means over the present values of `rows`.
    pub fn fit(rows: &[Vec<Option<f64>>]) -> Result<Self, ImputeError> {
        let width = rows.first().ok_or(ImputeError::EmptyBatch)?.len();
        let mut sums = vec![0.0; width];
        let mut counts = vec![0usize; width];

        for (row_idx, row) in rows.iter().enumerate() {
            check_width(row_idx, row.len(), width)?;
            for (col, value) in row.iter().enumerate() {
                if let Some(v) = value.filter(|v| !v.is_nan()) {
                    sums[col] += v;
                    counts[col] += 1;
                }
            }
        }

        let means = sums
            .iter()
            .zip(&counts)
            .enumerate()
            .map(|(col, (&sum, &count))| {
                if count == 0 {
                    Err(ImputeError::EmptyColumn(col))
                } else {
                    Ok(sum / count as f64)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { means })
    }

    pub fn from_means(means: Vec<f64>) -> Self {
        Self { means }
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform_row(&self, row: &[Option<f64>]) -> Result<Vec<f64>, ImputeError> {
        check_width(0, row.len(), self.means.len())?;
        Ok(row
            .iter()
            .zip(&self.means)
            .map(|(value, &mean)| match value {
                Some(v) if !v.is_nan() => *v,
                _ => mean,
            })
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<Vec<f64>>, ImputeError> {
        rows.iter()
            .enumerate()
            .map(|(row_idx, row)| {
                self.transform_row(row).map_err(|e| match e {
                    ImputeError::RowWidth { expected, got, .. } => ImputeError::RowWidth {
                        row: row_idx,
                        expected,
                        got,
                    },
                    other => other,
                })
            })
            .collect()
    }

    pub fn fit_transform(rows: &[Vec<Option<f64>>]) -> Result<(Self, Vec<Vec<f64>>), ImputeError> {
        let imputer = Self::fit(rows)?;
        let filled = imputer.transform(rows)?;
        Ok((imputer, filled))
    }
}

fn check_width(row: usize, got: usize, expected: usize) -> Result<(), ImputeError> {
    if got == expected {
        Ok(())
    } else {
        Err(ImputeError::RowWidth { row, expected, got })
    }
}
