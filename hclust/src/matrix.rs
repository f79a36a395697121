use std::ops::Index;

use tracing::debug;

use crate::config::Config;
use crate::error::{HclustError, Result};
use crate::metric::Metric;
use crate::progress::Phase;

/// Dense N×N table of pairwise distances, stored row-major.
///
/// Indexed by original record position. Not assumed symmetric: linkage
/// lookups read `m[(i, j)]` with `i` from the first set and `j` from the
/// second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from precomputed rows.
    ///
    /// Every row must have `rows.len()` columns and no cell may be NaN.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n {
                return Err(HclustError::NotSquare {
                    rows: n,
                    row,
                    len: values.len(),
                });
            }
            if let Some(col) = values.iter().position(|d| d.is_nan()) {
                return Err(HclustError::NotANumber { row, col });
            }
            data.extend(values);
        }
        Ok(Self { n, data })
    }

    /// Number of records (rows).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns `m[i][j]`. Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(j < self.n, "column {j} out of range for {n}x{n} matrix", n = self.n);
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on 0.
        self.data.chunks_exact(self.n.max(1))
    }

    pub fn transpose(&self) -> Self {
        let n = self.n;
        let mut data = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                data.push(self.data[i * n + j]);
            }
        }
        Self { n, data }
    }

    /// Returns true if `|m[i][j] - m[j][i]| <= eps` for every pair.
    pub fn is_symmetric(&self, eps: f64) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= eps))
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(j < self.n, "column {j} out of range for {n}x{n} matrix", n = self.n);
        &self.data[i * self.n + j]
    }
}

/// Computes `metric(records[i], records[j])` for every ordered pair.
///
/// The full matrix is built, diagonal and both halves included. The first
/// metric error aborts the build.
pub fn build_distance_matrix<R: AsRef<[f32]>>(records: &[R], metric: &Metric) -> Result<DistanceMatrix> {
    let cfg = Config::new().with_metric(metric.clone());
    build(records, &cfg, cfg.progress.phase(0.0, 1.0))
}

pub(crate) fn build<R: AsRef<[f32]>>(records: &[R], cfg: &Config, phase: Phase<'_>) -> Result<DistanceMatrix> {
    let n = records.len();
    let mut data = Vec::with_capacity(n * n);
    for (row, a) in records.iter().enumerate() {
        if cfg.is_cancelled() {
            return Err(HclustError::Cancelled);
        }
        for (col, b) in records.iter().enumerate() {
            let d = cfg.metric.measure(a.as_ref(), b.as_ref())?;
            if d.is_nan() {
                return Err(HclustError::NotANumber { row, col });
            }
            data.push(d);
        }
        phase.report(row + 1, n);
    }
    debug!(n, metric = %cfg.metric, "distance matrix built");
    Ok(DistanceMatrix { n, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_matrix() {
        let records = vec![vec![0.0f32, 0.0], vec![3.0, 4.0], vec![0.0, 1.0]];
        let m = build_distance_matrix(&records, &Metric::Euclidean).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m[(1, 0)], 5.0);
        assert_eq!(m.get(0, 2), 1.0);
        assert!(m.is_symmetric(0.0));
    }

    #[test]
    fn cosine_matrix_diagonal_is_one() {
        let records = vec![vec![1.0f32, 0.0], vec![1.0, 1.0]];
        let m = build_distance_matrix(&records, &Metric::Cosine).unwrap();
        assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((m.get(1, 1) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 1) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn empty_records() {
        let records: Vec<Vec<f32>> = Vec::new();
        let m = build_distance_matrix(&records, &Metric::Euclidean).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.rows().count(), 0);
    }

    #[test]
    fn metric_error_aborts() {
        let records = vec![vec![1.0f32, 0.0], vec![1.0, 0.0, 0.0]];
        let err = build_distance_matrix(&records, &Metric::Cosine).unwrap_err();
        assert!(matches!(err, HclustError::DimensionMismatch { .. }));
    }

    #[test]
    fn custom_metric_error_propagates() {
        let metric = Metric::custom(|_, _| Err(HclustError::Metric("boom".into())));
        let err = build_distance_matrix(&[[1.0f32]], &metric).unwrap_err();
        assert_eq!(err.to_string(), "metric error: boom");
    }

    #[test]
    fn nan_cell_is_an_error() {
        let records = vec![vec![0.0f32, 0.0], vec![1.0, 0.0]];
        let err = build_distance_matrix(&records, &Metric::Cosine).unwrap_err();
        assert!(matches!(err, HclustError::NotANumber { row: 0, col: 0 }));
    }

    #[test]
    fn build_is_deterministic() {
        let records = vec![vec![0.3f32, 0.7, 0.1], vec![0.9, 0.2, 0.4], vec![0.5, 0.5, 0.5]];
        let a = build_distance_matrix(&records, &Metric::Cosine).unwrap();
        let b = build_distance_matrix(&records, &Metric::Cosine).unwrap();
        let bits = |m: &DistanceMatrix| m.rows().flatten().map(|d| d.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn from_rows_validates() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 0.0]]).unwrap();
        assert_eq!(m.row(1), &[2.0, 0.0]);
        assert!(!m.is_symmetric(0.5));
        assert_eq!(m.transpose().get(0, 1), 2.0);

        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, HclustError::NotSquare { rows: 2, row: 1, len: 1 }));

        let err = DistanceMatrix::from_rows(vec![vec![f64::NAN]]).unwrap_err();
        assert!(matches!(err, HclustError::NotANumber { row: 0, col: 0 }));
    }
}
