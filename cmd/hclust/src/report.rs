//! Result summary for text and JSON output.

use std::fmt::Write;

use anyhow::{Result, bail};
use giztoy_hclust::Clustering;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub records: usize,
    pub k: usize,
    pub elbow: usize,
    pub order: Vec<usize>,
    pub heights: Vec<f64>,
    pub variances: Vec<f64>,
    pub clusters: Vec<Vec<usize>>,
    pub labels: Vec<usize>,
}

impl Report {
    /// Summarizes `result` at `k`, or at the elbow when `k` is `None`.
    pub fn new(result: &Clustering, k: Option<usize>) -> Result<Self> {
        let n = result.len();
        let elbow = result.elbow();
        let k = k.unwrap_or(elbow);
        if n == 0 && k != 0 {
            bail!("k must be 0 for empty input, got {k}");
        }
        if n > 0 && !(1..=n).contains(&k) {
            bail!("k must be in 1..={n}, got {k}");
        }
        Ok(Self {
            records: n,
            k,
            elbow,
            order: result.order.clone(),
            heights: result.dendrogram.heights(),
            variances: result.variances(),
            clusters: result
                .partitions
                .get(k)
                .map(<[Vec<usize>]>::to_vec)
                .unwrap_or_default(),
            labels: result.partitions.labels(k).unwrap_or_default(),
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "records: {}", self.records);
        let _ = writeln!(out, "elbow:   {}", self.elbow);
        let _ = writeln!(out, "k:       {}", self.k);
        let _ = writeln!(out, "order:   {}", join(&self.order));
        for (i, members) in self.clusters.iter().enumerate() {
            let _ = writeln!(out, "cluster {i} ({}): {}", members.len(), join(members));
        }
        out
    }
}

fn join(xs: &[usize]) -> String {
    xs.iter().map(usize::to_string).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use giztoy_hclust::{Config, Metric, cluster};

    fn four_points() -> Clustering {
        let records = vec![vec![0.0f32, 0.0], vec![0.0, 1.0], vec![5.0, 5.0], vec![5.0, 6.0]];
        cluster(&records, &Config::new().with_metric(Metric::Euclidean)).unwrap()
    }

    #[test]
    fn defaults_to_elbow() {
        let r = Report::new(&four_points(), None).unwrap();
        assert_eq!(r.k, 2);
        assert_eq!(r.elbow, 2);
        assert_eq!(r.clusters, vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(r.labels, vec![0, 0, 1, 1]);
        assert_eq!(r.heights.len(), 3);
    }

    #[test]
    fn explicit_k() {
        let r = Report::new(&four_points(), Some(4)).unwrap();
        assert_eq!(r.clusters.len(), 4);
        assert!(Report::new(&four_points(), Some(0)).is_err());
        assert!(Report::new(&four_points(), Some(5)).is_err());
    }

    #[test]
    fn text_output() {
        let text = Report::new(&four_points(), None).unwrap().to_text();
        assert!(text.contains("records: 4\n"));
        assert!(text.contains("order:   0 1 2 3\n"));
        assert!(text.contains("cluster 1 (2): 2 3\n"));
    }

    #[test]
    fn empty_input() {
        let records: Vec<Vec<f32>> = Vec::new();
        let c = cluster(&records, &Config::new()).unwrap();
        let r = Report::new(&c, None).unwrap();
        assert_eq!(r.records, 0);
        assert!(r.clusters.is_empty());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["k"], 0);
    }

    #[test]
    fn empty_input_rejects_nonzero_k() {
        let records: Vec<Vec<f32>> = Vec::new();
        let c = cluster(&records, &Config::new()).unwrap();
        let err = Report::new(&c, Some(7)).unwrap_err();
        assert!(err.to_string().contains("empty input"), "got {err}");
        assert!(Report::new(&c, Some(0)).is_ok());
    }
}
