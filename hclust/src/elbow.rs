//! Within-cluster variance and elbow (knee) detection.

use crate::engine::PartitionTable;
use crate::matrix::DistanceMatrix;

/// Sum over the clusters at `k` of the mean pairwise distance inside each
/// cluster.
///
/// Pairs are unordered (`i` before `j` in the cluster's index order) and
/// read as `m[i][j]`. Clusters with fewer than two members contribute 0.
/// Not normalized by `k`, so larger `k` tends towards smaller values.
///
/// Returns `None` for `k == 0` or `k > N`. At `k == N` every cluster is a
/// singleton and the result is `Some(0.0)`.
pub fn within_cluster_variance(partitions: &PartitionTable, matrix: &DistanceMatrix, k: usize) -> Option<f64> {
    let clusters = partitions.get(k)?;
    Some(clusters.iter().map(|c| mean_pairwise(c, matrix)).sum())
}

/// Variances for `k` in `1..=N`.
pub fn variance_curve(partitions: &PartitionTable, matrix: &DistanceMatrix) -> Vec<f64> {
    (1..=partitions.max_k())
        .filter_map(|k| within_cluster_variance(partitions, matrix, k))
        .collect()
}

fn mean_pairwise(members: &[usize], m: &DistanceMatrix) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (p, &i) in members.iter().enumerate() {
        for &j in &members[p + 1..] {
            sum += m.get(i, j);
        }
    }
    let pairs = members.len() * (members.len() - 1) / 2;
    sum / pairs as f64
}

/// Returns the 1-based K whose point `(K, variances[K-1])` lies farthest
/// from the chord between the first and last points.
///
/// The first maximum wins. Fewer than three points have no interior and
/// yield 1.
pub fn find_elbow_point(variances: &[f64]) -> usize {
    let n = variances.len();
    if n < 3 {
        return 1;
    }

    let (x1, y1) = (1.0, variances[0]);
    let (x2, y2) = (n as f64, variances[n - 1]);
    let dx = x2 - x1;
    let dy = y2 - y1;
    let norm = (dx * dx + dy * dy).sqrt();
    let cross = x2 * y1 - y2 * x1;

    let mut best_k = 1;
    let mut best = f64::NEG_INFINITY;
    for (i, &y0) in variances.iter().enumerate() {
        let x0 = (i + 1) as f64;
        let dist = (dy * x0 - dx * y0 + cross).abs() / norm;
        if dist > best {
            best = dist;
            best_k = i + 1;
        }
    }
    best_k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Metric, cluster};

    #[test]
    fn elbow_of_diminishing_returns() {
        // Chord from (1, 10) to (5, 6.8): 3.2x + 4y - 43.2 = 0.
        // Distances: 0, 0.94, 1.09, 0.55, 0.
        assert_eq!(find_elbow_point(&[10.0, 8.0, 7.0, 6.9, 6.8]), 3);
    }

    #[test]
    fn elbow_three_points() {
        assert_eq!(find_elbow_point(&[5.0, 1.0, 0.5]), 2);
    }

    #[test]
    fn elbow_degenerate_inputs() {
        assert_eq!(find_elbow_point(&[]), 1);
        assert_eq!(find_elbow_point(&[3.0]), 1);
        assert_eq!(find_elbow_point(&[3.0, 1.0]), 1);
        // Straight line: every distance is 0, first wins.
        assert_eq!(find_elbow_point(&[4.0, 3.0, 2.0, 1.0]), 1);
    }

    #[test]
    fn variance_per_k() {
        let records = vec![vec![0.0f32, 0.0], vec![0.0, 1.0], vec![5.0, 5.0], vec![5.0, 6.0]];
        let c = cluster(&records, &Config::new().with_metric(Metric::Euclidean)).unwrap();
        let (p, m) = (&c.partitions, &c.distance_matrix);

        assert_eq!(within_cluster_variance(p, m, 0), None);
        assert_eq!(within_cluster_variance(p, m, 5), None);
        assert_eq!(within_cluster_variance(p, m, 4), Some(0.0));
        assert_eq!(within_cluster_variance(p, m, 3), Some(1.0));
        assert_eq!(within_cluster_variance(p, m, 2), Some(2.0));

        let all = (1.0 + 1.0 + 2.0 * 50f64.sqrt() + 61f64.sqrt() + 41f64.sqrt()) / 6.0;
        let v1 = within_cluster_variance(p, m, 1).unwrap();
        assert!((v1 - all).abs() < 1e-9, "got {v1}");

        let curve = variance_curve(p, m);
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[1..], [2.0, 1.0, 0.0]);
        assert_eq!(c.elbow(), 2);
    }

    #[test]
    fn variance_reads_upper_pairs_only() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![8.0, 0.0]]).unwrap();
        let c = crate::cluster_matrix(m, &Config::new()).unwrap();
        // K=1 cluster indexes are [0, 1]: reads m[0][1].
        assert_eq!(c.variance(1), Some(2.0));
        assert_eq!(c.variances(), vec![2.0, 0.0]);
    }
}
