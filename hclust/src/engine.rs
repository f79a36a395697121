use serde::Serialize;
use tracing::{debug, trace};

use crate::config::Config;
use crate::elbow::{find_elbow_point, variance_curve, within_cluster_variance};
use crate::error::{HclustError, Result};
use crate::linkage::Linkage;
use crate::matrix::{self, DistanceMatrix};
use crate::progress::Phase;

/// A node of the merge tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Original record positions, in merge order.
    pub indexes: Vec<usize>,

    /// Linkage distance at which the node was formed; 0 for leaves.
    pub height: f64,

    /// Arena ids of the two merged nodes, or `None` for a leaf.
    pub children: Option<[usize; 2]>,
}

impl Cluster {
    fn leaf(index: usize) -> Self {
        Self {
            indexes: vec![index],
            height: 0.0,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of records under this node.
    pub fn size(&self) -> usize {
        self.indexes.len()
    }
}

/// Binary merge tree stored as an arena.
///
/// Ids `0..n` are the leaves (leaf `i` holds record `i`); ids `n..2n-1`
/// are internal nodes in the order they were merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dendrogram {
    nodes: Vec<Cluster>,
    root: Option<usize>,
}

impl Dendrogram {
    pub fn root(&self) -> Option<&Cluster> {
        self.root.map(|id| &self.nodes[id])
    }

    pub fn root_id(&self) -> Option<usize> {
        self.root
    }

    pub fn node(&self, id: usize) -> Option<&Cluster> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Cluster] {
        &self.nodes
    }

    /// Returns the two children of an internal node.
    pub fn children(&self, id: usize) -> Option<(&Cluster, &Cluster)> {
        let [a, b] = self.nodes.get(id)?.children?;
        Some((&self.nodes[a], &self.nodes[b]))
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|c| c.is_leaf()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of internal nodes.
    pub fn merges(&self) -> usize {
        self.nodes.iter().filter(|c| !c.is_leaf()).count()
    }

    /// Record positions in root order; empty when there is no root.
    pub fn leaves(&self) -> &[usize] {
        self.root().map(|c| c.indexes.as_slice()).unwrap_or(&[])
    }

    /// Merge heights in merge order.
    pub fn heights(&self) -> Vec<f64> {
        self.nodes
            .iter()
            .filter(|c| !c.is_leaf())
            .map(|c| c.height)
            .collect()
    }
}

/// Partitions of the records for every cluster count K.
///
/// Entry 0 is always empty; entry K (1..=N) lists the index sets of the
/// clusters alive when exactly K clusters existed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionTable {
    levels: Vec<Vec<Vec<usize>>>,
}

impl PartitionTable {
    /// Largest valid K (the number of records).
    pub fn max_k(&self) -> usize {
        self.levels.len() - 1
    }

    /// All N+1 entries, entry 0 included.
    pub fn as_slice(&self) -> &[Vec<Vec<usize>>] {
        &self.levels
    }

    /// The partition into `k` clusters; `None` for `k == 0` or `k > N`.
    pub fn get(&self, k: usize) -> Option<&[Vec<usize>]> {
        if k == 0 {
            return None;
        }
        self.levels.get(k).map(Vec::as_slice)
    }

    /// Flat cluster label per record at `k`. Labels follow the partition's
    /// cluster order, starting at 0.
    pub fn labels(&self, k: usize) -> Option<Vec<usize>> {
        let clusters = self.get(k)?;
        let mut labels = vec![0; self.max_k()];
        for (label, members) in clusters.iter().enumerate() {
            for &i in members {
                labels[i] = label;
            }
        }
        Some(labels)
    }

    /// Iterates `(k, partition)` for `k` in `1..=N`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Vec<usize>])> {
        self.levels
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, p)| (k, p.as_slice()))
    }
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self {
            levels: vec![Vec::new()],
        }
    }
}

/// Output of a clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub dendrogram: Dendrogram,
    pub distance_matrix: DistanceMatrix,
    /// Root indexes: a permutation of `0..N` with merged groups adjacent.
    pub order: Vec<usize>,
    pub partitions: PartitionTable,
}

impl Clustering {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Within-cluster variance at `k`; see [`within_cluster_variance`].
    pub fn variance(&self, k: usize) -> Option<f64> {
        within_cluster_variance(&self.partitions, &self.distance_matrix, k)
    }

    /// Variances for `k` in `1..=N`.
    pub fn variances(&self) -> Vec<f64> {
        variance_curve(&self.partitions, &self.distance_matrix)
    }

    /// Recommended cluster count, or 0 for an empty run.
    pub fn elbow(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let k = find_elbow_point(&self.variances());
        debug!(k, n = self.len(), "elbow selected");
        k
    }
}

/// Clusters `records` with the configured metric and linkage.
///
/// Builds the full distance matrix, then merges the closest pair of live
/// clusters until one remains. O(N²) memory and O(N³) time.
pub fn cluster<R: AsRef<[f32]>>(records: &[R], cfg: &Config) -> Result<Clustering> {
    let matrix = matrix::build(records, cfg, cfg.progress.phase(0.0, 0.5))?;
    agglomerate(matrix, cfg, cfg.progress.phase(0.5, 0.5))
}

/// Clusters a precomputed distance matrix. `cfg.metric` is ignored.
pub fn cluster_matrix(matrix: DistanceMatrix, cfg: &Config) -> Result<Clustering> {
    agglomerate(matrix, cfg, cfg.progress.phase(0.0, 1.0))
}

fn agglomerate(matrix: DistanceMatrix, cfg: &Config, phase: Phase<'_>) -> Result<Clustering> {
    let n = matrix.len();
    if n == 0 {
        phase.finish();
        return Ok(Clustering {
            dendrogram: Dendrogram::default(),
            distance_matrix: matrix,
            order: Vec::new(),
            partitions: PartitionTable::default(),
        });
    }

    let mut nodes: Vec<Cluster> = (0..n).map(Cluster::leaf).collect();
    nodes.reserve(n - 1);
    // Arena ids of the live clusters, in positional order.
    let mut live: Vec<usize> = (0..n).collect();
    let mut snapshots: Vec<Vec<Vec<usize>>> = Vec::with_capacity(n);

    for step in 0..n {
        if cfg.is_cancelled() {
            return Err(HclustError::Cancelled);
        }
        snapshots.push(live.iter().map(|&id| nodes[id].indexes.clone()).collect());
        if live.len() == 1 {
            phase.report(n, n);
            break;
        }

        let (row, col, height) = closest_pair(&nodes, &live, &matrix, &cfg.linkage)?;
        let (a, b) = (live[row], live[col]);
        let mut indexes = Vec::with_capacity(nodes[a].size() + nodes[b].size());
        indexes.extend_from_slice(&nodes[a].indexes);
        indexes.extend_from_slice(&nodes[b].indexes);

        let id = nodes.len();
        trace!(step, a, b, id, height, "merge");
        nodes.push(Cluster {
            indexes,
            height,
            children: Some([a, b]),
        });
        live.retain(|&x| x != a && x != b);
        live.push(id);

        phase.report(step + 1, n);
    }

    snapshots.reverse();
    let mut levels = Vec::with_capacity(n + 1);
    levels.push(Vec::new());
    levels.extend(snapshots);

    let root = live[0];
    let order = nodes[root].indexes.clone();
    debug!(n, merges = n - 1, linkage = %cfg.linkage, "merge loop done");

    Ok(Clustering {
        dendrogram: Dendrogram {
            nodes,
            root: Some(root),
        },
        distance_matrix: matrix,
        order,
        partitions: PartitionTable { levels },
    })
}

/// Scans every live pair (row < col) and returns the first pair with the
/// smallest linkage value. Ties keep the earlier pair.
fn closest_pair(
    nodes: &[Cluster],
    live: &[usize],
    matrix: &DistanceMatrix,
    linkage: &Linkage,
) -> Result<(usize, usize, f64)> {
    let mut best = (0, 1, f64::INFINITY);
    for row in 0..live.len() {
        let a = &nodes[live[row]].indexes;
        for col in row + 1..live.len() {
            let d = linkage.distance(a, &nodes[live[col]].indexes, matrix);
            if d.is_nan() {
                return Err(HclustError::LinkageNotANumber { left: row, right: col });
            }
            if d < best.2 {
                best = (row, col, d);
            }
        }
    }
    Ok(best)
}
