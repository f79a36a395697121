//! Exact agglomerative hierarchical clustering.
//!
//! Builds the full pairwise distance matrix, then repeatedly merges the
//! two closest live clusters until one remains. Every intermediate state is
//! kept, so the partition into any K clusters (1..=N) is available after a
//! single run, and an elbow heuristic over within-cluster variance
//! recommends a K.
//!
//! # Usage
//!
//! ```
//! use giztoy_hclust::{cluster, Config, Metric};
//!
//! let records = vec![
//!     vec![0.0f32, 0.0],
//!     vec![0.0, 1.0],
//!     vec![5.0, 5.0],
//!     vec![5.0, 6.0],
//! ];
//! let result = cluster(&records, &Config::new().with_metric(Metric::Euclidean)).unwrap();
//!
//! assert_eq!(result.partitions.get(2).unwrap(), &[vec![0, 1], vec![2, 3]]);
//! assert_eq!(result.elbow(), 2);
//! ```
//!
//! # Cost
//!
//! O(N²) memory for the matrix and O(N³) time for the merge loop. There is
//! no approximate or incremental mode.
//!
//! # Metric direction
//!
//! The merge loop minimizes. The default [`Metric::Cosine`] is a
//! similarity, so by default the *least* similar clusters merge first.
//! Supply a distance via [`Metric::Euclidean`] or [`Metric::custom`] for the
//! usual behavior.

mod config;
mod elbow;
mod engine;
mod error;
mod linkage;
mod matrix;
mod metric;
mod progress;
mod record;

pub use config::Config;
pub use elbow::{find_elbow_point, variance_curve, within_cluster_variance};
pub use engine::{Cluster, Clustering, Dendrogram, PartitionTable, cluster, cluster_matrix};
pub use error::{HclustError, Result};
pub use linkage::{Linkage, average_distance, complete_distance, single_distance};
pub use matrix::{DistanceMatrix, build_distance_matrix};
pub use metric::{Metric, cosine_similarity, euclidean_distance};
pub use progress::{Progress, log_progress};
pub use record::extract_vectors;
