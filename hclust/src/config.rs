use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::linkage::Linkage;
use crate::metric::Metric;
use crate::progress::Progress;

/// Controls a clustering run.
///
/// The default is cosine similarity, average linkage, no progress
/// reporting and no cancellation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Pairwise function used to build the distance matrix.
    pub metric: Metric,

    /// Group-to-group distance minimized by the merge loop.
    pub linkage: Linkage,

    /// Receives the overall fraction done.
    pub progress: Progress,

    /// Polled once per matrix row and once per merge step.
    /// When set, the run returns [`HclustError::Cancelled`](crate::HclustError::Cancelled).
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
