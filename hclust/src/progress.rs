use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

type ProgressFn = dyn Fn(f64) + Send + Sync;

/// Optional progress callback.
///
/// The callback receives a non-decreasing fraction in `[0, 1]` and runs
/// inline on the clustering thread. A panicking callback aborts the run.
/// A full [`cluster`](crate::cluster) run reports the matrix build as
/// `[0, 0.5]` and the merge loop as `[0.5, 1]`.
#[derive(Clone, Default)]
pub struct Progress(Option<Arc<ProgressFn>>);

impl Progress {
    /// A reporter that does nothing.
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        Self(Some(Arc::new(f)))
    }

    /// Returns true if a callback is installed.
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Sends `fraction`, clamped to `[0, 1]`, to the callback.
    pub fn report(&self, fraction: f64) {
        if let Some(f) = &self.0 {
            f(fraction.clamp(0.0, 1.0));
        }
    }

    /// Maps `done / total` of one phase into `[offset, offset + span]`.
    pub(crate) fn phase(&self, offset: f64, span: f64) -> Phase<'_> {
        Phase {
            progress: self,
            offset,
            span,
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Progress").field(&self.is_enabled()).finish()
    }
}

/// One slice of the overall progress range.
pub(crate) struct Phase<'a> {
    progress: &'a Progress,
    offset: f64,
    span: f64,
}

impl Phase<'_> {
    pub(crate) fn report(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        self.progress
            .report(self.offset + self.span * done as f64 / total as f64);
    }

    /// Reports the end of the phase.
    pub(crate) fn finish(&self) {
        self.progress.report(self.offset + self.span);
    }
}

/// Returns a reporter that logs every whole percent through `tracing`.
///
/// Never installed implicitly; pass it via
/// [`Config::with_progress`](crate::Config::with_progress).
pub fn log_progress() -> Progress {
    on_whole_percent(|pct| tracing::info!("hclust: {pct:3}%"))
}

/// Calls `f` once each time the whole percent changes.
pub(crate) fn on_whole_percent<F>(f: F) -> Progress
where
    F: Fn(u32) + Send + Sync + 'static,
{
    let last = AtomicU32::new(u32::MAX);
    Progress::new(move |fraction| {
        let pct = (fraction * 100.0).floor() as u32;
        if last.swap(pct, Ordering::Relaxed) != pct {
            f(pct);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Progress, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let p = Progress::new(move |f| sink.lock().unwrap().push(f));
        (p, seen)
    }

    #[test]
    fn none_is_silent() {
        let p = Progress::none();
        assert!(!p.is_enabled());
        p.report(0.5);
    }

    #[test]
    fn report_clamps() {
        let (p, seen) = recorder();
        p.report(-1.0);
        p.report(2.0);
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn phase_scales_into_range() {
        let (p, seen) = recorder();
        let phase = p.phase(0.5, 0.5);
        phase.report(1, 4);
        phase.report(4, 4);
        phase.report(1, 0);
        assert_eq!(*seen.lock().unwrap(), vec![0.625, 1.0]);
    }

    #[test]
    fn log_progress_is_enabled() {
        let p = log_progress();
        assert!(p.is_enabled());
        p.report(0.1);
        p.report(0.1);
    }

    #[test]
    fn whole_percent_deduplicates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let p = on_whole_percent(move |pct| sink.lock().unwrap().push(pct));
        p.report(0.1);
        p.report(0.101);
        p.report(0.109);
        p.report(0.11);
        p.report(0.11);
        p.report(1.0);
        assert_eq!(*seen.lock().unwrap(), vec![10, 11, 100]);
    }
}
