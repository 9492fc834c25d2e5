use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters accumulated over a console session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub frames: usize,
    pub alerts_ingested: usize,
    pub forced_navigations: usize,
    pub link_drops: usize,
    pub source_errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_frame(&self, alerts: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
            metrics.alerts_ingested += alerts;
        }
    }

    pub fn record_forced_navigation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.forced_navigations += 1;
        }
    }

    pub fn record_link_drop(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.link_drops += 1;
        }
    }

    pub fn record_source_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.source_errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_frame(2);
        metrics.record_frame(0);
        metrics.record_link_drop();
        metrics.record_source_error();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames, 2);
        assert_eq!(snapshot.alerts_ingested, 2);
        assert_eq!(snapshot.link_drops, 1);
        assert_eq!(snapshot.source_errors, 1);
        assert_eq!(snapshot.forced_navigations, 0);
    }
}
