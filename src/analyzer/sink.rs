//! Immediate notification of structural anomalies.
//!
//! Cycles and depth violations are surfaced the moment they are found,
//! while the scan is still running. Lookup failures are not sent here; they
//! travel back with the scan result and go to the failure report.
//!
//! | Use Case | Implementation |
//! |----------|----------------|
//! | CLI | [`LoggingAnomalySink`] |
//! | Library callers that only want the final report | [`SilentAnomalySink`] |
//! | Tests | [`RecordingAnomalySink`] |
//!
//! Sinks are called concurrently from rayon workers and must be
//! `Send + Sync`.

use crate::core::Anomaly;
use indicatif::ProgressBar;
use parking_lot::Mutex;

pub trait AnomalySink: Send + Sync {
    /// Called once per structural anomaly, from the thread that found it.
    fn on_anomaly(&self, anomaly: &Anomaly);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAnomalySink;

impl AnomalySink for SilentAnomalySink {
    #[inline]
    fn on_anomaly(&self, _anomaly: &Anomaly) {}
}

/// Emits each anomaly as a `tracing` warning.
///
/// When a progress bar is attached, the bar is suspended while the warning
/// is written so the two do not interleave on stderr.
#[derive(Clone, Debug, Default)]
pub struct LoggingAnomalySink {
    progress: Option<ProgressBar>,
}

impl LoggingAnomalySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
        }
    }

    fn emit(anomaly: &Anomaly) {
        match anomaly {
            Anomaly::CircularNesting { path } => tracing::warn!(
                kind = "circular_nesting",
                depth = path.len(),
                "Circular nesting detected: {path}"
            ),
            Anomaly::DepthExceeded { path, limit } => tracing::warn!(
                kind = "depth_exceeded",
                limit = *limit,
                "Nesting depth limit {limit} reached: {path}"
            ),
            Anomaly::LookupFailure { .. } => tracing::warn!("{anomaly}"),
        }
    }
}

impl AnomalySink for LoggingAnomalySink {
    fn on_anomaly(&self, anomaly: &Anomaly) {
        match &self.progress {
            Some(progress) if !progress.is_hidden() => progress.suspend(|| Self::emit(anomaly)),
            _ => Self::emit(anomaly),
        }
    }
}

/// Captures anomalies in arrival order.
#[derive(Debug, Default)]
pub struct RecordingAnomalySink {
    anomalies: Mutex<Vec<Anomaly>>,
}

impl RecordingAnomalySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.anomalies.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.lock().is_empty()
    }
}

impl AnomalySink for RecordingAnomalySink {
    fn on_anomaly(&self, anomaly: &Anomaly) {
        self.anomalies.lock().push(anomaly.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GroupPath;

    fn cycle() -> Anomaly {
        Anomaly::CircularNesting {
            path: ["A", "B", "A"].into_iter().collect::<GroupPath>(),
        }
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingAnomalySink::new();
        assert!(sink.is_empty());

        let depth = Anomaly::DepthExceeded {
            path: ["A", "B"].into_iter().collect(),
            limit: 1,
        };
        sink.on_anomaly(&cycle());
        sink.on_anomaly(&depth);

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.anomalies(), vec![cycle(), depth]);
    }

    #[test]
    fn test_logging_sink_with_hidden_progress() {
        let sink = LoggingAnomalySink::with_progress(ProgressBar::hidden());
        sink.on_anomaly(&cycle());
    }
}
