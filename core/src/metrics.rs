use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::segmentation::Segmentation;

/// Tellere for analysen. Én global instans (`global()`), men testene lager egne.
pub struct Metrics {
    registry: Registry,
    pub tracks_analyzed: IntCounter,
    pub track_failures: IntCounter,
    pub phases: IntCounterVec,
    pub transitions: IntCounterVec,
    pub empty_slices_dropped: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let tracks_analyzed = IntCounter::new("hikefly_tracks_analyzed_total", "Tracks segmented")?;
        let track_failures = IntCounter::new("hikefly_track_failures_total", "Tracks that failed to load or segment")?;
        let phases = IntCounterVec::new(
            Opts::new("hikefly_phases_total", "Phases emitted, by activity"),
            &["activity"],
        )?;
        let transitions = IntCounterVec::new(
            Opts::new("hikefly_transitions_total", "Confirmed state transitions, by cause"),
            &["cause"],
        )?;
        let empty_slices_dropped =
            IntCounter::new("hikefly_empty_slices_dropped_total", "Phase slices dropped as empty")?;

        registry.register(Box::new(tracks_analyzed.clone()))?;
        registry.register(Box::new(track_failures.clone()))?;
        registry.register(Box::new(phases.clone()))?;
        registry.register(Box::new(transitions.clone()))?;
        registry.register(Box::new(empty_slices_dropped.clone()))?;

        Ok(Self { registry, tracks_analyzed, track_failures, phases, transitions, empty_slices_dropped })
    }

    pub fn record_segmentation(&self, seg: &Segmentation) {
        self.tracks_analyzed.inc();
        for p in &seg.phases {
            self.phases.with_label_values(&[p.activity().key()]).inc();
        }
        for t in &seg.transitions {
            self.transitions.with_label_values(&[t.cause.label()]).inc();
        }
        self.empty_slices_dropped.inc_by(seg.dropped_slices as u64);
    }

    pub fn record_failure(&self) {
        self.track_failures.inc();
    }

    /// Prometheus tekstformat.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match Metrics::new() {
    Ok(m) => Some(m),
    Err(err) => {
        log::error!("metrics registry unavailable: {err}");
        None
    }
});

/// `None` bare hvis registeret ikke kunne bygges; analysen går videre uten tellere.
pub fn global() -> Option<&'static Metrics> {
    METRICS.as_ref()
}
