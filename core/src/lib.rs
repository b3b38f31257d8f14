#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod api;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod igc;
pub mod logical;
pub mod metrics;
pub mod models;
pub mod phase;
pub mod segmentation;
pub mod stats;
pub mod units;

#[cfg(feature = "python")]
mod py;

pub use collection::{analyze_track, discover_files, TrackAnalysis, TrackCollection};
pub use config::{load_config, ActivityThresholds, SegmentConfig};
pub use error::HfError;
pub use igc::{parse_igc, IgcReader, TrackReader};
pub use logical::{aggregate, LogicalPhase, RateUnit};
pub use models::{Activity, Direction, Sample, SampleSeries, Track};
pub use phase::Phase;
pub use segmentation::{segment, segment_detailed, Segmentation, Transition, TransitionCause};
pub use stats::{
    collection_stats, summary_stats, track_stats, CollectionStats, GroupStats, SummaryStats, TrackStats,
};

#[cfg(feature = "python")]
#[pymodule]
fn hikefly_core(_py: Python, m: &PyModule) -> PyResult<()> {
    py::register(m)
}
