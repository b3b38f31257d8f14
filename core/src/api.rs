// core/src/api.rs
//
// JSON inn / JSON ut. Brukes av Python-bindingene og av andre klienter som
// ikke vil linke mot Rust-typene direkte.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{analyze_track, TrackAnalysis};
use crate::config::SegmentConfig;
use crate::error::HfError;
use crate::igc::{IgcReader, TrackReader};
use crate::logical::LogicalPhase;
use crate::models::{Sample, SampleSeries, Track};
use crate::phase::Phase;
use crate::segmentation::Transition;
use crate::stats::TrackStats;

// ──────────────────────────────────────────────────────────────────────────────
// TOLERANT INPUT (eldre/avvikende feltnavn fra pandas-eksport o.l.)
// ──────────────────────────────────────────────────────────────────────────────

/// RFC 3339-streng eller epoch-sekunder.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeIn {
    Rfc3339(DateTime<Utc>),
    Epoch(f64),
}

#[derive(Debug, Deserialize)]
struct SampleInTol {
    #[serde(alias = "t")]
    time: TimeIn,
    #[serde(alias = "latitude", alias = "Lat")]
    lat: f64,
    #[serde(alias = "long", alias = "longitude", alias = "Long")]
    lon: f64,
    #[serde(alias = "Alt_gps", alias = "altitude")]
    alt_gps: f64,
    #[serde(default, alias = "Alt_pressure")]
    alt_pressure: Option<f64>,
}

fn to_core_sample(index: usize, s: SampleInTol) -> Result<Sample, HfError> {
    let time = match s.time {
        TimeIn::Rfc3339(t) => t,
        TimeIn::Epoch(secs) => {
            if !secs.is_finite() {
                return Err(HfError::invalid_sample(index, "non-finite epoch time"));
            }
            Utc.timestamp_millis_opt((secs * 1000.0).round() as i64)
                .single()
                .ok_or_else(|| HfError::invalid_sample(index, format!("epoch {secs} out of range")))?
        }
    };
    Ok(Sample::new(time, s.lat, s.lon, s.alt_gps, s.alt_pressure))
}

/// Parser en JSON-liste av samples og validerer serien.
pub fn parse_samples_json(json: &str) -> Result<SampleSeries, HfError> {
    let de = &mut serde_json::Deserializer::from_str(json);
    let raw: Vec<SampleInTol> = serde_path_to_error::deserialize(de)?;
    let samples = raw
        .into_iter()
        .enumerate()
        .map(|(i, s)| to_core_sample(i, s))
        .collect::<Result<Vec<_>, _>>()?;
    SampleSeries::new(samples)
}

fn parse_cfg(cfg_json: Option<&str>) -> Result<SegmentConfig, HfError> {
    match cfg_json {
        Some(s) if !s.trim().is_empty() => SegmentConfig::from_json_str(s),
        _ => Ok(SegmentConfig::default()),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// OUTPUT
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TrackReport<'a> {
    pub name: &'a str,
    pub samples: usize,
    pub phases: &'a [Phase],
    pub logical_phases: &'a [LogicalPhase],
    pub transitions: &'a [Transition],
    pub stats: Option<&'a TrackStats>,
}

impl<'a> From<&'a TrackAnalysis> for TrackReport<'a> {
    fn from(a: &'a TrackAnalysis) -> Self {
        TrackReport {
            name: &a.track.name,
            samples: a.track.series.len(),
            phases: &a.phases,
            logical_phases: &a.logical_phases,
            transitions: &a.transitions,
            stats: a.stats.as_ref(),
        }
    }
}

pub fn report_json(analysis: &TrackAnalysis) -> Result<String, HfError> {
    serde_json::to_string(&TrackReport::from(analysis)).map_err(|e| HfError::Json {
        path: String::new(),
        message: e.to_string(),
    })
}

/// Samples (JSON) + valgfri konfig (JSON) → rapport (JSON).
pub fn analyze_samples_json(samples_json: &str, cfg_json: Option<&str>) -> Result<String, HfError> {
    let cfg = parse_cfg(cfg_json)?;
    let series = parse_samples_json(samples_json)?;
    let analysis = analyze_track(Track::new(series, None), &cfg)?;
    report_json(&analysis)
}

/// IGC-fil + valgfri konfig (JSON) → rapport (JSON).
pub fn analyze_igc_file(path: impl AsRef<Path>, cfg_json: Option<&str>) -> Result<String, HfError> {
    let cfg = parse_cfg(cfg_json)?;
    let track = IgcReader.read(path.as_ref())?;
    let analysis = analyze_track(track, &cfg)?;
    report_json(&analysis)
}
