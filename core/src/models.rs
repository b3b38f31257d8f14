use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::HfError;
use crate::geodesy;

/// Ett registreringspunkt fra GPS/barometer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub lat: f64,               // grader
    pub lon: f64,               // grader
    pub alt_gps: f64,           // meter
    pub alt_pressure: Option<f64>, // meter (barometrisk)
}

impl Sample {
    pub fn new(time: DateTime<Utc>, lat: f64, lon: f64, alt_gps: f64, alt_pressure: Option<f64>) -> Self {
        Self { time, lat, lon, alt_gps, alt_pressure }
    }

    fn check(&self, index: usize) -> Result<(), HfError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(HfError::invalid_sample(index, format!("latitude {} out of range", self.lat)));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(HfError::invalid_sample(index, format!("longitude {} out of range", self.lon)));
        }
        if !self.alt_gps.is_finite() {
            return Err(HfError::invalid_sample(index, "non-finite GPS altitude"));
        }
        if matches!(self.alt_pressure, Some(p) if !p.is_finite()) {
            return Err(HfError::invalid_sample(index, "non-finite pressure altitude"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// +1 for opp, -1 for ned.
    #[inline]
    pub fn sign(self) -> f64 {
        if self.is_up() { 1.0 } else { -1.0 }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_up() { "UP" } else { "DOWN" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Walk,
    Flight,
}

impl Activity {
    #[inline]
    pub fn is_flight(self) -> bool {
        matches!(self, Activity::Flight)
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Walk => "Walk",
            Activity::Flight => "Flight",
        }
    }

    /// Små bokstaver, samme som serde-navnet.
    pub fn key(self) -> &'static str {
        match self {
            Activity::Walk => "walk",
            Activity::Flight => "flight",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tidsordnet serie av samples. Stigende og unike tidsstempler er garantert
/// av konstruktøren; motoren validerer ikke på nytt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    /// Validerer hele serien. Enten hele serien er gyldig, eller ingenting bygges.
    pub fn new(samples: Vec<Sample>) -> Result<Self, HfError> {
        for (i, s) in samples.iter().enumerate() {
            s.check(i)?;
            if i > 0 && s.time <= samples[i - 1].time {
                return Err(HfError::invalid_sample(
                    i,
                    format!("timestamp {} not after {}", s.time, samples[i - 1].time),
                ));
            }
        }
        Ok(Self { samples })
    }

    #[inline] pub fn len(&self) -> usize { self.samples.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.samples.is_empty() }
    #[inline] pub fn samples(&self) -> &[Sample] { &self.samples }
    #[inline] pub fn first(&self) -> Option<&Sample> { self.samples.first() }
    #[inline] pub fn last(&self) -> Option<&Sample> { self.samples.last() }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.first().map(|s| s.time)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.last().map(|s| s.time)
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time(), self.end_time()) {
            (Some(a), Some(b)) => b - a,
            _ => Duration::zero(),
        }
    }

    pub fn min_altitude(&self) -> Option<f64> {
        self.samples.iter().map(|s| OrderedFloat(s.alt_gps)).min().map(|x| x.0)
    }

    pub fn max_altitude(&self) -> Option<f64> {
        self.samples.iter().map(|s| OrderedFloat(s.alt_gps)).max().map(|x| x.0)
    }

    pub fn total_distance_m(&self) -> f64 {
        geodesy::path_length_m(&self.samples)
    }

    /// Inklusivt tidsutsnitt `[start, end]`. Tomt hvis ingen samples faller innenfor.
    pub fn slice_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[Sample] {
        let lo = self.samples.partition_point(|s| s.time < start);
        let hi = self.samples.partition_point(|s| s.time <= end);
        if lo >= hi { &[] } else { &self.samples[lo..hi] }
    }

    /// Tidsbøtte-snitt.
    ///
    /// Bøttene er venstrejusterte og halvåpne, `[t0 + k·Δ, t0 + (k+1)·Δ)`, der `t0`
    /// er første tidsstempel i serien. Representativt tidsstempel er bøttens start.
    /// Tomme bøtter utelates (ingen interpolasjon). Trykkhøyde snittes over de
    /// samplene som har den, ellers `None`.
    pub fn resample(&self, interval: Duration) -> Result<SampleSeries, HfError> {
        let step_ms = interval.num_milliseconds();
        if step_ms <= 0 {
            return Err(HfError::InvalidParameter(format!(
                "resample interval must be positive, got {interval}"
            )));
        }
        let Some(t0) = self.start_time() else {
            return Ok(SampleSeries::default());
        };

        let mut out: Vec<Sample> = Vec::new();
        let mut open: Option<(i64, Bucket)> = None;

        for s in &self.samples {
            let k = (s.time - t0).num_milliseconds() / step_ms;
            match open.as_mut() {
                Some((key, bucket)) if *key == k => bucket.add(s),
                _ => {
                    if let Some((key, bucket)) = open.take() {
                        out.push(bucket.finish(t0 + Duration::milliseconds(key * step_ms)));
                    }
                    open = Some((k, Bucket::start(s)));
                }
            }
        }
        if let Some((key, bucket)) = open {
            out.push(bucket.finish(t0 + Duration::milliseconds(key * step_ms)));
        }

        Ok(SampleSeries { samples: out })
    }
}

#[derive(Debug, Default)]
struct Bucket {
    n: usize,
    lat: f64,
    lon: f64,
    alt_gps: f64,
    alt_pressure: f64,
    n_pressure: usize,
}

impl Bucket {
    fn start(s: &Sample) -> Self {
        let mut b = Bucket::default();
        b.add(s);
        b
    }

    fn add(&mut self, s: &Sample) {
        self.n += 1;
        self.lat += s.lat;
        self.lon += s.lon;
        self.alt_gps += s.alt_gps;
        if let Some(p) = s.alt_pressure {
            self.alt_pressure += p;
            self.n_pressure += 1;
        }
    }

    fn finish(self, time: DateTime<Utc>) -> Sample {
        let n = self.n as f64;
        Sample {
            time,
            lat: self.lat / n,
            lon: self.lon / n,
            alt_gps: self.alt_gps / n,
            alt_pressure: (self.n_pressure > 0).then(|| self.alt_pressure / self.n_pressure as f64),
        }
    }
}

/// Et innlest spor (én fil).
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub path: Option<PathBuf>,
    pub series: SampleSeries,
}

impl Track {
    pub fn new(series: SampleSeries, path: Option<&Path>) -> Self {
        let name = path
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string());
        Self { name, path: path.map(Path::to_path_buf), series }
    }
}
