use std::fmt;

use chrono::{DateTime, Duration, Utc};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::config::ActivityThresholds;
use crate::geodesy;
use crate::models::{Activity, Direction, Sample};
use crate::units::{hours, rate_mh, speed_kmh};

/// Sammenhengende utsnitt av den originale serien med én retning og én aktivitet.
///
/// Bygges i ett steg når utsnittet er ferdig: høyde, varighet, rate, distanse,
/// fart og aktivitet er kjent før verdien finnes, og den endres aldri etterpå.
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    direction: Direction,
    activity: Activity,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    height_m: f64,
    duration_s: f64,
    rate_mh: f64,
    distance_m: f64,
    speed_kmh: f64,
    min_alt_m: f64,
    max_alt_m: f64,
    #[serde(skip)]
    samples: Vec<Sample>,
}

impl Phase {
    /// `None` for tomt utsnitt – tomme faser sendes aldri ut.
    pub fn from_samples(
        samples: Vec<Sample>,
        direction: Direction,
        thresholds: &ActivityThresholds,
    ) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;
        let (start_time, end_time) = (first.time, last.time);

        let min_alt_m = samples.iter().map(|s| OrderedFloat(s.alt_gps)).min()?.0;
        let max_alt_m = samples.iter().map(|s| OrderedFloat(s.alt_gps)).max()?.0;

        // Høyde = høydespenn i utsnittet, fortegn etter retning
        let height_m = direction.sign() * (max_alt_m - min_alt_m);
        let duration_s = (end_time - start_time).num_milliseconds() as f64 / 1000.0;
        let duration_h = hours(duration_s);
        let rate = rate_mh(height_m, duration_h);

        // Distanse krever hele utsnittet
        let distance_m = geodesy::path_length_m(&samples);
        let speed = speed_kmh(distance_m, duration_h);

        let activity = if thresholds.is_flight(speed, rate) { Activity::Flight } else { Activity::Walk };

        Some(Self {
            direction,
            activity,
            start_time,
            end_time,
            height_m,
            duration_s,
            rate_mh: rate,
            distance_m,
            speed_kmh: speed,
            min_alt_m,
            max_alt_m,
            samples,
        })
    }

    #[inline] pub fn direction(&self) -> Direction { self.direction }
    #[inline] pub fn is_up(&self) -> bool { self.direction.is_up() }
    #[inline] pub fn activity(&self) -> Activity { self.activity }
    #[inline] pub fn is_flight(&self) -> bool { self.activity.is_flight() }
    /// Signert høydeforskjell (m).
    #[inline] pub fn height_m(&self) -> f64 { self.height_m }
    #[inline] pub fn duration_s(&self) -> f64 { self.duration_s }
    #[inline] pub fn duration_hours(&self) -> f64 { hours(self.duration_s) }
    /// m/h, 0 ved null varighet.
    #[inline] pub fn rate_mh(&self) -> f64 { self.rate_mh }
    #[inline] pub fn distance_m(&self) -> f64 { self.distance_m }
    /// km/h
    #[inline] pub fn speed_kmh(&self) -> f64 { self.speed_kmh }
    #[inline] pub fn min_alt_m(&self) -> f64 { self.min_alt_m }
    #[inline] pub fn max_alt_m(&self) -> f64 { self.max_alt_m }
    #[inline] pub fn start_time(&self) -> DateTime<Utc> { self.start_time }
    #[inline] pub fn end_time(&self) -> DateTime<Utc> { self.end_time }
    #[inline] pub fn samples(&self) -> &[Sample] { &self.samples }
    #[inline] pub fn len(&self) -> usize { self.samples.len() }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Phase {} : {} -> {} | Height: {:.0}m",
            self.direction,
            self.start_time.format("%H:%M:%S"),
            self.end_time.format("%H:%M:%S"),
            self.height_m
        )
    }
}
