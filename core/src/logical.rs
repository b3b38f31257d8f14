use chrono::{DateTime, Duration, Utc};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::error::HfError;
use crate::models::{Activity, Sample};
use crate::phase::Phase;
use crate::units::{RoundTo, SECS_PER_HOUR};

/// Enhet for snittratene: fly rapporteres i m/s, gåing i m/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateUnit {
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "m/h")]
    MetersPerHour,
}

impl RateUnit {
    pub fn for_activity(activity: Activity) -> Self {
        if activity.is_flight() { RateUnit::MetersPerSecond } else { RateUnit::MetersPerHour }
    }

    /// Konverterer fra m/h.
    pub fn from_mh(self, rate_mh: f64) -> f64 {
        match self {
            RateUnit::MetersPerSecond => rate_mh / SECS_PER_HOUR,
            RateUnit::MetersPerHour => rate_mh,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            RateUnit::MetersPerSecond => "m/s",
            RateUnit::MetersPerHour => "m/h",
        }
    }
}

/// Påfølgende faser med samme aktivitet slått sammen til én rapporteringsenhet.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalPhase {
    activity: Activity,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_s: f64,
    distance_m: f64,
    d_plus_m: f64,
    d_minus_m: f64,
    min_alt_m: f64,
    max_alt_m: f64,
    avg_climb_rate: f64,
    avg_descent_rate: f64,
    rate_unit: RateUnit,
    phase_count: usize,
    #[serde(skip)]
    phases: Vec<Phase>,
    #[serde(skip)]
    samples: Vec<Sample>,
}

impl LogicalPhase {
    /// Feiler med `DegenerateLogicalPhase` for tom gruppe.
    pub fn new(phases: Vec<Phase>) -> Result<Self, HfError> {
        let mut it = phases.into_iter();
        let head = it.next().ok_or(HfError::DegenerateLogicalPhase)?;
        Ok(Self::from_parts(head, it.collect()))
    }

    /// Ikke-tom gruppe per konstruksjon: `head` + resten.
    fn from_parts(head: Phase, tail: Vec<Phase>) -> Self {
        let activity = head.activity();
        let mut phases = Vec::with_capacity(tail.len() + 1);
        phases.push(head);
        phases.extend(tail);

        // Slå sammen utsnittene; like tidsstempler på grensene beholdes én gang (første)
        let mut samples: Vec<Sample> = phases.iter().flat_map(|p| p.samples().iter().copied()).collect();
        samples.sort_by_key(|s| s.time);
        samples.dedup_by_key(|s| s.time);

        let start_time = samples.first().map_or(phases[0].start_time(), |s| s.time);
        let end_time = samples.last().map_or(phases[phases.len() - 1].end_time(), |s| s.time);

        let distance_m = phases.iter().map(Phase::distance_m).sum();
        let d_plus_m = phases.iter().map(Phase::height_m).filter(|h| *h > 0.0).sum();
        let d_minus_m = phases.iter().map(Phase::height_m).filter(|h| *h < 0.0).map(f64::abs).sum();

        let min_alt_m = phases.iter().map(|p| OrderedFloat(p.min_alt_m())).min().map_or(0.0, |x| x.0);
        let max_alt_m = phases.iter().map(|p| OrderedFloat(p.max_alt_m())).max().map_or(0.0, |x| x.0);

        let rate_unit = RateUnit::for_activity(activity);
        let climb: Vec<f64> = phases.iter().map(Phase::rate_mh).filter(|r| *r > 0.0).collect();
        let descent: Vec<f64> = phases.iter().map(Phase::rate_mh).filter(|r| *r < 0.0).map(f64::abs).collect();

        Self {
            activity,
            start_time,
            end_time,
            duration_s: (end_time - start_time).num_milliseconds() as f64 / 1000.0,
            distance_m,
            d_plus_m,
            d_minus_m,
            min_alt_m: min_alt_m.round_to(1),
            max_alt_m: max_alt_m.round_to(1),
            avg_climb_rate: avg_rate(&climb, rate_unit),
            avg_descent_rate: avg_rate(&descent, rate_unit),
            rate_unit,
            phase_count: phases.len(),
            phases,
            samples,
        }
    }

    #[inline] pub fn activity(&self) -> Activity { self.activity }
    #[inline] pub fn is_flight(&self) -> bool { self.activity.is_flight() }
    #[inline] pub fn phases(&self) -> &[Phase] { &self.phases }
    #[inline] pub fn samples(&self) -> &[Sample] { &self.samples }
    #[inline] pub fn start_time(&self) -> DateTime<Utc> { self.start_time }
    #[inline] pub fn end_time(&self) -> DateTime<Utc> { self.end_time }
    #[inline] pub fn duration_s(&self) -> f64 { self.duration_s }
    #[inline] pub fn distance_m(&self) -> f64 { self.distance_m }
    /// Total stigning (d+), m.
    #[inline] pub fn d_plus_m(&self) -> f64 { self.d_plus_m }
    /// Total nedstigning (d-), m, positivt tall.
    #[inline] pub fn d_minus_m(&self) -> f64 { self.d_minus_m }
    #[inline] pub fn min_alt_m(&self) -> f64 { self.min_alt_m }
    #[inline] pub fn max_alt_m(&self) -> f64 { self.max_alt_m }
    /// Snitt av positive faserater, i `rate_unit()`.
    #[inline] pub fn avg_climb_rate(&self) -> f64 { self.avg_climb_rate }
    /// Snitt av |negative faserater|, i `rate_unit()`.
    #[inline] pub fn avg_descent_rate(&self) -> f64 { self.avg_descent_rate }
    #[inline] pub fn rate_unit(&self) -> RateUnit { self.rate_unit }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

fn avg_rate(rates_mh: &[f64], unit: RateUnit) -> f64 {
    if rates_mh.is_empty() {
        return 0.0;
    }
    let avg = rates_mh.iter().sum::<f64>() / rates_mh.len() as f64;
    unit.from_mh(avg).round_to(2)
}

/// Grupperer påfølgende faser med lik aktivitet. Rekkefølgen beholdes.
pub fn aggregate(phases: &[Phase]) -> Vec<LogicalPhase> {
    let mut out = Vec::new();
    let mut iter = phases.iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let mut head = first.clone();
    let mut tail: Vec<Phase> = Vec::new();
    for p in iter {
        if p.activity() == head.activity() {
            tail.push(p.clone());
        } else {
            let done = std::mem::replace(&mut head, p.clone());
            out.push(LogicalPhase::from_parts(done, std::mem::take(&mut tail)));
        }
    }
    out.push(LogicalPhase::from_parts(head, tail));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use crate::models::Direction;
    use chrono::TimeZone;

    fn phase(start_s: i64, n: usize, step_s: i64, d_alt: f64, dir: Direction) -> Phase {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let samples = (0..n)
            .map(|i| {
                Sample::new(
                    t0 + Duration::seconds(start_s + step_s * i as i64),
                    45.0,
                    6.0 + 0.0001 * i as f64,
                    1000.0 + d_alt * i as f64,
                    None,
                )
            })
            .collect();
        Phase::from_samples(samples, dir, &SegmentConfig::default().thresholds()).unwrap()
    }

    #[test]
    fn empty_group_is_degenerate() {
        assert!(matches!(LogicalPhase::new(Vec::new()), Err(HfError::DegenerateLogicalPhase)));
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn groups_consecutive_same_activity() {
        // gå opp, gå opp, fly ned, gå opp
        let walk1 = phase(0, 10, 60, 5.0, Direction::Up);
        let walk2 = phase(600, 10, 60, 8.0, Direction::Up);
        let fly = phase(1200, 10, 10, -10.0, Direction::Down);
        let walk3 = phase(1400, 5, 60, 3.0, Direction::Up);
        assert!(fly.is_flight());
        assert!(!walk1.is_flight() && !walk2.is_flight() && !walk3.is_flight());

        let lps = aggregate(&[walk1, walk2, fly, walk3]);
        let kinds: Vec<Activity> = lps.iter().map(LogicalPhase::activity).collect();
        assert_eq!(kinds, vec![Activity::Walk, Activity::Flight, Activity::Walk]);
        assert_eq!(lps[0].phases().len(), 2);
        assert!((lps[0].d_plus_m() - (45.0 + 72.0)).abs() < 1e-9);
        assert_eq!(lps[0].d_minus_m(), 0.0);
        assert_eq!(lps[0].rate_unit(), RateUnit::MetersPerHour);
        assert!((lps[1].d_minus_m() - 90.0).abs() < 1e-9);
        assert_eq!(lps[1].rate_unit(), RateUnit::MetersPerSecond);
        // 90 m på 90 s = 1 m/s
        assert!((lps[1].avg_descent_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_phase_is_valid_group() {
        let p = phase(0, 10, 60, 5.0, Direction::Up);
        let lp = LogicalPhase::new(vec![p.clone()]).unwrap();
        assert_eq!(lp.phases().len(), 1);
        assert_eq!(lp.start_time(), p.start_time());
        assert_eq!(lp.end_time(), p.end_time());
        assert!((lp.distance_m() - p.distance_m()).abs() < 1e-9);
        // 45 m på 9 min = 300 m/h
        assert!((lp.avg_climb_rate() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn boundary_duplicates_collapse() {
        let a = phase(0, 5, 60, 1.0, Direction::Up);
        let b = phase(240, 5, 60, 1.0, Direction::Up);
        // siste punkt i a == første punkt i b (t = 240)
        let lp = LogicalPhase::new(vec![a, b]).unwrap();
        assert_eq!(lp.samples().len(), 9);
        assert!(lp.samples().windows(2).all(|w| w[0].time < w[1].time));
    }
}
