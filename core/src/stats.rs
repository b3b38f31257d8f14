// core/src/stats.rs
//
// Rapporteringsstatistikk over faser: per spor, per samling og sammendrag.
// Leser faser read-only; ingen tilstand.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::models::SampleSeries;
use crate::phase::Phase;
use crate::units::{RoundTo, SECS_PER_HOUR};

/// [min, max] avrundet til 1 desimal, [0, 0] når tomt.
fn range_1dp(vals: &[f64]) -> [f64; 2] {
    let min = vals.iter().copied().map(OrderedFloat).min();
    let max = vals.iter().copied().map(OrderedFloat).max();
    match (min, max) {
        (Some(a), Some(b)) => [a.0.round_to(1), b.0.round_to(1)],
        _ => [0.0, 0.0],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub up_count: usize,
    pub down_count: usize,
    /// Rå faserater (m/h) for stigende faser.
    pub climb_range: [f64; 2],
    /// Rå faserater (m/h, negative) for synkende faser.
    pub descent_range: [f64; 2],
    pub alt_range: [f64; 2],
    pub total_climb: f64,
    pub total_descent: f64,
}

#[derive(Default)]
struct GroupAcc {
    count: usize,
    up_count: usize,
    down_count: usize,
    total_climb: f64,
    total_descent: f64,
    climb_rates: Vec<f64>,
    descent_rates: Vec<f64>,
    alts: Vec<f64>,
}

impl GroupAcc {
    fn add(&mut self, p: &Phase) {
        self.count += 1;
        if p.height_m() > 0.0 {
            self.up_count += 1;
            self.total_climb += p.height_m();
            self.climb_rates.push(p.rate_mh());
        } else {
            self.down_count += 1;
            self.total_descent += p.height_m().abs();
            self.descent_rates.push(p.rate_mh());
        }
        self.alts.push(p.min_alt_m());
        self.alts.push(p.max_alt_m());
    }

    fn finish(self) -> GroupStats {
        if self.count == 0 {
            return GroupStats::default();
        }
        GroupStats {
            count: self.count,
            up_count: self.up_count,
            down_count: self.down_count,
            climb_range: range_1dp(&self.climb_rates),
            descent_range: range_1dp(&self.descent_rates),
            alt_range: range_1dp(&self.alts),
            total_climb: self.total_climb.round_to(0),
            total_descent: self.total_descent.round_to(0),
        }
    }
}

/// Globale tall for ett spor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStats {
    pub date: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_s: f64,
    pub min_alt: f64,
    pub max_alt: f64,
    pub total_dist_km: f64,
    pub total_climb: f64,
    pub total_descent: f64,
    pub flight_phases: GroupStats,
    pub walk_phases: GroupStats,
}

/// `None` når sporet er tomt eller ikke har faser.
pub fn track_stats(series: &SampleSeries, phases: &[Phase]) -> Option<TrackStats> {
    if phases.is_empty() {
        return None;
    }
    let start_time = series.start_time()?;
    let end_time = series.end_time()?;

    let total_climb: f64 = phases.iter().map(Phase::height_m).filter(|h| *h > 0.0).sum();
    let total_descent: f64 = phases.iter().map(Phase::height_m).filter(|h| *h < 0.0).map(f64::abs).sum();
    let total_dist: f64 = phases.iter().map(Phase::distance_m).sum();

    let mut flight = GroupAcc::default();
    let mut walk = GroupAcc::default();
    for p in phases {
        if p.is_flight() { flight.add(p) } else { walk.add(p) }
    }

    Some(TrackStats {
        date: start_time.format("%Y-%m-%d").to_string(),
        start_time,
        end_time,
        duration_s: series.duration().num_seconds() as f64,
        min_alt: series.min_altitude().unwrap_or(0.0).round_to(1),
        max_alt: series.max_altitude().unwrap_or(0.0).round_to(1),
        total_dist_km: (total_dist / 1000.0).round_to(2),
        total_climb: total_climb.round_to(0),
        total_descent: total_descent.round_to(0),
        flight_phases: flight.finish(),
        walk_phases: walk.finish(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MinAvgMax {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl MinAvgMax {
    /// Avrundet til 2 desimaler, nuller når tomt.
    pub fn of(vals: &[f64]) -> Self {
        if vals.is_empty() {
            return Self::default();
        }
        let min = vals.iter().copied().map(OrderedFloat).min().map_or(0.0, |x| x.0);
        let max = vals.iter().copied().map(OrderedFloat).max().map_or(0.0, |x| x.0);
        let avg = vals.iter().sum::<f64>() / vals.len() as f64;
        Self { min: min.round_to(2), avg: avg.round_to(2), max: max.round_to(2) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionalStats {
    /// Flyrater i m/s, gårater i m/h (absoluttverdi).
    pub rate: MinAvgMax,
    pub elevation: MinAvgMax,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityStats {
    pub climb: DirectionalStats,
    pub descent: DirectionalStats,
    /// Distanse per fil (km).
    pub distance: MinAvgMax,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_files: usize,
    pub walk: ActivityStats,
    pub flight: ActivityStats,
}

#[derive(Default)]
struct ActivityAcc {
    climb_rate: Vec<f64>,
    climb_elev: Vec<f64>,
    descent_rate: Vec<f64>,
    descent_elev: Vec<f64>,
    file_distances: Vec<f64>,
}

impl ActivityAcc {
    fn finish(self) -> ActivityStats {
        ActivityStats {
            climb: DirectionalStats {
                rate: MinAvgMax::of(&self.climb_rate),
                elevation: MinAvgMax::of(&self.climb_elev),
            },
            descent: DirectionalStats {
                rate: MinAvgMax::of(&self.descent_rate),
                elevation: MinAvgMax::of(&self.descent_elev),
            },
            distance: MinAvgMax::of(&self.file_distances),
        }
    }
}

/// Statistikk over flere spor (hvert element = fasene til ett spor).
pub fn collection_stats<'a, I>(tracks: I) -> CollectionStats
where
    I: IntoIterator<Item = &'a [Phase]>,
{
    let mut walk = ActivityAcc::default();
    let mut flight = ActivityAcc::default();
    let mut total_files = 0usize;

    for phases in tracks {
        total_files += 1;
        let (mut f_dist, mut w_dist) = (0.0, 0.0);

        for p in phases {
            let acc = if p.is_flight() { &mut flight } else { &mut walk };
            let display_rate = (if p.is_flight() { p.rate_mh() / SECS_PER_HOUR } else { p.rate_mh() }).abs();
            if p.rate_mh() > 0.0 {
                acc.climb_rate.push(display_rate);
                acc.climb_elev.push(p.height_m().abs());
            } else {
                acc.descent_rate.push(display_rate);
                acc.descent_elev.push(p.height_m().abs());
            }
            if p.is_flight() { f_dist += p.distance_m() } else { w_dist += p.distance_m() }
        }

        flight.file_distances.push(f_dist / 1000.0);
        walk.file_distances.push(w_dist / 1000.0);
    }

    CollectionStats { total_files, walk: walk.finish(), flight: flight.finish() }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub hike_and_fly: usize,
    pub fly_only: usize,
    pub walk_only: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryAverages {
    pub walk_dist: f64,
    pub walk_duration_min: f64,
    pub walk_climb_rate: f64,
    pub walk_d_plus: f64,
    pub fly_dist: f64,
    pub fly_duration_min: f64,
    pub fly_d_plus: f64,
    pub fly_d_minus: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub counts: SummaryCounts,
    pub averages: SummaryAverages,
}

fn avg_1dp(vals: &[f64]) -> f64 {
    if vals.is_empty() { 0.0 } else { (vals.iter().sum::<f64>() / vals.len() as f64).round_to(1) }
}

/// Overordnede nøkkeltall: hvor mange spor som er hike&fly / kun fly / kun gå,
/// og snitt per spor for hver aktivitet.
pub fn summary_stats<'a, I>(tracks: I) -> SummaryStats
where
    I: IntoIterator<Item = &'a [Phase]>,
{
    let mut counts = SummaryCounts::default();
    let mut walk_dist = Vec::new();
    let mut walk_dur = Vec::new();
    let mut walk_rate = Vec::new();
    let mut walk_dp = Vec::new();
    let mut fly_dist = Vec::new();
    let mut fly_dur = Vec::new();
    let mut fly_dp = Vec::new();
    let mut fly_dm = Vec::new();

    for phases in tracks {
        counts.total += 1;
        let has_f = phases.iter().any(Phase::is_flight);
        let has_w = phases.iter().any(|p| !p.is_flight());
        match (has_f, has_w) {
            (true, true) => counts.hike_and_fly += 1,
            (true, false) => counts.fly_only += 1,
            (false, true) => counts.walk_only += 1,
            (false, false) => {}
        }

        let (mut w_dist, mut w_dur, mut w_dp) = (0.0, 0.0, 0.0);
        let (mut f_dist, mut f_dur, mut f_dp, mut f_dm) = (0.0, 0.0, 0.0, 0.0);
        let mut w_rates = Vec::new();

        for p in phases {
            if p.is_flight() {
                f_dist += p.distance_m();
                f_dur += p.duration_s();
                if p.height_m() > 0.0 { f_dp += p.height_m() } else { f_dm += p.height_m().abs() }
            } else {
                w_dist += p.distance_m();
                w_dur += p.duration_s();
                if p.height_m() > 0.0 {
                    w_dp += p.height_m();
                    w_rates.push(p.rate_mh());
                }
            }
        }

        if has_w {
            walk_dist.push(w_dist / 1000.0);
            walk_dur.push(w_dur / 60.0);
            walk_dp.push(w_dp);
            if !w_rates.is_empty() {
                walk_rate.push(w_rates.iter().sum::<f64>() / w_rates.len() as f64);
            }
        }
        if has_f {
            fly_dist.push(f_dist / 1000.0);
            fly_dur.push(f_dur / 60.0);
            fly_dp.push(f_dp);
            fly_dm.push(f_dm);
        }
    }

    SummaryStats {
        counts,
        averages: SummaryAverages {
            walk_dist: avg_1dp(&walk_dist),
            walk_duration_min: avg_1dp(&walk_dur),
            walk_climb_rate: avg_1dp(&walk_rate),
            walk_d_plus: avg_1dp(&walk_dp),
            fly_dist: avg_1dp(&fly_dist),
            fly_duration_min: avg_1dp(&fly_dur),
            fly_d_plus: avg_1dp(&fly_dp),
            fly_d_minus: avg_1dp(&fly_dm),
        },
    }
}
