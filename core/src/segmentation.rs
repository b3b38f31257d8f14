// core/src/segmentation.rs
//
// Fasesegmentering: én sekvensiell passering over den resamplede serien.
// Beslutninger tas på resamplet grid, faser skjæres alltid fra originalserien.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ActivityThresholds, SegmentConfig};
use crate::error::HfError;
use crate::geodesy;
use crate::models::{Activity, Direction, Sample, SampleSeries};
use crate::phase::Phase;
use crate::units::{hours, rate_mh, speed_kmh};

/// Hvorfor et tilstandsskifte ble bekreftet. Avgjøres av punktet som fylte
/// bekreftelsesvinduet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCause {
    Direction,
    Activity,
    Both,
}

impl TransitionCause {
    /// `None` når punktet er i takt med gjeldende tilstand.
    fn classify(direction_aligned: bool, activity_aligned: bool) -> Option<Self> {
        match (direction_aligned, activity_aligned) {
            (true, true) => None,
            (false, true) => Some(TransitionCause::Direction),
            (true, false) => Some(TransitionCause::Activity),
            (false, false) => Some(TransitionCause::Both),
        }
    }

    /// Retningen snus kun ved retningsbrudd, aldri ved rent aktivitetsbrudd.
    #[inline]
    pub fn flips_direction(self) -> bool {
        !matches!(self, TransitionCause::Activity)
    }

    pub fn label(self) -> &'static str {
        match self {
            TransitionCause::Direction => "direction",
            TransitionCause::Activity => "activity",
            TransitionCause::Both => "both",
        }
    }
}

/// Et bekreftet skifte, med tilstanden som gjelder etter skiftet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub at: DateTime<Utc>,
    pub cause: TransitionCause,
    pub direction: Direction,
    pub activity: Activity,
}

#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub phases: Vec<Phase>,
    pub transitions: Vec<Transition>,
    /// Utsnitt som ble tomme i originalserien og derfor droppet.
    pub dropped_slices: usize,
}

/// Aktivitets-trigger per resamplet punkt, uavhengig av hysterese-maskinen.
/// Første punkt er alltid `Walk` (ingen forrige punkt å sammenligne med).
pub fn activity_triggers(points: &[Sample], thresholds: &ActivityThresholds) -> Vec<Activity> {
    let mut out = Vec::with_capacity(points.len());
    if points.is_empty() {
        return out;
    }
    out.push(Activity::Walk);

    for w in points.windows(2) {
        let dt_h = hours((w[1].time - w[0].time).num_milliseconds() as f64 / 1000.0);
        let speed = speed_kmh(geodesy::sample_distance_m(&w[0], &w[1]), dt_h);
        let rate = rate_mh(w[1].alt_gps - w[0].alt_gps, dt_h);
        out.push(if thresholds.is_flight(speed, rate) { Activity::Flight } else { Activity::Walk });
    }
    out
}

/// Gjeldende tilstand i maskinen.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    direction: Direction,
    activity: Activity,
    /// Løpende maks når vi stiger, løpende min når vi synker.
    extreme_alt: f64,
    margin_m: f64,
}

impl Cursor {
    /// Sjekker retning mot ekstremhøyden (med hysterese) og flytter ekstremet
    /// når punktet går forbi det.
    fn track_direction(&mut self, alt: f64) -> bool {
        match self.direction {
            Direction::Up => {
                if alt >= self.extreme_alt - self.margin_m {
                    if alt > self.extreme_alt { self.extreme_alt = alt; }
                    true
                } else {
                    false
                }
            }
            Direction::Down => {
                if alt <= self.extreme_alt + self.margin_m {
                    if alt < self.extreme_alt { self.extreme_alt = alt; }
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Ekstremet reseedes til høyden på punktet som utløste skiftet.
    fn reseed(&mut self, cause: TransitionCause, activity: Activity, alt: f64) {
        if cause.flips_direction() {
            self.direction = self.direction.flipped();
        }
        self.activity = activity;
        self.extreme_alt = alt;
    }
}

/// Deler serien i faser. Tom liste når den resamplede serien har < 2 punkter.
pub fn segment(series: &SampleSeries, cfg: &SegmentConfig) -> Result<Vec<Phase>, HfError> {
    Ok(segment_detailed(series, cfg)?.phases)
}

/// Som [`segment`], men returnerer også bekreftede skifter og antall droppede utsnitt.
pub fn segment_detailed(series: &SampleSeries, cfg: &SegmentConfig) -> Result<Segmentation, HfError> {
    cfg.validate()?;
    let resampled = series.resample(cfg.resample_interval())?;
    let points = resampled.samples();

    let mut out = Segmentation::default();
    if points.len() < 2 {
        log::debug!("segment: {} resampled point(s), nothing to split", points.len());
        return Ok(out);
    }

    let thresholds = cfg.thresholds();
    let triggers = activity_triggers(points, &thresholds);

    let mut cursor = Cursor {
        direction: if points[1].alt_gps >= points[0].alt_gps { Direction::Up } else { Direction::Down },
        activity: triggers[0],
        extreme_alt: points[0].alt_gps,
        margin_m: cfg.altitude_hysteresis_m,
    };

    // Bufferne er alltid sammenhengende på resamplet grid:
    // gjeldende fase = points[phase_start..pending_start], ventende = points[pending_start..=k]
    let mut phase_start = 0usize;
    let mut pending_start: Option<usize> = None;
    let mut disagreements = 0usize;

    for (k, (point, &activity)) in points.iter().zip(&triggers).enumerate() {
        let activity_aligned = activity == cursor.activity;
        let direction_aligned = cursor.track_direction(point.alt_gps);

        let Some(cause) = TransitionCause::classify(direction_aligned, activity_aligned) else {
            // Avviket var forbigående: ventende punkter blir del av fasen
            pending_start = None;
            disagreements = 0;
            continue;
        };

        let start = *pending_start.get_or_insert(k);
        disagreements += 1;
        if disagreements < cfg.confirmation_window {
            continue;
        }

        if start > phase_start {
            close_out(series, &points[phase_start..start], cursor.direction, &thresholds, &mut out);
        }
        cursor.reseed(cause, activity, point.alt_gps);
        log::debug!(
            "transition at {} ({}): now {} / {}",
            point.time,
            cause.label(),
            cursor.direction,
            cursor.activity
        );
        out.transitions.push(Transition {
            at: point.time,
            cause,
            direction: cursor.direction,
            activity: cursor.activity,
        });

        phase_start = start;
        pending_start = None;
        disagreements = 0;
    }

    // Sporet slutter alltid med en fase (gjeldende + ventende)
    close_out(series, &points[phase_start..], cursor.direction, &thresholds, &mut out);

    Ok(out)
}

/// Skjærer originalserien mellom første og siste tidsstempel i bufferen (inklusivt).
fn close_out(
    series: &SampleSeries,
    buffer: &[Sample],
    direction: Direction,
    thresholds: &ActivityThresholds,
    out: &mut Segmentation,
) {
    let (Some(first), Some(last)) = (buffer.first(), buffer.last()) else {
        return;
    };
    let slice = series.slice_between(first.time, last.time);
    match Phase::from_samples(slice.to_vec(), direction, thresholds) {
        Some(phase) => out.phases.push(phase),
        None => {
            log::debug!("dropping empty slice {} -> {}", first.time, last.time);
            out.dropped_slices += 1;
        }
    }
}
