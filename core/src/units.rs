// core/src/units.rs

pub const SECS_PER_HOUR: f64 = 3600.0;

pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Sekunder → timer (brukes i alle rater m/h og km/h).
#[inline]
pub fn hours(secs: f64) -> f64 {
    secs / SECS_PER_HOUR
}

/// Fart i km/h fra meter og timer. 0 når varigheten er 0.
#[inline]
pub fn speed_kmh(metres: f64, duration_hours: f64) -> f64 {
    if duration_hours > 0.0 { (metres / 1000.0) / duration_hours } else { 0.0 }
}

/// Vertikalrate i m/h. 0 når varigheten er 0.
#[inline]
pub fn rate_mh(height_m: f64, duration_hours: f64) -> f64 {
    if duration_hours > 0.0 { height_m / duration_hours } else { 0.0 }
}
