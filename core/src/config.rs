// core/src/config.rs
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::HfError;

/// Terskler for klassifisering gå/fly. Deles av motoren (per sample) og Phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityThresholds {
    pub flight_speed_kmh: f64,
    pub flight_vertical_rate_mh: f64,
}

impl ActivityThresholds {
    /// Fly hvis fart > terskel ELLER |vertikalrate| > terskel.
    #[inline]
    pub fn is_flight(&self, speed_kmh: f64, rate_mh: f64) -> bool {
        speed_kmh > self.flight_speed_kmh || rate_mh.abs() > self.flight_vertical_rate_mh
    }
}

/// Alle justerbare konstanter for segmenteringen. Sendes eksplisitt inn i
/// `segment`, ingen globale konstanter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Bøttebredde for resampling (sek).
    pub resample_interval_secs: u32,
    /// Antall påfølgende uenige resamplede punkter før et tilstandsskifte godtas.
    pub confirmation_window: usize,
    /// Toleransebånd (m) mot gjeldende retning.
    pub altitude_hysteresis_m: f64,
    pub flight_speed_kmh: f64,
    pub flight_vertical_rate_mh: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            resample_interval_secs: 60,
            confirmation_window: 10,
            altitude_hysteresis_m: 10.0,
            flight_speed_kmh: 15.0,
            flight_vertical_rate_mh: 1000.0,
        }
    }
}

impl SegmentConfig {
    pub fn with_resample_secs(mut self, secs: u32) -> Self {
        self.resample_interval_secs = secs;
        self
    }

    pub fn resample_interval(&self) -> Duration {
        Duration::seconds(i64::from(self.resample_interval_secs))
    }

    pub fn thresholds(&self) -> ActivityThresholds {
        ActivityThresholds {
            flight_speed_kmh: self.flight_speed_kmh,
            flight_vertical_rate_mh: self.flight_vertical_rate_mh,
        }
    }

    pub fn validate(&self) -> Result<(), HfError> {
        if self.resample_interval_secs == 0 {
            return Err(HfError::InvalidParameter("resample_interval_secs must be > 0".into()));
        }
        if self.confirmation_window == 0 {
            return Err(HfError::InvalidParameter("confirmation_window must be >= 1".into()));
        }
        if !self.altitude_hysteresis_m.is_finite() || self.altitude_hysteresis_m < 0.0 {
            return Err(HfError::InvalidParameter(format!(
                "altitude_hysteresis_m must be finite and >= 0, got {}",
                self.altitude_hysteresis_m
            )));
        }
        if !self.flight_speed_kmh.is_finite() || !self.flight_vertical_rate_mh.is_finite() {
            return Err(HfError::InvalidParameter("flight thresholds must be finite".into()));
        }
        Ok(())
    }

    /// Parser og validerer. Feil peker på JSON-stien til feltet.
    pub fn from_json_str(json: &str) -> Result<Self, HfError> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let cfg: SegmentConfig = serde_path_to_error::deserialize(de)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Leser konfig fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-konfig.
pub fn load_config(path: impl AsRef<Path>) -> Result<SegmentConfig, HfError> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let cfg = SegmentConfig::from_json_str(&contents)?;
        log::info!("config loaded from {} ({:?})", path.display(), cfg);
        Ok(cfg)
    } else {
        log::warn!("no config at {}, using defaults", path.display());
        Ok(SegmentConfig::default())
    }
}
