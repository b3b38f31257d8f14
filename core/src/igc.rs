// core/src/igc.rs
//
// Innlesing av IGC-filer. Format:
// https://xp-soaring.github.io/igc_file_format/igc_format_2008.html
//
// B-record (fast bredde, 35 tegn):
//   B HHMMSS DDMMmmmN DDDMMmmmE V PPPPP GGGGG

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::HfError;
use crate::models::{Sample, SampleSeries, Track};

/// Port for innlesing av sporfiler.
pub trait TrackReader: Send + Sync {
    fn can_handle(&self, path: &Path) -> bool;
    /// Hele filen leses, ellers feiler kallet. Aldri en halvferdig serie.
    fn read(&self, path: &Path) -> Result<Track, HfError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IgcReader;

impl TrackReader for IgcReader {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("igc"))
    }

    fn read(&self, path: &Path) -> Result<Track, HfError> {
        let bytes = std::fs::read(path)?;
        let contents = String::from_utf8_lossy(&bytes);
        let samples = parse_igc(&contents)?;
        let series = SampleSeries::new(samples)?;
        log::debug!("read {} fixes from {}", series.len(), path.display());
        Ok(Track::new(series, Some(path)))
    }
}

/// `HFDTEDDMMYY` eller `HFDTEDATE:DDMMYY,NN`.
fn parse_hfdte(line: &str) -> Option<NaiveDate> {
    let rest = line.get(5..)?.trim();
    let rest = rest.rsplit(':').next()?.trim();
    let digits = rest.get(0..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let year: i32 = 2000 + digits[4..6].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

struct Fix {
    time: NaiveTime,
    lat: f64,
    lon: f64,
    alt_pressure: f64,
    alt_gps: f64,
}

fn field<'a>(line: &'a str, a: usize, b: usize, what: &str) -> Result<&'a str, String> {
    line.get(a..b).ok_or_else(|| format!("missing {what}"))
}

fn num<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.trim().parse::<T>().map_err(|_| format!("bad {what} `{s}`"))
}

fn parse_b_record(line: &str) -> Result<Fix, String> {
    if line.len() < 35 {
        return Err(format!("record too short ({} chars)", line.len()));
    }

    let hh: u32 = num(field(line, 1, 3, "hour")?, "hour")?;
    let mm: u32 = num(field(line, 3, 5, "minute")?, "minute")?;
    let ss: u32 = num(field(line, 5, 7, "second")?, "second")?;
    let time = NaiveTime::from_hms_opt(hh, mm, ss).ok_or_else(|| format!("bad time {hh:02}{mm:02}{ss:02}"))?;

    // DDMMmmm: minutter med tre desimaler
    let lat_deg: f64 = num(field(line, 7, 9, "latitude")?, "latitude")?;
    let lat_min: f64 = num::<f64>(field(line, 9, 14, "latitude")?, "latitude")? / 1000.0;
    let mut lat = lat_deg + lat_min / 60.0;
    match field(line, 14, 15, "N/S")? {
        "N" => {}
        "S" => lat = -lat,
        other => return Err(format!("bad hemisphere `{other}`")),
    }

    let lon_deg: f64 = num(field(line, 15, 18, "longitude")?, "longitude")?;
    let lon_min: f64 = num::<f64>(field(line, 18, 23, "longitude")?, "longitude")? / 1000.0;
    let mut lon = lon_deg + lon_min / 60.0;
    match field(line, 23, 24, "E/W")? {
        "E" => {}
        "W" => lon = -lon,
        other => return Err(format!("bad hemisphere `{other}`")),
    }

    let alt_pressure: i32 = num(field(line, 25, 30, "pressure altitude")?, "pressure altitude")?;
    let alt_gps: i32 = num(field(line, 30, 35, "GPS altitude")?, "GPS altitude")?;

    Ok(Fix { time, lat, lon, alt_pressure: f64::from(alt_pressure), alt_gps: f64::from(alt_gps) })
}

/// Parser hele IGC-innholdet til sorterte samples med unike tidsstempler.
///
/// Feilformet B-record gir feil for hele filen (med linjenummer). Mangler
/// `HFDTE` brukes dagens dato (UTC). Passerer sporet midnatt (klokka går
/// tilbake mer enn 12 t) flyttes datoen én dag frem.
pub fn parse_igc(contents: &str) -> Result<Vec<Sample>, HfError> {
    let date = contents
        .lines()
        .filter(|l| l.starts_with("HFDTE"))
        .find_map(parse_hfdte)
        .unwrap_or_else(|| {
            let today = Utc::now().date_naive();
            log::warn!("no HFDTE header, assuming {today}");
            today
        });

    let mut samples = Vec::new();
    let mut day_offset = 0i64;
    let mut prev_time: Option<NaiveTime> = None;

    for (i, line) in contents.lines().enumerate() {
        let line = line.trim_end();
        if !line.starts_with('B') {
            continue;
        }
        let fix = parse_b_record(line).map_err(|reason| HfError::Igc { line: i + 1, reason })?;

        if let Some(prev) = prev_time {
            if fix.time < prev && prev - fix.time > Duration::hours(12) {
                day_offset += 1;
            }
        }
        prev_time = Some(fix.time);

        let naive = date.and_time(fix.time) + Duration::days(day_offset);
        samples.push(Sample::new(
            Utc.from_utc_datetime(&naive),
            fix.lat,
            fix.lon,
            fix.alt_gps,
            Some(fix.alt_pressure),
        ));
    }

    samples.sort_by_key(|s| s.time);
    let before = samples.len();
    samples.dedup_by_key(|s| s.time);
    if samples.len() < before {
        log::warn!("dropped {} fix(es) with duplicate timestamps", before - samples.len());
    }

    Ok(samples)
}
