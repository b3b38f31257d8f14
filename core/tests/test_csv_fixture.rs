use chrono::{DateTime, Utc};
use hikefly_core::{aggregate, segment, Activity, Direction, Sample, SampleSeries, SegmentConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Row {
    time: DateTime<Utc>,
    lat: f64,
    lon: f64,
    alt_gps: f64,
    alt_pressure: Option<f64>,
}

fn load_fixture() -> SampleSeries {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/short_hike.csv");
    let mut rdr = csv::Reader::from_path(path).expect("fixture present");
    let samples = rdr
        .deserialize::<Row>()
        .map(|r| {
            let r = r.expect("valid row");
            Sample::new(r.time, r.lat, r.lon, r.alt_gps, r.alt_pressure)
        })
        .collect();
    SampleSeries::new(samples).expect("fixture is time-ordered")
}

#[test]
fn fixture_parses_with_missing_pressure() {
    let series = load_fixture();
    assert_eq!(series.len(), 40);
    assert!(series.samples()[4].alt_pressure.is_none());
    assert_eq!(series.samples()[0].alt_pressure, Some(1186.0));

    let resampled = series.resample(SegmentConfig::default().resample_interval()).unwrap();
    assert_eq!(resampled.len(), 20);
    // bøtte 2 = samples 4 og 5, bare 5 har trykkhøyde
    assert_eq!(resampled.samples()[2].alt_pressure, Some(1196.0));
}

#[test]
fn slow_climb_is_one_walk_phase() {
    let series = load_fixture();
    let phases = segment(&series, &SegmentConfig::default()).unwrap();
    assert_eq!(phases.len(), 1);
    let p = &phases[0];
    assert_eq!(p.direction(), Direction::Up);
    assert_eq!(p.activity(), Activity::Walk);
    // siste bøtte er stemplet ved starten, så siste sample faller utenfor
    assert_eq!(p.len(), 39);
    assert!((p.height_m() - 76.0).abs() < 1e-9);

    let lps = aggregate(&phases);
    assert_eq!(lps.len(), 1);
    assert!((lps[0].d_plus_m() - 76.0).abs() < 1e-9);
}
