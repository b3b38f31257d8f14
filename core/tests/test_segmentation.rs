use chrono::{Duration, TimeZone, Utc};
use hikefly_core::{
    aggregate, segment, segment_detailed, Activity, Direction, HfError, Sample, SampleSeries, SegmentConfig,
    TransitionCause,
};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 12, 9, 0, 0).unwrap()
}

/// 100 punkter à 10 s: opp 500 → 990, så ned 1000 → 510. Ingen horisontal bevegelse.
fn climb_then_descent() -> SampleSeries {
    let samples = (0..100)
        .map(|i| {
            let alt = if i < 50 { 500.0 + 10.0 * i as f64 } else { 1000.0 - 10.0 * (i - 50) as f64 };
            Sample::new(t0() + Duration::seconds(10 * i), 45.9, 6.87, alt, None)
        })
        .collect();
    SampleSeries::new(samples).unwrap()
}

/// Jevn gange oppover (60 s, +10 m) med en dupp på punktene 40..=42.
fn walk_with_dip(dip_m: f64) -> SampleSeries {
    let mut alts: Vec<f64> = (0..80).map(|i| 500.0 + 10.0 * i as f64).collect();
    let base = alts[39];
    for a in &mut alts[40..=42] {
        *a = base - dip_m;
    }
    let samples = alts
        .iter()
        .enumerate()
        .map(|(i, &alt)| Sample::new(t0() + Duration::seconds(60 * i as i64), 45.9 + 0.0001 * i as f64, 6.87, alt, None))
        .collect();
    SampleSeries::new(samples).unwrap()
}

/// 30 punkter rolig gange oppover (~2 km/h, 360 m/h), så 30 punkter raskt
/// nedover (~20 km/h, -10 800 m/h).
fn hike_then_glide() -> SampleSeries {
    let mut lat = 45.9;
    let samples = (0..60)
        .map(|i| {
            let alt = if i < 30 {
                lat += 0.00005;
                1000.0 + i as f64
            } else {
                lat += 0.0005;
                1029.0 - 30.0 * (i - 29) as f64
            };
            Sample::new(t0() + Duration::seconds(10 * i), lat, 6.87, alt, None)
        })
        .collect();
    SampleSeries::new(samples).unwrap()
}

fn walk_cfg() -> SegmentConfig {
    SegmentConfig {
        confirmation_window: 3,
        flight_vertical_rate_mh: 1e9,
        ..SegmentConfig::default()
    }
}

#[test]
fn climb_and_descent_yield_expected_phases() {
    let series = climb_then_descent();
    let cfg = SegmentConfig::default().with_resample_secs(10);
    let seg = segment_detailed(&series, &cfg).unwrap();

    assert_eq!(seg.phases.len(), 3);
    assert_eq!(seg.dropped_slices, 0);

    // Første punkt har ingen forgjenger og er alltid gange
    assert_eq!(seg.phases[0].activity(), Activity::Walk);
    assert_eq!(seg.phases[0].len(), 1);

    let up = &seg.phases[1];
    assert_eq!(up.direction(), Direction::Up);
    assert_eq!(up.activity(), Activity::Flight);
    assert!((up.height_m() - 490.0).abs() < 1e-9);
    assert!((up.duration_s() - 500.0).abs() < 1e-9);
    assert!((up.rate_mh() - 3528.0).abs() < 1e-6);

    let down = &seg.phases[2];
    assert_eq!(down.direction(), Direction::Down);
    assert_eq!(down.activity(), Activity::Flight);
    assert!((down.height_m() + 470.0).abs() < 1e-9);

    let causes: Vec<_> = seg.transitions.iter().map(|t| t.cause).collect();
    assert_eq!(causes, vec![TransitionCause::Activity, TransitionCause::Direction]);

    let logical = aggregate(&seg.phases);
    assert_eq!(logical.len(), 2);
    assert_eq!(logical[0].activity(), Activity::Walk);
    assert_eq!(logical[1].activity(), Activity::Flight);
}

#[test]
fn phases_partition_the_series() {
    let series = climb_then_descent();
    let cfg = SegmentConfig::default().with_resample_secs(10);
    let phases = segment(&series, &cfg).unwrap();

    let total: usize = phases.iter().map(|p| p.len()).sum();
    assert_eq!(total, series.len());
    for w in phases.windows(2) {
        assert!(w[0].end_time() < w[1].start_time());
    }
    assert_eq!(phases[0].start_time(), series.start_time().unwrap());
    assert_eq!(phases[phases.len() - 1].end_time(), series.end_time().unwrap());
}

#[test]
fn height_sign_and_rate_follow_direction() {
    let series = climb_then_descent();
    let phases = segment(&series, &SegmentConfig::default().with_resample_secs(10)).unwrap();
    for p in &phases {
        match p.direction() {
            Direction::Up => assert!(p.height_m() >= 0.0),
            Direction::Down => assert!(p.height_m() <= 0.0),
        }
        if p.duration_s() > 0.0 {
            let expected = p.height_m() / (p.duration_s() / 3600.0);
            assert!((p.rate_mh() - expected).abs() < 1e-6);
        } else {
            assert_eq!(p.rate_mh(), 0.0);
        }
    }
}

#[test]
fn small_dip_inside_band_is_ignored() {
    let series = walk_with_dip(5.0);
    let phases = segment(&series, &walk_cfg()).unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].direction(), Direction::Up);
    assert_eq!(phases[0].activity(), Activity::Walk);
    assert_eq!(phases[0].len(), series.len());
}

#[test]
fn confirmed_dip_splits_into_three() {
    let series = walk_with_dip(50.0);
    let seg = segment_detailed(&series, &walk_cfg()).unwrap();
    assert_eq!(seg.phases.len(), 3);
    assert_eq!(seg.phases[1].direction(), Direction::Down);
    assert_eq!(seg.phases[1].len(), 3);
    assert!(seg.transitions.iter().all(|t| t.cause == TransitionCause::Direction));
}

#[test]
fn transient_dip_shorter_than_window_is_absorbed() {
    let series = walk_with_dip(50.0);
    let cfg = SegmentConfig { confirmation_window: 4, ..walk_cfg() };
    let phases = segment(&series, &cfg).unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].len(), series.len());
}

#[test]
fn takeoff_flips_direction_and_activity_together() {
    let series = hike_then_glide();
    let cfg = SegmentConfig { confirmation_window: 3, ..SegmentConfig::default().with_resample_secs(10) };
    let seg = segment_detailed(&series, &cfg).unwrap();

    assert_eq!(seg.transitions.len(), 1);
    let t = seg.transitions[0];
    assert_eq!(t.cause, TransitionCause::Both);
    assert_eq!(t.direction, Direction::Down);
    assert_eq!(t.activity, Activity::Flight);
    // bekreftet på tredje uenige punkt (indeks 32)
    assert_eq!(t.at, t0() + Duration::seconds(320));

    assert_eq!(seg.phases.len(), 2);
    assert_eq!(seg.phases[0].direction(), Direction::Up);
    assert_eq!(seg.phases[0].activity(), Activity::Walk);
    assert_eq!(seg.phases[0].len(), 30);
    assert_eq!(seg.phases[1].direction(), Direction::Down);
    assert_eq!(seg.phases[1].activity(), Activity::Flight);
    assert!((seg.phases[1].height_m() + 870.0).abs() < 1e-9);
}

#[test]
fn too_short_series_gives_no_phases() {
    let cfg = SegmentConfig::default();
    assert!(segment(&SampleSeries::default(), &cfg).unwrap().is_empty());

    let one = SampleSeries::new(vec![Sample::new(t0(), 45.9, 6.87, 800.0, None)]).unwrap();
    assert!(segment(&one, &cfg).unwrap().is_empty());

    // to punkter i samme bøtte → ett resamplet punkt
    let same_bucket = SampleSeries::new(vec![
        Sample::new(t0(), 45.9, 6.87, 800.0, None),
        Sample::new(t0() + Duration::seconds(20), 45.9, 6.87, 900.0, None),
    ])
    .unwrap();
    assert!(segment(&same_bucket, &cfg).unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = SegmentConfig { confirmation_window: 0, ..SegmentConfig::default() };
    assert!(matches!(segment(&climb_then_descent(), &cfg), Err(HfError::InvalidParameter(_))));
}
