use hikefly_core::api::{analyze_igc_file, analyze_samples_json};
use hikefly_core::HfError;
use serde_json::{json, Value};

fn samples_json() -> String {
    let start = 1_752_310_800i64; // 2025-07-12T09:00:00Z
    let samples: Vec<Value> = (0..100)
        .map(|i| {
            let alt = if i < 50 { 500.0 + 10.0 * i as f64 } else { 1000.0 - 10.0 * (i - 50) as f64 };
            json!({ "t": start + 10 * i, "lat": 45.9, "lon": 6.87, "alt_gps": alt })
        })
        .collect();
    serde_json::to_string(&samples).unwrap()
}

#[test]
fn samples_json_roundtrip_report() {
    let out = analyze_samples_json(&samples_json(), Some(r#"{"resample_interval_secs": 10}"#)).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(v["name"], "Unknown");
    assert_eq!(v["samples"], 100);
    assert_eq!(v["phases"].as_array().unwrap().len(), 3);
    assert_eq!(v["phases"][1]["direction"], "up");
    assert_eq!(v["phases"][2]["direction"], "down");

    let lps = v["logical_phases"].as_array().unwrap();
    assert_eq!(lps.len(), 2);
    assert_eq!(lps[1]["activity"], "flight");

    assert_eq!(v["transitions"][0]["cause"], "activity");
    assert_eq!(v["stats"]["total_climb"], 490.0);
    assert_eq!(v["stats"]["flight_phases"]["count"], 2);
}

#[test]
fn bad_config_is_reported_with_path() {
    let err = analyze_samples_json(&samples_json(), Some(r#"{"confirmation_window": "ten"}"#)).unwrap_err();
    match err {
        HfError::Json { path, .. } => assert_eq!(path, "confirmation_window"),
        other => panic!("expected Json error, got {other:?}"),
    }

    let err = analyze_samples_json(&samples_json(), Some(r#"{"resample_interval_secs": 0}"#)).unwrap_err();
    assert!(matches!(err, HfError::InvalidParameter(_)));
}

#[test]
fn short_input_gives_empty_report() {
    let out = analyze_samples_json(r#"[{"t": 0, "lat": 45.9, "lon": 6.87, "alt_gps": 900}]"#, None).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    assert!(v["phases"].as_array().unwrap().is_empty());
    assert!(v["logical_phases"].as_array().unwrap().is_empty());
    assert!(v["stats"].is_null());
}

#[test]
fn missing_igc_file_is_io_error() {
    assert!(matches!(analyze_igc_file("/no/such/track.igc", None), Err(HfError::Io(_))));
}

#[test]
fn igc_file_report_carries_file_name() {
    let path = std::env::temp_dir().join("hikefly_api_track.igc");
    let mut igc = String::from("AXXX001\nHFDTE120725\n");
    for i in 0..30u32 {
        let secs = 9 * 3600 + 10 * i;
        igc.push_str(&format!(
            "B{:02}{:02}{:02}45{:05}N006{:05}EA{:05}{:05}\n",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60,
            10_000 + 3 * i,
            20_000,
            1000 + i,
            1000 + i,
        ));
    }
    std::fs::write(&path, igc).unwrap();

    let out = analyze_igc_file(&path, Some(r#"{"resample_interval_secs": 10, "confirmation_window": 3}"#)).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["name"], "hikefly_api_track.igc");
    assert_eq!(v["samples"], 30);
    assert_eq!(v["logical_phases"][0]["activity"], "walk");

    let _ = std::fs::remove_file(&path);
}
