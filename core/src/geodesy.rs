use geo::{point, GeodesicDistance};

use crate::models::Sample;

/// Ellipsoidisk (WGS84) avstand i meter mellom to punkter gitt i grader.
///
/// Karney sin invers-løsning via `geo`. Koordinater utenfor gyldig område
/// klemmes før beregning.
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = point!(x: lon1.clamp(-180.0, 180.0), y: lat1.clamp(-90.0, 90.0));
    let p2 = point!(x: lon2.clamp(-180.0, 180.0), y: lat2.clamp(-90.0, 90.0));
    let d = p1.geodesic_distance(&p2);
    if d.is_finite() { d } else { 0.0 }
}

#[inline]
pub fn sample_distance_m(a: &Sample, b: &Sample) -> f64 {
    distance_m(a.lat, a.lon, b.lat, b.lon)
}

/// Kumulativ avstand langs påfølgende punkter.
pub fn path_length_m(samples: &[Sample]) -> f64 {
    samples.windows(2).map(|w| sample_distance_m(&w[0], &w[1])).sum()
}
