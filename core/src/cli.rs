use std::fmt::Write as _;

use crate::collection::TrackAnalysis;
use crate::logical::LogicalPhase;

fn hms(secs: f64) -> String {
    let s = secs.max(0.0).round() as i64;
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

fn logical_line(lp: &LogicalPhase) -> String {
    let unit = lp.rate_unit().suffix();
    format!(
        "[{:<6}] {} -> {} ({}) | {:.2} km | D+ {:.0} m | D- {:.0} m | climb {:.2} {unit} | descent {:.2} {unit} | {} phases",
        lp.activity().label(),
        lp.start_time().format("%H:%M:%S"),
        lp.end_time().format("%H:%M:%S"),
        hms(lp.duration_s()),
        lp.distance_m() / 1000.0,
        lp.d_plus_m(),
        lp.d_minus_m(),
        lp.avg_climb_rate(),
        lp.avg_descent_rate(),
        lp.phases().len(),
    )
}

/// Tekstrapport for ett spor: hode med globale tall, én linje per logisk fase.
pub fn format_track_report(analysis: &TrackAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- {} ---", analysis.track.name);

    match &analysis.stats {
        Some(st) => {
            let _ = writeln!(
                out,
                "Date: {} {} -> {} ({})",
                st.date,
                st.start_time.format("%H:%M:%S"),
                st.end_time.format("%H:%M:%S"),
                hms(st.duration_s)
            );
            let _ = writeln!(out, "Altitude: {:.1} .. {:.1} m", st.min_alt, st.max_alt);
            let _ = writeln!(
                out,
                "Distance: {:.2} km | D+ {:.0} m | D- {:.0} m",
                st.total_dist_km, st.total_climb, st.total_descent
            );
            let _ = writeln!(
                out,
                "Phases: {} flight, {} walk",
                st.flight_phases.count, st.walk_phases.count
            );
        }
        None => {
            let _ = writeln!(out, "No phases ({} samples)", analysis.track.series.len());
        }
    }

    for lp in &analysis.logical_phases {
        let _ = writeln!(out, "{}", logical_line(lp));
    }
    out
}

pub fn print_track_report(analysis: &TrackAnalysis) {
    print!("{}", format_track_report(analysis));
}
