use crate::types::{Coords, Workout, WorkoutKind};
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pinlog={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

static COORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[?\s*([+-]?\d+(?:\.\d+)?)\s*[,\s]\s*([+-]?\d+(?:\.\d+)?)\s*\]?\s*$")
        .expect("coordinate pattern is valid")
});

/// Parse `"51.5,-0.09"`, `"51.5 -0.09"` or `"[51.5, -0.09]"`.
pub fn parse_coords(s: &str) -> Result<Coords> {
    let Some(caps) = COORDS_RE.captures(s) else {
        bail!("expected coordinates as LAT,LNG, got {s:?}");
    };
    let lat: f64 = caps[1].parse().with_context(|| format!("latitude in {s:?}"))?;
    let lng: f64 = caps[2].parse().with_context(|| format!("longitude in {s:?}"))?;

    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude out of range: {lat}");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("longitude out of range: {lng}");
    }
    Ok(Coords::new(lat, lng))
}

/// Form-style number parsing: blank or garbage reads as NaN.
pub fn parse_field(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

/// Minutes as `HH:MM:SS`.
pub fn format_minutes(minutes: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let secs = (minutes.abs() * 60.0).round() as u64;
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// One line for the list view.
pub fn format_entry(w: &Workout) -> String {
    let metric = match *w.kind() {
        WorkoutKind::Running {
            cadence_spm,
            pace_min_per_km,
        } => format!("⚡️ {pace_min_per_km:.1} min/km  🦶🏼 {cadence_spm:.0} spm"),
        WorkoutKind::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => format!("⚡️ {speed_km_per_h:.1} km/h  ⛰ {elevation_gain_m:.0} m"),
    };
    format!(
        "{}\t{}\t{} {:.2} km  ⏱ {}  {metric}\tclicks={}",
        w.id(),
        w.description(),
        w.workout_type().emoji(),
        w.distance_km(),
        format_minutes(w.duration_min()),
        w.click_count(),
    )
}
