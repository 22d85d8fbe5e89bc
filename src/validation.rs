//! Rules deciding whether raw form numbers may become a workout.

use crate::capabilities::FormInput;
use crate::types::{Coords, Workout, WorkoutType};
use thiserror::Error;

/// Why a submission was refused. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// The inputs are individually fine but the derived metric overflows.
    #[error("{0} is out of range for these inputs")]
    OutOfRange(&'static str),
}

impl Rejection {
    pub const fn field(self) -> &'static str {
        match self {
            Self::NotFinite(f)
            | Self::Negative(f)
            | Self::NotPositive(f)
            | Self::OutOfRange(f) => f,
        }
    }
}

/// Input that passed validation; the only way to reach the constructors
/// from the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidInput {
    Running {
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    },
    Cycling {
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    },
}

impl ValidInput {
    pub fn into_workout(self, coords: Coords) -> Workout {
        match self {
            Self::Running {
                distance_km,
                duration_min,
                cadence_spm,
            } => Workout::running(coords, distance_km, duration_min, cadence_spm),
            Self::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            } => Workout::cycling(coords, distance_km, duration_min, elevation_gain_m),
        }
    }
}

fn finite(field: &'static str, v: f64) -> Result<f64, Rejection> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Rejection::NotFinite(field))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<f64, Rejection> {
    if finite(field, v)? < 0.0 {
        Err(Rejection::Negative(field))
    } else {
        Ok(v)
    }
}

// Zero distance or duration would make pace/speed infinite.
fn positive(field: &'static str, v: f64) -> Result<f64, Rejection> {
    if non_negative(field, v)? == 0.0 {
        Err(Rejection::NotPositive(field))
    } else {
        Ok(v)
    }
}

// Pace/speed must stay finite or the stored snapshot loses them.
fn derived(metric: &'static str, v: f64) -> Result<f64, Rejection> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Rejection::OutOfRange(metric))
    }
}

pub fn validate_running_input(
    distance: f64,
    duration: f64,
    cadence: f64,
) -> Result<ValidInput, Rejection> {
    // finiteness first across all fields, then the sign rules
    finite("distance", distance)?;
    finite("duration", duration)?;
    finite("cadence", cadence)?;

    let distance_km = positive("distance", distance)?;
    let duration_min = positive("duration", duration)?;
    let cadence_spm = non_negative("cadence", cadence)?;
    derived("pace", duration_min / distance_km)?;

    Ok(ValidInput::Running {
        distance_km,
        duration_min,
        cadence_spm,
    })
}

/// Elevation may be negative (a net descent).
pub fn validate_cycling_input(
    distance: f64,
    duration: f64,
    elevation: f64,
) -> Result<ValidInput, Rejection> {
    finite("distance", distance)?;
    finite("duration", duration)?;
    let elevation_gain_m = finite("elevation", elevation)?;

    let distance_km = positive("distance", distance)?;
    let duration_min = positive("duration", duration)?;
    derived("speed", distance_km / (duration_min / 60.0))?;

    Ok(ValidInput::Cycling {
        distance_km,
        duration_min,
        elevation_gain_m,
    })
}

pub fn validate_form(input: &FormInput) -> Result<ValidInput, Rejection> {
    match input.workout_type {
        WorkoutType::Running => {
            validate_running_input(input.distance, input.duration, input.cadence)
        }
        WorkoutType::Cycling => {
            validate_cycling_input(input.distance, input.duration, input.elevation)
        }
    }
}
