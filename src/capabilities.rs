//! Collaborators the controller drives but does not own the behaviour of.
//!
//! The controller is handed boxed implementations at construction. The
//! terminal frontend lives in [`crate::terminal`]; tests use recording fakes.

use crate::types::{Coords, Workout, WorkoutType};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    pub fn for_type(workout_type: WorkoutType) -> Self {
        Self {
            max_width: 280,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{workout_type}-popup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOptions {
    pub zoom: u8,
    pub animate: bool,
    pub duration_s: f64,
}

pub trait MapView {
    fn set_view(&mut self, center: Coords, zoom: u8);

    /// Start delivering clicks to the controller.
    fn listen_for_clicks(&mut self);

    fn add_marker(&mut self, at: Coords) -> MarkerHandle;

    fn bind_popup(&mut self, marker: MarkerHandle, content: &str, options: &PopupOptions);

    fn pan_to(&mut self, at: Coords, options: &PanOptions);

    fn clear_markers(&mut self);
}

/// Typed snapshot of the form fields. Unparsable fields read as NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormInput {
    pub workout_type: WorkoutType,
    pub distance: f64,
    pub duration: f64,
    pub cadence: f64,
    pub elevation: f64,
}

pub trait WorkoutForm {
    fn read(&self) -> FormInput;

    fn show(&mut self);

    fn focus_distance(&mut self);

    /// Show cadence for running, elevation for cycling.
    fn show_metric_field(&mut self, workout_type: WorkoutType);

    fn clear(&mut self);

    /// Hide immediately, without the layout transition.
    fn hide(&mut self);

    /// Put back the layout mode removed by [`WorkoutForm::hide`].
    fn restore_layout(&mut self);
}

pub trait WorkoutList {
    fn render_entry(&mut self, workout: &Workout);

    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location could not be found")]
    Unavailable,

    #[error("location request denied: {0}")]
    Denied(String),
}

/// Single-shot position source.
pub trait Geolocation {
    fn current_position(&mut self) -> Result<Coords, LocationError>;
}
