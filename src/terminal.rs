//! Text-mode stand-ins for the map, form, list and position source, and the
//! interactive shell that drives a [`Controller`] with them.

use crate::capabilities::{
    FormInput, Geolocation, LocationError, MapView, MarkerHandle, PanOptions, PopupOptions,
    WorkoutForm, WorkoutList,
};
use crate::controller::{Controller, LocateOutcome, State, SubmitOutcome};
use crate::dlog;
use crate::types::{Coords, Workout, WorkoutId, WorkoutType};
use crate::utils::{format_entry, parse_coords, parse_field};
use anyhow::{Context, Result, bail};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::Instant;

/// Map without tiles: remembers markers and logs what a widget would draw.
#[derive(Debug, Default)]
pub struct TextMap {
    markers: Vec<Coords>,
}

impl MapView for TextMap {
    fn set_view(&mut self, center: Coords, zoom: u8) {
        tracing::info!(%center, zoom, "map view set");
    }

    fn listen_for_clicks(&mut self) {
        dlog!("map listening for clicks");
    }

    fn add_marker(&mut self, at: Coords) -> MarkerHandle {
        self.markers.push(at);
        MarkerHandle(self.markers.len() - 1)
    }

    fn bind_popup(&mut self, marker: MarkerHandle, content: &str, options: &PopupOptions) {
        dlog!(
            "marker={} popup={content:?} class={}",
            marker.0,
            options.class_name
        );
    }

    fn pan_to(&mut self, at: Coords, options: &PanOptions) {
        tracing::info!(%at, zoom = options.zoom, "map panned");
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

/// Raw field text, shared between the form capability and whoever types
/// into it.
#[derive(Debug, Clone)]
pub struct FormFields {
    pub workout_type: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
    pub visible: bool,
    pub metric_field: WorkoutType,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            workout_type: WorkoutType::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            visible: false,
            metric_field: WorkoutType::Running,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextForm {
    fields: Rc<RefCell<FormFields>>,
}

impl TextForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle onto the same fields.
    pub fn handle(&self) -> Self {
        self.clone()
    }

    pub fn set_type(&self, workout_type: WorkoutType) {
        self.fields.borrow_mut().workout_type = workout_type;
    }

    pub fn set(&self, field: &str, value: &str) -> Result<()> {
        let mut f = self.fields.borrow_mut();
        let slot = match field {
            "distance" => &mut f.distance,
            "duration" => &mut f.duration,
            "cadence" => &mut f.cadence,
            "elevation" => &mut f.elevation,
            other => bail!("unknown field {other:?}"),
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn snapshot(&self) -> FormFields {
        self.fields.borrow().clone()
    }
}

impl WorkoutForm for TextForm {
    fn read(&self) -> FormInput {
        let f = self.fields.borrow();
        FormInput {
            workout_type: f.workout_type,
            distance: parse_field(&f.distance),
            duration: parse_field(&f.duration),
            cadence: parse_field(&f.cadence),
            elevation: parse_field(&f.elevation),
        }
    }

    fn show(&mut self) {
        self.fields.borrow_mut().visible = true;
    }

    fn focus_distance(&mut self) {}

    fn show_metric_field(&mut self, workout_type: WorkoutType) {
        self.fields.borrow_mut().metric_field = workout_type;
    }

    fn clear(&mut self) {
        let mut f = self.fields.borrow_mut();
        f.distance.clear();
        f.duration.clear();
        f.cadence.clear();
        f.elevation.clear();
    }

    fn hide(&mut self) {
        self.fields.borrow_mut().visible = false;
    }

    fn restore_layout(&mut self) {}
}

/// Prints each entry as it is rendered.
pub struct PrintedList<W: Write> {
    out: W,
    echo: bool,
}

impl<W: Write> PrintedList<W> {
    pub const fn new(out: W, echo: bool) -> Self {
        Self { out, echo }
    }
}

impl<W: Write> WorkoutList for PrintedList<W> {
    fn render_entry(&mut self, workout: &Workout) {
        if self.echo
            && let Err(e) = writeln!(self.out, "{}", format_entry(workout))
        {
            dlog!("list_write_failed id={} err={e}", workout.id());
        }
    }

    fn clear(&mut self) {}
}

/// Yields a configured position, or fails when none is configured.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocation for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, LocationError> {
        self.0.ok_or(LocationError::Unavailable)
    }
}

const HELP: &str = "\
commands:
  click LAT,LNG          open the form at a map position
  type running|cycling   choose the activity type
  set FIELD VALUE        distance | duration | cadence | elevation
  submit                 add the workout
  cancel                 close the form
  select ID              pan to a workout
  list                   show all workouts
  reset                  delete everything
  quit";

/// Read commands until EOF or `quit`, ticking the controller between
/// commands. Tears the controller down on exit.
pub fn run_shell<R: BufRead, W: Write>(
    mut controller: Controller,
    form: &TextForm,
    geo: &mut dyn Geolocation,
    input: R,
    mut out: W,
) -> Result<()> {
    match controller.locate(geo) {
        LocateOutcome::Ready { center, markers } => {
            writeln!(out, "map ready at {center} ({markers} workouts)")?;
        }
        LocateOutcome::Unavailable(e) => {
            writeln!(out, "Location could not be found ({e}); the map is disabled.")?;
        }
        LocateOutcome::Ignored => {}
    }

    for line in input.lines() {
        controller.tick(Instant::now());
        let line = line.context("reading command")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "click" => match parse_coords(rest) {
                Ok(at) if controller.map_clicked(at) => writeln!(out, "form open at {at}")?,
                Ok(_) => writeln!(out, "map is not available")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            "type" => match rest.parse::<WorkoutType>() {
                Ok(t) => {
                    form.set_type(t);
                    controller.toggle_type(t);
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if let Err(e) = form.set(field, value.trim()) {
                    writeln!(out, "{e}")?;
                }
            }
            "submit" => match controller.submit() {
                SubmitOutcome::Added { id, persistence } => {
                    writeln!(out, "added {id} ({persistence:?})")?;
                }
                SubmitOutcome::Rejected(r) => writeln!(out, "Inputs have to be valid: {r}")?,
                SubmitOutcome::NotAccepting => writeln!(out, "click the map first")?,
            },
            "cancel" => {
                if !controller.cancel() {
                    writeln!(out, "no form open")?;
                }
            }
            "select" => match controller.select(&WorkoutId::from(rest)) {
                Some(w) => writeln!(out, "{}", format_entry(w))?,
                None => writeln!(out, "no workout with id {rest}")?,
            },
            "list" => {
                for w in controller.workouts() {
                    writeln!(out, "{}", format_entry(w))?;
                }
            }
            "reset" => {
                match controller.reset() {
                    Ok(()) => writeln!(out, "all workouts deleted")?,
                    Err(e) => {
                        tracing::warn!(err = %format!("{e:#}"), "clearing saved workouts failed");
                        writeln!(out, "could not clear saved workouts: {e:#}")?;
                    }
                }
                if let LocateOutcome::Ready { .. } = controller.locate(geo) {
                    writeln!(out, "map ready")?;
                }
            }
            other => writeln!(out, "unknown command {other:?}; try help")?,
        }

        if matches!(controller.state(), State::FormOpen { .. }) {
            dlog!("form={:?}", form.snapshot());
        }
    }

    controller.teardown();
    Ok(())
}
