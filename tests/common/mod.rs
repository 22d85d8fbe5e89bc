//! Recording fakes for the controller's collaborators.

#![allow(dead_code)]

use anyhow::{Result, bail};
use pinlog::capabilities::{
    FormInput, Geolocation, LocationError, MapView, MarkerHandle, PanOptions, PopupOptions,
    WorkoutForm, WorkoutList,
};
use pinlog::controller::Controller;
use pinlog::kv::KeyValueStore;
use pinlog::types::{Coords, Workout, WorkoutType};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Ev {
    SetView(Coords, u8),
    Listen,
    Marker(Coords),
    Popup(String, PopupOptions),
    Pan(Coords),
    ClearMarkers,
    Show,
    Focus,
    Metric(WorkoutType),
    Clear,
    Hide,
    Restore,
    Entry(String),
    ClearList,
}

pub type Log = Rc<RefCell<Vec<Ev>>>;

pub struct Map(pub Log);

impl MapView for Map {
    fn set_view(&mut self, center: Coords, zoom: u8) {
        self.0.borrow_mut().push(Ev::SetView(center, zoom));
    }

    fn listen_for_clicks(&mut self) {
        self.0.borrow_mut().push(Ev::Listen);
    }

    fn add_marker(&mut self, at: Coords) -> MarkerHandle {
        let mut log = self.0.borrow_mut();
        log.push(Ev::Marker(at));
        MarkerHandle(log.len())
    }

    fn bind_popup(&mut self, _: MarkerHandle, content: &str, options: &PopupOptions) {
        self.0
            .borrow_mut()
            .push(Ev::Popup(content.to_string(), options.clone()));
    }

    fn pan_to(&mut self, at: Coords, _: &PanOptions) {
        self.0.borrow_mut().push(Ev::Pan(at));
    }

    fn clear_markers(&mut self) {
        self.0.borrow_mut().push(Ev::ClearMarkers);
    }
}

pub struct Form {
    pub log: Log,
    pub input: Rc<RefCell<FormInput>>,
}

impl WorkoutForm for Form {
    fn read(&self) -> FormInput {
        *self.input.borrow()
    }

    fn show(&mut self) {
        self.log.borrow_mut().push(Ev::Show);
    }

    fn focus_distance(&mut self) {
        self.log.borrow_mut().push(Ev::Focus);
    }

    fn show_metric_field(&mut self, workout_type: WorkoutType) {
        self.log.borrow_mut().push(Ev::Metric(workout_type));
    }

    fn clear(&mut self) {
        self.log.borrow_mut().push(Ev::Clear);
    }

    fn hide(&mut self) {
        self.log.borrow_mut().push(Ev::Hide);
    }

    fn restore_layout(&mut self) {
        self.log.borrow_mut().push(Ev::Restore);
    }
}

pub struct List(pub Log);

impl WorkoutList for List {
    fn render_entry(&mut self, workout: &Workout) {
        self.0
            .borrow_mut()
            .push(Ev::Entry(workout.description().to_string()));
    }

    fn clear(&mut self) {
        self.0.borrow_mut().push(Ev::ClearList);
    }
}

pub struct Geo(pub Result<Coords, LocationError>);

impl Geolocation for Geo {
    fn current_position(&mut self) -> Result<Coords, LocationError> {
        self.0.clone()
    }
}

/// Key-value store whose contents outlive any one controller.
#[derive(Clone, Default)]
pub struct SharedKv {
    pub blob: Rc<RefCell<Option<String>>>,
    pub fail_writes: bool,
}

impl KeyValueStore for SharedKv {
    fn get(&self, _: &str) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn set(&mut self, _: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            bail!("quota exceeded");
        }
        *self.blob.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn remove(&mut self, _: &str) -> Result<()> {
        *self.blob.borrow_mut() = None;
        Ok(())
    }
}

pub const HOME: Coords = Coords::new(51.5, -0.09);

pub fn running(distance: f64, duration: f64, cadence: f64) -> FormInput {
    FormInput {
        workout_type: WorkoutType::Running,
        distance,
        duration,
        cadence,
        elevation: f64::NAN,
    }
}

pub fn cycling(distance: f64, duration: f64, elevation: f64) -> FormInput {
    FormInput {
        workout_type: WorkoutType::Cycling,
        distance,
        duration,
        cadence: f64::NAN,
        elevation,
    }
}

pub struct Harness {
    pub controller: Controller,
    pub log: Log,
    pub input: Rc<RefCell<FormInput>>,
    pub kv: SharedKv,
}

impl Harness {
    pub fn new(kv: SharedKv) -> Self {
        let log: Log = Rc::default();
        let input = Rc::new(RefCell::new(running(f64::NAN, f64::NAN, f64::NAN)));
        let controller = Controller::new(
            Box::new(Map(Rc::clone(&log))),
            Box::new(Form {
                log: Rc::clone(&log),
                input: Rc::clone(&input),
            }),
            Box::new(List(Rc::clone(&log))),
            Box::new(kv.clone()),
        );
        Self {
            controller,
            log,
            input,
            kv,
        }
    }

    pub fn ready(kv: SharedKv) -> Self {
        let mut h = Self::new(kv);
        h.controller.locate(&mut Geo(Ok(HOME)));
        h.log.borrow_mut().clear();
        h
    }

    pub fn fill(&self, input: FormInput) {
        *self.input.borrow_mut() = input;
    }

    pub fn events(&self) -> Vec<Ev> {
        self.log.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<Ev> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}
