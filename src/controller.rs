//! Session state machine: locate → map → click → form → submit → render → persist.

use crate::capabilities::{
    Geolocation, LocationError, MapView, PanOptions, PopupOptions, WorkoutForm, WorkoutList,
};
use crate::dlog;
use crate::kv::KeyValueStore;
use crate::store::WorkoutStore;
use crate::types::{Coords, Workout, WorkoutId, WorkoutType};
use crate::validation::{Rejection, validate_form};
use anyhow::Result;
use std::time::{Duration, Instant};

pub const MAP_ZOOM: u8 = 13;

/// Delay before the hidden form gets its layout back.
pub const FORM_RESTORE_DELAY: Duration = Duration::from_millis(1000);

pub const PAN_OPTIONS: PanOptions = PanOptions {
    zoom: MAP_ZOOM,
    animate: true,
    duration_s: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Idle,
    Locating,
    MapReady { center: Coords },
    FormOpen { center: Coords, pending: Coords },
}

impl State {
    const fn center(self) -> Option<Coords> {
        match self {
            Self::MapReady { center } | Self::FormOpen { center, .. } => Some(center),
            Self::Idle | Self::Locating => None,
        }
    }
}

/// Whether writes still reach the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    MemoryOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Locating,
    /// Already started, or location failed earlier this session.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    Ready { center: Coords, markers: usize },
    Unavailable(LocationError),
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Added {
        id: WorkoutId,
        persistence: Persistence,
    },
    Rejected(Rejection),
    /// No form is open.
    NotAccepting,
}

/// One-shot timer owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRestore {
    due: Instant,
}

impl ScheduledRestore {
    pub const fn due(self) -> Instant {
        self.due
    }

    fn is_due(self, now: Instant) -> bool {
        now >= self.due
    }
}

pub struct Controller {
    state: State,
    location_failed: bool,
    workouts: Vec<Workout>,
    persistence: Persistence,
    restore: Option<ScheduledRestore>,
    map: Box<dyn MapView>,
    form: Box<dyn WorkoutForm>,
    list: Box<dyn WorkoutList>,
    store: WorkoutStore<Box<dyn KeyValueStore>>,
}

impl Controller {
    /// Rehydrates stored workouts and renders their list entries. Markers
    /// follow once the map is ready.
    pub fn new(
        map: Box<dyn MapView>,
        form: Box<dyn WorkoutForm>,
        list: Box<dyn WorkoutList>,
        kv: Box<dyn KeyValueStore>,
    ) -> Self {
        let store = WorkoutStore::new(kv);
        let workouts = store.load();
        let mut this = Self {
            state: State::Idle,
            location_failed: false,
            workouts,
            persistence: Persistence::Saved,
            restore: None,
            map,
            form,
            list,
            store,
        };
        for w in &this.workouts {
            this.list.render_entry(w);
        }
        tracing::info!(workouts = this.workouts.len(), "session loaded");
        this
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub const fn location_failed(&self) -> bool {
        self.location_failed
    }

    pub const fn pending_restore(&self) -> Option<ScheduledRestore> {
        self.restore
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// `Idle → Locating`.
    pub fn start(&mut self) -> StartOutcome {
        if self.state != State::Idle || self.location_failed {
            return StartOutcome::Ignored;
        }
        self.state = State::Locating;
        dlog!("state=locating");
        StartOutcome::Locating
    }

    /// Start and resolve against a provider that answers synchronously.
    pub fn locate(&mut self, geo: &mut dyn Geolocation) -> LocateOutcome {
        match self.start() {
            StartOutcome::Locating => self.position_resolved(geo.current_position()),
            StartOutcome::Ignored => LocateOutcome::Ignored,
        }
    }

    /// `Locating → MapReady` on success, `Locating → Idle` otherwise.
    pub fn position_resolved(&mut self, position: Result<Coords, LocationError>) -> LocateOutcome {
        if self.state != State::Locating {
            return LocateOutcome::Ignored;
        }

        match position {
            Ok(center) => {
                self.map.set_view(center, MAP_ZOOM);
                self.map.listen_for_clicks();
                for w in &self.workouts {
                    render_marker(self.map.as_mut(), w);
                }
                self.state = State::MapReady { center };
                tracing::info!(%center, markers = self.workouts.len(), "map ready");
                LocateOutcome::Ready {
                    center,
                    markers: self.workouts.len(),
                }
            }
            Err(e) => {
                self.state = State::Idle;
                self.location_failed = true;
                tracing::warn!(err = %e, "location unavailable; map disabled for this session");
                LocateOutcome::Unavailable(e)
            }
        }
    }

    /// `MapReady → FormOpen`. A click while the form is open replaces the
    /// pending coordinates.
    pub fn map_clicked(&mut self, at: Coords) -> bool {
        let Some(center) = self.state.center() else {
            dlog!("click_ignored state={:?}", self.state);
            return false;
        };
        self.state = State::FormOpen {
            center,
            pending: at,
        };
        self.form.show();
        self.form.focus_distance();
        dlog!("state=form_open at={at}");
        true
    }

    /// Swap the visible metric field. State is unchanged.
    pub fn toggle_type(&mut self, workout_type: WorkoutType) {
        self.form.show_metric_field(workout_type);
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        let State::FormOpen { center, pending } = self.state else {
            return SubmitOutcome::NotAccepting;
        };

        let input = self.form.read();
        let valid = match validate_form(&input) {
            Ok(v) => v,
            Err(r) => {
                dlog!("submit_rejected reason={r}");
                return SubmitOutcome::Rejected(r);
            }
        };

        let workout = valid.into_workout(pending);
        let id = workout.id().clone();
        self.workouts.push(workout);
        if let Some(w) = self.workouts.last() {
            render_marker(self.map.as_mut(), w);
            self.list.render_entry(w);
        }
        let persistence = self.persist();

        self.form.clear();
        self.form.hide();
        self.restore = Some(ScheduledRestore {
            due: Instant::now() + FORM_RESTORE_DELAY,
        });
        self.state = State::MapReady { center };

        tracing::info!(%id, kind = %input.workout_type, ?persistence, "workout added");
        SubmitOutcome::Added { id, persistence }
    }

    /// `FormOpen → MapReady` without adding anything.
    pub fn cancel(&mut self) -> bool {
        let State::FormOpen { center, .. } = self.state else {
            return false;
        };
        self.form.clear();
        self.form.hide();
        self.form.restore_layout();
        self.state = State::MapReady { center };
        true
    }

    /// Pan to a list entry, bump its click counter and save the list.
    pub fn select(&mut self, id: &WorkoutId) -> Option<&Workout> {
        let map_ready = self.state.center().is_some();
        let idx = self.workouts.iter().position(|w| w.id() == id)?;
        let w = &mut self.workouts[idx];
        if map_ready {
            self.map.pan_to(w.coords(), &PAN_OPTIONS);
        }
        let clicks = w.click();
        let persistence = self.persist();
        dlog!("selected id={id} clicks={clicks} persistence={persistence:?}");
        self.workouts.get(idx)
    }

    /// Fire the scheduled form restore if it is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.restore {
            Some(r) if r.is_due(now) => {
                self.restore = None;
                self.form.restore_layout();
                true
            }
            _ => false,
        }
    }

    /// Clear storage and return to `Idle` with an empty list.
    pub fn reset(&mut self) -> Result<()> {
        let cleared = self.store.clear();

        self.restore = None;
        self.workouts.clear();
        self.map.clear_markers();
        self.list.clear();
        self.form.clear();
        self.form.hide();
        self.form.restore_layout();
        self.state = State::Idle;
        self.location_failed = false;
        self.persistence = Persistence::Saved;

        tracing::info!("session reset");
        cleared
    }

    /// Drop the controller, cancelling a pending restore. Returns whether
    /// one was pending.
    pub fn teardown(mut self) -> bool {
        let cancelled = self.restore.take().is_some();
        dlog!("teardown cancelled_restore={cancelled}");
        cancelled
    }

    fn persist(&mut self) -> Persistence {
        if self.persistence == Persistence::MemoryOnly {
            return Persistence::MemoryOnly;
        }
        if let Err(e) = self.store.save(&self.workouts) {
            tracing::warn!(
                err = %format!("{e:#}"),
                "saving workouts failed; continuing in memory only"
            );
            self.persistence = Persistence::MemoryOnly;
        }
        self.persistence
    }
}

fn render_marker(map: &mut dyn MapView, w: &Workout) {
    let marker = map.add_marker(w.coords());
    map.bind_popup(marker, &w.label(), &PopupOptions::for_type(w.workout_type()));
}
