mod common;

use common::{Ev, Geo, HOME, Harness, SharedKv, cycling, running};
use pinlog::capabilities::{LocationError, PopupOptions};
use pinlog::controller::{
    LocateOutcome, MAP_ZOOM, Persistence, StartOutcome, State, SubmitOutcome,
};
use pinlog::types::{Coords, WorkoutKind, WorkoutType};
use pinlog::validation::Rejection;

const CLICK: Coords = Coords::new(51.51, -0.1);

#[test]
fn locating_centers_map_and_listens() {
    let mut h = Harness::new(SharedKv::default());
    assert_eq!(h.controller.state(), State::Idle);

    assert_eq!(h.controller.start(), StartOutcome::Locating);
    assert_eq!(h.controller.state(), State::Locating);

    let outcome = h.controller.position_resolved(Ok(HOME));
    assert_eq!(
        outcome,
        LocateOutcome::Ready {
            center: HOME,
            markers: 0
        }
    );
    assert_eq!(h.controller.state(), State::MapReady { center: HOME });
    assert_eq!(h.events(), vec![Ev::SetView(HOME, MAP_ZOOM), Ev::Listen]);
}

#[test]
fn location_failure_degrades_session() {
    let mut h = Harness::new(SharedKv::default());
    let outcome = h
        .controller
        .locate(&mut Geo(Err(LocationError::Denied("user said no".into()))));
    assert!(matches!(outcome, LocateOutcome::Unavailable(LocationError::Denied(_))));
    assert_eq!(h.controller.state(), State::Idle);
    assert!(h.controller.location_failed());

    // no map, no form, no retry this session
    assert!(!h.controller.map_clicked(CLICK));
    assert_eq!(h.controller.start(), StartOutcome::Ignored);
    assert_eq!(h.controller.submit(), SubmitOutcome::NotAccepting);
    assert!(h.events().is_empty());
}

#[test]
fn late_position_is_ignored() {
    let mut h = Harness::new(SharedKv::default());
    assert_eq!(h.controller.position_resolved(Ok(HOME)), LocateOutcome::Ignored);
    assert_eq!(h.controller.state(), State::Idle);
}

#[test]
fn click_opens_form_and_focuses_distance() {
    let mut h = Harness::ready(SharedKv::default());
    assert!(h.controller.map_clicked(CLICK));
    assert_eq!(
        h.controller.state(),
        State::FormOpen {
            center: HOME,
            pending: CLICK
        }
    );
    assert_eq!(h.events(), vec![Ev::Show, Ev::Focus]);

    // a second click moves the pending position
    let other = Coords::new(51.52, -0.11);
    h.controller.map_clicked(other);
    assert_eq!(
        h.controller.state(),
        State::FormOpen {
            center: HOME,
            pending: other
        }
    );
}

#[test]
fn valid_running_submit_renders_persists_and_hides() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    h.take_events();

    h.fill(running(5.0, 25.0, 150.0));
    let SubmitOutcome::Added { id, persistence } = h.controller.submit() else {
        panic!("expected workout to be added");
    };
    assert_eq!(persistence, Persistence::Saved);
    assert_eq!(h.controller.state(), State::MapReady { center: HOME });

    let w = h.controller.find(&id).unwrap();
    assert_eq!(w.coords(), CLICK);
    assert_eq!(
        *w.kind(),
        WorkoutKind::Running {
            cadence_spm: 150.0,
            pace_min_per_km: 5.0
        }
    );

    let events = h.events();
    assert_eq!(events[0], Ev::Marker(CLICK));
    assert_eq!(
        events[1],
        Ev::Popup(w.label(), PopupOptions::for_type(WorkoutType::Running))
    );
    assert_eq!(events[2], Ev::Entry(w.description().to_string()));
    assert_eq!(&events[3..], &[Ev::Clear, Ev::Hide]);

    let blob = h.kv.blob.borrow().clone().unwrap();
    assert!(blob.contains(&format!("\"id\":\"{id}\"")));
    assert!(h.controller.pending_restore().is_some());
}

#[test]
fn valid_cycling_submit_computes_speed() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    h.controller.toggle_type(WorkoutType::Cycling);
    h.fill(cycling(20.0, 60.0, 300.0));

    assert!(matches!(h.controller.submit(), SubmitOutcome::Added { .. }));
    let w = &h.controller.workouts()[0];
    assert_eq!(
        *w.kind(),
        WorkoutKind::Cycling {
            elevation_gain_m: 300.0,
            speed_km_per_h: 20.0
        }
    );
    assert!(h.events().contains(&Ev::Metric(WorkoutType::Cycling)));
}

#[test]
fn invalid_submit_keeps_form_open() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    h.take_events();

    h.fill(running(-5.0, 30.0, 150.0));
    assert_eq!(
        h.controller.submit(),
        SubmitOutcome::Rejected(Rejection::Negative("distance"))
    );
    assert!(h.controller.workouts().is_empty());
    assert_eq!(
        h.controller.state(),
        State::FormOpen {
            center: HOME,
            pending: CLICK
        }
    );
    assert!(h.events().is_empty());
    assert!(h.kv.blob.borrow().is_none());

    // fixing the input succeeds at the same coordinates
    h.fill(running(5.0, 30.0, 150.0));
    assert!(matches!(h.controller.submit(), SubmitOutcome::Added { .. }));
    assert_eq!(h.controller.workouts()[0].coords(), CLICK);
}

#[test]
fn toggling_type_does_not_change_state() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    let before = h.controller.state();
    h.controller.toggle_type(WorkoutType::Cycling);
    h.controller.toggle_type(WorkoutType::Running);
    assert_eq!(h.controller.state(), before);
}

#[test]
fn cancel_returns_to_map_ready() {
    let mut h = Harness::ready(SharedKv::default());
    assert!(!h.controller.cancel());
    h.controller.map_clicked(CLICK);
    assert!(h.controller.cancel());
    assert_eq!(h.controller.state(), State::MapReady { center: HOME });
    assert_eq!(h.controller.submit(), SubmitOutcome::NotAccepting);
}

#[test]
fn selecting_entry_pans_and_counts() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    h.fill(running(5.0, 25.0, 150.0));
    let SubmitOutcome::Added { id, .. } = h.controller.submit() else {
        panic!("expected workout to be added");
    };
    h.take_events();

    assert_eq!(h.controller.select(&id).unwrap().click_count(), 1);
    assert_eq!(h.controller.select(&id).unwrap().click_count(), 2);
    assert_eq!(h.events(), vec![Ev::Pan(CLICK), Ev::Pan(CLICK)]);

    assert!(h.controller.select(&"nope".into()).is_none());
}

#[test]
fn write_failure_falls_back_to_memory() {
    let kv = SharedKv {
        fail_writes: true,
        ..SharedKv::default()
    };
    let mut h = Harness::ready(kv);

    for i in 0..2 {
        h.controller.map_clicked(CLICK);
        h.fill(running(5.0 + f64::from(i), 25.0, 150.0));
        assert!(matches!(
            h.controller.submit(),
            SubmitOutcome::Added {
                persistence: Persistence::MemoryOnly,
                ..
            }
        ));
    }
    assert_eq!(h.controller.persistence(), Persistence::MemoryOnly);
    assert_eq!(h.controller.workouts().len(), 2);
    assert_eq!(h.controller.state(), State::MapReady { center: HOME });
}

#[test]
fn reset_clears_everything_and_returns_to_idle() {
    let mut h = Harness::ready(SharedKv::default());
    h.controller.map_clicked(CLICK);
    h.fill(running(5.0, 25.0, 150.0));
    h.controller.submit();
    assert!(h.kv.blob.borrow().is_some());
    h.take_events();

    h.controller.reset().unwrap();
    assert!(h.kv.blob.borrow().is_none());
    assert!(h.controller.workouts().is_empty());
    assert_eq!(h.controller.state(), State::Idle);
    let events = h.events();
    assert!(events.contains(&Ev::ClearMarkers));
    assert!(events.contains(&Ev::ClearList));

    // the session can be started again
    assert_eq!(h.controller.start(), StartOutcome::Locating);
}
