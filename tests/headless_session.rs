// Headless integration using the internal runtime + SessionController
// without any real map or form surface. Verifies the full creation flow:
// location fix, map click, kind toggle, submit, persistence, reload.

use std::sync::mpsc;

use mapout::codec::{self, MemorySlot};
use mapout::controller::{
    FormSurface, MapView, Notifier, Phase, SessionController, WorkoutList,
};
use mapout::form::FormFields;
use mapout::runtime::{self, ChannelEventSource, SessionEvent};
use mapout::workout::{GeoPoint, Workout, WorkoutKind};

#[derive(Debug, Default)]
struct RecordingFrontend {
    centered: Vec<GeoPoint>,
    markers: Vec<String>,
    entries: Vec<String>,
    notices: Vec<String>,
}

impl MapView for RecordingFrontend {
    fn center_on(&mut self, point: GeoPoint, _zoom: u8) {
        self.centered.push(point);
    }
    fn place_marker(&mut self, _point: GeoPoint, popup: &str, _style: &str) {
        self.markers.push(popup.to_string());
    }
}

impl FormSurface for RecordingFrontend {
    fn show(&mut self) {}
    fn hide_and_clear(&mut self) {}
    fn swap_extra_field(&mut self, _kind: WorkoutKind) {}
}

impl WorkoutList for RecordingFrontend {
    fn push_entry(&mut self, workout: &Workout) {
        self.entries.push(workout.description().to_string());
    }
}

impl Notifier for RecordingFrontend {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

fn cycling_submit(distance: &str, duration: &str, elevation: &str) -> SessionEvent {
    SessionEvent::FormSubmitted(FormFields {
        kind: WorkoutKind::Cycling,
        distance: distance.into(),
        duration: duration.into(),
        cadence: String::new(),
        elevation: elevation.into(),
    })
}

#[test]
fn headless_session_creates_and_persists_a_ride() {
    // Arrange: script the whole session up front
    let (tx, rx) = mpsc::channel();
    tx.send(SessionEvent::LocationResolved(GeoPoint::new(45.0, 7.0)))
        .unwrap();
    tx.send(SessionEvent::MapClicked(GeoPoint::new(45.1, 7.2)))
        .unwrap();
    tx.send(SessionEvent::KindToggled(WorkoutKind::Cycling))
        .unwrap();
    tx.send(cycling_submit("10", "30", "200")).unwrap();
    drop(tx);

    let mut source = ChannelEventSource::new(rx);
    let mut controller =
        SessionController::new(RecordingFrontend::default(), MemorySlot::default());

    // Act: drain the scripted events
    runtime::run(&mut source, &mut controller);

    // Assert: record created with the pending coordinates and exact speed
    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.store().len(), 1);
    let workout = &controller.store().all()[0];
    assert_eq!(workout.kind(), WorkoutKind::Cycling);
    assert_eq!(workout.speed_km_per_h(), Some(20.0));
    assert_eq!(workout.point(), GeoPoint::new(45.1, 7.2));

    // ...and the snapshot reloads into an equal record
    let blob = controller.slot().contents().expect("snapshot written");
    let restored = codec::deserialize(Some(&blob));
    assert_eq!(restored.len(), 1);
    assert_eq!(&restored.all()[0], workout);
}

#[test]
fn headless_session_survives_a_rejected_submit() {
    let (tx, rx) = mpsc::channel();
    tx.send(SessionEvent::LocationResolved(GeoPoint::new(45.0, 7.0)))
        .unwrap();
    tx.send(SessionEvent::MapClicked(GeoPoint::new(45.1, 7.2)))
        .unwrap();
    // zero duration is rejected; the corrected submit still lands on the
    // same pending coordinates
    tx.send(cycling_submit("10", "0", "200")).unwrap();
    tx.send(cycling_submit("10", "30", "200")).unwrap();
    drop(tx);

    let mut source = ChannelEventSource::new(rx);
    let mut controller =
        SessionController::new(RecordingFrontend::default(), MemorySlot::default());
    runtime::run(&mut source, &mut controller);

    assert_eq!(controller.store().len(), 1);
    assert_eq!(
        controller.frontend().notices,
        vec!["distance and duration must be positive".to_string()]
    );
    assert_eq!(
        controller.store().all()[0].point(),
        GeoPoint::new(45.1, 7.2)
    );
}

#[test]
fn headless_restart_rerenders_persisted_records() {
    // First session: log one run and one ride
    let (tx, rx) = mpsc::channel();
    tx.send(SessionEvent::LocationResolved(GeoPoint::new(45.0, 7.0)))
        .unwrap();
    tx.send(SessionEvent::MapClicked(GeoPoint::new(45.1, 7.2)))
        .unwrap();
    tx.send(SessionEvent::FormSubmitted(FormFields {
        kind: WorkoutKind::Running,
        distance: "5".into(),
        duration: "25".into(),
        cadence: "150".into(),
        elevation: String::new(),
    }))
    .unwrap();
    tx.send(SessionEvent::MapClicked(GeoPoint::new(46.0, 8.0)))
        .unwrap();
    tx.send(cycling_submit("10", "30", "200")).unwrap();
    drop(tx);

    let mut source = ChannelEventSource::new(rx);
    let mut first =
        SessionController::new(RecordingFrontend::default(), MemorySlot::default());
    runtime::run(&mut source, &mut first);
    assert_eq!(first.store().len(), 2);
    let blob = first.slot().contents().unwrap();

    // Second session: only a location fix, the store comes back rendered
    let (tx, rx) = mpsc::channel();
    tx.send(SessionEvent::LocationResolved(GeoPoint::new(45.0, 7.0)))
        .unwrap();
    drop(tx);

    let mut source = ChannelEventSource::new(rx);
    let mut second = SessionController::new(
        RecordingFrontend::default(),
        MemorySlot::with_blob(&blob),
    );
    runtime::run(&mut source, &mut second);

    assert_eq!(second.store().len(), 2);
    // order and identity survive the round trip
    for (a, b) in first.store().all().iter().zip(second.store().all()) {
        assert_eq!(a, b);
    }
    // one position marker plus one marker and entry per restored record
    assert_eq!(second.frontend().markers.len(), 3);
    assert_eq!(second.frontend().entries.len(), 2);
}

#[test]
fn headless_location_failure_dead_ends_the_session() {
    let (tx, rx) = mpsc::channel();
    tx.send(SessionEvent::LocationFailed).unwrap();
    tx.send(SessionEvent::MapClicked(GeoPoint::new(45.1, 7.2)))
        .unwrap();
    tx.send(cycling_submit("10", "30", "200")).unwrap();
    drop(tx);

    let mut source = ChannelEventSource::new(rx);
    let mut controller =
        SessionController::new(RecordingFrontend::default(), MemorySlot::default());
    runtime::run(&mut source, &mut controller);

    assert_eq!(controller.phase(), Phase::LocationDenied);
    assert!(controller.store().is_empty());
    assert!(controller.slot().contents().is_none());
    assert_eq!(controller.frontend().notices.len(), 1);
}
