use crate::codec::{self, StorageSlot};
use crate::error::LocationUnavailable;
use crate::form::{self, FormFields};
use crate::runtime::SessionEvent;
use crate::store::WorkoutStore;
use crate::workout::{GeoPoint, Workout, WorkoutId, WorkoutKind};
use tracing::{debug, warn};

pub const DEFAULT_ZOOM: u8 = 13;

/// Where the session is in the record-creation flow. The map-driven phases
/// only exist after a successful location fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Location request in flight; nothing rendered yet.
    AwaitingLocation,
    /// Map centered, store loaded and rendered, no form shown.
    Ready,
    /// A map click captured pending coordinates and revealed the form.
    FormOpen,
    /// The location fix failed. Terminal for this session; map-driven events
    /// are ignored from here on.
    LocationDenied,
}

/// The map widget, reduced to what the session needs from it.
pub trait MapView {
    fn center_on(&mut self, point: GeoPoint, zoom: u8);
    fn place_marker(&mut self, point: GeoPoint, popup: &str, style: &str);
}

/// The record-creation form, treated as a simple input/output surface.
pub trait FormSurface {
    /// Reveal the form with focus on the distance input.
    fn show(&mut self);
    /// Clear all inputs and hide the form.
    fn hide_and_clear(&mut self);
    /// Swap which extra input (cadence vs elevation) is visible.
    fn swap_extra_field(&mut self, kind: WorkoutKind);
}

/// The rendered workout list.
pub trait WorkoutList {
    fn push_entry(&mut self, workout: &Workout);
}

/// User-facing notices (validation failures, the location alert).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Everything the controller renders through, bundled so a frontend (or a
/// recording fake) implements the four collaborator traits on one value.
pub trait Frontend: MapView + FormSurface + WorkoutList + Notifier {}

impl<T: MapView + FormSurface + WorkoutList + Notifier> Frontend for T {}

/// Orchestrates the creation flow. Exclusively owns the store and the
/// pending click coordinates; every event is handled to completion before
/// the next one arrives.
pub struct SessionController<F: Frontend, S: StorageSlot> {
    frontend: F,
    slot: S,
    store: WorkoutStore,
    phase: Phase,
    pending: Option<GeoPoint>,
    selected_kind: WorkoutKind,
    zoom: u8,
}

impl<F: Frontend, S: StorageSlot> SessionController<F, S> {
    pub fn new(frontend: F, slot: S) -> Self {
        Self::with_zoom(frontend, slot, DEFAULT_ZOOM)
    }

    pub fn with_zoom(frontend: F, slot: S, zoom: u8) -> Self {
        Self {
            frontend,
            slot,
            store: WorkoutStore::new(),
            phase: Phase::AwaitingLocation,
            pending: None,
            selected_kind: WorkoutKind::default(),
            zoom,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn pending(&self) -> Option<GeoPoint> {
        self.pending
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn handle(&mut self, event: SessionEvent) {
        debug!(?event, phase = ?self.phase, "session event");
        match event {
            SessionEvent::LocationResolved(point) => self.on_location(point),
            SessionEvent::LocationFailed => self.on_location_failed(),
            SessionEvent::MapClicked(point) => self.on_map_click(point),
            SessionEvent::KindToggled(kind) => self.on_kind_toggle(kind),
            SessionEvent::FormSubmitted(fields) => self.on_submit(fields),
            SessionEvent::EntrySelected(id) => self.on_entry_selected(id),
        }
    }

    /// Location fix arrived: center the map, restore the persisted store, and
    /// render everything it holds.
    fn on_location(&mut self, point: GeoPoint) {
        if self.phase != Phase::AwaitingLocation {
            return;
        }
        self.frontend.center_on(point, self.zoom);
        self.frontend
            .place_marker(point, "current position", "position-popup");

        self.store = codec::deserialize(self.slot.load().as_deref());
        debug!(restored = self.store.len(), "loaded workout snapshot");
        for workout in self.store.all() {
            self.frontend.place_marker(
                workout.point(),
                &workout.popup_text(),
                workout.kind().marker_style(),
            );
            self.frontend.push_entry(workout);
        }
        self.phase = Phase::Ready;
    }

    fn on_location_failed(&mut self) {
        if self.phase != Phase::AwaitingLocation {
            return;
        }
        self.phase = Phase::LocationDenied;
        self.frontend.notify(&LocationUnavailable.to_string());
    }

    fn on_map_click(&mut self, point: GeoPoint) {
        match self.phase {
            Phase::Ready => {
                self.pending = Some(point);
                self.phase = Phase::FormOpen;
                self.frontend.show();
            }
            // a second click re-aims the pending record; the form stays open
            Phase::FormOpen => self.pending = Some(point),
            Phase::AwaitingLocation | Phase::LocationDenied => {}
        }
    }

    fn on_kind_toggle(&mut self, kind: WorkoutKind) {
        if self.phase != Phase::FormOpen || kind == self.selected_kind {
            return;
        }
        self.selected_kind = kind;
        self.frontend.swap_extra_field(kind);
    }

    fn on_submit(&mut self, fields: FormFields) {
        if self.phase != Phase::FormOpen {
            return;
        }
        let Some(point) = self.pending else {
            return;
        };

        // validation failure keeps the form open and the pending coordinates
        let workout = match form::parse(&fields).and_then(|draft| draft.build(point)) {
            Ok(workout) => workout,
            Err(err) => {
                self.frontend.notify(&err.to_string());
                return;
            }
        };

        self.store.append(workout);
        self.persist();
        if let Some(workout) = self.store.all().last() {
            self.frontend.place_marker(
                workout.point(),
                &workout.popup_text(),
                workout.kind().marker_style(),
            );
            self.frontend.push_entry(workout);
        }
        self.frontend.hide_and_clear();
        self.selected_kind = fields.kind;
        self.pending = None;
        self.phase = Phase::Ready;
    }

    /// Selecting a list entry recenters the map on that record.
    fn on_entry_selected(&mut self, id: WorkoutId) {
        if matches!(self.phase, Phase::AwaitingLocation | Phase::LocationDenied) {
            return;
        }
        if let Some(workout) = self.store.find_by_id(&id) {
            let point = workout.point();
            self.frontend.center_on(point, self.zoom);
        }
    }

    /// Persistence is fire-and-forget: a failed write is logged and the
    /// session carries on with the in-memory store.
    fn persist(&mut self) {
        let blob = codec::serialize(&self.store);
        if let Err(err) = self.slot.save(&blob) {
            warn!(%err, "failed to write workout snapshot");
        }
    }
}
