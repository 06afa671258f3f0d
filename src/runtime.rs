use std::sync::mpsc::Receiver;

use crate::codec::StorageSlot;
use crate::controller::{Frontend, SessionController};
use crate::form::FormFields;
use crate::workout::{GeoPoint, WorkoutId, WorkoutKind};

/// Unified event type consumed by the session loop. Each variant is one of
/// the well-defined inputs the controller reacts to.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    LocationResolved(GeoPoint),
    LocationFailed,
    MapClicked(GeoPoint),
    KindToggled(WorkoutKind),
    FormSubmitted(FormFields),
    EntrySelected(WorkoutId),
}

/// Source of session events (the one-shot location result, map clicks, form
/// actions).
pub trait EventSource {
    /// Block for the next event. `None` means the source is exhausted and
    /// the session loop should stop.
    fn recv(&mut self) -> Option<SessionEvent>;
}

/// Event source backed by a channel, for tests and scripted sessions.
pub struct ChannelEventSource {
    rx: Receiver<SessionEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().ok()
    }
}

/// Drains an event source into the controller, one event handled to
/// completion at a time.
pub fn run<E, F, S>(source: &mut E, controller: &mut SessionController<F, S>)
where
    E: EventSource,
    F: Frontend,
    S: StorageSlot,
{
    while let Some(event) = source.recv() {
        controller.handle(event);
    }
}
