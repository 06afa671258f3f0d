use crate::workout::{Workout, WorkoutId};

/// Ordered collection of the session's workouts. Insertion order is creation
/// order; records are never edited, reordered, or removed once appended.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    records: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, workout: Workout) {
        self.records.push(workout);
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.records.iter().find(|w| w.id() == id)
    }

    /// Read-only view in insertion order.
    pub fn all(&self) -> &[Workout] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Workout> for WorkoutStore {
    fn from_iter<I: IntoIterator<Item = Workout>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
