use crate::error::ValidationError;
use crate::store::WorkoutStore;
use crate::workout::{Details, GeoPoint, Workout, WorkoutId};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Plain attributes of one persisted record, tagged by kind. Derived metrics
/// are left out on purpose; the model recomputes them on reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredWorkout {
    Running {
        id: WorkoutId,
        lat: f64,
        lng: f64,
        distance_km: f64,
        duration_min: f64,
        timestamp: DateTime<Utc>,
        cadence_spm: f64,
    },
    Cycling {
        id: WorkoutId,
        lat: f64,
        lng: f64,
        distance_km: f64,
        duration_min: f64,
        timestamp: DateTime<Utc>,
        elevation_gain_m: f64,
    },
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let point = w.point();
        match w.details() {
            Details::Running { cadence_spm, .. } => StoredWorkout::Running {
                id: w.id().clone(),
                lat: point.lat,
                lng: point.lng,
                distance_km: w.distance_km(),
                duration_min: w.duration_min(),
                timestamp: w.timestamp(),
                cadence_spm,
            },
            Details::Cycling {
                elevation_gain_m, ..
            } => StoredWorkout::Cycling {
                id: w.id().clone(),
                lat: point.lat,
                lng: point.lng,
                distance_km: w.distance_km(),
                duration_min: w.duration_min(),
                timestamp: w.timestamp(),
                elevation_gain_m,
            },
        }
    }
}

impl StoredWorkout {
    /// Rebuild the typed record, reapplying the model's construction checks.
    /// The stored timestamp and id are preserved, not regenerated.
    fn revive(self) -> Result<Workout, ValidationError> {
        match self {
            StoredWorkout::Running {
                id,
                lat,
                lng,
                distance_km,
                duration_min,
                timestamp,
                cadence_spm,
            } => Workout::running(
                GeoPoint::new(lat, lng),
                distance_km,
                duration_min,
                cadence_spm,
                Some(timestamp),
                Some(id),
            ),
            StoredWorkout::Cycling {
                id,
                lat,
                lng,
                distance_km,
                duration_min,
                timestamp,
                elevation_gain_m,
            } => Workout::cycling(
                GeoPoint::new(lat, lng),
                distance_km,
                duration_min,
                elevation_gain_m,
                Some(timestamp),
                Some(id),
            ),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    workouts: Vec<StoredWorkout>,
}

/// Snapshot the whole store as a JSON blob.
pub fn serialize(store: &WorkoutStore) -> String {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        workouts: store.all().iter().map(StoredWorkout::from).collect(),
    };
    serde_json::to_string(&snapshot).unwrap_or_default()
}

/// Rebuild a store from a persisted blob. Best effort: an absent, empty,
/// malformed, or wrong-version blob yields an empty store, never an error,
/// so a bad snapshot can never block the session from starting.
pub fn deserialize(blob: Option<&str>) -> WorkoutStore {
    let Some(raw) = blob else {
        return WorkoutStore::new();
    };
    let snapshot: Snapshot = match serde_json::from_str(raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(%err, "discarding unreadable workout snapshot");
            return WorkoutStore::new();
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        tracing::warn!(
            version = snapshot.version,
            "discarding workout snapshot with unknown version"
        );
        return WorkoutStore::new();
    }

    let mut store = WorkoutStore::new();
    for stored in snapshot.workouts {
        match stored.revive() {
            Ok(workout) => store.append(workout),
            Err(err) => {
                tracing::warn!(%err, "discarding workout snapshot with invalid record");
                return WorkoutStore::new();
            }
        }
    }
    store
}

/// Where the serialized snapshot lives between sessions.
pub trait StorageSlot {
    fn load(&self) -> Option<String>;
    fn save(&self, blob: &str) -> std::io::Result<()>;
}

/// Snapshot slot backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("mapout")
                .join("workouts.json")
        } else if let Some(pd) = ProjectDirs::from("", "", "mapout") {
            pd.data_local_dir().join("workouts.json")
        } else {
            PathBuf::from("mapout_workouts.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageSlot for FileSlot {
    fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, blob)
    }
}

/// In-memory slot for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    blob: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn with_blob(blob: &str) -> Self {
        Self {
            blob: RefCell::new(Some(blob.to_string())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl StorageSlot for MemorySlot {
    fn load(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn mixed_store() -> WorkoutStore {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let mut store = WorkoutStore::new();
        store.append(
            Workout::running(GeoPoint::new(45.0, 7.0), 5.0, 25.0, 150.0, Some(at), None).unwrap(),
        );
        store.append(
            Workout::cycling(GeoPoint::new(46.0, 8.0), 10.0, 30.0, -3.0, Some(at), None).unwrap(),
        );
        store
    }

    #[test]
    fn test_roundtrip_preserves_records_and_derived_fields() {
        let store = mixed_store();
        let blob = serialize(&store);
        let restored = deserialize(Some(&blob));

        assert_eq!(restored.len(), store.len());
        for (a, b) in store.all().iter().zip(restored.all()) {
            // full equality covers id, timestamp, coordinates, inputs, and
            // the recomputed derived fields
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_roundtrip_of_empty_store() {
        let blob = serialize(&WorkoutStore::new());
        assert!(deserialize(Some(&blob)).is_empty());
    }

    #[test]
    fn test_absent_blob_yields_empty_store() {
        assert!(deserialize(None).is_empty());
    }

    #[test]
    fn test_malformed_blob_yields_empty_store() {
        assert!(deserialize(Some("")).is_empty());
        assert!(deserialize(Some("not json")).is_empty());
        assert!(deserialize(Some("{\"workouts\":[]}")).is_empty());
    }

    #[test]
    fn test_unknown_version_yields_empty_store() {
        let blob = "{\"version\":99,\"workouts\":[]}";
        assert!(deserialize(Some(blob)).is_empty());
    }

    #[test]
    fn test_invalid_record_drops_whole_snapshot() {
        let blob = format!(
            "{{\"version\":{SNAPSHOT_VERSION},\"workouts\":[{{\
             \"kind\":\"running\",\"id\":\"0123456789\",\"lat\":45.0,\"lng\":7.0,\
             \"distance_km\":-5.0,\"duration_min\":25.0,\
             \"timestamp\":\"2024-03-09T12:00:00Z\",\"cadence_spm\":150.0}}]}}"
        );
        assert!(deserialize(Some(&blob)).is_empty());
    }

    #[test]
    fn test_discriminant_is_written_lowercase() {
        let blob = serialize(&mixed_store());
        assert!(blob.contains("\"kind\":\"running\""));
        assert!(blob.contains("\"kind\":\"cycling\""));
    }

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = tempdir().unwrap();
        let slot = FileSlot::with_path(dir.path().join("nested").join("workouts.json"));
        assert!(slot.load().is_none());

        let blob = serialize(&mixed_store());
        slot.save(&blob).unwrap();
        let restored = deserialize(slot.load().as_deref());
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_file_slot_with_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workouts.json");
        fs::write(&path, "garbage").unwrap();

        let slot = FileSlot::with_path(&path);
        assert!(deserialize(slot.load().as_deref()).is_empty());
    }
}
