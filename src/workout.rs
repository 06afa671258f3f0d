use crate::error::ValidationError;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) const RUNNING_FIELDS: &str = "distance, duration and cadence";
pub(crate) const CYCLING_FIELDS: &str = "distance, duration and elevation";
pub(crate) const SHARED_FIELDS: &str = "distance and duration";

/// A latitude/longitude pair as reported by the map or the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

/// Storage discriminant and form selector value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Fixed label used in descriptions: running logs as a "run", cycling as
    /// a "ride".
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "run",
            WorkoutKind::Cycling => "ride",
        }
    }

    /// Style class attached to this kind's map markers.
    pub fn marker_style(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running-popup",
            WorkoutKind::Cycling => "cycling-popup",
        }
    }
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque record identifier: a 10-digit numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Derive a fresh id from the creation time. A process-wide sequence
    /// number is mixed in so records created within the same millisecond
    /// still get distinct ids.
    pub fn generate(at: DateTime<Utc>) -> Self {
        let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
        let millis = at.timestamp_millis().max(0) as u64;
        Self(format!("{:010}", (millis + seq) % 10_000_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant payload: the measured extra plus the metric derived from it.
/// Derived values are computed once, at construction, and never stored
/// independently of their inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Details {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// One logged workout, running or cycling. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    point: GeoPoint,
    distance_km: f64,
    duration_min: f64,
    timestamp: DateTime<Utc>,
    description: String,
    details: Details,
}

impl Workout {
    /// Build a running record. `timestamp` and `id` default to "now" and a
    /// generated id; reconstruction from storage passes both explicitly.
    pub fn running(
        point: GeoPoint,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
        timestamp: Option<DateTime<Utc>>,
        id: Option<WorkoutId>,
    ) -> Result<Self, ValidationError> {
        if ![distance_km, duration_min, cadence_spm]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ValidationError::NotANumber {
                fields: RUNNING_FIELDS,
            });
        }
        if !(distance_km > 0.0 && duration_min > 0.0 && cadence_spm > 0.0) {
            return Err(ValidationError::NotPositive {
                fields: RUNNING_FIELDS,
            });
        }

        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let id = id.unwrap_or_else(|| WorkoutId::generate(timestamp));
        Ok(Self {
            description: describe(WorkoutKind::Running, timestamp),
            details: Details::Running {
                cadence_spm,
                pace_min_per_km: duration_min / distance_km,
            },
            id,
            point,
            distance_km,
            duration_min,
            timestamp,
        })
    }

    /// Build a cycling record. Elevation gain may be zero or negative (a
    /// net-downhill ride), but must be an actual number.
    pub fn cycling(
        point: GeoPoint,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
        timestamp: Option<DateTime<Utc>>,
        id: Option<WorkoutId>,
    ) -> Result<Self, ValidationError> {
        if ![distance_km, duration_min, elevation_gain_m]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ValidationError::NotANumber {
                fields: CYCLING_FIELDS,
            });
        }
        if !(distance_km > 0.0 && duration_min > 0.0) {
            return Err(ValidationError::NotPositive {
                fields: SHARED_FIELDS,
            });
        }

        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let id = id.unwrap_or_else(|| WorkoutId::generate(timestamp));
        Ok(Self {
            description: describe(WorkoutKind::Cycling, timestamp),
            details: Details::Cycling {
                elevation_gain_m,
                speed_km_per_h: distance_km / (duration_min / 60.0),
            },
            id,
            point,
            distance_km,
            duration_min,
            timestamp,
        })
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> Details {
        self.details
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.details {
            Details::Running { .. } => WorkoutKind::Running,
            Details::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub fn cadence_spm(&self) -> Option<f64> {
        match self.details {
            Details::Running { cadence_spm, .. } => Some(cadence_spm),
            Details::Cycling { .. } => None,
        }
    }

    pub fn elevation_gain_m(&self) -> Option<f64> {
        match self.details {
            Details::Running { .. } => None,
            Details::Cycling { elevation_gain_m, .. } => Some(elevation_gain_m),
        }
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.details {
            Details::Running { pace_min_per_km, .. } => Some(pace_min_per_km),
            Details::Cycling { .. } => None,
        }
    }

    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.details {
            Details::Running { .. } => None,
            Details::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
        }
    }

    /// Text for this record's map marker popup.
    pub fn popup_text(&self) -> String {
        format!("{}: {}", self.kind(), self.description)
    }

    /// List entry lines: the shared metrics followed by the kind-specific
    /// pair. Rounding to one decimal happens here and only here.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} km", self.distance_km),
            format!("{} min", self.duration_min),
        ];
        match self.details {
            Details::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                lines.push(format!("{:.1} min/km", pace_min_per_km));
                lines.push(format!("{} spm", cadence_spm));
            }
            Details::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                lines.push(format!("{:.1} km/h", speed_km_per_h));
                lines.push(format!("{} m", elevation_gain_m));
            }
        }
        lines
    }
}

fn describe(kind: WorkoutKind, at: DateTime<Utc>) -> String {
    format!("{}/{} {}", at.month(), at.day(), kind.label())
}
