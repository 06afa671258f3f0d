use crate::error::ValidationError;
use crate::workout::{
    GeoPoint, Workout, WorkoutKind, CYCLING_FIELDS, RUNNING_FIELDS, SHARED_FIELDS,
};

/// Raw field values as read off the form surface on submit. Only the extra
/// input matching `kind` is consulted; the hidden one is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// Parsed and validated form data, waiting only for coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutDraft {
    kind: WorkoutKind,
    distance_km: f64,
    duration_min: f64,
    extra: f64,
}

impl WorkoutDraft {
    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub fn build(self, point: GeoPoint) -> Result<Workout, ValidationError> {
        match self.kind {
            WorkoutKind::Running => {
                Workout::running(point, self.distance_km, self.duration_min, self.extra, None, None)
            }
            WorkoutKind::Cycling => {
                Workout::cycling(point, self.distance_km, self.duration_min, self.extra, None, None)
            }
        }
    }
}

fn numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validation order mirrors the submit handler: every required field must be
/// a finite number first, then distance/duration (and running cadence) must
/// be positive. Each failure carries its own user-facing message.
pub fn parse(fields: &FormFields) -> Result<WorkoutDraft, ValidationError> {
    let distance = numeric(&fields.distance);
    let duration = numeric(&fields.duration);

    match fields.kind {
        WorkoutKind::Running => {
            let (Some(distance_km), Some(duration_min), Some(cadence_spm)) =
                (distance, duration, numeric(&fields.cadence))
            else {
                return Err(ValidationError::NotANumber {
                    fields: RUNNING_FIELDS,
                });
            };
            if !(distance_km > 0.0 && duration_min > 0.0 && cadence_spm > 0.0) {
                return Err(ValidationError::NotPositive {
                    fields: RUNNING_FIELDS,
                });
            }
            Ok(WorkoutDraft {
                kind: WorkoutKind::Running,
                distance_km,
                duration_min,
                extra: cadence_spm,
            })
        }
        WorkoutKind::Cycling => {
            let (Some(distance_km), Some(duration_min), Some(elevation_gain_m)) =
                (distance, duration, numeric(&fields.elevation))
            else {
                return Err(ValidationError::NotANumber {
                    fields: CYCLING_FIELDS,
                });
            };
            if !(distance_km > 0.0 && duration_min > 0.0) {
                return Err(ValidationError::NotPositive {
                    fields: SHARED_FIELDS,
                });
            }
            Ok(WorkoutDraft {
                kind: WorkoutKind::Cycling,
                distance_km,
                duration_min,
                extra: elevation_gain_m,
            })
        }
    }
}
