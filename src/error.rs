use thiserror::Error;

/// Rejected numeric input, from the form surface or the model constructors.
/// `fields` names the whole group the failed check covers, matching the
/// message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{fields} must be numbers")]
    NotANumber { fields: &'static str },

    #[error("{fields} must be positive")]
    NotPositive { fields: &'static str },
}

/// The one-shot position lookup failed. Fatal to the map-driven flow for the
/// rest of the session; there is no retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("current position could not be determined")]
pub struct LocationUnavailable;
