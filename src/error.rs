use thiserror::Error;

/// Text shown to the user whenever the workout form rejects its input.
pub const INVALID_INPUT_ALERT: &str = "Inputs have to be positive numbers!";

/// Text shown to the user when the position request fails.
pub const NO_LOCATION_ALERT: &str = "Could not get your location!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a finite number")]
    NotANumber { field: &'static str },

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("form has no pending map position")]
    NoPosition,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serializing workouts: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("position permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    Unavailable,
}

/// A stored record that cannot be rebuilt into a typed workout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("running record {id} has no cadence")]
    MissingCadence { id: String },

    #[error("cycling record {id} has no elevation")]
    MissingElevation { id: String },

    #[error("record {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },
}
