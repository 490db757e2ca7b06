use thiserror::Error;

/// Failures raised while assembling, encoding, or writing a dashboard.
///
/// All of these are deterministic construction defects: nothing is retried,
/// the dashboard in progress is abandoned and the failure is reported to the
/// caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("incomplete configuration: {0}")]
    IncompleteConfiguration(String),

    #[error("invalid layout for panel \"{panel}\": {reason}")]
    InvalidLayout { panel: String, reason: String },

    #[error("duplicate variable name \"{0}\"")]
    DuplicateVariableName(String),

    #[error("dashboard is finalized, \"{0}\" is no longer allowed")]
    InvalidState(&'static str),

    #[error("failed to encode dashboard: {0}")]
    SerializationFailure(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    SinkWriteFailure(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
