use thiserror::Error;

use crate::action::ActionError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum TentError {
    #[error("Invalid capacity {value:?} for tent '{label}'")]
    InvalidCapacity { label: String, value: String },

    #[error("Tents provide {seats} seats but there are {people} people")]
    CapacityMismatch { seats: usize, people: usize },

    #[error("Malformed preference row at line {line}: {reason}")]
    MalformedPreferenceRow { line: u64, reason: String },

    #[error("No people found in preference data")]
    EmptyRoster,

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, TentError>;
