//! Error taxonomy shared by the engine bridge and the adapters.

use std::path::PathBuf;

pub type Result<T, E = BctError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum BctError {
    #[error("MATLAB/Octave engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    #[error("engine run failed with status {status}\n{log}")]
    EngineFailure { status: i32, log: String },

    #[error("variant '{variant}' expected result '{key}' which the engine did not return")]
    ContractMismatch { variant: String, key: String },

    #[error("result '{key}' of variant '{variant}' is not a scalar (shape {shape:?})")]
    NotScalar {
        variant: String,
        key: String,
        shape: Vec<usize>,
    },

    #[error("result '{key}' of variant '{variant}' is {value}, which has no integer value")]
    NotInteger {
        variant: String,
        key: String,
        value: f64,
    },

    #[error("parameter '{name}' of variant '{variant}' would shadow one of its results")]
    ParameterClash { variant: String, name: String },

    #[error("variant '{variant}' rejects this connectivity: {reason}")]
    ConstraintViolation { variant: String, reason: String },

    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(String),

    #[error("unknown analysis variant: {0}")]
    UnknownVariant(String),

    #[error("analysis variant already registered: {0}")]
    DuplicateVariant(String),

    #[error("malformed engine data: {0}")]
    MalformedData(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BctError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
