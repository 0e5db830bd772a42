use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Landmark {index} missing: face mesh has only {available} points")]
    MissingLandmark { index: usize, available: usize },

    #[error("Invalid colour {0:?}: expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
