//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model fit error: {0}")]
    ModelFit(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
