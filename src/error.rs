use thiserror::Error;

use crate::ui::wizard::WizardError;

#[derive(Error, Debug)]
pub enum FertilogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wizard: {0}")]
    Wizard(#[from] WizardError),
}

pub type Result<T> = std::result::Result<T, FertilogError>;
