use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Config error: {message}")]
    Config { message: String },

    #[error("Schema error: required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("Schema error: column '{column}' at row {row} has invalid value '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiskError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn { column: column.into() }
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
