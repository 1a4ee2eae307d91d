use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration for `{field}`: {message}")]
    Configuration { field: String, message: String },

    #[error("No text metrics available for font family '{family}'")]
    MeasurementUnavailable { family: String },

    #[error("Layout failed: {0}")]
    Layout(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CaptionError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        CaptionError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptionError>;
