use thiserror::Error;

/// Main error type for the serving adapter
#[derive(Error, Debug)]
pub enum ServeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Artifact errors
    #[error("Artifact load failed: {0}")]
    ArtifactLoad(String),

    // Lifecycle errors
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // Request errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for ServeError
pub type Result<T> = std::result::Result<T, ServeError>;
