use thiserror::Error;

/// Main error type for the configuration toolkit
#[derive(Error, Debug)]
pub enum RlconfError {
    // Tool configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Document parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not an experiment document: {0}")]
    NotADocument(String),

    // Schema errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for RlconfError
pub type Result<T> = std::result::Result<T, RlconfError>;

/// Specific error types for video filename templates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no format slot")]
    NoSlot,

    #[error("template has {count} format slots, expected exactly one")]
    MultipleSlots { count: usize },

    #[error("unsupported format spec '{spec}'")]
    UnsupportedSpec { spec: String },

    #[error("unbalanced braces in template")]
    UnbalancedBraces,
}

impl From<TemplateError> for RlconfError {
    fn from(err: TemplateError) -> Self {
        RlconfError::Validation(err.to_string())
    }
}
