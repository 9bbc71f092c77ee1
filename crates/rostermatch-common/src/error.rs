use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterMatchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Unexpected HTML structure: {0}")]
    HtmlStructure(String),

    #[error("OAI-PMH error ({code}): {message}")]
    OaiPmh { code: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security policy violation: {0}")]
    SecurityError(String),
}

pub type Result<T> = std::result::Result<T, RosterMatchError>;
