use thiserror::Error;

/// Top-level error type for Folio.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Missing or invalid startup configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A text bundle could not be loaded or failed the structural check.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// A text key was looked up that the bundle does not define.
    #[error("missing text key '{key}' in {lang} bundle")]
    MissingKey { lang: String, key: String },

    /// The messaging platform rejected or failed an outbound call.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
