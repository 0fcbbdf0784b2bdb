use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Errors a registered provider can report back to the resolver
#[derive(Debug, Error)] // Automatically implement `Debug` and `Error` traits for the enum
pub enum ProviderError {
    // Provider code ran but could not produce data, with a message
    #[error("provider failed: {0}")]
    Failed(String),

    // Provider produced a value that could not be turned into JSON
    #[error("provider returned unserializable data: {0}")]
    Json(#[from] serde_json::Error),
}

// Errors raised while loading settings from an explicit source
#[derive(Debug, Error)]
pub enum SettingsError {
    // File missing or unreadable, malformed document, or a value of the wrong type
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

// Errors from the identity hash computation
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("hmac failed: {0}")]
    HmacFailed(String),
}

// Type alias for results that use `ProviderError` as the error type
pub type Result<T> = std::result::Result<T, ProviderError>;
