use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, RokuError>;

/// Errors that can occur while discovering Roku devices
#[derive(Error, Debug)]
pub enum RokuError {
    /// I/O error from the discovery socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Update channel was closed unexpectedly
    #[error("Channel closed")]
    ChannelClosed,
}
