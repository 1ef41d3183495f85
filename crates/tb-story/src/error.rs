//! Error types for talking to the story service.

use thiserror::Error;

/// Result type for story operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that can occur during a story turn.
#[derive(Debug, Error)]
pub enum StoryError {
    /// The request never got a response.
    #[error("story service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("story service returned HTTP {0}")]
    Status(u16),

    /// The response body was not a valid story response.
    #[error("malformed story response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client was configured with an unusable endpoint.
    #[error("invalid story endpoint: {0}")]
    InvalidEndpoint(String),
}
