//! Configuration for the story service connection.

use std::time::Duration;

/// The greeting shown before the first command, seeded into the history.
pub const DEFAULT_OPENING: &str = "You stand at the entrance of the \
<span class=\"highlight\">Casino For Real</span>, a place that hums with an \
unnatural energy. The story is yours to shape. What will you do?";

/// Story service settings.
#[derive(Debug, Clone)]
pub struct StoryConfig {
    /// URL that story requests are POSTed to.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Opening narrative. May contain inline HTML.
    pub opening: String,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/openai-proxy".to_string(),
            timeout: Duration::from_secs(30),
            opening: DEFAULT_OPENING.to_string(),
        }
    }
}

impl StoryConfig {
    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the opening narrative.
    pub fn with_opening(mut self, opening: impl Into<String>) -> Self {
        self.opening = opening.into();
        self
    }
}
