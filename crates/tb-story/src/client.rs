use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use log::debug;

use crate::config::StoryConfig;
use crate::error::{StoryError, StoryResult};
use crate::protocol::{StoryRequest, StoryResponse};

/// Sends a story turn to whatever generates the story.
pub trait StoryClient: Send + Sync {
    /// Submit one turn and wait for the service's answer.
    fn send(&self, request: StoryRequest) -> BoxFuture<'_, StoryResult<StoryResponse>>;
}

/// Talks to the story service over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpStoryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStoryClient {
    /// Build a client for the configured endpoint.
    pub fn new(config: &StoryConfig) -> StoryResult<Self> {
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            return Err(StoryError::InvalidEndpoint(config.endpoint.clone()));
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The URL requests are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl StoryClient for HttpStoryClient {
    fn send(&self, request: StoryRequest) -> BoxFuture<'_, StoryResult<StoryResponse>> {
        async move {
            debug!(
                "posting command {:?} with {} history entries",
                request.current_command,
                request.story_history.len()
            );
            let response = self
                .client
                .post(&self.endpoint)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(StoryError::Status(status.as_u16()));
            }

            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        }
        .boxed()
    }
}
