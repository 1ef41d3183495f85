//! Narrative history and the per-command turn cycle.

use log::{info, warn};
use tb_scene::VisualUpdate;

use crate::client::StoryClient;
use crate::config::StoryConfig;
use crate::error::StoryResult;
use crate::protocol::StoryRequest;
use crate::render::plain_text;

/// One completed story turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// The trimmed command the player entered.
    pub command: String,
    /// The narrative returned by the service.
    pub narrative: String,
    /// Scene changes to apply, if any.
    pub visuals: Option<VisualUpdate>,
}

/// A running story.
///
/// The history starts with the plain text of the opening narrative. Each
/// successful turn appends the command (as `"> command"`) and the returned
/// narrative. A failed turn leaves the history untouched so the player can
/// simply try again.
pub struct StorySession<C> {
    client: C,
    opening: String,
    history: Vec<String>,
    turns: usize,
}

impl<C: StoryClient> StorySession<C> {
    /// Start a session with the configured opening narrative.
    pub fn new(client: C, config: &StoryConfig) -> Self {
        Self {
            client,
            opening: config.opening.clone(),
            history: vec![plain_text(&config.opening)],
            turns: 0,
        }
    }

    /// The opening narrative, as configured (may contain inline HTML).
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// The story so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Submit a command. Blank input is ignored and yields `Ok(None)`.
    pub async fn submit(&mut self, input: &str) -> StoryResult<Option<Turn>> {
        let command = input.trim();
        if command.is_empty() {
            return Ok(None);
        }

        let request = StoryRequest {
            story_history: self.history.clone(),
            current_command: command.to_string(),
        };
        let response = self.client.send(request).await.inspect_err(|err| {
            warn!("story turn for {command:?} failed: {err}");
        })?;

        self.history.push(format!("> {command}"));
        self.history.push(response.narrative.clone());
        self.turns += 1;
        info!("completed story turn {}", self.turns);

        Ok(Some(Turn {
            command: command.to_string(),
            narrative: response.narrative,
            visuals: response.visuals,
        }))
    }
}
