//! The narrative side of Tableau.
//!
//! A [`StorySession`] keeps the running story history and sends each player
//! command, together with that history, to a remote story-generation
//! service through a [`StoryClient`]. The service answers with narrative
//! text and, optionally, a [`tb_scene::VisualUpdate`] for the scene.

/// The story client seam and its HTTP implementation.
pub mod client;
/// Story service configuration.
pub mod config;
/// Error types for the story crate.
pub mod error;
/// Request and response payloads of the story service.
pub mod protocol;
/// Converts the service's inline HTML into terminal text.
pub mod render;
/// Narrative history and the per-command turn cycle.
pub mod session;

pub use client::{HttpStoryClient, StoryClient};
pub use config::StoryConfig;
pub use error::{StoryError, StoryResult};
pub use protocol::{StoryRequest, StoryResponse};
pub use render::{plain_text, render_narrative};
pub use session::{StorySession, Turn};
