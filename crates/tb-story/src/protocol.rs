use serde::{Deserialize, Serialize};
use tb_scene::VisualUpdate;

/// Body of a request to the story service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRequest {
    /// Everything said so far: the opening, then alternating
    /// `"> command"` and narrative entries.
    pub story_history: Vec<String>,
    /// The command being submitted.
    pub current_command: String,
}

/// Body of a story service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    /// Narrative text. May contain inline HTML.
    pub narrative: String,
    /// Scene changes accompanying the narrative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visuals: Option<VisualUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_snake_case_fields() {
        let request = StoryRequest {
            story_history: vec!["You wake.".into()],
            current_command: "look".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"story_history": ["You wake."], "current_command": "look"})
        );
    }

    #[test]
    fn response_without_visuals() {
        let response: StoryResponse =
            serde_json::from_str(r#"{"narrative": "The dealer smiles."}"#).unwrap();
        assert_eq!(response.narrative, "The dealer smiles.");
        assert!(response.visuals.is_none());
    }

    #[test]
    fn response_with_visuals() {
        let response: StoryResponse = serde_json::from_str(
            r#"{"narrative": "Lights flare.", "visuals": {"background": "floor.png"}}"#,
        )
        .unwrap();
        assert_eq!(
            response.visuals.unwrap().background(),
            Some("floor.png")
        );
    }
}
