use serde::{Deserialize, Serialize};

use crate::node::Position;

/// A declarative description of what the scene should look like after a
/// story turn.
///
/// Every field is optional. A missing field means "leave as is", never
/// "remove".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualUpdate {
    /// New background asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Characters to create or update, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterSpec>>,
    /// Effects to play, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<EffectSpec>>,
}

impl VisualUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a background change.
    pub fn with_background(mut self, asset_ref: impl Into<String>) -> Self {
        self.background = Some(asset_ref.into());
        self
    }

    /// Append a character.
    pub fn with_character(mut self, character: CharacterSpec) -> Self {
        self.characters.get_or_insert_with(Vec::new).push(character);
        self
    }

    /// Append an effect.
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.get_or_insert_with(Vec::new).push(effect);
        self
    }

    /// The requested background. An empty reference counts as absent.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref().filter(|b| !b.is_empty())
    }

    /// The listed characters, or nothing.
    pub fn characters(&self) -> &[CharacterSpec] {
        self.characters.as_deref().unwrap_or_default()
    }

    /// The listed effects, or nothing.
    pub fn effects(&self) -> &[EffectSpec] {
        self.effects.as_deref().unwrap_or_default()
    }

    /// Every asset reference the update mentions, in update order.
    pub fn asset_refs(&self) -> impl Iterator<Item = &str> {
        self.background()
            .into_iter()
            .chain(self.characters().iter().map(|c| c.asset_ref.as_str()))
            .chain(self.effects().iter().map(|e| e.asset_ref.as_str()))
    }

    /// Whether the update requests no change at all.
    pub fn is_empty(&self) -> bool {
        self.background().is_none() && self.characters().is_empty() && self.effects().is_empty()
    }
}

/// A character to create or update, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSpec {
    /// Stable identity across turns.
    #[serde(alias = "name")]
    pub id: String,
    /// Asset to display.
    #[serde(alias = "imageUrl")]
    pub asset_ref: String,
    /// Where to place the character.
    pub position: Position,
}

impl CharacterSpec {
    /// Describe a character.
    pub fn new(id: impl Into<String>, asset_ref: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            asset_ref: asset_ref.into(),
            position,
        }
    }
}

/// A transient effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSpec {
    /// Asset to display.
    #[serde(alias = "imageUrl")]
    pub asset_ref: String,
    /// Where to place the effect.
    pub position: Position,
    /// Lifetime in milliseconds. Non-positive values use the default.
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl EffectSpec {
    /// Describe an effect with the default lifetime.
    pub fn new(asset_ref: impl Into<String>, position: Position) -> Self {
        Self {
            asset_ref: asset_ref.into(),
            position,
            duration_ms: None,
        }
    }

    /// Set the lifetime in milliseconds.
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_payload() {
        let json = r#"{
            "background": "bg.png",
            "characters": [{"id": "hero", "assetRef": "h.png", "position": {"x": 1, "y": 2}}],
            "effects": [{"assetRef": "spark.png", "position": {"x": 3, "y": 4}, "durationMs": 500}]
        }"#;
        let update: VisualUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.background(), Some("bg.png"));
        assert_eq!(
            update.characters(),
            &[CharacterSpec::new("hero", "h.png", Position::new(1.0, 2.0))]
        );
        assert_eq!(update.effects()[0].duration_ms, Some(500.0));
    }

    #[test]
    fn accepts_legacy_field_names() {
        let json = r#"{
            "characters": [{"name": "hero", "imageUrl": "h.png", "position": {"x": 0, "y": 0}}],
            "effects": [{"imageUrl": "boom.png", "position": {"x": 0, "y": 0}, "duration": 250}]
        }"#;
        let update: VisualUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.characters()[0].id, "hero");
        assert_eq!(update.characters()[0].asset_ref, "h.png");
        assert_eq!(update.effects()[0].asset_ref, "boom.png");
        assert_eq!(update.effects()[0].duration_ms, Some(250.0));
    }

    #[test]
    fn missing_fields_mean_no_change() {
        let update: VisualUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        assert!(update.characters().is_empty());
        assert!(update.effects().is_empty());
    }

    #[test]
    fn empty_background_counts_as_absent() {
        let update = VisualUpdate::new().with_background("");
        assert_eq!(update.background(), None);
        assert!(update.is_empty());
    }

    #[test]
    fn asset_refs_in_update_order() {
        let update = VisualUpdate::new()
            .with_effect(EffectSpec::new("fx.png", Position::default()))
            .with_character(CharacterSpec::new("a", "a.png", Position::default()))
            .with_background("bg.png");
        let refs: Vec<&str> = update.asset_refs().collect();
        assert_eq!(refs, vec!["bg.png", "a.png", "fx.png"]);
    }
}
