use std::time::Duration;

use crate::node::Position;
use crate::update::EffectSpec;

/// Longest lifetime an effect may declare. Longer requests are clamped.
pub const MAX_EFFECT_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Size of the rendering surface, in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Viewport {
    /// The centre point, where the background is anchored.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Tuning for scene reconciliation.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Lifetime of an effect that declares no positive duration.
    pub default_effect_duration: Duration,
    /// Size of the rendering surface.
    pub viewport: Viewport,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_effect_duration: Duration::from_millis(1000),
            viewport: Viewport::default(),
        }
    }
}

impl SceneConfig {
    /// Set the fallback effect lifetime.
    pub fn with_default_effect_duration(mut self, duration: Duration) -> Self {
        self.default_effect_duration = duration;
        self
    }

    /// Set the viewport size.
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// How long an effect stays on screen.
    ///
    /// Missing, zero, negative, and non-finite durations all fall back to
    /// the default; none of them means "remove immediately". Durations past
    /// [`MAX_EFFECT_DURATION`] are clamped to it.
    pub fn effect_duration(&self, effect: &EffectSpec) -> Duration {
        match effect.duration_ms {
            Some(ms) if ms > 0.0 && ms.is_finite() => Duration::try_from_secs_f64(ms / 1000.0)
                .map_or(MAX_EFFECT_DURATION, |d| d.min(MAX_EFFECT_DURATION)),
            _ => self.default_effect_duration,
        }
    }

    /// Where the background node is placed.
    pub fn background_position(&self) -> Position {
        self.viewport.center()
    }
}
