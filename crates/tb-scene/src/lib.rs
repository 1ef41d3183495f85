//! Scene state reconciliation for Tableau.
//!
//! A story turn may carry a declarative [`VisualUpdate`]: a background, a set
//! of characters keyed by identity, and a list of transient effects. The
//! [`Reconciler`] resolves the referenced assets through the [`AssetCache`]
//! and applies the smallest set of mutations to a caller-owned [`Scene`].
//! Effects are retired by the scene's [`EffectScheduler`] once their duration
//! elapses. Rendering itself happens behind the [`Surface`] trait.

/// Drawable resources, asset sources, and the de-duplicating cache.
pub mod asset;
/// Scene tuning: effect duration defaults and viewport size.
pub mod config;
/// Error types for asset loading and partial updates.
pub mod error;
/// Node identities, layers, and positions.
pub mod node;
/// Applies visual updates to a scene.
pub mod reconciler;
/// The caller-owned scene: graph plus effect timers.
pub mod scene;
/// Timed removal of transient effect nodes.
pub mod scheduler;
/// The ordered, layered scene graph store.
pub mod store;
/// Abstract rendering surface and the bundled implementations.
pub mod surface;
/// Declarative visual update payloads.
pub mod update;

pub use asset::{AssetCache, AssetSource, Drawable, Texture};
pub use config::{SceneConfig, Viewport};
pub use error::{AssetLoadError, ItemFailure, PartialUpdateFailure, UpdateItem};
pub use node::{Layer, NodeHandle, NodeIdentity, Position, SceneNode};
pub use reconciler::{Reconciler, UpdateReport};
pub use scene::Scene;
pub use scheduler::EffectScheduler;
pub use store::{CharacterChange, SceneGraph};
pub use surface::{LogSurface, RecordingSurface, Surface, SurfaceHandle, SurfaceOp, ZOrder};
pub use update::{CharacterSpec, EffectSpec, VisualUpdate};
