use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::Drawable;
use crate::surface::SurfaceHandle;

/// Stable handle for a node in a [`SceneGraph`](crate::SceneGraph).
///
/// Handles are never reused within one graph, so a stale handle can only
/// ever miss; it never aliases a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The drawing layer a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The single full-scene backdrop, always drawn first.
    Background,
    /// A persistent, identity-keyed figure.
    Character,
    /// An anonymous transient overlay.
    Effect,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Character => write!(f, "character"),
            Self::Effect => write!(f, "effect"),
        }
    }
}

/// What a node is known by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeIdentity {
    /// The background slot. There is at most one.
    Background,
    /// A character with its reconciliation key.
    Character(String),
    /// An effect. Effects are anonymous and single-use.
    Effect,
}

impl NodeIdentity {
    /// The layer implied by this identity.
    pub fn layer(&self) -> Layer {
        match self {
            Self::Background => Layer::Background,
            Self::Character(_) => Layer::Character,
            Self::Effect => Layer::Effect,
        }
    }
}

/// A point on the rendering surface, in surface units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A node owned by the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// The graph-local handle.
    pub handle: NodeHandle,
    /// Identity (and implicitly the layer) of the node.
    pub identity: NodeIdentity,
    /// The asset reference the current drawable was resolved from.
    pub asset_ref: String,
    /// Current position.
    pub position: Position,
    /// When the node was first created. Updates in place keep this value.
    pub created_at: DateTime<Utc>,
    pub(crate) drawable: Drawable,
    pub(crate) surface_handle: SurfaceHandle,
}

impl SceneNode {
    /// The layer this node is drawn on.
    pub fn layer(&self) -> Layer {
        self.identity.layer()
    }

    /// The drawable currently attached to the node.
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// The handle the rendering surface issued for this node.
    pub fn surface_handle(&self) -> SurfaceHandle {
        self.surface_handle
    }
}
