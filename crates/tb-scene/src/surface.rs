//! The rendering surface the scene graph drives.
//!
//! The scene graph never draws pixels itself. It issues a sequence of
//! add/remove/retexture/move operations against a [`Surface`], and the
//! surface decides what that means on screen.

use std::collections::BTreeSet;
use std::fmt;

use log::info;

use crate::asset::Drawable;

/// Handle issued by a surface for a placed drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stacking hint passed along with every new drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZOrder {
    /// Below everything else.
    Background,
    /// Stacked above the background; higher values draw on top.
    Stacked(u64),
}

impl fmt::Display for ZOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Stacked(z) => write!(f, "{z}"),
        }
    }
}

/// A drawable-placement capability.
pub trait Surface: Send + 'static {
    /// Place a drawable and return its handle.
    fn add_drawable(&mut self, drawable: &Drawable, z: ZOrder) -> SurfaceHandle;

    /// Take a placed drawable off the surface.
    fn remove_drawable(&mut self, handle: SurfaceHandle);

    /// Swap the texture of a placed drawable.
    fn set_texture(&mut self, handle: SurfaceHandle, drawable: &Drawable);

    /// Move a placed drawable.
    fn set_position(&mut self, handle: SurfaceHandle, x: f64, y: f64);
}

/// One operation issued against a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// A drawable was placed.
    Add {
        /// Issued handle.
        handle: SurfaceHandle,
        /// Reference of the placed drawable.
        reference: String,
        /// Stacking hint.
        z: ZOrder,
    },
    /// A drawable was removed.
    Remove {
        /// The removed handle.
        handle: SurfaceHandle,
    },
    /// A drawable's texture was swapped.
    SetTexture {
        /// The retextured handle.
        handle: SurfaceHandle,
        /// Reference of the new texture.
        reference: String,
    },
    /// A drawable was moved.
    SetPosition {
        /// The moved handle.
        handle: SurfaceHandle,
        /// New horizontal coordinate.
        x: f64,
        /// New vertical coordinate.
        y: f64,
    },
}

impl fmt::Display for SurfaceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add {
                handle,
                reference,
                z,
            } => write!(f, "add {handle} {reference} z={z}"),
            Self::Remove { handle } => write!(f, "remove {handle}"),
            Self::SetTexture { handle, reference } => {
                write!(f, "texture {handle} {reference}")
            }
            Self::SetPosition { handle, x, y } => write!(f, "move {handle} ({x}, {y})"),
        }
    }
}

/// Shared bookkeeping for the bundled surfaces: handle issue and liveness.
#[derive(Debug, Default)]
struct Placements {
    next: u64,
    live: BTreeSet<SurfaceHandle>,
}

impl Placements {
    fn issue(&mut self) -> SurfaceHandle {
        self.next += 1;
        let handle = SurfaceHandle(self.next);
        self.live.insert(handle);
        handle
    }

    fn retire(&mut self, handle: SurfaceHandle) {
        self.live.remove(&handle);
    }
}

/// A surface that records every operation in order.
///
/// Used for headless replays and to assert on the exact operation sequence.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    placements: Placements,
}

impl RecordingSurface {
    /// Create an empty recording surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation issued so far, oldest first.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Take the recorded operations, leaving the log empty.
    pub fn drain_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of drawables currently placed.
    pub fn live_count(&self) -> usize {
        self.placements.live.len()
    }

    /// Whether a handle is currently placed.
    pub fn is_live(&self, handle: SurfaceHandle) -> bool {
        self.placements.live.contains(&handle)
    }

    /// Count operations matching a predicate.
    pub fn count_ops(&self, pred: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn add_drawable(&mut self, drawable: &Drawable, z: ZOrder) -> SurfaceHandle {
        let handle = self.placements.issue();
        self.ops.push(SurfaceOp::Add {
            handle,
            reference: drawable.reference().to_string(),
            z,
        });
        handle
    }

    fn remove_drawable(&mut self, handle: SurfaceHandle) {
        self.placements.retire(handle);
        self.ops.push(SurfaceOp::Remove { handle });
    }

    fn set_texture(&mut self, handle: SurfaceHandle, drawable: &Drawable) {
        self.ops.push(SurfaceOp::SetTexture {
            handle,
            reference: drawable.reference().to_string(),
        });
    }

    fn set_position(&mut self, handle: SurfaceHandle, x: f64, y: f64) {
        self.ops.push(SurfaceOp::SetPosition { handle, x, y });
    }
}

/// A surface that only logs what it is asked to do.
#[derive(Debug, Default)]
pub struct LogSurface {
    placements: Placements,
}

impl LogSurface {
    /// Create a logging surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drawables currently placed.
    pub fn live_count(&self) -> usize {
        self.placements.live.len()
    }

    fn log(op: SurfaceOp) {
        info!(target: "tb_scene::surface", "{op}");
    }
}

impl Surface for LogSurface {
    fn add_drawable(&mut self, drawable: &Drawable, z: ZOrder) -> SurfaceHandle {
        let handle = self.placements.issue();
        Self::log(SurfaceOp::Add {
            handle,
            reference: drawable.reference().to_string(),
            z,
        });
        handle
    }

    fn remove_drawable(&mut self, handle: SurfaceHandle) {
        self.placements.retire(handle);
        Self::log(SurfaceOp::Remove { handle });
    }

    fn set_texture(&mut self, handle: SurfaceHandle, drawable: &Drawable) {
        Self::log(SurfaceOp::SetTexture {
            handle,
            reference: drawable.reference().to_string(),
        });
    }

    fn set_position(&mut self, handle: SurfaceHandle, x: f64, y: f64) {
        Self::log(SurfaceOp::SetPosition { handle, x, y });
    }
}
