//! Drawable resources and where they come from.

/// The de-duplicating asset cache.
pub mod cache;
/// Bundled asset sources (filesystem, HTTP, placeholder).
pub mod source;

use std::sync::Arc;

use futures_util::future::BoxFuture;

pub use cache::AssetCache;
pub use source::{FileAssetSource, HttpAssetSource, PlaceholderAssetSource};

/// Boxed error returned by an [`AssetSource`] when a load fails.
pub type LoadFailure = Box<dyn std::error::Error + Send + Sync>;

/// A loaded image, described by what the scene needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// The reference (path or URL) the texture was loaded from.
    pub reference: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Texture {
    /// Describe a texture by reference and size.
    pub fn new(reference: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            reference: reference.into(),
            width,
            height,
        }
    }
}

/// A shared handle to a loaded texture, ready to be placed on a surface.
///
/// Clones share the same underlying resource; [`Drawable::same_resource`]
/// tells whether two handles point at one load.
#[derive(Debug, Clone)]
pub struct Drawable(Arc<Texture>);

impl Drawable {
    /// Wrap a freshly loaded texture.
    pub fn new(texture: Texture) -> Self {
        Self(Arc::new(texture))
    }

    /// The underlying texture description.
    pub fn texture(&self) -> &Texture {
        &self.0
    }

    /// The reference this drawable was loaded from.
    pub fn reference(&self) -> &str {
        &self.0.reference
    }

    /// Whether both handles share one loaded resource.
    pub fn same_resource(&self, other: &Drawable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Something that can turn an asset reference into a [`Drawable`].
///
/// Implementations perform the actual IO; caching and de-duplication are
/// the [`AssetCache`]'s job.
pub trait AssetSource: Send + Sync + 'static {
    /// Load the asset named by `reference`.
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<Drawable, LoadFailure>>;
}
