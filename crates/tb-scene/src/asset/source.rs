use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use image::ImageReader;

use crate::asset::{AssetSource, Drawable, LoadFailure, Texture};

/// Read the image header to validate the data and learn its size.
fn decode(reference: &str, bytes: &[u8]) -> Result<Drawable, LoadFailure> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(Drawable::new(Texture::new(reference, width, height)))
}

/// Loads images from a directory on disk. References are relative paths.
#[derive(Debug, Clone)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The file a reference is read from. References that are absolute or
    /// climb out of the root are refused.
    pub fn path_for(&self, reference: &str) -> Result<PathBuf, LoadFailure> {
        let relative = Path::new(reference);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || relative.as_os_str().is_empty() {
            return Err(
                format!("asset reference {reference:?} is outside the asset directory").into(),
            );
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for FileAssetSource {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<Drawable, LoadFailure>> {
        let path = self.path_for(reference);
        let reference = reference.to_string();
        async move {
            let bytes = tokio::fs::read(path?).await?;
            decode(&reference, &bytes)
        }
        .boxed()
    }
}

/// Fetches images over HTTP.
///
/// Absolute `http://` and `https://` references are fetched as-is; anything
/// else is appended to the base URL.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetSource {
    /// Fetch relative references from under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// The URL a reference is fetched from.
    pub fn url_for(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                reference.trim_start_matches('/')
            )
        }
    }
}

impl AssetSource for HttpAssetSource {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<Drawable, LoadFailure>> {
        let request = self.client.get(self.url_for(reference));
        let reference = reference.to_string();
        async move {
            let bytes = request.send().await?.error_for_status()?.bytes().await?;
            decode(&reference, &bytes)
        }
        .boxed()
    }
}

/// Fabricates a fixed-size drawable for every reference without any IO.
///
/// Used for headless runs where only the sequence of scene operations
/// matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAssetSource;

impl PlaceholderAssetSource {
    /// Side length of every placeholder texture.
    pub const SIZE: u32 = 64;
}

impl AssetSource for PlaceholderAssetSource {
    fn load(&self, reference: &str) -> BoxFuture<'static, Result<Drawable, LoadFailure>> {
        let texture = Texture::new(reference, Self::SIZE, Self::SIZE);
        async move { Ok(Drawable::new(texture)) }.boxed()
    }
}
