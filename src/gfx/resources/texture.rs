//! Icon texture loading
//!
//! Node cubes are skinned with the icon of the resource they represent.
//! Loading is the only asynchronous step of scene construction; the
//! [`TextureLoader`] trait lets callers plug in whatever asset source they
//! have (file system, HTTP, an embedded pack).

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};

use crate::error::AssetLoadError;

/// Decoded RGBA8 pixel data ready for upload to the GPU
#[derive(Clone, PartialEq, Eq)]
pub struct IconTexture {
    /// Debug label, the icon path it was loaded from
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    pub rgba: Vec<u8>,
}

impl IconTexture {
    pub fn new(label: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            rgba,
        }
    }

    /// Single-color texture, used by test loaders and as a placeholder
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self::new(label, 1, 1, rgba.to_vec())
    }

    /// Bytes per row, as expected by `wgpu::TexelCopyBufferLayout`
    pub fn bytes_per_row(&self) -> u32 {
        4 * self.width
    }
}

impl std::fmt::Debug for IconTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconTexture")
            .field("label", &self.label)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Source of icon textures.
///
/// Each call is attempted once; the graph builder logs failures and keeps
/// going without a texture.
pub trait TextureLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<IconTexture, AssetLoadError>>;
}

/// Loads PNG icons from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileTextureLoader {
    root: PathBuf,
}

impl FileTextureLoader {
    /// Creates a loader resolving icon paths against `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn load_sync(&self, path: &str) -> Result<IconTexture, AssetLoadError> {
        if path.trim().is_empty() {
            return Err(AssetLoadError::Missing(path.to_string()));
        }
        let full_path = self.root.join(path);
        let bytes = std::fs::read(&full_path).map_err(|source| AssetLoadError::Read {
            path: full_path.clone(),
            source,
        })?;

        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetLoadError::Decode {
                path: full_path.clone(),
                source,
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        log::debug!("Loaded icon {} ({}x{})", full_path.display(), width, height);
        Ok(IconTexture::new(path, width, height, image.into_raw()))
    }
}

impl TextureLoader for FileTextureLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<IconTexture, AssetLoadError>> {
        async move { self.load_sync(path) }.boxed()
    }
}
