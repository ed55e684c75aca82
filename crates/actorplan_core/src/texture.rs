//! Image loading and caching for materials.
//!
//! Images are keyed by file name, the way authoring hosts name loaded
//! images. Only the header is decoded; pixel data stays with the host.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during image loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageInfo {
    /// Cache key (file name)
    pub name: String,

    /// Full path on disk
    pub path: PathBuf,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

/// Cache for loaded images, scoped to one import run.
#[derive(Debug, Default)]
pub struct ImageCache {
    /// Cached images by file name
    images: HashMap<String, Arc<ImageInfo>>,
}

impl ImageCache {
    /// Create a new empty image cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an image, reusing a cached image with the same file name.
    pub fn load(&mut self, path: &Path) -> TextureResult<Arc<ImageInfo>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| TextureError::NoFileName(path.to_path_buf()))?;

        if let Some(image) = self.images.get(&name) {
            return Ok(image.clone());
        }

        let (width, height) = image::image_dimensions(path).map_err(|source| TextureError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let info = Arc::new(ImageInfo {
            name: name.clone(),
            path: path.to_path_buf(),
            width,
            height,
        });
        self.images.insert(name, info.clone());

        log::debug!("Loaded image: {} ({}x{})", path.display(), width, height);

        Ok(info)
    }

    /// Get a cached image by file name without loading.
    pub fn get(&self, name: &str) -> Option<Arc<ImageInfo>> {
        self.images.get(name).cloned()
    }

    /// Check if an image is cached.
    pub fn is_cached(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
