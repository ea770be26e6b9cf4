//! Image store: the picture files under the public web root.
//!
//! Content documents reference images by public path (`/images/hero.jpg`),
//! so listing returns those paths rather than filesystem paths. Uploads
//! arrive base64-encoded from the editor, optionally still carrying the
//! `data:image/png;base64,` header a browser `FileReader` produces.

use crate::store::list_files;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

/// Extensions listed by the image picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "svg", "gif"];

static DATA_URL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/\w+;base64,").expect("valid regex"));

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("invalid image filename: {0:?}")]
    InvalidFilename(String),
    #[error("filename and content are required")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    public_root: PathBuf,
    images_dir: String,
}

impl ImageStore {
    pub fn new(public_root: impl Into<PathBuf>, images_dir: impl Into<String>) -> Self {
        Self {
            public_root: public_root.into(),
            images_dir: images_dir.into().trim_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.public_root.join(&self.images_dir)
    }

    /// Public paths of every image, sorted. `filter` keeps only paths that
    /// contain it, ignoring case.
    pub fn list(&self, filter: Option<&str>) -> Vec<String> {
        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        list_files(&self.dir(), IMAGE_EXTENSIONS)
            .into_iter()
            .map(|rel| self.public_path(&rel))
            .filter(|path| match &needle {
                Some(needle) => path.to_lowercase().contains(needle),
                None => true,
            })
            .collect()
    }

    /// Decode and store an upload, returning its public path.
    ///
    /// An existing file with the same name is overwritten.
    pub fn upload(&self, filename: &str, content: &str) -> Result<String, ImageError> {
        if filename.is_empty() || content.is_empty() {
            return Err(ImageError::Empty);
        }
        if filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(ImageError::InvalidFilename(filename.to_string()));
        }
        let payload = DATA_URL_HEADER.replace(content, "");
        let bytes = STANDARD.decode(payload.trim().as_bytes())?;

        let dir = self.dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(filename), bytes)?;
        tracing::info!(filename, "stored uploaded image");
        Ok(self.public_path(filename))
    }

    fn public_path(&self, rel: &str) -> String {
        format!("/{}/{}", self.images_dir, rel)
    }
}
