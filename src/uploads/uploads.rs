//!
//! Documentation of the uploads module.
//! Validates, names and stores uploaded images and hands back public URLs.
//!

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use thiserror::Error;

use super::image_store::{is_safe_name, ImageStore};

/// Image types accepted by every upload form
pub const ALLOWED_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

/// Extension given to files uploaded without one
pub const DEFAULT_EXTENSION: &str = ".jpg";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only image files are allowed (JPEG, PNG, GIF, WebP), got {0}")]
    UnsupportedType(String),

    #[error("File is too large ({size} bytes), the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("The file is empty")]
    Empty,

    #[error("No image file was received")]
    Missing,

    #[error("Could not store image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not store image: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl UploadError {
    /// Rejections of the input itself, as opposed to storage failures
    pub fn is_rejection(&self) -> bool {
        !matches!(self, UploadError::Io(_) | UploadError::Database(_))
    }
}

/// One file as received from a multipart form
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Checks type and size, before anything is written
pub fn validate_image(content_type: Option<&str>, size: u64, limit: u64) -> Result<(), UploadError> {
    let content_type = content_type.map(|value| value.trim().to_ascii_lowercase()).unwrap_or_default();
    if !ALLOWED_TYPES.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType(if content_type.is_empty() { "no type".into() } else { content_type }));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    Ok(())
}

/// The original extension, lowercased, or `.jpg`
fn extension_of(original: Option<&str>) -> String {
    original
        .and_then(|name| Path::new(name).extension())
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty() && extension.len() <= 5 && extension.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|extension| format!(".{}", extension.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

///
/// A collision-resistant file name: `<unix millis>_<random><ext>`
///
/// # Example
/// ```
/// unique_filename(Some("Photo.PNG")); // "1718000000000_q3ZkVb0XyL2mN8aP.png"
/// ```
///
pub fn unique_filename(original: Option<&str>) -> String {
    let random: String = rand::thread_rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();
    format!("{}_{}{}", Utc::now().timestamp_millis(), random, extension_of(original))
}

/// Upload front door shared by every route that accepts images
pub struct Uploader {
    store: Arc<dyn ImageStore>,
    url_prefix: String,
    max_bytes: u64,
    url_pattern: Regex,
}

impl Uploader {
    pub fn new(store: Arc<dyn ImageStore>, url_prefix: &str, max_bytes: u64) -> Self {
        let url_prefix = if url_prefix.ends_with('/') { url_prefix.to_string() } else { format!("{}/", url_prefix) };
        let url_pattern = Regex::new(&format!("{}([^/?#]+)", regex::escape(&url_prefix))).expect("escaped prefix");
        Uploader { store, url_prefix, max_bytes, url_pattern }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// The public URL of a stored file
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}{}", self.url_prefix, filename)
    }

    /// The stored file name inside one of our URLs
    pub fn filename_from_url(&self, url: &str) -> Option<String> {
        self.url_pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str().to_string())
            .filter(|name| is_safe_name(name))
    }

    pub fn check(&self, image: &IncomingImage) -> Result<(), UploadError> {
        validate_image(image.content_type.as_deref(), image.bytes.len() as u64, self.max_bytes)
    }

    ///
    /// Stores one image and returns its public URL
    ///
    /// # Log
    ///
    /// * `info` - the stored file name
    /// * `warn` - the rejection reason
    ///
    pub async fn upload(&self, image: IncomingImage) -> Result<String, UploadError> {
        if let Err(value) = self.check(&image) {
            warn!("{}", format!("Upload rejected: {}", value));
            return Err(value);
        }

        let filename = unique_filename(image.file_name.as_deref());
        let content_type = image.content_type.as_deref().unwrap_or("image/jpeg").to_ascii_lowercase();
        self.store.put(&filename, &content_type, &image.bytes).await?;
        info!("{}", format!("Server>>Client:\tStored upload {} ({} bytes)", filename, image.bytes.len()));
        Ok(self.public_url(&filename))
    }

    /// Stores several images, nothing is written unless every one passes
    pub async fn upload_all(&self, images: Vec<IncomingImage>) -> Result<Vec<String>, UploadError> {
        if images.is_empty() {
            return Err(UploadError::Missing);
        }
        for image in &images {
            if let Err(value) = self.check(image) {
                warn!("{}", format!("Upload rejected: {}", value));
                return Err(value);
            }
        }

        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            urls.push(self.upload(image).await?);
        }
        Ok(urls)
    }

    /// The bytes of a stored file
    pub async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError> {
        if !is_safe_name(filename) {
            return Ok(None);
        }
        self.store.fetch(filename).await
    }

    /// Removes the file behind one of our URLs, `false` if there was none
    pub async fn delete_by_url(&self, url: &str) -> Result<bool, UploadError> {
        let filename = match self.filename_from_url(url) {
            None => return Ok(false),
            Some(value) => value,
        };
        let removed = self.store.remove(&filename).await?;
        if removed {
            info!("{}", format!("Server>>Client:\tDeleted upload {}", filename));
        }
        Ok(removed)
    }
}
