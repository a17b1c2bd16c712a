//!
//! Documentation of the image store module.
//! Where uploaded image bytes live: a local directory or the document store.
//!

use std::path::PathBuf;

use bson::spec::BinarySubtype;
use bson::{doc, Binary, Document};
use chrono::Utc;
use mongodb::{Collection, Database};
use rocket::tokio::fs;

use super::uploads::UploadError;

/// Collection holding uploaded images in the document store
pub const UPLOADS: &str = "uploads";

/// Storage for uploaded images, addressed by their generated file name
#[rocket::async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<(), UploadError>;

    /// The stored bytes, `None` for unknown names
    async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError>;

    /// Whether a file was removed, a missing file is not an error
    async fn remove(&self, filename: &str) -> Result<bool, UploadError>;
}

/// Generated names only, nothing that could leave the upload directory
pub fn is_safe_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && filename.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Images as plain files in one directory
pub struct DiskImageStore {
    dir: PathBuf,
}

impl DiskImageStore {
    /// Creates the directory when missing
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            log::info!("{}", format!("Created uploads directory: {}", dir.display()));
        }
        Ok(DiskImageStore { dir })
    }
}

#[rocket::async_trait]
impl ImageStore for DiskImageStore {
    async fn put(&self, filename: &str, _content_type: &str, bytes: &[u8]) -> Result<(), UploadError> {
        fs::write(self.dir.join(filename), bytes).await?;
        Ok(())
    }

    async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError> {
        if !is_safe_name(filename) {
            return Ok(None);
        }
        match fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, filename: &str) -> Result<bool, UploadError> {
        if !is_safe_name(filename) {
            return Ok(false);
        }
        match fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Images as binary documents in the `uploads` collection
pub struct MongoImageStore {
    collection: Collection<Document>,
}

impl MongoImageStore {
    pub fn new(db: &Database) -> Self {
        MongoImageStore { collection: db.collection::<Document>(UPLOADS) }
    }
}

#[rocket::async_trait]
impl ImageStore for MongoImageStore {
    async fn put(&self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<(), UploadError> {
        let document = doc! {
            "filename":    filename,
            "contentType": content_type,
            "data":        Binary { subtype: BinarySubtype::Generic, bytes: bytes.to_vec() },
            "uploadedAt":  Utc::now().to_rfc3339(),
        };
        self.collection.insert_one(document, None).await?;
        Ok(())
    }

    async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError> {
        let document = match self.collection.find_one(doc! { "filename": filename }, None).await? {
            None => return Ok(None),
            Some(value) => value,
        };
        Ok(document.get_binary_generic("data").ok().cloned())
    }

    async fn remove(&self, filename: &str) -> Result<bool, UploadError> {
        let result = self.collection.delete_one(doc! { "filename": filename }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
