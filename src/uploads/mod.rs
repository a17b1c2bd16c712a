//!
//! Documentation of the uploads module.
//! Image uploads for car listings and site branding.
//!

pub mod image_store;
pub mod uploads;

use std::sync::Arc;

use super::config::config::{ConfyConfig, ImageStorage};
use super::ODM;
use image_store::{DiskImageStore, ImageStore, MongoImageStore};
use uploads::Uploader;

/// Opens the configured image store and wraps it in an `Uploader`
pub async fn connect(config: &ConfyConfig) -> anyhow::Result<Uploader> {
    let store: Arc<dyn ImageStore> = match config.image_storage {
        ImageStorage::Disk => Arc::new(DiskImageStore::open(&config.upload_dir)?),
        ImageStorage::Database => {
            let db = ODM::odm::init(config).await?;
            Arc::new(MongoImageStore::new(&db))
        }
    };
    Ok(Uploader::new(store, &config.upload_url_prefix, config.max_upload_bytes))
}
