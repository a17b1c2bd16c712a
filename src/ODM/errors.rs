//!
//! Failures reported by the storage backends.
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Could not encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("Could not decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Another car already uses the slug \"{0}\"")]
    SlugTaken(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
