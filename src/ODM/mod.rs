//!
//! Documentation of the ODM module.
//! Contains the storage interface and its two backends: the seeded
//! in-memory store and the MongoDB document store.
//!

pub mod errors;
pub mod memory;
pub mod models;
pub mod odm;
pub mod odm_utils;
pub mod settings;
pub mod validation;
#[cfg(test)]
pub mod testutils;

use std::sync::Arc;

use super::config::config::{Backend, ConfyConfig};
use errors::StoreResult;
use models::*;

///
/// The data-access capability set shared by every backend
///
/// Lookups report absence as `None` (or `false` for deletes), never as an
/// error. Every call is immediately visible to the following ones.
///
#[rocket::async_trait]
pub trait Storage: Send + Sync {
    /// All cars, unfiltered
    async fn get_all_cars(&self) -> StoreResult<Vec<Car>>;

    async fn get_car(&self, id: &str) -> StoreResult<Option<Car>>;

    async fn get_car_by_slug(&self, slug: &str) -> StoreResult<Option<Car>>;

    /// Assigns the ID and slug, returns the stored car. A slug already held
    /// by another car is refused with `StoreError::SlugTaken`.
    async fn create_car(&self, car: InsertCar) -> StoreResult<Car>;

    /// Replaces every editable field and regenerates the slug, which must stay unique
    async fn update_car(&self, id: &str, car: InsertCar) -> StoreResult<Option<Car>>;

    /// Whether a car was removed
    async fn delete_car(&self, id: &str) -> StoreResult<bool>;

    /// All bookings, newest first
    async fn get_all_bookings(&self) -> StoreResult<Vec<Booking>>;

    /// The bookings of one car, earliest start first
    async fn get_bookings_for_car(&self, car_id: &str) -> StoreResult<Vec<Booking>>;

    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>>;

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking>;

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<Option<Booking>>;

    /// The raw settings singleton, `None` when it was never saved
    async fn load_settings(&self) -> StoreResult<Option<StoredSettings>>;

    /// Merges the set fields onto the singleton, creating it if needed
    async fn merge_settings(&self, settings: StoredSettings) -> StoreResult<()>;
}

///
/// Opens the configured backend
///
/// # Log
///
/// * `info` - the chosen backend
///
pub async fn connect(config: &ConfyConfig) -> mongodb::error::Result<Arc<dyn Storage>> {
    match config.backend {
        Backend::Memory => {
            log::info!("Serving from the in-memory store (seeded: {})", config.seed_sample_cars);
            let store = if config.seed_sample_cars { memory::MemoryStore::seeded() } else { memory::MemoryStore::new() };
            Ok(Arc::new(store))
        }
        Backend::Mongodb => {
            let db = odm::init(config).await?;
            let store = odm::MongoStore::new(db);
            store.ensure_indexes().await?;
            log::info!("Serving from MongoDB database {}", config.database);
            Ok(Arc::new(store))
        }
    }
}
