//!
//! Documentation of the odm module.
//! Used to connect to the car rental MongoDB database.
//!

use std::time::Duration;

use futures::stream::TryStreamExt;
use log::{error, info};
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use super::errors::{StoreError, StoreResult};
use super::models::*;
use super::odm_utils::*;
use super::Storage;
use crate::config::config::ConfyConfig;

/// Collection names
pub const CARS: &str = "cars";
pub const BOOKINGS: &str = "bookings";
pub const WEBSITE_SETTINGS: &str = "website_settings";

///
/// Initiate DB connection
///
///
/// # Arguments
///
/// * `config` - A config object containing 'database' and 'database_ip'
///
///
/// # Log
///
/// * `info` - "Database Connected!", indicating success
/// * `error` - "Could not connect to MongoDB {error}", indicating error
///
pub async fn init(config: &ConfyConfig) -> mongodb::error::Result<Database> {
    connect(config).await
}

/// basic connection, isn't available out of the "odm.rs" module
async fn connect(config: &ConfyConfig) -> mongodb::error::Result<Database> {
    let mut client_options = ClientOptions::parse(&config.database_ip).await?;
    client_options.connect_timeout = Some(Duration::from_secs(config.timeout));
    client_options.heartbeat_freq = Some(Duration::from_secs(config.timeout));
    client_options.server_selection_timeout = Some(Duration::from_secs(config.timeout));
    let client = Client::with_options(client_options)?;

    match client.list_database_names(None, None).await {
        Ok(_) => info!("Database Connected!"),
        Err(value) => {
            error!("{}", format!("Could not connect to MongoDB {}", value));
            return Err(value);
        }
    }

    Ok(client.database(&config.database))
}

/// The unique index backing slug lookups
pub fn slug_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "slug": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// E11000, a unique index refused the write
fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(error.kind.as_ref(), ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == 11000)
}

/// Reports a slug clash as such, other failures as database errors
fn slug_write_error(slug: &str) -> impl FnOnce(mongodb::error::Error) -> StoreError + '_ {
    move |error| {
        if is_duplicate_key(&error) {
            return StoreError::SlugTaken(slug.to_string());
        }
        StoreError::Database(error)
    }
}

/// The document store backend
///
/// Records are stored whole, denormalised, and looked up by their own `id`
/// field; MongoDB's `_id` is never exposed.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        MongoStore { db }
    }

    ///
    /// Creates the indexes the store relies on, safe to run on every start
    ///
    /// # Log
    ///
    /// * `error` - "Could not create the slug index {error}", e.g. when duplicate slugs are already stored
    ///
    pub async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        if let Err(value) = self.cars().create_index(slug_index(), None).await {
            error!("{}", format!("Could not create the slug index {}", value));
            return Err(value);
        }
        Ok(())
    }

    /// A slug held by a car other than `id`
    async fn slug_taken(&self, car: &Car) -> StoreResult<bool> {
        let clash = self.cars().find_one(doc! { "slug": car.slug.as_str(), "id": { "$ne": car.id.as_str() } }, None).await?;
        Ok(clash.is_some())
    }

    fn cars(&self) -> Collection<Car> {
        self.db.collection::<Car>(CARS)
    }

    fn bookings(&self) -> Collection<BookingDocument> {
        self.db.collection::<BookingDocument>(BOOKINGS)
    }

    fn settings(&self) -> Collection<StoredSettings> {
        self.db.collection::<StoredSettings>(WEBSITE_SETTINGS)
    }

    /// Drains a find on `bookings` with the given filter and sort
    async fn find_bookings(&self, filter: Option<Document>, sort: Document) -> StoreResult<Vec<Booking>> {
        let find_options = FindOptions::builder().sort(sort).build();
        let cursor = self.bookings().find(filter, find_options).await?;
        let documents: Vec<BookingDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Booking::from).collect())
    }
}

#[rocket::async_trait]
impl Storage for MongoStore {
    ///
    /// Get all cars
    ///
    /// # Output
    ///
    /// * Err(_) - indicates DB error
    /// * Ok(vec) - all cars
    ///
    async fn get_all_cars(&self) -> StoreResult<Vec<Car>> {
        let cursor = self.cars().find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    ///
    /// Get car by id
    ///
    /// # Output
    ///
    /// * Err(_) - indicates DB error
    /// * Ok(None) - car has not been found
    /// * Ok(Some(value)) - car has been found
    ///
    async fn get_car(&self, id: &str) -> StoreResult<Option<Car>> {
        Ok(self.cars().find_one(by_id(id), None).await?)
    }

    async fn get_car_by_slug(&self, slug: &str) -> StoreResult<Option<Car>> {
        Ok(self.cars().find_one(doc! { "slug": slug }, None).await?)
    }

    /// Creates and inserts a new car, its slug must be free
    async fn create_car(&self, car: InsertCar) -> StoreResult<Car> {
        let car = Car::create(car);
        if self.slug_taken(&car).await? {
            return Err(StoreError::SlugTaken(car.slug));
        }
        self.cars().insert_one(&car, None).await.map_err(slug_write_error(&car.slug))?;
        Ok(car)
    }

    ///
    /// Replaces a car's fields, keeping its ID
    ///
    /// # Output
    ///
    /// * Ok(None) - no car has this ID, nothing is written
    /// * Err(SlugTaken) - another car already has the new slug
    ///
    async fn update_car(&self, id: &str, car: InsertCar) -> StoreResult<Option<Car>> {
        let car = car.into_car(id.to_string());
        if self.slug_taken(&car).await? {
            return Err(StoreError::SlugTaken(car.slug));
        }
        let result = self.cars().replace_one(by_id(id), &car, None).await.map_err(slug_write_error(&car.slug))?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(car))
    }

    async fn delete_car(&self, id: &str) -> StoreResult<bool> {
        let result = self.cars().delete_one(by_id(id), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn get_all_bookings(&self) -> StoreResult<Vec<Booking>> {
        self.find_bookings(None, doc! { "createdAt": -1 }).await
    }

    async fn get_bookings_for_car(&self, car_id: &str) -> StoreResult<Vec<Booking>> {
        self.find_bookings(Some(doc! { "carId": car_id }), doc! { "startDate": 1 }).await
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(self.bookings().find_one(by_id(id), None).await?.map(Booking::from))
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        self.bookings().insert_one(BookingDocument::from(booking.clone()), None).await?;
        Ok(booking)
    }

    /// Sets the status field only
    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<Option<Booking>> {
        let find_one_and_update_options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let booking = self
            .bookings()
            .find_one_and_update(by_id(id), doc! { "$set": { "status": status.as_str() } }, find_one_and_update_options)
            .await?;
        Ok(booking.map(Booking::from))
    }

    async fn load_settings(&self) -> StoreResult<Option<StoredSettings>> {
        Ok(self.settings().find_one(doc! { "_id": SETTINGS_ID }, None).await?)
    }

    /// `$set` with upsert, fields left out keep their stored value
    async fn merge_settings(&self, settings: StoredSettings) -> StoreResult<()> {
        let update_options = UpdateOptions::builder().upsert(true).build();
        self.settings()
            .update_one(doc! { "_id": SETTINGS_ID }, settings_update(&settings)?, update_options)
            .await?;
        Ok(())
    }
}
