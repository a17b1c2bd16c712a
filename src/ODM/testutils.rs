//!
//! Test fixtures shared by the storage, booking and route tests.
//!

use super::errors::{StoreError, StoreResult};
use super::memory::MemoryStore;
use super::models::*;
use super::Storage;

/// A valid car form, slug "tesla-model-3"
pub fn sample_insert() -> InsertCar {
    InsertCar {
        name: "Tesla Model 3!".into(),
        category: Category::Electric,
        description: "Electric sedan".into(),
        image: "/uploads/tesla.png".into(),
        images: vec!["/uploads/tesla-2.png".into()],
        price_per_day: 120,
        seats: 5,
        doors: 4,
        luggage: 2,
        year: 2024,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Electric,
        has_gps: true,
        has_bluetooth: true,
        has_ac: true,
        has_usb: false,
        available: true,
    }
}

/// A valid booking form for `car_id`
pub fn sample_booking(car_id: &str, start: &str, end: &str) -> InsertBooking {
    InsertBooking {
        car_id: car_id.into(),
        start_date: start.into(),
        end_date: end.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "+61 2 9999 0000".into(),
        address: None,
        notes: Some("Airport pickup".into()),
    }
}

/// The JSON body the admin form posts for `sample_insert`
pub fn sample_car_json() -> serde_json::Value {
    serde_json::json!({
        "name": "Tesla Model 3!",
        "category": "Electric",
        "description": "Electric sedan",
        "image": "/uploads/tesla.png",
        "images": ["/uploads/tesla-2.png"],
        "pricePerDay": 120,
        "seats": 5,
        "doors": 4,
        "luggage": 2,
        "year": 2024,
        "transmission": "Automatic",
        "fuelType": "Electric",
        "hasGPS": true,
        "hasBluetooth": true,
        "hasAC": true,
        "hasUSB": false,
        "available": true
    })
}

/// A memory store whose settings document cannot be read
pub struct UnreadableSettings(pub MemoryStore);

/// What a corrupt settings document decodes to
pub fn corrupt_settings() -> StoreError {
    let document = bson::doc! { "websiteName": 7 };
    StoreError::Decode(bson::from_document::<StoredSettings>(document).unwrap_err())
}

#[rocket::async_trait]
impl Storage for UnreadableSettings {
    async fn get_all_cars(&self) -> StoreResult<Vec<Car>> {
        self.0.get_all_cars().await
    }

    async fn get_car(&self, id: &str) -> StoreResult<Option<Car>> {
        self.0.get_car(id).await
    }

    async fn get_car_by_slug(&self, slug: &str) -> StoreResult<Option<Car>> {
        self.0.get_car_by_slug(slug).await
    }

    async fn create_car(&self, car: InsertCar) -> StoreResult<Car> {
        self.0.create_car(car).await
    }

    async fn update_car(&self, id: &str, car: InsertCar) -> StoreResult<Option<Car>> {
        self.0.update_car(id, car).await
    }

    async fn delete_car(&self, id: &str) -> StoreResult<bool> {
        self.0.delete_car(id).await
    }

    async fn get_all_bookings(&self) -> StoreResult<Vec<Booking>> {
        self.0.get_all_bookings().await
    }

    async fn get_bookings_for_car(&self, car_id: &str) -> StoreResult<Vec<Booking>> {
        self.0.get_bookings_for_car(car_id).await
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        self.0.get_booking(id).await
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        self.0.insert_booking(booking).await
    }

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<Option<Booking>> {
        self.0.update_booking_status(id, status).await
    }

    async fn load_settings(&self) -> StoreResult<Option<StoredSettings>> {
        Err(corrupt_settings())
    }

    async fn merge_settings(&self, settings: StoredSettings) -> StoreResult<()> {
        self.0.merge_settings(settings).await
    }
}
