//!
//! Documentation of the memory module.
//! The reference store used for local serving, seeded with sample cars.
//!

use rocket::tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::models::*;
use super::Storage;

/// Keeps every record in insertion order, lookups are linear scans
#[derive(Default)]
pub struct MemoryStore {
    cars: RwLock<Vec<Car>>,
    bookings: RwLock<Vec<Booking>>,
    settings: RwLock<Option<StoredSettings>>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample fleet
    pub fn seeded() -> Self {
        let cars = sample_cars().into_iter().map(Car::create).collect();
        MemoryStore { cars: RwLock::new(cars), ..Self::default() }
    }
}

/// Slugs are unique across the fleet
fn claim_slug(cars: &[Car], car: &Car) -> StoreResult<()> {
    if cars.iter().any(|other| other.slug == car.slug && other.id != car.id) {
        return Err(StoreError::SlugTaken(car.slug.clone()));
    }
    Ok(())
}

#[rocket::async_trait]
impl Storage for MemoryStore {
    async fn get_all_cars(&self) -> StoreResult<Vec<Car>> {
        Ok(self.cars.read().await.clone())
    }

    async fn get_car(&self, id: &str) -> StoreResult<Option<Car>> {
        Ok(self.cars.read().await.iter().find(|car| car.id == id).cloned())
    }

    async fn get_car_by_slug(&self, slug: &str) -> StoreResult<Option<Car>> {
        Ok(self.cars.read().await.iter().find(|car| car.slug == slug).cloned())
    }

    async fn create_car(&self, car: InsertCar) -> StoreResult<Car> {
        let car = Car::create(car);
        let mut cars = self.cars.write().await;
        claim_slug(&cars, &car)?;
        cars.push(car.clone());
        Ok(car)
    }

    async fn update_car(&self, id: &str, car: InsertCar) -> StoreResult<Option<Car>> {
        let car = car.into_car(id.to_string());
        let mut cars = self.cars.write().await;
        let index = match cars.iter().position(|existing| existing.id == id) {
            None => return Ok(None),
            Some(value) => value,
        };
        claim_slug(&cars, &car)?;
        cars[index] = car.clone();
        Ok(Some(car))
    }

    async fn delete_car(&self, id: &str) -> StoreResult<bool> {
        let mut cars = self.cars.write().await;
        let before = cars.len();
        cars.retain(|car| car.id != id);
        Ok(cars.len() != before)
    }

    async fn get_all_bookings(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings = self.bookings.read().await.clone();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn get_bookings_for_car(&self, car_id: &str) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> =
            self.bookings.read().await.iter().filter(|booking| booking.car_id == car_id).cloned().collect();
        bookings.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(bookings)
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|booking| booking.id == id).cloned())
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.iter_mut().find(|booking| booking.id == id).map(|booking| {
            booking.status = status;
            booking.clone()
        }))
    }

    async fn load_settings(&self) -> StoreResult<Option<StoredSettings>> {
        Ok(self.settings.read().await.clone())
    }

    async fn merge_settings(&self, settings: StoredSettings) -> StoreResult<()> {
        self.settings.write().await.get_or_insert_with(StoredSettings::default).merge(settings);
        Ok(())
    }
}

/// The six cars the demo site starts with
fn sample_cars() -> Vec<InsertCar> {
    vec![
        InsertCar {
            name: "Tesla Model 3".into(),
            category: Category::Electric,
            description: "Experience the future of driving with the Tesla Model 3. This premium electric sedan combines cutting-edge technology, impressive range, and exhilarating performance in a sleek, modern package.".into(),
            image: "/attached_assets/generated_images/Tesla_Model_3_sedan_123f6843.png".into(),
            images: vec![],
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
            has_usb: true,
            available: true,
        },
        InsertCar {
            name: "BMW X5".into(),
            category: Category::Suv,
            description: "The BMW X5 delivers luxury and versatility in perfect harmony. This premium SUV offers spacious seating, advanced technology, and powerful performance for both city driving and weekend adventures.".into(),
            image: "/attached_assets/generated_images/BMW_X5_SUV_e9085a45.png".into(),
            images: vec![],
            price_per_day: 150,
            seats: 7,
            doors: 5,
            luggage: 4,
            year: 2023,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Petrol,
            has_gps: true,
            has_bluetooth: true,
            has_ac: true,
            has_usb: true,
            available: true,
        },
        InsertCar {
            name: "Toyota Camry".into(),
            category: Category::Sedan,
            description: "The Toyota Camry is the perfect blend of reliability, comfort, and efficiency. This midsize sedan offers a smooth ride, excellent fuel economy, and all the features you need for daily driving.".into(),
            image: "/attached_assets/generated_images/Toyota_Camry_sedan_a32cd876.png".into(),
            images: vec![],
            price_per_day: 80,
            seats: 5,
            doors: 4,
            luggage: 2,
            year: 2023,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Hybrid,
            has_gps: true,
            has_bluetooth: true,
            has_ac: true,
            has_usb: false,
            available: true,
        },
        InsertCar {
            name: "Mercedes-Benz S-Class".into(),
            category: Category::Luxury,
            description: "Step into ultimate luxury with the Mercedes-Benz S-Class. This flagship sedan redefines premium driving with its exquisite craftsmanship, cutting-edge technology, and unparalleled comfort.".into(),
            image: "/attached_assets/generated_images/Mercedes_S-Class_luxury_8b2e970a.png".into(),
            images: vec![],
            price_per_day: 250,
            seats: 5,
            doors: 4,
            luggage: 3,
            year: 2024,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Petrol,
            has_gps: true,
            has_bluetooth: true,
            has_ac: true,
            has_usb: true,
            available: false,
        },
        InsertCar {
            name: "Porsche 911".into(),
            category: Category::Sports,
            description: "Unleash your passion for driving with the iconic Porsche 911. This legendary sports car delivers breathtaking performance, precise handling, and timeless design that turns every drive into an unforgettable experience.".into(),
            image: "/attached_assets/generated_images/Porsche_911_sports_c1be3448.png".into(),
            images: vec![],
            price_per_day: 300,
            seats: 4,
            doors: 2,
            luggage: 1,
            year: 2024,
            transmission: Transmission::Manual,
            fuel_type: FuelType::Petrol,
            has_gps: true,
            has_bluetooth: true,
            has_ac: true,
            has_usb: true,
            available: true,
        },
        InsertCar {
            name: "Honda CR-V".into(),
            category: Category::Suv,
            description: "The Honda CR-V is your ideal companion for family adventures. This versatile compact SUV combines practicality, safety, and comfort with excellent fuel efficiency and spacious interior.".into(),
            image: "/attached_assets/generated_images/Honda_CR-V_compact_SUV_52dc1a4d.png".into(),
            images: vec![],
            price_per_day: 95,
            seats: 5,
            doors: 5,
            luggage: 3,
            year: 2023,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Petrol,
            has_gps: false,
            has_bluetooth: true,
            has_ac: true,
            has_usb: true,
            available: true,
        },
    ]
}
