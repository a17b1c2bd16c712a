//!
//! Documentation of the Models module.
//! Contains all the records stored by the car rental service.
//!

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::odm_utils::{blank_as_none, generate_slug, null_as_empty, trimmed};
use super::validation::{car_name, not_blank, rental_date};

/// A closed set of values offered by the admin forms, unknown values fail to decode
pub trait Choice: Sized + Copy + 'static {
    /// The wire name of the value
    fn as_str(&self) -> &'static str;
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Sports,
    Luxury,
    Electric,
    Compact,
}

impl Choice for Category {
    fn as_str(&self) -> &'static str {
        match self {
            Category::Sedan => "Sedan",
            Category::Suv => "SUV",
            Category::Sports => "Sports",
            Category::Luxury => "Luxury",
            Category::Electric => "Electric",
            Category::Compact => "Compact",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Choice for Transmission {
    fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl Choice for FuelType {
    fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/*
Cars
*/

/// The client-editable part of a car, as accepted by create and update
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertCar {
    #[validate(custom = "car_name")]
    pub name: String,
    pub category: Category,
    pub description: String,
    /// The primary image URL
    pub image: String,
    /// Additional image URLs, in display order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    pub price_per_day: u32,
    pub seats: u32,
    pub doors: u32,
    pub luggage: u32,
    pub year: u32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    #[serde(rename = "hasGPS", default)]
    pub has_gps: bool,
    #[serde(default)]
    pub has_bluetooth: bool,
    #[serde(rename = "hasAC", default = "yes")]
    pub has_ac: bool,
    #[serde(rename = "hasUSB", default)]
    pub has_usb: bool,
    #[serde(default = "yes")]
    pub available: bool,
}

fn yes() -> bool {
    true
}

impl InsertCar {
    /// Builds the stored car, the slug always comes from the name
    pub fn into_car(self, id: String) -> Car {
        Car {
            slug: generate_slug(&self.name),
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            image: self.image,
            images: self.images,
            price_per_day: self.price_per_day,
            seats: self.seats,
            doors: self.doors,
            luggage: self.luggage,
            year: self.year,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            has_gps: self.has_gps,
            has_bluetooth: self.has_bluetooth,
            has_ac: self.has_ac,
            has_usb: self.has_usb,
            available: self.available,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    /// The internal ID
    pub id: String,
    /// URL name derived from `name`
    pub slug: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    pub price_per_day: u32,
    pub seats: u32,
    pub doors: u32,
    pub luggage: u32,
    pub year: u32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    #[serde(rename = "hasGPS")]
    pub has_gps: bool,
    pub has_bluetooth: bool,
    #[serde(rename = "hasAC")]
    pub has_ac: bool,
    #[serde(rename = "hasUSB")]
    pub has_usb: bool,
    pub available: bool,
}

impl Car {
    /// A brand new car with a fresh ID
    pub fn create(insert: InsertCar) -> Car {
        insert.into_car(uuid::Uuid::new_v4().to_string())
    }

    /// The primary image followed by the additional ones
    pub fn gallery(&self) -> Vec<&str> {
        let mut gallery = vec![self.image.as_str()];
        gallery.extend(self.images.iter().map(String::as_str).filter(|url| *url != self.image));
        gallery
    }
}

/*
Bookings
*/

/// Booking status, `pending` until an admin decides
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl Choice for BookingStatus {
    fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl BookingStatus {
    /// Only a pending booking can be decided, and only once
    pub fn can_become(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed) | (BookingStatus::Pending, BookingStatus::Cancelled)
        )
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking request as submitted by the public form
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertBooking {
    #[validate(custom = "not_blank")]
    pub car_id: String,
    #[validate(custom = "rental_date")]
    pub start_date: String,
    #[validate(custom = "rental_date")]
    pub end_date: String,
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    /// Blank reads as left out
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// The internal ID
    pub id: String,
    pub car_id: String,
    /// Copy of the car's name at booking time
    pub car_name: String,
    pub start_date: String,
    pub end_date: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Price fixed at submission, never recomputed
    pub total_price: u64,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// A pending booking for `car`, created now
    pub fn create(insert: InsertBooking, car: &Car, total_price: u64) -> Booking {
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            car_id: insert.car_id,
            car_name: car.name.clone(),
            start_date: insert.start_date,
            end_date: insert.end_date,
            first_name: insert.first_name,
            last_name: insert.last_name,
            email: insert.email,
            phone: insert.phone,
            address: insert.address,
            notes: insert.notes,
            total_price,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A booking as written to MongoDB, `createdAt` is a BSON date so it sorts by time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDocument {
    pub id: String,
    pub car_id: String,
    pub car_name: String,
    pub start_date: String,
    pub end_date: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub total_price: u64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingDocument {
    fn from(booking: Booking) -> Self {
        BookingDocument {
            id: booking.id,
            car_id: booking.car_id,
            car_name: booking.car_name,
            start_date: booking.start_date,
            end_date: booking.end_date,
            first_name: booking.first_name,
            last_name: booking.last_name,
            email: booking.email,
            phone: booking.phone,
            address: booking.address,
            notes: booking.notes,
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

impl From<BookingDocument> for Booking {
    fn from(document: BookingDocument) -> Self {
        Booking {
            id: document.id,
            car_id: document.car_id,
            car_name: document.car_name,
            start_date: document.start_date,
            end_date: document.end_date,
            first_name: document.first_name,
            last_name: document.last_name,
            email: document.email,
            phone: document.phone,
            address: document.address,
            notes: document.notes,
            total_price: document.total_price,
            status: document.status,
            created_at: document.created_at,
        }
    }
}

/*
Website settings
*/

/// Site branding, contact details and SEO meta data
///
/// As form input, left out text fields read as empty like a cleared input.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSettings {
    #[serde(default)]
    pub website_name: String,
    /// URL or path to logo
    #[serde(default)]
    pub logo: String,
    /// URL or path to favicon
    #[serde(default)]
    pub favicon: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub facebook_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub twitter_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub instagram_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
}

/// The settings document as persisted, every field may be missing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
}

impl StoredSettings {
    /// Merge-on-write: every field set in `patch` replaces ours
    pub fn merge(&mut self, patch: StoredSettings) {
        fn take(target: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *target = value;
            }
        }
        take(&mut self.website_name, patch.website_name);
        take(&mut self.logo, patch.logo);
        take(&mut self.favicon, patch.favicon);
        take(&mut self.company_name, patch.company_name);
        take(&mut self.email, patch.email);
        take(&mut self.phone, patch.phone);
        take(&mut self.address, patch.address);
        take(&mut self.description, patch.description);
        take(&mut self.facebook_url, patch.facebook_url);
        take(&mut self.twitter_url, patch.twitter_url);
        take(&mut self.instagram_url, patch.instagram_url);
        take(&mut self.linkedin_url, patch.linkedin_url);
        take(&mut self.meta_description, patch.meta_description);
        take(&mut self.meta_keywords, patch.meta_keywords);
    }
}
