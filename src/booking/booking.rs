//!
//! Documentation of the booking module.
//! Rental price computation, booking placement and status changes.
//!

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::ODM::errors::StoreError;
use crate::ODM::models::{Booking, BookingStatus, Car, InsertBooking};
use crate::ODM::validation::ValidationErrors;
use crate::ODM::Storage;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid booking data: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Car not found")]
    CarNotFound,

    #[error("{0} is not available for booking")]
    CarUnavailable(String),

    #[error("{0} is already booked between {1} and {2}")]
    DatesTaken(String, String, String),

    #[error("Booking not found")]
    BookingNotFound,

    #[error("A {from} booking cannot become {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Days and price for one date range
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub days: u32,
    pub price_per_day: u32,
    pub total_price: u64,
}

/// Reads `YYYY-MM-DD` as midnight, or a full RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(value).ok().map(|timestamp| timestamp.naive_utc())
}

///
/// Number of rental days between two dates
///
/// Partial days round up. An unreadable date, or an end that is not after
/// the start, gives zero.
///
pub fn rental_days(start: &str, end: &str) -> u32 {
    let (start, end) = match (parse_date(start), parse_date(end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return 0,
    };
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    u32::try_from((millis + DAY_MILLIS - 1) / DAY_MILLIS).unwrap_or(u32::MAX)
}

/// Prices a date range at `price_per_day`
pub fn quote(start: &str, end: &str, price_per_day: u32) -> Quote {
    let days = rental_days(start, end);
    Quote { days, price_per_day, total_price: u64::from(days) * u64::from(price_per_day) }
}

/// Whether two `[start, end)` ranges share any instant
fn overlaps(booking: &Booking, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    match (parse_date(&booking.start_date), parse_date(&booking.end_date)) {
        (Some(booked_start), Some(booked_end)) => booked_start < end && start < booked_end,
        _ => false,
    }
}

///
/// Places a booking request
///
/// The price is always computed here from the car's stored rate; the car
/// must exist, be available and be free over the whole range.
///
/// # Log
///
/// * `info` - the placed booking
/// * `warn` - rejected requests
///
pub async fn place_booking(store: &dyn Storage, insert: InsertBooking) -> Result<Booking, BookingError> {
    let car: Car = store.get_car(&insert.car_id).await?.ok_or(BookingError::CarNotFound)?;

    let days = rental_days(&insert.start_date, &insert.end_date);
    let (start, end) = match (parse_date(&insert.start_date), parse_date(&insert.end_date)) {
        (Some(start), Some(end)) if days > 0 => (start, end),
        _ => return Err(ValidationErrors::single("endDate", "End date must be after start date").into()),
    };

    if !car.available {
        warn!("{}", format!("Booking refused, {} is not available", car.name));
        return Err(BookingError::CarUnavailable(car.name));
    }

    let taken = store
        .get_bookings_for_car(&car.id)
        .await?
        .into_iter()
        .filter(|booking| booking.status != BookingStatus::Cancelled)
        .find(|booking| overlaps(booking, start, end));
    if let Some(booking) = taken {
        warn!("{}", format!("Booking refused, {} overlaps booking {}", car.name, booking.id));
        return Err(BookingError::DatesTaken(car.name, booking.start_date, booking.end_date));
    }

    let total_price = quote(&insert.start_date, &insert.end_date, car.price_per_day).total_price;
    let booking = store.insert_booking(Booking::create(insert, &car, total_price)).await?;
    info!("{}", format!("Server>>Client:\tBooking {} placed for {} ({} days, {})", booking.id, car.name, days, total_price));
    Ok(booking)
}

/// Moves a pending booking to `confirmed` or `cancelled`
pub async fn change_status(store: &dyn Storage, id: &str, next: BookingStatus) -> Result<Booking, BookingError> {
    let booking = store.get_booking(id).await?.ok_or(BookingError::BookingNotFound)?;
    if !booking.status.can_become(next) {
        return Err(BookingError::InvalidTransition { from: booking.status, to: next });
    }

    let booking = store.update_booking_status(id, next).await?.ok_or(BookingError::BookingNotFound)?;
    info!("{}", format!("Server>>Client:\tBooking {} is now {}", booking.id, booking.status));
    Ok(booking)
}
