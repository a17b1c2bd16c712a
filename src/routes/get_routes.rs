use super::*;
use rocket::http::ContentType;
use rocket::response::content::RawHtml;
use serde_json::Value;
use std::path::Path;

use booking::booking::{quote, Quote};
use catalog::catalog::CatalogQuery;
use html_format::html_format::{BookingPanel, Pages};
use ODM::models::*;
use ODM::settings::get_settings;

///
/// All cars
///
/// # Output
///
/// * 200 `[Car]`
///
#[get("/api/cars")]
async fn get_cars(state: &State<StoreState>) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = state.store.get_all_cars().await.map_err(internal("Failed to fetch cars"))?;
    Ok(Json(cars))
}

#[get("/api/cars/<id>")]
async fn get_car(id: &str, state: &State<StoreState>) -> Result<Json<Car>, ApiError> {
    match state.store.get_car(id).await.map_err(internal("Failed to fetch car"))? {
        None => Err(ApiError::NotFound("Car not found".to_string())),
        Some(car) => Ok(Json(car)),
    }
}

// Ranked ahead of the `/api/cars/<id>/...` routes, so slugs like "quote" resolve here
#[get("/api/cars/slug/<slug>", rank = 1)]
async fn get_car_by_slug(slug: &str, state: &State<StoreState>) -> Result<Json<Car>, ApiError> {
    match state.store.get_car_by_slug(slug).await.map_err(internal("Failed to fetch car"))? {
        None => Err(ApiError::NotFound("Car not found".to_string())),
        Some(car) => Ok(Json(car)),
    }
}

/// A car's bookings, earliest start first
#[get("/api/cars/<id>/bookings", rank = 2)]
async fn get_car_bookings(id: &str, state: &State<StoreState>) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = state.store.get_bookings_for_car(id).await.map_err(internal("Failed to fetch bookings"))?;
    Ok(Json(bookings))
}

///
/// Price preview for a date range
///
/// # Output
///
/// * 200 `{days, pricePerDay, totalPrice}`, zero days when the range is empty or unreadable
/// * 404 when the car does not exist
///
#[get("/api/cars/<id>/quote?<start>&<end>", rank = 2)]
async fn get_car_quote(id: &str, start: Option<&str>, end: Option<&str>, state: &State<StoreState>) -> Result<Json<Quote>, ApiError> {
    let car = match state.store.get_car(id).await.map_err(internal("Failed to fetch car"))? {
        None => return Err(ApiError::NotFound("Car not found".to_string())),
        Some(value) => value,
    };
    Ok(Json(quote(start.unwrap_or_default(), end.unwrap_or_default(), car.price_per_day)))
}

/// All bookings, newest first
#[get("/api/bookings")]
async fn get_bookings(state: &State<StoreState>) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = state.store.get_all_bookings().await.map_err(internal("Failed to fetch bookings"))?;
    Ok(Json(bookings))
}

/// Never fails, the defaults stand in for anything missing
#[get("/api/settings")]
async fn get_website_settings(state: &State<StoreState>) -> Json<WebsiteSettings> {
    Json(get_settings(state.store.as_ref()).await)
}

/*
Pages
*/

async fn catalog_page(query: CatalogQuery, state: &State<StoreState>, pages: &State<Pages>) -> Result<RawHtml<String>, ApiError> {
    let cars = state.store.get_all_cars().await.map_err(internal("Failed to fetch cars"))?;
    let settings = get_settings(state.store.as_ref()).await;
    let html = pages.catalog(&settings, &cars, &query).map_err(internal("Failed to render the catalog"))?;
    Ok(RawHtml(html))
}

#[get("/?<query..>")]
async fn index(query: CatalogQuery, state: &State<StoreState>, pages: &State<Pages>) -> Result<RawHtml<String>, ApiError> {
    catalog_page(query, state, pages).await
}

///
/// The fleet, filtered by the search box and selects
///
/// # Arguments
///
/// * `query` - `search`, `category` and `transmission`, "all" or empty means any
///
#[get("/cars?<query..>")]
async fn cars_page(query: CatalogQuery, state: &State<StoreState>, pages: &State<Pages>) -> Result<RawHtml<String>, ApiError> {
    catalog_page(query, state, pages).await
}

/// A car's page, with a price quote when both dates are given
#[get("/cars/<slug>?<start>&<end>")]
async fn car_page(
    slug: &str,
    start: Option<String>,
    end: Option<String>,
    state: &State<StoreState>,
    pages: &State<Pages>,
) -> Result<Option<RawHtml<String>>, ApiError> {
    let car = match state.store.get_car_by_slug(slug).await.map_err(internal("Failed to fetch car"))? {
        None => return Ok(None),
        Some(value) => value,
    };

    let mut panel = BookingPanel::default();
    if let (Some(start), Some(end)) = (&start, &end) {
        panel.quote = Some(quote(start, end, car.price_per_day));
        panel.form.insert("startDate".to_string(), Value::String(start.clone()));
        panel.form.insert("endDate".to_string(), Value::String(end.clone()));
    }

    let settings = get_settings(state.store.as_ref()).await;
    let html = pages.car(&settings, &car, &panel).map_err(internal("Failed to render the car page"))?;
    Ok(Some(RawHtml(html)))
}

/*
Uploaded files, mounted under the configured URL prefix
*/

/// The type a stored file is served as, from its extension
pub fn served_type(filename: &str) -> ContentType {
    Path::new(filename)
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Binary)
}

#[get("/<filename>")]
async fn get_upload(filename: &str, uploads: &State<UploadState>) -> Result<Option<(ContentType, Vec<u8>)>, ApiError> {
    let bytes = match uploads.uploader.fetch(filename).await? {
        None => return Ok(None),
        Some(value) => value,
    };
    Ok(Some((served_type(filename), bytes)))
}

pub fn get_routes() -> Vec<Route> {
    routes![
        get_cars,
        get_car,
        get_car_by_slug,
        get_car_bookings,
        get_car_quote,
        get_bookings,
        get_website_settings,
        index,
        cars_page,
        car_page,
    ]
}

pub fn upload_file_routes() -> Vec<Route> {
    routes![get_upload]
}
