use super::*;
use log::info;
use std::collections::HashMap;

use rocket::data::Data;
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::response::content::RawHtml;
use rocket::response::status;
use rocket_multipart_form_data::{MultipartFormData, MultipartFormDataField, MultipartFormDataOptions, Repetition};
use serde_json::{json, Map, Value};

use booking::booking::{change_status, place_booking, quote, BookingError};
use html_format::html_format::{BookingPanel, Pages};
use uploads::uploads::Uploader;
use ODM::models::*;
use ODM::settings::{get_settings, save_settings};
use ODM::validation::{status_from_json, FromJson};

// Text fields of the settings form
const SETTINGS_FIELDS: [&str; 14] = [
    "websiteName",
    "logo",
    "favicon",
    "companyName",
    "email",
    "phone",
    "address",
    "description",
    "facebookUrl",
    "twitterUrl",
    "instagramUrl",
    "linkedinUrl",
    "metaDescription",
    "metaKeywords",
];

fn car_data(errors: ODM::validation::ValidationErrors) -> ApiError {
    ApiError::Validation { what: "car", errors }
}

/*
Cars
*/

///
/// Adds a car to the fleet
///
/// # Output
///
/// * 201 the stored car, with its ID and slug
/// * 400 `{error, details}` listing the rejected fields
/// * 409 another car already has this name's slug
///
/// # Log
///
/// * `info` - the new car's ID
///
#[post("/api/cars", data = "<body>")]
async fn post_car(body: Result<Json<Value>, JsonError<'_>>, state: &State<StoreState>) -> Result<status::Created<Json<Car>>, ApiError> {
    let insert = InsertCar::from_json(&json_body(body)?).map_err(car_data)?;
    let car = state.store.create_car(insert).await.map_err(car_write_error("Failed to create car"))?;
    info!("{}", format!("Server>>Client:\tCreated car {} ({})", car.id, car.name));
    Ok(status::Created::new(format!("/api/cars/{}", car.id)).body(Json(car)))
}

/// Replaces every editable field of a car, the slug follows the new name
#[patch("/api/cars/<id>", data = "<body>")]
async fn patch_car(id: &str, body: Result<Json<Value>, JsonError<'_>>, state: &State<StoreState>) -> Result<Json<Car>, ApiError> {
    let insert = InsertCar::from_json(&json_body(body)?).map_err(car_data)?;
    match state.store.update_car(id, insert).await.map_err(car_write_error("Failed to update car"))? {
        None => Err(ApiError::NotFound("Car not found".to_string())),
        Some(car) => {
            info!("{}", format!("Server>>Client:\tUpdated car {}", car.id));
            Ok(Json(car))
        }
    }
}

#[delete("/api/cars/<id>")]
async fn delete_car(id: &str, state: &State<StoreState>) -> Result<Status, ApiError> {
    if !state.store.delete_car(id).await.map_err(internal("Failed to delete car"))? {
        return Err(ApiError::NotFound("Car not found".to_string()));
    }
    info!("{}", format!("Server>>Client:\tDeleted car {}", id));
    Ok(Status::NoContent)
}

/*
Bookings
*/

///
/// Places a booking request
///
/// The price is computed here from the car's daily rate, a `totalPrice`
/// sent by the client is ignored.
///
/// # Output
///
/// * 201 the pending booking
/// * 400 invalid fields, 404 unknown car, 409 car unavailable or dates taken
///
#[post("/api/bookings", data = "<body>")]
async fn post_booking(body: Result<Json<Value>, JsonError<'_>>, state: &State<StoreState>) -> Result<status::Created<Json<Booking>>, ApiError> {
    let insert = InsertBooking::from_json(&json_body(body)?).map_err(BookingError::from)?;
    let booking = place_booking(state.store.as_ref(), insert).await?;
    Ok(status::Created::new(format!("/api/bookings/{}", booking.id)).body(Json(booking)))
}

#[patch("/api/bookings/<id>/status", data = "<body>")]
async fn patch_booking_status(id: &str, body: Result<Json<Value>, JsonError<'_>>, state: &State<StoreState>) -> Result<Json<Booking>, ApiError> {
    let next = status_from_json(&json_body(body)?).map_err(BookingError::from)?;
    Ok(Json(change_status(state.store.as_ref(), id, next).await?))
}

/*
Settings
*/

#[put("/api/settings", data = "<body>")]
async fn put_settings(body: Result<Json<Value>, JsonError<'_>>, state: &State<StoreState>) -> Result<Json<WebsiteSettings>, ApiError> {
    let settings = WebsiteSettings::from_json(&json_body(body)?)
        .map_err(|errors| ApiError::Validation { what: "settings", errors })?;
    let saved = save_settings(state.store.as_ref(), &settings).await.map_err(internal("Failed to update website settings"))?;
    info!("{}", format!("Server>>Client:\tWebsite settings updated"));
    Ok(Json(saved))
}

/// Uploads the file sent as `field`, keeping `current` when there is none or it fails
async fn upload_slot(uploader: &Uploader, form: &MultipartFormData, field: &str, current: String, warnings: &mut Vec<String>) -> String {
    let image = images_of(form, field).into_iter().find(|image| !image.bytes.is_empty());
    let image = match image {
        None => return current,
        Some(value) => value,
    };
    match uploader.upload(image).await {
        Ok(url) => url,
        Err(e) => {
            warnings.push(format!("{} upload failed: {}", field, e));
            current
        }
    }
}

///
/// The admin settings form, with optional logo and favicon files
///
/// Fields left out keep their current value. A failed image upload does
/// not stop the save, the previous image stays and a warning is returned.
///
/// # Output
///
/// * 200 `{settings, warnings}`
///
#[post("/api/settings/form", data = "<data>")]
async fn post_settings_form(
    content_type: &ContentType,
    data: Data<'_>,
    state: &State<StoreState>,
    uploads: &State<UploadState>,
) -> Result<Json<Value>, ApiError> {
    let limit = uploads.uploader.max_bytes() * MULTIPART_HEADROOM;
    let mut fields: Vec<MultipartFormDataField> = SETTINGS_FIELDS.iter().map(|name| MultipartFormDataField::text(*name)).collect();
    fields.push(MultipartFormDataField::raw("logo").size_limit(limit));
    fields.push(MultipartFormDataField::raw("favicon").size_limit(limit));
    let mut options = MultipartFormDataOptions::with_multipart_form_data_fields(fields);
    options.max_data_bytes = limit * 2 + 1024 * 1024;

    let form = MultipartFormData::parse(content_type, data, options).await.map_err(multipart_error)?;

    let current = get_settings(state.store.as_ref()).await;
    let mut submitted = match serde_json::to_value(&current) {
        Ok(Value::Object(value)) => value,
        _ => Map::new(),
    };
    for name in SETTINGS_FIELDS {
        if let Some(text) = text_of(&form, name) {
            submitted.insert(name.to_string(), Value::String(text));
        }
    }

    let mut settings = WebsiteSettings::from_json(&Value::Object(submitted))
        .map_err(|errors| ApiError::Validation { what: "settings", errors })?;

    let mut warnings = Vec::new();
    settings.logo = upload_slot(&uploads.uploader, &form, "logo", settings.logo, &mut warnings).await;
    settings.favicon = upload_slot(&uploads.uploader, &form, "favicon", settings.favicon, &mut warnings).await;

    let saved = save_settings(state.store.as_ref(), &settings).await.map_err(internal("Failed to update website settings"))?;
    info!("{}", format!("Server>>Client:\tWebsite settings updated from the form, {} warnings", warnings.len()));
    Ok(Json(json!({ "settings": saved, "warnings": warnings })))
}

/*
Uploads
*/

///
/// Stores one or more images sent as `image`
///
/// Every file is checked first, nothing is stored unless all of them pass.
///
/// # Output
///
/// * 201 `{url, urls}`, `url` being the first one
///
#[post("/api/uploads", data = "<data>")]
async fn post_upload(content_type: &ContentType, data: Data<'_>, uploads: &State<UploadState>) -> Result<status::Created<Json<Value>>, ApiError> {
    let limit = uploads.uploader.max_bytes() * MULTIPART_HEADROOM;
    let mut options = MultipartFormDataOptions::with_multipart_form_data_fields(vec![
        MultipartFormDataField::raw("image").size_limit(limit).repetition(Repetition::infinite()),
    ]);
    options.max_data_bytes = limit * 2 + 1024 * 1024;

    let form = MultipartFormData::parse(content_type, data, options).await.map_err(multipart_error)?;
    let urls = uploads.uploader.upload_all(images_of(&form, "image")).await?;
    let first = urls.first().cloned().unwrap_or_default();
    Ok(status::Created::new(first.clone()).body(Json(json!({ "url": first, "urls": urls }))))
}

#[delete("/api/uploads?<url>")]
async fn delete_upload(url: &str, uploads: &State<UploadState>) -> Result<Status, ApiError> {
    if !uploads.uploader.delete_by_url(url).await? {
        return Err(ApiError::NotFound("File not found".to_string()));
    }
    Ok(Status::NoContent)
}

/*
Pages
*/

///
/// The booking form of a car's page
///
/// # Output
///
/// * the confirmation page
/// * the car page again with the messages, as 400/409
///
#[post("/cars/<slug>/book", data = "<form>")]
async fn book_car(
    slug: &str,
    form: Form<HashMap<String, String>>,
    state: &State<StoreState>,
    pages: &State<Pages>,
) -> Result<Option<(Status, RawHtml<String>)>, ApiError> {
    let car = match state.store.get_car_by_slug(slug).await.map_err(internal("Failed to fetch car"))? {
        None => return Ok(None),
        Some(value) => value,
    };

    let mut fields: Map<String, Value> = form.into_inner().into_iter().map(|(key, value)| (key, Value::String(value))).collect();
    fields.insert("carId".to_string(), Value::String(car.id.clone()));

    let placed = match InsertBooking::from_json(&Value::Object(fields.clone())) {
        Err(errors) => Err(BookingError::Validation(errors)),
        Ok(insert) => place_booking(state.store.as_ref(), insert).await,
    };
    let settings = get_settings(state.store.as_ref()).await;

    let rejection = match placed {
        Ok(booking) => {
            let html = pages.confirmation(&settings, &booking).map_err(internal("Failed to render the confirmation"))?;
            return Ok(Some((Status::Ok, RawHtml(html))));
        }
        Err(e) => ApiError::from(e),
    };

    if let ApiError::Internal(_) = rejection {
        return Err(rejection);
    }

    let mut panel = BookingPanel::default();
    match &rejection {
        ApiError::Validation { errors, .. } => panel.errors = errors.0.clone(),
        _ => panel.problem = Some(rejection.to_string()),
    }
    if let (Some(Value::String(start)), Some(Value::String(end))) = (fields.get("startDate"), fields.get("endDate")) {
        let preview = quote(start, end, car.price_per_day);
        if preview.days > 0 {
            panel.quote = Some(preview);
        }
    }
    panel.form = fields;

    let html = pages.car(&settings, &car, &panel).map_err(internal("Failed to render the car page"))?;
    Ok(Some((rejection.status(), RawHtml(html))))
}

pub fn post_routes() -> Vec<Route> {
    routes![
        post_car,
        patch_car,
        delete_car,
        post_booking,
        patch_booking_status,
        put_settings,
        post_settings_form,
        post_upload,
        delete_upload,
        book_car,
    ]
}
