use super::*;
use log::{error, warn};
use std::fmt::Display;
use std::sync::Arc;

use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket_multipart_form_data::{MultipartFormData, MultipartFormDataError};
use serde_json::{json, Value};
use thiserror::Error;

use booking::booking::BookingError;
use uploads::uploads::{IncomingImage, UploadError, Uploader};
use ODM::errors::StoreError;
use ODM::validation::ValidationErrors;
use ODM::Storage;

/// Headroom over the per-file ceiling so oversized files reach our own check
pub const MULTIPART_HEADROOM: u64 = 4;

/// Errors turned into `{ "error": ..., "details"?: [...] }` responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid {what} data")]
    Validation { what: &'static str, errors: ValidationErrors },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Unsupported(_) => Status::UnsupportedMediaType,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation { errors, .. } => json!({ "error": self.to_string(), "details": errors }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

///
/// Wraps a backend failure with the message the client sees
///
/// # Log
///
/// * `error` - context and the underlying failure
///
pub fn internal<E: Display>(context: &'static str) -> impl FnOnce(E) -> ApiError {
    move |cause| {
        error!("{}", format!("{}: {}", context, cause));
        ApiError::Internal(context.to_string())
    }
}

/// Like `internal`, but a slug held by another car is the client's conflict
pub fn car_write_error(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |cause| match cause {
        StoreError::SlugTaken(_) => ApiError::Conflict(cause.to_string()),
        cause => internal(context)(cause),
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        if !matches!(self, ApiError::Internal(_)) {
            warn!("{}", format!("Server>>Client:\t{} {} rejected: {}", request.method(), request.uri(), self));
        }
        (self.status(), Json(self.body())).respond_to(request)
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::Validation(errors) => ApiError::Validation { what: "booking", errors },
            BookingError::CarNotFound | BookingError::BookingNotFound => ApiError::NotFound(value.to_string()),
            BookingError::CarUnavailable(_) | BookingError::DatesTaken(..) | BookingError::InvalidTransition { .. } => {
                ApiError::Conflict(value.to_string())
            }
            BookingError::Store(cause) => internal("Failed to save booking")(cause),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(value: UploadError) -> Self {
        match value {
            UploadError::UnsupportedType(_) => ApiError::Unsupported(value.to_string()),
            UploadError::TooLarge { .. } | UploadError::Empty | UploadError::Missing => {
                ApiError::BadRequest(value.to_string())
            }
            UploadError::Io(_) | UploadError::Database(_) => internal("Failed to store upload")(value),
        }
    }
}

/// Malformed JSON bodies become a 400 instead of Rocket's default
pub fn json_body(body: Result<Json<Value>, JsonError<'_>>) -> Result<Value, ApiError> {
    match body {
        Ok(value) => Ok(value.into_inner()),
        Err(e) => Err(ApiError::BadRequest(format!("Malformed JSON body: {}", e))),
    }
}

/// Multipart read failures other than our own validation
pub fn multipart_error(e: MultipartFormDataError) -> ApiError {
    warn!("{}", format!("Multipart form could not be read: {:?}", e));
    ApiError::BadRequest("Could not read the uploaded form".to_string())
}

/// Every file sent under `field`
pub fn images_of(form: &MultipartFormData, field: &str) -> Vec<IncomingImage> {
    form.raw
        .get(field)
        .map(|files| {
            files
                .iter()
                .map(|file| IncomingImage {
                    file_name: file.file_name.clone(),
                    content_type: file.content_type.as_ref().map(|mime| mime.essence_str().to_string()),
                    bytes: file.raw.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The first text sent under `field`
pub fn text_of(form: &MultipartFormData, field: &str) -> Option<String> {
    form.texts.get(field).and_then(|texts| texts.first()).map(|text| text.text.clone())
}

// Utils struct for rocket::manage
pub struct StoreState {
    pub store: Arc<dyn Storage>,
}

pub struct UploadState {
    pub uploader: Uploader,
}
