//!
//! Documentation of the Validation module.
//! Shapes raw JSON input into insert records: serde decodes the shape,
//! the `validator` rules derived on each record check the content.
//!

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

use super::models::BookingStatus;
use super::odm_utils::generate_slug;
use crate::booking::booking::parse_date;

/// One rejected field, `path` is the wire name (`pricePerDay`)
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// A non-empty list of rejected fields
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(path: &str, message: impl Into<String>) -> Self {
        ValidationErrors(vec![FieldError { path: path.to_string(), message: message.into() }])
    }

    /// Whether `path` was rejected
    pub fn has(&self, path: &str) -> bool {
        self.0.iter().any(|error| error.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.0.iter().map(|error| format!("{}: {}", error.path, error.message)).collect();
        write!(f, "{}", fields.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// `first_name` to `firstName`, names already in camelCase are left as they are
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        match c {
            '_' => upper = true,
            c if upper => {
                name.extend(c.to_uppercase());
                upper = false;
            }
            c => name.push(c),
        }
    }
    name
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    path: wire_name(field),
                    message: match &error.message {
                        Some(message) => message.to_string(),
                        None => error.code.to_string(),
                    },
                })
            })
            .collect();
        fields.sort_by(|a, b| a.path.cmp(&b.path));
        ValidationErrors(fields)
    }
}

///
/// Turns a serde decode failure into a field error
///
/// serde stops at the first bad field and only names it when it is
/// missing. Otherwise the field is found by decoding again without each
/// key in turn: the one whose removal changes the outcome is the culprit.
///
fn decode_error<T: DeserializeOwned>(value: &Value, error: serde_json::Error) -> FieldError {
    let message = error.to_string();
    if let Some(field) = message.strip_prefix("missing field `").and_then(|rest| rest.strip_suffix('`')) {
        return FieldError { path: field.to_string(), message: "Required".to_string() };
    }

    let path = value
        .as_object()
        .and_then(|object| {
            object.keys().find(|key| {
                let mut rest = object.clone();
                rest.remove(key.as_str());
                match serde_json::from_value::<T>(Value::Object(rest)) {
                    Ok(_) => true,
                    Err(other) => other.to_string() != message,
                }
            })
        })
        .cloned()
        .unwrap_or_default();
    FieldError { path, message }
}

/// Input records decoded from JSON and checked against their derived rules
pub trait FromJson: DeserializeOwned + Validate {
    ///
    /// Decodes and validates one record
    ///
    /// Every rule violation is reported. A shape error (wrong type, unknown
    /// choice, missing field) stops the decode, so only the first one is.
    /// Fields the server assigns, such as `id` or `totalPrice`, are ignored.
    ///
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        if !value.is_object() {
            return Err(ValidationErrors::single("", "Expected an object"));
        }
        let record: Self = serde_json::from_value(value.clone())
            .map_err(|error| ValidationErrors(vec![decode_error::<Self>(value, error)]))?;
        record.validate()?;
        Ok(record)
    }
}

impl<T: DeserializeOwned + Validate> FromJson for T {}

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// At least one non-blank character
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejected("blank", "Must not be empty"));
    }
    Ok(())
}

/// A car name must give a usable slug
pub fn car_name(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if generate_slug(value).is_empty() {
        return Err(rejected("slug", "Must contain a letter or a digit"));
    }
    Ok(())
}

/// `YYYY-MM-DD` or a full timestamp
pub fn rental_date(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if parse_date(value).is_none() {
        return Err(rejected("date", "Expected a date (YYYY-MM-DD)"));
    }
    Ok(())
}

/// A status change request, `{"status": "confirmed"}`
#[derive(Debug, Deserialize, Validate)]
pub struct StatusChange {
    pub status: BookingStatus,
}

pub fn status_from_json(value: &Value) -> Result<BookingStatus, ValidationErrors> {
    Ok(StatusChange::from_json(value)?.status)
}
