//!
//! Documentation of the Database Utilities module.
//! Contains the helpers shared by both storage backends.
//!

use bson::{doc, Document};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

use super::errors::StoreResult;
use super::models::StoredSettings;

/// The fixed `_id` of the settings singleton document
pub const SETTINGS_ID: &str = "default";

fn non_alphanumeric_runs() -> &'static Regex {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    RUNS.get_or_init(|| Regex::new("[^a-z0-9]+").expect("static regex"))
}

///
/// Derives the URL slug of a car from its name
///
/// # Example
/// ```
/// assert_eq!(generate_slug("Tesla Model 3!"), "tesla-model-3");
/// ```
///
pub fn generate_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    non_alphanumeric_runs()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Reads a missing or `null` list as an empty one
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a string without its surrounding whitespace
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

/// Reads a blank or `null` string as `None`
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.trim().is_empty()))
}

/// Converts any record to a BSON document
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    Ok(bson::to_document(value)?)
}

/// The `$set` update for a settings merge, absent fields are left alone
pub fn settings_update(settings: &StoredSettings) -> StoreResult<Document> {
    Ok(doc! { "$set": to_document(settings)? })
}

/// Filter matching a record by its internal ID
pub fn by_id(id: &str) -> Document {
    doc! { "id": id }
}
