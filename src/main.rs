//!
//! #  CarRental - a car rental storefront
//!
//! CarRental is a web application for a small rental agency: a public
//! catalog of the fleet, a booking form with server-side pricing, and an
//! admin JSON API for cars, bookings, site settings and image uploads.
//!
//! It can run on an in-memory store, handy for demos and tests, or on MongoDB:
//!
//! * Car catalog with search and filters
//! * Booking requests priced per rental day
//! * Booking status review (pending, confirmed, cancelled)
//! * Branding and contact settings with defaults
//! * Image uploads to disk or to the database
//!

#![allow(non_snake_case)]
#[macro_use] extern crate rocket;

mod booking;
mod catalog;
mod config;
mod html_format;
mod routes;
mod uploads;
mod ODM;

use std::sync::Arc;

use log::{error, info, warn};
use rocket::{Build, Rocket};

use html_format::html_format::Pages;
use routes::{StoreState, UploadState};
use uploads::uploads::Uploader;
use ODM::Storage;

#[cfg(test)] mod tests;

/// Where uploaded files are served from, `None` for prefixes that are not local paths
fn upload_base(prefix: &str) -> Option<&str> {
    if !prefix.starts_with('/') {
        return None;
    }
    match prefix.trim_end_matches('/') {
        "" => Some("/"),
        base => Some(base),
    }
}

///
/// Builds the rocket around a store and an uploader
///
/// # Arguments
///
/// * `store` - cars, bookings and settings
/// * `uploader` - image uploads, also served back under its URL prefix
///
pub fn ignite(store: Arc<dyn Storage>, uploader: Uploader) -> anyhow::Result<Rocket<Build>> {
    let pages = Pages::new()?;

    let mut lift = rocket::build().mount("/", routes::routes());
    match upload_base(uploader.url_prefix()) {
        Some(base) => lift = lift.mount(base, routes::upload_routes()),
        None => warn!("{}", format!("Upload prefix {} is not a local path, uploads are not served", uploader.url_prefix())),
    }

    Ok(lift
        .manage(StoreState { store })
        .manage(UploadState { uploader })
        .manage(pages))
}

/// The main functions, runs w/ cargo run
#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let config = match config::config::init() {
        Err(e) => {
            println!("{}", format!("CONFIG failed to launch {}", e));
            return Err(anyhow::anyhow!("config: {}", e));
        }
        Ok(value) => value,
    };
    if let Err(e) = config::config::setup_logger(&config) {
        println!("{}", format!("LOGGER failed to launch {}", e));
    }

    let store = ODM::connect(&config).await?;
    let uploader = uploads::connect(&config).await?;
    info!("{}", format!("Using {:?} storage, images on {:?}", config.backend, config.image_storage));
    warn!("CARRENTAL IS LAUNCHING");

    let lift = ignite(store, uploader)?.launch().await;

    warn!("CARRENTAL OVER");
    match lift {
        Ok(_) => Ok(()),
        Err(value) => {
            error!("Rocket could not run, error {}", value);
            Err(anyhow::anyhow!("rocket failed to launch"))
        }
    }
}
