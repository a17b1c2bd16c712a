pub mod get_routes;
pub mod post_routes;
pub mod routes_utils;

use super::booking;
use super::catalog;
use super::html_format;
use super::uploads;
use super::ODM;

use rocket::http::Status;
use rocket::serde::json::{Error as JsonError, Json};
use rocket::Route;
use rocket::State;

use log::{error, info, warn};

pub use routes_utils::*;

use get_routes::get_routes;
use post_routes::post_routes;

/// The API and page routes, mounted at `/`
pub fn routes() -> Vec<Route> {
    let mut routes = get_routes();
    routes.append(&mut post_routes());
    routes
}

/// Serving of uploaded files, mounted at the upload URL prefix
pub fn upload_routes() -> Vec<Route> {
    get_routes::upload_file_routes()
}
