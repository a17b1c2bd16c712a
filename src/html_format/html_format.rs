//!
//! Documentation of the html format module.
//! Renders the public pages: the catalog, a car's detail page and the booking confirmation.
//!

use serde::Serialize;
use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::booking::booking::Quote;
use crate::catalog::catalog::{facets, filter_cars, showing, CatalogQuery};
use crate::ODM::models::{Booking, Car, WebsiteSettings};
use crate::ODM::validation::FieldError;

// Templates are compiled into the binary
const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html.tera")),
    ("catalog.html", include_str!("../../templates/catalog.html.tera")),
    ("car.html", include_str!("../../templates/car.html.tera")),
    ("booking.html", include_str!("../../templates/booking.html.tera")),
];

/// What the booking section of a detail page shows besides the car
#[derive(Debug, Default, Serialize)]
pub struct BookingPanel {
    /// Values to put back into the form
    pub form: Map<String, Value>,
    pub quote: Option<Quote>,
    pub errors: Vec<FieldError>,
    /// A conflict or not-found message
    pub problem: Option<String>,
}

/// Feature labels shown for a car, in display order
pub fn features(car: &Car) -> Vec<&'static str> {
    [
        (car.has_gps, "GPS Navigation"),
        (car.has_bluetooth, "Bluetooth"),
        (car.has_ac, "Air Conditioning"),
        (car.has_usb, "USB Charging"),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, label)| *label)
    .collect()
}

/// The compiled page templates, managed by rocket
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Pages, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Pages { tera })
    }

    fn render(&self, template: &str, settings: &WebsiteSettings, mut ctx: Context) -> Result<String, tera::Error> {
        ctx.insert("settings", settings);
        self.tera.render(template, &ctx)
    }

    ///
    /// The fleet page
    ///
    /// # Arguments
    ///
    /// * `cars` - every car, the query narrows them
    /// * `query` - search box and selects
    ///
    pub fn catalog(&self, settings: &WebsiteSettings, cars: &[Car], query: &CatalogQuery) -> Result<String, tera::Error> {
        let shown = filter_cars(cars, query);
        let mut ctx = Context::new();
        ctx.insert("showing", &showing(shown.len()));
        ctx.insert("cars", &shown);
        ctx.insert("facets", &facets(cars));
        ctx.insert("query", query);
        self.render("catalog.html", settings, ctx)
    }

    /// A car's detail page with its booking form
    pub fn car(&self, settings: &WebsiteSettings, car: &Car, panel: &BookingPanel) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("car", car);
        ctx.insert("gallery", &car.gallery());
        ctx.insert("features", &features(car));
        ctx.insert("form", &panel.form);
        ctx.insert("quote", &panel.quote);
        ctx.insert("errors", &panel.errors);
        ctx.insert("problem", &panel.problem);
        self.render("car.html", settings, ctx)
    }

    pub fn confirmation(&self, settings: &WebsiteSettings, booking: &Booking) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("booking", booking);
        self.render("booking.html", settings, ctx)
    }
}
