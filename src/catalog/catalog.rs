//!
//! Documentation of the catalog module.
//! Search and filters over the full car list.
//!

use serde::Serialize;

use crate::ODM::models::{Car, Category, Choice, Transmission};

/// Value of a select that means "no filter"
pub const ALL: &str = "all";

/// The catalog's search box and selects, as query parameters
#[derive(Debug, Default, Clone, FromForm, Serialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub transmission: Option<String>,
}

/// Distinct values offered by the filter selects
#[derive(Debug, Serialize, PartialEq)]
pub struct Facets {
    pub categories: Vec<Category>,
    pub transmissions: Vec<Transmission>,
}

/// `None`, empty and "all" all mean any value
fn selected(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|value| !value.is_empty() && *value != ALL)
}

impl CatalogQuery {
    ///
    /// Whether `car` passes the search and both selects
    ///
    /// The search term matches the name or the description, ignoring case.
    /// It is used as typed, spaces included.
    ///
    pub fn matches(&self, car: &Car) -> bool {
        let term = self.search.as_deref().unwrap_or_default().to_lowercase();
        let matches_search =
            term.is_empty() || car.name.to_lowercase().contains(&term) || car.description.to_lowercase().contains(&term);
        let matches_category = selected(&self.category).map_or(true, |category| car.category.as_str() == category);
        let matches_transmission =
            selected(&self.transmission).map_or(true, |transmission| car.transmission.as_str() == transmission);

        matches_search && matches_category && matches_transmission
    }
}

/// The cars passing `query`, in their original order
pub fn filter_cars<'a>(cars: &'a [Car], query: &CatalogQuery) -> Vec<&'a Car> {
    cars.iter().filter(|car| query.matches(car)).collect()
}

/// Categories and transmissions present in `cars`, first seen first
pub fn facets(cars: &[Car]) -> Facets {
    let mut categories = Vec::new();
    let mut transmissions = Vec::new();
    for car in cars {
        if !categories.contains(&car.category) {
            categories.push(car.category);
        }
        if !transmissions.contains(&car.transmission) {
            transmissions.push(car.transmission);
        }
    }
    Facets { categories, transmissions }
}

/// "Showing 1 vehicle" / "Showing 4 vehicles"
pub fn showing(count: usize) -> String {
    format!("Showing {} {}", count, if count == 1 { "vehicle" } else { "vehicles" })
}
