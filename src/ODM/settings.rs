//!
//! Documentation of the settings module.
//! The website settings singleton: default fallback on read, merge on write.
//!

use log::error;

use super::errors::StoreResult;
use super::models::{StoredSettings, WebsiteSettings};
use super::Storage;

/// Favicon used when the form leaves it empty
pub const DEFAULT_FAVICON: &str = "/favicon.png";

impl Default for WebsiteSettings {
    fn default() -> Self {
        WebsiteSettings {
            website_name: "Premium Car Rentals Australia".into(),
            logo: "".into(),
            favicon: DEFAULT_FAVICON.into(),
            company_name: "Premium Car Rentals Australia".into(),
            email: "info@premiumcarrentals.com.au".into(),
            phone: "+61 2 9999 8888".into(),
            address: "123 Premium Street, Sydney, NSW 2000, Australia".into(),
            description: "Australia's premier car rental service offering luxury vehicles, premium sedans, SUVs, and sports cars. Book your perfect vehicle for your Australian adventure with exceptional service and competitive rates.".into(),
            facebook_url: Some("".into()),
            twitter_url: Some("".into()),
            instagram_url: Some("".into()),
            linkedin_url: Some("".into()),
            meta_description: Some("Premium car rental in Australia. Choose from luxury sedans, SUVs, sports cars and more. Best rates, flexible bookings, and exceptional service across Sydney, Melbourne, Brisbane, Perth, and Adelaide. Book your dream car today.".into()),
            meta_keywords: Some("car rental Australia, luxury car hire Australia, premium car rental Sydney, car hire Melbourne, rent car Brisbane, vehicle rental Perth, car rental Adelaide, Australia car hire, premium vehicles Australia, luxury cars Australia".into()),
        }
    }
}

impl WebsiteSettings {
    /// The stored fields laid over the defaults
    pub fn overlay(stored: StoredSettings) -> WebsiteSettings {
        let defaults = WebsiteSettings::default();
        WebsiteSettings {
            website_name: stored.website_name.unwrap_or(defaults.website_name),
            logo: stored.logo.unwrap_or(defaults.logo),
            favicon: stored.favicon.unwrap_or(defaults.favicon),
            company_name: stored.company_name.unwrap_or(defaults.company_name),
            email: stored.email.unwrap_or(defaults.email),
            phone: stored.phone.unwrap_or(defaults.phone),
            address: stored.address.unwrap_or(defaults.address),
            description: stored.description.unwrap_or(defaults.description),
            facebook_url: stored.facebook_url.or(defaults.facebook_url),
            twitter_url: stored.twitter_url.or(defaults.twitter_url),
            instagram_url: stored.instagram_url.or(defaults.instagram_url),
            linkedin_url: stored.linkedin_url.or(defaults.linkedin_url),
            meta_description: stored.meta_description.or(defaults.meta_description),
            meta_keywords: stored.meta_keywords.or(defaults.meta_keywords),
        }
    }

    ///
    /// The document written on save
    ///
    /// Required fields are always written, an empty favicon falls back to
    /// the default one, optional fields only when they hold text.
    ///
    pub fn to_stored(&self) -> StoredSettings {
        fn filled(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|text| !text.trim().is_empty()).cloned()
        }

        let favicon = if self.favicon.is_empty() { DEFAULT_FAVICON.to_string() } else { self.favicon.clone() };
        StoredSettings {
            website_name: Some(self.website_name.clone()),
            logo: Some(self.logo.clone()),
            favicon: Some(favicon),
            company_name: Some(self.company_name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            address: Some(self.address.clone()),
            description: Some(self.description.clone()),
            facebook_url: filled(&self.facebook_url),
            twitter_url: filled(&self.twitter_url),
            instagram_url: filled(&self.instagram_url),
            linkedin_url: filled(&self.linkedin_url),
            meta_description: filled(&self.meta_description),
            meta_keywords: filled(&self.meta_keywords),
        }
    }
}

///
/// Get website settings
///
/// # Output
///
/// * the stored settings over the defaults
/// * the defaults when nothing is stored, or when the store fails
///
/// # Log
///
/// * `error` - "Error fetching website settings {error}"
///
pub async fn get_settings(store: &dyn Storage) -> WebsiteSettings {
    match store.load_settings().await {
        Ok(Some(stored)) => WebsiteSettings::overlay(stored),
        Ok(None) => WebsiteSettings::default(),
        Err(value) => {
            error!("{}", format!("Error fetching website settings {}", value));
            WebsiteSettings::default()
        }
    }
}

/// Save website settings, returns what a following read sees
pub async fn save_settings(store: &dyn Storage, settings: &WebsiteSettings) -> StoreResult<WebsiteSettings> {
    store.merge_settings(settings.to_stored()).await?;
    Ok(get_settings(store).await)
}
