//!
//! Documentation of the config module.
//! Loads the `carrental.toml` file and sets up the logger.
//!

use serde::{Deserialize, Serialize};
use std::default::Default;
use std::str::FromStr;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_VAR: &str = "CARRENTAL_CONFIG";

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "carrental.toml";

/// Which storage implementation serves cars, bookings and settings
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Seeded in-memory store, lost on restart
    Memory,
    /// MongoDB document store
    Mongodb,
}

/// Where uploaded images are written
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageStorage {
    /// A local directory (`upload_dir`)
    Disk,
    /// The `uploads` collection of the document store
    Database,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConfyConfig {
    pub print_log: bool,
    pub log_file: String,
    pub log_level: String,
    pub backend: Backend,
    pub database: String,
    pub database_ip: String,
    pub timeout: u64,
    pub image_storage: ImageStorage,
    pub upload_dir: String,
    pub upload_url_prefix: String,
    pub max_upload_bytes: u64,
    pub seed_sample_cars: bool,
}

///Config check
impl Default for ConfyConfig {
    fn default() -> Self {
        ConfyConfig {
            print_log: false,
            log_file: "output.log".to_string(),
            log_level: "debug".to_string(),
            backend: Backend::Memory,
            database: "carrental".to_string(),
            database_ip: "mongodb://localhost:27017/".to_string(),
            timeout: 2,
            image_storage: ImageStorage::Disk,
            upload_dir: "attached_assets/uploads".to_string(),
            upload_url_prefix: "/uploads/".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            seed_sample_cars: true,
        }
    }
}

impl ConfyConfig {
    /// The configured log level, `Debug` when the value is not a level name
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Debug)
    }
}

/// Initialize config and load
///
/// A missing file is created with the defaults by `confy`.
pub fn init() -> Result<ConfyConfig, confy::ConfyError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    confy::load_path(path)
}

/// Sets up logger
pub fn setup_logger(file: &ConfyConfig) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(file.level_filter())
        .chain(fern::log_file(&file.log_file)?);

    if file.print_log {
        dispatch = dispatch.chain(std::io::stdout());
    }

    dispatch.apply()?;
    Ok(())
}
