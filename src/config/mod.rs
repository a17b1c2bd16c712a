//!
//! Documentation of the config module.
//! Sets up the 'config' and 'logger'.
//!

pub mod config;
