//! Ambient utilities: configuration, errors, logging.

pub mod config;
pub mod errors;
pub mod logger;
