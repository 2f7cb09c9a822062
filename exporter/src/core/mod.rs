//! Core configuration and constants

mod config;
pub mod constants;

pub use config::{ExporterConfig, FileConfig, NamingPolicy};
