//! Utility functions for the exporter

pub mod time;
