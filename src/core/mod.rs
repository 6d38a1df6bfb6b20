//! Core module - shared infrastructure for site-health
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{HealthError, Result};
pub use types::*;
