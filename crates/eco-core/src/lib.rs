//! Core types and utilities for the Eco-Grid ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod metrics;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
