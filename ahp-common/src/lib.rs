//! # AHP Common Library
//!
//! Shared code for the AHP criteria analysis service including:
//! - The AHP math engine (matrix builder, eigen solver, consistency scorer,
//!   aggregator)
//! - API response types (rounded presentation records)
//! - Configuration loading
//! - Common error type

pub mod ahp;
pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
