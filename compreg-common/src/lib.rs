//! # compreg Common Library
//!
//! Shared code for the component registry reconciliation tools:
//! - Error and result types
//! - Pipeline configuration loading (CLI → ENV → TOML → defaults)
//! - Shared CMS store connection and schema bootstrap
//! - Timestamp helpers for run reports

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
