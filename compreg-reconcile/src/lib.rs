//! compreg-reconcile library interface
//!
//! Exposes the pipeline pieces for the binary and for integration tests.

pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod types;

pub use crate::error::{PipelineError, PipelineResult};
