//! Shared store access

pub mod init;

pub use init::*;
