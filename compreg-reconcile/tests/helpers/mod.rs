//! Test Helper Utilities
//!
//! Shared utilities for testing compreg-reconcile

#![allow(dead_code)]

pub mod cms_store;

pub use cms_store::{
    create_test_store, insert_isolated_tenant, insert_layout, insert_shared_tenant, test_config,
    TestWorkspace,
};
