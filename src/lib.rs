// src/lib.rs

//! Econ item schema toolkit.
//!
//! Classifies marketplace listings into item descriptors and SKUs, and
//! watches the item schema for additions worth announcing.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sku;
pub mod utils;
