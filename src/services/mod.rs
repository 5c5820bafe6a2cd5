//! Service layer for the schema toolkit.
//!
//! This module contains the business logic for:
//! - Listing classification (`EconItemClassifier`)
//! - Catalog-backed normalization (`CatalogNormalizer`)
//! - Property listings (`property_table`)
//! - Duplicate suppression (`IdempotencyCache`)
//! - Webhook delivery (`WebhookClient`)

pub mod cache;
mod classifier;
mod normalizer;
mod properties;
pub mod tables;
mod tags;
pub mod webhook;

pub use cache::{IdempotencyCache, MemoryCache};
pub use classifier::{ClassifiedListing, EconItemClassifier};
pub use normalizer::{CatalogNormalizer, ItemNormalizer};
pub use properties::{PropertyKind, property_table};
pub use tags::TagIndex;
pub use webhook::{NotificationJob, NotificationSink, WebhookClient, WebhookPayload, render_jobs};
