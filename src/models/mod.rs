// src/models/mod.rs

//! Domain models for the schema toolkit.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod catalog;
mod change;
mod config;
mod descriptor;
mod listing;

// Re-export all public types
pub use catalog::{
    ATTR_CRATE_SERIES, ATTR_TOOL_TARGET, CatalogSnapshot, GradeEntry, ItemCollection, ItemDefinition,
    SchemaDocument,
};
pub use change::{ChangeSet, Domain, NewEffect, NewItem, NewPaintKit};
pub use config::{
    CatalogConfig, ClassifierOptions, Config, ENV_SCHEMA_SOURCE, ENV_WEBHOOK_URL, HttpConfig,
    LoggingConfig, NotificationConfig,
};
pub use descriptor::{ItemDescriptor, quality};
pub use listing::{Action, Description, ListingAppData, RawListing, TF2_APP_ID, Tag};

#[cfg(test)]
pub(crate) use catalog::fixtures;
