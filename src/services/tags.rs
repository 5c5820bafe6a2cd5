// src/services/tags.rs

//! Read-only accessor over a listing's tags, descriptions and actions.

use crate::models::{Description, RawListing};

/// Typed lookups over the ordered arrays of one listing.
#[derive(Debug, Clone, Copy)]
pub struct TagIndex<'a> {
    listing: &'a RawListing,
}

impl<'a> TagIndex<'a> {
    pub fn new(listing: &'a RawListing) -> Self {
        Self { listing }
    }

    /// Display name of the first tag in `category`.
    pub fn tag(&self, category: &str) -> Option<&'a str> {
        self.listing
            .tags
            .iter()
            .find(|t| t.category == category)
            .and_then(|t| t.display_name())
    }

    /// Whether any tag has both this category and this category name.
    pub fn has_tag(&self, category: &str, category_name: &str) -> bool {
        self.listing
            .tags
            .iter()
            .any(|t| t.category == category && t.category_name.as_deref() == Some(category_name))
    }

    pub fn descriptions(&self) -> &'a [Description] {
        &self.listing.descriptions
    }

    /// Whether a description line equals `text` exactly.
    pub fn has_description(&self, text: &str) -> bool {
        self.position_of(text).is_some()
    }

    /// Index of the first description line equal to `text`.
    pub fn position_of(&self, text: &str) -> Option<usize> {
        self.listing.descriptions.iter().position(|d| d.value == text)
    }

    /// Text of the description line at `index`.
    pub fn description_at(&self, index: usize) -> Option<&'a str> {
        self.listing.descriptions.get(index).map(|d| d.value.as_str())
    }

    /// All description lines starting with `prefix`.
    pub fn descriptions_starting_with(self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.listing
            .descriptions
            .iter()
            .map(|d| d.value.as_str())
            .filter(move |v| v.starts_with(prefix))
    }

    /// First description line starting with `prefix` and rendered in `color`.
    pub fn colored_description(&self, prefix: &str, color: &str) -> Option<&'a str> {
        self.listing
            .descriptions
            .iter()
            .find(|d| d.value.starts_with(prefix) && d.color.as_deref() == Some(color))
            .map(|d| d.value.as_str())
    }

    /// Link of the action named `name`.
    pub fn action_link(&self, name: &str) -> Option<&'a str> {
        self.listing
            .actions
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.link.as_str())
    }
}
