//! Entries added between two catalog snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog domain a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Items,
    Effects,
    #[serde(rename = "paintkits")]
    PaintKits,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Items => "items",
            Domain::Effects => "effects",
            Domain::PaintKits => "paintkits",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub defindex: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEffect {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaintKit {
    pub id: u32,
    pub name: String,
    /// The "<name> War Paint" item, when the schema has one.
    pub related_defindex: Option<u32>,
}

/// Additions found in one refresh cycle, each list sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub new_items: Vec<NewItem>,
    pub new_effects: Vec<NewEffect>,
    pub new_paint_kits: Vec<NewPaintKit>,
}

impl ChangeSet {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.new_items.is_empty() || !self.new_effects.is_empty() || !self.new_paint_kits.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.new_items.len() + self.new_effects.len() + self.new_paint_kits.len()
    }
}
