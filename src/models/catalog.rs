//! Item schema snapshot and its lookup tables.
//!
//! A snapshot is built once from a schema document and never mutated; a
//! refresh produces a new snapshot.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Attribute naming the item a strangifier or kit applies to.
pub const ATTR_TOOL_TARGET: &str = "tool target item";
/// Attribute carrying a supply crate's series number.
pub const ATTR_CRATE_SERIES: &str = "set supply crate series";

/// Internal grade key → display label.
const GRADES: [(&str, &str); 6] = [
    ("common", "Civilian Grade"),
    ("uncommon", "Freelance Grade"),
    ("rare", "Mercenary Grade"),
    ("mythical", "Commando Grade"),
    ("legendary", "Assassin Grade"),
    ("ancient", "Elite Grade"),
];

/// Schema document as served by the schema source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
    #[serde(default)]
    pub qualities: HashMap<String, u32>,
    #[serde(default)]
    pub effects: HashMap<String, u32>,
    #[serde(default)]
    pub paintkits: HashMap<String, u32>,
    #[serde(default)]
    pub paints: HashMap<String, u32>,
    #[serde(default)]
    pub item_collections: BTreeMap<String, ItemCollection>,
}

/// One item definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDefinition {
    pub defindex: u32,
    /// Display name
    pub item_name: String,
    /// Internal name, referenced by collections
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item_type_name: String,
    #[serde(default)]
    pub item_class: String,
    /// Static attributes by name, values kept in their text form
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: HashMap<String, String>,
}

impl ItemDefinition {
    /// Attribute value as a whole non-negative number.
    ///
    /// Schemas publish these as floats ("30.0"); fractional, negative or
    /// out-of-range values are rejected rather than truncated.
    pub fn attribute_u32(&self, name: &str) -> Option<u32> {
        let raw = self.attributes.get(name)?.trim();
        if let Ok(value) = raw.parse::<u32>() {
            return Some(value);
        }

        let value = raw.parse::<f64>().ok()?;
        let whole = value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
        whole.then_some(value as u32)
    }
}

/// Attribute maps mix numbers and strings; store both as text and drop the rest.
fn lenient_attributes<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(s) => Some((name, s)),
            serde_json::Value::Number(n) => Some((name, n.to_string())),
            serde_json::Value::Bool(b) => Some((name, b.to_string())),
            _ => None,
        })
        .collect())
}

/// A named collection: grade → internal item name → placeholder.
///
/// Reference collections list items flat instead of by grade; those entries
/// are not objects and are ignored when grading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCollection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: BTreeMap<String, serde_json::Value>,
}

/// One grade and the items collections place in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeEntry {
    pub grade: &'static str,
    pub count: usize,
    /// internal name → defindex
    pub items: BTreeMap<String, u32>,
}

/// Immutable lookup view over one schema document.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    items: BTreeMap<u32, ItemDefinition>,
    names: BTreeMap<u32, String>,
    by_item_name: HashMap<String, u32>,
    qualities: HashMap<String, u32>,
    effects: HashMap<String, u32>,
    paint_kits: HashMap<String, u32>,
    paints: HashMap<String, u32>,
    collections: BTreeMap<String, ItemCollection>,
    grades: HashMap<u32, &'static str>,
}

impl CatalogSnapshot {
    /// Build the lookup tables for a schema document.
    pub fn from_document(document: SchemaDocument) -> Self {
        let mut snapshot = Self {
            qualities: document.qualities,
            effects: document.effects,
            paint_kits: document.paintkits,
            paints: document.paints,
            collections: document.item_collections,
            ..Self::default()
        };

        for item in document.items {
            // First definition wins for duplicate display names
            snapshot
                .by_item_name
                .entry(item.item_name.clone())
                .or_insert(item.defindex);
            snapshot.names.insert(item.defindex, item.item_name.clone());
            snapshot.items.insert(item.defindex, item);
        }

        snapshot.grades = snapshot.build_grades();
        snapshot
    }

    /// Parse a schema document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Load a schema document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// defindex → display name
    pub fn identifier_to_name(&self) -> &BTreeMap<u32, String> {
        &self.names
    }

    /// quality name → id
    pub fn qualities(&self) -> &HashMap<String, u32> {
        &self.qualities
    }

    /// effect name → id
    pub fn particle_effects(&self) -> &HashMap<String, u32> {
        &self.effects
    }

    /// paint kit name → id
    pub fn paint_kits(&self) -> &HashMap<String, u32> {
        &self.paint_kits
    }

    /// paint name → paint value
    pub fn paints(&self) -> &HashMap<String, u32> {
        &self.paints
    }

    pub fn item_collections(&self) -> &BTreeMap<String, ItemCollection> {
        &self.collections
    }

    pub fn item_by_defindex(&self, defindex: u32) -> Option<&ItemDefinition> {
        self.items.get(&defindex)
    }

    /// Find an item by its display name.
    pub fn item_by_name(&self, name: &str) -> Option<&ItemDefinition> {
        self.by_item_name
            .get(name)
            .and_then(|defindex| self.items.get(defindex))
    }

    /// Look an item up by defindex when the query is numeric, else by display name.
    pub fn find_item(&self, query: &str) -> Option<&ItemDefinition> {
        let query = query.trim();
        match query.parse::<u32>() {
            Ok(defindex) => self.item_by_defindex(defindex),
            Err(_) => self.item_by_name(query),
        }
    }

    pub fn skin_id_by_name(&self, name: &str) -> Option<u32> {
        self.paint_kits.get(name).copied()
    }

    pub fn quality_id_by_name(&self, name: &str) -> Option<u32> {
        self.qualities.get(name).copied()
    }

    pub fn effect_id_by_name(&self, name: &str) -> Option<u32> {
        self.effects.get(name).copied()
    }

    pub fn paint_by_name(&self, name: &str) -> Option<u32> {
        self.paints.get(name).copied()
    }

    /// Item a strangifier or killstreak kit targets, per its static attribute.
    pub fn tool_target(&self, defindex: u32) -> Option<u32> {
        self.item_by_defindex(defindex)?
            .attribute_u32(ATTR_TOOL_TARGET)
    }

    /// Grade label ("Assassin Grade", ...) of an item, if any collection grades it.
    pub fn item_grade(&self, defindex: u32) -> Option<&'static str> {
        self.grades.get(&defindex).copied()
    }

    /// Number of graded items per grade label, in grade order.
    pub fn grade_counts(&self) -> Vec<(&'static str, usize)> {
        GRADES
            .iter()
            .map(|(_, label)| {
                let count = self.grades.values().filter(|g| *g == label).count();
                (*label, count)
            })
            .collect()
    }

    /// Graded items per grade, in grade order, keyed by internal item name.
    pub fn grade_table(&self) -> Vec<GradeEntry> {
        let mut table: Vec<GradeEntry> = GRADES
            .iter()
            .map(|(_, label)| GradeEntry {
                grade: *label,
                count: 0,
                items: BTreeMap::new(),
            })
            .collect();

        for (defindex, label) in &self.grades {
            let Some(item) = self.items.get(defindex) else {
                continue;
            };
            if let Some(entry) = table.iter_mut().find(|entry| entry.grade == *label) {
                entry.items.insert(item.name.clone(), *defindex);
            }
        }

        for entry in &mut table {
            entry.count = entry.items.len();
        }
        table
    }

    fn build_grades(&self) -> HashMap<u32, &'static str> {
        let by_internal_name: HashMap<&str, u32> = self
            .items
            .values()
            .filter(|item| !item.name.is_empty())
            .map(|item| (item.name.as_str(), item.defindex))
            .collect();

        let mut grades = HashMap::new();
        for (key, collection) in &self.collections {
            if key.contains("master_collection") {
                continue;
            }

            for (grade, members) in &collection.items {
                let Some(label) = grade_label(grade) else {
                    continue;
                };
                let Some(members) = members.as_object() else {
                    continue;
                };

                for name in members.keys() {
                    if let Some(&defindex) = by_internal_name.get(name.as_str()) {
                        grades.insert(defindex, label);
                    }
                }
            }
        }
        grades
    }
}

fn grade_label(grade: &str) -> Option<&'static str> {
    GRADES
        .iter()
        .find(|(key, _)| *key == grade)
        .map(|(_, label)| *label)
}
