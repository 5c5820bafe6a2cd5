//! Diff calculation between catalog snapshots.
//!
//! Only additions are reported. A domain counts as changed when its key set
//! grew; the reported entries are then the keys present now but not before.
//! A removal paired with an addition keeps the size unchanged and is not
//! reported.

use std::collections::{BTreeMap, HashMap};

use crate::models::{CatalogSnapshot, ChangeSet, NewEffect, NewItem, NewPaintKit};

/// Key sets of the three watched domains.
///
/// Items are keyed by defindex; effects and paint kits by name, since
/// several names may share one id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogKeys {
    /// defindex → display name
    pub items: BTreeMap<u32, String>,
    /// effect name → id
    pub effects: BTreeMap<String, u32>,
    /// paint kit name → id
    pub paint_kits: BTreeMap<String, u32>,
    /// paint kit name → defindex of its "<name> War Paint" item
    pub war_paints: BTreeMap<String, u32>,
}

impl CatalogKeys {
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        let sorted = |map: &HashMap<String, u32>| -> BTreeMap<String, u32> {
            map.iter().map(|(name, id)| (name.clone(), *id)).collect()
        };

        let paint_kits = sorted(snapshot.paint_kits());
        let war_paints = paint_kits
            .keys()
            .filter_map(|name| {
                snapshot
                    .item_by_name(&format!("{name} War Paint"))
                    .map(|item| (name.clone(), item.defindex))
            })
            .collect();

        Self {
            items: snapshot.identifier_to_name().clone(),
            effects: sorted(snapshot.particle_effects()),
            paint_kits,
            war_paints,
        }
    }
}

/// Additions from `previous` to `current`.
pub fn calculate(previous: &CatalogKeys, current: &CatalogKeys) -> ChangeSet {
    let mut new_effects: Vec<NewEffect> = added(&previous.effects, &current.effects)
        .map(|(name, id)| NewEffect { id, name })
        .collect();
    new_effects.sort_by(|a, b| (a.id, &a.name).cmp(&(b.id, &b.name)));

    let mut new_paint_kits: Vec<NewPaintKit> = added(&previous.paint_kits, &current.paint_kits)
        .map(|(name, id)| NewPaintKit {
            id,
            related_defindex: current.war_paints.get(&name).copied(),
            name,
        })
        .collect();
    new_paint_kits.sort_by(|a, b| (a.id, &a.name).cmp(&(b.id, &b.name)));

    ChangeSet {
        new_items: added(&previous.items, &current.items)
            .map(|(defindex, name)| NewItem { defindex, name })
            .collect(),
        new_effects,
        new_paint_kits,
    }
}

/// Entries of `current` whose key is missing from `previous`, if the domain grew.
fn added<'a, K, V>(
    previous: &'a BTreeMap<K, V>,
    current: &'a BTreeMap<K, V>,
) -> impl Iterator<Item = (K, V)> + 'a
where
    K: Ord + Clone,
    V: Clone,
{
    let grew = current.len() > previous.len();

    current
        .iter()
        .filter(move |(key, _)| grew && !previous.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
}

/// Differ holding the last observed snapshot's keys.
#[derive(Debug, Default)]
pub struct CatalogDiffer {
    baseline: Option<CatalogKeys>,
}

impl CatalogDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the baseline, then adopt `snapshot` as the new one.
    ///
    /// The first observation only records the baseline.
    pub fn observe(&mut self, snapshot: &CatalogSnapshot) -> ChangeSet {
        let current = CatalogKeys::from_snapshot(snapshot);

        let changes = match &self.baseline {
            Some(previous) => calculate(previous, &current),
            None => {
                log::info!(
                    "Diff baseline recorded ({} items, {} effects, {} paint kits)",
                    current.items.len(),
                    current.effects.len(),
                    current.paint_kits.len()
                );
                ChangeSet::default()
            }
        };

        self.baseline = Some(current);
        changes
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_document;
    use crate::models::{ItemDefinition, SchemaDocument};

    fn keys(ids: &[u32]) -> BTreeMap<u32, String> {
        ids.iter().map(|id| (*id, format!("Item {id}"))).collect()
    }

    fn item_keys(ids: &[u32]) -> CatalogKeys {
        CatalogKeys {
            items: keys(ids),
            ..CatalogKeys::default()
        }
    }

    #[test]
    fn test_growth_reports_new_keys() {
        let changes = calculate(&item_keys(&[1, 2, 3]), &item_keys(&[1, 2, 3, 4, 5]));
        let ids: Vec<u32> = changes.new_items.iter().map(|i| i.defindex).collect();
        assert_eq!(ids, vec![4, 5]);
        assert_eq!(changes.new_items[0].name, "Item 4");
        assert!(changes.new_effects.is_empty());
    }

    #[test]
    fn test_swap_is_invisible() {
        let changes = calculate(&item_keys(&[1, 2, 3]), &item_keys(&[1, 2, 4]));
        assert!(!changes.has_changes());
    }

    #[test]
    fn test_shrink_reports_nothing() {
        let changes = calculate(&item_keys(&[1, 2, 3]), &item_keys(&[1, 2]));
        assert!(!changes.has_changes());
    }

    #[test]
    fn test_growth_with_removal_reports_only_new() {
        let changes = calculate(&item_keys(&[1, 2, 3]), &item_keys(&[2, 3, 4, 5]));
        let ids: Vec<u32> = changes.new_items.iter().map(|i| i.defindex).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_cold_start_records_baseline() {
        let mut differ = CatalogDiffer::new();
        let snapshot = CatalogSnapshot::from_document(sample_document());

        assert!(!differ.has_baseline());
        assert!(!differ.observe(&snapshot).has_changes());
        assert!(differ.has_baseline());
        assert!(!differ.observe(&snapshot).has_changes());
    }

    #[test]
    fn test_observe_new_effect_and_paint_kit() {
        let mut differ = CatalogDiffer::new();
        let mut document: SchemaDocument = sample_document();
        document.paintkits.remove("Warhawk");
        document.effects.remove("Tesla Coil");
        differ.observe(&CatalogSnapshot::from_document(document));

        let mut document = sample_document();
        document.items.push(ItemDefinition {
            defindex: 31000,
            item_name: "Brand New Hat".to_string(),
            ..ItemDefinition::default()
        });
        let changes = differ.observe(&CatalogSnapshot::from_document(document));

        assert_eq!(
            changes.new_items,
            vec![NewItem {
                defindex: 31000,
                name: "Brand New Hat".to_string()
            }]
        );
        assert_eq!(
            changes.new_effects,
            vec![NewEffect {
                id: 108,
                name: "Tesla Coil".to_string()
            }]
        );
        assert_eq!(
            changes.new_paint_kits,
            vec![NewPaintKit {
                id: 80,
                name: "Warhawk".to_string(),
                related_defindex: Some(16102),
            }]
        );
        assert_eq!(changes.change_count(), 3);
    }

    #[test]
    fn test_new_effect_name_sharing_an_id() {
        let mut differ = CatalogDiffer::new();
        differ.observe(&CatalogSnapshot::from_document(sample_document()));

        let mut document = sample_document();
        document.effects.insert("Tesla Coil (Legacy)".to_string(), 108);
        let changes = differ.observe(&CatalogSnapshot::from_document(document));

        assert_eq!(
            changes.new_effects,
            vec![NewEffect {
                id: 108,
                name: "Tesla Coil (Legacy)".to_string()
            }]
        );
    }

    #[test]
    fn test_new_effects_sorted_by_id() {
        let previous = CatalogKeys::default();
        let current = CatalogKeys {
            effects: BTreeMap::from([
                ("Aurora".to_string(), 300),
                ("Zephyr".to_string(), 12),
            ]),
            ..CatalogKeys::default()
        };
        let ids: Vec<u32> = calculate(&previous, &current)
            .new_effects
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![12, 300]);
    }

    #[test]
    fn test_baseline_always_advances() {
        let mut differ = CatalogDiffer::new();
        differ.observe(&CatalogSnapshot::from_document(sample_document()));

        let mut shrunk = sample_document();
        shrunk.effects.clear();
        assert!(!differ.observe(&CatalogSnapshot::from_document(shrunk)).has_changes());

        // Effects come back: growth relative to the shrunk baseline
        let changes = differ.observe(&CatalogSnapshot::from_document(sample_document()));
        assert_eq!(changes.new_effects.len(), 3);
    }
}
