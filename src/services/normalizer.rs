// src/services/normalizer.rs

//! Fill-in of attributes implied by the catalog.

use crate::models::{ATTR_CRATE_SERIES, CatalogSnapshot, ItemDescriptor};

/// Completes a freshly decoded descriptor against the catalog.
///
/// Returning `None` means the catalog does not know the item. Implementations
/// only fill in what the catalog states statically; they do not repair
/// descriptors (quality, effect or killstreak fix-ups stay with the caller).
pub trait ItemNormalizer: Send + Sync {
    fn normalize(&self, item: ItemDescriptor, catalog: &CatalogSnapshot) -> Option<ItemDescriptor>;
}

/// Normalizer applying the catalog's static crate attributes.
///
/// Rejects unknown defindexes and sets or clears `crateseries`; every other
/// field passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogNormalizer;

impl ItemNormalizer for CatalogNormalizer {
    fn normalize(&self, mut item: ItemDescriptor, catalog: &CatalogSnapshot) -> Option<ItemDescriptor> {
        let definition = catalog.item_by_defindex(item.defindex)?;

        if definition.item_class == "supply_crate" {
            if item.crateseries.is_none() {
                item.crateseries = definition.attribute_u32(ATTR_CRATE_SERIES);
            }
        } else {
            item.crateseries = None;
        }

        Some(item)
    }
}
