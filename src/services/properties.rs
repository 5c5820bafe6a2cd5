// src/services/properties.rs

//! Named property tables: catalog-backed ones and the fixed listing tables.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::CatalogSnapshot;
use crate::services::tables::{CRATE_SERIES, KILLSTREAK_MARKERS, WEARS};

/// A property whose values are listed as name → id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Qualities,
    Killstreaks,
    Effects,
    PaintKits,
    Wears,
    CrateSeries,
    Paints,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 7] = [
        Self::Qualities,
        Self::Killstreaks,
        Self::Effects,
        Self::PaintKits,
        Self::Wears,
        Self::CrateSeries,
        Self::Paints,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qualities => "qualities",
            Self::Killstreaks => "killstreaks",
            Self::Effects => "effects",
            Self::PaintKits => "paintkits",
            Self::Wears => "wears",
            Self::CrateSeries => "crateseries",
            Self::Paints => "paints",
        }
    }

    /// Fixed tables are listed without loading a catalog.
    pub fn needs_catalog(self) -> bool {
        !matches!(self, Self::Killstreaks | Self::Wears | Self::CrateSeries)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                AppError::validation(format!(
                    "unknown property '{s}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// name → id for one property, sorted by name.
pub fn property_table(catalog: &CatalogSnapshot, kind: PropertyKind) -> BTreeMap<String, u32> {
    let owned = |map: &HashMap<String, u32>| -> BTreeMap<String, u32> {
        map.iter().map(|(name, id)| (name.clone(), *id)).collect()
    };

    match kind {
        PropertyKind::Qualities => owned(catalog.qualities()),
        PropertyKind::Effects => owned(catalog.particle_effects()),
        PropertyKind::PaintKits => owned(catalog.paint_kits()),
        PropertyKind::Paints => owned(catalog.paints()),
        PropertyKind::Killstreaks => KILLSTREAK_MARKERS
            .iter()
            .map(|(marker, tier)| (marker.trim_end().to_string(), u32::from(*tier)))
            .collect(),
        PropertyKind::Wears => (1..)
            .zip(WEARS)
            .map(|(tier, wear)| (wear.to_string(), tier))
            .collect(),
        PropertyKind::CrateSeries => CRATE_SERIES
            .iter()
            .flat_map(|(_, series)| series.iter())
            .map(|(name, series)| (name.to_string(), *series))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_catalog;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("paintkits".parse::<PropertyKind>().unwrap(), PropertyKind::PaintKits);
        assert_eq!("Crate-Series".parse::<PropertyKind>().unwrap(), PropertyKind::CrateSeries);
        assert!("hats".parse::<PropertyKind>().is_err());

        for kind in PropertyKind::ALL {
            assert_eq!(kind.to_string().parse::<PropertyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_catalog_tables() {
        let catalog = sample_catalog();
        assert_eq!(property_table(&catalog, PropertyKind::Qualities)["Strange"], 11);
        assert_eq!(property_table(&catalog, PropertyKind::Effects)["Tesla Coil"], 108);
        assert_eq!(property_table(&catalog, PropertyKind::PaintKits)["Warhawk"], 80);
        assert_eq!(
            property_table(&catalog, PropertyKind::Paints)["A Color Similar to Slate"],
            3100495
        );
    }

    #[test]
    fn test_fixed_tables() {
        let catalog = CatalogSnapshot::default();
        assert!(!PropertyKind::Wears.needs_catalog());
        assert!(PropertyKind::Paints.needs_catalog());

        let killstreaks = property_table(&catalog, PropertyKind::Killstreaks);
        assert_eq!(killstreaks.len(), 3);
        assert_eq!(killstreaks["Killstreak"], 1);
        assert_eq!(killstreaks["Professional Killstreak"], 3);

        let wears = property_table(&catalog, PropertyKind::Wears);
        assert_eq!(wears["Factory New"], 1);
        assert_eq!(wears["Battle Scarred"], 5);

        let series = property_table(&catalog, PropertyKind::CrateSeries);
        assert_eq!(series["Mann Co. Supply Crate Series #12"], 12);
        assert_eq!(series["Salvaged Mann Co. Supply Crate Series #50"], 50);
    }
}
