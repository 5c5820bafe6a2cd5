//! Canonical item descriptor.

use serde::{Deserialize, Serialize};

/// Quality ids the classifier reasons about.
pub mod quality {
    pub const UNIQUE: u32 = 6;
    pub const UNUSUAL: u32 = 5;
    pub const STRANGE: u32 = 11;
    pub const COLLECTORS: u32 = 14;
    pub const DECORATED: u32 = 15;
}

/// Flat attribute record for one item.
///
/// Every optional attribute is present as an explicit `null` when absent;
/// the JSON keys match the SKU item object used by trading tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub defindex: u32,
    pub quality: u32,
    #[serde(default = "default_true")]
    pub craftable: bool,
    #[serde(default)]
    pub killstreak: u8,
    #[serde(default)]
    pub australium: bool,
    #[serde(default)]
    pub festive: bool,
    #[serde(default)]
    pub effect: Option<u32>,
    #[serde(default)]
    pub wear: Option<u8>,
    #[serde(default)]
    pub paintkit: Option<u32>,
    #[serde(default)]
    pub quality2: Option<u32>,
    #[serde(default)]
    pub crateseries: Option<u32>,
    #[serde(default)]
    pub paint: Option<u32>,
    #[serde(default)]
    pub craftnumber: Option<u32>,
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub output: Option<u32>,
    #[serde(default, rename = "outputQuality")]
    pub output_quality: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl ItemDescriptor {
    /// Descriptor with only the required fields set.
    pub fn new(defindex: u32, quality: u32) -> Self {
        Self {
            defindex,
            quality,
            craftable: true,
            killstreak: 0,
            australium: false,
            festive: false,
            effect: None,
            wear: None,
            paintkit: None,
            quality2: None,
            crateseries: None,
            paint: None,
            craftnumber: None,
            target: None,
            output: None,
            output_quality: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let json = serde_json::to_value(ItemDescriptor::new(5021, 6)).unwrap();
        assert_eq!(json["defindex"], 5021);
        assert_eq!(json["craftable"], true);
        assert!(json.get("effect").unwrap().is_null());
        assert!(json.get("outputQuality").unwrap().is_null());
    }

    #[test]
    fn test_item_object_defaults() {
        let item: ItemDescriptor =
            serde_json::from_str(r#"{"defindex": 30769, "quality": 5, "effect": 108}"#).unwrap();
        assert!(item.craftable);
        assert_eq!(item.effect, Some(108));
        assert_eq!(item.killstreak, 0);
    }
}
