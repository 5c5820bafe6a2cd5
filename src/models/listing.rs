//! Marketplace listing ("econ item") as delivered by the Steam economy API.

use serde::{Deserialize, Deserializer, Serialize};

/// App id of the game whose items this crate understands.
pub const TF2_APP_ID: u32 = 440;

/// A raw marketplace item listing. Never mutated after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawListing {
    #[serde(deserialize_with = "lenient_u32")]
    pub appid: u32,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub market_hash_name: Option<String>,

    #[serde(default)]
    pub market_name: Option<String>,

    /// Type line, e.g. "Strange Cosmetic - Points Scored: 0"
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,

    #[serde(default)]
    pub icon_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub descriptions: Vec<Description>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<Action>,

    #[serde(default)]
    pub app_data: Option<ListingAppData>,
}

/// One description line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Description {
    pub value: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// One tag; the display name lives in `localized_tag_name` for web
/// inventories and in `name` for client-side ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub category: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub internal_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub localized_tag_name: Option<String>,
}

impl Tag {
    /// Display name of the tag value.
    pub fn display_name(&self) -> Option<&str> {
        self.localized_tag_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
    }
}

/// A clickable action attached to the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub link: String,
}

/// Attribute bag with already-resolved values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingAppData {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub def_index: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub quality: Option<u32>,
}

impl RawListing {
    /// Parse a listing from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Steam sends numbers as strings about half the time.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => u32::try_from(n).ok(),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
