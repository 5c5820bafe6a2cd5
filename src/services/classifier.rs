// src/services/classifier.rs

//! Econ item classifier.
//!
//! Rebuilds an [`ItemDescriptor`] from a marketplace listing's name, tags and
//! description lines. Every call threads its own [`DecodeContext`] through
//! the steps below; the classifier itself is read-only, so one instance can
//! serve any number of concurrent callers.
//!
//! Step order matters: later steps read values derived by earlier ones
//! (paint kit needs wear, the elevated quality needs the paint kit, the
//! quality override is applied only after every read of the original
//! quality).

use serde::Serialize;
use url::Url;

use crate::error::DecodeError;
use crate::models::{
    CatalogSnapshot, ClassifierOptions, ItemDescriptor, RawListing, TF2_APP_ID, quality,
};
use crate::services::normalizer::{CatalogNormalizer, ItemNormalizer};
use crate::services::tables::{self, *};
use crate::services::tags::TagIndex;
use crate::sku;

/// Result of classifying an arbitrary listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedListing {
    pub sku: String,
    /// Paint was detected, even if the paint name was unknown to the catalog
    pub painted: bool,
    /// Absent for listings of other games
    pub descriptor: Option<ItemDescriptor>,
}

/// Per-call scratch state shared between decode steps.
struct DecodeContext<'l> {
    listing: &'l RawListing,
    tags: TagIndex<'l>,
    name: &'l str,
    defindex: u32,
    /// Primary quality as listed, before any override
    quality: u32,
    killstreak: u8,
    wear: Option<u8>,
    paintkit: Option<u32>,
    is_crate: bool,
    painted: bool,
    quality_override: Option<u32>,
}

impl DecodeContext<'_> {
    fn item_type(&self) -> &str {
        self.listing.item_type.as_deref().unwrap_or("")
    }
}

/// Recipe output resolved from the "outputs" description block.
#[derive(Debug, Default)]
struct RecipeOutput {
    target: Option<u32>,
    output: Option<u32>,
    output_quality: Option<u32>,
}

/// Classifier bound to one catalog snapshot.
pub struct EconItemClassifier<'c, N = CatalogNormalizer> {
    catalog: &'c CatalogSnapshot,
    options: ClassifierOptions,
    normalizer: N,
}

impl<'c> EconItemClassifier<'c> {
    pub fn new(catalog: &'c CatalogSnapshot, options: ClassifierOptions) -> Self {
        Self::with_normalizer(catalog, options, CatalogNormalizer)
    }
}

impl<'c, N: ItemNormalizer> EconItemClassifier<'c, N> {
    pub fn with_normalizer(catalog: &'c CatalogSnapshot, options: ClassifierOptions, normalizer: N) -> Self {
        Self {
            catalog,
            options,
            normalizer,
        }
    }

    /// Decode a listing of the game into a descriptor.
    pub fn classify(&self, listing: &RawListing) -> Result<ItemDescriptor, DecodeError> {
        self.decode(listing).map(|(descriptor, _)| descriptor)
    }

    /// Decode any listing into a SKU; listings of other games get a
    /// `"<type>: <market name>"` label instead.
    pub fn classify_listing(&self, listing: &RawListing) -> Result<ClassifiedListing, DecodeError> {
        if listing.appid != TF2_APP_ID {
            let sku = match (listing.item_type.as_deref(), listing.market_name.as_deref()) {
                (Some(kind), Some(name)) if !kind.is_empty() && !name.is_empty() => {
                    format!("{kind}: {name}")
                }
                _ => "unknown".to_string(),
            };
            return Ok(ClassifiedListing {
                sku,
                painted: false,
                descriptor: None,
            });
        }

        let (descriptor, painted) = self.decode(listing)?;
        Ok(ClassifiedListing {
            sku: sku::encode(&descriptor),
            painted,
            descriptor: Some(descriptor),
        })
    }

    fn decode(&self, listing: &RawListing) -> Result<(ItemDescriptor, bool), DecodeError> {
        if listing.appid != TF2_APP_ID {
            return Err(DecodeError::UnsupportedApp(listing.appid));
        }

        let name = listing
            .market_hash_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(DecodeError::MissingDisplayName)?;
        let tags = TagIndex::new(listing);

        let defindex = self
            .identifier(listing, &tags)
            .ok_or_else(|| DecodeError::MissingIdentifier(name.to_string()))?;
        let item_quality = self
            .quality(listing, &tags)
            .ok_or_else(|| DecodeError::UnknownQuality(name.to_string()))?;

        let mut cx = DecodeContext {
            listing,
            tags,
            name,
            defindex,
            quality: item_quality,
            killstreak: killstreak_tier(name),
            wear: None,
            paintkit: None,
            is_crate: false,
            painted: false,
            quality_override: None,
        };

        let mut item = ItemDescriptor::new(defindex, item_quality);
        item.craftable = !tags.has_description(NOT_CRAFTABLE);
        item.killstreak = cx.killstreak;
        item.australium = item_quality == quality::STRANGE && name.contains("Australium ");
        item.festive = !self.options.normalize_festivized && name.contains("Festivized ");
        item.effect = self.effect(&cx);

        cx.wear = wear_tier(&tags);
        item.wear = cx.wear;
        cx.paintkit = self.paint_kit(&cx);
        item.paintkit = cx.paintkit;
        item.quality2 = self.elevated_quality(&mut cx);

        item.crateseries = tables::crate_series(defindex, name);
        cx.is_crate = item.crateseries.is_some();

        item.paint = self.paint(&mut cx);
        item.craftnumber = self.craft_number(&cx);

        let recipe = self.recipe_output(&cx)?;
        item.target = recipe.target;
        item.output = recipe.output;
        item.output_quality = recipe.output_quality;
        if item.target.is_none() {
            item.target = self.target(&cx)?;
        }

        if let Some(q) = cx.quality_override {
            item.quality = q;
        }

        if cx.is_crate {
            return Ok((item, cx.painted));
        }

        let canonical = sku::decode(&sku::encode(&item))?;
        let item = self
            .normalizer
            .normalize(canonical, self.catalog)
            .ok_or_else(|| DecodeError::UnknownSku(name.to_string()))?;

        Ok((item, cx.painted))
    }

    /// Attribute bag first, then the wiki link's `id` parameter.
    fn identifier(&self, listing: &RawListing, tags: &TagIndex<'_>) -> Option<u32> {
        if let Some(defindex) = listing.app_data.as_ref().and_then(|a| a.def_index) {
            return Some(defindex);
        }

        let link = Url::parse(tags.action_link(WIKI_ACTION)?).ok()?;
        link.query_pairs()
            .find(|(key, _)| key == "id")
            .and_then(|(_, value)| value.parse().ok())
    }

    fn quality(&self, listing: &RawListing, tags: &TagIndex<'_>) -> Option<u32> {
        if let Some(q) = listing.app_data.as_ref().and_then(|a| a.quality) {
            return Some(q);
        }
        self.catalog.quality_id_by_name(tags.tag("Quality")?)
    }

    fn effect(&self, cx: &DecodeContext<'_>) -> Option<u32> {
        if cx.tags.has_description(CASE_GLOBAL_EFFECT) {
            return None;
        }

        let mut lines = cx.tags.descriptions_starting_with(UNUSUAL_EFFECT_PREFIX);
        let line = lines.next()?;
        if lines.next().is_some() {
            return None;
        }

        let name = line.strip_prefix(UNUSUAL_EFFECT_PREFIX)?.trim();
        self.catalog.effect_id_by_name(name)
    }

    fn paint_kit(&self, cx: &DecodeContext<'_>) -> Option<u32> {
        cx.wear?;

        let mut has_collection = false;
        let mut skin = None;
        for line in cx.tags.descriptions().iter().map(|d| d.value.as_str()) {
            if !has_collection && line.ends_with("Collection") {
                has_collection = true;
            } else if has_collection && (line.starts_with('✔') || line.starts_with('★')) {
                let mut chars = line.chars();
                chars.next();
                skin = Some(chars.as_str().replacen(" War Paint", "", 1).trim().to_string());
                break;
            }
        }

        let Some(skin) = skin else {
            return (has_collection && cx.name.contains(STOCK_SKIN_WEAPON)).then_some(0);
        };

        if skin.contains("Mk.I") {
            return self.catalog.skin_id_by_name(&skin);
        }

        // Skin lines repeat the weapon type ("Warhawk Flame Thrower")
        let skin = match self.catalog.item_by_defindex(cx.defindex) {
            Some(def) if !def.item_type_name.is_empty() => {
                skin.replacen(&def.item_type_name, "", 1).trim().to_string()
            }
            _ => skin,
        };
        self.catalog.skin_id_by_name(&skin)
    }

    /// Secondary quality; may schedule a primary quality override.
    fn elevated_quality(&self, cx: &mut DecodeContext<'_>) -> Option<u32> {
        let item_type = cx.item_type();
        let type_tag = cx.tags.tag("Type");

        let unusual_cosmetic = type_tag == Some("Cosmetic")
            && cx.quality == quality::UNUSUAL
            && item_type.contains("Strange")
            && item_type.contains("Points Scored");
        let strange_typed = item_type.starts_with("Strange") && cx.quality != quality::STRANGE;

        let triggered = cx.tags.has_description(STRANGE_CLOCK)
            || ((unusual_cosmetic || strange_typed)
                && !self.options.normalize_strange_as_second_quality);
        if !triggered {
            return None;
        }

        if cx.paintkit.is_some() {
            let graded = cx.tags.has_tag("Rarity", "Grade");
            if type_tag == Some("War Paint") || !graded {
                cx.quality_override = Some(quality::STRANGE);
                return None;
            }
            if cx.quality == quality::STRANGE {
                cx.quality_override = Some(quality::DECORATED);
            }
        }

        Some(quality::STRANGE)
    }

    fn paint(&self, cx: &mut DecodeContext<'_>) -> Option<u32> {
        if self.options.normalize_painted {
            return None;
        }

        if let Some(line) = cx.tags.colored_description(PAINT_COLOR_PREFIX, PAINT_COLOR_CODE) {
            cx.painted = true;
            let name = line.strip_prefix(PAINT_COLOR_PREFIX).unwrap_or(line).trim();
            return self.catalog.paint_by_name(name);
        }

        let icon = cx.listing.icon_url.as_deref().unwrap_or("");
        if !cx.item_type().contains("Tool") && icon.contains(LEGACY_PAINT_ICON) {
            cx.painted = true;
            return Some(LEGACY_PAINT_VALUE);
        }

        None
    }

    fn craft_number(&self, cx: &DecodeContext<'_>) -> Option<u32> {
        if cx.is_crate {
            return None;
        }
        if self
            .catalog
            .item_by_defindex(cx.defindex)
            .is_some_and(|def| def.item_class == "supply_crate")
        {
            return None;
        }

        let pattern = regex::Regex::new(r"#(\d+)$").ok()?;
        pattern
            .captures(cx.name.trim_end())?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }

    /// Kit Fabricators, Strangifier and Collector's Chemistry Sets.
    fn recipe_output(&self, cx: &DecodeContext<'_>) -> Result<RecipeOutput, DecodeError> {
        let Some(output) = cx
            .tags
            .position_of(RECIPE_OUTPUTS)
            .and_then(|index| cx.tags.description_at(index + 1))
        else {
            return Ok(RecipeOutput::default());
        };

        if cx.killstreak != 0 {
            let (phrase, output_defindex) = FABRICATOR_OUTPUTS[usize::from(cx.killstreak) - 1];
            let name = output.replacen(phrase, "", 1).replacen("Kit", "", 1);
            return Ok(RecipeOutput {
                target: Some(self.resolve_name(name.trim())?),
                output: Some(output_defindex),
                output_quality: Some(quality::UNIQUE),
            });
        }

        if output.contains(" Strangifier") {
            let name = output.replacen("Strangifier", "", 1);
            return Ok(RecipeOutput {
                target: Some(self.resolve_name(name.trim())?),
                output: Some(STRANGIFIER_OUTPUT),
                output_quality: Some(quality::UNIQUE),
            });
        }

        if output.contains("Collector's") {
            let name = output.replacen("Collector's", "", 1);
            return Ok(RecipeOutput {
                target: None,
                output: Some(self.resolve_name(name.trim())?),
                output_quality: Some(quality::COLLECTORS),
            });
        }

        Ok(RecipeOutput::default())
    }

    /// Target of strangifiers, killstreak kits and unusualifiers.
    fn target(&self, cx: &DecodeContext<'_>) -> Result<Option<u32>, DecodeError> {
        if cx.name.contains("Strangifier") {
            if let Some(target) = self.catalog.tool_target(cx.defindex) {
                return Ok(Some(target));
            }
            let name = cx.name.replacen("Strangifier", "", 1);
            return self.resolve_name(name.trim()).map(Some);
        }

        if KILLSTREAK_KITS.contains(&cx.defindex) {
            let (lead, trail) = BASIC_KIT_TRIM;
            let name = trim_chars(cx.name, lead, trail)
                .ok_or_else(|| DecodeError::UnresolvableTarget(cx.name.to_string()))?
                .replacen("Killstreak", "", 1);
            return self.resolve_name(name.trim()).map(Some);
        }

        if let Some((_, lead, trail)) = NAME_TRIMMED_KITS.iter().find(|(d, _, _)| *d == cx.defindex) {
            let name = trim_chars(cx.name, *lead, *trail)
                .ok_or_else(|| DecodeError::UnresolvableTarget(cx.name.to_string()))?;
            return self.resolve_name(name.trim()).map(Some);
        }

        Ok(None)
    }

    fn resolve_name(&self, name: &str) -> Result<u32, DecodeError> {
        self.catalog
            .item_by_name(name)
            .map(|def| def.defindex)
            .ok_or_else(|| DecodeError::UnresolvableTarget(name.to_string()))
    }
}

fn killstreak_tier(name: &str) -> u8 {
    KILLSTREAK_MARKERS
        .iter()
        .find(|(marker, _)| name.contains(marker))
        .map_or(0, |(_, tier)| *tier)
}

fn wear_tier(tags: &TagIndex<'_>) -> Option<u8> {
    let exterior = tags.tag("Exterior")?;
    WEARS
        .iter()
        .position(|w| *w == exterior)
        .and_then(|i| u8::try_from(i + 1).ok())
}

/// Drop `lead` chars from the front and `trail` chars from the back.
fn trim_chars(s: &str, lead: usize, trail: usize) -> Option<&str> {
    let count = s.chars().count();
    if lead + trail > count {
        return None;
    }
    let byte_at = |n: usize| s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    Some(&s[byte_at(lead)..byte_at(count - trail)])
}
