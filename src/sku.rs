// src/sku.rs

//! SKU string codec.
//!
//! A SKU is `defindex;quality` followed by optional attribute parts in a
//! fixed order:
//!
//! ```text
//! u<effect>  australium  uncraftable  w<wear>  pk<paintkit>  strange
//! kt-<tier>  td-<target>  festive  n<craftnumber>  c<crateseries>
//! od-<output>  oq-<outputQuality>  p<paint>
//! ```
//!
//! Zero values are omitted (except paint kit 0), and only a Strange (11)
//! secondary quality is representable.

use crate::error::DecodeError;
use crate::models::{ItemDescriptor, quality};

/// Encode a descriptor as a SKU string.
pub fn encode(item: &ItemDescriptor) -> String {
    let mut sku = format!("{};{}", item.defindex, item.quality);

    if let Some(effect) = nonzero(item.effect) {
        sku.push_str(&format!(";u{effect}"));
    }
    if item.australium {
        sku.push_str(";australium");
    }
    if !item.craftable {
        sku.push_str(";uncraftable");
    }
    if let Some(wear) = item.wear.filter(|w| *w != 0) {
        sku.push_str(&format!(";w{wear}"));
    }
    if let Some(paintkit) = item.paintkit {
        sku.push_str(&format!(";pk{paintkit}"));
    }
    if item.quality2 == Some(quality::STRANGE) {
        sku.push_str(";strange");
    }
    if item.killstreak != 0 {
        sku.push_str(&format!(";kt-{}", item.killstreak));
    }
    if let Some(target) = nonzero(item.target) {
        sku.push_str(&format!(";td-{target}"));
    }
    if item.festive {
        sku.push_str(";festive");
    }
    if let Some(number) = nonzero(item.craftnumber) {
        sku.push_str(&format!(";n{number}"));
    }
    if let Some(series) = nonzero(item.crateseries) {
        sku.push_str(&format!(";c{series}"));
    }
    if let Some(output) = nonzero(item.output) {
        sku.push_str(&format!(";od-{output}"));
    }
    if let Some(output_quality) = nonzero(item.output_quality) {
        sku.push_str(&format!(";oq-{output_quality}"));
    }
    if let Some(paint) = nonzero(item.paint) {
        sku.push_str(&format!(";p{paint}"));
    }

    sku
}

/// Decode a SKU string into a descriptor.
pub fn decode(sku: &str) -> Result<ItemDescriptor, DecodeError> {
    let malformed = || DecodeError::MalformedSku(sku.to_string());

    let mut parts = sku.split(';');
    let defindex = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(malformed)?;
    let item_quality = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(malformed)?;

    let mut item = ItemDescriptor::new(defindex, item_quality);

    for part in parts {
        match part {
            "" => {}
            "australium" => item.australium = true,
            "uncraftable" => item.craftable = false,
            // Tradability is not part of the descriptor
            "untradable" | "untradeable" => {}
            "festive" => item.festive = true,
            "strange" => item.quality2 = Some(quality::STRANGE),
            _ => apply_numeric(&mut item, part).ok_or_else(malformed)?,
        }
    }

    Ok(item)
}

/// Prefixed numeric parts. Longer prefixes come first so `pk` is not read as `p`.
fn apply_numeric(item: &mut ItemDescriptor, part: &str) -> Option<()> {
    if let Some(v) = part.strip_prefix("kt-") {
        item.killstreak = v.parse().ok()?;
    } else if let Some(v) = part.strip_prefix("td-") {
        item.target = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix("od-") {
        item.output = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix("oq-") {
        item.output_quality = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix("pk") {
        item.paintkit = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix('u') {
        item.effect = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix('w') {
        item.wear = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix('n') {
        item.craftnumber = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix('c') {
        item.crateseries = Some(v.parse().ok()?);
    } else if let Some(v) = part.strip_prefix('p') {
        item.paint = Some(v.parse().ok()?);
    } else {
        return None;
    }
    Some(())
}

fn nonzero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain_key() {
        assert_eq!(encode(&ItemDescriptor::new(5021, 6)), "5021;6");
    }

    #[test]
    fn test_encode_unusual() {
        let mut item = ItemDescriptor::new(30769, 5);
        item.effect = Some(108);
        assert_eq!(encode(&item), "30769;5;u108");
    }

    #[test]
    fn test_encode_field_order() {
        let mut item = ItemDescriptor::new(15141, 15);
        item.effect = Some(701);
        item.craftable = false;
        item.wear = Some(2);
        item.paintkit = Some(80);
        item.quality2 = Some(11);
        item.killstreak = 3;
        item.festive = true;
        assert_eq!(
            encode(&item),
            "15141;15;u701;uncraftable;w2;pk80;strange;kt-3;festive"
        );
    }

    #[test]
    fn test_encode_keeps_paintkit_zero() {
        let mut item = ItemDescriptor::new(15013, 15);
        item.wear = Some(3);
        item.paintkit = Some(0);
        assert_eq!(encode(&item), "15013;15;w3;pk0");
    }

    #[test]
    fn test_decode_recipe_parts() {
        let item = decode("20003;6;kt-3;td-205;od-6526;oq-6").unwrap();
        assert_eq!(item.killstreak, 3);
        assert_eq!(item.target, Some(205));
        assert_eq!(item.output, Some(6526));
        assert_eq!(item.output_quality, Some(6));
    }

    #[test]
    fn test_decode_distinguishes_pk_from_paint() {
        let item = decode("200;11;pk81;p12073019;n42;c30").unwrap();
        assert_eq!(item.paintkit, Some(81));
        assert_eq!(item.paint, Some(12073019));
        assert_eq!(item.craftnumber, Some(42));
        assert_eq!(item.crateseries, Some(30));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_err());
        assert!(decode("5021").is_err());
        assert!(decode("5021;6;bogus").is_err());
        assert!(decode("5021;null").is_err());
    }

    #[test]
    fn test_round_trip_representative_items() {
        let mut strange_unusual = ItemDescriptor::new(378, 5);
        strange_unusual.effect = Some(13);
        strange_unusual.quality2 = Some(11);

        let mut crate_item = ItemDescriptor::new(5022, 6);
        crate_item.crateseries = Some(1);

        let mut painted = ItemDescriptor::new(30769, 6);
        painted.paint = Some(3100495);
        painted.craftnumber = Some(7);

        for item in [ItemDescriptor::new(5021, 6), strange_unusual, crate_item, painted] {
            assert_eq!(decode(&encode(&item)).unwrap(), item);
        }
    }
}
