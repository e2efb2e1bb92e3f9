use std::sync::LazyLock;

use menu::{ItemId, ItemPatch, NewItem, OrderUpdate, validate::parse_batch};
use regex::Regex;
use serde_json::Value;

use crate::error::AppError::{self, MalformedPayload};

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Trims and collapses inner whitespace, so "Cold  Drinks " and "Cold Drinks" group together.
pub fn sanitize(input: &str) -> String {
    SPACES.replace_all(input.trim(), " ").into_owned()
}

pub fn parse_id(raw: &str) -> Result<ItemId, AppError> {
    raw.trim()
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| MalformedPayload(format!("invalid item id: {raw}")))
}

pub fn clean_new_item(mut item: NewItem) -> Result<NewItem, AppError> {
    item.name = required("name", &item.name)?;
    item.category = required("category", &item.category)?;
    item.description = item.description.trim().to_string();
    item.image_url = item.image_url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty());
    check_price(item.price)?;

    Ok(item)
}

pub fn clean_patch(mut patch: ItemPatch) -> Result<ItemPatch, AppError> {
    if let Some(name) = &patch.name {
        patch.name = Some(required("name", name)?);
    }
    if let Some(category) = &patch.category {
        patch.category = Some(required("category", category)?);
    }
    if let Some(description) = &patch.description {
        patch.description = Some(description.trim().to_string());
    }
    if let Some(price) = patch.price {
        check_price(price)?;
    }
    if patch.item_order == Some(0) || patch.category_order == Some(0) {
        return Err(MalformedPayload("orders start at 1".to_string()));
    }

    Ok(patch)
}

pub fn get_updates_from_body(body: &Value) -> Result<Vec<OrderUpdate>, AppError> {
    Ok(parse_batch(body)?)
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = sanitize(value);

    if value.is_empty() {
        return Err(MalformedPayload(format!("{field} must not be empty")));
    }

    Ok(value)
}

fn check_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(MalformedPayload(format!("invalid price: {price}")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  Cold   Drinks "), "Cold Drinks");
        assert_eq!(sanitize("مشاوي\t\tلحم"), "مشاوي لحم");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("17").unwrap(), 17);
        assert!(parse_id("0").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("-2").is_err());
    }

    #[test]
    fn test_clean_new_item() {
        let item: NewItem = serde_json::from_value(json!({
            "name": "  Chicken   Tawook ",
            "category": " Grill ",
            "price": "300000",
            "image_url": "  ",
        }))
        .unwrap();

        let cleaned = clean_new_item(item).unwrap();
        assert_eq!(cleaned.name, "Chicken Tawook");
        assert_eq!(cleaned.category, "Grill");
        assert_eq!(cleaned.image_url, None);
    }

    #[test]
    fn test_clean_new_item_rejects() {
        let blank: NewItem =
            serde_json::from_value(json!({ "name": " ", "category": "Grill", "price": 1 }))
                .unwrap();
        let negative: NewItem =
            serde_json::from_value(json!({ "name": "Tea", "category": "Drinks", "price": -1 }))
                .unwrap();

        assert!(clean_new_item(blank).is_err());
        assert!(clean_new_item(negative).is_err());
    }

    #[test]
    fn test_clean_patch_rejects_zero_order() {
        let patch = ItemPatch {
            item_order: Some(0),
            ..ItemPatch::default()
        };

        assert!(clean_patch(patch).is_err());
    }
}
