//! # Reorder Validation
//!
//! Sanitizes a proposed reorder batch before it reaches the store.
//!
//! A drag gesture can leave placeholder rows on screen that have no durable id yet.
//! Those entries are dropped and the rest of the batch goes through. Nothing in here
//! fails on a bad entry; only a payload that is not an array at all is rejected.
//!
//! ## Coercion
//! - `id`: positive integer, either a JSON number or a numeric string
//! - `item_order`, `category_order`: positive integer, number, integral float or numeric string
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::item::{ItemId, OrderUpdate};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Reorder payload must be an array")]
    NotAnArray,
}

pub fn parse_batch(payload: &Value) -> Result<Vec<OrderUpdate>, ValidationError> {
    let entries = payload.as_array().ok_or(ValidationError::NotAnArray)?;

    Ok(sanitize(entries))
}

pub fn sanitize(entries: &[Value]) -> Vec<OrderUpdate> {
    entries
        .iter()
        .filter_map(|entry| {
            let update = sanitize_entry(entry);

            if update.is_none() {
                debug!("Dropping reorder entry {entry}");
            }

            update
        })
        .collect()
}

/// Typed counterpart of [`sanitize`], for batches computed locally.
pub fn retain_persistable(updates: Vec<OrderUpdate>) -> Vec<OrderUpdate> {
    updates
        .into_iter()
        .filter(|update| update.id != 0 && update.item_order != 0 && update.category_order != 0)
        .collect()
}

fn sanitize_entry(entry: &Value) -> Option<OrderUpdate> {
    Some(OrderUpdate {
        id: positive(entry.get("id")?)?,
        item_order: positive(entry.get("item_order")?)?.try_into().ok()?,
        category_order: positive(entry.get("category_order")?)?.try_into().ok()?,
    })
}

fn positive(value: &Value) -> Option<ItemId> {
    let parsed = match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && *float >= 0.0 && *float <= u64::MAX as f64)
                .map(|float| float as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }?;

    (parsed > 0).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_drops_placeholder_ids() {
        let payload = json!([
            { "id": "5", "item_order": 2, "category_order": 1 },
            { "id": null, "item_order": 1, "category_order": 1 },
            { "id": "abc", "item_order": 3, "category_order": 1 },
        ]);

        assert_eq!(
            parse_batch(&payload).unwrap(),
            [OrderUpdate { id: 5, item_order: 2, category_order: 1 }]
        );
    }

    #[test]
    fn test_drops_missing_and_zero_ids() {
        let payload = json!([
            { "item_order": 1, "category_order": 1 },
            { "id": 0, "item_order": 1, "category_order": 1 },
            { "id": "", "item_order": 1, "category_order": 1 },
            { "id": -3, "item_order": 1, "category_order": 1 },
        ]);

        assert!(parse_batch(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_coerces_orders() {
        let payload = json!([
            { "id": 12, "item_order": "3", "category_order": 2.0 },
            { "id": " 13 ", "item_order": 1, "category_order": "2" },
        ]);

        assert_eq!(
            parse_batch(&payload).unwrap(),
            [
                OrderUpdate { id: 12, item_order: 3, category_order: 2 },
                OrderUpdate { id: 13, item_order: 1, category_order: 2 },
            ]
        );
    }

    #[test]
    fn test_drops_uncoercible_orders() {
        let payload = json!([
            { "id": 1, "item_order": 1 },
            { "id": 2, "item_order": "first", "category_order": 1 },
            { "id": 3, "item_order": 1.5, "category_order": 1 },
            { "id": 4, "item_order": 1, "category_order": 0 },
        ]);

        assert!(parse_batch(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_array() {
        assert_eq!(
            parse_batch(&json!({ "updates": [] })),
            Err(ValidationError::NotAnArray)
        );
        assert_eq!(parse_batch(&json!("[]")), Err(ValidationError::NotAnArray));
    }

    #[test]
    fn test_retain_persistable() {
        let updates = vec![
            OrderUpdate { id: 0, item_order: 1, category_order: 1 },
            OrderUpdate { id: 8, item_order: 2, category_order: 1 },
        ];

        assert_eq!(
            retain_persistable(updates),
            [OrderUpdate { id: 8, item_order: 2, category_order: 1 }]
        );
    }
}
