//! # Ordering
//!
//! Total order over menu items, grouped by category.
//!
//! ## Invariants
//! - Inside one category, `item_order` is exactly `1..N`
//! - Across categories, the distinct `category_order` values are exactly `1..C`
//! - Every item of a category carries the same `category_order`
//!
//! ## Renumbering
//! 1. [`group_by_category`] partitions the on-screen list, categories in first-seen order.
//! 2. [`assign_orders`] walks the groups and hands out `1, 2, 3, ...` for both fields.
//!
//! The result is a full renumbering, never a patch, so gaps and duplicates left behind
//! by deletes or failed batches disappear the next time it runs. It only covers the
//! items it is given: pass the complete list, otherwise the missing rows keep stale orders.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::item::{Item, OrderUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a Item>,
}

pub fn group_by_category(items: &[Item]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let position = *positions.entry(item.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: &item.category,
                items: Vec::new(),
            });

            groups.len() - 1
        });

        groups[position].items.push(item);
    }

    groups
}

/// Category-major batch: groups in order, items in order inside each group.
pub fn assign_orders(groups: &[CategoryGroup<'_>]) -> Vec<OrderUpdate> {
    let mut updates = Vec::with_capacity(groups.iter().map(|group| group.items.len()).sum());

    for (category_index, group) in groups.iter().enumerate() {
        for (item_index, item) in group.items.iter().enumerate() {
            updates.push(OrderUpdate {
                id: item.id,
                item_order: item_index as u32 + 1,
                category_order: category_index as u32 + 1,
            });
        }
    }

    updates
}

pub fn renumber(items: &[Item]) -> Vec<OrderUpdate> {
    assign_orders(&group_by_category(items))
}

/// Display order of `GET /api/items`.
pub fn sort_for_display(items: &mut [Item]) {
    items.sort_by_key(|item| (item.category_order, item.item_order, item.id));
}

/// Public menu sections, in display order.
pub fn sections(items: &mut [Item]) -> Vec<CategoryGroup<'_>> {
    sort_for_display(items);

    group_by_category(items)
}

/// Orders handed to a newly created item in `category`.
///
/// The item goes last inside its category. A new category goes after the
/// existing ones.
pub fn next_orders(existing: &[Item], category: &str) -> (u32, u32) {
    let in_category = existing
        .iter()
        .filter(|item| item.category == category)
        .count() as u32;

    let category_order = existing
        .iter()
        .find(|item| item.category == category)
        .map(|item| item.category_order)
        .unwrap_or_else(|| {
            let distinct: BTreeSet<&str> =
                existing.iter().map(|item| item.category.as_str()).collect();

            distinct.len() as u32 + 1
        });

    (in_category + 1, category_order)
}

pub fn apply_orders(items: &mut [Item], updates: &[OrderUpdate]) {
    let by_id: HashMap<_, _> = updates.iter().map(|update| (update.id, update)).collect();

    for item in items.iter_mut() {
        if let Some(update) = by_id.get(&item.id) {
            item.item_order = update.item_order;
            item.category_order = update.category_order;
        }
    }
}

/// Entries of `updates` that differ from what `items` already stores.
pub fn changed_orders(items: &[Item], updates: &[OrderUpdate]) -> Vec<OrderUpdate> {
    let current: HashMap<_, _> = items
        .iter()
        .map(|item| (item.id, OrderUpdate::from(item)))
        .collect();

    updates
        .iter()
        .filter(|update| current.get(&update.id) != Some(*update))
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderViolation {
    /// `item_order` inside the category is not `1..N`.
    ItemOrderGap { category: String, found: Vec<u32> },
    /// Items of one category disagree on `category_order`.
    CategoryOrderSplit { category: String, found: Vec<u32> },
    /// Distinct `category_order` values are not `1..C`.
    CategoryOrderGap { found: Vec<u32> },
}

pub fn audit(items: &[Item]) -> Vec<OrderViolation> {
    let mut violations = Vec::new();
    let mut category_orders: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();

    for group in group_by_category(items) {
        let mut found: Vec<u32> = group.items.iter().map(|item| item.item_order).collect();
        found.sort_unstable();

        if !is_dense(&found) {
            violations.push(OrderViolation::ItemOrderGap {
                category: group.category.to_string(),
                found,
            });
        }

        let shared: BTreeSet<u32> = group.items.iter().map(|item| item.category_order).collect();
        if shared.len() > 1 {
            violations.push(OrderViolation::CategoryOrderSplit {
                category: group.category.to_string(),
                found: shared.iter().copied().collect(),
            });
        }

        for order in shared {
            category_orders.entry(order).or_default().insert(group.category);
        }
    }

    let found: Vec<u32> = category_orders.keys().copied().collect();
    let shared_slot = category_orders.values().any(|categories| categories.len() > 1);

    if !is_dense(&found) || shared_slot {
        violations.push(OrderViolation::CategoryOrderGap { found });
    }

    violations
}

fn is_dense(sorted: &[u32]) -> bool {
    sorted
        .iter()
        .enumerate()
        .all(|(index, &order)| order == index as u32 + 1)
}
