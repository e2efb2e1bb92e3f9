//! # Drag and Drop Reordering
//!
//! Admin-side state for one drag gesture over the item table.
//!
//! ## Flow
//! 1. **Idle**: nothing in progress
//! 2. **Dragging**: a source row is captured, the hovered row is tracked, nothing is persisted
//! 3. **Dropped**: the source is spliced before or after the target
//! 4. **Validating**: rows without a durable id are left out, they hold no slot
//! 5. **Recomputing**: grouping and renumbering over the new on-screen order
//! 6. **Persisting**: the batch goes out in one call, further drags are refused
//! 7. **Idle**: the list is replaced by a fresh fetch, on success and on failure
//!
//! Steps 3 to 5 run synchronously inside [`ReorderSession::drop_on`].
use thiserror::Error;

use crate::{
    item::{Item, ItemId, OrderUpdate},
    ordering::{renumber, sort_for_display},
    validate::retain_persistable,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReorderError {
    #[error("A reorder is already being saved")]
    InFlight,

    #[error("No drag in progress")]
    NotDragging,

    #[error("Unknown item {0}")]
    UnknownItem(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

impl DropPosition {
    /// Vertical midpoint split of the target row.
    pub fn from_pointer(pointer_y: f64, row_top: f64, row_height: f64) -> Self {
        if pointer_y - row_top < row_height / 2.0 {
            DropPosition::Before
        } else {
            DropPosition::After
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderState {
    Idle,
    Dragging {
        source: ItemId,
        hover: Option<ItemId>,
    },
    Persisting,
}

#[derive(Debug, Clone)]
pub struct ReorderSession {
    items: Vec<Item>,
    state: ReorderState,
}

impl ReorderSession {
    pub fn new(mut items: Vec<Item>) -> Self {
        sort_for_display(&mut items);

        Self {
            items,
            state: ReorderState::Idle,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn state(&self) -> ReorderState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == ReorderState::Persisting
    }

    pub fn begin_drag(&mut self, source: ItemId) -> Result<(), ReorderError> {
        if self.is_busy() {
            return Err(ReorderError::InFlight);
        }

        self.position(source)?;
        self.state = ReorderState::Dragging {
            source,
            hover: None,
        };

        Ok(())
    }

    pub fn hover(&mut self, target: ItemId) -> Result<(), ReorderError> {
        let ReorderState::Dragging { source, .. } = self.state else {
            return Err(ReorderError::NotDragging);
        };

        self.position(target)?;
        self.state = ReorderState::Dragging {
            source,
            hover: Some(target),
        };

        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        if let ReorderState::Dragging { .. } = self.state {
            self.state = ReorderState::Idle;
        }
    }

    /// Splices the dragged item next to `target` and returns the batch to persist.
    ///
    /// A non-empty batch moves the session to `Persisting` until [`Self::finish`].
    /// An empty one leaves it idle; there is nothing to send.
    pub fn drop_on(
        &mut self,
        target: ItemId,
        position: DropPosition,
    ) -> Result<Vec<OrderUpdate>, ReorderError> {
        let ReorderState::Dragging { source, .. } = self.state else {
            return Err(if self.is_busy() {
                ReorderError::InFlight
            } else {
                ReorderError::NotDragging
            });
        };

        let from = self.position(source)?;
        self.position(target)?;

        if source != target {
            let moved = self.items.remove(from);
            let anchor = self.position(target)?;

            let at = match position {
                DropPosition::Before => anchor,
                DropPosition::After => anchor + 1,
            };
            self.items.insert(at, moved);
        }

        let durable: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.id != 0)
            .cloned()
            .collect();
        let batch = retain_persistable(renumber(&durable));

        self.state = if batch.is_empty() {
            ReorderState::Idle
        } else {
            ReorderState::Persisting
        };

        Ok(batch)
    }

    /// Replaces the local list with the authoritative one and returns to idle.
    pub fn finish(&mut self, refreshed: Vec<Item>) {
        *self = Self::new(refreshed);
    }

    fn position(&self, id: ItemId) -> Result<usize, ReorderError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ReorderError::UnknownItem(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, category: &str, item_order: u32, category_order: u32) -> Item {
        Item {
            id,
            name: format!("item {id}"),
            description: String::new(),
            category: category.to_string(),
            price: 1000.0,
            image_url: None,
            item_order,
            category_order,
        }
    }

    fn session() -> ReorderSession {
        ReorderSession::new(vec![
            item(1, "Drinks", 1, 1),
            item(2, "Food", 1, 2),
            item(3, "Drinks", 2, 1),
        ])
    }

    #[test]
    fn test_midpoint_rule() {
        assert_eq!(DropPosition::from_pointer(105.0, 100.0, 40.0), DropPosition::Before);
        assert_eq!(DropPosition::from_pointer(120.0, 100.0, 40.0), DropPosition::After);
        assert_eq!(DropPosition::from_pointer(139.0, 100.0, 40.0), DropPosition::After);
    }

    #[test]
    fn test_new_sorts_for_display() {
        let ids: Vec<u64> = session().items().iter().map(|item| item.id).collect();

        assert_eq!(ids, [1, 3, 2]);
    }

    #[test]
    fn test_drop_before_first() {
        let mut session = ReorderSession::new(vec![]);
        session.finish(vec![
            item(1, "Drinks", 0, 0),
            item(2, "Food", 0, 0),
            item(3, "Drinks", 0, 0),
        ]);
        // legacy rows without orders keep their fetch order: 1, 2, 3

        session.begin_drag(3).unwrap();
        session.hover(1).unwrap();
        let batch = session.drop_on(1, DropPosition::Before).unwrap();

        assert_eq!(
            batch,
            [
                OrderUpdate { id: 3, item_order: 1, category_order: 1 },
                OrderUpdate { id: 1, item_order: 2, category_order: 1 },
                OrderUpdate { id: 2, item_order: 1, category_order: 2 },
            ]
        );
        assert_eq!(session.state(), ReorderState::Persisting);
    }

    #[test]
    fn test_drop_moves_whole_category_first() {
        let mut session = session();

        session.begin_drag(2).unwrap();
        let batch = session.drop_on(1, DropPosition::Before).unwrap();

        assert_eq!(
            batch,
            [
                OrderUpdate { id: 2, item_order: 1, category_order: 1 },
                OrderUpdate { id: 1, item_order: 1, category_order: 2 },
                OrderUpdate { id: 3, item_order: 2, category_order: 2 },
            ]
        );
    }

    #[test]
    fn test_in_flight_guard() {
        let mut session = session();

        session.begin_drag(3).unwrap();
        session.drop_on(1, DropPosition::After).unwrap();

        assert_eq!(session.begin_drag(1), Err(ReorderError::InFlight));
        assert_eq!(session.drop_on(1, DropPosition::After), Err(ReorderError::InFlight));

        session.finish(vec![item(1, "Drinks", 1, 1)]);
        assert_eq!(session.state(), ReorderState::Idle);
        assert!(session.begin_drag(1).is_ok());
    }

    #[test]
    fn test_drop_onto_itself_renumbers_in_place() {
        let mut session = session();

        session.begin_drag(1).unwrap();
        let batch = session.drop_on(1, DropPosition::After).unwrap();

        assert_eq!(batch.len(), 3);
        let ids: Vec<u64> = session.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 3, 2]);
    }

    #[test]
    fn test_placeholder_rows_never_persist() {
        let mut session = ReorderSession::new(vec![item(0, "Drinks", 0, 0)]);

        session.begin_drag(0).unwrap();
        let batch = session.drop_on(0, DropPosition::Before).unwrap();

        assert!(batch.is_empty());
        assert_eq!(session.state(), ReorderState::Idle);
    }

    #[test]
    fn test_placeholder_category_takes_no_slot() {
        let mut session = ReorderSession::new(vec![
            item(0, "Draft", 0, 0),
            item(1, "Drinks", 1, 1),
            item(2, "Drinks", 2, 1),
        ]);

        session.begin_drag(2).unwrap();
        let batch = session.drop_on(1, DropPosition::Before).unwrap();

        assert_eq!(
            batch,
            [
                OrderUpdate { id: 2, item_order: 1, category_order: 1 },
                OrderUpdate { id: 1, item_order: 2, category_order: 1 },
            ]
        );
    }

    #[test]
    fn test_placeholder_in_category_takes_no_slot() {
        let mut session = ReorderSession::new(vec![
            item(1, "Drinks", 1, 1),
            item(0, "Drinks", 2, 1),
            item(2, "Drinks", 3, 1),
        ]);

        session.begin_drag(2).unwrap();
        let batch = session.drop_on(0, DropPosition::Before).unwrap();

        assert_eq!(
            batch,
            [
                OrderUpdate { id: 1, item_order: 1, category_order: 1 },
                OrderUpdate { id: 2, item_order: 2, category_order: 1 },
            ]
        );
    }

    #[test]
    fn test_unknown_and_idle_errors() {
        let mut session = session();

        assert_eq!(session.hover(1), Err(ReorderError::NotDragging));
        assert_eq!(session.begin_drag(42), Err(ReorderError::UnknownItem(42)));

        session.begin_drag(1).unwrap();
        assert_eq!(
            session.drop_on(42, DropPosition::Before),
            Err(ReorderError::UnknownItem(42))
        );

        session.cancel_drag();
        assert_eq!(session.state(), ReorderState::Idle);
    }
}
