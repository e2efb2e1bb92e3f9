//! In-process stores, used when no Supabase project is configured and in tests.
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use menu::{Item, ItemId, ItemPatch, OrderUpdate, ordering::sort_for_display};
use tokio::sync::RwLock;

use crate::{
    database::{ItemStore, NewRow, StoreError},
    storage::{ObjectStore, StoredObject},
};

#[derive(Default)]
struct Table {
    next_id: ItemId,
    rows: Vec<Item>,
}

#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
    order_batches: AtomicUsize,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|item| item.id).max().unwrap_or(0);

        Self {
            table: RwLock::new(Table {
                next_id,
                rows: items,
            }),
            ..Self::default()
        }
    }

    /// Every reorder batch fails after writing `rows` rows.
    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    /// How many times [`ItemStore::apply_orders`] was called.
    pub fn order_batches(&self) -> usize {
        self.order_batches.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Item> {
        self.table.read().await.rows.clone()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let mut rows = self.table.read().await.rows.clone();
        sort_for_display(&mut rows);

        Ok(rows)
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        self.table
            .read()
            .await
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert_item(&self, row: NewRow) -> Result<Item, StoreError> {
        let mut table = self.table.write().await;
        table.next_id += 1;

        let item = Item {
            id: table.next_id,
            name: row.item.name,
            description: row.item.description,
            category: row.item.category,
            price: row.item.price,
            image_url: row.item.image_url,
            item_order: row.item_order,
            category_order: row.category_order,
        };
        table.rows.push(item.clone());

        Ok(item)
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;

        patch.apply_to(row);
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);

        if table.rows.len() == before {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn apply_orders(&self, batch: &[OrderUpdate]) -> Result<usize, StoreError> {
        self.order_batches.fetch_add(1, Ordering::SeqCst);
        let mut table = self.table.write().await;

        for (applied, update) in batch.iter().enumerate() {
            if self.fail_after == Some(applied) {
                return Err(StoreError::PartialBatch {
                    applied,
                    source: Box::new(StoreError::Rejected {
                        status: 503,
                        message: "write budget exhausted".to_string(),
                    }),
                });
            }

            let row = table
                .rows
                .iter_mut()
                .find(|row| row.id == update.id)
                .ok_or_else(|| StoreError::PartialBatch {
                    applied,
                    source: Box::new(StoreError::NotFound(update.id)),
                })?;

            row.item_order = update.item_order;
            row.category_order = update.category_order;
        }

        Ok(batch.len())
    }
}

#[derive(Default)]
pub struct MemoryObjects {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Objects are served back by the `/uploads/{name}` route.
#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put(&self, object: StoredObject) -> Result<String, StoreError> {
        let mut objects = self.objects.write().await;

        if objects.contains_key(&object.name) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("{} already exists", object.name),
            });
        }

        let url = format!("/uploads/{}", object.name);
        objects.insert(object.name.clone(), object);

        Ok(url)
    }

    async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.objects.read().await.get(name).cloned())
    }
}
