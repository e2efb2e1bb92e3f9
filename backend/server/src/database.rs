//! # Items Table
//!
//! Hosted Postgres table behind Supabase's PostgREST endpoint.
//!
//! Core purpose is to hold the menu rows and apply reorder batches keyed by id.
//!
//! ## Requirements
//!
//! - One small table, a few hundred rows at most
//! - Reads return everything, already in display order
//! - Reorders touch `item_order` and `category_order` only
//!
//! ## Implementation
//!
//! - `GET /rest/v1/<table>?order=category_order.asc,item_order.asc,id.asc`
//! - Writes ask for `return=representation` so a missing id shows up as an empty array
//! - A reorder batch is one `PATCH ?id=eq.<id>` per row, applied in batch order
//! - Not atomic: a failure stops the batch, rows already written stay written
use std::time::Duration;

use async_trait::async_trait;
use menu::{Item, ItemId, ItemPatch, NewItem, OrderUpdate};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Supabase;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Item {0} not found")]
    NotFound(ItemId),

    #[error("Store rejected request with {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Batch stopped after {applied} rows: {source}")]
    PartialBatch {
        applied: usize,
        source: Box<StoreError>,
    },

    #[error("Store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid store credentials: {0}")]
    Credentials(#[from] InvalidHeaderValue),
}

/// Row as inserted, orders included.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewRow {
    #[serde(flatten)]
    pub item: NewItem,
    pub item_order: u32,
    pub category_order: u32,
}

/// Key-addressed persistence for menu items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError>;

    async fn insert_item(&self, row: NewRow) -> Result<Item, StoreError>;

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<(), StoreError>;

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;

    /// Applies the batch row by row and returns how many rows were written.
    async fn apply_orders(&self, batch: &[OrderUpdate]) -> Result<usize, StoreError>;
}

pub fn init_http(supabase: &Supabase, timeout: Duration) -> Result<Client, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(&supabase.service_key)?);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", supabase.service_key))?,
    );

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

pub struct PostgrestStore {
    http: Client,
    table_url: String,
}

impl PostgrestStore {
    pub fn new(http: Client, supabase: &Supabase, table: &str) -> Self {
        info!("Using items table {table} at {}", supabase.url);

        Self {
            http,
            table_url: format!("{}/rest/v1/{table}", supabase.url),
        }
    }

    fn by_id(&self, request: RequestBuilder, id: ItemId) -> RequestBuilder {
        request
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
    }

    async fn patch_row<T: Serialize + Sync>(&self, id: ItemId, body: &T) -> Result<(), StoreError> {
        let response = self
            .by_id(self.http.patch(&self.table_url), id)
            .json(body)
            .send()
            .await?;

        let rows: Vec<Item> = check_response(response).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct OrderColumns {
    item_order: u32,
    category_order: u32,
}

#[async_trait]
impl ItemStore for PostgrestStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let response = self
            .http
            .get(&self.table_url)
            .query(&[
                ("select", "*"),
                ("order", "category_order.asc.nullsfirst,item_order.asc.nullsfirst,id.asc"),
            ])
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        let response = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;

        let mut rows: Vec<Item> = check_response(response).await?.json().await?;
        rows.pop().ok_or(StoreError::NotFound(id))
    }

    async fn insert_item(&self, row: NewRow) -> Result<Item, StoreError> {
        let response = self
            .http
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&[&row])
            .send()
            .await?;

        let mut rows: Vec<Item> = check_response(response).await?.json().await?;

        rows.pop().ok_or(StoreError::Rejected {
            status: 200,
            message: "insert returned no row".to_string(),
        })
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<(), StoreError> {
        self.patch_row(id, patch).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let response = self
            .by_id(self.http.delete(&self.table_url), id)
            .send()
            .await?;

        let rows: Vec<Item> = check_response(response).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn apply_orders(&self, batch: &[OrderUpdate]) -> Result<usize, StoreError> {
        for (applied, update) in batch.iter().enumerate() {
            debug!("Reordering {update:?}");

            let columns = OrderColumns {
                item_order: update.item_order,
                category_order: update.category_order,
            };

            self.patch_row(update.id, &columns)
                .await
                .map_err(|e| StoreError::PartialBatch {
                    applied,
                    source: Box::new(e),
                })?;
        }

        Ok(batch.len())
    }
}

pub(crate) async fn check_response(response: Response) -> Result<Response, StoreError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}
