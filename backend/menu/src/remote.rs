//! # Remote
//!
//! Typed client for the menu REST API, used by the admin side.
//!
//! [`MenuClient::persist_drop`] runs the whole reorder round trip: splice, renumber,
//! validate, one `PUT /api/items/reorder`, then a fresh `GET /api/items` that becomes
//! the new on-screen state. The fetch happens on failure too, so the table always shows
//! what the store holds rather than the optimistic local order.
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    drag::{DropPosition, ReorderSession},
    error::MenuError,
    item::{Item, ItemId, ItemPatch, NewItem, OrderUpdate},
};

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ReorderReply {
    #[serde(default)]
    updated: usize,
}

#[derive(Deserialize, Default)]
struct ErrorReply {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct MenuClient {
    http: Client,
    base_url: String,
}

impl MenuClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn fetch_items(&self) -> Result<Vec<Item>, MenuError> {
        let response = self.http.get(self.url("/api/items")).send().await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn create_item(&self, item: &NewItem) -> Result<Item, MenuError> {
        let response = self.http.post(self.url("/api/items")).json(item).send().await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<(), MenuError> {
        let response = self
            .http
            .put(self.url(&format!("/api/items/{id}")))
            .json(patch)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Leaves sibling orders untouched; a gap stays where the item was.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), MenuError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/items/{id}")))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    pub async fn reorder(&self, batch: &[OrderUpdate]) -> Result<usize, MenuError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let response = self
            .http
            .put(self.url("/api/items/reorder"))
            .json(batch)
            .send()
            .await?;

        let reply: ReorderReply = check(response).await?.json().await?;
        Ok(reply.updated)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), MenuError> {
        let response = self
            .http
            .post(self.url("/api/admin/login"))
            .json(&Credentials { username, password })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    pub async fn load_session(&self) -> Result<ReorderSession, MenuError> {
        Ok(ReorderSession::new(self.fetch_items().await?))
    }

    /// Drops the dragged item next to `target` and persists the resulting orders.
    ///
    /// Returns how many rows the server updated, `0` when nothing needed sending.
    pub async fn persist_drop(
        &self,
        session: &mut ReorderSession,
        target: ItemId,
        position: DropPosition,
    ) -> Result<usize, MenuError> {
        let batch = session.drop_on(target, position)?;

        if batch.is_empty() {
            return Ok(0);
        }

        info!("Saving order of {} items", batch.len());
        let saved = self.reorder(&batch).await;

        match self.fetch_items().await {
            Ok(items) => session.finish(items),
            Err(e) => {
                warn!("Failed to refresh items after reorder: {e}");
                let local = session.items().to_vec();
                session.finish(local);
            }
        }

        saved
    }
}

async fn check(response: Response) -> Result<Response, MenuError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let reply: ErrorReply = response.json().await.unwrap_or_default();
    let message = reply
        .error
        .or(reply.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    if status == StatusCode::UNAUTHORIZED {
        return Err(MenuError::Unauthorized(message));
    }

    Err(MenuError::Rejected { status, message })
}
