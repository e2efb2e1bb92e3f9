use std::sync::Arc;

use axum::{
    Json,
    extract::{self, Multipart, Path, multipart::MultipartRejection, rejection::JsonRejection},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use menu::{
    Item, ItemPatch, NewItem,
    ordering::{next_orders, sort_for_display},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    database::NewRow,
    error::AppError::{self, MalformedPayload},
    state::State,
    storage::{self, DEFAULT_CONTENT_TYPE, StoredObject, object_name},
    utils::{clean_new_item, clean_patch, get_updates_from_body, parse_id},
};

type AppState = extract::State<Arc<State>>;

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn list_items_handler(
    extract::State(state): AppState,
) -> Result<Json<Vec<Item>>, AppError> {
    let mut items = state.items.list_items().await?;
    sort_for_display(&mut items);

    Ok(Json(items))
}

pub async fn create_item_handler(
    extract::State(state): AppState,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<Json<Item>, AppError> {
    let Json(item) = payload?;
    let item = clean_new_item(item)?;

    let _guard = state.order_lock.lock().await;

    let existing = state.items.list_items().await?;
    let (item_order, category_order) = next_orders(&existing, &item.category);

    let created = state
        .items
        .insert_item(NewRow {
            item,
            item_order,
            category_order,
        })
        .await?;

    info!(
        "Created item {} in {} at ({item_order}, {category_order})",
        created.id, created.category
    );

    Ok(Json(created))
}

pub async fn update_item_handler(
    extract::State(state): AppState,
    Path(raw_id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id)?;
    let Json(patch) = payload?;
    let patch = clean_patch(patch)?;

    if patch.is_empty() {
        state.items.get_item(id).await?;
        return Ok(success());
    }

    state.items.update_item(id, &patch).await?;
    info!("Updated item {id}");

    Ok(success())
}

/// Siblings keep their orders; the next reorder closes the gap.
pub async fn delete_item_handler(
    extract::State(state): AppState,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id)?;

    state.items.delete_item(id).await?;
    info!("Deleted item {id}");

    Ok(success())
}

pub async fn reorder_handler(
    extract::State(state): AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = payload?;
    let batch = get_updates_from_body(&body)?;

    if batch.is_empty() {
        info!("Reorder batch empty after validation, nothing to save");
        return Ok(Json(json!({ "success": true, "updated": 0 })));
    }

    let _guard = state.order_lock.lock().await;
    let updated = state.items.apply_orders(&batch).await?;

    info!("Reordered {updated} items");
    Ok(Json(json!({ "success": true, "updated": updated })))
}

pub async fn login_handler(
    extract::State(state): AppState,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(credentials) = payload?;
    let config = &state.config;

    if config.admin_password.is_empty()
        || credentials.username.trim() != config.admin_username
        || credentials.password.trim() != config.admin_password
    {
        return Err(AppError::Unauthorized);
    }

    info!("Admin {} logged in", config.admin_username);
    Ok(success())
}

pub async fn upload_handler(
    extract::State(state): AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MalformedPayload(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let name = object_name(field.file_name());
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MalformedPayload(e.body_text()))?;

        if bytes.is_empty() {
            return Err(MalformedPayload("image is empty".to_string()));
        }

        let url = state
            .images
            .put(StoredObject {
                name: name.clone(),
                content_type,
                bytes,
            })
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        info!("Uploaded {name}");
        return Ok(Json(json!({ "url": url })));
    }

    Err(MalformedPayload("missing image field".to_string()))
}

/// Serves photos kept by the in-memory object store.
pub async fn uploaded_file_handler(
    extract::State(state): AppState,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let object = state
        .images
        .get(&name)
        .await?
        .ok_or_else(|| AppError::MissingFile(name))?;

    let headers = [
        (CONTENT_TYPE, object.content_type),
        (CACHE_CONTROL, format!("max-age={}", storage::CACHE_CONTROL)),
    ];

    Ok((headers, object.bytes).into_response())
}
