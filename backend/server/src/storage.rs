//! # Object Storage
//!
//! Menu photos live in a public Supabase Storage bucket.
//!
//!
//!
//! ## Upload
//! - The admin form posts the file as multipart field `image`
//! - The server forwards the bytes to `/storage/v1/object/<bucket>/<name>`
//! - The response carries the public URL, which the form then saves as `image_url`
//!
//!
//!
//! ## Naming
//! `<unix millis>-<original name>`, with the original name reduced to ASCII letters,
//! digits, dots, dashes and underscores. Uploads never overwrite: a name clash is an error
//! rather than a silently replaced photo.
use std::sync::LazyLock;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use regex::Regex;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::info;

use crate::{
    config::Supabase,
    database::{StoreError, check_response},
};

pub const CACHE_CONTROL: &str = "3600";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static UNSAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the object and returns its public URL. An existing name is never replaced.
    async fn put(&self, object: StoredObject) -> Result<String, StoreError>;

    async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError>;
}

pub struct SupabaseStorage {
    http: Client,
    base_url: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(http: Client, supabase: &Supabase, bucket: &str) -> Self {
        info!("Using storage bucket {bucket}");

        Self {
            http,
            base_url: format!("{}/storage/v1/object", supabase.url),
            bucket: bucket.to_string(),
        }
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}/public/{}/{name}", self.base_url, self.bucket)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(&self, object: StoredObject) -> Result<String, StoreError> {
        let response = self
            .http
            .post(format!("{}/{}/{}", self.base_url, self.bucket, object.name))
            .header(CONTENT_TYPE, object.content_type)
            .header("cache-control", format!("max-age={CACHE_CONTROL}"))
            .header("x-upsert", "false")
            .body(object.bytes)
            .send()
            .await?;

        check_response(response).await?;

        Ok(self.public_url(&object.name))
    }

    async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError> {
        let response = self.http.get(self.public_url(name)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_response(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(Some(StoredObject {
            name: name.to_string(),
            content_type,
            bytes: response.bytes().await?,
        }))
    }
}

pub fn object_name(original: Option<&str>) -> String {
    let cleaned = UNSAFE_NAME
        .replace_all(original.unwrap_or_default().trim(), "_")
        .into_owned();
    let cleaned = cleaned.trim_matches('_');

    let stamp = Utc::now().timestamp_millis();
    if cleaned.is_empty() {
        format!("{stamp}-image")
    } else {
        format!("{stamp}-{cleaned}")
    }
}
