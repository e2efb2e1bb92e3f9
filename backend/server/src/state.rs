use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use super::{
    config::Config,
    database::{ItemStore, PostgrestStore, StoreError, init_http},
    memory::{MemoryObjects, MemoryStore},
    storage::{ObjectStore, SupabaseStorage},
};

pub struct State {
    pub config: Config,
    pub items: Arc<dyn ItemStore>,
    pub images: Arc<dyn ObjectStore>,
    /// Serializes the read-compute-write of item creation and reorder batches.
    pub order_lock: Mutex<()>,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let (items, images): (Arc<dyn ItemStore>, Arc<dyn ObjectStore>) = match &config.supabase
        {
            Some(supabase) => {
                let http = init_http(supabase, config.upstream_timeout)?;

                (
                    Arc::new(PostgrestStore::new(http.clone(), supabase, &config.items_table)),
                    Arc::new(SupabaseStorage::new(http, supabase, &config.images_bucket)),
                )
            }
            None => {
                warn!("SUPABASE_URL not set, items are kept in memory and lost on restart");

                (Arc::new(MemoryStore::new()), Arc::new(MemoryObjects::new()))
            }
        };

        Ok(Self::with_stores(config, items, images))
    }

    pub fn with_stores(
        config: Config,
        items: Arc<dyn ItemStore>,
        images: Arc<dyn ObjectStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            items,
            images,
            order_lock: Mutex::new(()),
        })
    }
}
