//! Backend of the Mhanna restaurant menu.
//!
//! A thin REST facade over one hosted table plus an image upload passthrough.
//!
//!
//!
//! # General Infrastructure
//! - Single axum process serving both the API and the static pages
//! - Items live in a Supabase table, reached through PostgREST
//! - Photos live in a public Supabase Storage bucket
//! - Without `SUPABASE_URL` everything is kept in memory, handy for local runs
//!
//!
//!
//! # Endpoints
//! - `GET /api/items`: every item, by `category_order` then `item_order`
//! - `POST /api/items`: create, orders assigned here
//! - `PUT /api/items/{id}`: partial edit, orders untouched unless sent
//! - `DELETE /api/items/{id}`: delete, no renumbering
//! - `PUT /api/items/reorder`: bare array of `{id, item_order, category_order}`
//! - `POST /api/admin/login`: static credential check
//! - `POST /api/upload`: multipart field `image`, returns `{url}`
//! - `GET /uploads/{name}`: photos held by the in-memory object store
//!
//!
//!
//! # Ordering Writes
//! Item creation and reorder batches both read the table, compute orders and write
//! them back. Inside one process those steps are serialized by [`state::State::order_lock`].
//! Two processes, or two admins racing across processes, can still interleave.
//!
//!
//!
//! # Setup
//!
//! Run locally with in-memory stores.
//! ```sh
//! ADMIN_PASSWORD=secret RUST_LOG=info cargo run -p mhanna
//! ```
//!
//! Run against Supabase.
//! ```sh
//! SUPABASE_URL=https://<project>.supabase.co \
//! SUPABASE_SERVICE_ROLE_KEY=... \
//! ADMIN_PASSWORD=secret cargo run -p mhanna
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod routes;
pub mod state;
pub mod storage;
pub mod utils;

use config::Config;
use routes::{
    create_item_handler, delete_item_handler, list_items_handler, login_handler, reorder_handler,
    update_item_handler, upload_handler, uploaded_file_handler,
};
use state::State;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config)?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/api/items", get(list_items_handler).post(create_item_handler))
        .route("/api/items/reorder", put(reorder_handler))
        .route(
            "/api/items/{id}",
            put(update_item_handler).delete(delete_item_handler),
        )
        .route("/api/admin/login", post(login_handler))
        .route(
            "/api/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/uploads/{name}", get(uploaded_file_handler));

    api.fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
