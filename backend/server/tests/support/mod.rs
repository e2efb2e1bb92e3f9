use std::{net::SocketAddr, sync::Arc};

use menu::Item;
use server::{
    build_router,
    config::Config,
    memory::{MemoryObjects, MemoryStore},
    state::State,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "grill-master";

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub objects: Arc<MemoryObjects>,
}

pub async fn spawn_server(store: MemoryStore) -> TestServer {
    let store = Arc::new(store);
    let objects = Arc::new(MemoryObjects::new());
    let state = State::with_stores(
        Config::local(ADMIN_USER, ADMIN_PASS),
        store.clone(),
        objects.clone(),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    TestServer {
        addr,
        store,
        objects,
    }
}

pub fn item(id: u64, category: &str, item_order: u32, category_order: u32) -> Item {
    Item {
        id,
        name: format!("item {id}"),
        description: String::new(),
        category: category.to_string(),
        price: 100000.0,
        image_url: None,
        item_order,
        category_order,
    }
}

pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (u16, String) {
    let body = body.map(|b| ("application/json", b.as_bytes()));
    send_raw_with_type(addr, method, path, body).await
}

pub async fn send_raw_with_type(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<(&str, &[u8])>,
) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some((content_type, payload)) = body {
        req.push_str(&format!("Content-Type: {content_type}\r\n"));
        req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    req.push_str("\r\n");

    let mut bytes = req.into_bytes();
    if let Some((_, payload)) = body {
        bytes.extend_from_slice(payload);
    }
    stream.write_all(&bytes).await.expect("write request");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");
    let response = String::from_utf8_lossy(&response).to_string();
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, body.to_string())
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("json body")
}
