//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: [`MockApi`] serves the stock and
//! product endpoints from memory on an ephemeral local port, and carts are
//! stored in a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! let api = MockApi::start().await;
//! api.set_stock(1, 5);
//! api.set_product(1, "Shoe", 100);
//!
//! let ctx = TestContext::new(&api);
//! ctx.store.add_product(ProductId::new(1)).await?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::{
    ApiClient, ApiConfig, CartServices, CartStore, DEFAULT_STORAGE_KEY, FileStorage, Notice, Notifier,
};
use serde_json::{Value, json};
use url::Url;

/// In-memory stand-in for the stock/product REST API.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: tokio::task::JoinHandle<()>,
}

#[derive(Default)]
struct MockState {
    stock: Mutex<HashMap<i32, Value>>,
    products: Mutex<HashMap<i32, Value>>,
    failure: Mutex<Option<StatusCode>>,
    last_authorization: Mutex<Option<String>>,
}

impl MockApi {
    /// Start the mock server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock API");
        let addr = listener.local_addr().expect("mock API address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL clients should use.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("mock API URL")
    }

    /// Set the stock record for a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.set_stock_body(id, json!({ "id": id, "amount": amount }));
    }

    /// Set an arbitrary stock response body for a product.
    pub fn set_stock_body(&self, id: i32, body: Value) {
        lock(&self.state.stock).insert(id, body);
    }

    /// Set the catalog record for a product.
    pub fn set_product(&self, id: i32, title: &str, price: u32) {
        lock(&self.state.products).insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/{id}.jpg"),
            }),
        );
    }

    /// Make every request fail with `status`, or succeed again with `None`.
    pub fn fail_with(&self, status: Option<StatusCode>) {
        *lock(&self.state.failure) = status;
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state.last_authorization).clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn respond(state: &MockState, headers: &HeaderMap, record: Option<Value>) -> Response {
    *lock(&state.last_authorization) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(status) = *lock(&state.failure) {
        return (status, "mock failure").into_response();
    }
    match record {
        Some(body) => Json(body).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn stock(State(state): State<Arc<MockState>>, headers: HeaderMap, Path(id): Path<i32>) -> Response {
    let record = lock(&state.stock).get(&id).cloned();
    respond(&state, &headers, record)
}

async fn product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    let record = lock(&state.products).get(&id).cloned();
    respond(&state, &headers, record)
}

/// Collects notices for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.notices).iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

/// A cart store wired to a [`MockApi`] and a temporary storage directory.
pub struct TestContext {
    pub store: CartStore,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<FileStorage>,
    api: Arc<ApiClient>,
    _dir: tempfile::TempDir,
}

impl TestContext {
    /// Create a context talking to `api` with a fresh, empty storage
    /// directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the API client cannot be created.
    #[must_use]
    pub fn new(api: &MockApi) -> Self {
        Self::with_config(&ApiConfig {
            base_url: api.base_url(),
            token: None,
        })
    }

    /// Create a context from an explicit API configuration.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the API client cannot be created.
    #[must_use]
    pub fn with_config(config: &ApiConfig) -> Self {
        let dir = tempfile::tempdir().expect("create storage dir");
        let storage = Arc::new(FileStorage::new(dir.path()));
        let api = Arc::new(ApiClient::new(config).expect("build API client"));
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Self::open(&api, &storage, &notifier);

        Self {
            store,
            notifier,
            storage,
            api,
            _dir: dir,
        }
    }

    /// Open a second store on the same storage, as a page reload would.
    #[must_use]
    pub fn reload(&self) -> CartStore {
        Self::open(&self.api, &self.storage, &self.notifier)
    }

    fn open(api: &Arc<ApiClient>, storage: &Arc<FileStorage>, notifier: &Arc<RecordingNotifier>) -> CartStore {
        CartStore::load(
            CartServices {
                inventory: api.clone(),
                catalog: api.clone(),
                storage: storage.clone(),
                notifier: notifier.clone(),
            },
            DEFAULT_STORAGE_KEY,
        )
    }
}
