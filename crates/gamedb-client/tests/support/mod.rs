//! In-process mock of the game-data API, served under `/en` on an ephemeral
//! port.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Json, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use gamedb_client::{ApiClient, ClientConfig};
use gamedb_core::token::now_secs;

pub const PASSWORD: &str = "hunter2";

/// Mint an HS256 token expiring `ttl` seconds from now.
pub fn mint(ttl: i64, roles: &[&str]) -> String {
    let claims = json!({
        "sub": "42",
        "name": "Hunter",
        "iat": now_secs(),
        "exp": now_secs() + ttl,
        "roles": roles,
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"mock-secret"),
    )
    .unwrap()
}

fn envelope(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"error": {"code": code, "message": message}}))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Knobs and recordings shared with the running server.
#[derive(Default)]
pub struct Shared {
    pub login_ttl: AtomicI64,
    pub refresh_ttl: AtomicI64,
    pub fail_refresh: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub refresh_bearers: Mutex<Vec<Option<String>>>,
    pub last_query: Mutex<Option<String>>,
    pub last_bearer: Mutex<Option<String>>,
    pub last_body: Mutex<Option<Value>>,
    pub armor: Mutex<BTreeMap<u64, Value>>,
}

impl Shared {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.last_bearer.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap, query: Option<String>) {
        *self.last_query.lock().unwrap() = query;
        *self.last_bearer.lock().unwrap() = bearer(headers);
    }
}

type AppState = Arc<Shared>;

async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return envelope(
            StatusCode::UNAUTHORIZED,
            "auth.invalid_credentials",
            "Invalid username or password",
        );
    }
    let ttl = state.login_ttl.load(Ordering::SeqCst);
    Json(json!({"token": mint(ttl, &["editor"])})).into_response()
}

async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    state.refresh_bearers.lock().unwrap().push(bearer(&headers));
    if state.fail_refresh.load(Ordering::SeqCst) {
        return envelope(StatusCode::OK, "auth.refresh_denied", "Refresh denied");
    }
    let ttl = state.refresh_ttl.load(Ordering::SeqCst);
    Json(json!({"token": mint(ttl, &["editor"])})).into_response()
}

async fn list_armor(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    state.record(&headers, query);
    let armor = state.armor.lock().unwrap();
    Json(Value::Array(armor.values().cloned().collect()))
}

async fn create_armor(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Json(mut body): Json<Value>,
) -> Response {
    state.record(&headers, query);
    *state.last_body.lock().unwrap() = Some(body.clone());
    if body.get("name").is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "context": {"failures": {"name": {
                    "code": "required",
                    "path": "name",
                    "message": "This value should not be blank."
                }}}
            }})),
        )
            .into_response();
    }
    let mut armor = state.armor.lock().unwrap();
    let id = armor.keys().next_back().map_or(1, |k| k + 1);
    body["id"] = json!(id);
    armor.insert(id, body.clone());
    Json(body).into_response()
}

async fn read_armor(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Path(id): Path<u64>,
) -> Response {
    state.record(&headers, query);
    match state.armor.lock().unwrap().get(&id) {
        Some(value) => Json(value.clone()).into_response(),
        None => envelope(
            StatusCode::NOT_FOUND,
            "not_found",
            &format!("No armor found matching '{id}'"),
        ),
    }
}

async fn update_armor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(patch): Json<Value>,
) -> Response {
    state.record(&headers, None);
    let mut armor = state.armor.lock().unwrap();
    let Some(existing) = armor.get_mut(&id) else {
        return envelope(StatusCode::NOT_FOUND, "not_found", "No such armor");
    };
    if let (Some(target), Some(fields)) = (existing.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(existing.clone()).into_response()
}

async fn delete_armor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.record(&headers, None);
    if state.armor.lock().unwrap().remove(&id).is_none() {
        return envelope(
            StatusCode::NOT_FOUND,
            "not_found",
            &format!("No armor found matching '{id}'"),
        );
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn wrapped() -> Response {
    envelope(StatusCode::OK, "wrapped.failure", "Failure in a 200")
}

async fn broken() -> Response {
    (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(10)).await;
    Json(json!([]))
}

/// A running mock server. Dropping it stops the server.
pub struct MockApi {
    pub base_url: String,
    pub state: Arc<Shared>,
    handle: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(Shared::default());
        state.login_ttl.store(3600, Ordering::SeqCst);
        state.refresh_ttl.store(3600, Ordering::SeqCst);

        let api = Router::new()
            .route("/auth", post(login))
            .route("/auth/refresh", get(refresh))
            .route("/armor", get(list_armor).post(create_armor))
            .route(
                "/armor/{id}",
                get(read_armor).patch(update_armor).delete(delete_armor),
            )
            .route("/wrapped", get(wrapped))
            .route("/broken", get(broken))
            .route("/slow", get(slow));
        let app = Router::new().nest("/en", api).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: self.base_url.clone(),
            locale: Some("en".into()),
            request_timeout: Duration::from_secs(20),
        })
        .unwrap()
    }

    /// Seed an armor record with the given id.
    pub fn seed_armor(&self, id: u64, value: Value) {
        let mut value = value;
        value["id"] = json!(id);
        self.state.armor.lock().unwrap().insert(id, value);
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Poll `check` every 50ms until it holds or `timeout` elapses.
pub async fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
