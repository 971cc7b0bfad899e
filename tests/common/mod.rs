// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process mock of the wardrobe backend.

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use wardrobe_client::config::Config;
use wardrobe_client::storage::KeyValueStore;
use wardrobe_client::AppState;

/// Token the mock backend issues for the seeded account.
#[allow(dead_code)]
pub const SEEDED_TOKEN: &str = "t1";

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct BackendInner {
    requests: Vec<RecordedRequest>,
    /// email -> (password, user)
    accounts: HashMap<String, (String, Value)>,
    /// token -> email
    tokens: HashMap<String, String>,
    inventory: Vec<Value>,
    photo_url: Option<String>,
    bodies: Vec<(String, Value)>,
    /// Held before answering `GET /inventory`.
    inventory_delay: Option<Duration>,
    /// Replaces the token issued by the next logins.
    login_token: Option<String>,
}

/// Handle onto the running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<BackendInner>>,
}

#[allow(dead_code)]
impl MockBackend {
    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Requests received for a given path.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// JSON bodies received for a given path.
    pub fn bodies_to(&self, path: &str) -> Vec<Value> {
        self.inner
            .lock()
            .unwrap()
            .bodies
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
            .collect()
    }

    /// Stop accepting a token, as if it expired server-side.
    pub fn revoke_token(&self, token: &str) {
        self.inner.lock().unwrap().tokens.remove(token);
    }

    /// Make `GET /inventory` wait before checking credentials.
    pub fn delay_inventory(&self, delay: Duration) {
        self.inner.lock().unwrap().inventory_delay = Some(delay);
    }

    /// Issue `token` on every subsequent successful login.
    pub fn issue_login_token(&self, token: &str) {
        self.inner.lock().unwrap().login_token = Some(token.to_string());
    }

    pub fn inventory_len(&self) -> usize {
        self.inner.lock().unwrap().inventory.len()
    }

    fn authorized(&self, headers: &axum::http::HeaderMap) -> Result<String, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let inner = self.inner.lock().unwrap();
        match token.and_then(|t| inner.tokens.get(&t).cloned()) {
            Some(email) => Ok(email),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Token invàlid o caducat" })),
            )
                .into_response()),
        }
    }
}

/// Start the mock backend on an ephemeral port.
///
/// Seeded with account `a@b.com` / `pw` (name "A") whose login yields
/// token `t1`, and two inventory entries.
pub async fn spawn_backend() -> (String, MockBackend) {
    let mut inner = BackendInner::default();
    inner.accounts.insert(
        "a@b.com".to_string(),
        ("pw".to_string(), json!({ "name": "A", "email": "a@b.com" })),
    );
    inner.inventory = vec![
        json!({ "id": 1, "size": "M", "product": { "id": 10, "name": "Denim jacket" } }),
        json!({ "id": 2, "product": { "id": 11, "name": "Linen shirt", "brand": "Acme" } }),
    ];
    let backend = MockBackend {
        inner: Arc::new(Mutex::new(inner)),
    };

    let app = Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/me/username", patch(accept_patch))
        .route("/users/me/measures", patch(accept_patch))
        .route(
            "/users/me/profile-photo",
            get(get_photo).patch(set_photo),
        )
        .route("/inventory", get(list_inventory))
        .route("/inventory/{product_id}", delete(remove_inventory))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), backend)
}

/// Build app state against `base_url` with the given store.
#[allow(dead_code)]
pub fn app_state(base_url: &str, store: KeyValueStore) -> AppState {
    AppState::new(Config::for_api_url(base_url), store).expect("Failed to build app state")
}

/// App state already logged in as the seeded account.
#[allow(dead_code)]
pub async fn logged_in_state(base_url: &str) -> AppState {
    let state = app_state(base_url, KeyValueStore::new_memory());
    state.session.initialize().await;
    state.auth.login("a@b.com", "pw").await.expect("seeded login");
    state
}

async fn record(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_str = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
        }
    };
    backend.inner.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

async fn login(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let mut inner = backend.inner.lock().unwrap();
    inner.bodies.push(("/users/login".to_string(), body.clone()));

    let user = match inner.accounts.get(&email) {
        Some((pw, user)) if pw == password => user.clone(),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Credencials incorrectes" })),
            )
                .into_response()
        }
    };

    let token = if let Some(token) = inner.login_token.clone() {
        token
    } else if email == "a@b.com" {
        SEEDED_TOKEN.to_string()
    } else {
        format!("token-{}", email)
    };
    inner.tokens.insert(token.clone(), email);

    Json(json!({ "token": token, "user": user })).into_response()
}

async fn register(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut inner = backend.inner.lock().unwrap();
    inner.bodies.push(("/users/register".to_string(), body.clone()));

    if inner.accounts.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email already registered" })),
        )
            .into_response();
    }

    let password = body["password"].as_str().unwrap_or_default().to_string();
    let user = json!({
        "name": body["name"],
        "email": email,
        "height": body["height"],
        "tryOnPhotoUrl": body["tryOnPhotoUrl"],
    });
    inner.accounts.insert(email, (password, user));

    (StatusCode::CREATED, Json(json!({ "message": "created" }))).into_response()
}

async fn accept_patch(
    State(backend): State<MockBackend>,
    request: Request,
) -> Response {
    if let Err(resp) = backend.authorized(request.headers()) {
        return resp;
    }
    let path = request.uri().path().to_string();
    let bytes = axum::body::to_bytes(request.into_body(), 64 * 1024)
        .await
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    backend.inner.lock().unwrap().bodies.push((path, body));

    Json(json!({ "message": "ok" })).into_response()
}

async fn get_photo(State(backend): State<MockBackend>, headers: axum::http::HeaderMap) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    let url = backend.inner.lock().unwrap().photo_url.clone();
    Json(json!({ "profilePhotoUrl": url })).into_response()
}

async fn set_photo(
    State(backend): State<MockBackend>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    let mut inner = backend.inner.lock().unwrap();
    inner.photo_url = body["profilePhotoUrl"].as_str().map(str::to_string);
    inner
        .bodies
        .push(("/users/me/profile-photo".to_string(), body));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_inventory(
    State(backend): State<MockBackend>,
    headers: axum::http::HeaderMap,
) -> Response {
    let delay = backend.inner.lock().unwrap().inventory_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    let items = backend.inner.lock().unwrap().inventory.clone();
    Json(Value::Array(items)).into_response()
}

async fn remove_inventory(
    State(backend): State<MockBackend>,
    Path(product_id): Path<u64>,
    headers: axum::http::HeaderMap,
) -> Response {
    if let Err(resp) = backend.authorized(&headers) {
        return resp;
    }
    let mut inner = backend.inner.lock().unwrap();
    let before = inner.inventory.len();
    inner
        .inventory
        .retain(|item| item["product"]["id"].as_u64() != Some(product_id));

    if inner.inventory.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Producte no trobat" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
