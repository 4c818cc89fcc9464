#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt as _;

use user_srv::{
    app::{build_app, build_rpc_app},
    config::AppConfig,
    state::AppState,
    users::{
        memory::InMemoryUserRepository,
        repo::{RepoResult, UserRepository},
        repo_types::{NewUser, User, UserUpdate},
    },
};

pub const SECRET: &str = "integration-secret";

/// Wraps the in-memory store and counts every call that reaches it.
#[derive(Default)]
pub struct CountingRepo {
    inner: InMemoryUserRepository,
    calls: AtomicUsize,
}

impl CountingRepo {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for CountingRepo {
    async fn create(&self, new_user: NewUser) -> RepoResult<User> {
        self.hit();
        self.inner.create(new_user).await
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<User> {
        self.hit();
        self.inner.get_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<User> {
        self.hit();
        self.inner.get_by_email(email).await
    }

    async fn get_all(&self) -> RepoResult<Vec<User>> {
        self.hit();
        self.inner.get_all().await
    }

    async fn update(&self, update: UserUpdate) -> RepoResult<User> {
        self.hit();
        self.inner.update(update).await
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.hit();
        self.inner.delete(id).await
    }
}

pub fn build_state(repo: Arc<dyn UserRepository>) -> AppState {
    AppState::from_parts(repo, Arc::new(AppConfig::for_tests(SECRET)))
}

pub fn rest_router() -> Router {
    build_app(build_state(Arc::new(InMemoryUserRepository::new())))
}

/// REST and RPC routers over the same store.
pub fn both_routers() -> (Router, Router) {
    let state = build_state(Arc::new(InMemoryUserRepository::new()));
    (build_app(state.clone()), build_rpc_app(state))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    read(resp).await
}

pub async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    read(resp).await
}

async fn read(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Issues a JSON-RPC call and returns the envelope.
pub async fn rpc(app: &Router, method: &str, params: Value, bearer: Option<&str>) -> Value {
    let envelope = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let (status, body) = send(app, "POST", "/rpc", Some(envelope), bearer).await;
    assert_eq!(status, StatusCode::OK, "rpc transport status");
    body
}
