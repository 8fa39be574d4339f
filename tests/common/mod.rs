#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::Utc;
use crud_app::db::{Item, ItemChanges, ItemStore, NewItem};
use crud_app::router::{AppState, app_router};
use crud_app::CrudError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory `ItemStore` with MySQL-like id and timestamp behaviour.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    rows: BTreeMap<i64, Item>,
    last_id: i64,
    schema_checks: usize,
    fail_queries: bool,
}

impl MemoryStore {
    pub fn schema_checks(&self) -> usize {
        self.inner.lock().unwrap().schema_checks
    }

    /// Make every subsequent query fail like a lost database connection.
    pub fn break_connection(&self) {
        self.inner.lock().unwrap().fail_queries = true;
    }

    fn check(&self) -> Result<(), CrudError> {
        if self.inner.lock().unwrap().fail_queries {
            return Err(CrudError::Query(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

impl ItemStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), CrudError> {
        self.check()?;
        self.inner.lock().unwrap().schema_checks += 1;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Item>, CrudError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().rows.values().rev().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, CrudError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn insert(&self, item: NewItem) -> Result<i64, CrudError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        inner.last_id += 1;
        let id = inner.last_id;
        let now = Utc::now();
        inner.rows.insert(
            id,
            Item {
                id,
                name: item.name,
                description: item.description,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, changes: ItemChanges) -> Result<u64, CrudError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        match inner.rows.get_mut(&id) {
            Some(row) => {
                row.name = changes.name;
                row.description = changes.description;
                row.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, CrudError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().rows.remove(&id).map_or(0, |_| 1))
    }
}

pub fn app(store: MemoryStore) -> Router {
    app_router(AppState::new(store))
}

/// Send one request and return status plus parsed JSON body (`Null` if empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    match body {
        Some(body) => send_as(app, method, uri, Some("application/json"), body.to_string()).await,
        None => send_as(app, method, uri, None, String::new()).await,
    }
}

/// Like [`send`], with an explicit (or absent) `content-type`.
pub async fn send_as(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let req = builder
        .body(Body::from(body))
        .expect("failed to build request");

    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, json)
}
