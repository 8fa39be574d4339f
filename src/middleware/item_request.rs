use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE, request::Parts},
};
use serde_json::{Map, Value};

use crate::CrudError;
use crate::db::{Item, ItemChanges, NewItem};

/// Item id taken from the `{id}` path segment.
///
/// Anything that is not a base-10 integer is rejected with `Invalid id`
/// before the handler runs. Numeric spellings such as `1e3`, `1.0` or `0x10`
/// are rejected too, even though they denote whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemId(pub i64);

impl ItemId {
    pub fn parse(raw: &str) -> Result<Self, CrudError> {
        raw.trim()
            .parse::<i64>()
            .map(ItemId)
            .map_err(|_| CrudError::InvalidId)
    }
}

impl<S> FromRequestParts<S> for ItemId
where
    S: Send + Sync,
{
    type Rejection = CrudError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| CrudError::InvalidId)?;
        Self::parse(&raw)
    }
}

/// Loosely typed create/update body.
///
/// Fields are kept as raw JSON so a wrong type is a validation decision
/// (`Name is required`, or "keep existing" on update) rather than a decode
/// failure. An empty body, or one not sent as JSON, reads as `{}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPayload {
    fields: Map<String, Value>,
}

impl ItemPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, CrudError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(_) => Err(CrudError::InvalidBody(
                StatusCode::BAD_REQUEST,
                "expected a JSON object".to_string(),
            )),
            Err(e) => Err(CrudError::InvalidBody(StatusCode::BAD_REQUEST, e.to_string())),
        }
    }

    /// `name` if it is a string with visible content.
    fn name(&self) -> Option<&str> {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// `description` if it is a string, empty or not.
    fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(Value::as_str)
    }

    /// Validate a create body. An empty description is stored as NULL.
    pub fn into_new_item(self) -> Result<NewItem, CrudError> {
        let name = self.name().ok_or(CrudError::NameRequired)?.to_string();
        let description = self
            .description()
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok(NewItem { name, description })
    }

    /// Partial merge over the stored row: only well-typed fields replace
    /// existing values.
    pub fn merge(&self, existing: &Item) -> ItemChanges {
        let mut changes = ItemChanges::from(existing);
        if let Some(name) = self.name() {
            changes.name = name.to_string();
        }
        if let Some(description) = self.description() {
            changes.description = Some(description.to_string());
        }
        changes
    }
}

impl<S> FromRequest<S> for ItemPayload
where
    S: Send + Sync,
{
    type Rejection = CrudError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content(req.headers()) {
            return Ok(Self::default());
        }
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| {
                CrudError::InvalidBody(rejection.status(), rejection.body_text())
            })?;
        Self::from_slice(&body)
    }
}

/// `application/json` or a `+json` suffix type, parameters ignored.
fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
