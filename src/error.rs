use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::config::CONFIG;

#[derive(Debug, ThisError)]
pub enum CrudError {
    #[error("Invalid id")]
    InvalidId,

    #[error("Name is required")]
    NameRequired,

    /// Body could not be read or decoded; carries the status to answer with.
    #[error("Invalid request body: {1}")]
    InvalidBody(StatusCode, String),

    #[error("Not found")]
    NotFound,

    #[error("Database connection error: {0}")]
    Connection(SqlxError),

    #[error("Database query error: {0}")]
    Query(#[from] SqlxError),
}

impl CrudError {
    pub fn status(&self) -> StatusCode {
        match self {
            CrudError::InvalidId | CrudError::NameRequired => StatusCode::BAD_REQUEST,
            CrudError::InvalidBody(status, _) => *status,
            CrudError::NotFound => StatusCode::NOT_FOUND,
            CrudError::Connection(_) | CrudError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Body-decoding and store failures share the
    /// generic message; `details` carries the raw message only when
    /// `expose_details` is set.
    pub fn body(&self, expose_details: bool) -> ApiErrorBody {
        match self {
            CrudError::InvalidBody(..) | CrudError::Connection(_) | CrudError::Query(_) => {
                ApiErrorBody {
                    error: "Internal Server Error".to_string(),
                    details: expose_details.then(|| self.to_string()),
                }
            }
            _ => ApiErrorBody {
                error: self.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "unhandled error");
        }
        let body = self.body(!CONFIG.is_production());
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
