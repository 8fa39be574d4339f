use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use crate::db::{Item, ItemStore};
use crate::middleware::item_request::{ItemId, ItemPayload};
use crate::{CrudError, router::AppState};

/// GET /api/items -> every item, newest id first.
pub async fn list_items<S: ItemStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Item>>, CrudError> {
    state.store.ensure_schema().await?;
    let items = state.store.list().await?;
    Ok(Json(items))
}

/// GET /api/items/{id}
pub async fn get_item<S: ItemStore>(
    ItemId(id): ItemId,
    State(state): State<AppState<S>>,
) -> Result<Json<Item>, CrudError> {
    state.store.ensure_schema().await?;
    let item = state.store.get(id).await?.ok_or(CrudError::NotFound)?;
    Ok(Json(item))
}

/// POST /api/items -> 201 with the row as stored.
pub async fn create_item<S: ItemStore>(
    State(state): State<AppState<S>>,
    payload: ItemPayload,
) -> Result<(StatusCode, Json<Item>), CrudError> {
    let new_item = payload.into_new_item()?;
    state.store.ensure_schema().await?;

    let id = state.store.insert(new_item).await?;
    // Re-read so the response carries the store-assigned timestamps.
    let item = state.store.get(id).await?.ok_or(CrudError::NotFound)?;
    info!(id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/items/{id} -> partial merge over the stored row.
///
/// Read and write are separate statements without a transaction; a concurrent
/// update to the same id can be overwritten. A concurrent delete between the
/// write and the re-read yields 404.
pub async fn update_item<S: ItemStore>(
    ItemId(id): ItemId,
    State(state): State<AppState<S>>,
    payload: ItemPayload,
) -> Result<Json<Item>, CrudError> {
    state.store.ensure_schema().await?;
    let existing = state.store.get(id).await?.ok_or(CrudError::NotFound)?;

    let changes = payload.merge(&existing);
    state.store.update(id, changes).await?;

    let updated = state.store.get(id).await?.ok_or(CrudError::NotFound)?;
    info!(id, "item updated");
    Ok(Json(updated))
}

/// DELETE /api/items/{id} -> 204, or 404 when nothing was deleted.
pub async fn delete_item<S: ItemStore>(
    ItemId(id): ItemId,
    State(state): State<AppState<S>>,
) -> Result<StatusCode, CrudError> {
    state.store.ensure_schema().await?;
    if state.store.delete(id).await? == 0 {
        return Err(CrudError::NotFound);
    }
    info!(id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
