use std::future::Future;

use crate::db::models::{Item, ItemChanges, NewItem};
use crate::error::CrudError;

/// Persistence seam used by the HTTP handlers.
///
/// `ensure_schema` must be safe to call before every operation. Row lookups
/// return `Ok(None)` for a missing id; `update` and `delete` report the number
/// of affected rows so callers decide what "not found" means.
pub trait ItemStore: Clone + Send + Sync + 'static {
    fn ensure_schema(&self) -> impl Future<Output = Result<(), CrudError>> + Send;

    /// All rows, highest id first.
    fn list(&self) -> impl Future<Output = Result<Vec<Item>, CrudError>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<Option<Item>, CrudError>> + Send;

    /// Insert and return the id assigned by the store.
    fn insert(&self, item: NewItem) -> impl Future<Output = Result<i64, CrudError>> + Send;

    fn update(
        &self,
        id: i64,
        changes: ItemChanges,
    ) -> impl Future<Output = Result<u64, CrudError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<u64, CrudError>> + Send;
}
