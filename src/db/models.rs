use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `items` table, serialized as-is in API responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated values for an insert. `id` and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

/// Fully merged column values written by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanges {
    pub name: String,
    pub description: Option<String>,
}

impl From<&Item> for ItemChanges {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
        }
    }
}
