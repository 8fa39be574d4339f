use crate::config::{DB_CHARSET, DB_COLLATION, DatabaseSettings};
use crate::db::models::{Item, ItemChanges, NewItem};
use crate::db::schema::{MYSQL_ITEMS_TABLE, create_database_sql};
use crate::db::store::ItemStore;
use crate::error::CrudError;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Connection, Executor, MySql, MySqlConnection, Pool};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub type MySqlPool = Pool<MySql>;

const SELECT_ITEM_COLUMNS: &str = "SELECT id, name, description, created_at, updated_at FROM items";

/// Handle to the item store. Cheap to clone; all clones share one pool.
///
/// Nothing touches the network until the first operation: the pool (and the
/// database itself) is created on first access and kept until [`close`].
///
/// [`close`]: ItemsStorage::close
#[derive(Clone)]
pub struct ItemsStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    settings: DatabaseSettings,
    pool: OnceCell<MySqlPool>,
    schema_ready: OnceCell<()>,
}

impl ItemsStorage {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                settings,
                pool: OnceCell::new(),
                schema_ready: OnceCell::new(),
            }),
        }
    }

    /// Return the shared pool, creating the database and pool on first call.
    ///
    /// Concurrent first callers wait on the same initialisation. A failed
    /// attempt is not remembered; the next caller tries again.
    pub async fn pool(&self) -> Result<&MySqlPool, CrudError> {
        self.inner
            .pool
            .get_or_try_init(|| connect_pool(&self.inner.settings))
            .await
    }

    /// Close the pool if it was ever opened. Call once at process exit.
    pub async fn close(&self) {
        if let Some(pool) = self.inner.pool.get() {
            info!("closing database pool");
            pool.close().await;
        }
    }
}

fn base_options(settings: &DatabaseSettings) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .charset(DB_CHARSET)
        .collation(DB_COLLATION)
}

async fn connect_pool(settings: &DatabaseSettings) -> Result<MySqlPool, CrudError> {
    // Connect without a database selected so it can be created if missing.
    let mut conn = MySqlConnection::connect_with(&base_options(settings))
        .await
        .map_err(CrudError::Connection)?;
    Executor::execute(&mut conn, sqlx::raw_sql(&create_database_sql(&settings.name)))
        .await
        .map_err(CrudError::Connection)?;
    conn.close().await.map_err(CrudError::Connection)?;

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(base_options(settings).database(&settings.name))
        .await
        .map_err(CrudError::Connection)?;

    info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        max_connections = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

impl ItemStore for ItemsStorage {
    async fn ensure_schema(&self) -> Result<(), CrudError> {
        self.inner
            .schema_ready
            .get_or_try_init(|| async {
                let pool = self.pool().await?;
                sqlx::raw_sql(MYSQL_ITEMS_TABLE).execute(pool).await?;
                debug!("items table ensured");
                Ok::<(), CrudError>(())
            })
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Item>, CrudError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEM_COLUMNS} ORDER BY id DESC"))
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, CrudError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEM_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, item: NewItem) -> Result<i64, CrudError> {
        let pool = self.pool().await?;
        let result = sqlx::query("INSERT INTO items (name, description) VALUES (?, ?)")
            .bind(item.name)
            .bind(item.description)
            .execute(pool)
            .await?;
        Ok(result.last_insert_id() as i64)
    }

    /// `updated_at` is set explicitly so that a write with unchanged values
    /// still refreshes it (`ON UPDATE` only fires when a column changes).
    async fn update(&self, id: i64, changes: ItemChanges) -> Result<u64, CrudError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "UPDATE items SET name = ?, description = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(changes.name)
        .bind(changes.description)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, CrudError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
