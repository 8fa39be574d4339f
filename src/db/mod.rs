//! Database module: models, schema and the MySQL-backed item store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and write payloads
//! - `schema.rs`: SQL DDL, applied lazily on first use
//! - `store.rs`: the `ItemStore` trait the handlers are written against
//! - `mysql.rs`: pooled MySQL implementation

pub mod models;
pub mod mysql;
pub mod schema;
pub mod store;

pub use models::{Item, ItemChanges, NewItem};
pub use mysql::{ItemsStorage, MySqlPool};
pub use schema::MYSQL_ITEMS_TABLE;
pub use store::ItemStore;
