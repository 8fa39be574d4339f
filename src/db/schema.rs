//! SQL DDL for the item store (MySQL).

use crate::config::{DB_CHARSET, DB_COLLATION};

/// `items` table:
/// - `id` INT AUTO_INCREMENT, never reused after delete
/// - `created_at` set once on insert
/// - `updated_at` refreshed by MySQL whenever the row changes
pub const MYSQL_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Quote a MySQL identifier with back-ticks, doubling any embedded back-tick.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `CREATE DATABASE IF NOT EXISTS` for the configured name.
///
/// Identifiers cannot be bound as parameters, so the name is quoted instead.
pub fn create_database_sql(name: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS {} CHARACTER SET {DB_CHARSET} COLLATE {DB_COLLATION}",
        quote_identifier(name)
    )
}
