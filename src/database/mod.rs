//! WinWork database layer.
//!
//! Provides SQLite connection management and schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use winwork::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("winwork.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! // Hand the connection to a repository
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;

/// Returns the current UNIX timestamp in milliseconds.
///
/// Every `created_at` / `updated_at` / `last_accessed_at` column uses this unit.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Escapes LIKE wildcards so user input is matched literally.
///
/// Pair with `ESCAPE '\\'` in the SQL.
pub fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
