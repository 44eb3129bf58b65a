// Post store — the creator's corpus with derived attributes.
//
// Two backends behind the PostStore trait: an in-memory store for one-off
// sessions and tests, and a rusqlite store (bundled SQLite, no system
// dependency) whose file lives wherever QUILL_DB_PATH points.

pub mod memory;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
pub use traits::{PostFilter, PostStore};

#[cfg(feature = "sqlite")]
use anyhow::{Context, Result};
#[cfg(feature = "sqlite")]
use std::path::Path;

/// Open (or create) the SQLite database and run migrations.
#[cfg(feature = "sqlite")]
pub fn initialize_sqlite(db_path: &str) -> Result<sqlite::SqliteStore> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(sqlite::SqliteStore::new(conn))
}

/// Open an existing SQLite database (fails if it doesn't exist yet).
///
/// Migrations still run so a database created by an older build picks up
/// new indexes.
#[cfg(feature = "sqlite")]
pub fn open_sqlite(db_path: &str) -> Result<sqlite::SqliteStore> {
    if !Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {db_path}. Run `quill init` first.");
    }
    initialize_sqlite(db_path)
}
