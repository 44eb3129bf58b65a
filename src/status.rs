// System status display — database location, size, and corpus breakdown.

use anyhow::Result;
use std::path::Path;

use crate::output::terminal;
use crate::store::PostStore;

/// Display system status to the terminal.
pub async fn show(store: &dyn PostStore, db_path: &str) -> Result<()> {
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    let posts = store.all().await?;
    terminal::display_corpus_stats(&posts);

    if posts.is_empty() {
        println!("\nRun `quill ingest --file posts.json` to build your corpus.");
    }
    Ok(())
}

/// Whether a database file already exists at this path.
pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
