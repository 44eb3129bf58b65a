// Post queries — every SQL statement the SQLite store runs lives here.

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::traits::PostFilter;
use crate::model::{LengthBucket, Post};

const POST_COLUMNS: &str = "id, text, topic, language, length_bucket";

/// Insert a post and return its new row id.
pub fn insert_post(conn: &Connection, post: &Post) -> Result<i64> {
    conn.execute(
        "INSERT INTO posts (text, topic, language, length_bucket, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            post.text,
            post.topic,
            post.language,
            post.length_bucket.as_str(),
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to insert post")?;
    Ok(conn.last_insert_rowid())
}

/// Posts matching every set criterion, in insertion order.
pub fn filter_posts(conn: &Connection, filter: &PostFilter) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE (?1 IS NULL OR lower(topic) = lower(?1))
           AND (?2 IS NULL OR lower(language) = lower(?2))
           AND (?3 IS NULL OR length_bucket = ?3)
         ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            filter.topic,
            filter.language,
            filter.length_bucket.map(|b| b.as_str()),
        ],
        row_to_post,
    )?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

pub fn all_posts(conn: &Connection) -> Result<Vec<Post>> {
    filter_posts(conn, &PostFilter::any())
}

pub fn count_posts(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    let bucket: String = row.get(4)?;
    let length_bucket = bucket
        .parse::<LengthBucket>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Post {
        id: row.get(0)?,
        text: row.get(1)?,
        topic: row.get(2)?,
        language: row.get(3)?,
        length_bucket,
    })
}
