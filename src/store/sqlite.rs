// SqliteStore — rusqlite backend implementing the PostStore trait.
//
// Connection is !Sync, so it sits in a tokio Mutex. Each method locks, runs
// its synchronous query from queries.rs, and returns; the guard is never
// held across an await.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::queries;
use super::traits::{PostFilter, PostStore};
use crate::model::Post;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened connection whose tables exist.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn add(&self, mut post: Post) -> Result<Post> {
        let conn = self.conn.lock().await;
        post.id = queries::insert_post(&conn, &post)?;
        Ok(post)
    }

    async fn filter(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        queries::filter_posts(&conn, filter)
    }

    async fn all(&self) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        queries::all_posts(&conn)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        queries::count_posts(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LengthBucket, PostAttributes};
    use crate::store::schema::create_tables;

    fn test_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteStore::new(conn)
    }

    fn post(text: &str, topic: &str, bucket: LengthBucket) -> Post {
        Post::new(
            text,
            PostAttributes {
                topic: topic.to_string(),
                language: "en".to_string(),
                length_bucket: bucket,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn add_then_filter_by_exact_attributes() {
        let store = test_store();
        let stored = store
            .add(post("I love sunsets! #photography", "photography", LengthBucket::Short))
            .await
            .unwrap();
        assert!(stored.id > 0);

        let found = store
            .filter(&PostFilter::exact(&stored.attributes()))
            .await
            .unwrap();
        assert_eq!(found, vec![stored]);
    }

    #[tokio::test]
    async fn filter_by_bucket_and_topic_case() {
        let store = test_store();
        store.add(post("a", "Fitness", LengthBucket::Short)).await.unwrap();
        store.add(post("b", "fitness", LengthBucket::Long)).await.unwrap();
        store.add(post("c", "cooking", LengthBucket::Short)).await.unwrap();

        let by_topic = store
            .filter(&PostFilter {
                topic: Some("FITNESS".into()),
                ..PostFilter::any()
            })
            .await
            .unwrap();
        assert_eq!(by_topic.len(), 2);
        assert_eq!(by_topic[0].text, "a");

        let short = store
            .filter(&PostFilter {
                length_bucket: Some(LengthBucket::Short),
                ..PostFilter::any()
            })
            .await
            .unwrap();
        let texts: Vec<&str> = short.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn all_preserves_insertion_order() {
        let store = test_store();
        for text in ["one", "two", "three"] {
            store.add(post(text, "x", LengthBucket::Short)).await.unwrap();
        }
        let texts: Vec<String> = store.all().await.unwrap().into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn table_count_after_init() {
        let store = test_store();
        assert_eq!(store.table_count().await.unwrap(), 2);
    }
}
