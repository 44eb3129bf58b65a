// MemoryStore — session-only PostStore backed by a Vec.
//
// Readers (selection during generation) share the lock; ingestion takes it
// exclusively for each append.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{PostFilter, PostStore};
use crate::model::Post;

#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn add(&self, mut post: Post) -> Result<Post> {
        let mut posts = self.posts.write().await;
        post.id = posts.len() as i64 + 1;
        posts.push(post.clone());
        Ok(post)
    }

    async fn filter(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn all(&self) -> Result<Vec<Post>> {
        Ok(self.posts.read().await.clone())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.posts.read().await.len())
    }
}
