// PostStore trait — backend-agnostic async interface for the post corpus.
//
// Implementors: MemoryStore (session-only) and SqliteStore (durable, behind
// the `sqlite` feature). The store is append-only: there is no update or
// delete, and every read returns posts in insertion order.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{LengthBucket, Post, PostAttributes};

/// Attribute criteria for a lookup. Unset fields match everything.
/// Topic and language compare ASCII case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub topic: Option<String>,
    pub language: Option<String>,
    pub length_bucket: Option<LengthBucket>,
}

impl PostFilter {
    /// A filter that matches every post.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter matching exactly the given attributes.
    pub fn exact(attributes: &PostAttributes) -> Self {
        Self {
            topic: Some(attributes.topic.clone()),
            language: Some(attributes.language.clone()),
            length_bucket: Some(attributes.length_bucket),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.topic.is_none() && self.language.is_none() && self.length_bucket.is_none()
    }

    pub fn matches(&self, post: &Post) -> bool {
        let label_ok = |want: &Option<String>, have: &str| {
            want.as_deref()
                .map_or(true, |w| w.eq_ignore_ascii_case(have))
        };
        label_ok(&self.topic, &post.topic)
            && label_ok(&self.language, &post.language)
            && self.length_bucket.map_or(true, |b| b == post.length_bucket)
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Append a post. Returns it with its store-assigned id.
    /// Duplicate text is allowed.
    async fn add(&self, post: Post) -> Result<Post>;

    /// All posts matching every set criterion, in insertion order.
    async fn filter(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// The full corpus, in insertion order.
    async fn all(&self) -> Result<Vec<Post>>;

    /// Number of stored posts.
    async fn count(&self) -> Result<usize>;
}
