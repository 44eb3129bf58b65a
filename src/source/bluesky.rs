// Bluesky post source — a creator's own posts via the public AppView.
//
// Read endpoints need no auth, so this is a thin reqwest wrapper with a
// generic XRPC GET helper plus author-feed pagination.

use anyhow::{Context, Result};
use atrium_api::app::bsky::feed::get_author_feed;
use atrium_api::types::TryFromUnknown;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Default public API endpoint for AT Protocol read operations.
pub const DEFAULT_PUBLIC_API_URL: &str = "https://public.api.bsky.app";

/// Largest page getAuthorFeed will return.
const MAX_PAGE_SIZE: usize = 100;

pub struct BlueskyClient {
    client: reqwest::Client,
    base_url: String,
}

impl BlueskyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("quill/0.1 (post-drafting)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET an XRPC method and deserialize the JSON body.
    pub async fn xrpc_get<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.base_url, nsid);
        debug!(nsid = nsid, "XRPC GET request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("XRPC request failed: {nsid}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("XRPC {nsid} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {nsid} response"))
    }
}

/// Fetch up to `max_posts` of an account's own posts (no reposts, no
/// replies), newest first.
pub async fn fetch_recent_posts(
    client: &BlueskyClient,
    handle: &str,
    max_posts: usize,
) -> Result<Vec<String>> {
    let handle = handle.strip_prefix('@').unwrap_or(handle);
    let page_size = max_posts.clamp(1, MAX_PAGE_SIZE).to_string();
    let mut texts = Vec::new();
    let mut cursor: Option<String> = None;

    while texts.len() < max_posts {
        let mut params: Vec<(&str, &str)> = vec![
            ("actor", handle),
            ("filter", "posts_no_replies"),
            ("limit", &page_size),
        ];
        if let Some(ref c) = cursor {
            params.push(("cursor", c));
        }

        let output: get_author_feed::Output = client
            .xrpc_get("app.bsky.feed.getAuthorFeed", &params)
            .await
            .with_context(|| format!("Failed to fetch feed for @{handle}"))?;

        for item in &output.feed {
            // A `reason` means someone else's post surfaced by a repost.
            if item.reason.is_some() {
                continue;
            }
            let text = atrium_api::app::bsky::feed::post::Record::try_from_unknown(
                item.post.record.clone(),
            )
            .map(|record| record.data.text.clone())
            .unwrap_or_default();

            texts.push(text);
            if texts.len() >= max_posts {
                break;
            }
        }

        debug!(
            page = output.feed.len(),
            collected = texts.len(),
            "Fetched author feed page for @{handle}"
        );

        cursor = output.data.cursor.clone();
        if cursor.is_none() || output.feed.is_empty() {
            break;
        }
    }

    info!(count = texts.len(), handle = handle, "Collected posts from Bluesky");
    Ok(texts)
}
