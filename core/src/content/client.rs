use crate::models::ContentPost;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://almau.edu.kz/wp-json/wp/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only access to remote posts.
///
/// Every call is a fresh, unretried request; nothing is cached.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the first page of posts.
    async fn fetch_list(&self) -> Result<Vec<ContentPost>>;

    /// Fetch one post. Non-positive ids are rejected before any request.
    async fn fetch_one(&self, id: i64) -> Result<ContentPost>;
}

/// Parse a post id taken from a navigation path parameter.
pub fn parse_post_id(raw: &str) -> Result<i64> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("not a post id: {:?}", raw)))?;
    validate_post_id(id)?;
    Ok(id)
}

fn validate_post_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(Error::InvalidInput(format!("post id must be positive, got {}", id)));
    }
    Ok(())
}

/// `ContentSource` over the WordPress REST API.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ContentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with a slash
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::InvalidInput(format!("bad API base URL {:?}: {}", base_url, e)))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidInput(format!("bad endpoint {:?}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("HTTP error {} for {}", status.as_u16(), url)));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ContentSource for ContentClient {
    async fn fetch_list(&self) -> Result<Vec<ContentPost>> {
        let url = self.endpoint("posts/")?;
        self.get_json(url).await
    }

    async fn fetch_one(&self, id: i64) -> Result<ContentPost> {
        validate_post_id(id)?;
        let url = self.endpoint(&format!("posts/{}", id))?;
        self.get_json(url).await
    }
}
