//! REST API client for the Gnotus server

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ApiConfig;
use crate::doc::{Doc, DocCreate, DocTreeNode, DocUpdate, MoveDirection};
use crate::error::{ClientError, ClientResult};

/// Outcome of a conditional fetch keyed on `updated_at`
#[derive(Debug, Clone)]
pub enum ConditionalFetch {
    /// Server copy matches the supplied validation token
    Unchanged,

    /// Server holds a newer version
    Changed(Box<Doc>),

    /// Document deleted or became inaccessible since caching
    Missing,
}

/// Gnotus document API interface.
///
/// `Ok(None)` / `Missing` mean the resource is absent or forbidden; the
/// server deliberately does not distinguish the two.
#[async_trait]
pub trait DocsApi: Send + Sync {
    /// Unconditional fetch by URL path
    async fn doc_by_path(&self, path: &str) -> ClientResult<Option<Doc>>;

    /// Conditional fetch; `updated_at` is the cached copy's version token
    async fn doc_if_changed(
        &self,
        path: &str,
        updated_at: DateTime<Utc>,
    ) -> ClientResult<ConditionalFetch>;

    /// Fetch by id, optionally including the markdown source
    async fn doc_by_id(&self, id: i64, include_source: bool) -> ClientResult<Option<Doc>>;

    /// Fetch the outline tree, optionally depth-limited
    async fn outline(&self, depth: Option<u32>) -> ClientResult<DocTreeNode>;

    /// Create a document under an existing parent
    async fn create_doc(&self, create: &DocCreate) -> ClientResult<Doc>;

    /// Update an existing document
    async fn update_doc(&self, id: i64, update: &DocUpdate) -> ClientResult<Doc>;

    /// Swap a document with a sibling in the display order
    async fn move_doc(&self, id: i64, direction: MoveDirection) -> ClientResult<()>;

    /// Delete a document
    async fn delete_doc(&self, id: i64) -> ClientResult<()>;
}

/// `reqwest`-backed implementation of [`DocsApi`]
pub struct RestApi {
    client: reqwest::Client,
    base_url: String,
}

impl RestApi {
    /// Build a client from the API configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DocsApi for RestApi {
    async fn doc_by_path(&self, path: &str) -> ClientResult<Option<Doc>> {
        let response = self
            .client
            .get(self.url("/api/docs/by_path"))
            .query(&[("path", path)])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(Some(response.json().await?)),
            404 => Ok(None),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn doc_if_changed(
        &self,
        path: &str,
        updated_at: DateTime<Utc>,
    ) -> ClientResult<ConditionalFetch> {
        let response = self
            .client
            .get(self.url("/api/docs/by_path"))
            .query(&[("path", path), ("timestamp", &updated_at.to_rfc3339())])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(ConditionalFetch::Changed(Box::new(response.json().await?))),
            304 => {
                debug!(path, "server copy unchanged");
                Ok(ConditionalFetch::Unchanged)
            }
            404 => Ok(ConditionalFetch::Missing),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn doc_by_id(&self, id: i64, include_source: bool) -> ClientResult<Option<Doc>> {
        let response = self
            .client
            .get(self.url(&format!("/api/docs/{id}")))
            .query(&[("include_source", include_source)])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(Some(response.json().await?)),
            404 => Ok(None),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn outline(&self, depth: Option<u32>) -> ClientResult<DocTreeNode> {
        let mut request = self.client.get(self.url("/api/docs/outline"));
        if let Some(depth) = depth {
            request = request.query(&[("depth", depth)]);
        }
        let response = request.send().await?;

        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn create_doc(&self, create: &DocCreate) -> ClientResult<Doc> {
        let response = self
            .client
            .post(self.url("/api/docs/"))
            .json(create)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => Ok(response.json().await?),
            404 => Err(ClientError::NotFound),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn update_doc(&self, id: i64, update: &DocUpdate) -> ClientResult<Doc> {
        let response = self
            .client
            .put(self.url(&format!("/api/docs/{id}")))
            .json(update)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(response.json().await?),
            404 => Err(ClientError::NotFound),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn move_doc(&self, id: i64, direction: MoveDirection) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/api/docs/{id}/move")))
            .query(&[("direction", direction.as_str())])
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 204 => Ok(()),
            404 => Err(ClientError::NotFound),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }

    async fn delete_doc(&self, id: i64) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/docs/{id}")))
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 204 => Ok(()),
            404 => Err(ClientError::NotFound),
            status => Err(ClientError::UnexpectedStatus(status)),
        }
    }
}
