//! Navigation outline with TTL-only caching
//!
//! The outline follows the same cache-then-fetch shape as documents but is
//! never conditionally revalidated: a fresh cache entry is trusted for the
//! whole TTL window. Outline changes are rare and a stale sidebar is
//! tolerable; mutations shortcut the window through the outline-changed
//! broadcast instead.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::api::DocsApi;
use crate::cache::{DocCache, OUTLINE_KEY, OUTLINE_TOPLEVEL_KEY};
use crate::doc::DocTreeNode;
use crate::error::ClientResult;
use crate::events::ClientEvent;

/// Cached view of the navigation tree
pub struct OutlineView {
    cache: Arc<DocCache>,
    api: Arc<dyn DocsApi>,
    outline: watch::Sender<Option<DocTreeNode>>,
}

impl OutlineView {
    /// Create an outline view over the given cache and API
    pub fn new(cache: Arc<DocCache>, api: Arc<dyn DocsApi>) -> Self {
        let (outline, _) = watch::channel(None);
        Self {
            cache,
            api,
            outline,
        }
    }

    /// Watch the full-depth outline as it loads and refreshes
    pub fn subscribe(&self) -> watch::Receiver<Option<DocTreeNode>> {
        self.outline.subscribe()
    }

    /// Snapshot of the currently loaded outline
    pub fn current(&self) -> Option<DocTreeNode> {
        self.outline.borrow().clone()
    }

    /// Load the full-depth outline, serving a fresh cache entry as-is
    pub async fn load(&self) -> ClientResult<DocTreeNode> {
        if let Some(tree) = self.cache.read_fresh::<DocTreeNode>(OUTLINE_KEY) {
            debug!("outline served from cache");
            self.outline.send_replace(Some(tree.clone()));
            return Ok(tree);
        }
        self.refresh().await
    }

    /// Load the depth-1 outline for the home page. Only the children of the
    /// root are kept, matching the persisted format.
    pub async fn load_toplevel(&self) -> ClientResult<Vec<DocTreeNode>> {
        if let Some(children) = self.cache.read_fresh::<Vec<DocTreeNode>>(OUTLINE_TOPLEVEL_KEY) {
            debug!("toplevel outline served from cache");
            return Ok(children);
        }
        let tree = self.api.outline(Some(1)).await?;
        self.cache.write(OUTLINE_TOPLEVEL_KEY, &tree.children);
        Ok(tree.children)
    }

    /// Unconditionally refetch the full outline and rewrite the cache
    pub async fn refresh(&self) -> ClientResult<DocTreeNode> {
        let tree = self.api.outline(None).await?;
        self.cache.write(OUTLINE_KEY, &tree);
        self.outline.send_replace(Some(tree.clone()));
        Ok(tree)
    }

    /// Refetch whenever the document tree changes shape. Runs until the
    /// event bus is dropped; callers spawn this on their runtime.
    pub async fn listen(&self, mut events: broadcast::Receiver<ClientEvent>) {
        loop {
            match events.recv().await {
                Ok(ClientEvent::OutlineChanged) => {
                    if let Err(err) = self.refresh().await {
                        warn!(%err, "outline refetch after change failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "outline listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
