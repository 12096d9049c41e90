//! Gnotus client - document cache and staleness reconciliation
//!
//! Client-side core of the Gnotus documentation app. It owns the logic for
//! reading a document (or the navigation outline) from a persistent local
//! cache, deciding whether the cached copy may be shown immediately, and
//! reconciling it against the server with a conditional fetch keyed on the
//! document's `updated_at` timestamp.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     GNOTUS CLIENT                        │
//! │                                                          │
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────────┐   │
//! │  │    Doc     │   │   Outline   │   │    Editor      │   │
//! │  │  Resolver  │   │    View     │   │   Session      │   │
//! │  └─────┬──────┘   └──────┬──────┘   └───────┬────────┘   │
//! │        │                 │                  │            │
//! │        └────────┬────────┴───────┬──────────┘            │
//! │                 │                │                       │
//! │           ┌─────▼─────┐    ┌─────▼─────┐                 │
//! │           │ Doc Cache │    │ Docs API  │                 │
//! │           │ (TTL, ns) │    │ (REST)    │                 │
//! │           └─────┬─────┘    └───────────┘                 │
//! │                 │                                        │
//! │           ┌─────▼─────┐                                  │
//! │           │  Storage  │  (localStorage analog)           │
//! │           └───────────┘                                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gnotus_client::{ClientConfig, GnotusClient};
//!
//! let client = GnotusClient::new(ClientConfig::default())?;
//!
//! // Navigate: cached copy shown immediately, revalidated in the background
//! let view = client.resolve_doc("guides/install", None).await;
//!
//! // Sidebar: TTL-trusted outline
//! let outline = client.outline().load().await?;
//!
//! // Edit and save; the cache invalidation contract runs on success
//! let mut session = client.fetch_for_edit(42).await?;
//! session.markdown.push_str("\n\nNew section.");
//! client.save_doc(&mut session).await?;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod doc;
pub mod editor;
pub mod error;
pub mod events;
pub mod outline;
pub mod resolver;
pub mod store;

pub use api::{ConditionalFetch, DocsApi, RestApi};
pub use cache::{CacheEntry, DocCache, OUTLINE_KEY, OUTLINE_TOPLEVEL_KEY};
pub use config::{ApiConfig, CacheConfig, ClientConfig};
pub use doc::{
    Doc, DocCreate, DocInfo, DocMetadata, DocTreeNode, DocUpdate, MoveDirection, Role, Subtitle,
    User,
};
pub use editor::{navigation_guard, EditorSession, GuardDecision};
pub use error::{ClientError, ClientResult};
pub use events::{ClientEvent, EventBus};
pub use outline::OutlineView;
pub use resolver::{DocResolver, DocSource, ScrollBehavior, ScrollRequest, ViewError, ViewState};
pub use store::{MemoryStore, StorageBackend};

use std::sync::{Arc, RwLock};

use tracing::info;

/// The main Gnotus client.
///
/// Owns the cache, the API client, the resolver, and the outline view, and
/// exposes every mutation so the cache invalidation contract runs in exactly
/// one place.
pub struct GnotusClient {
    /// Configuration
    config: ClientConfig,

    /// Shared persistent store
    store: Arc<dyn StorageBackend>,

    /// Namespaced TTL cache
    cache: Arc<DocCache>,

    /// REST API client
    api: Arc<dyn DocsApi>,

    /// Document view resolver
    resolver: DocResolver,

    /// Navigation outline view
    outline: OutlineView,

    /// Broadcast bus for outline-changed notifications
    events: EventBus,

    /// Current identity
    user: RwLock<Option<User>>,
}

impl GnotusClient {
    /// Create a client talking to a real server, with in-memory storage
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let api = Arc::new(RestApi::new(&config.api)?);
        Ok(Self::with_api(config, api, Arc::new(MemoryStore::new())))
    }

    /// Create a client with a custom API implementation and store
    pub fn with_api(
        config: ClientConfig,
        api: Arc<dyn DocsApi>,
        store: Arc<dyn StorageBackend>,
    ) -> Self {
        let cache = Arc::new(DocCache::new(config.cache.clone(), store.clone()));
        let resolver = DocResolver::new(cache.clone(), api.clone(), config.reduced_motion);
        let outline = OutlineView::new(cache.clone(), api.clone());

        Self {
            config,
            store,
            cache,
            api,
            resolver,
            outline,
            events: EventBus::new(),
            user: RwLock::new(None),
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The document view resolver
    pub fn resolver(&self) -> &DocResolver {
        &self.resolver
    }

    /// The navigation outline view
    pub fn outline(&self) -> &OutlineView {
        &self.outline
    }

    /// The event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The document cache
    pub fn cache(&self) -> &Arc<DocCache> {
        &self.cache
    }

    /// The underlying persistent store
    pub fn store(&self) -> &Arc<dyn StorageBackend> {
        &self.store
    }

    /// Switch the active identity.
    ///
    /// Cache keys are namespaced per user; logging out purges every
    /// user-namespaced entry so a departing identity's documents cannot be
    /// served to the next one.
    pub fn set_user(&self, user: Option<User>) {
        let prefix = user
            .as_ref()
            .map(|u| format!("user:{}:", u.id))
            .unwrap_or_default();
        if user.is_none() {
            self.cache.purge_user_namespaces();
        }
        self.cache.set_prefix(prefix);
        if let Ok(mut current) = self.user.write() {
            *current = user;
        }
    }

    /// The active identity, if any
    pub fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    /// Resolve a document path into the view; see [`DocResolver::resolve`]
    pub async fn resolve_doc(&self, path: &str, fragment: Option<&str>) -> ViewState {
        self.resolver.resolve(path, fragment).await
    }

    /// Fetch a document with its markdown source and open an editor session
    pub async fn fetch_for_edit(&self, id: i64) -> ClientResult<EditorSession> {
        match self.api.doc_by_id(id, true).await? {
            Some(doc) => Ok(EditorSession::new(doc)),
            None => Err(ClientError::NotFound),
        }
    }

    /// Create a document and run the invalidation contract.
    ///
    /// The new document is cached under its fresh path; its ancestors'
    /// entries are dropped because their child lists changed.
    pub async fn create_doc(&self, create: &DocCreate) -> ClientResult<Doc> {
        let doc = self.api.create_doc(create).await?;
        info!(id = doc.id, urlpath = %doc.urlpath, "document created");

        self.cache.write(&DocCache::doc_key(&doc.urlpath), &doc);
        self.invalidate_parents(&doc.parents);
        self.finish_tree_mutation();
        Ok(doc)
    }

    /// Save an editor session and run the invalidation contract.
    ///
    /// Both the previous and the current path entries are dropped, since a
    /// slug or parent change moves the document.
    pub async fn save_doc(&self, session: &mut EditorSession) -> ClientResult<Doc> {
        let previous_path = session.doc().urlpath.clone();
        let update = session.update_payload();
        let doc = self.api.update_doc(session.doc().id, &update).await?;
        info!(id = doc.id, urlpath = %doc.urlpath, "document saved");

        self.cache.invalidate(&DocCache::doc_key(&previous_path));
        self.cache.invalidate(&DocCache::doc_key(&doc.urlpath));
        self.invalidate_parents(&doc.parents);
        self.finish_tree_mutation();

        session.mark_saved(doc.clone());
        Ok(doc)
    }

    /// Reorder a document among its siblings and run the invalidation
    /// contract for its ancestors and the outline
    pub async fn move_doc(&self, doc: &Doc, direction: MoveDirection) -> ClientResult<()> {
        self.api.move_doc(doc.id, direction).await?;
        info!(id = doc.id, ?direction, "document moved");

        self.invalidate_parents(&doc.parents);
        self.finish_tree_mutation();
        Ok(())
    }

    /// Delete a document and run the invalidation contract
    pub async fn delete_doc(&self, doc: &Doc) -> ClientResult<()> {
        self.api.delete_doc(doc.id).await?;
        info!(id = doc.id, urlpath = %doc.urlpath, "document deleted");

        self.cache.invalidate(&DocCache::doc_key(&doc.urlpath));
        self.invalidate_parents(&doc.parents);
        self.finish_tree_mutation();
        Ok(())
    }

    fn invalidate_parents(&self, parents: &[DocInfo]) {
        // Ancestor pages embed this document in breadcrumbs and child lists
        for parent in parents {
            self.cache.invalidate(&DocCache::doc_key(&parent.urlpath));
        }
    }

    fn finish_tree_mutation(&self) {
        self.cache.invalidate_outlines();
        self.events.emit(ClientEvent::OutlineChanged);
    }
}
