//! Document resolution: cache-then-revalidate with optimistic display
//!
//! Implements the read path for a document view. A fresh cache entry is
//! shown immediately while a conditional fetch races to confirm it; a miss
//! or an expired entry triggers a full fetch. Results are committed to the
//! view only while their path is still the active one, so a late response
//! for an abandoned navigation is discarded rather than applied.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::api::{ConditionalFetch, DocsApi};
use crate::cache::DocCache;
use crate::doc::Doc;

/// Where the currently displayed document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocSource {
    /// Optimistically rendered from the cache, revalidation may still be
    /// in flight
    Cache,

    /// Server-authoritative copy
    Server,
}

/// How a fragment scroll should be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    /// Instant jump, used when the reduced-motion preference is set
    Instant,
}

/// Request to bring an in-page anchor into view
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    /// Fragment identifier without the leading `#`
    pub anchor: String,
    pub behavior: ScrollBehavior,
}

/// User-visible failure modes of the read path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// Absent or forbidden; the two are indistinguishable by design
    NotFound,

    /// Transport or parse failure; already-displayed content is kept
    LoadFailed,
}

impl ViewError {
    /// The message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => {
                "The document you are looking for does not exist, \
                 or you do not have permission to view it."
            }
            Self::LoadFailed => "Failed to load document. Please try again later.",
        }
    }
}

/// Observable state of the document view
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The path this view currently resolves; results for any other path
    /// must not be committed
    pub path: String,

    /// The displayed document, if any
    pub doc: Option<Doc>,

    /// Provenance of `doc`
    pub source: Option<DocSource>,

    pub error: Option<ViewError>,

    /// True only while a full fetch blocks the initial render
    pub loading: bool,

    /// Pending fragment scroll, consumed by the host UI
    pub scroll: Option<ScrollRequest>,
}

/// The document cache and staleness reconciler.
///
/// One resolver owns one view. Navigation calls [`DocResolver::resolve`];
/// interested parties observe the view through [`DocResolver::subscribe`].
pub struct DocResolver {
    cache: Arc<DocCache>,
    api: Arc<dyn DocsApi>,
    reduced_motion: bool,
    state: watch::Sender<ViewState>,
}

impl DocResolver {
    /// Create a resolver over the given cache and API
    pub fn new(cache: Arc<DocCache>, api: Arc<dyn DocsApi>, reduced_motion: bool) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            cache,
            api,
            reduced_motion,
            state,
        }
    }

    /// Watch the view state; every commit is observable here
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Snapshot of the current view state
    pub fn view(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Resolve a path into the view.
    ///
    /// Returns the view state as of the end of this resolution, which later
    /// navigations may have superseded.
    pub async fn resolve(&self, path: &str, fragment: Option<&str>) -> ViewState {
        let path = path.trim_start_matches('/').to_string();

        // Same document already displayed: nothing to fetch, but a trailing
        // fragment still needs a scroll. Keyed on the document's own urlpath,
        // not the previous request path, since a rename can transiently show
        // one cached object under two paths.
        let displayed = self.state.borrow().clone();
        if let Some(doc) = &displayed.doc {
            if doc.urlpath.trim_start_matches('/') == path {
                let scroll = self.scroll_request(doc, fragment);
                self.state.send_modify(|state| {
                    state.path = path.clone();
                    state.loading = false;
                    state.scroll = scroll;
                });
                return self.view();
            }
        }

        // Restart the machine for the new key. A superseded fetch can no
        // longer commit, so its loading flag is cleared here as well.
        self.state.send_modify(|state| {
            state.path = path.clone();
            state.error = None;
            state.loading = false;
            state.scroll = None;
        });

        match self.cache.read_fresh::<Doc>(&DocCache::doc_key(&path)) {
            Some(cached) => self.revalidate(&path, cached, fragment).await,
            None => self.fetch_full(&path, fragment).await,
        }

        self.view()
    }

    /// Hit-fresh branch: show the cached copy, then confirm it against the
    /// server using `updated_at` as the validation token.
    async fn revalidate(&self, path: &str, cached: Doc, fragment: Option<&str>) {
        let token = cached.updated_at;
        let scroll = self.scroll_request(&cached, fragment);
        self.commit(path, |state| {
            state.doc = Some(cached);
            state.source = Some(DocSource::Cache);
            state.scroll = scroll;
        });

        match self.api.doc_if_changed(path, token).await {
            Ok(ConditionalFetch::Unchanged) => {
                debug!(path, "cached copy confirmed current");
            }
            Ok(ConditionalFetch::Changed(doc)) => {
                self.cache.write(&DocCache::doc_key(path), &doc);
                let scroll = self.scroll_request(&doc, fragment);
                self.commit(path, |state| {
                    state.doc = Some(*doc);
                    state.source = Some(DocSource::Server);
                    state.scroll = scroll;
                });
            }
            Ok(ConditionalFetch::Missing) => {
                // Overrides the optimistically shown stale copy
                self.cache.invalidate(&DocCache::doc_key(path));
                self.commit(path, |state| {
                    state.doc = None;
                    state.source = None;
                    state.error = Some(ViewError::NotFound);
                    state.scroll = None;
                });
            }
            Err(err) => {
                // Transient failure: the stale copy stays on screen
                error!(path, %err, "conditional fetch failed");
                self.commit(path, |state| state.error = Some(ViewError::LoadFailed));
            }
        }
    }

    /// Miss/expired branch: one full fetch before anything is shown
    async fn fetch_full(&self, path: &str, fragment: Option<&str>) {
        self.commit(path, |state| state.loading = true);

        match self.api.doc_by_path(path).await {
            Ok(Some(doc)) => {
                self.cache.write(&DocCache::doc_key(path), &doc);
                let scroll = self.scroll_request(&doc, fragment);
                self.commit(path, |state| {
                    state.doc = Some(doc);
                    state.source = Some(DocSource::Server);
                    state.loading = false;
                    state.scroll = scroll;
                });
            }
            Ok(None) => {
                self.cache.invalidate(&DocCache::doc_key(path));
                self.commit(path, |state| {
                    state.doc = None;
                    state.source = None;
                    state.error = Some(ViewError::NotFound);
                    state.loading = false;
                });
            }
            Err(err) => {
                error!(path, %err, "full fetch failed");
                self.commit(path, |state| {
                    state.error = Some(ViewError::LoadFailed);
                    state.loading = false;
                });
            }
        }
    }

    /// Apply a state change only if `path` is still the active path.
    /// Last-applicable-result wins, not last-arrived.
    fn commit(&self, path: &str, apply: impl FnOnce(&mut ViewState)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if state.path == path {
                apply(state);
                applied = true;
            }
            applied
        });
        if !applied {
            warn!(path, "discarding fetch result for superseded path");
        }
        applied
    }

    /// Map a URL fragment onto the document's section anchors. A fragment
    /// with no matching anchor is a non-fatal condition.
    fn scroll_request(&self, doc: &Doc, fragment: Option<&str>) -> Option<ScrollRequest> {
        let anchor = fragment?.trim_start_matches('#');
        if anchor.is_empty() {
            return None;
        }
        if doc.metadata.subtitles.iter().any(|s| s.hash == anchor) {
            let behavior = if self.reduced_motion {
                ScrollBehavior::Instant
            } else {
                ScrollBehavior::Smooth
            };
            Some(ScrollRequest {
                anchor: anchor.to_string(),
                behavior,
            })
        } else {
            warn!(anchor, urlpath = %doc.urlpath, "no element matches fragment");
            None
        }
    }
}
