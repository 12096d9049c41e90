//! Editor drafts and the unsaved-changes navigation guard

use crate::doc::{Doc, DocUpdate};

/// Decision for a pending navigation away from the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Nothing unsaved; navigate freely
    Allow,

    /// Unsaved changes exist; the host UI should prompt before leaving
    Block,
}

/// Draft state for editing one document.
///
/// Holds the loaded document as the baseline and the editable fields as
/// drafts. Dirtiness is a pure comparison against the baseline, so saving
/// (which replaces the baseline) clears it.
#[derive(Debug, Clone)]
pub struct EditorSession {
    doc: Doc,
    pub title: String,
    pub slug: String,
    pub markdown: String,
    pub public: bool,
}

impl EditorSession {
    /// Start editing a document fetched with its markdown source
    pub fn new(doc: Doc) -> Self {
        Self {
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            markdown: doc.markdown.clone(),
            public: doc.public,
            doc,
        }
    }

    /// The document being edited, as last saved
    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    /// Whether any draft field differs from the saved document
    pub fn is_dirty(&self) -> bool {
        self.title != self.doc.title
            || self.slug != self.doc.slug
            || self.markdown != self.doc.markdown
            || self.public != self.doc.public
    }

    /// Build an update payload carrying only the changed fields
    pub fn update_payload(&self) -> DocUpdate {
        DocUpdate {
            title: (self.title != self.doc.title).then(|| self.title.clone()),
            slug: (self.slug != self.doc.slug).then(|| self.slug.clone()),
            parent_id: None,
            markdown: (self.markdown != self.doc.markdown).then(|| self.markdown.clone()),
            public: (self.public != self.doc.public).then_some(self.public),
        }
    }

    /// Reset the baseline after a successful save
    pub fn mark_saved(&mut self, doc: Doc) {
        self.title = doc.title.clone();
        self.slug = doc.slug.clone();
        self.markdown = doc.markdown.clone();
        self.public = doc.public;
        self.doc = doc;
    }

    /// Guard decision for navigating away from this session
    pub fn guard(&self) -> GuardDecision {
        if self.is_dirty() {
            GuardDecision::Block
        } else {
            GuardDecision::Allow
        }
    }
}

/// Guard decision when the editor may or may not be open
pub fn navigation_guard(session: Option<&EditorSession>) -> GuardDecision {
    match session {
        Some(session) => session.guard(),
        None => GuardDecision::Allow,
    }
}
