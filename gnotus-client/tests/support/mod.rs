//! Shared test support: a scriptable in-memory Gnotus API
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;

use gnotus_client::{
    ClientError, ClientResult, ConditionalFetch, Doc, DocCreate, DocInfo, DocTreeNode, DocUpdate,
    DocsApi, MoveDirection,
};

/// In-memory [`DocsApi`] with call counters and a gate for ordering tests
#[derive(Default)]
pub struct MockApi {
    docs: Mutex<HashMap<String, Doc>>,
    outline_tree: Mutex<Option<DocTreeNode>>,
    next_create: Mutex<Option<Doc>>,

    pub full_fetches: AtomicUsize,
    pub conditional_fetches: AtomicUsize,
    pub outline_fetches: AtomicUsize,

    /// When set, every call fails with a transport-style error
    pub fail_transport: AtomicBool,

    conditional_gate: Mutex<Option<Arc<Notify>>>,
    full_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this document, keyed by its urlpath
    pub fn insert_doc(&self, doc: Doc) {
        self.docs
            .lock()
            .unwrap()
            .insert(doc.urlpath.trim_start_matches('/').to_string(), doc);
    }

    /// Stop serving the document at `path` (deleted / became private)
    pub fn remove_doc(&self, path: &str) {
        self.docs
            .lock()
            .unwrap()
            .remove(path.trim_start_matches('/'));
    }

    pub fn set_outline(&self, tree: DocTreeNode) {
        *self.outline_tree.lock().unwrap() = Some(tree);
    }

    /// Script the response of the next `create_doc` call
    pub fn expect_create(&self, doc: Doc) {
        *self.next_create.lock().unwrap() = Some(doc);
    }

    /// Block conditional fetches until the returned handle is notified
    pub fn gate_conditional(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.conditional_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Block full fetches until the returned handle is notified
    pub fn gate_full(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.full_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn check_transport(&self) -> ClientResult<()> {
        if self.fail_transport.load(Ordering::SeqCst) {
            Err(ClientError::UnexpectedStatus(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocsApi for MockApi {
    async fn doc_by_path(&self, path: &str) -> ClientResult<Option<Doc>> {
        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.full_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_transport()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .get(path.trim_start_matches('/'))
            .cloned())
    }

    async fn doc_if_changed(
        &self,
        path: &str,
        updated_at: chrono::DateTime<Utc>,
    ) -> ClientResult<ConditionalFetch> {
        self.conditional_fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.conditional_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_transport()?;
        let doc = self
            .docs
            .lock()
            .unwrap()
            .get(path.trim_start_matches('/'))
            .cloned();
        match doc {
            None => Ok(ConditionalFetch::Missing),
            Some(doc) if doc.updated_at == updated_at => Ok(ConditionalFetch::Unchanged),
            Some(doc) => Ok(ConditionalFetch::Changed(Box::new(doc))),
        }
    }

    async fn doc_by_id(&self, id: i64, _include_source: bool) -> ClientResult<Option<Doc>> {
        self.check_transport()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn outline(&self, depth: Option<u32>) -> ClientResult<DocTreeNode> {
        self.outline_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;
        let tree = self
            .outline_tree
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClientError::NotFound)?;
        if depth == Some(1) {
            // Depth-limited responses carry childless children
            let mut limited = tree.clone();
            for child in &mut limited.children {
                child.children.clear();
            }
            return Ok(limited);
        }
        Ok(tree)
    }

    async fn create_doc(&self, _create: &DocCreate) -> ClientResult<Doc> {
        self.check_transport()?;
        let doc = self
            .next_create
            .lock()
            .unwrap()
            .take()
            .expect("create_doc called without expect_create");
        self.insert_doc(doc.clone());
        Ok(doc)
    }

    async fn update_doc(&self, id: i64, update: &DocUpdate) -> ClientResult<Doc> {
        self.check_transport()?;
        let mut docs = self.docs.lock().unwrap();
        let old_path = docs
            .values()
            .find(|d| d.id == id)
            .map(|d| d.urlpath.trim_start_matches('/').to_string())
            .ok_or(ClientError::NotFound)?;
        let mut doc = docs.remove(&old_path).unwrap();

        if let Some(title) = &update.title {
            doc.title = title.clone();
        }
        if let Some(slug) = &update.slug {
            doc.slug = slug.clone();
            doc.urlpath = match doc.urlpath.rsplit_once('/') {
                Some((base, _)) => format!("{base}/{slug}"),
                None => slug.clone(),
            };
        }
        if let Some(markdown) = &update.markdown {
            doc.markdown = markdown.clone();
        }
        if let Some(public) = update.public {
            doc.public = public;
        }
        doc.updated_at = Utc::now();

        docs.insert(doc.urlpath.clone(), doc.clone());
        Ok(doc)
    }

    async fn move_doc(&self, id: i64, _direction: MoveDirection) -> ClientResult<()> {
        self.check_transport()?;
        let docs = self.docs.lock().unwrap();
        if docs.values().any(|d| d.id == id) {
            Ok(())
        } else {
            Err(ClientError::NotFound)
        }
    }

    async fn delete_doc(&self, id: i64) -> ClientResult<()> {
        self.check_transport()?;
        let mut docs = self.docs.lock().unwrap();
        let path = docs
            .values()
            .find(|d| d.id == id)
            .map(|d| d.urlpath.clone())
            .ok_or(ClientError::NotFound)?;
        docs.remove(&path);
        Ok(())
    }
}

/// A document with sensible defaults for tests
pub fn make_doc(id: i64, path: &str, title: &str) -> Doc {
    Doc {
        id,
        parent_id: Some(1),
        title: title.to_string(),
        slug: path.rsplit('/').next().unwrap_or(path).to_string(),
        urlpath: path.trim_start_matches('/').to_string(),
        public: true,
        metadata: Default::default(),
        markdown: format!("# {title}"),
        html: format!("<h1>{title}</h1>"),
        created_at: Utc::now() - Duration::days(7),
        updated_at: Utc::now() - Duration::minutes(30),
        updated_by_id: Some(1),
        parents: Vec::new(),
        children: Vec::new(),
    }
}

/// A parent/child reference for `parents` lists
pub fn make_info(id: i64, path: &str, title: &str) -> DocInfo {
    DocInfo {
        id,
        title: title.to_string(),
        urlpath: path.trim_start_matches('/').to_string(),
        public: Some(true),
    }
}

/// A small outline: home with two top-level sections, one nested page
pub fn make_outline() -> DocTreeNode {
    DocTreeNode {
        id: 1,
        title: "Home".to_string(),
        urlpath: "".to_string(),
        public: true,
        children: vec![
            DocTreeNode {
                id: 2,
                title: "Guides".to_string(),
                urlpath: "guides".to_string(),
                public: true,
                children: vec![DocTreeNode {
                    id: 3,
                    title: "Install".to_string(),
                    urlpath: "guides/install".to_string(),
                    public: true,
                    children: Vec::new(),
                }],
            },
            DocTreeNode {
                id: 4,
                title: "Reference".to_string(),
                urlpath: "reference".to_string(),
                public: false,
                children: Vec::new(),
            },
        ],
    }
}
