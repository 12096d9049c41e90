//! Wire types for the Gnotus REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A full document as served by `GET /api/docs/by_path`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doc {
    /// Stable, server-assigned identity
    pub id: i64,

    /// Parent document, `None` only for the home document
    pub parent_id: Option<i64>,

    pub title: String,
    pub slug: String,

    /// Current human-readable location; changes on rename or move
    pub urlpath: String,

    pub public: bool,

    #[serde(default)]
    pub metadata: DocMetadata,

    /// Markdown source; empty unless fetched with `include_source`
    #[serde(default)]
    pub markdown: String,

    /// Rendered HTML (sanitized before display by the host UI)
    #[serde(default)]
    pub html: String,

    pub created_at: DateTime<Utc>,

    /// Sole field used to decide whether a cached copy is stale
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_by_id: Option<i64>,

    /// Ancestor chain, nearest first
    #[serde(default)]
    pub parents: Vec<DocInfo>,

    /// Direct descendants
    #[serde(default)]
    pub children: Vec<DocInfo>,
}

/// Abbreviated document reference used in parent/child lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocInfo {
    pub id: i64,
    pub title: String,
    pub urlpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Document metadata extracted at render time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocMetadata {
    /// Ordered in-page section anchors
    #[serde(default)]
    pub subtitles: Vec<Subtitle>,
}

/// An in-page heading anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    /// Fragment identifier without the leading `#`
    pub hash: String,
    pub title: String,
}

/// A node of the navigation outline tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTreeNode {
    pub id: i64,
    pub title: String,
    pub urlpath: String,
    pub public: bool,
    #[serde(default)]
    pub children: Vec<DocTreeNode>,
}

/// Payload for document creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocCreate {
    pub parent_id: i64,
    pub title: String,
    pub slug: String,
    pub public: bool,
}

/// Payload for document update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Direction for sibling reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Query-parameter form used by the move endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Authenticated user identity, as far as the cache cares about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Viewer,
}
