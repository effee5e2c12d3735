//! Video records tracked by the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A source video known to the ledger.
///
/// Created on ingest or on first processing of a previously-unseen file;
/// never deleted by the pipeline. The ledger keeps at most one row per
/// filename via its atomic lookup-or-insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,
    /// Word/gloss label for the sign this video shows
    pub label: String,
    /// Source file name (ledger-unique)
    pub filename: String,
    /// Path to the local file
    pub local_path: String,
    /// Original remote URL, when the file was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Content hash of the source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Fields supplied when registering a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    pub label: String,
    pub filename: String,
    pub local_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl NewVideo {
    /// Create a record for a local file with no remote origin.
    pub fn local(label: impl Into<String>, filename: impl Into<String>, local_path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            filename: filename.into(),
            local_path: local_path.into(),
            remote_url: None,
            content_hash: None,
        }
    }

    /// Attach a content hash.
    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }
}
