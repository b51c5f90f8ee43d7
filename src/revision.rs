// 📝 Revisions - What the scorer reads from a wiki
// Immutable once fetched; produced by a RevisionSource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// FULL REVISION
// ============================================================================

/// One edit on one wiki, with everything known about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Wiki database name (enwiki, wikidatawiki, ...)
    pub wiki: String,

    pub title: String,

    pub revid: u64,

    /// None (or 0 in fixtures) when the revision created the page
    #[serde(default, deserialize_with = "deserialize_parent")]
    pub parent_id: Option<u64>,

    /// Author of the edit
    pub user: String,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Full page text after the edit (JSON for structured items)
    #[serde(default)]
    pub text: String,
}

/// MediaWiki reports "no parent" as parentid 0
fn deserialize_parent<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<u64> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|id| *id != 0))
}

impl Revision {
    pub fn summary(&self) -> RevisionSummary {
        RevisionSummary {
            title: self.title.clone(),
            revid: self.revid,
            timestamp: self.timestamp,
            comment: self.comment.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn content(&self) -> RevisionContent {
        RevisionContent {
            parent_id: self.parent_id,
            text: self.text.clone(),
            tags: self.tags.clone(),
        }
    }
}

// ============================================================================
// COLLABORATOR VIEWS
// ============================================================================

/// Entry in a user's contribution list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionSummary {
    pub title: String,
    pub revid: u64,
    pub timestamp: DateTime<Utc>,
    pub comment: String,
    pub tags: Vec<String>,
}

/// Text and parent of a single revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionContent {
    pub parent_id: Option<u64>,
    pub text: String,
    pub tags: Vec<String>,
}

/// First revision of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OldestRevision {
    pub author: String,
    pub timestamp: DateTime<Utc>,
}
