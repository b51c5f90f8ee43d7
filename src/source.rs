// 🔌 Collaborator Interfaces
// The scorer never fetches on its own: a run is handed a RevisionSource and
// an EntityLookup, both of which may block.

use crate::error::ScoringResult;
use crate::revision::{OldestRevision, RevisionContent, RevisionSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordering guarantee of a contribution stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionOrder {
    /// Newest first; the scorer may stop at the first revision before the window
    Descending,

    /// No guarantee; every revision is examined
    Unordered,
}

pub type RevisionStream<'a> = Box<dyn Iterator<Item = ScoringResult<RevisionSummary>> + 'a>;

// ============================================================================
// REVISION SOURCE
// ============================================================================

pub trait RevisionSource {
    /// A user's contributions on one wiki, starting at `end` and walking
    /// back towards `start`
    fn list_revisions<'a>(
        &'a self,
        wiki: &str,
        username: &str,
        end: DateTime<Utc>,
        start: DateTime<Utc>,
    ) -> ScoringResult<RevisionStream<'a>>;

    fn fetch_revision_content(&self, wiki: &str, revid: u64) -> ScoringResult<RevisionContent>;

    /// Text of `title` at `revid`; empty when there is no such version
    fn fetch_old_version(&self, wiki: &str, title: &str, revid: u64) -> ScoringResult<String>;

    fn fetch_oldest_revision(&self, wiki: &str, title: &str) -> ScoringResult<OldestRevision>;

    fn ordering(&self) -> RevisionOrder {
        RevisionOrder::Descending
    }
}

// ============================================================================
// ENTITY LOOKUP
// ============================================================================

/// Claims of the linked-data item attached to a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityClaims {
    /// Item id, e.g. Q42
    pub id: String,

    /// Property → item values
    #[serde(default)]
    pub claims: BTreeMap<String, Vec<String>>,
}

impl EntityClaims {
    pub fn declares(&self, relation: &str, value: &str) -> bool {
        self.claims
            .get(relation)
            .map_or(false, |values| values.iter().any(|v| v == value))
    }
}

pub trait EntityLookup {
    /// Ok(None) when the page has no linked item
    fn classify_entity(&self, wiki: &str, title: &str) -> ScoringResult<Option<EntityClaims>>;
}
