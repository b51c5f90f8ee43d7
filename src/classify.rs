// 🔎 Page Classification - Who created it, and what kind of item is it?
//
// Both lookups are allowed to fail without failing the revision:
// - creator lookup fails closed (no creator)
// - entity lookup downgrades (not distinguished)
// The reason is kept so the fallback shows up in logs and tests.

use crate::source::{EntityClaims, EntityLookup, RevisionSource};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

// ============================================================================
// CREATOR RESOLUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NoCreatorReason {
    /// Oldest revision could not be fetched
    LookupFailed(String),

    /// Page predates the creation cutoff
    CreatedBeforeCutoff(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreatorResolution {
    Creator {
        author: String,
        created_at: DateTime<Utc>,
    },
    NoCreator {
        reason: NoCreatorReason,
    },
}

impl CreatorResolution {
    pub fn author(&self) -> Option<&str> {
        match self {
            CreatorResolution::Creator { author, .. } => Some(author.as_str()),
            CreatorResolution::NoCreator { .. } => None,
        }
    }

    pub fn is_creator(&self, username: &str) -> bool {
        self.author() == Some(username)
    }
}

/// Author of the page's first revision, if it was made strictly after `cutoff`
pub fn resolve_creator(
    source: &dyn RevisionSource,
    wiki: &str,
    title: &str,
    cutoff: DateTime<Utc>,
) -> CreatorResolution {
    let oldest = match source.fetch_oldest_revision(wiki, title) {
        Ok(oldest) => oldest,
        Err(e) => {
            warn!(wiki, title, error = %e, "creator lookup failed, treating page as uncreated");
            return CreatorResolution::NoCreator {
                reason: NoCreatorReason::LookupFailed(e.to_string()),
            };
        }
    };

    if oldest.timestamp <= cutoff {
        debug!(wiki, title, created = %oldest.timestamp, "page predates creation cutoff");
        return CreatorResolution::NoCreator {
            reason: NoCreatorReason::CreatedBeforeCutoff(oldest.timestamp),
        };
    }

    CreatorResolution::Creator {
        author: oldest.author,
        created_at: oldest.timestamp,
    }
}

// ============================================================================
// ENTITY CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EntityClassification {
    Classified(EntityClaims),
    Unclassified { reason: String },
}

impl EntityClassification {
    pub fn declares(&self, relation: &str, value: &str) -> bool {
        match self {
            EntityClassification::Classified(claims) => claims.declares(relation, value),
            EntityClassification::Unclassified { .. } => false,
        }
    }
}

pub fn classify_page(lookup: &dyn EntityLookup, wiki: &str, title: &str) -> EntityClassification {
    match lookup.classify_entity(wiki, title) {
        Ok(Some(claims)) => EntityClassification::Classified(claims),
        Ok(None) => EntityClassification::Unclassified {
            reason: "page has no linked item".to_string(),
        },
        Err(e) => {
            warn!(wiki, title, error = %e, "entity classification failed, downgrading");
            EntityClassification::Unclassified {
                reason: e.to_string(),
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
