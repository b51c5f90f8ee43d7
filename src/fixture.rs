// 🗂️ Fixture Source - Offline revision history from a JSON dump
//
// Implements both collaborator traits over an in-memory snapshot, so a run
// can be replayed without network access (and tests use it as a fake).

use crate::error::{ScoringError, ScoringResult};
use crate::participant::Participant;
use crate::revision::{OldestRevision, Revision, RevisionContent};
use crate::source::{EntityClaims, EntityLookup, RevisionOrder, RevisionSource, RevisionStream};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

// ============================================================================
// FIXTURE FORMAT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Revisions by every user, including page creations by non-participants
    #[serde(default)]
    pub revisions: Vec<Revision>,

    /// wiki → page title → linked item claims
    #[serde(default)]
    pub entities: BTreeMap<String, BTreeMap<String, EntityClaims>>,

    /// Result of the relevance query over structured items
    #[serde(default)]
    pub relevant_entities: BTreeSet<String>,
}

// ============================================================================
// FIXTURE SOURCE
// ============================================================================

#[derive(Debug, Clone)]
pub struct FixtureSource {
    fixture: Fixture,
    order: RevisionOrder,
}

impl FixtureSource {
    pub fn new(fixture: Fixture) -> Self {
        FixtureSource {
            fixture,
            order: RevisionOrder::Descending,
        }
    }

    /// Serve contributions in file order instead of newest first
    pub fn unordered(mut self) -> Self {
        self.order = RevisionOrder::Unordered;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read fixture file: {:?}", path.as_ref()))?;

        let fixture: Fixture =
            serde_json::from_str(&content).context("Failed to parse fixture JSON")?;

        Ok(FixtureSource::new(fixture))
    }

    pub fn participants(&self) -> &[Participant] {
        &self.fixture.participants
    }

    pub fn relevant_entities(&self) -> BTreeSet<String> {
        self.fixture.relevant_entities.clone()
    }

    pub fn revision_count(&self) -> usize {
        self.fixture.revisions.len()
    }

    fn find(&self, wiki: &str, revid: u64) -> Option<&Revision> {
        self.fixture
            .revisions
            .iter()
            .find(|rev| rev.wiki == wiki && rev.revid == revid)
    }
}

impl RevisionSource for FixtureSource {
    fn list_revisions<'a>(
        &'a self,
        wiki: &str,
        username: &str,
        end: DateTime<Utc>,
        _start: DateTime<Utc>,
    ) -> ScoringResult<RevisionStream<'a>> {
        let mut revisions: Vec<&Revision> = self
            .fixture
            .revisions
            .iter()
            .filter(|rev| rev.wiki == wiki && rev.user == username)
            .collect();

        if self.order == RevisionOrder::Descending {
            // Contribution lists start at `end`, newest first
            revisions.retain(|rev| rev.timestamp <= end);
            revisions.sort_by(|a, b| {
                b.timestamp
                    .cmp(&a.timestamp)
                    .then_with(|| b.revid.cmp(&a.revid))
            });
        }

        Ok(Box::new(
            revisions
                .into_iter()
                .map(|rev| Ok::<_, ScoringError>(rev.summary())),
        ))
    }

    fn fetch_revision_content(&self, wiki: &str, revid: u64) -> ScoringResult<RevisionContent> {
        self.find(wiki, revid)
            .map(Revision::content)
            .ok_or_else(|| ScoringError::RevisionNotFound {
                wiki: wiki.to_string(),
                revid,
            })
    }

    fn fetch_old_version(&self, wiki: &str, title: &str, revid: u64) -> ScoringResult<String> {
        if revid == 0 {
            return Ok(String::new());
        }

        match self.find(wiki, revid) {
            Some(rev) if rev.title == title => Ok(rev.text.clone()),
            Some(rev) => Err(ScoringError::collaborator(
                wiki,
                format!("rev {} belongs to {:?}, not {:?}", revid, rev.title, title),
            )),
            None => Err(ScoringError::RevisionNotFound {
                wiki: wiki.to_string(),
                revid,
            }),
        }
    }

    fn fetch_oldest_revision(&self, wiki: &str, title: &str) -> ScoringResult<OldestRevision> {
        self.fixture
            .revisions
            .iter()
            .filter(|rev| rev.wiki == wiki && rev.title == title)
            .min_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.revid.cmp(&b.revid)))
            .map(|rev| OldestRevision {
                author: rev.user.clone(),
                timestamp: rev.timestamp,
            })
            .ok_or_else(|| ScoringError::PageNotFound {
                wiki: wiki.to_string(),
                title: title.to_string(),
            })
    }

    fn ordering(&self) -> RevisionOrder {
        self.order
    }
}

impl EntityLookup for FixtureSource {
    fn classify_entity(&self, wiki: &str, title: &str) -> ScoringResult<Option<EntityClaims>> {
        Ok(self
            .fixture
            .entities
            .get(wiki)
            .and_then(|pages| pages.get(title))
            .cloned())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "participants": [{"username": "Alice", "activities": [{"wiki": "enwiki"}]}],
        "revisions": [
            {"wiki": "enwiki", "title": "Page", "revid": 1, "parent_id": 0, "user": "Bob",
             "timestamp": "2025-07-01T00:00:00Z", "text": "stub"},
            {"wiki": "enwiki", "title": "Page", "revid": 5, "parent_id": 1, "user": "Alice",
             "timestamp": "2025-08-03T00:00:00Z", "text": "stub + link"},
            {"wiki": "enwiki", "title": "Other", "revid": 7, "user": "Alice",
             "timestamp": "2025-10-03T00:00:00Z", "text": "late"},
            {"wiki": "enwiki", "title": "Page", "revid": 6, "parent_id": 5, "user": "Alice",
             "timestamp": "2025-08-04T00:00:00Z", "text": "more"}
        ],
        "entities": {"enwiki": {"Page": {"id": "Q1", "claims": {"P31": ["Q5"]}}}},
        "relevant_entities": ["Q9"]
    }"#;

    fn source() -> FixtureSource {
        FixtureSource::new(serde_json::from_str(FIXTURE).unwrap())
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_contributions_newest_first_up_to_end() {
        let source = source();
        let revids: Vec<u64> = source
            .list_revisions("enwiki", "Alice", at("2025-09-30T23:59:59Z"), at("2025-08-01T00:00:00Z"))
            .unwrap()
            .map(|rev| rev.unwrap().revid)
            .collect();

        assert_eq!(revids, vec![6, 5]);
    }

    #[test]
    fn test_unordered_keeps_file_order() {
        let source = source().unordered();
        let revids: Vec<u64> = source
            .list_revisions("enwiki", "Alice", at("2025-09-30T23:59:59Z"), at("2025-08-01T00:00:00Z"))
            .unwrap()
            .map(|rev| rev.unwrap().revid)
            .collect();

        assert_eq!(revids, vec![5, 7, 6]);
        assert_eq!(source.ordering(), RevisionOrder::Unordered);
    }

    #[test]
    fn test_content_and_old_version() {
        let source = source();
        let content = source.fetch_revision_content("enwiki", 5).unwrap();

        assert_eq!(content.parent_id, Some(1));
        assert_eq!(source.fetch_old_version("enwiki", "Page", 1).unwrap(), "stub");
        assert_eq!(source.fetch_old_version("enwiki", "Page", 0).unwrap(), "");
        assert!(source.fetch_old_version("enwiki", "Other", 1).is_err());
        assert!(matches!(
            source.fetch_revision_content("enwiki", 99),
            Err(ScoringError::RevisionNotFound { revid: 99, .. })
        ));
    }

    #[test]
    fn test_oldest_revision_and_entities() {
        let source = source();
        let oldest = source.fetch_oldest_revision("enwiki", "Page").unwrap();

        assert_eq!(oldest.author, "Bob");
        assert!(source.fetch_oldest_revision("enwiki", "Missing").is_err());

        let claims = source.classify_entity("enwiki", "Page").unwrap().unwrap();
        assert!(claims.declares("P31", "Q5"));
        assert!(source.classify_entity("enwiki", "Other").unwrap().is_none());

        assert!(source.relevant_entities().contains("Q9"));
        assert_eq!(source.participants().len(), 1);
    }
}
