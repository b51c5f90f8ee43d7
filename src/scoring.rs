// 🏆 Scoring Rules - Signals → points + justification
//
// Link branch, exactly one tier wins:
//   Base (2)  →  Creator (5)  →  Distinguished (25)
// Distinguished is only reachable through Creator.
// Label branch: one point per newly labelled language.

use crate::classify::{CreatorResolution, EntityClassification};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const BASE_POINTS: u32 = 2;
pub const CREATOR_POINTS: u32 = 5;
pub const DISTINGUISHED_POINTS: u32 = 25;

const LINK_NAME: &str = "Memory of the World link";

// ============================================================================
// DEDUP KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DedupKey {
    pub wiki: String,
    pub title: String,
}

impl DedupKey {
    pub fn new(wiki: &str, title: &str) -> Self {
        DedupKey {
            wiki: wiki.to_string(),
            title: title.to_string(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wiki, self.title)
    }
}

// ============================================================================
// LINK TIERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkTier {
    Base,
    Creator,
    Distinguished,
}

impl LinkTier {
    pub fn points(&self) -> u32 {
        match self {
            LinkTier::Base => BASE_POINTS,
            LinkTier::Creator => CREATOR_POINTS,
            LinkTier::Distinguished => DISTINGUISHED_POINTS,
        }
    }

    pub fn describe(&self, title: &str) -> String {
        match self {
            LinkTier::Base => format!("added {} in {}", LINK_NAME, title),
            LinkTier::Creator => format!("created article {} with {} in it", title, LINK_NAME),
            LinkTier::Distinguished => {
                format!("created list article {} with {} in it", title, LINK_NAME)
            }
        }
    }
}

/// Pick the tier for a qualifying link revision. `classify` is only
/// consulted once the creator tier has been reached.
pub fn link_tier<F>(
    username: &str,
    creator: &CreatorResolution,
    classify: F,
    relation: &str,
    value: &str,
) -> LinkTier
where
    F: FnOnce() -> EntityClassification,
{
    if !creator.is_creator(username) {
        return LinkTier::Base;
    }

    if classify().declares(relation, value) {
        LinkTier::Distinguished
    } else {
        LinkTier::Creator
    }
}

// ============================================================================
// SCORING EVENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Link(LinkTier),
    Labels,
}

impl EventKind {
    /// Link events count once per (wiki, page); label events once per revision
    pub fn deduplicated(&self) -> bool {
        matches!(self, EventKind::Link(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Link(LinkTier::Base) => "link",
            EventKind::Link(LinkTier::Creator) => "article",
            EventKind::Link(LinkTier::Distinguished) => "list_article",
            EventKind::Labels => "labels",
        }
    }
}

/// One counted award. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub username: String,
    pub wiki: String,
    pub title: String,
    pub revid: u64,
    pub points: u32,
    pub description: String,
    pub kind: EventKind,
}

impl ScoringEvent {
    pub fn link(username: &str, wiki: &str, title: &str, revid: u64, tier: LinkTier) -> Self {
        ScoringEvent {
            username: username.to_string(),
            wiki: wiki.to_string(),
            title: title.to_string(),
            revid,
            points: tier.points(),
            description: tier.describe(title),
            kind: EventKind::Link(tier),
        }
    }

    /// None when no language was added: an empty diff is no event, not a zero-point one
    pub fn labels(
        username: &str,
        wiki: &str,
        item: &str,
        revid: u64,
        added: &BTreeSet<String>,
    ) -> Option<Self> {
        if added.is_empty() {
            return None;
        }

        let languages: Vec<&str> = added.iter().map(String::as_str).collect();
        Some(ScoringEvent {
            username: username.to_string(),
            wiki: wiki.to_string(),
            title: item.to_string(),
            revid,
            points: added.len() as u32,
            description: format!("added labels in {} to {}", languages.join(", "), item),
            kind: EventKind::Labels,
        })
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.wiki, &self.title)
    }

    /// Point-tagged justification, e.g. `+2 points, on enwiki added ... (rev 123)`
    pub fn line(&self) -> String {
        format!(
            "+{} points, on {} {} (rev {})",
            self.points, self.wiki, self.description, self.revid
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::NoCreatorReason;
    use crate::source::EntityClaims;
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn creator(author: &str) -> CreatorResolution {
        CreatorResolution::Creator {
            author: author.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap(),
        }
    }

    fn list_item() -> EntityClassification {
        let mut claims = BTreeMap::new();
        claims.insert("P31".to_string(), vec!["Q13406463".to_string()]);
        EntityClassification::Classified(EntityClaims {
            id: "Q77".to_string(),
            claims,
        })
    }

    #[test]
    fn test_tier_monotonicity() {
        assert!(LinkTier::Creator.points() > LinkTier::Base.points());
        assert!(LinkTier::Distinguished.points() > LinkTier::Creator.points());
    }

    #[test]
    fn test_non_creator_never_classified() {
        let called = Cell::new(false);
        let tier = link_tier(
            "Bob",
            &creator("Alice"),
            || {
                called.set(true);
                list_item()
            },
            "P31",
            "Q13406463",
        );

        assert_eq!(tier, LinkTier::Base);
        assert!(!called.get(), "classification must not run below creator tier");
    }

    #[test]
    fn test_creator_and_distinguished_tiers() {
        let plain = link_tier(
            "Alice",
            &creator("Alice"),
            || EntityClassification::Unclassified { reason: "none".to_string() },
            "P31",
            "Q13406463",
        );
        let list = link_tier("Alice", &creator("Alice"), list_item, "P31", "Q13406463");

        assert_eq!(plain, LinkTier::Creator);
        assert_eq!(list, LinkTier::Distinguished);
    }

    #[test]
    fn test_no_creator_is_base() {
        let resolution = CreatorResolution::NoCreator {
            reason: NoCreatorReason::LookupFailed("boom".to_string()),
        };
        assert_eq!(
            link_tier("Alice", &resolution, list_item, "P31", "Q13406463"),
            LinkTier::Base
        );
    }

    #[test]
    fn test_link_event_descriptions() {
        let event = ScoringEvent::link("Alice", "enwiki", "Archive X", 42, LinkTier::Distinguished);

        assert_eq!(event.points, 25);
        assert!(event.description.starts_with("created list article Archive X"));
        assert_eq!(
            event.line(),
            "+25 points, on enwiki created list article Archive X with Memory of the World link in it (rev 42)"
        );
        assert!(event.kind.deduplicated());
        assert_eq!(event.dedup_key(), DedupKey::new("enwiki", "Archive X"));
    }

    #[test]
    fn test_label_event_points_equal_added_languages() {
        let added: BTreeSet<String> = ["fr", "de"].iter().map(|s| s.to_string()).collect();
        let event = ScoringEvent::labels("Alice", "wikidatawiki", "Q42", 7, &added).unwrap();

        assert_eq!(event.points, 2);
        assert_eq!(event.description, "added labels in de, fr to Q42");
        assert!(!event.kind.deduplicated());
    }

    #[test]
    fn test_empty_label_diff_is_no_event() {
        let added = BTreeSet::new();
        assert!(ScoringEvent::labels("Alice", "wikidatawiki", "Q42", 7, &added).is_none());
    }
}
