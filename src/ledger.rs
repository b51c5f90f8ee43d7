// 📒 Ledger - Per-user points and justifications for one run
//
// Invariants:
// - a link event's (wiki, page) key is counted at most once per user
// - total == sum of counted event points
// - entries exist only for users with at least one counted event

use crate::scoring::{DedupKey, ScoringEvent};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// LEDGER ENTRY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub total: u32,

    /// Counted events in insertion order
    pub events: Vec<ScoringEvent>,

    #[serde(skip)]
    counted: BTreeSet<DedupKey>,
}

impl LedgerEntry {
    pub fn has_counted(&self, key: &DedupKey) -> bool {
        self.counted.contains(key)
    }

    /// Point-tagged descriptions in the order they were earned
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ScoringEvent::line).collect()
    }
}

// ============================================================================
// LEDGER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn has_counted(&self, username: &str, key: &DedupKey) -> bool {
        self.entries
            .get(username)
            .map_or(false, |entry| entry.has_counted(key))
    }

    /// Count an event. Returns false when a deduplicated event's page was
    /// already counted for this user.
    pub fn record(&mut self, event: ScoringEvent) -> bool {
        let key = event.dedup_key();
        let deduplicated = event.kind.deduplicated();

        if deduplicated && self.has_counted(&event.username, &key) {
            return false;
        }

        let entry = self.entries.entry(event.username.clone()).or_default();
        if deduplicated {
            entry.counted.insert(key);
        }
        entry.total += event.points;
        entry.events.push(event);
        true
    }

    /// Record a batch, returning how many were counted
    pub fn record_all<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = ScoringEvent>,
    {
        let mut counted = 0;
        for event in events {
            if self.record(event) {
                counted += 1;
            }
        }
        counted
    }

    pub fn entry(&self, username: &str) -> Option<&LedgerEntry> {
        self.entries.get(username)
    }

    pub fn total(&self, username: &str) -> u32 {
        self.entries.get(username).map_or(0, |entry| entry.total)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &ScoringEvent> {
        self.entries.values().flat_map(|entry| entry.events.iter())
    }

    /// Users by descending total; equal totals are ordered by username
    pub fn standings(&self) -> Vec<(&str, &LedgerEntry)> {
        let mut standings: Vec<(&str, &LedgerEntry)> = self
            .entries
            .iter()
            .map(|(user, entry)| (user.as_str(), entry))
            .collect();

        standings.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        standings
    }

    /// username → (total points, ordered point-tagged descriptions)
    pub fn summary(&self) -> BTreeMap<String, (u32, Vec<String>)> {
        self.entries
            .iter()
            .map(|(user, entry)| (user.clone(), (entry.total, entry.lines())))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
