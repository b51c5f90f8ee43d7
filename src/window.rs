// ⏰ Campaign Window - Which edits are eligible by time
//
// Revisions arrive newest first. The window decides, per revision:
// - after the end   → skip (paging may start past the end)
// - inside          → inspect
// - before the start → stop walking this (user, wiki) stream

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// WINDOW POSITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    AfterEnd,
    Inside,
    BeforeStart,
}

// ============================================================================
// SCORING WINDOW
// ============================================================================

/// Inclusive [start, end] campaign period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScoringWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ScoringWindow { start, end }
    }

    pub fn position(&self, timestamp: DateTime<Utc>) -> WindowPosition {
        if timestamp < self.start {
            WindowPosition::BeforeStart
        } else if timestamp > self.end {
            WindowPosition::AfterEnd
        } else {
            WindowPosition::Inside
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.position(timestamp) == WindowPosition::Inside
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

// ============================================================================
// TESTS
// ============================================================================
