// Campaign Score - Core Library
// Scores wiki campaign participants from their revision history

pub mod error;
pub mod config;
pub mod window;         // Campaign window
pub mod revision;       // Revision data model
pub mod source;         // Collaborator traits
pub mod rules;          // Tag filter, link pattern, comment markers
pub mod labels;         // Structured label diff
pub mod classify;       // Creator resolution, entity classification
pub mod scoring;        // Tiers and events
pub mod ledger;         // Per-user accumulation + dedup
pub mod engine;         // Orchestration
pub mod participant;
pub mod fixture;        // JSON-backed source
pub mod report;
pub mod db;

// Re-export commonly used types
pub use error::{ScoringError, ScoringResult};
pub use config::CampaignConfig;
pub use window::{ScoringWindow, WindowPosition};
pub use revision::{OldestRevision, Revision, RevisionContent, RevisionSummary};
pub use source::{EntityClaims, EntityLookup, RevisionOrder, RevisionSource, RevisionStream};
pub use rules::{ActionMarkers, LinkPattern, TagFilter};
pub use labels::{added_languages, diff_labels, parse_labels, LabelMap};
pub use classify::{
    classify_page, resolve_creator, CreatorResolution, EntityClassification, NoCreatorReason,
};
pub use scoring::{DedupKey, EventKind, LinkTier, ScoringEvent};
pub use ledger::{Ledger, LedgerEntry};
pub use engine::{PairFailure, RunOutcome, RunStats, ScoringEngine, SkipReason, Verdict};
pub use participant::{Participant, WikiActivity};
pub use fixture::{Fixture, FixtureSource};
pub use report::{render_wikitext, summarize, write_csv};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
