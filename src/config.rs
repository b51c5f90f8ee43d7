// ⚙️ Campaign Configuration
// The fixed campaign constants, optionally overridden from a JSON file

use crate::error::{ScoringError, ScoringResult};
use crate::rules::{ActionMarkers, LinkPattern, TagFilter};
use crate::window::ScoringWindow;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wiki hosting the structured items
pub const STRUCTURED_WIKI: &str = "wikidatawiki";

/// "instance of"
pub const INSTANCE_OF: &str = "P31";

/// Wikimedia list article
pub const LIST_ARTICLE: &str = "Q13406463";

const LINK_PATTERN: &str = r"(?i)www\.unesco\.org/(?:(?:ar|en|es|fr|ru|zh)/)?memory-world";

const EXCLUSION_TAGS: &[&str] = &[
    "mw-reverted",
    "mw-manual-revert",
    "mw-undo",
    "mw-rollback",
    "revert",
    "manual-revert",
    "undo",
    "rollback",
];

const LABEL_MARKERS: &[&str] = &[
    "wbsetlabel-add",
    "wbsetlabel-set",
    "wbeditentity-update-languages",
    "wbsetlabeldescriptionaliases",
    "wbeditentity-create",
];

fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("campaign constant is a valid UTC timestamp")
}

// ============================================================================
// CAMPAIGN CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// First eligible edit (inclusive)
    pub window_start: DateTime<Utc>,

    /// Last eligible edit (inclusive)
    pub window_end: DateTime<Utc>,

    /// Pages must be created strictly after this to earn creator points
    pub creation_cutoff: DateTime<Utc>,

    /// Regex for the qualifying external link
    pub link_pattern: String,

    pub structured_wiki: String,

    pub distinguished_relation: String,

    pub distinguished_value: String,

    pub exclusion_tags: Vec<String>,

    pub label_markers: Vec<String>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        CampaignConfig {
            window_start: utc(2025, 8, 1, 0, 0, 0),
            window_end: utc(2025, 9, 30, 23, 59, 59),
            creation_cutoff: utc(2025, 8, 1, 0, 0, 0),
            link_pattern: LINK_PATTERN.to_string(),
            structured_wiki: STRUCTURED_WIKI.to_string(),
            distinguished_relation: INSTANCE_OF.to_string(),
            distinguished_value: LIST_ARTICLE.to_string(),
            exclusion_tags: EXCLUSION_TAGS.iter().map(|t| t.to_string()).collect(),
            label_markers: LABEL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl CampaignConfig {
    /// Load overrides from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: CampaignConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if self.window().is_empty() {
            return Err(ScoringError::Config(format!(
                "window start {} is after window end {}",
                self.window_start, self.window_end
            )));
        }
        if self.exclusion_tags.is_empty() {
            return Err(ScoringError::Config("exclusion tag set is empty".to_string()));
        }
        if self.structured_wiki.is_empty() {
            return Err(ScoringError::Config("structured wiki id is empty".to_string()));
        }
        self.link_pattern()?;
        Ok(())
    }

    pub fn window(&self) -> ScoringWindow {
        ScoringWindow::new(self.window_start, self.window_end)
    }

    pub fn link_pattern(&self) -> ScoringResult<LinkPattern> {
        LinkPattern::new(&self.link_pattern)
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::new(self.exclusion_tags.iter().cloned())
    }

    pub fn action_markers(&self) -> ActionMarkers {
        ActionMarkers::new(self.label_markers.iter().cloned())
    }

    pub fn is_structured_wiki(&self, wiki: &str) -> bool {
        wiki == self.structured_wiki
    }
}

// ============================================================================
// TESTS
// ============================================================================
