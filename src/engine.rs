// ⚙️ Scoring Engine - Walk contributions, award points, fill the ledger
//
// Per participant, per active wiki:
//   window → tag filter → (label diff | link diff) → dedup → tiers → ledger
//
// Each (participant, wiki) pair is scored into a staging list and committed
// to the ledger only if the whole walk succeeded. A collaborator failure
// drops that pair, is reported in the outcome, and the run moves on.

use crate::classify::{classify_page, resolve_creator};
use crate::config::CampaignConfig;
use crate::error::ScoringResult;
use crate::labels::diff_labels;
use crate::ledger::Ledger;
use crate::participant::Participant;
use crate::revision::RevisionSummary;
use crate::rules::{ActionMarkers, LinkPattern, TagFilter};
use crate::scoring::{link_tier, DedupKey, ScoringEvent};
use crate::source::{EntityLookup, RevisionOrder, RevisionSource};
use crate::window::{ScoringWindow, WindowPosition};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

// ============================================================================
// VERDICTS
// ============================================================================

/// Why an in-window revision earned nothing
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Tagged(String),
    NoLinkIntroduced,
    AlreadyCounted,
    NotRelevant,
    NotLabelAction,
    MalformedContent(String),
    NoNewLabels,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Award(ScoringEvent),
    Skip(SkipReason),
}

// ============================================================================
// RUN STATISTICS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub revisions_seen: usize,
    pub outside_window: usize,
    pub tag_excluded: usize,
    pub no_link: usize,
    pub duplicates: usize,
    pub not_relevant: usize,
    pub not_label_action: usize,
    pub malformed: usize,
    pub no_new_labels: usize,
    pub events: usize,
}

impl RunStats {
    fn skipped(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Tagged(_) => self.tag_excluded += 1,
            SkipReason::NoLinkIntroduced => self.no_link += 1,
            SkipReason::AlreadyCounted => self.duplicates += 1,
            SkipReason::NotRelevant => self.not_relevant += 1,
            SkipReason::NotLabelAction => self.not_label_action += 1,
            SkipReason::MalformedContent(_) => self.malformed += 1,
            SkipReason::NoNewLabels => self.no_new_labels += 1,
        }
    }

    pub fn merge(&mut self, other: &RunStats) {
        self.revisions_seen += other.revisions_seen;
        self.outside_window += other.outside_window;
        self.tag_excluded += other.tag_excluded;
        self.no_link += other.no_link;
        self.duplicates += other.duplicates;
        self.not_relevant += other.not_relevant;
        self.not_label_action += other.not_label_action;
        self.malformed += other.malformed;
        self.no_new_labels += other.no_new_labels;
        self.events += other.events;
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Staged result of one (participant, wiki) walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WikiScore {
    pub events: Vec<ScoringEvent>,
    pub stats: RunStats,
}

/// A (participant, wiki) pair whose walk was aborted by a collaborator error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairFailure {
    pub username: String,
    pub wiki: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub ledger: Ledger,
    pub failures: Vec<PairFailure>,
    pub stats: RunStats,
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct ScoringEngine<'a> {
    config: &'a CampaignConfig,
    source: &'a dyn RevisionSource,
    entities: &'a dyn EntityLookup,

    /// Structured items eligible for label points, fetched once by the caller
    relevant: &'a BTreeSet<String>,

    window: ScoringWindow,
    tags: TagFilter,
    link: LinkPattern,
    markers: ActionMarkers,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        config: &'a CampaignConfig,
        source: &'a dyn RevisionSource,
        entities: &'a dyn EntityLookup,
        relevant: &'a BTreeSet<String>,
    ) -> ScoringResult<Self> {
        config.validate()?;

        Ok(ScoringEngine {
            config,
            source,
            entities,
            relevant,
            window: config.window(),
            tags: config.tag_filter(),
            link: config.link_pattern()?,
            markers: config.action_markers(),
        })
    }

    /// Score every participant in order
    pub fn run(&self, participants: &[Participant]) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        for participant in participants {
            self.score_participant(participant, &mut outcome);
        }

        info!(
            users = outcome.ledger.len(),
            events = outcome.stats.events,
            failures = outcome.failures.len(),
            "scoring run finished"
        );
        outcome
    }

    pub fn score_participant(&self, participant: &Participant, outcome: &mut RunOutcome) {
        let username = participant.username.as_str();

        for wiki in participant.active_wikis() {
            match self.score_wiki(username, wiki, &outcome.ledger) {
                Ok(score) => {
                    let counted = outcome.ledger.record_all(score.events);
                    outcome.stats.merge(&score.stats);
                    info!(
                        user = username,
                        wiki,
                        seen = score.stats.revisions_seen,
                        counted,
                        total = outcome.ledger.total(username),
                        "scored wiki"
                    );
                }
                Err(e) => {
                    warn!(user = username, wiki, error = %e, "wiki scoring aborted, dropping its events");
                    outcome.failures.push(PairFailure {
                        username: username.to_string(),
                        wiki: wiki.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Walk one user's contributions on one wiki. Events are staged against
    /// `ledger` for dedup but not recorded.
    pub fn score_wiki(&self, username: &str, wiki: &str, ledger: &Ledger) -> ScoringResult<WikiScore> {
        let descending = self.source.ordering() == RevisionOrder::Descending;
        let structured = self.config.is_structured_wiki(wiki);
        let stream = self
            .source
            .list_revisions(wiki, username, self.window.end, self.window.start)?;

        let mut score = WikiScore::default();
        let mut staged_keys: BTreeSet<DedupKey> = BTreeSet::new();

        for item in stream {
            let summary = item?;
            score.stats.revisions_seen += 1;

            match self.window.position(summary.timestamp) {
                WindowPosition::Inside => {}
                WindowPosition::AfterEnd => {
                    score.stats.outside_window += 1;
                    continue;
                }
                WindowPosition::BeforeStart if descending => {
                    debug!(user = username, wiki, revid = summary.revid, "reached window start");
                    break;
                }
                WindowPosition::BeforeStart => {
                    score.stats.outside_window += 1;
                    continue;
                }
            }

            let verdict = if let Some(tag) = self.tags.excluded_by(&summary.tags) {
                Verdict::Skip(SkipReason::Tagged(tag.to_string()))
            } else if structured {
                self.label_verdict(username, wiki, &summary)?
            } else {
                let counted = |key: &DedupKey| {
                    staged_keys.contains(key) || ledger.has_counted(username, key)
                };
                self.link_verdict(username, wiki, &summary, counted)?
            };

            match verdict {
                Verdict::Award(event) => {
                    debug!(
                        user = username,
                        wiki,
                        title = %summary.title,
                        revid = summary.revid,
                        points = event.points,
                        "revision qualifies"
                    );
                    if event.kind.deduplicated() {
                        staged_keys.insert(event.dedup_key());
                    }
                    score.stats.events += 1;
                    score.events.push(event);
                }
                Verdict::Skip(reason) => {
                    debug!(
                        user = username,
                        wiki,
                        title = %summary.title,
                        revid = summary.revid,
                        ?reason,
                        "revision skipped"
                    );
                    score.stats.skipped(&reason);
                }
            }
        }

        Ok(score)
    }

    /// Ordinary wikis: did this revision introduce the qualifying link?
    pub fn link_verdict<F>(
        &self,
        username: &str,
        wiki: &str,
        summary: &RevisionSummary,
        already_counted: F,
    ) -> ScoringResult<Verdict>
    where
        F: Fn(&DedupKey) -> bool,
    {
        let title = summary.title.as_str();

        // Only the first qualifying revision per page counts, and a key is
        // only counted once a revision qualified, so later ones can skip early
        if already_counted(&DedupKey::new(wiki, title)) {
            return Ok(Verdict::Skip(SkipReason::AlreadyCounted));
        }

        let content = self.source.fetch_revision_content(wiki, summary.revid)?;
        if let Some(tag) = self.tags.excluded_by(&content.tags) {
            return Ok(Verdict::Skip(SkipReason::Tagged(tag.to_string())));
        }

        let old_text = match content.parent_id {
            Some(parent) => self.source.fetch_old_version(wiki, title, parent)?,
            None => String::new(),
        };

        if !self.link.introduced(&old_text, &content.text) {
            return Ok(Verdict::Skip(SkipReason::NoLinkIntroduced));
        }

        let creator = resolve_creator(self.source, wiki, title, self.config.creation_cutoff);
        let tier = link_tier(
            username,
            &creator,
            || classify_page(self.entities, wiki, title),
            &self.config.distinguished_relation,
            &self.config.distinguished_value,
        );

        Ok(Verdict::Award(ScoringEvent::link(
            username,
            wiki,
            title,
            summary.revid,
            tier,
        )))
    }

    /// Structured wiki: which label languages did this revision add?
    pub fn label_verdict(
        &self,
        username: &str,
        wiki: &str,
        summary: &RevisionSummary,
    ) -> ScoringResult<Verdict> {
        let item = item_id(&summary.title);

        if !self.relevant.contains(item) {
            return Ok(Verdict::Skip(SkipReason::NotRelevant));
        }
        if !self.markers.matches(&summary.comment) {
            return Ok(Verdict::Skip(SkipReason::NotLabelAction));
        }

        let content = self.source.fetch_revision_content(wiki, summary.revid)?;
        if let Some(tag) = self.tags.excluded_by(&content.tags) {
            return Ok(Verdict::Skip(SkipReason::Tagged(tag.to_string())));
        }

        let old_content = match content.parent_id {
            Some(parent) => self.source.fetch_old_version(wiki, &summary.title, parent)?,
            None => String::new(),
        };

        let added = match diff_labels(&old_content, &content.text) {
            Ok(added) => added,
            Err(e) => return Ok(Verdict::Skip(SkipReason::MalformedContent(e.to_string()))),
        };

        Ok(
            match ScoringEvent::labels(username, wiki, item, summary.revid, &added) {
                Some(event) => Verdict::Award(event),
                None => Verdict::Skip(SkipReason::NoNewLabels),
            },
        )
    }
}

/// Item id from a page title: `Q42` or `Item:Q42` → `Q42`
pub fn item_id(title: &str) -> &str {
    title.rsplit(':').next().unwrap_or(title)
}

// ============================================================================
// TESTS
// ============================================================================
