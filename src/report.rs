// 📊 Reports - Render standings for humans and spreadsheets
// Presentation only; where the result goes is up to the caller.

use crate::engine::RunOutcome;
use crate::ledger::Ledger;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Wikitext leaderboard, highest total first:
///
/// ```text
/// == [[USER:Alice|Alice]] (points: 7) ==
/// * +5 points, on enwiki created article X with ... (rev 12)
/// ```
pub fn render_wikitext(ledger: &Ledger, updated_at: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Last updated: {}", updated_at.format("%Y-%m-%d %H:%M UTC")));
    lines.push(String::new());

    for (user, entry) in ledger.standings() {
        lines.push(format!("== [[USER:{}|{}]] (points: {}) ==", user, user, entry.total));
        for line in entry.lines() {
            lines.push(format!("* {}", line));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One-line summary for the console
pub fn summarize(outcome: &RunOutcome) -> String {
    let stats = &outcome.stats;
    format!(
        "{} users scored, {} events from {} revisions ({} duplicates, {} tag-excluded, {} outside window), {} failed wikis",
        outcome.ledger.len(),
        stats.events,
        stats.revisions_seen,
        stats.duplicates,
        stats.tag_excluded,
        stats.outside_window,
        outcome.failures.len()
    )
}

#[derive(Debug, Serialize)]
struct EventRow<'a> {
    username: &'a str,
    wiki: &'a str,
    title: &'a str,
    revid: u64,
    points: u32,
    kind: &'static str,
    description: &'a str,
}

/// Counted events as CSV, users in standings order
pub fn write_csv<W: Write>(ledger: &Ledger, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for (_, entry) in ledger.standings() {
        for event in &entry.events {
            csv_writer
                .serialize(EventRow {
                    username: &event.username,
                    wiki: &event.wiki,
                    title: &event.title,
                    revid: event.revid,
                    points: event.points,
                    kind: event.kind.as_str(),
                    description: &event.description,
                })
                .context("Failed to write CSV row")?;
            rows += 1;
        }
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{LinkTier, ScoringEvent};
    use chrono::TimeZone;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.record(ScoringEvent::link("Bob", "enwiki", "Atlas", 3, LinkTier::Base));
        ledger.record(ScoringEvent::link("Alice", "fiwiki", "Codex", 7, LinkTier::Creator));
        ledger.record(ScoringEvent::link("Alice", "fiwiki", "Atlas", 8, LinkTier::Base));
        ledger
    }

    #[test]
    fn test_render_wikitext() {
        let updated = Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap();
        let text = render_wikitext(&ledger(), updated);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Last updated: 2025-09-01 08:30 UTC");
        assert_eq!(lines[2], "== [[USER:Alice|Alice]] (points: 7) ==");
        assert_eq!(
            lines[3],
            "* +5 points, on fiwiki created article Codex with Memory of the World link in it (rev 7)"
        );
        assert_eq!(lines[6], "== [[USER:Bob|Bob]] (points: 2) ==");
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        let rows = write_csv(&ledger(), &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(rows, 3);
        assert_eq!(lines[0], "username,wiki,title,revid,points,kind,description");
        assert!(lines[1].starts_with("Alice,fiwiki,Codex,7,5,article,"));
        assert!(lines[3].starts_with("Bob,enwiki,Atlas,3,2,link,"));
    }

    #[test]
    fn test_summarize_empty_run() {
        let summary = summarize(&RunOutcome::default());
        assert!(summary.starts_with("0 users scored, 0 events"));
    }
}
