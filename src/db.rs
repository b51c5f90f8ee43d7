use crate::ledger::Ledger;
use crate::participant::{Participant, WikiActivity};
use crate::scoring::ScoringEvent;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Counted event as stored, with its identity and fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Stable identity (UUID) of the stored row
    pub event_id: String,

    /// Idempotency hash: the same award always hashes the same
    pub fingerprint: String,

    pub username: String,
    pub wiki: String,
    pub title: String,
    pub revid: u64,
    pub points: u32,
    pub kind: String,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

/// Fingerprint for duplicate detection across runs.
/// NOTE: this is for DEDUPLICATION, not identity (that's event_id)
pub fn compute_event_fingerprint(event: &ScoringEvent) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
        event.username, event.wiki, event.title, event.revid, event.points
    ));
    format!("{:x}", hasher.finalize())
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS participants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wiki_activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            participant_id INTEGER NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
            wiki TEXT NOT NULL,
            editcount INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 0,
            rev_count INTEGER NOT NULL DEFAULT 0,
            ar_count INTEGER NOT NULL DEFAULT 0,
            UNIQUE (participant_id, wiki)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS score_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            fingerprint TEXT UNIQUE NOT NULL,
            username TEXT NOT NULL,
            wiki TEXT NOT NULL,
            title TEXT NOT NULL,
            revid INTEGER NOT NULL,
            points INTEGER NOT NULL,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_score_events_user ON score_events(username)",
        [],
    )?;

    Ok(())
}

/// Insert or update a participant and their per-wiki activity
pub fn upsert_participant(conn: &Connection, participant: &Participant) -> Result<i64> {
    conn.execute(
        "INSERT INTO participants (username) VALUES (?1)
         ON CONFLICT(username) DO NOTHING",
        params![participant.username],
    )?;

    let participant_id: i64 = conn
        .query_row(
            "SELECT id FROM participants WHERE username = ?1",
            params![participant.username],
            |row| row.get(0),
        )
        .with_context(|| format!("Participant {} missing after insert", participant.username))?;

    for activity in &participant.activities {
        conn.execute(
            "INSERT INTO wiki_activities (participant_id, wiki, editcount, active, rev_count, ar_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(participant_id, wiki) DO UPDATE SET
                editcount = excluded.editcount,
                active = excluded.active,
                rev_count = excluded.rev_count,
                ar_count = excluded.ar_count",
            params![
                participant_id,
                activity.wiki,
                activity.editcount,
                activity.active,
                activity.rev_count,
                activity.ar_count,
            ],
        )?;
    }

    Ok(participant_id)
}

/// All participants with their activities, ordered by username
pub fn get_participants(conn: &Connection) -> Result<Vec<Participant>> {
    let mut stmt = conn.prepare("SELECT id, username FROM participants ORDER BY username")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut activity_stmt = conn.prepare(
        "SELECT wiki, editcount, active, rev_count, ar_count
         FROM wiki_activities
         WHERE participant_id = ?1
         ORDER BY id",
    )?;

    let mut participants = Vec::with_capacity(rows.len());
    for (id, username) in rows {
        let activities = activity_stmt
            .query_map(params![id], |row| {
                Ok(WikiActivity {
                    wiki: row.get(0)?,
                    editcount: row.get(1)?,
                    active: row.get(2)?,
                    rev_count: row.get(3)?,
                    ar_count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        participants.push(Participant {
            username,
            activities,
        });
    }

    Ok(participants)
}

/// Store every counted event of a run. Events already stored by an earlier
/// run are skipped via their fingerprint.
pub fn insert_ledger(conn: &Connection, ledger: &Ledger, recorded_at: DateTime<Utc>) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for event in ledger.events() {
        let fingerprint = compute_event_fingerprint(event);

        let result = conn.execute(
            "INSERT INTO score_events (
                event_id, fingerprint, username, wiki, title, revid, points, kind, description, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                uuid::Uuid::new_v4().to_string(),
                fingerprint,
                event.username,
                event.wiki,
                event.title,
                event.revid as i64,
                event.points,
                event.kind.as_str(),
                event.description,
                recorded_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, duplicates, "stored score events");
    Ok(inserted)
}

pub fn get_events_for_user(conn: &Connection, username: &str) -> Result<Vec<StoredEvent>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, fingerprint, username, wiki, title, revid, points, kind, description, recorded_at
         FROM score_events
         WHERE username = ?1
         ORDER BY id",
    )?;

    let events = stmt
        .query_map(params![username], |row| {
            let recorded_at: String = row.get(9)?;
            let revid: i64 = row.get(5)?;

            Ok(StoredEvent {
                event_id: row.get(0)?,
                fingerprint: row.get(1)?,
                username: row.get(2)?,
                wiki: row.get(3)?,
                title: row.get(4)?,
                revid: revid as u64,
                points: row.get(6)?,
                kind: row.get(7)?,
                description: row.get(8)?,
                recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM score_events", [], |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::LinkTier;
    use std::collections::BTreeSet;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let added: BTreeSet<String> = ["fr".to_string()].into_iter().collect();

        ledger.record(ScoringEvent::link("Alice", "enwiki", "Codex", 12, LinkTier::Creator));
        ledger.record(ScoringEvent::labels("Alice", "wikidatawiki", "Q42", 13, &added).unwrap());
        ledger.record(ScoringEvent::link("Bob", "svwiki", "Atlas", 14, LinkTier::Base));
        ledger
    }

    #[test]
    fn test_idempotency_store_twice() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        let ledger = sample_ledger();

        let inserted1 = insert_ledger(&conn, &ledger, Utc::now()).unwrap();
        let count1 = verify_count(&conn).unwrap();

        let inserted2 = insert_ledger(&conn, &ledger, Utc::now()).unwrap();
        let count2 = verify_count(&conn).unwrap();

        assert_eq!(inserted1, 3, "First store should insert 3 events");
        assert_eq!(count1, 3);
        assert_eq!(inserted2, 0, "Second store should insert nothing");
        assert_eq!(count2, 3);
    }

    #[test]
    fn test_compute_event_fingerprint() {
        let event = ScoringEvent::link("Alice", "enwiki", "Codex", 12, LinkTier::Creator);
        let other = ScoringEvent::link("Alice", "enwiki", "Codex", 13, LinkTier::Creator);

        let hash1 = compute_event_fingerprint(&event);
        let hash2 = compute_event_fingerprint(&event);

        assert_eq!(hash1, hash2, "Same event should produce same fingerprint");
        assert_ne!(hash1, compute_event_fingerprint(&other));
        assert_eq!(hash1.len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_events_round_trip_for_user() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        insert_ledger(&conn, &sample_ledger(), Utc::now()).unwrap();

        let events = get_events_for_user(&conn, "Alice").unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "article");
        assert_eq!(events[0].points, 5);
        assert_eq!(events[1].title, "Q42");
        assert_eq!(events[1].revid, 13);
        assert!(uuid::Uuid::parse_str(&events[0].event_id).is_ok());
    }

    #[test]
    fn test_participants_upsert() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let mut alice = Participant::new("Alice", &["enwiki", "wikidatawiki"]);
        let id1 = upsert_participant(&conn, &alice).unwrap();

        alice.activities[0].active = false;
        alice.activities[0].editcount = 120;
        let id2 = upsert_participant(&conn, &alice).unwrap();
        upsert_participant(&conn, &Participant::new("Bob", &["svwiki"])).unwrap();

        let participants = get_participants(&conn).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].username, "Alice");
        assert_eq!(participants[0].activities.len(), 2);
        assert!(!participants[0].activities[0].active);
        assert_eq!(participants[0].activities[0].editcount, 120);
        assert_eq!(participants[1].activities[0].wiki, "svwiki");
    }
}
