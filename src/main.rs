use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::env;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use campaign_score::{db, render_wikitext, summarize, write_csv, CampaignConfig, FixtureSource, ScoringEngine};

const USAGE: &str = "usage: campaign-score <fixture.json> [--config FILE] [--db FILE] [--csv FILE]";

struct Args {
    fixture: PathBuf,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    csv: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut fixture = None;
    let mut config = None;
    let mut db = None;
    let mut csv = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            "--db" => db = Some(PathBuf::from(args.next().context("--db needs a path")?)),
            "--csv" => csv = Some(PathBuf::from(args.next().context("--csv needs a path")?)),
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with("--") => bail!("unknown flag {}\n{}", other, USAGE),
            other if fixture.is_none() => fixture = Some(PathBuf::from(other)),
            other => bail!("unexpected argument {}\n{}", other, USAGE),
        }
    }

    Ok(Args {
        fixture: fixture.context(USAGE)?,
        config,
        db,
        csv,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => CampaignConfig::from_file(path)?,
        None => CampaignConfig::default(),
    };

    let source = FixtureSource::from_file(&args.fixture)?;
    tracing::info!(
        revisions = source.revision_count(),
        participants = source.participants().len(),
        "fixture loaded"
    );

    let conn = match &args.db {
        Some(path) => {
            let conn = Connection::open(path)
                .with_context(|| format!("Failed to open database: {:?}", path))?;
            db::setup_database(&conn)?;
            Some(conn)
        }
        None => None,
    };

    // Participants come from the fixture; fall back to the ones already stored
    let mut participants = source.participants().to_vec();
    if let Some(conn) = &conn {
        if participants.is_empty() {
            participants = db::get_participants(conn)?;
        } else {
            for participant in &participants {
                db::upsert_participant(conn, participant)?;
            }
        }
    }

    // One relevance query per run, reused for every participant
    let relevant = source.relevant_entities();
    let engine = ScoringEngine::new(&config, &source, &source, &relevant)?;
    let outcome = engine.run(&participants);

    println!("{}", render_wikitext(&outcome.ledger, Utc::now()));
    println!("{}", summarize(&outcome));
    for failure in &outcome.failures {
        eprintln!("failed: {} on {}: {}", failure.username, failure.wiki, failure.error);
    }

    if let Some(conn) = &conn {
        let inserted = db::insert_ledger(conn, &outcome.ledger, Utc::now())?;
        println!("stored {} new events", inserted);
    }

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("Failed to create CSV file: {:?}", path))?;
        let rows = write_csv(&outcome.ledger, file)?;
        println!("wrote {} rows to {}", rows, path.display());
    }

    Ok(())
}
