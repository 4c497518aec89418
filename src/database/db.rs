//! Database operations for the review engine
//!
//! Handles SQLite schema creation, the concept catalogue, per-learner review
//! records, the review/session history, the XP ledger and the simulated date.
//! Timestamps are stored as Unix seconds.

use crate::error::{ReviewError, Result};
use crate::models::{Concept, DelayClass, Response, ReviewRecord, SessionSummary};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

/// Opens (or creates) the database file and makes sure the schema exists.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Opened review database at {}", path.display());
    Ok(conn)
}

/// Creates tables for concepts, review records, history, XP ledger and app state.
///
/// Sets the simulated current date to now if not already initialized.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS concepts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic TEXT NOT NULL,
            prompt TEXT NOT NULL,
            answer TEXT NOT NULL,
            example TEXT,
            UNIQUE(topic, prompt)
        );

        CREATE TABLE IF NOT EXISTS review_records (
            learner_id TEXT NOT NULL,
            concept_id INTEGER NOT NULL,
            last_reviewed_at INTEGER,
            next_review_at INTEGER NOT NULL,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetition_count INTEGER NOT NULL DEFAULT 0,
            lapse_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (learner_id, concept_id),
            FOREIGN KEY (concept_id) REFERENCES concepts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_review_records_due
            ON review_records (learner_id, next_review_at);

        CREATE TABLE IF NOT EXISTS review_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            learner_id TEXT NOT NULL,
            concept_id INTEGER NOT NULL,
            response TEXT NOT NULL,
            delay_class TEXT NOT NULL,
            interval_days INTEGER NOT NULL,
            reviewed_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS review_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            learner_id TEXT NOT NULL,
            started_at INTEGER NOT NULL,
            completed_at INTEGER NOT NULL,
            reviewed_count INTEGER NOT NULL,
            correct_like_count INTEGER NOT NULL,
            not_updated_count INTEGER NOT NULL,
            xp_earned INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS xp_ledger (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            learner_id TEXT NOT NULL,
            amount INTEGER NOT NULL,
            reason TEXT NOT NULL,
            awarded_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn to_datetime(secs: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, secs))
}

/// Retrieves the simulated current date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = timestamp.parse::<i64>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
    })?;
    Ok(to_datetime(secs, 0)?)
}

pub fn set_current_date(conn: &Connection, date: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('current_date', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![date.timestamp().to_string()],
    )?;
    Ok(())
}

/// Advances the simulated date by 24 hours
pub fn advance_day(conn: &Connection) -> Result<()> {
    let next_day = get_current_date(conn)? + Duration::days(1);
    set_current_date(conn, next_day)?;
    debug!("Simulated date advanced to {}", next_day);
    Ok(())
}

// ==================== Concepts ====================

/// Adds a concept to the catalogue and returns its id.
///
/// If a concept with the same topic and prompt exists, it's left untouched
/// and the existing id is returned.
pub fn add_concept(concept: &Concept, conn: &Connection) -> Result<i64> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO concepts (topic, prompt, answer, example) VALUES (?1, ?2, ?3, ?4)",
        params![concept.topic, concept.prompt, concept.answer, concept.example],
    )?;

    let concept_id: i64 = conn.query_row(
        "SELECT id FROM concepts WHERE topic = ?1 AND prompt = ?2",
        params![concept.topic, concept.prompt],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        debug!("Concept {} added to topic '{}'", concept_id, concept.topic);
    }
    Ok(concept_id)
}

fn concept_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Concept> {
    Ok(Concept {
        id: row.get(offset)?,
        topic: row.get(offset + 1)?,
        prompt: row.get(offset + 2)?,
        answer: row.get(offset + 3)?,
        example: row.get(offset + 4)?,
    })
}

pub fn get_concept(concept_id: i64, conn: &Connection) -> Result<Concept> {
    conn.query_row(
        "SELECT id, topic, prompt, answer, example FROM concepts WHERE id = ?1",
        params![concept_id],
        |row| concept_from_row(row, 0),
    )
    .optional()?
    .ok_or(ReviewError::ConceptNotFound(concept_id))
}

pub fn get_concepts_for_topic(topic: &str, conn: &Connection) -> Result<Vec<Concept>> {
    let mut stmt = conn.prepare(
        "SELECT id, topic, prompt, answer, example FROM concepts WHERE topic = ?1 ORDER BY id",
    )?;
    let concepts = stmt
        .query_map(params![topic], |row| concept_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<Concept>>>()?;
    Ok(concepts)
}

pub fn get_all_topics(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT topic FROM concepts ORDER BY topic")?;
    let topics = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(topics)
}

// ==================== Review records ====================

const RECORD_COLUMNS: &str = "r.learner_id, r.concept_id, r.last_reviewed_at, r.next_review_at,
     r.interval_days, r.repetition_count, r.lapse_count";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRecord> {
    let last_reviewed_at = match row.get::<_, Option<i64>>(2)? {
        Some(secs) => Some(to_datetime(secs, 2)?),
        None => None,
    };
    Ok(ReviewRecord {
        learner_id: row.get(0)?,
        concept_id: row.get(1)?,
        last_reviewed_at,
        next_review_at: to_datetime(row.get(3)?, 3)?,
        interval_days: row.get(4)?,
        repetition_count: row.get(5)?,
        lapse_count: row.get(6)?,
    })
}

/// Inserts a review record. Returns false if one already exists for the pair.
pub fn create_review_record(record: &ReviewRecord, conn: &Connection) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO review_records
         (learner_id, concept_id, last_reviewed_at, next_review_at,
          interval_days, repetition_count, lapse_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.learner_id,
            record.concept_id,
            record.last_reviewed_at.map(|t| t.timestamp()),
            record.next_review_at.timestamp(),
            record.interval_days,
            record.repetition_count,
            record.lapse_count
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get_review_record(
    learner_id: &str,
    concept_id: i64,
    conn: &Connection,
) -> Result<Option<ReviewRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM review_records r
         WHERE r.learner_id = ?1 AND r.concept_id = ?2"
    );
    let record = conn
        .query_row(&sql, params![learner_id, concept_id], record_from_row)
        .optional()?;
    Ok(record)
}

/// Writes the scheduling fields of an existing record.
pub fn update_review_record(record: &ReviewRecord, conn: &Connection) -> Result<()> {
    let updated = conn.execute(
        "UPDATE review_records
         SET last_reviewed_at = ?1, next_review_at = ?2, interval_days = ?3,
             repetition_count = ?4, lapse_count = ?5
         WHERE learner_id = ?6 AND concept_id = ?7",
        params![
            record.last_reviewed_at.map(|t| t.timestamp()),
            record.next_review_at.timestamp(),
            record.interval_days,
            record.repetition_count,
            record.lapse_count,
            record.learner_id,
            record.concept_id
        ],
    )?;

    if updated == 0 {
        return Err(ReviewError::RecordNotFound {
            learner_id: record.learner_id.clone(),
            concept_id: record.concept_id,
        });
    }
    Ok(())
}

/// Retrieves a learner's records with `next_review_at <= now`, joined with their concept.
///
/// Ordered most overdue first, then by lapse count (descending) and concept id.
pub fn get_due_records(
    learner_id: &str,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<Vec<(ReviewRecord, Concept)>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS}, c.id, c.topic, c.prompt, c.answer, c.example
         FROM review_records r
         JOIN concepts c ON c.id = r.concept_id
         WHERE r.learner_id = ?1 AND r.next_review_at <= ?2
         ORDER BY r.next_review_at ASC, r.lapse_count DESC, r.concept_id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let due = stmt
        .query_map(params![learner_id, now.timestamp()], |row| {
            Ok((record_from_row(row)?, concept_from_row(row, 7)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(due)
}

// ==================== History ====================

pub fn log_review_event(
    record: &ReviewRecord,
    response: Response,
    delay: DelayClass,
    conn: &Connection,
) -> Result<()> {
    let reviewed_at = record.last_reviewed_at.unwrap_or(record.next_review_at);
    conn.execute(
        "INSERT INTO review_events
         (learner_id, concept_id, response, delay_class, interval_days, reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.learner_id,
            record.concept_id,
            response.to_string(),
            delay.as_str(),
            record.interval_days,
            reviewed_at.timestamp()
        ],
    )?;
    Ok(())
}

pub fn count_review_events(learner_id: &str, conn: &Connection) -> Result<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM review_events WHERE learner_id = ?1",
        params![learner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn save_session(
    summary: &SessionSummary,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO review_sessions
         (learner_id, started_at, completed_at, reviewed_count,
          correct_like_count, not_updated_count, xp_earned)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            summary.learner_id,
            started_at.timestamp(),
            completed_at.timestamp(),
            summary.reviewed_count as i64,
            summary.correct_like_count as i64,
            summary.not_updated_count as i64,
            summary.xp_earned
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_sessions(learner_id: &str, conn: &Connection) -> Result<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM review_sessions WHERE learner_id = ?1",
        params![learner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ==================== XP ledger ====================

pub fn award_xp(
    learner_id: &str,
    amount: u32,
    reason: &str,
    at: DateTime<Utc>,
    conn: &Connection,
) -> Result<()> {
    conn.execute(
        "INSERT INTO xp_ledger (learner_id, amount, reason, awarded_at) VALUES (?1, ?2, ?3, ?4)",
        params![learner_id, amount, reason, at.timestamp()],
    )?;
    Ok(())
}

pub fn total_xp(learner_id: &str, conn: &Connection) -> Result<u32> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM xp_ledger WHERE learner_id = ?1",
        params![learner_id],
        |row| row.get(0),
    )?;
    let total = u32::try_from(total)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, total))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use chrono::TimeZone;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_add_concept_is_idempotent_per_topic_and_prompt() {
        let conn = setup();
        let concept = Concept::new("chemistry", "H2O", "water");

        let first = add_concept(&concept, &conn).unwrap();
        let second = add_concept(&concept, &conn).unwrap();
        assert_eq!(first, second);

        let stored = get_concept(first, &conn).unwrap();
        assert_eq!(stored.prompt, "H2O");
        assert_eq!(stored.id, first);
        assert_eq!(get_concepts_for_topic("chemistry", &conn).unwrap().len(), 1);
        assert_eq!(get_all_topics(&conn).unwrap(), vec!["chemistry".to_string()]);
    }

    #[test]
    fn test_get_missing_concept() {
        let conn = setup();
        assert!(matches!(
            get_concept(99, &conn),
            Err(ReviewError::ConceptNotFound(99))
        ));
    }

    #[test]
    fn test_record_roundtrip_keeps_nullable_timestamp() {
        let conn = setup();
        let id = add_concept(&Concept::new("math", "2+2", "4"), &conn).unwrap();

        let record = ReviewRecord::introduced("ana", id, t0());
        assert!(create_review_record(&record, &conn).unwrap());
        assert!(!create_review_record(&record, &conn).unwrap());

        let stored = get_review_record("ana", id, &conn).unwrap().unwrap();
        assert_eq!(stored, record);
        assert!(get_review_record("bob", id, &conn).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let conn = setup();
        let record = ReviewRecord::introduced("ana", 42, t0());
        assert!(matches!(
            update_review_record(&record, &conn),
            Err(ReviewError::RecordNotFound { concept_id: 42, .. })
        ));
    }

    #[test]
    fn test_due_records_filter_by_learner_and_time() {
        let conn = setup();
        let a = add_concept(&Concept::new("math", "a", "1"), &conn).unwrap();
        let b = add_concept(&Concept::new("math", "b", "2"), &conn).unwrap();

        create_review_record(&ReviewRecord::introduced("ana", a, t0()), &conn).unwrap();
        create_review_record(
            &ReviewRecord::introduced("ana", b, t0() + Duration::days(1)),
            &conn,
        )
        .unwrap();
        create_review_record(&ReviewRecord::introduced("bob", a, t0()), &conn).unwrap();

        let due = get_due_records("ana", t0(), &conn).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0.concept_id, a);
        assert_eq!(due[0].1.prompt, "a");
    }

    #[test]
    fn test_deleting_concept_cascades_to_records() {
        let conn = setup();
        let id = add_concept(&Concept::new("math", "x", "y"), &conn).unwrap();
        create_review_record(&ReviewRecord::introduced("ana", id, t0()), &conn).unwrap();

        conn.execute("DELETE FROM concepts WHERE id = ?1", params![id])
            .unwrap();
        assert!(get_review_record("ana", id, &conn).unwrap().is_none());
    }

    #[test]
    fn test_history_and_ledger() {
        let conn = setup();
        let mut record = ReviewRecord::introduced("ana", 1, t0());
        record.last_reviewed_at = Some(t0());
        record.interval_days = 3;

        log_review_event(
            &record,
            Response::Rating(Rating::Vague),
            DelayClass::Medium,
            &conn,
        )
        .unwrap();
        assert_eq!(count_review_events("ana", &conn).unwrap(), 1);

        award_xp("ana", 12, "review_session", t0(), &conn).unwrap();
        award_xp("ana", 8, "review_session", t0(), &conn).unwrap();
        assert_eq!(total_xp("ana", &conn).unwrap(), 20);
        assert_eq!(total_xp("bob", &conn).unwrap(), 0);

        let summary = SessionSummary {
            learner_id: "ana".to_string(),
            reviewed_count: 1,
            correct_like_count: 1,
            not_updated_count: 0,
            xp_earned: 10,
            accuracy: 1.0,
        };
        save_session(&summary, t0(), t0(), &conn).unwrap();
        assert_eq!(count_sessions("ana", &conn).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_current_date_is_an_error() {
        let conn = setup();
        conn.execute(
            "UPDATE app_state SET value = 'garbage' WHERE key = 'current_date'",
            [],
        )
        .unwrap();

        assert!(matches!(
            get_current_date(&conn),
            Err(ReviewError::Persistence(
                rusqlite::Error::FromSqlConversionFailure(..)
            ))
        ));
    }

    #[test]
    fn test_total_xp_out_of_range_is_an_error() {
        let conn = setup();
        award_xp("ana", u32::MAX, "review_session", t0(), &conn).unwrap();
        award_xp("ana", 1, "review_session", t0(), &conn).unwrap();

        assert!(matches!(
            total_xp("ana", &conn),
            Err(ReviewError::Persistence(
                rusqlite::Error::IntegralValueOutOfRange(..)
            ))
        ));
    }
}
