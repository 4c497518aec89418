//! Collaborator traits the engine talks to, and their SQLite implementations.
//!
//! The engine only needs keyed access to review records, the due range query
//! and somewhere to append history. Anything that can do that (a plain
//! `rusqlite::Connection` here) can back it.

use super::db;
use crate::error::Result;
use crate::models::{Concept, DelayClass, Response, ReviewRecord, SessionSummary};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub trait ReviewStore {
    /// Returns false when a record already exists for the pair.
    fn create_record(&self, record: &ReviewRecord) -> Result<bool>;

    fn get_record(&self, learner_id: &str, concept_id: i64) -> Result<Option<ReviewRecord>>;

    /// Fails with `RecordNotFound` when the pair has no record.
    fn update_record(&self, record: &ReviewRecord) -> Result<()>;

    /// Records with `next_review_at <= now` for one learner, joined with their concept.
    fn due_records(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(ReviewRecord, Concept)>>;

    fn concept_exists(&self, concept_id: i64) -> Result<bool>;

    fn log_review(&self, record: &ReviewRecord, response: Response, delay: DelayClass)
    -> Result<()>;

    fn save_session(
        &self,
        summary: &SessionSummary,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Receives experience points. Callers treat it as fire-and-forget.
pub trait RewardLedger {
    fn award(&self, learner_id: &str, xp: u32, reason: &str, at: DateTime<Utc>) -> Result<()>;
}

impl ReviewStore for Connection {
    fn create_record(&self, record: &ReviewRecord) -> Result<bool> {
        db::create_review_record(record, self)
    }

    fn get_record(&self, learner_id: &str, concept_id: i64) -> Result<Option<ReviewRecord>> {
        db::get_review_record(learner_id, concept_id, self)
    }

    fn update_record(&self, record: &ReviewRecord) -> Result<()> {
        db::update_review_record(record, self)
    }

    fn due_records(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(ReviewRecord, Concept)>> {
        db::get_due_records(learner_id, now, self)
    }

    fn concept_exists(&self, concept_id: i64) -> Result<bool> {
        match db::get_concept(concept_id, self) {
            Ok(_) => Ok(true),
            Err(crate::error::ReviewError::ConceptNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn log_review(
        &self,
        record: &ReviewRecord,
        response: Response,
        delay: DelayClass,
    ) -> Result<()> {
        db::log_review_event(record, response, delay, self)
    }

    fn save_session(
        &self,
        summary: &SessionSummary,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        db::save_session(summary, started_at, completed_at, self).map(|_| ())
    }
}

impl RewardLedger for Connection {
    fn award(&self, learner_id: &str, xp: u32, reason: &str, at: DateTime<Utc>) -> Result<()> {
        db::award_xp(learner_id, xp, reason, at, self)
    }
}
