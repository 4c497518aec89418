//! Review engine: the entry point callers use to run review sessions.
//!
//! The engine holds no session state. [`ReviewEngine::start_session`] hands
//! back a [`ReviewSession`] and every later call takes it by reference.
//! Ratings are applied one concept at a time and persisted independently, so
//! abandoning a session keeps whatever was already written.

use crate::clock::Clock;
use crate::config::{EngineConfig, IntervalPolicy, RewardPolicy};
use crate::database::{RewardLedger, ReviewStore};
use crate::error::{ReviewError, Result};
use crate::models::{
    DelayClass, ItemStatus, Response, ReviewRecord, ReviewSession, SessionState, SessionSummary,
};
use crate::scheduler::{self, DueSet};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Reason recorded in the XP ledger for completed sessions.
pub const SESSION_REWARD_REASON: &str = "review_session";

/// What happened to one submitted rating.
#[derive(Debug)]
pub enum RecordUpdateResult {
    Updated {
        record: ReviewRecord,
        delay: DelayClass,
    },
    /// The rating was valid but the record could not be updated. The session
    /// has moved on and the stored record is unchanged.
    NotUpdated { concept_id: i64, error: ReviewError },
}

impl RecordUpdateResult {
    pub fn is_updated(&self) -> bool {
        matches!(self, RecordUpdateResult::Updated { .. })
    }
}

pub struct ReviewEngine<'a, S: ?Sized, L: ?Sized, C: ?Sized> {
    store: &'a S,
    ledger: &'a L,
    clock: &'a C,
    intervals: IntervalPolicy,
    rewards: RewardPolicy,
}

impl<'a, S, L, C> ReviewEngine<'a, S, L, C>
where
    S: ReviewStore + ?Sized,
    L: RewardLedger + ?Sized,
    C: Clock + ?Sized,
{
    /// Fails with `InvalidPolicy` when the day tables are out of order.
    pub fn new(
        store: &'a S,
        ledger: &'a L,
        clock: &'a C,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.intervals.validate()?;
        Ok(Self {
            store,
            ledger,
            clock,
            intervals: config.intervals.clone(),
            rewards: config.rewards.clone(),
        })
    }

    /// Starts tracking a concept for a learner. The new record is due at once.
    ///
    /// Introducing an already tracked concept returns the existing record.
    pub fn introduce_concept(&self, learner_id: &str, concept_id: i64) -> Result<ReviewRecord> {
        if let Some(existing) = self.store.get_record(learner_id, concept_id)? {
            return Ok(existing);
        }
        if !self.store.concept_exists(concept_id)? {
            return Err(ReviewError::ConceptNotFound(concept_id));
        }

        let record = ReviewRecord::introduced(learner_id, concept_id, self.clock.now()?);
        self.store.create_record(&record)?;
        info!("Concept {} introduced to {}", concept_id, learner_id);
        Ok(record)
    }

    pub fn get_due_concepts(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<DueSet> {
        scheduler::due_concepts(self.store, learner_id, now, limit)
    }

    /// Snapshots `concept_ids` into a new session. Concepts that come due
    /// later are not added to it.
    pub fn start_session(&self, learner_id: &str, concept_ids: &[i64]) -> Result<ReviewSession> {
        let mut session = ReviewSession::new(learner_id, concept_ids);
        session.begin(self.clock.now()?);
        info!(
            "Review session started for {} with {} concepts",
            learner_id,
            session.total_count()
        );
        Ok(session)
    }

    /// Parses a raw rating and submits it. Anything outside the accepted
    /// set fails with `InvalidRating` and leaves the session untouched.
    pub fn submit_rating(
        &self,
        session: &mut ReviewSession,
        concept_id: i64,
        rating: &str,
    ) -> Result<RecordUpdateResult> {
        let response: Response = rating.parse()?;
        self.submit_response(session, concept_id, response)
    }

    /// Applies a response to the session's current concept.
    ///
    /// Session misuse is an `Err` and changes nothing. A failure to load or
    /// write the record is reported as `NotUpdated` and the session advances.
    pub fn submit_response(
        &self,
        session: &mut ReviewSession,
        concept_id: i64,
        response: Response,
    ) -> Result<RecordUpdateResult> {
        let expected = session
            .current_concept()
            .ok_or(ReviewError::SessionNotActive)?;
        if expected != concept_id {
            return Err(ReviewError::UnexpectedConcept {
                expected,
                got: concept_id,
            });
        }
        let now = self.clock.now()?;

        match self.rate(&session.learner_id, concept_id, response, now) {
            Ok((record, delay)) => {
                session.settle_current(
                    ItemStatus::Updated {
                        response,
                        delay,
                        interval_days: record.interval_days,
                    },
                    now,
                );
                Ok(RecordUpdateResult::Updated { record, delay })
            }
            Err(error) => {
                warn!(
                    "Concept {} not updated for {}: {}",
                    concept_id, session.learner_id, error
                );
                session.settle_current(
                    ItemStatus::NotUpdated {
                        reason: error.to_string(),
                    },
                    now,
                );
                Ok(RecordUpdateResult::NotUpdated { concept_id, error })
            }
        }
    }

    fn rate(
        &self,
        learner_id: &str,
        concept_id: i64,
        response: Response,
        now: DateTime<Utc>,
    ) -> Result<(ReviewRecord, DelayClass)> {
        let record = scheduler::load_record(self.store, learner_id, concept_id)?;
        let delay = scheduler::classify(response, &record);
        let updated = scheduler::apply_review(self.store, &record, delay, &self.intervals, now)?;

        if let Err(e) = self.store.log_review(&updated, response, delay) {
            warn!("Failed to log review of concept {}: {}", concept_id, e);
        }
        Ok((updated, delay))
    }

    /// Summarises a completed session, records it and awards its XP.
    ///
    /// Calling it again returns the same summary without a second award.
    pub fn complete_session(&self, session: &mut ReviewSession) -> Result<SessionSummary> {
        if let Some(summary) = &session.summary {
            return Ok(summary.clone());
        }
        match session.state {
            SessionState::Completed => {}
            SessionState::NotStarted => return Err(ReviewError::SessionNotActive),
            SessionState::InProgress => {
                return Err(ReviewError::SessionNotCompleted {
                    remaining: session.remaining_count(),
                });
            }
        }

        let reviewed_count = session.reviewed_count();
        let correct_like_count = session.correct_like_count();
        let summary = SessionSummary {
            learner_id: session.learner_id.clone(),
            reviewed_count,
            correct_like_count,
            not_updated_count: session.not_updated_count(),
            xp_earned: self.rewards.xp_for(
                session.total_count(),
                reviewed_count,
                correct_like_count,
            ),
            accuracy: session.accuracy(),
        };

        let now = self.clock.now()?;
        let started_at = session.started_at.unwrap_or(now);
        self.store.save_session(&summary, started_at, now)?;

        if summary.xp_earned > 0 {
            if let Err(e) = self.ledger.award(
                &summary.learner_id,
                summary.xp_earned,
                SESSION_REWARD_REASON,
                now,
            ) {
                warn!("XP award for {} failed: {}", summary.learner_id, e);
            }
        }

        info!(
            "Session for {} completed: {}/{} recalled, {} XP",
            summary.learner_id, correct_like_count, reviewed_count, summary.xp_earned
        );
        debug!("Session summary: {:?}", summary);
        session.summary = Some(summary.clone());
        Ok(summary)
    }
}
