//! Per-(learner, concept) scheduling state.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub learner_id: String,
    pub concept_id: i64,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: DateTime<Utc>,
    pub interval_days: u32,
    pub repetition_count: u32,
    pub lapse_count: u32,
}

impl ReviewRecord {
    /// A record for a concept the learner has just been introduced to. It is due immediately.
    pub fn introduced(learner_id: &str, concept_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            concept_id,
            last_reviewed_at: None,
            next_review_at: now,
            interval_days: 0,
            repetition_count: 0,
            lapse_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}
