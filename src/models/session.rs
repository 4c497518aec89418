//! Review session state.
//!
//! A [`ReviewSession`] is the handle a caller holds for one pass over a
//! snapshotted set of concepts. It lives entirely in the caller's hands: the
//! engine never keeps a "current session" of its own, so any number of
//! sessions can exist side by side.

use super::DelayClass;
use super::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemStatus {
    Pending,
    Updated {
        response: Response,
        delay: DelayClass,
        interval_days: u32,
    },
    /// The rating was accepted but the record could not be written.
    NotUpdated { reason: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionItem {
    pub concept_id: i64,
    pub status: ItemStatus,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub learner_id: String,
    pub reviewed_count: usize,
    pub correct_like_count: usize,
    pub not_updated_count: usize,
    pub xp_earned: u32,
    pub accuracy: f64,
}

#[derive(Clone, Debug)]
pub struct ReviewSession {
    pub learner_id: String,
    pub items: Vec<SessionItem>,
    pub current_index: usize,
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub(crate) summary: Option<SessionSummary>,
}

impl ReviewSession {
    /// Snapshots the candidate concepts. Duplicates are dropped, first occurrence wins.
    pub fn new(learner_id: &str, concept_ids: &[i64]) -> Self {
        let mut items: Vec<SessionItem> = Vec::with_capacity(concept_ids.len());
        for &concept_id in concept_ids {
            if items.iter().any(|item| item.concept_id == concept_id) {
                continue;
            }
            items.push(SessionItem {
                concept_id,
                status: ItemStatus::Pending,
                answered_at: None,
            });
        }

        Self {
            learner_id: learner_id.to_string(),
            items,
            current_index: 0,
            state: SessionState::NotStarted,
            started_at: None,
            summary: None,
        }
    }

    /// Moves a fresh session into progress. An empty snapshot completes at once.
    pub fn begin(&mut self, now: DateTime<Utc>) {
        if self.state != SessionState::NotStarted {
            return;
        }
        self.started_at = Some(now);
        self.state = if self.items.is_empty() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        };
    }

    pub fn current_concept(&self) -> Option<i64> {
        if self.state != SessionState::InProgress {
            return None;
        }
        self.items.get(self.current_index).map(|item| item.concept_id)
    }

    /// Stores the outcome for the current concept and moves on.
    pub(crate) fn settle_current(&mut self, status: ItemStatus, at: DateTime<Utc>) {
        if let Some(item) = self.items.get_mut(self.current_index) {
            item.status = status;
            item.answered_at = Some(at);
        }
        self.current_index += 1;
        if self.current_index >= self.items.len() {
            self.state = SessionState::Completed;
        }
    }

    pub fn reviewed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Updated { .. }))
            .count()
    }

    pub fn correct_like_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| {
                matches!(item.status, ItemStatus::Updated { delay, .. } if delay.is_correct_like())
            })
            .count()
    }

    pub fn not_updated_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::NotUpdated { .. }))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.current_index.min(self.total_count())
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Share of reviewed concepts that were recalled. Zero when nothing was reviewed.
    pub fn accuracy(&self) -> f64 {
        let reviewed = self.reviewed_count();
        if reviewed == 0 {
            return 0.0;
        }
        self.correct_like_count() as f64 / reviewed as f64
    }

    pub fn progress_message(&self) -> String {
        match self.state {
            SessionState::NotStarted => format!("{} concepts queued", self.total_count()),
            SessionState::InProgress => format!(
                "Concept {} of {}",
                self.current_index + 1,
                self.total_count()
            ),
            SessionState::Completed => format!(
                "Done: {}/{} recalled",
                self.correct_like_count(),
                self.reviewed_count()
            ),
        }
    }
}
