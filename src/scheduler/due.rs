//! Due-set selection.

use crate::database::ReviewStore;
use crate::error::Result;
use crate::models::{Concept, ReviewRecord};
use chrono::{DateTime, Utc};
use std::cmp::{Ordering, Reverse};

#[derive(Clone, Debug, PartialEq)]
pub struct DueItem {
    pub record: ReviewRecord,
    pub concept: Concept,
}

/// Snapshot of the concepts due at one instant, most urgent first.
///
/// Iterating has no side effects, so callers may stop early and iterate again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DueSet {
    items: Vec<DueItem>,
}

impl DueSet {
    pub fn iter(&self) -> std::slice::Iter<'_, DueItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn concept_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.record.concept_id).collect()
    }
}

impl IntoIterator for DueSet {
    type Item = DueItem;
    type IntoIter = std::vec::IntoIter<DueItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a DueSet {
    type Item = &'a DueItem;
    type IntoIter = std::slice::Iter<'a, DueItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Urgency order: earliest due date, then most lapses, then concept id.
fn urgency(a: &ReviewRecord, b: &ReviewRecord) -> Ordering {
    (a.next_review_at, Reverse(a.lapse_count), a.concept_id).cmp(&(
        b.next_review_at,
        Reverse(b.lapse_count),
        b.concept_id,
    ))
}

/// Filters and orders candidates. Records due after `now` are never returned.
pub fn select_due(
    candidates: Vec<(ReviewRecord, Concept)>,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> DueSet {
    let mut items: Vec<DueItem> = candidates
        .into_iter()
        .filter(|(record, _)| record.is_due(now))
        .map(|(record, concept)| DueItem { record, concept })
        .collect();
    items.sort_by(|a, b| urgency(&a.record, &b.record));
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    DueSet { items }
}

/// Returns the learner's concepts due at `now`, at most `limit` of them.
pub fn due_concepts<S: ReviewStore + ?Sized>(
    store: &S,
    learner_id: &str,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> Result<DueSet> {
    let candidates = store.due_records(learner_id, now)?;
    Ok(select_due(candidates, now, limit))
}
