//! Interval calculation.
//!
//! Each delay class maps to a fixed number of days:
//! - Short: `short_days`, repetition count resets, lapse count goes up by one
//! - Medium: `medium_days`, repetition count goes up by one
//! - Long: `long_days`, repetition count goes up by one. With `scale_long`
//!   the days are multiplied by the new repetition count (at least 1)
//!
//! Every interval is capped at `max_interval_days`. The due date is always
//! `now + interval_days`, so it never precedes the review time.

use crate::config::IntervalPolicy;
use crate::database::ReviewStore;
use crate::error::{ReviewError, Result};
use crate::models::{DelayClass, ReviewRecord};
use chrono::{DateTime, Duration, Utc};
use log::debug;

/// Computes the record that results from reviewing `record` at `now`.
pub fn next_interval(
    record: &ReviewRecord,
    delay: DelayClass,
    policy: &IntervalPolicy,
    now: DateTime<Utc>,
) -> ReviewRecord {
    let (interval_days, repetition_count, lapse_count) = match delay {
        DelayClass::Short => (policy.short_days, 0, record.lapse_count.saturating_add(1)),
        DelayClass::Medium => (
            policy.medium_days,
            record.repetition_count.saturating_add(1),
            record.lapse_count,
        ),
        DelayClass::Long => {
            let repetitions = record.repetition_count.saturating_add(1);
            let days = if policy.scale_long {
                policy.long_days.saturating_mul(repetitions.max(1))
            } else {
                policy.long_days
            };
            (days, repetitions, record.lapse_count)
        }
    };
    let interval_days = interval_days.min(policy.max_interval_days);

    ReviewRecord {
        learner_id: record.learner_id.clone(),
        concept_id: record.concept_id,
        last_reviewed_at: Some(now),
        next_review_at: now + Duration::days(interval_days as i64),
        interval_days,
        repetition_count,
        lapse_count,
    }
}

/// Reads the record for the pair, failing with `RecordNotFound` if there is none.
pub fn load_record<S: ReviewStore + ?Sized>(
    store: &S,
    learner_id: &str,
    concept_id: i64,
) -> Result<ReviewRecord> {
    store
        .get_record(learner_id, concept_id)?
        .ok_or_else(|| ReviewError::RecordNotFound {
            learner_id: learner_id.to_string(),
            concept_id,
        })
}

/// Computes the next interval for `record` and writes it back.
///
/// On any error the stored record is left as it was.
pub fn apply_review<S: ReviewStore + ?Sized>(
    store: &S,
    record: &ReviewRecord,
    delay: DelayClass,
    policy: &IntervalPolicy,
    now: DateTime<Utc>,
) -> Result<ReviewRecord> {
    let updated = next_interval(record, delay, policy, now);
    store.update_record(&updated)?;

    debug!(
        "Concept {} for {}: {:?} -> {} days (reps {}, lapses {})",
        updated.concept_id,
        updated.learner_id,
        delay,
        updated.interval_days,
        updated.repetition_count,
        updated.lapse_count
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db;
    use crate::models::Concept;
    use chrono::TimeZone;
    use rusqlite::Connection;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn fresh() -> ReviewRecord {
        ReviewRecord::introduced("ana", 1, t0())
    }

    fn run(delays: &[DelayClass], policy: &IntervalPolicy) -> Vec<ReviewRecord> {
        let mut record = fresh();
        let mut now = t0();
        let mut history = Vec::new();
        for &delay in delays {
            record = next_interval(&record, delay, policy, now);
            history.push(record.clone());
            now = record.next_review_at;
        }
        history
    }

    #[test]
    fn test_day_tables() {
        let policy = IntervalPolicy::default();
        assert_eq!(next_interval(&fresh(), DelayClass::Short, &policy, t0()).interval_days, 1);
        assert_eq!(next_interval(&fresh(), DelayClass::Medium, &policy, t0()).interval_days, 3);
        assert_eq!(next_interval(&fresh(), DelayClass::Long, &policy, t0()).interval_days, 10);
    }

    #[test]
    fn test_due_date_is_review_time_plus_interval() {
        let policy = IntervalPolicy::default();
        for delay in [DelayClass::Short, DelayClass::Medium, DelayClass::Long] {
            let next = next_interval(&fresh(), delay, &policy, t0());
            let reviewed = next.last_reviewed_at.unwrap();
            assert_eq!(
                next.next_review_at,
                reviewed + Duration::days(next.interval_days as i64)
            );
            assert!(next.next_review_at >= reviewed);
        }
    }

    #[test]
    fn test_forgot_is_shorter_than_clear_and_counts_a_lapse() {
        let policy = IntervalPolicy::default();
        let mut prior = fresh();
        prior.repetition_count = 3;
        prior.interval_days = 30;
        prior.lapse_count = 2;

        let forgot = next_interval(&prior, DelayClass::Short, &policy, t0());
        let clear = next_interval(&prior, DelayClass::Long, &policy, t0());

        assert!(forgot.interval_days < clear.interval_days);
        assert_eq!(forgot.lapse_count, prior.lapse_count + 1);
        assert_eq!(forgot.repetition_count, 0);
        assert_eq!(clear.lapse_count, prior.lapse_count);
    }

    #[test]
    fn test_vague_clear_forgot_scenario_scaled() {
        use DelayClass::*;
        let history = run(&[Medium, Long, Short], &IntervalPolicy::default());
        let intervals: Vec<u32> = history.iter().map(|r| r.interval_days).collect();
        assert_eq!(intervals, vec![3, 20, 1]);

        let last = history.last().unwrap();
        assert_eq!(last.lapse_count, 1);
        assert_eq!(last.repetition_count, 0);
    }

    #[test]
    fn test_vague_clear_forgot_scenario_unscaled() {
        use DelayClass::*;
        let history = run(&[Medium, Long, Short], &IntervalPolicy::unscaled());
        let intervals: Vec<u32> = history.iter().map(|r| r.interval_days).collect();
        assert_eq!(intervals, vec![3, 10, 1]);
    }

    #[test]
    fn test_consecutive_clears_never_shrink_and_respect_cap() {
        let policy = IntervalPolicy::default();
        let history = run(&[DelayClass::Long; 30], &policy);
        for pair in history.windows(2) {
            assert!(pair[1].interval_days >= pair[0].interval_days);
        }
        assert_eq!(history.last().unwrap().interval_days, policy.max_interval_days);
    }

    #[test]
    fn test_two_clears_not_earlier_than_clear_then_forgot() {
        for policy in [IntervalPolicy::default(), IntervalPolicy::unscaled()] {
            let clears = run(&[DelayClass::Long, DelayClass::Long], &policy);
            let lapse = run(&[DelayClass::Long, DelayClass::Short], &policy);
            assert!(clears[1].next_review_at >= lapse[1].next_review_at);
        }
    }

    #[test]
    fn test_apply_review_persists_and_reports_missing_records() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let id = db::add_concept(&Concept::new("math", "7*8", "56"), &conn).unwrap();
        db::create_review_record(&ReviewRecord::introduced("ana", id, t0()), &conn).unwrap();

        let policy = IntervalPolicy::default();
        let record = load_record(&conn, "ana", id).unwrap();
        let updated = apply_review(&conn, &record, DelayClass::Medium, &policy, t0()).unwrap();
        let stored = db::get_review_record("ana", id, &conn).unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.interval_days, 3);

        let err = load_record(&conn, "bob", id).unwrap_err();
        assert!(matches!(err, ReviewError::RecordNotFound { .. }));

        let orphan = ReviewRecord::introduced("bob", id, t0());
        let err = apply_review(&conn, &orphan, DelayClass::Long, &policy, t0()).unwrap_err();
        assert!(matches!(err, ReviewError::RecordNotFound { .. }));
    }

    #[test]
    fn test_counters_saturate_at_their_maximum() {
        let policy = IntervalPolicy::default();
        let mut prior = fresh();
        prior.repetition_count = u32::MAX;
        prior.lapse_count = u32::MAX;

        let clear = next_interval(&prior, DelayClass::Long, &policy, t0());
        assert_eq!(clear.repetition_count, u32::MAX);
        assert_eq!(clear.interval_days, policy.max_interval_days);

        let vague = next_interval(&prior, DelayClass::Medium, &policy, t0());
        assert_eq!(vague.repetition_count, u32::MAX);

        let forgot = next_interval(&prior, DelayClass::Short, &policy, t0());
        assert_eq!(forgot.lapse_count, u32::MAX);
        assert_eq!(forgot.repetition_count, 0);
    }
}
