//! Maps learner responses to delay classes. Fixed table, no adaptation.

use crate::models::{DelayClass, Outcome, Rating, Response, ReviewRecord};

/// Prior correct repetitions after which a binary "correct" earns the long delay.
pub const LONG_AFTER_REPETITIONS: u32 = 2;

pub fn classify_rating(rating: Rating) -> DelayClass {
    match rating {
        Rating::Forgot => DelayClass::Short,
        Rating::Vague => DelayClass::Medium,
        Rating::Clear => DelayClass::Long,
    }
}

/// Incorrect is short. Correct is medium until the record has
/// [`LONG_AFTER_REPETITIONS`] correct repetitions behind it, then long.
pub fn classify_outcome(outcome: Outcome, record: &ReviewRecord) -> DelayClass {
    match outcome {
        Outcome::Incorrect => DelayClass::Short,
        Outcome::Correct if record.repetition_count >= LONG_AFTER_REPETITIONS => DelayClass::Long,
        Outcome::Correct => DelayClass::Medium,
    }
}

pub fn classify(response: Response, record: &ReviewRecord) -> DelayClass {
    match response {
        Response::Rating(rating) => classify_rating(rating),
        Response::Outcome(outcome) => classify_outcome(outcome, record),
    }
}
