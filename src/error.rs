//! Error type shared by the scheduler, the store and the session orchestrator.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("invalid rating: {0:?}")]
    InvalidRating(String),

    #[error("no review record for learner {learner_id} and concept {concept_id}")]
    RecordNotFound { learner_id: String, concept_id: i64 },

    #[error("concept not found: {0}")]
    ConceptNotFound(i64),

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("session is not in progress")]
    SessionNotActive,

    #[error("session is not completed yet ({remaining} concepts left)")]
    SessionNotCompleted { remaining: usize },

    #[error("expected rating for concept {expected}, got {got}")]
    UnexpectedConcept { expected: i64, got: i64 },

    #[error("invalid interval policy: {0}")]
    InvalidPolicy(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
