pub mod concept;
pub mod rating;
pub mod review_record;
pub mod session;
pub mod topic;

pub use concept::Concept;
pub use rating::{DelayClass, Outcome, Rating, Response};
pub use review_record::ReviewRecord;
pub use session::{ItemStatus, ReviewSession, SessionItem, SessionState, SessionSummary};
pub use topic::{Topic, TopicEntry};
