//! The review scheduler: response classification, interval calculation and due selection.

pub mod classifier;
pub mod due;
pub mod interval;

pub use classifier::classify;
pub use due::{DueItem, DueSet, due_concepts, select_due};
pub use interval::{apply_review, load_record, next_interval};
