pub mod clock;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;

pub use clock::{Clock, FixedClock, SimulatedClock, SystemClock};
pub use config::{EngineConfig, IntervalPolicy, RewardPolicy};
pub use engine::{RecordUpdateResult, ReviewEngine};
pub use error::{ReviewError, Result};
pub use models::{Concept, DelayClass, Outcome, Rating, Response, ReviewRecord, ReviewSession};
