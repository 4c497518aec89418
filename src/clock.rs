//! Time sources for the engine.
//!
//! [`SimulatedClock`] keeps its date in the database so a learner can step
//! through days and watch concepts come due again.

use crate::database::db;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub trait Clock {
    fn now(&self) -> Result<DateTime<Utc>>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

/// Always returns the same instant. Handy in tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<Utc>> {
        Ok(self.0)
    }
}

/// Reads the simulated current date stored in `app_state`.
pub struct SimulatedClock<'a> {
    conn: &'a Connection,
}

impl<'a> SimulatedClock<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn advance_day(&self) -> Result<DateTime<Utc>> {
        db::advance_day(self.conn)?;
        db::get_current_date(self.conn)
    }
}

impl Clock for SimulatedClock<'_> {
    fn now(&self) -> Result<DateTime<Utc>> {
        db::get_current_date(self.conn)
    }
}
