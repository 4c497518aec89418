//! Engine configuration loaded from a TOML file.
//!
//! ```toml
//! database = "quizme.sqlite3"
//!
//! [intervals]
//! short_days = 1
//! medium_days = 3
//! long_days = 10
//! scale_long = true
//! max_interval_days = 180
//!
//! [rewards]
//! xp_per_review = 2
//! xp_per_correct = 8
//! perfect_bonus = 20
//! ```
//!
//! Every field is optional; missing ones fall back to the defaults above.

use crate::error::{ReviewError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Day tables used by the interval calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalPolicy {
    pub short_days: u32,
    pub medium_days: u32,
    pub long_days: u32,
    /// Multiply the long interval by the repetition count.
    pub scale_long: bool,
    pub max_interval_days: u32,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self {
            short_days: 1,
            medium_days: 3,
            long_days: 10,
            scale_long: true,
            max_interval_days: 180,
        }
    }
}

impl IntervalPolicy {
    /// Same tables, no growth of the long interval.
    pub fn unscaled() -> Self {
        Self {
            scale_long: false,
            ..Self::default()
        }
    }

    /// Checks `1 <= short < medium <= long <= max`.
    pub fn validate(&self) -> Result<()> {
        if self.short_days == 0 {
            return Err(ReviewError::InvalidPolicy(
                "short_days must be at least 1".to_string(),
            ));
        }
        if self.short_days >= self.medium_days {
            return Err(ReviewError::InvalidPolicy(format!(
                "short_days ({}) must be less than medium_days ({})",
                self.short_days, self.medium_days
            )));
        }
        if self.medium_days > self.long_days {
            return Err(ReviewError::InvalidPolicy(format!(
                "medium_days ({}) must not exceed long_days ({})",
                self.medium_days, self.long_days
            )));
        }
        if self.long_days > self.max_interval_days {
            return Err(ReviewError::InvalidPolicy(format!(
                "long_days ({}) must not exceed max_interval_days ({})",
                self.long_days, self.max_interval_days
            )));
        }
        Ok(())
    }
}

fn saturating_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Experience points handed out when a session completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    pub xp_per_review: u32,
    pub xp_per_correct: u32,
    pub perfect_bonus: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            xp_per_review: 2,
            xp_per_correct: 8,
            perfect_bonus: 20,
        }
    }
}

impl RewardPolicy {
    /// XP for a session. The bonus needs a non-empty session where every
    /// concept was written and recalled.
    pub fn xp_for(&self, total: usize, reviewed: usize, correct_like: usize) -> u32 {
        let reviewed_xp = self.xp_per_review.saturating_mul(saturating_u32(reviewed));
        let correct_xp = self.xp_per_correct.saturating_mul(saturating_u32(correct_like));
        let mut xp = reviewed_xp.saturating_add(correct_xp);
        if total > 0 && reviewed == total && correct_like == total {
            xp = xp.saturating_add(self.perfect_bonus);
        }
        xp
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database: String,
    pub intervals: IntervalPolicy,
    pub rewards: RewardPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: "quizme.sqlite3".to_string(),
            intervals: IntervalPolicy::default(),
            rewards: RewardPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.intervals.validate()?;
        Ok(config)
    }

    /// Loads the config file, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
