//! Closed rating sets accepted from learners, and the delay classes they map to.
//!
//! Anything coming from outside (CLI input, JSON payloads) is parsed into one of
//! these enums first. Values outside the set are rejected with
//! [`ReviewError::InvalidRating`] before any record is touched.

use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-level self assessment of recall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Forgot,
    Vague,
    Clear,
}

/// Binary correctness signal, e.g. from a quiz question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Incorrect,
    Correct,
}

/// Either kind of learner response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Rating(Rating),
    Outcome(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayClass {
    Short,
    Medium,
    Long,
}

impl DelayClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DelayClass::Short => "short",
            DelayClass::Medium => "medium",
            DelayClass::Long => "long",
        }
    }

    /// Medium and Long both count as a successful recall.
    pub fn is_correct_like(self) -> bool {
        !matches!(self, DelayClass::Short)
    }
}

impl FromStr for Rating {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forgot" | "0" => Ok(Rating::Forgot),
            "vague" | "1" => Ok(Rating::Vague),
            "clear" | "2" => Ok(Rating::Clear),
            _ => Err(ReviewError::InvalidRating(s.to_string())),
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = ReviewError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Forgot),
            1 => Ok(Rating::Vague),
            2 => Ok(Rating::Clear),
            other => Err(ReviewError::InvalidRating(other.to_string())),
        }
    }
}

impl FromStr for Outcome {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(Outcome::Correct),
            "incorrect" => Ok(Outcome::Incorrect),
            _ => Err(ReviewError::InvalidRating(s.to_string())),
        }
    }
}

impl FromStr for Response {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Rating>()
            .map(Response::Rating)
            .or_else(|_| s.parse::<Outcome>().map(Response::Outcome))
    }
}

impl From<Rating> for Response {
    fn from(rating: Rating) -> Self {
        Response::Rating(rating)
    }
}

impl From<Outcome> for Response {
    fn from(outcome: Outcome) -> Self {
        Response::Outcome(outcome)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Response::Rating(Rating::Forgot) => "forgot",
            Response::Rating(Rating::Vague) => "vague",
            Response::Rating(Rating::Clear) => "clear",
            Response::Outcome(Outcome::Incorrect) => "incorrect",
            Response::Outcome(Outcome::Correct) => "correct",
        };
        f.write_str(name)
    }
}
