//! Common Types and Constants
//!
//! Shared data structures used across all scheduling modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::validate_state;

// ==================== Constants ====================

/// Easiness factor of a state that has never been reviewed
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Lower bound for the easiness factor (no upper bound)
pub const MIN_EASINESS: f64 = 1.3;

/// Reviews scored at or above this quality count as successful recall
pub const PASS_THRESHOLD: f64 = 3.0;

/// Lowest quality score
pub const MIN_QUALITY: f64 = 0.0;

/// Highest quality score
pub const MAX_QUALITY: f64 = 5.0;

/// Interval after the first successful review
pub const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval after the second consecutive successful review
pub const SECOND_INTERVAL_DAYS: u32 = 6;

/// Mastery requires at least this many consecutive successes
pub const MASTERED_MIN_REPETITIONS: u32 = 3;

/// Mastery requires the current interval to be at least a week
pub const MASTERED_MIN_INTERVAL_DAYS: u32 = 7;

/// Mastery requires the item not to be a hard one
pub const MASTERED_MIN_EASINESS: f64 = 2.0;

pub(crate) const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
pub(crate) const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

// ==================== Errors ====================

/// Contract violations at the scheduler boundary.
///
/// Out-of-range quality is not an error (it is clamped); only values that
/// cannot be interpreted at all end up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid quality: {0}")]
    InvalidQuality(String),
    #[error("invalid memory state: {0}")]
    InvalidState(String),
}

// ==================== Memory State ====================

/// Memory strength of one learner for one item.
///
/// Owned by the (learner, item) pair; the scheduler only reads it and
/// returns a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    /// Consecutive successful reviews since the last lapse
    pub repetitions: u32,
    /// Days until the next review, as computed by the last update (0 after a lapse)
    pub interval_days: u32,
    /// Interval growth multiplier, never below [`MIN_EASINESS`]
    pub easiness_factor: f64,
    /// When the item becomes due again
    pub next_due_at: DateTime<Utc>,
}

impl MemoryState {
    /// State created the first time a learner is scored on an item.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            repetitions: 0,
            interval_days: 0,
            easiness_factor: DEFAULT_EASINESS,
            next_due_at: now,
        }
    }

    /// Parse a stored state (camelCase JSON) and validate it.
    pub fn from_json(raw: &str) -> Result<Self, ScheduleError> {
        let state: MemoryState = serde_json::from_str(raw)
            .map_err(|e| ScheduleError::InvalidState(e.to_string()))?;
        validate_state(&state)?;
        Ok(state)
    }

    pub fn is_new(&self) -> bool {
        self.repetitions == 0
    }
}

// ==================== Mastery ====================

/// Coarse classification derived from a [`MemoryState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    New,
    Learning,
    Mastered,
}

impl MasteryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryLevel::New => "new",
            MasteryLevel::Learning => "learning",
            MasteryLevel::Mastered => "mastered",
        }
    }
}

// ==================== Quality ====================

/// Recall performance for a single review, 0..=5.
///
/// 0-2 mean the item was forgotten, 3-5 mean it was recalled with
/// decreasing effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityScore(u8);

impl QualityScore {
    pub const FORGOTTEN: QualityScore = QualityScore(0);
    pub const PERFECT: QualityScore = QualityScore(5);

    /// Returns `None` for values above 5.
    pub fn new(value: u8) -> Option<Self> {
        (value as f64 <= MAX_QUALITY).then_some(Self(value))
    }

    /// Round and clamp a raw score into the valid range.
    pub(crate) fn from_raw(raw: f64) -> Self {
        let rounded = raw.round().clamp(MIN_QUALITY, MAX_QUALITY);
        Self(rounded as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_pass(&self) -> bool {
        self.0 as f64 >= PASS_THRESHOLD
    }
}

impl From<QualityScore> for f64 {
    fn from(q: QualityScore) -> Self {
        q.0 as f64
    }
}
