//! Learning Statistics
//!
//! Aggregates over a learner's memory states, plus a flat export row per item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::ReviewEntry;
use crate::sm2::{hours_until_review, is_due, mastery_level, mastery_percent};
use crate::types::{MasteryLevel, MemoryState, DEFAULT_EASINESS, MS_PER_DAY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
    pub due: usize,
    /// Mean easiness over reviewed states (repetitions > 0), 2.5 when none
    pub average_easiness: f64,
    /// Mean interval over all states, rounded
    pub average_interval_days: u32,
    /// Share of mastered states as a rounded percentage
    pub mastery_rate: u8,
}

/// One exported row per item, for analysis and progress screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnapshot {
    pub item_id: String,
    pub repetitions: u32,
    pub interval_days: u32,
    pub easiness_factor: f64,
    pub next_due_at: DateTime<Utc>,
    pub mastery_level: MasteryLevel,
    pub mastery_percent: u8,
    pub hours_until_review: i64,
    /// `None` when the entry carries no review history
    pub last_quality: Option<f64>,
    /// Whole days since the last review, rounded down
    pub days_since_last_review: Option<i64>,
}

pub fn study_stats<'a, I>(states: I, now: DateTime<Utc>) -> StudyStats
where
    I: IntoIterator<Item = &'a MemoryState>,
{
    let mut stats = StudyStats {
        total: 0,
        new: 0,
        learning: 0,
        mastered: 0,
        due: 0,
        average_easiness: DEFAULT_EASINESS,
        average_interval_days: 0,
        mastery_rate: 0,
    };

    let mut easiness_sum = 0.0;
    let mut reviewed = 0usize;
    let mut interval_sum = 0u64;

    for state in states {
        stats.total += 1;
        match mastery_level(state) {
            MasteryLevel::New => stats.new += 1,
            MasteryLevel::Learning => stats.learning += 1,
            MasteryLevel::Mastered => stats.mastered += 1,
        }
        if is_due(state, now) {
            stats.due += 1;
        }
        if state.repetitions > 0 {
            easiness_sum += state.easiness_factor;
            reviewed += 1;
        }
        interval_sum += state.interval_days as u64;
    }

    if reviewed > 0 {
        stats.average_easiness = easiness_sum / reviewed as f64;
    }
    if stats.total > 0 {
        let total = stats.total as f64;
        stats.average_interval_days = (interval_sum as f64 / total).round() as u32;
        stats.mastery_rate = (stats.mastered as f64 / total * 100.0).round() as u8;
    }

    stats
}

pub fn snapshot(entry: &ReviewEntry, now: DateTime<Utc>) -> ReviewSnapshot {
    let state = &entry.state;
    ReviewSnapshot {
        item_id: entry.item_id.clone(),
        repetitions: state.repetitions,
        interval_days: state.interval_days,
        easiness_factor: state.easiness_factor,
        next_due_at: state.next_due_at,
        mastery_level: mastery_level(state),
        mastery_percent: mastery_percent(state),
        hours_until_review: hours_until_review(state, now),
        last_quality: entry.last_review.map(|r| r.quality),
        days_since_last_review: entry.last_review.map(|r| {
            let elapsed_ms = (now - r.reviewed_at).num_milliseconds() as f64;
            (elapsed_ms / MS_PER_DAY).floor() as i64
        }),
    }
}
