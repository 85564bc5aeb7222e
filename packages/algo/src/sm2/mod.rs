//! SM-2 Scheduler
//!
//! Core rules (SuperMemo-2):
//! - Quality q in [0, 5]; q < 3 is a lapse
//! - Lapse: repetitions and interval reset to 0
//! - Success: repetitions += 1, interval becomes 1, 6, then round(I * EF)
//!   using the interval and easiness factor from *before* this review
//! - EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
//! - Due date = now + max(1, I) days; a lapse is due again tomorrow,
//!   while the stored interval stays 0
//!
//! Mastery: repetitions >= 3, interval >= 7 days and EF >= 2.0. The
//! alternative 20%-per-repetition heuristic only feeds [`mastery_percent`].

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;

use crate::sanitize::{clamp_quality, validate_state};
use crate::types::{
    MasteryLevel, MemoryState, ScheduleError, FIRST_INTERVAL_DAYS, MASTERED_MIN_EASINESS,
    MASTERED_MIN_INTERVAL_DAYS, MASTERED_MIN_REPETITIONS, MAX_QUALITY, MIN_EASINESS, MS_PER_DAY,
    MS_PER_HOUR, PASS_THRESHOLD, SECOND_INTERVAL_DAYS,
};

// ==================== Constants ====================

/// Upper end of the easiness range used by the mastery percentage
const MASTERY_PERCENT_EASINESS_CEILING: f64 = 3.0;

/// Percentage contributed by each consecutive success
const MASTERY_PERCENT_PER_REPETITION: u32 = 20;

/// Cap on the repetition part of the mastery percentage
const MASTERY_PERCENT_REPETITION_CAP: u32 = 80;

// ==================== State Transition ====================

/// Compute the next memory state after a review scored `quality`.
///
/// Out-of-range quality is clamped into [0, 5]. A NaN quality or an invalid
/// prior state is rejected.
pub fn schedule(
    state: &MemoryState,
    quality: f64,
    now: DateTime<Utc>,
) -> Result<MemoryState, ScheduleError> {
    validate_state(state)?;
    let q = clamp_quality(quality)?;

    let (repetitions, interval_days) = if q < PASS_THRESHOLD {
        (0, 0)
    } else {
        let repetitions = state.repetitions.saturating_add(1);
        let interval_days = match repetitions {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => grow_interval(state.interval_days, state.easiness_factor),
        };
        (repetitions, interval_days)
    };

    let easiness_factor = next_easiness(state.easiness_factor, q);
    let next_due_at = due_after(now, interval_days);

    Ok(MemoryState {
        repetitions,
        interval_days,
        easiness_factor,
        next_due_at,
    })
}

/// Schedule many independent (state, quality) pairs in parallel.
///
/// Results keep the input order.
pub fn schedule_batch(
    inputs: &[(MemoryState, f64)],
    now: DateTime<Utc>,
) -> Vec<Result<MemoryState, ScheduleError>> {
    inputs
        .par_iter()
        .map(|(state, quality)| schedule(state, *quality, now))
        .collect()
}

fn grow_interval(previous: u32, easiness_factor: f64) -> u32 {
    // `as` saturates on overflow
    (previous as f64 * easiness_factor).round() as u32
}

fn next_easiness(easiness_factor: f64, q: f64) -> f64 {
    let miss = MAX_QUALITY - q;
    let ef = easiness_factor + (0.1 - miss * (0.08 + miss * 0.02));
    if ef < MIN_EASINESS {
        MIN_EASINESS
    } else {
        ef
    }
}

fn due_after(now: DateTime<Utc>, interval_days: u32) -> DateTime<Utc> {
    let days = Duration::days(interval_days.max(1) as i64);
    now.checked_add_signed(days)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ==================== Derived Queries ====================

pub fn is_due(state: &MemoryState, now: DateTime<Utc>) -> bool {
    now >= state.next_due_at
}

/// Fractional days past the due date; 0 when not yet due.
pub fn overdue_days(state: &MemoryState, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - state.next_due_at).num_milliseconds() as f64;
    (elapsed_ms / MS_PER_DAY).max(0.0)
}

/// Sort key for due items, lower is more urgent.
///
/// More overdue and harder (lower EF) items come first. Items not yet due
/// count as 0 days overdue.
pub fn priority(state: &MemoryState, now: DateTime<Utc>) -> f64 {
    let overdue = overdue_days(state, now);
    -(overdue * 10.0 + (3.0 - state.easiness_factor) * 5.0)
}

pub fn mastery_level(state: &MemoryState) -> MasteryLevel {
    if state.repetitions == 0 {
        return MasteryLevel::New;
    }
    if state.repetitions >= MASTERED_MIN_REPETITIONS
        && state.interval_days >= MASTERED_MIN_INTERVAL_DAYS
        && state.easiness_factor >= MASTERED_MIN_EASINESS
    {
        return MasteryLevel::Mastered;
    }
    MasteryLevel::Learning
}

/// Mastery as a percentage (0-100) for progress bars.
///
/// Repetitions give 20% each up to 80%; the easiness factor adds up to 20%
/// scaled over [1.3, 3.0].
pub fn mastery_percent(state: &MemoryState) -> u8 {
    let from_reps = state
        .repetitions
        .saturating_mul(MASTERY_PERCENT_PER_REPETITION)
        .min(MASTERY_PERCENT_REPETITION_CAP) as f64;
    let ease_span = MASTERY_PERCENT_EASINESS_CEILING - MIN_EASINESS;
    let from_ease = ((state.easiness_factor - MIN_EASINESS) / ease_span).max(0.0) * 20.0;
    (from_reps + from_ease).round().min(100.0) as u8
}

/// Whole hours until the item is due, 0 once it is due.
pub fn hours_until_review(state: &MemoryState, now: DateTime<Utc>) -> i64 {
    let remaining_ms = (state.next_due_at - now).num_milliseconds() as f64;
    (remaining_ms / MS_PER_HOUR).round().max(0.0) as i64
}
