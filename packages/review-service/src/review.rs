use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recall_algo::{
    mastery_level, pick_next, quality_from_outcome, schedule, snapshot, study_plan, study_stats,
    LastReview, MasteryLevel, MemoryState, NextItem, ReviewEntry, ReviewSnapshot, StudyPlan,
    StudyStats,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ReviewError, StoreError};
use crate::store::{ProgressKey, ProgressStore};

/// What the learner did, as reported by the quiz or game screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReviewInput {
    /// A score already on the 0-5 scale
    Quality { quality: f64 },
    /// Raw answer data, converted with `quality_from_outcome`
    #[serde(rename_all = "camelCase")]
    Outcome {
        correct: bool,
        hints_used: u32,
        response_time_ms: Option<u64>,
    },
}

impl ReviewInput {
    pub fn quality(&self) -> f64 {
        match *self {
            ReviewInput::Quality { quality } => quality,
            ReviewInput::Outcome {
                correct,
                hints_used,
                response_time_ms,
            } => quality_from_outcome(correct, hints_used, response_time_ms).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub review_id: Uuid,
    pub learner_id: String,
    pub item_id: String,
    pub quality: f64,
    /// `None` on the first review of this item
    pub previous: Option<MemoryState>,
    pub state: MemoryState,
    pub mastery_level: MasteryLevel,
    pub version: u64,
    pub reviewed_at: DateTime<Utc>,
}

pub struct ReviewService<S: ProgressStore> {
    store: Arc<S>,
    max_retries: u32,
    daily_limit: usize,
}

impl<S: ProgressStore> ReviewService<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            max_retries: config.store_max_retries,
            daily_limit: config.daily_limit,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Score one review and persist the next state.
    ///
    /// Lost compare-and-swap races reload the latest state and reschedule on
    /// top of it, up to `max_retries` times.
    pub fn record_review(
        &self,
        learner_id: &str,
        item_id: &str,
        input: ReviewInput,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, ReviewError> {
        let quality = input.quality();
        let key = ProgressKey::new(learner_id, item_id);
        let reviewed = LastReview {
            reviewed_at: now,
            quality,
        };
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let current = self.store.load(&key)?;
            let (previous, expected) = match current {
                Some(row) => (Some(row.state), Some(row.version)),
                None => (None, None),
            };
            let prior = previous.clone().unwrap_or_else(|| MemoryState::new(now));

            let next = schedule(&prior, quality, now).map_err(|e| {
                tracing::warn!(learner_id, item_id, error = %e, "rejected review input");
                e
            })?;

            match self.store.compare_and_swap(&key, expected, next.clone(), reviewed) {
                Ok(version) => {
                    tracing::debug!(
                        learner_id,
                        item_id,
                        quality,
                        repetitions = next.repetitions,
                        interval_days = next.interval_days,
                        easiness_factor = next.easiness_factor,
                        version,
                        "review recorded"
                    );
                    return Ok(ReviewOutcome {
                        review_id: Uuid::new_v4(),
                        learner_id: learner_id.to_string(),
                        item_id: item_id.to_string(),
                        quality,
                        previous,
                        mastery_level: mastery_level(&next),
                        state: next,
                        version,
                        reviewed_at: now,
                    });
                }
                Err(StoreError::Conflict { .. }) if attempts <= self.max_retries => {
                    tracing::warn!(
                        learner_id,
                        item_id,
                        attempt = attempts,
                        "progress write conflict, retrying"
                    );
                }
                Err(StoreError::Conflict { .. }) => {
                    tracing::error!(
                        learner_id,
                        item_id,
                        attempts,
                        "progress write conflict, giving up"
                    );
                    return Err(ReviewError::Conflict {
                        learner_id: learner_id.to_string(),
                        item_id: item_id.to_string(),
                        attempts,
                    });
                }
            }
        }
    }

    /// Most urgent due review, else the first candidate the learner has never seen.
    pub fn next_item(
        &self,
        learner_id: &str,
        candidates: &[String],
        now: DateTime<Utc>,
    ) -> Result<Option<NextItem>, ReviewError> {
        let entries = self.store.list_for_learner(learner_id)?;
        let fresh = unseen(&entries, candidates);
        Ok(pick_next(&entries, &fresh, now))
    }

    pub fn study_plan(
        &self,
        learner_id: &str,
        candidates: &[String],
        now: DateTime<Utc>,
    ) -> Result<StudyPlan, ReviewError> {
        let entries = self.store.list_for_learner(learner_id)?;
        let fresh = unseen(&entries, candidates);
        let plan = study_plan(&entries, &fresh, self.daily_limit, now);
        tracing::debug!(
            learner_id,
            review = plan.review.len(),
            fresh = plan.fresh.len(),
            "study plan built"
        );
        Ok(plan)
    }

    pub fn stats(&self, learner_id: &str, now: DateTime<Utc>) -> Result<StudyStats, ReviewError> {
        let entries = self.store.list_for_learner(learner_id)?;
        Ok(study_stats(entries.iter().map(|e| &e.state), now))
    }

    pub fn snapshots(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReviewSnapshot>, ReviewError> {
        let entries = self.store.list_for_learner(learner_id)?;
        Ok(entries.iter().map(|e| snapshot(e, now)).collect())
    }
}

fn unseen(entries: &[ReviewEntry], candidates: &[String]) -> Vec<String> {
    let seen: HashSet<&str> = entries.iter().map(|e| e.item_id.as_str()).collect();
    candidates
        .iter()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect()
}
