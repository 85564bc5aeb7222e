//! Replays a JSON-lines review log through the review service.
//!
//! One event per line:
//!
//! ```text
//! {"learnerId":"u1","itemId":"apple","at":"2024-05-01T08:00:00Z","quality":5}
//! {"learnerId":"u1","itemId":"pear","at":"2024-05-01T08:01:00Z","correct":true,"hintsUsed":1,"responseTimeMs":18000}
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recall_algo::StudyStats;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ReplayError, ReviewError};
use crate::review::{ReviewInput, ReviewService};
use crate::store::{InMemoryProgressStore, ProgressStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub learner_id: String,
    pub item_id: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
}

impl ReviewEvent {
    pub fn input(&self) -> Result<ReviewInput, String> {
        match (self.quality, self.correct) {
            (Some(quality), _) => Ok(ReviewInput::Quality { quality }),
            (None, Some(correct)) => Ok(ReviewInput::Outcome {
                correct,
                hints_used: self.hints_used,
                response_time_ms: self.response_time_ms,
            }),
            (None, None) => Err("event needs either `quality` or `correct`".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub events: usize,
    /// Time of the latest event; stats are computed as of this instant
    pub as_of: Option<DateTime<Utc>>,
    pub learners: BTreeMap<String, StudyStats>,
}

pub fn replay<S, R>(service: &ReviewService<S>, reader: R) -> Result<ReplayReport, ReplayError>
where
    S: ProgressStore,
    R: BufRead,
{
    let mut events = 0usize;
    let mut as_of: Option<DateTime<Utc>> = None;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: ReviewEvent = serde_json::from_str(&line).map_err(|e| ReplayError::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        let input = event.input().map_err(|message| ReplayError::Parse {
            line: line_no,
            message,
        })?;

        service
            .record_review(&event.learner_id, &event.item_id, input, event.at)
            .map_err(|source| ReplayError::Review {
                line: line_no,
                source,
            })?;

        events += 1;
        as_of = Some(as_of.map_or(event.at, |t| t.max(event.at)));
    }

    let mut learners = BTreeMap::new();
    if let Some(now) = as_of {
        let ids = service.store().learner_ids().map_err(ReviewError::from)?;
        for learner_id in ids {
            let stats = service.stats(&learner_id, now)?;
            learners.insert(learner_id, stats);
        }
    }

    tracing::info!(events, learners = learners.len(), "replay finished");

    Ok(ReplayReport {
        events,
        as_of,
        learners,
    })
}

pub fn replay_file(path: impl AsRef<Path>, config: &Config) -> Result<ReplayReport, ReplayError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "replaying review log");
    let file = File::open(path)?;
    let service = ReviewService::new(Arc::new(InMemoryProgressStore::new()), config);
    replay(&service, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ReviewService<InMemoryProgressStore> {
        ReviewService::new(Arc::new(InMemoryProgressStore::new()), &Config::default())
    }

    #[test]
    fn test_event_input() {
        let event: ReviewEvent = serde_json::from_str(
            r#"{"learnerId":"u1","itemId":"w","at":"2024-05-01T08:00:00Z","correct":false,"hintsUsed":3}"#,
        )
        .unwrap();
        assert_eq!(
            event.input().unwrap(),
            ReviewInput::Outcome {
                correct: false,
                hints_used: 3,
                response_time_ms: None
            }
        );

        let bare: ReviewEvent = serde_json::from_str(
            r#"{"learnerId":"u1","itemId":"w","at":"2024-05-01T08:00:00Z"}"#,
        )
        .unwrap();
        assert!(bare.input().is_err());
    }

    #[test]
    fn test_replay_skips_blank_lines() {
        let log = "\n{\"learnerId\":\"u1\",\"itemId\":\"w\",\"at\":\"2024-05-01T08:00:00Z\",\"quality\":4}\n\n";
        let report = replay(&service(), log.as_bytes()).unwrap();
        assert_eq!(report.events, 1);
        assert_eq!(report.learners["u1"].total, 1);
    }

    #[test]
    fn test_replay_reports_bad_line_number() {
        let log = concat!(
            "{\"learnerId\":\"u1\",\"itemId\":\"w\",\"at\":\"2024-05-01T08:00:00Z\",\"quality\":4}\n",
            "{\"learnerId\":\"u1\",\"itemId\":\"w\",\"at\":\"2024-05-02T08:00:00Z\",\"quality\":\"good\"}\n",
        );
        match replay(&service(), log.as_bytes()) {
            Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_log() {
        let report = replay(&service(), "".as_bytes()).unwrap();
        assert_eq!(report.events, 0);
        assert!(report.as_of.is_none());
        assert!(report.learners.is_empty());
    }
}
