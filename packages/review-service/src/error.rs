use recall_algo::ScheduleError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("version conflict on {learner_id}/{item_id}: expected {expected:?}, found {found:?}")]
    Conflict {
        learner_id: String,
        item_id: String,
        expected: Option<u64>,
        found: Option<u64>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("validation error: {0}")]
    Validation(#[from] ScheduleError),
    #[error("review for {learner_id}/{item_id} not recorded after {attempts} attempts, please retry")]
    Conflict {
        learner_id: String,
        item_id: String,
        attempts: u32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReviewError {
    /// Whether the caller may resubmit the same review.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReviewError::Conflict { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: {source}")]
    Review {
        line: usize,
        #[source]
        source: ReviewError,
    },
    #[error("summary failed: {0}")]
    Summary(#[from] ReviewError),
}
