use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use recall_algo::{LastReview, MemoryState, ReviewEntry};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub learner_id: String,
    pub item_id: String,
}

impl ProgressKey {
    pub fn new(learner_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// A stored state plus the row version used for optimistic locking
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedState {
    pub state: MemoryState,
    pub last_review: LastReview,
    pub version: u64,
}

/// Persistence for memory states, one row per (learner, item).
///
/// Writers must pass the version they read; a row written by someone else in
/// between makes `compare_and_swap` fail with [`StoreError::Conflict`].
pub trait ProgressStore: Send + Sync {
    fn load(&self, key: &ProgressKey) -> Result<Option<VersionedState>, StoreError>;

    /// Store `state` and the review that produced it if the row is still at
    /// `expected` (`None` = row must not exist yet). Returns the new version.
    fn compare_and_swap(
        &self,
        key: &ProgressKey,
        expected: Option<u64>,
        state: MemoryState,
        reviewed: LastReview,
    ) -> Result<u64, StoreError>;

    /// All entries of one learner, ordered by item id.
    fn list_for_learner(&self, learner_id: &str) -> Result<Vec<ReviewEntry>, StoreError>;

    /// Every learner with at least one stored state, sorted.
    fn learner_ids(&self) -> Result<Vec<String>, StoreError>;
}

/// Process-wide in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    rows: RwLock<HashMap<ProgressKey, VersionedState>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self, key: &ProgressKey) -> Result<Option<VersionedState>, StoreError> {
        Ok(self.rows.read().get(key).cloned())
    }

    fn compare_and_swap(
        &self,
        key: &ProgressKey,
        expected: Option<u64>,
        state: MemoryState,
        reviewed: LastReview,
    ) -> Result<u64, StoreError> {
        let mut rows = self.rows.write();
        let found = rows.get(key).map(|row| row.version);
        if found != expected {
            return Err(StoreError::Conflict {
                learner_id: key.learner_id.clone(),
                item_id: key.item_id.clone(),
                expected,
                found,
            });
        }

        let version = found.map_or(1, |v| v + 1);
        rows.insert(
            key.clone(),
            VersionedState {
                state,
                last_review: reviewed,
                version,
            },
        );
        Ok(version)
    }

    fn list_for_learner(&self, learner_id: &str) -> Result<Vec<ReviewEntry>, StoreError> {
        let rows = self.rows.read();
        let mut entries: Vec<ReviewEntry> = rows
            .iter()
            .filter(|(key, _)| key.learner_id == learner_id)
            .map(|(key, row)| {
                ReviewEntry::new(key.item_id.clone(), row.state.clone())
                    .with_last_review(row.last_review)
            })
            .collect();
        entries.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        Ok(entries)
    }

    fn learner_ids(&self) -> Result<Vec<String>, StoreError> {
        let rows = self.rows.read();
        let ids: BTreeSet<&String> = rows.keys().map(|key| &key.learner_id).collect();
        Ok(ids.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn state() -> MemoryState {
        MemoryState::new(Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap())
    }

    fn reviewed() -> LastReview {
        LastReview {
            reviewed_at: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
            quality: 4.0,
        }
    }

    #[test]
    fn test_insert_then_update() {
        let store = InMemoryProgressStore::new();
        let key = ProgressKey::new("u1", "w1");
        assert!(store.load(&key).unwrap().is_none());

        assert_eq!(store.compare_and_swap(&key, None, state(), reviewed()).unwrap(), 1);
        assert_eq!(store.compare_and_swap(&key, Some(1), state(), reviewed()).unwrap(), 2);
        assert_eq!(store.load(&key).unwrap().unwrap().version, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let store = InMemoryProgressStore::new();
        let key = ProgressKey::new("u1", "w1");
        store.compare_and_swap(&key, None, state(), reviewed()).unwrap();

        let err = store.compare_and_swap(&key, None, state(), reviewed()).unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                learner_id: "u1".to_string(),
                item_id: "w1".to_string(),
                expected: None,
                found: Some(1),
            }
        );
        assert!(store.compare_and_swap(&key, Some(5), state(), reviewed()).is_err());
        assert_eq!(store.load(&key).unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_list_for_learner_is_scoped_and_sorted() {
        let store = InMemoryProgressStore::new();
        for (learner, item) in [("u1", "w3"), ("u2", "w1"), ("u1", "w1"), ("u1", "w2")] {
            store
                .compare_and_swap(&ProgressKey::new(learner, item), None, state(), reviewed())
                .unwrap();
        }
        let items: Vec<String> = store
            .list_for_learner("u1")
            .unwrap()
            .into_iter()
            .map(|e| e.item_id)
            .collect();
        assert_eq!(items, vec!["w1", "w2", "w3"]);
        let first = &store.list_for_learner("u2").unwrap()[0];
        assert_eq!(first.last_review, Some(reviewed()));
        assert_eq!(store.learner_ids().unwrap(), vec!["u1", "u2"]);
        assert!(store.list_for_learner("nobody").unwrap().is_empty());
    }
}
