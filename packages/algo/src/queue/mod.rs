//! Review Queue
//!
//! Picks what a learner should see next. Due items are ranked by
//! [`priority`]; ties fall back to the earlier due date, then the item id,
//! so the order is stable across calls.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sm2::{is_due, priority};
use crate::types::MemoryState;

/// When the item was last reviewed and how well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReview {
    pub reviewed_at: DateTime<Utc>,
    pub quality: f64,
}

/// A stored state together with the item it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub item_id: String,
    pub state: MemoryState,
    #[serde(default)]
    pub last_review: Option<LastReview>,
}

impl ReviewEntry {
    pub fn new(item_id: impl Into<String>, state: MemoryState) -> Self {
        Self {
            item_id: item_id.into(),
            state,
            last_review: None,
        }
    }

    pub fn with_last_review(mut self, last_review: LastReview) -> Self {
        self.last_review = Some(last_review);
        self
    }
}

/// What to present next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NextItem {
    /// A scheduled review that has come due
    Review {
        #[serde(rename = "itemId")]
        item_id: String,
        priority: f64,
    },
    /// An item the learner has never been scored on
    New {
        #[serde(rename = "itemId")]
        item_id: String,
    },
}

impl NextItem {
    pub fn item_id(&self) -> &str {
        match self {
            NextItem::Review { item_id, .. } | NextItem::New { item_id } => item_id,
        }
    }
}

/// Items for one study session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    /// Due reviews, most urgent first
    pub review: Vec<String>,
    /// New items filling the remaining slots
    pub fresh: Vec<String>,
    pub total: usize,
}

/// Due entries, most urgent first.
pub fn rank_due<'a>(entries: &'a [ReviewEntry], now: DateTime<Utc>) -> Vec<&'a ReviewEntry> {
    let mut due: Vec<(f64, &ReviewEntry)> = entries
        .iter()
        .filter(|e| is_due(&e.state, now))
        .map(|e| (priority(&e.state, now), e))
        .collect();

    due.sort_by(|(pa, a), (pb, b)| {
        pa.partial_cmp(pb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.state.next_due_at.cmp(&b.state.next_due_at))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    due.into_iter().map(|(_, e)| e).collect()
}

/// The most urgent due entry, or else the first new item.
pub fn pick_next(
    entries: &[ReviewEntry],
    new_items: &[String],
    now: DateTime<Utc>,
) -> Option<NextItem> {
    if let Some(top) = rank_due(entries, now).first() {
        return Some(NextItem::Review {
            item_id: top.item_id.clone(),
            priority: priority(&top.state, now),
        });
    }
    new_items
        .first()
        .map(|id| NextItem::New { item_id: id.clone() })
}

/// Build a session of at most `daily_limit` items, reviews first.
pub fn study_plan(
    entries: &[ReviewEntry],
    new_items: &[String],
    daily_limit: usize,
    now: DateTime<Utc>,
) -> StudyPlan {
    let review: Vec<String> = rank_due(entries, now)
        .into_iter()
        .take(daily_limit)
        .map(|e| e.item_id.clone())
        .collect();

    let remaining = daily_limit.saturating_sub(review.len());
    let fresh: Vec<String> = new_items.iter().take(remaining).cloned().collect();

    StudyPlan {
        total: review.len() + fresh.len(),
        review,
        fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, overdue_days: i64, easiness_factor: f64) -> ReviewEntry {
        ReviewEntry::new(
            id,
            MemoryState {
                repetitions: 2,
                interval_days: 6,
                easiness_factor,
                next_due_at: now() - Duration::days(overdue_days),
            },
        )
    }

    fn ids(entries: &[&ReviewEntry]) -> Vec<String> {
        entries.iter().map(|e| e.item_id.clone()).collect()
    }

    #[test]
    fn test_rank_due_orders_by_urgency() {
        let entries = vec![
            entry("recent", 1, 2.5),
            entry("future", -3, 1.3),
            entry("late", 10, 1.5),
            entry("hard", 1, 1.3),
        ];
        let ranked = rank_due(&entries, now());
        assert_eq!(ids(&ranked), vec!["late", "hard", "recent"]);
    }

    #[test]
    fn test_rank_due_tie_break_is_stable() {
        // equal priority and due date, so only the id decides
        let entries = vec![
            entry("c-item", 2, 2.5),
            entry("b-item", 2, 2.5),
            entry("a-item", 2, 2.5),
        ];
        let ranked = rank_due(&entries, now());
        assert_eq!(ids(&ranked), vec!["a-item", "b-item", "c-item"]);
    }

    #[test]
    fn test_pick_next_prefers_due_reviews() {
        let entries = vec![entry("word-1", 0, 2.5), entry("word-2", 4, 2.5)];
        let new_items = vec!["word-9".to_string()];
        let next = pick_next(&entries, &new_items, now()).unwrap();
        assert_eq!(next.item_id(), "word-2");
        assert!(matches!(next, NextItem::Review { .. }));
    }

    #[test]
    fn test_pick_next_falls_back_to_new() {
        let entries = vec![entry("word-1", -2, 2.5)];
        let new_items = vec!["word-9".to_string(), "word-10".to_string()];
        let next = pick_next(&entries, &new_items, now()).unwrap();
        assert_eq!(next, NextItem::New { item_id: "word-9".to_string() });
        assert!(pick_next(&entries, &[], now()).is_none());
    }

    #[test]
    fn test_study_plan_respects_limit() {
        let entries = vec![
            entry("r1", 1, 2.5),
            entry("r2", 2, 2.5),
            entry("r3", 3, 2.5),
            entry("later", -1, 2.5),
        ];
        let new_items: Vec<String> = (1..=5).map(|i| format!("n{i}")).collect();

        let plan = study_plan(&entries, &new_items, 5, now());
        assert_eq!(plan.review, vec!["r3", "r2", "r1"]);
        assert_eq!(plan.fresh, vec!["n1", "n2"]);
        assert_eq!(plan.total, 5);

        let tight = study_plan(&entries, &new_items, 2, now());
        assert_eq!(tight.review, vec!["r3", "r2"]);
        assert!(tight.fresh.is_empty());
        assert_eq!(tight.total, 2);
    }

    #[test]
    fn test_next_item_json() {
        let next = NextItem::Review {
            item_id: "w".to_string(),
            priority: -12.5,
        };
        let json = serde_json::to_value(&next).unwrap();
        assert_eq!(json["kind"], "review");
        assert_eq!(json["itemId"], "w");
    }
}
