//! Quality Mapping
//!
//! Converts raw answer outcomes into the 0-5 scale consumed by the scheduler.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::QualityScore;

/// Answers slower than this lose a full point
const SLOW_RESPONSE_MS: u64 = 30_000;

/// Answers slower than this lose half a point
const HESITANT_RESPONSE_MS: u64 = 15_000;

/// Lowest score a correct answer can receive
const MIN_CORRECT_QUALITY: f64 = 3.0;

/// Self-reported confidence after answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown confidence level: {0}")]
pub struct ParseConfidenceError(pub String);

impl FromStr for Confidence {
    type Err = ParseConfidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(ParseConfidenceError(s.to_string())),
        }
    }
}

/// Map a review outcome to a quality score.
///
/// Incorrect answers land in 0-2 depending on hint usage. Correct answers
/// start at 5, lose one point per hint and up to one point for slowness,
/// and never drop below 3.
pub fn quality_from_outcome(
    correct: bool,
    hints_used: u32,
    response_time_ms: Option<u64>,
) -> QualityScore {
    if !correct {
        let raw = if hints_used > 2 {
            0.0
        } else if hints_used > 0 {
            1.0
        } else {
            2.0
        };
        return QualityScore::from_raw(raw);
    }

    let mut quality = 5.0 - hints_used as f64;

    if let Some(elapsed) = response_time_ms {
        if elapsed > SLOW_RESPONSE_MS {
            quality -= 1.0;
        } else if elapsed > HESITANT_RESPONSE_MS {
            quality -= 0.5;
        }
    }

    QualityScore::from_raw(quality.round().max(MIN_CORRECT_QUALITY))
}

/// Map correctness plus self-reported confidence to a quality score.
pub fn quality_from_confidence(correct: bool, confidence: Confidence) -> QualityScore {
    let raw = match (correct, confidence) {
        (false, Confidence::Low) => 0.0,
        (false, Confidence::Medium) => 1.0,
        (false, Confidence::High) => 2.0,
        (true, Confidence::Low) => 3.0,
        (true, Confidence::Medium) => 4.0,
        (true, Confidence::High) => 5.0,
    };
    QualityScore::from_raw(raw)
}

/// Map an accuracy ratio (e.g. over a sentence-building exercise) to a quality score.
pub fn quality_from_accuracy(accuracy: f64) -> QualityScore {
    let raw = if accuracy >= 0.9 {
        5.0
    } else if accuracy >= 0.8 {
        4.0
    } else if accuracy >= 0.6 {
        3.0
    } else if accuracy >= 0.4 {
        2.0
    } else if accuracy >= 0.2 {
        1.0
    } else {
        0.0
    };
    QualityScore::from_raw(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(score: QualityScore) -> u8 {
        score.value()
    }

    #[test]
    fn test_incorrect_answers() {
        assert_eq!(q(quality_from_outcome(false, 0, None)), 2);
        assert_eq!(q(quality_from_outcome(false, 1, None)), 1);
        assert_eq!(q(quality_from_outcome(false, 2, Some(1_000))), 1);
        assert_eq!(q(quality_from_outcome(false, 3, None)), 0);
    }

    #[test]
    fn test_correct_answers() {
        assert_eq!(q(quality_from_outcome(true, 0, None)), 5);
        assert_eq!(q(quality_from_outcome(true, 0, Some(3_000))), 5);
        assert_eq!(q(quality_from_outcome(true, 1, None)), 4);
        assert_eq!(q(quality_from_outcome(true, 0, Some(45_000))), 4);
        // 5 - 0.5 = 4.5 rounds up
        assert_eq!(q(quality_from_outcome(true, 0, Some(20_000))), 5);
        assert_eq!(q(quality_from_outcome(true, 1, Some(20_000))), 4);
    }

    #[test]
    fn test_correct_answers_never_fail() {
        // 5 - 2 - 0.5 = 2.5, floored at 3
        assert_eq!(q(quality_from_outcome(true, 2, Some(20_000))), 3);
        assert_eq!(q(quality_from_outcome(true, 10, Some(60_000))), 3);
        assert!(quality_from_outcome(true, 7, None).is_pass());
    }

    #[test]
    fn test_time_thresholds_are_exclusive() {
        assert_eq!(q(quality_from_outcome(true, 1, Some(15_000))), 4);
        assert_eq!(q(quality_from_outcome(true, 1, Some(30_000))), 4);
        assert_eq!(q(quality_from_outcome(true, 1, Some(30_001))), 3);
    }

    #[test]
    fn test_confidence() {
        assert_eq!(q(quality_from_confidence(false, Confidence::Low)), 0);
        assert_eq!(q(quality_from_confidence(false, Confidence::default())), 1);
        assert_eq!(q(quality_from_confidence(true, Confidence::Low)), 3);
        assert_eq!(q(quality_from_confidence(true, Confidence::High)), 5);
        assert_eq!("HIGH".parse::<Confidence>(), Ok(Confidence::High));
        assert_eq!(
            "unsure".parse::<Confidence>(),
            Err(ParseConfidenceError("unsure".to_string()))
        );
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(q(quality_from_accuracy(1.0)), 5);
        assert_eq!(q(quality_from_accuracy(0.85)), 4);
        assert_eq!(q(quality_from_accuracy(0.6)), 3);
        assert_eq!(q(quality_from_accuracy(0.45)), 2);
        assert_eq!(q(quality_from_accuracy(0.2)), 1);
        assert_eq!(q(quality_from_accuracy(0.05)), 0);
        assert_eq!(q(quality_from_accuracy(f64::NAN)), 0);
    }
}
