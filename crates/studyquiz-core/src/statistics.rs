//! Aggregate scoring for a finished quiz.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Rounded percentage of `correct` out of `total`, half rounding up.
///
/// An empty quiz scores 0.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // round(100c/n) == floor((200c + n) / 2n) for non-negative values
    ((200 * correct + total) / (2 * total)) as u32
}

/// Performance band for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Outstanding,
    Great,
    Good,
    KeepPracticing,
}

impl PerformanceRating {
    /// Inclusive thresholds, checked from the top.
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => PerformanceRating::Outstanding,
            70.. => PerformanceRating::Great,
            50.. => PerformanceRating::Good,
            _ => PerformanceRating::KeepPracticing,
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceRating::Outstanding => write!(f, "Outstanding"),
            PerformanceRating::Great => write!(f, "Great"),
            PerformanceRating::Good => write!(f, "Good"),
            PerformanceRating::KeepPracticing => write!(f, "Keep Practicing"),
        }
    }
}

/// Aggregate statistics over a session's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub percentage: u32,
    pub rating: PerformanceRating,
}

/// Compute statistics from per-index correctness for a set of `total`
/// questions. Indices at or beyond `total` are ignored.
pub fn compute_stats(results: &BTreeMap<usize, bool>, total: usize) -> SessionStats {
    let answered = results.range(..total).count();
    let correct = results.range(..total).filter(|(_, ok)| **ok).count();
    let percentage = percentage(correct, total);

    SessionStats {
        total,
        correct,
        incorrect: answered - correct,
        unanswered: total - answered,
        percentage,
        rating: PerformanceRating::from_percentage(percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(pairs: &[(usize, bool)]) -> BTreeMap<usize, bool> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn percentage_empty_quiz() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn rating_thresholds_inclusive() {
        assert_eq!(PerformanceRating::from_percentage(100), PerformanceRating::Outstanding);
        assert_eq!(PerformanceRating::from_percentage(90), PerformanceRating::Outstanding);
        assert_eq!(PerformanceRating::from_percentage(89), PerformanceRating::Great);
        assert_eq!(PerformanceRating::from_percentage(70), PerformanceRating::Great);
        assert_eq!(PerformanceRating::from_percentage(69), PerformanceRating::Good);
        assert_eq!(PerformanceRating::from_percentage(50), PerformanceRating::Good);
        assert_eq!(PerformanceRating::from_percentage(49), PerformanceRating::KeepPracticing);
        assert_eq!(PerformanceRating::from_percentage(0), PerformanceRating::KeepPracticing);
        assert_eq!(PerformanceRating::KeepPracticing.to_string(), "Keep Practicing");
    }

    #[test]
    fn counts_add_up() {
        let stats = compute_stats(&results(&[(0, true), (1, false), (2, true)]), 4);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.unanswered, 1);
        assert_eq!(stats.correct + stats.incorrect + stats.unanswered, stats.total);
        assert_eq!(stats.percentage, 50);
        assert_eq!(stats.rating, PerformanceRating::Good);
    }

    #[test]
    fn empty_quiz_stats() {
        let stats = compute_stats(&BTreeMap::new(), 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percentage, 0);
        assert_eq!(stats.unanswered, 0);
        assert_eq!(stats.rating, PerformanceRating::KeepPracticing);
    }
}
