//! Soft-quality scoring.
//!
//! For every teacher and day the longest run of consecutive taught
//! periods is measured. A run longer than the configured cap costs
//! `(run - cap) * weight`; the score is `max(0, 100 - total)`.

use serde::{Deserialize, Serialize};

use crate::config::QualityConfig;
use crate::models::Schedule;

/// Maximum score.
pub const MAX_SCORE: f64 = 100.0;

/// One penalized teacher day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityPenalty {
    /// Teacher.
    pub teacher_id: String,
    /// Day index.
    pub day: usize,
    /// Longest consecutive run that day.
    pub run: usize,
    /// Penalty applied.
    pub penalty: f64,
}

/// Soft-quality result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// 0..=100, higher is better.
    pub score: f64,
    /// Sum of penalties.
    pub total_penalty: f64,
    /// Penalized teacher days.
    pub penalties: Vec<QualityPenalty>,
}

/// Computes [`QualityScore`]s.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    /// Creates a scorer.
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Scores a schedule.
    pub fn score(&self, schedule: &Schedule) -> QualityScore {
        let cap = self.config.consecutive_cap;
        let day_count = schedule
            .class_ids()
            .map(|c| schedule.day_count(c))
            .max()
            .unwrap_or(0);

        let mut penalties = Vec::new();
        for teacher_id in schedule.teacher_ids() {
            for day in 0..day_count {
                let mut periods: Vec<usize> = schedule
                    .teacher_day(teacher_id, day)
                    .into_iter()
                    .map(|(p, _)| p)
                    .collect();
                periods.dedup();
                let run = longest_run(&periods);
                if run > cap {
                    penalties.push(QualityPenalty {
                        teacher_id: teacher_id.to_string(),
                        day,
                        run,
                        penalty: (run - cap) as f64 * self.config.penalty_weight,
                    });
                }
            }
        }
        let total_penalty: f64 = penalties.iter().map(|p| p.penalty).sum();
        QualityScore {
            score: (MAX_SCORE - total_penalty).max(0.0),
            total_penalty,
            penalties,
        }
    }
}

/// Longest run of consecutive values in a sorted, deduplicated list.
pub(crate) fn longest_run(periods: &[usize]) -> usize {
    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<usize> = None;
    for &p in periods {
        current = match previous {
            Some(prev) if prev + 1 == p => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(p);
    }
    best
}
