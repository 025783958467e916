//! Fill metrics and search diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::QualityScore;
use crate::checker::{Rule, Tier};
use crate::models::Schedule;

/// Cell counts of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Cells across all enabled classes.
    pub total_slots: usize,
    /// Occupied cells.
    pub filled_slots: usize,
    /// Empty cells.
    pub empty_slots: usize,
    /// filled / total (1.0 for an empty grid).
    pub fill_rate: f64,
}

impl ScheduleStats {
    /// Computes the counts of a schedule.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let total = schedule.total_cells();
        let filled = schedule.filled_cells();
        Self {
            total_slots: total,
            filled_slots: filled,
            empty_slots: total - filled,
            fill_rate: if total == 0 {
                1.0
            } else {
                filled as f64 / total as f64
            },
        }
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.empty_slots == 0
    }
}

/// Failure tallies of one (class, subject) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounts {
    /// Iterations with no open slot at all.
    pub no_candidate: u32,
    /// Iterations where open slots existed but every one was denied.
    pub conflict: u32,
}

impl FailureCounts {
    /// Total failures.
    pub fn total(&self) -> u32 {
        self.no_candidate + self.conflict
    }
}

/// Search diagnostics of one attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureAnalysis {
    /// Placement attempts (task tries).
    pub attempts: u32,
    /// Committed placements.
    pub successes: u32,
    /// Undo operations.
    pub backtracks: u32,
    /// Outer iterations run.
    pub iterations: u32,
    /// Failures per "class/subject" key.
    pub failures: BTreeMap<String, FailureCounts>,
    /// Denials per rule, from candidate re-checks.
    pub denials: BTreeMap<Rule, u32>,
    /// Strictness when the search stopped.
    pub final_tier: Option<Tier>,
    /// Wall time of the attempt.
    pub elapsed: Duration,
    /// Soft-quality score of the result.
    pub quality: Option<QualityScore>,
}

impl FailureAnalysis {
    /// Creates an empty analysis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair with no open slot.
    pub fn record_no_candidate(&mut self, class_id: &str, subject_id: &str) {
        self.failures
            .entry(format!("{class_id}/{subject_id}"))
            .or_default()
            .no_candidate += 1;
    }

    /// Records a pair whose open slots were all denied.
    pub fn record_conflict(&mut self, class_id: &str, subject_id: &str) {
        self.failures
            .entry(format!("{class_id}/{subject_id}"))
            .or_default()
            .conflict += 1;
    }

    /// Records a denial.
    pub fn record_denial(&mut self, rule: Rule) {
        *self.denials.entry(rule).or_insert(0) += 1;
    }

    /// Total no-candidate failures.
    pub fn no_candidate_total(&self) -> u32 {
        self.failures.values().map(|c| c.no_candidate).sum()
    }

    /// Total conflict failures.
    pub fn conflict_total(&self) -> u32 {
        self.failures.values().map(|c| c.conflict).sum()
    }

    /// The `n` pairs with the most failures, most first.
    pub fn most_failed(&self, n: usize) -> Vec<(&str, FailureCounts)> {
        let mut pairs: Vec<(&str, FailureCounts)> = self
            .failures
            .iter()
            .map(|(k, c)| (k.as_str(), *c))
            .collect();
        pairs.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(b.0)));
        pairs.truncate(n);
        pairs
    }

    /// Share of attempts that committed.
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduleSlot, SlotSource, TimeSlot};

    #[test]
    fn test_stats() {
        let mut s = Schedule::new().with_class("1-1", &[2, 2]);
        assert_eq!(ScheduleStats::from_schedule(&s).fill_rate, 0.0);
        s.place("1-1", TimeSlot::new(0, 1), ScheduleSlot::new("math", "T1", SlotSource::Search))
            .unwrap();
        let stats = ScheduleStats::from_schedule(&s);
        assert_eq!(stats.total_slots, 4);
        assert_eq!(stats.filled_slots, 1);
        assert_eq!(stats.empty_slots, 3);
        assert!((stats.fill_rate - 0.25).abs() < 1e-10);
        assert!(!stats.is_full());
    }

    #[test]
    fn test_empty_grid_is_full() {
        let stats = ScheduleStats::from_schedule(&Schedule::new());
        assert!(stats.is_full());
        assert_eq!(stats.fill_rate, 1.0);
    }

    #[test]
    fn test_most_failed() {
        let mut a = FailureAnalysis::new();
        a.record_conflict("1-1", "math");
        a.record_no_candidate("1-2", "pe");
        a.record_no_candidate("1-2", "pe");
        a.record_conflict("1-2", "pe");
        a.record_denial(Rule::ConsecutiveLimit);
        a.record_denial(Rule::ConsecutiveLimit);

        let top = a.most_failed(1);
        assert_eq!(top[0].0, "1-2/pe");
        assert_eq!(top[0].1.total(), 3);
        assert_eq!(a.no_candidate_total(), 2);
        assert_eq!(a.conflict_total(), 2);
        assert_eq!(a.denials[&Rule::ConsecutiveLimit], 2);
        assert_eq!(a.success_rate(), 0.0);
    }
}
