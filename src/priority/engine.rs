//! Rule engine for placement ordering.
//!
//! Composes priority rules with configurable evaluation modes and
//! tie-breaking.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, PlacementTask, PriorityContext, PriorityRule, RuleScore};

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    Sequential,
    /// Compute weighted sum of all rule scores.
    #[default]
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep input order.
    Stable,
    /// Deterministic by (class, subject).
    #[default]
    ByKey,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn PriorityRule>,
    weight: f64,
}

/// A composable rule engine for placement tasks.
///
/// # Example
/// ```
/// use u_timetable::priority::{PlacementTask, PriorityContext, PriorityEngine, rules};
///
/// let engine = PriorityEngine::new().with_rule(rules::HoursNeeded);
/// let tasks = vec![
///     PlacementTask::new("1-1", "math").with_hours(1, 4),
///     PlacementTask::new("1-1", "korean").with_hours(3, 4),
/// ];
/// let order = engine.sort_indices(&tasks, &PriorityContext::default());
/// assert_eq!(tasks[order[0]].subject_id, "korean");
/// ```
#[derive(Clone)]
pub struct PriorityEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl PriorityEngine {
    /// Creates an empty engine (weighted mode, key tie-break).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Weighted,
            tie_breaker: TieBreaker::ByKey,
            epsilon: 1e-9,
        }
    }

    /// The most-constrained-first engine used by the placement search.
    pub fn most_constrained_first() -> Self {
        Self::new()
            .with_rule(rules::BlockBonus)
            .with_rule(rules::CoTeachingBonus)
            .with_rule(rules::SubjectWeight)
            .with_rule(rules::Difficulty)
            .with_rule(rules::SlotScarcity)
            .with_rule(rules::HoursNeeded)
            .with_rule(rules::ClassRank)
    }

    /// Adds a rule (weight 1.0).
    pub fn with_rule<R: PriorityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: PriorityRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: PriorityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sorts tasks by priority (highest priority first).
    ///
    /// Returns indices into the task slice.
    pub fn sort_indices(&self, tasks: &[PlacementTask], context: &PriorityContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        match self.mode {
            EvaluationMode::Sequential => {
                indices.sort_by(|&a, &b| self.compare_sequential(&tasks[a], &tasks[b], context));
            }
            EvaluationMode::Weighted => {
                let scores: Vec<f64> = tasks.iter().map(|t| self.score(t, context)).collect();
                indices.sort_by(|&a, &b| {
                    let by_score = if (scores[a] - scores[b]).abs() > self.epsilon {
                        scores[a].total_cmp(&scores[b])
                    } else {
                        Ordering::Equal
                    };
                    by_score.then_with(|| self.break_tie(&tasks[a], &tasks[b]))
                });
            }
        }
        indices
    }

    /// Returns the index of the highest-priority task.
    pub fn select_best(&self, tasks: &[PlacementTask], context: &PriorityContext) -> Option<usize> {
        self.sort_indices(tasks, context).first().copied()
    }

    /// Weighted score of a task (lower = earlier).
    pub fn score(&self, task: &PlacementTask, context: &PriorityContext) -> RuleScore {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(task, context) * wr.weight)
            .sum()
    }

    fn compare_sequential(
        &self,
        a: &PlacementTask,
        b: &PlacementTask,
        context: &PriorityContext,
    ) -> Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);
            if (score_a - score_b).abs() > self.epsilon {
                return score_a.total_cmp(&score_b);
            }
        }
        self.break_tie(a, b)
    }

    fn break_tie(&self, a: &PlacementTask, b: &PlacementTask) -> Ordering {
        match self.tie_breaker {
            TieBreaker::Stable => Ordering::Equal,
            TieBreaker::ByKey => a.key().cmp(&b.key()),
        }
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::most_constrained_first()
    }
}

impl std::fmt::Debug for PriorityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PriorityContext {
        PriorityContext::at_iteration(0).with_class_count(3)
    }

    #[test]
    fn test_block_and_co_teaching_first() {
        let tasks = vec![
            PlacementTask::new("1-1", "math").with_hours(5, 5).with_subject_priority(3),
            PlacementTask::new("1-1", "science").with_hours(2, 4).with_block(2),
            PlacementTask::new("1-2", "english").with_hours(3, 3).with_co_teaching(),
        ];
        let engine = PriorityEngine::most_constrained_first();
        let order = engine.sort_indices(&tasks, &ctx());
        assert_eq!(tasks[order[0]].subject_id, "science");
        assert_eq!(tasks[order[1]].subject_id, "english");
        assert_eq!(tasks[order[2]].subject_id, "math");
    }

    #[test]
    fn test_scarce_slots_first() {
        let tasks = vec![
            PlacementTask::new("1-1", "art").with_hours(1, 1).with_candidates(20),
            PlacementTask::new("1-2", "art").with_hours(1, 1).with_candidates(1),
        ];
        let engine = PriorityEngine::new().with_rule(rules::SlotScarcity);
        assert_eq!(engine.select_best(&tasks, &ctx()), Some(1));
    }

    #[test]
    fn test_sequential_with_tie_breaker() {
        let tasks = vec![
            PlacementTask::new("1-1", "a").with_hours(2, 2).with_candidates(5),
            PlacementTask::new("1-1", "b").with_hours(2, 2).with_candidates(1),
        ];
        let engine = PriorityEngine::new()
            .with_mode(EvaluationMode::Sequential)
            .with_rule(rules::HoursNeeded)
            .with_tie_breaker(rules::SlotScarcity);
        assert_eq!(engine.select_best(&tasks, &ctx()), Some(1));
    }

    #[test]
    fn test_key_tie_breaker() {
        let tasks = vec![
            PlacementTask::new("1-2", "math"),
            PlacementTask::new("1-1", "math"),
        ];
        let engine = PriorityEngine::new().with_rule(rules::HoursNeeded);
        assert_eq!(engine.sort_indices(&tasks, &ctx()), vec![1, 0]);

        let stable = engine.with_final_tie_breaker(TieBreaker::Stable);
        assert_eq!(stable.sort_indices(&tasks, &ctx()), vec![0, 1]);
    }

    #[test]
    fn test_empty_tasks() {
        let engine = PriorityEngine::default();
        assert!(engine.sort_indices(&[], &ctx()).is_empty());
        assert!(engine.select_best(&[], &ctx()).is_none());
    }

    #[test]
    fn test_debug_lists_rules() {
        let engine = PriorityEngine::new().with_weighted_rule(rules::Difficulty, 0.5);
        let text = format!("{engine:?}");
        assert!(text.contains("DIFFICULTY(w=0.5)"));
    }
}
