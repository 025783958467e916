//! Built-in priority rules.
//!
//! # Score Convention
//! All rules return lower scores for tasks that should be placed first;
//! bonuses are negative.

use super::{PlacementTask, PriorityContext, PriorityRule, RuleScore};

/// Bonus for block subjects.
pub const BLOCK_BONUS: f64 = 1000.0;
/// Bonus for co-taught subjects.
pub const CO_TEACHING_BONUS: f64 = 800.0;
/// Scale of the slot scarcity term.
pub const SLOT_SCARCITY_SCALE: f64 = 50.0;
/// Weight per missing hour.
pub const HOURS_NEEDED_WEIGHT: f64 = 5.0;

/// Block subjects first.
///
/// Two-period sessions need paired free cells, which disappear quickly.
#[derive(Debug, Clone, Copy)]
pub struct BlockBonus;

impl PriorityRule for BlockBonus {
    fn name(&self) -> &'static str {
        "BLOCK"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        if task.is_block {
            -BLOCK_BONUS
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Block subjects first"
    }
}

/// Co-taught subjects first.
#[derive(Debug, Clone, Copy)]
pub struct CoTeachingBonus;

impl PriorityRule for CoTeachingBonus {
    fn name(&self) -> &'static str {
        "CO_TEACHING"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        if task.is_co_teaching {
            -CO_TEACHING_BONUS
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Co-taught subjects first"
    }
}

/// Declared subject priority.
#[derive(Debug, Clone, Copy)]
pub struct SubjectWeight;

impl PriorityRule for SubjectWeight {
    fn name(&self) -> &'static str {
        "SUBJECT_WEIGHT"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        -(task.subject_priority as f64)
    }

    fn description(&self) -> &'static str {
        "Declared subject priority"
    }
}

/// Precomputed difficulty.
///
/// See [`DifficultyWeights`](super::DifficultyWeights).
#[derive(Debug, Clone, Copy)]
pub struct Difficulty;

impl PriorityRule for Difficulty {
    fn name(&self) -> &'static str {
        "DIFFICULTY"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        -task.difficulty
    }

    fn description(&self) -> &'static str {
        "Most constrained first"
    }
}

/// Fewer open slots first.
#[derive(Debug, Clone, Copy)]
pub struct SlotScarcity;

impl PriorityRule for SlotScarcity {
    fn name(&self) -> &'static str {
        "SLOT_SCARCITY"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        -SLOT_SCARCITY_SCALE / (task.candidate_slots + 1) as f64
    }

    fn description(&self) -> &'static str {
        "Fewest open slots first"
    }
}

/// More missing hours first.
#[derive(Debug, Clone, Copy)]
pub struct HoursNeeded;

impl PriorityRule for HoursNeeded {
    fn name(&self) -> &'static str {
        "HOURS_NEEDED"
    }

    fn evaluate(&self, task: &PlacementTask, _context: &PriorityContext) -> RuleScore {
        -(task.hours_needed as f64) * HOURS_NEEDED_WEIGHT
    }

    fn description(&self) -> &'static str {
        "Most missing hours first"
    }
}

/// Earlier classes first (normalized to 0..1).
#[derive(Debug, Clone, Copy)]
pub struct ClassRank;

impl PriorityRule for ClassRank {
    fn name(&self) -> &'static str {
        "CLASS_RANK"
    }

    fn evaluate(&self, task: &PlacementTask, context: &PriorityContext) -> RuleScore {
        if context.class_count == 0 {
            return 0.0;
        }
        task.class_rank as f64 / context.class_count as f64
    }

    fn description(&self) -> &'static str {
        "Class order"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonuses() {
        let ctx = PriorityContext::default();
        let block = PlacementTask::new("1-1", "science").with_block(2);
        let plain = PlacementTask::new("1-1", "math");
        assert_eq!(BlockBonus.evaluate(&block, &ctx), -BLOCK_BONUS);
        assert_eq!(BlockBonus.evaluate(&plain, &ctx), 0.0);
        let co = PlacementTask::new("1-1", "english").with_co_teaching();
        assert_eq!(CoTeachingBonus.evaluate(&co, &ctx), -CO_TEACHING_BONUS);
    }

    #[test]
    fn test_class_rank_normalized() {
        let ctx = PriorityContext::default().with_class_count(4);
        let task = PlacementTask {
            class_rank: 2,
            ..PlacementTask::new("2-1", "math")
        };
        assert!((ClassRank.evaluate(&task, &ctx) - 0.5).abs() < 1e-10);
        assert_eq!(ClassRank.evaluate(&task, &PriorityContext::default()), 0.0);
    }

    #[test]
    fn test_hours_and_weight() {
        let ctx = PriorityContext::default();
        let task = PlacementTask::new("1-1", "math").with_hours(3, 5).with_subject_priority(4);
        assert_eq!(HoursNeeded.evaluate(&task, &ctx), -15.0);
        assert_eq!(SubjectWeight.evaluate(&task, &ctx), -4.0);
        assert_eq!(SlotScarcity.evaluate(&task, &ctx), -50.0);
    }
}
