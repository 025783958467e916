//! Placement priority rules and rule engine.
//!
//! Every outer search iteration turns the backlog of unfinished
//! (class, subject) pairs into [`PlacementTask`]s and orders them with a
//! [`PriorityEngine`]. The default engine implements a
//! most-constrained-variable-first heuristic: block and co-teaching
//! subjects carry large bonuses, followed by difficulty, slot scarcity,
//! declared subject priority, hours still needed and class order.
//!
//! # Usage
//!
//! ```
//! use u_timetable::priority::{PriorityEngine, rules};
//!
//! let engine = PriorityEngine::new()
//!     .with_rule(rules::BlockBonus)
//!     .with_tie_breaker(rules::HoursNeeded);
//! ```
//!
//! # References
//!
//! - Brélaz (1979), "New Methods to Color the Vertices of a Graph"
//!   (saturation / most-constrained-first ordering)
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"

mod context;
mod engine;
pub mod rules;

pub use context::PriorityContext;
pub use engine::{EvaluationMode, PriorityEngine, TieBreaker};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Score returned by a priority rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A rule that scores placement tasks.
///
/// # Score Convention
/// **Lower score = higher priority.** Bonuses are returned as negative
/// numbers.
pub trait PriorityRule: Send + Sync + Debug {
    /// Rule name.
    fn name(&self) -> &'static str;

    /// Scores a task.
    fn evaluate(&self, task: &PlacementTask, context: &PriorityContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// One unfinished (class, subject) pair, recomputed every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTask {
    /// Class to place into.
    pub class_id: String,
    /// Subject to place.
    pub subject_id: String,
    /// Teachers for the next session, main teacher first.
    pub teachers: Vec<String>,
    /// Periods the next session covers.
    pub span: usize,
    /// Declared subject priority.
    pub subject_priority: i32,
    /// Block subject.
    pub is_block: bool,
    /// Co-taught subject.
    pub is_co_teaching: bool,
    /// Teachers qualified for the subject.
    pub qualified_teachers: usize,
    /// Open start slots at the current strictness.
    pub candidate_slots: usize,
    /// Slots each teacher can teach in (declared or otherwise free).
    pub teacher_availability: Vec<usize>,
    /// Weekly hours of the subject in this class.
    pub weekly_hours: u32,
    /// Hours still missing.
    pub hours_needed: u32,
    /// Class position in id order.
    pub class_rank: usize,
    /// Weighted difficulty (see [`DifficultyWeights`]).
    pub difficulty: f64,
}

impl PlacementTask {
    /// Creates a task with no features set.
    pub fn new(class_id: impl Into<String>, subject_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            teachers: Vec::new(),
            span: 1,
            subject_priority: 0,
            is_block: false,
            is_co_teaching: false,
            qualified_teachers: 0,
            candidate_slots: 0,
            teacher_availability: Vec::new(),
            weekly_hours: 0,
            hours_needed: 0,
            class_rank: 0,
            difficulty: 0.0,
        }
    }

    /// Sets the teachers of the next session.
    pub fn with_teachers(mut self, teachers: Vec<String>) -> Self {
        self.teachers = teachers;
        self
    }

    /// Sets the hours still missing and the weekly requirement.
    pub fn with_hours(mut self, needed: u32, weekly: u32) -> Self {
        self.hours_needed = needed;
        self.weekly_hours = weekly;
        self
    }

    /// Marks the task as a block subject with the given session span.
    pub fn with_block(mut self, span: usize) -> Self {
        self.is_block = true;
        self.span = span;
        self
    }

    /// Marks the task as co-taught.
    pub fn with_co_teaching(mut self) -> Self {
        self.is_co_teaching = true;
        self
    }

    /// Sets the number of open start slots.
    pub fn with_candidates(mut self, count: usize) -> Self {
        self.candidate_slots = count;
        self
    }

    /// Sets the declared subject priority.
    pub fn with_subject_priority(mut self, priority: i32) -> Self {
        self.subject_priority = priority;
        self
    }

    /// Stable ordering key.
    pub fn key(&self) -> (&str, &str) {
        (&self.class_id, &self.subject_id)
    }
}

/// Weights of the difficulty sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyWeights {
    /// Added for block subjects.
    pub block: f64,
    /// Added for co-taught subjects.
    pub co_teaching: f64,
    /// Divided by the qualified teacher count.
    pub teacher_scarcity: f64,
    /// Divided by (open slots + 1).
    pub slot_scarcity: f64,
    /// Divided by each teacher's available slot count.
    pub availability: f64,
    /// Multiplied by the weekly hours.
    pub weekly_hours: f64,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            block: 30.0,
            co_teaching: 25.0,
            teacher_scarcity: 20.0,
            slot_scarcity: 15.0,
            availability: 10.0,
            weekly_hours: 2.0,
        }
    }
}

impl DifficultyWeights {
    /// Weighted difficulty of a task.
    pub fn difficulty(&self, task: &PlacementTask) -> f64 {
        let mut d = 0.0;
        if task.is_block {
            d += self.block;
        }
        if task.is_co_teaching {
            d += self.co_teaching;
        }
        d += self.teacher_scarcity / task.qualified_teachers.max(1) as f64;
        d += self.slot_scarcity / (task.candidate_slots + 1) as f64;
        d += task
            .teacher_availability
            .iter()
            .map(|&n| self.availability / n.max(1) as f64)
            .sum::<f64>();
        d += self.weekly_hours * task.weekly_hours as f64;
        d
    }
}
