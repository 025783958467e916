//! Post-generation reports.
//!
//! - [`ScheduleValidator`]: exhaustive rule re-check of a finished
//!   schedule, classified by severity.
//! - [`QualityScorer`]: 0-100 soft score from consecutive-teaching runs.
//! - [`ScheduleStats`] / [`FailureAnalysis`]: fill metrics and search
//!   diagnostics.
//!
//! Reports are advisory: they never mutate the schedule.

mod quality;
mod stats;
mod validator;

pub use quality::{QualityPenalty, QualityScore, QualityScorer};
pub use stats::{FailureAnalysis, FailureCounts, ScheduleStats};
pub use validator::{ReportSummary, ScheduleValidator, ValidationReport, ValidationStatus};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checker::{Rule, Tier};
use crate::models::TimeSlot;

/// A rule broken by a finished schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Broken rule.
    pub rule: Rule,
    /// Severity (CRITICAL rejects the schedule).
    pub severity: Tier,
    /// Class concerned.
    pub class_id: Option<String>,
    /// Teacher concerned.
    pub teacher_id: Option<String>,
    /// Slot concerned.
    pub slot: Option<TimeSlot>,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(rule: Rule, severity: Tier, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            class_id: None,
            teacher_id: None,
            slot: None,
            message: message.into(),
        }
    }

    /// Sets the class.
    pub fn in_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    /// Sets the teacher.
    pub fn for_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    /// Sets the slot.
    pub fn at(mut self, slot: TimeSlot) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule, self.message)
    }
}
