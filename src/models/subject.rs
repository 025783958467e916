//! Subject model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category name exempt from per-class hour caps by default.
pub const CREATIVE_ACTIVITY: &str = "creative activity";

/// A subject taught to classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Weekly hours per class.
    pub weekly_hours: u32,
    /// Weekly hours per grade. When non-empty, only listed grades take
    /// the subject.
    pub grade_hours: BTreeMap<u8, u32>,
    /// Needs two consecutive periods per session.
    pub is_block: bool,
    /// Always taught by more than one teacher.
    pub requires_co_teaching: bool,
    /// Maximum classes taking this subject at the same time (shared room).
    pub max_concurrent_classes: Option<u32>,
    /// Category (e.g., "creative activity").
    pub category: String,
    /// Scheduling weight (higher = placed earlier).
    pub priority: i32,
}

impl Subject {
    /// Creates a subject with the given weekly hours.
    pub fn new(id: impl Into<String>, weekly_hours: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekly_hours,
            grade_hours: BTreeMap::new(),
            is_block: false,
            requires_co_teaching: false,
            max_concurrent_classes: None,
            category: String::new(),
            priority: 0,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets weekly hours for one grade.
    pub fn with_grade_hours(mut self, grade: u8, hours: u32) -> Self {
        self.grade_hours.insert(grade, hours);
        self
    }

    /// Marks as a two-period block subject.
    pub fn block(mut self) -> Self {
        self.is_block = true;
        self
    }

    /// Marks as always co-taught.
    pub fn co_taught(mut self) -> Self {
        self.requires_co_teaching = true;
        self
    }

    /// Limits concurrent classes (shared space).
    pub fn with_space_limit(mut self, max_classes: u32) -> Self {
        self.max_concurrent_classes = Some(max_classes);
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the scheduling weight.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Weekly hours a class of the given grade needs.
    pub fn hours_for_grade(&self, grade: u8) -> u32 {
        if self.grade_hours.is_empty() {
            self.weekly_hours
        } else {
            self.grade_hours.get(&grade).copied().unwrap_or(0)
        }
    }
}
