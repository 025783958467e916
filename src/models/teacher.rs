//! Teacher model.
//!
//! Teachers are the resources lessons consume. Besides qualification and
//! load limits, a teacher carries availability (blocked slots and an
//! optional whitelist) and pairing rules (mutual exclusion, sequential
//! grade teaching, parallel teaching).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::TimeSlot;

/// A teacher that can be assigned to lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Subjects this teacher is qualified to teach.
    pub subjects: BTreeSet<String>,
    /// Weekly lesson limit.
    pub max_hours_per_week: u32,
    /// Weekly hours allocated per class (class id → hours).
    ///
    /// Doubles as the per-class cap and as the allocation that drives
    /// co-teaching targets and preferred teacher choice.
    pub class_hours: BTreeMap<String, u32>,
    /// Weekly hour caps per grade.
    pub grade_hours: BTreeMap<u8, u32>,
    /// Slots when the teacher cannot teach.
    pub unavailable: BTreeSet<TimeSlot>,
    /// Declared available slots. `None` = available whenever not blocked.
    pub available_times: Option<BTreeSet<TimeSlot>>,
    /// Teachers that may never teach at the same time as this one.
    pub mutually_exclusive: BTreeSet<String>,
    /// Same-grade lessons on a day must be contiguous.
    pub sequential_grade_teaching: bool,
    /// May teach several classes at once when they share a subject.
    pub allow_parallel: bool,
}

impl Teacher {
    /// Creates a teacher with a 25-hour weekly limit.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subjects: BTreeSet::new(),
            max_hours_per_week: 25,
            class_hours: BTreeMap::new(),
            grade_hours: BTreeMap::new(),
            unavailable: BTreeSet::new(),
            available_times: None,
            mutually_exclusive: BTreeSet::new(),
            sequential_grade_teaching: false,
            allow_parallel: false,
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a qualified subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.insert(subject_id.into());
        self
    }

    /// Sets the weekly limit.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours_per_week = hours;
        self
    }

    /// Allocates weekly hours in a class.
    pub fn with_class_hours(mut self, class_id: impl Into<String>, hours: u32) -> Self {
        self.class_hours.insert(class_id.into(), hours);
        self
    }

    /// Caps weekly hours in a grade.
    pub fn with_grade_hours(mut self, grade: u8, hours: u32) -> Self {
        self.grade_hours.insert(grade, hours);
        self
    }

    /// Blocks a slot.
    pub fn with_unavailable(mut self, day: usize, period: usize) -> Self {
        self.unavailable.insert(TimeSlot::new(day, period));
        self
    }

    /// Declares an available slot (turns on the whitelist).
    pub fn with_available(mut self, day: usize, period: usize) -> Self {
        self.available_times
            .get_or_insert_with(BTreeSet::new)
            .insert(TimeSlot::new(day, period));
        self
    }

    /// Declares a mutual exclusion with another teacher.
    pub fn with_exclusion(mut self, teacher_id: impl Into<String>) -> Self {
        self.mutually_exclusive.insert(teacher_id.into());
        self
    }

    /// Requires same-grade lessons on a day to be contiguous.
    pub fn with_sequential_grades(mut self) -> Self {
        self.sequential_grade_teaching = true;
        self
    }

    /// Allows combined lessons across classes.
    pub fn with_parallel(mut self) -> Self {
        self.allow_parallel = true;
        self
    }

    /// Whether the teacher is qualified for a subject.
    pub fn teaches(&self, subject_id: &str) -> bool {
        self.subjects.contains(subject_id)
    }

    /// Whether the teacher can teach at a slot.
    ///
    /// Blocked slots always win; a declared whitelist restricts the rest.
    pub fn is_available_at(&self, slot: TimeSlot) -> bool {
        if self.unavailable.contains(&slot) {
            return false;
        }
        match &self.available_times {
            None => true,
            Some(allowed) => allowed.contains(&slot),
        }
    }

    /// Whether the teacher declared this slot as available.
    pub fn declares_available(&self, slot: TimeSlot) -> bool {
        self.available_times
            .as_ref()
            .is_some_and(|allowed| allowed.contains(&slot))
    }

    /// Hours allocated in a class (0 if none).
    pub fn allocation(&self, class_id: &str) -> u32 {
        self.class_hours.get(class_id).copied().unwrap_or(0)
    }
}
