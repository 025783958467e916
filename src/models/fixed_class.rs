//! Pinned lessons.

use serde::{Deserialize, Serialize};

use super::TimeSlot;

/// A lesson pinned to a cell before search. Never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedClass {
    /// Target class.
    pub class_id: String,
    /// Target slot.
    pub slot: TimeSlot,
    /// Subject taught.
    pub subject_id: String,
    /// Main teacher.
    pub teacher_id: String,
    /// Additional teachers.
    pub co_teachers: Vec<String>,
}

impl FixedClass {
    /// Creates a pinned lesson.
    pub fn new(
        class_id: impl Into<String>,
        day: usize,
        period: usize,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            slot: TimeSlot::new(day, period),
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
            co_teachers: Vec::new(),
        }
    }

    /// Adds a co-teacher.
    pub fn with_co_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.co_teachers.push(teacher_id.into());
        self
    }

    /// Main teacher followed by co-teachers.
    pub fn teachers(&self) -> Vec<String> {
        std::iter::once(self.teacher_id.clone())
            .chain(self.co_teachers.iter().cloned())
            .collect()
    }
}
