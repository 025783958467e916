//! Timetable cell model.
//!
//! A timetable is a grid of cells addressed by (class, day, period).
//! Each cell is either empty, holds a pinned (fixed) lesson, or holds a
//! lesson placed by one of the generation phases.
//!
//! # Addressing
//! Days are 0-based indices into the weekly period layout. Periods are
//! 1-based, matching how schools number lessons; a block lesson always
//! starts on an odd period.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (day, period) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Weekday index (0-based).
    pub day: usize,
    /// Period number (1-based).
    pub period: usize,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub const fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }

    /// The slot one period later on the same day.
    #[inline]
    pub fn next(self) -> Self {
        Self::new(self.day, self.period + 1)
    }

    /// Whether a block lesson may start here (odd period).
    #[inline]
    pub fn is_block_start(self) -> bool {
        self.period % 2 == 1
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}p{}", self.day, self.period)
    }
}

/// Which phase put a lesson into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Pinned before search.
    Fixed,
    /// Placed by the co-teaching resolver.
    Constraint,
    /// Placed by the priority placement engine.
    Search,
    /// Emergency fill with a qualified teacher.
    Emergency,
    /// Emergency fill with any free teacher.
    EmergencyFallback,
}

impl SlotSource {
    /// Whether this lesson came from the emergency fill pass.
    pub fn is_emergency(self) -> bool {
        matches!(self, Self::Emergency | Self::EmergencyFallback)
    }
}

/// The lesson occupying one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Subject taught.
    pub subject_id: String,
    /// Teachers present (main teacher first for co-taught lessons).
    pub teachers: Vec<String>,
    /// Taught by more than one teacher.
    pub is_co_teaching: bool,
    /// Half of a two-period block lesson.
    pub is_block_period: bool,
    /// Period number of the other half of the block.
    pub block_partner: Option<usize>,
    /// Provenance tag.
    pub source: SlotSource,
    /// Designated main teacher of a constraint-driven co-taught lesson.
    pub main_teacher: Option<String>,
}

impl ScheduleSlot {
    /// Creates a single-teacher lesson.
    pub fn new(subject_id: impl Into<String>, teacher_id: impl Into<String>, source: SlotSource) -> Self {
        Self::with_teachers(subject_id, vec![teacher_id.into()], source)
    }

    /// Creates a lesson taught by the given teachers.
    ///
    /// `is_co_teaching` is derived from the teacher count.
    pub fn with_teachers(
        subject_id: impl Into<String>,
        teachers: Vec<String>,
        source: SlotSource,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            is_co_teaching: teachers.len() > 1,
            teachers,
            is_block_period: false,
            block_partner: None,
            source,
            main_teacher: None,
        }
    }

    /// Marks this lesson as one half of a block.
    pub fn as_block(mut self, partner_period: usize) -> Self {
        self.is_block_period = true;
        self.block_partner = Some(partner_period);
        self
    }

    /// Records the main teacher of a co-teaching pairing.
    pub fn with_main_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.main_teacher = Some(teacher_id.into());
        self
    }

    /// Whether the given teacher is part of this lesson.
    pub fn has_teacher(&self, teacher_id: &str) -> bool {
        self.teachers.iter().any(|t| t == teacher_id)
    }
}

/// A timetable cell.
///
/// Fixed lessons are kept apart from placed ones so that the engine can
/// never overwrite or undo them.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    /// Nothing scheduled.
    #[default]
    Empty,
    /// Pinned lesson; immutable once placed.
    Fixed(ScheduleSlot),
    /// Lesson placed by a generation phase.
    Placed(ScheduleSlot),
}

impl Cell {
    /// The occupying lesson, if any.
    pub fn slot(&self) -> Option<&ScheduleSlot> {
        match self {
            Self::Empty => None,
            Self::Fixed(s) | Self::Placed(s) => Some(s),
        }
    }

    /// Whether the cell is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether the cell holds a pinned lesson.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}
