//! Reversible placement log.
//!
//! Every lesson the search commits is recorded as a [`Placement`]
//! command that knows how to apply and revert itself against the schedule
//! and tracker. Backtracking removes an entry from the log and reverts
//! it; nothing else ever edits placed cells.

use crate::catalog::Catalog;
use crate::checker::Tier;
use crate::error::CellError;
use crate::models::{Schedule, ScheduleSlot, SlotSource, TeacherHoursTracker, TimeSlot};

/// One committed lesson (one or two periods).
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Class.
    pub class_id: String,
    /// Subject.
    pub subject_id: String,
    /// First period.
    pub slot: TimeSlot,
    /// Periods covered (2 for a block).
    pub span: usize,
    /// Teachers, main teacher first.
    pub teachers: Vec<String>,
    /// Designated main teacher of a co-teaching pairing.
    pub main_teacher: Option<String>,
    /// Provenance tag written into the cells.
    pub source: SlotSource,
    /// Ranking score of the slot when it was accepted.
    pub score: f64,
    /// Strictness the lesson was accepted at.
    pub tier: Tier,
}

impl Placement {
    /// Creates a single-period placement from the search.
    pub fn new(
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
        slot: TimeSlot,
        teachers: Vec<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            slot,
            span: 1,
            teachers,
            main_teacher: None,
            source: SlotSource::Search,
            score: 0.0,
            tier: Tier::Low,
        }
    }

    /// Sets the number of periods covered.
    pub fn spanning(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    /// Sets the provenance tag.
    pub fn with_source(mut self, source: SlotSource) -> Self {
        self.source = source;
        self
    }

    /// Records the main teacher of a co-teaching pairing.
    pub fn with_main_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.main_teacher = Some(teacher_id.into());
        self
    }

    /// Sets the acceptance score and tier.
    pub fn accepted(mut self, score: f64, tier: Tier) -> Self {
        self.score = score;
        self.tier = tier;
        self
    }

    /// Slots covered.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..self.span).map(move |i| TimeSlot::new(self.slot.day, self.slot.period + i))
    }

    fn lesson_at(&self, slot: TimeSlot) -> ScheduleSlot {
        let mut lesson = ScheduleSlot::with_teachers(
            self.subject_id.clone(),
            self.teachers.clone(),
            self.source,
        );
        if self.span == 2 {
            let partner = if slot == self.slot {
                self.slot.period + 1
            } else {
                self.slot.period
            };
            lesson = lesson.as_block(partner);
        }
        if let Some(main) = &self.main_teacher {
            lesson = lesson.with_main_teacher(main.clone());
        }
        lesson
    }

    /// Writes the lesson into the schedule and books teacher hours.
    ///
    /// All-or-nothing: if any cell is refused, cells already written are
    /// removed again.
    pub fn apply(
        &self,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        catalog: &Catalog,
    ) -> Result<(), CellError> {
        let mut written = Vec::with_capacity(self.span);
        for slot in self.slots() {
            if let Err(err) = schedule.place(&self.class_id, slot, self.lesson_at(slot)) {
                for done in written {
                    let _ = schedule.remove(&self.class_id, done);
                }
                return Err(err);
            }
            written.push(slot);
        }
        if !catalog.is_exempt(&self.subject_id) {
            let lesson = catalog.lesson_ref(&self.class_id, &self.subject_id);
            for teacher in &self.teachers {
                for _ in 0..self.span {
                    tracker.add(teacher, lesson);
                }
            }
        }
        Ok(())
    }

    /// Removes the lesson and releases teacher hours.
    pub fn revert(
        &self,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        catalog: &Catalog,
    ) -> Result<(), CellError> {
        for slot in self.slots() {
            schedule.remove(&self.class_id, slot)?;
        }
        if !catalog.is_exempt(&self.subject_id) {
            let lesson = catalog.lesson_ref(&self.class_id, &self.subject_id);
            for teacher in &self.teachers {
                for _ in 0..self.span {
                    tracker.remove(teacher, lesson);
                }
            }
        }
        Ok(())
    }
}

/// Ordered log of committed placements.
#[derive(Debug, Clone, Default)]
pub struct PlacementHistory {
    entries: Vec<Placement>,
}

impl PlacementHistory {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a committed placement.
    pub fn push(&mut self, placement: Placement) {
        self.entries.push(placement);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.entries.iter()
    }

    /// Index of the entry to undo: the lowest-scored among the last
    /// `window` commits, the most recent one on ties.
    pub fn pick_undo(&self, window: usize) -> Option<usize> {
        let start = self.entries.len().saturating_sub(window.max(1));
        self.entries[start..]
            .iter()
            .enumerate()
            .rev()
            .min_by(|(_, a), (_, b)| a.score.total_cmp(&b.score))
            .map(|(i, _)| start + i)
    }

    /// Removes an entry from the log.
    pub fn take(&mut self, index: usize) -> Option<Placement> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }
}
