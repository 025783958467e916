//! Timetable grid (solution) model.
//!
//! A schedule maps class → day → period → [`Cell`]. Besides the grid it
//! keeps a teacher occupancy index so that "who is teaching at this slot"
//! questions do not scan every class.
//!
//! Mutation goes through [`Schedule::place`], [`Schedule::pin`] and
//! [`Schedule::remove`], which keep the index consistent and refuse to
//! overwrite occupied cells or remove fixed lessons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Cell, ScheduleSlot, TimeSlot};
use crate::error::CellError;
use crate::wire::WireSchedule;

/// A timetable under construction or finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireSchedule", try_from = "WireSchedule")]
pub struct Schedule {
    /// class id → days → periods (index 0 = period 1).
    grids: BTreeMap<String, Vec<Vec<Cell>>>,
    /// teacher id → slot → classes taught at that slot.
    occupancy: BTreeMap<String, BTreeMap<TimeSlot, Vec<String>>>,
}

impl Schedule {
    /// Creates an empty schedule with no classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class with the given weekly layout (periods per day).
    ///
    /// Re-adding an existing class resets its grid.
    pub fn add_class(&mut self, class_id: impl Into<String>, periods_per_day: &[usize]) {
        let class_id = class_id.into();
        if self.grids.contains_key(&class_id) {
            self.clear_class(&class_id);
        }
        let grid = periods_per_day
            .iter()
            .map(|&n| vec![Cell::Empty; n])
            .collect();
        self.grids.insert(class_id, grid);
    }

    /// Builder: adds a class and returns self.
    pub fn with_class(mut self, class_id: impl Into<String>, periods_per_day: &[usize]) -> Self {
        self.add_class(class_id, periods_per_day);
        self
    }

    fn clear_class(&mut self, class_id: &str) {
        for slots in self.occupancy.values_mut() {
            for classes in slots.values_mut() {
                classes.retain(|c| c != class_id);
            }
            slots.retain(|_, classes| !classes.is_empty());
        }
        self.occupancy.retain(|_, slots| !slots.is_empty());
    }

    /// Class ids in the grid (sorted).
    pub fn class_ids(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    /// Whether the class is part of the grid.
    pub fn contains_class(&self, class_id: &str) -> bool {
        self.grids.contains_key(class_id)
    }

    /// Number of days in a class's layout.
    pub fn day_count(&self, class_id: &str) -> usize {
        self.grids.get(class_id).map_or(0, Vec::len)
    }

    /// Number of periods on a day for a class (0 if unknown).
    pub fn periods_on(&self, class_id: &str, day: usize) -> usize {
        self.grids
            .get(class_id)
            .and_then(|days| days.get(day))
            .map_or(0, Vec::len)
    }

    /// Periods per day for a class.
    pub fn layout(&self, class_id: &str) -> Vec<usize> {
        self.grids
            .get(class_id)
            .map(|days| days.iter().map(Vec::len).collect())
            .unwrap_or_default()
    }

    /// Whether the slot lies inside the class's layout.
    pub fn in_bounds(&self, class_id: &str, slot: TimeSlot) -> bool {
        slot.period >= 1 && slot.period <= self.periods_on(class_id, slot.day)
    }

    /// The cell at a slot, or `None` if out of bounds.
    pub fn cell(&self, class_id: &str, slot: TimeSlot) -> Option<&Cell> {
        if slot.period == 0 {
            return None;
        }
        self.grids
            .get(class_id)?
            .get(slot.day)?
            .get(slot.period - 1)
    }

    /// The lesson at a slot, if any.
    pub fn lesson(&self, class_id: &str, slot: TimeSlot) -> Option<&ScheduleSlot> {
        self.cell(class_id, slot).and_then(Cell::slot)
    }

    /// Whether the slot is inside the layout and empty.
    pub fn is_free(&self, class_id: &str, slot: TimeSlot) -> bool {
        self.cell(class_id, slot).is_some_and(Cell::is_empty)
    }

    fn cell_mut(&mut self, class_id: &str, slot: TimeSlot) -> Result<&mut Cell, CellError> {
        let days = self
            .grids
            .get_mut(class_id)
            .ok_or_else(|| CellError::UnknownClass(class_id.to_string()))?;
        if slot.period == 0 {
            return Err(CellError::OutOfBounds {
                class_id: class_id.to_string(),
                slot,
            });
        }
        days.get_mut(slot.day)
            .and_then(|periods| periods.get_mut(slot.period - 1))
            .ok_or_else(|| CellError::OutOfBounds {
                class_id: class_id.to_string(),
                slot,
            })
    }

    /// Places a lesson in an empty cell.
    pub fn place(
        &mut self,
        class_id: &str,
        slot: TimeSlot,
        lesson: ScheduleSlot,
    ) -> Result<(), CellError> {
        self.insert(class_id, slot, lesson, false)
    }

    /// Pins a fixed lesson in an empty cell.
    pub fn pin(
        &mut self,
        class_id: &str,
        slot: TimeSlot,
        lesson: ScheduleSlot,
    ) -> Result<(), CellError> {
        self.insert(class_id, slot, lesson, true)
    }

    fn insert(
        &mut self,
        class_id: &str,
        slot: TimeSlot,
        lesson: ScheduleSlot,
        fixed: bool,
    ) -> Result<(), CellError> {
        let cell = self.cell_mut(class_id, slot)?;
        if !cell.is_empty() {
            return Err(CellError::Occupied {
                class_id: class_id.to_string(),
                slot,
            });
        }
        let teachers = lesson.teachers.clone();
        *cell = if fixed {
            Cell::Fixed(lesson)
        } else {
            Cell::Placed(lesson)
        };
        for teacher in teachers {
            self.occupancy
                .entry(teacher)
                .or_default()
                .entry(slot)
                .or_default()
                .push(class_id.to_string());
        }
        Ok(())
    }

    /// Removes a placed lesson and returns it.
    ///
    /// Fixed lessons cannot be removed.
    pub fn remove(&mut self, class_id: &str, slot: TimeSlot) -> Result<ScheduleSlot, CellError> {
        let cell = self.cell_mut(class_id, slot)?;
        let lesson = match std::mem::take(cell) {
            Cell::Placed(lesson) => lesson,
            Cell::Empty => {
                return Err(CellError::Empty {
                    class_id: class_id.to_string(),
                    slot,
                })
            }
            fixed @ Cell::Fixed(_) => {
                *cell = fixed;
                return Err(CellError::Immutable {
                    class_id: class_id.to_string(),
                    slot,
                });
            }
        };
        for teacher in &lesson.teachers {
            if let Some(slots) = self.occupancy.get_mut(teacher) {
                if let Some(classes) = slots.get_mut(&slot) {
                    if let Some(pos) = classes.iter().position(|c| c == class_id) {
                        classes.remove(pos);
                    }
                    if classes.is_empty() {
                        slots.remove(&slot);
                    }
                }
                if slots.is_empty() {
                    self.occupancy.remove(teacher);
                }
            }
        }
        Ok(lesson)
    }

    /// Classes the teacher is teaching at a slot.
    pub fn classes_of_teacher_at(&self, teacher_id: &str, slot: TimeSlot) -> &[String] {
        self.occupancy
            .get(teacher_id)
            .and_then(|slots| slots.get(&slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the teacher teaches anywhere at a slot.
    pub fn is_teacher_busy(&self, teacher_id: &str, slot: TimeSlot) -> bool {
        !self.classes_of_teacher_at(teacher_id, slot).is_empty()
    }

    /// Periods the teacher teaches on a day, with the class taught.
    ///
    /// Sorted by period; a period appears once per class.
    pub fn teacher_day(&self, teacher_id: &str, day: usize) -> Vec<(usize, &str)> {
        let Some(slots) = self.occupancy.get(teacher_id) else {
            return Vec::new();
        };
        slots
            .range(TimeSlot::new(day, 0)..TimeSlot::new(day + 1, 0))
            .flat_map(|(slot, classes)| classes.iter().map(move |c| (slot.period, c.as_str())))
            .collect()
    }

    /// Every slot the teacher occupies, with the classes taught there.
    pub fn teacher_slots(&self, teacher_id: &str) -> impl Iterator<Item = (TimeSlot, &[String])> {
        self.occupancy
            .get(teacher_id)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(s, c)| (*s, c.as_slice())))
    }

    /// Teachers with at least one lesson (sorted).
    pub fn teacher_ids(&self) -> impl Iterator<Item = &str> {
        self.occupancy.keys().map(String::as_str)
    }

    /// All cells of a class in (day, period) order.
    pub fn class_cells(&self, class_id: &str) -> impl Iterator<Item = (TimeSlot, &Cell)> {
        self.grids.get(class_id).into_iter().flat_map(|days| {
            days.iter().enumerate().flat_map(|(day, periods)| {
                periods
                    .iter()
                    .enumerate()
                    .map(move |(i, cell)| (TimeSlot::new(day, i + 1), cell))
            })
        })
    }

    /// All occupied cells as (class, slot, cell).
    pub fn occupied(&self) -> impl Iterator<Item = (&str, TimeSlot, &Cell)> {
        self.grids.keys().flat_map(move |class_id| {
            self.class_cells(class_id)
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(slot, cell)| (class_id.as_str(), slot, cell))
        })
    }

    /// Lessons of a subject in a class (periods, block halves count once each).
    pub fn subject_hours(&self, class_id: &str, subject_id: &str) -> u32 {
        self.class_cells(class_id)
            .filter(|(_, cell)| cell.slot().is_some_and(|s| s.subject_id == subject_id))
            .count() as u32
    }

    /// Classes taking a subject at a slot.
    pub fn classes_with_subject_at(&self, subject_id: &str, slot: TimeSlot) -> usize {
        self.grids
            .keys()
            .filter(|c| {
                self.lesson(c, slot)
                    .is_some_and(|s| s.subject_id == subject_id)
            })
            .count()
    }

    /// Occupied periods of a class on a day.
    pub fn class_day_load(&self, class_id: &str, day: usize) -> usize {
        self.grids
            .get(class_id)
            .and_then(|days| days.get(day))
            .map_or(0, |periods| periods.iter().filter(|c| !c.is_empty()).count())
    }

    /// Total cells across all classes.
    pub fn total_cells(&self) -> usize {
        self.grids
            .values()
            .map(|days| days.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Occupied cells across all classes.
    pub fn filled_cells(&self) -> usize {
        self.occupied().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotSource;

    fn lesson(subject: &str, teacher: &str) -> ScheduleSlot {
        ScheduleSlot::new(subject, teacher, SlotSource::Search)
    }

    fn sample() -> Schedule {
        Schedule::new()
            .with_class("1-1", &[4, 4, 3])
            .with_class("1-2", &[4, 4, 3])
    }

    #[test]
    fn test_layout() {
        let s = sample();
        assert_eq!(s.day_count("1-1"), 3);
        assert_eq!(s.periods_on("1-1", 2), 3);
        assert_eq!(s.periods_on("9-9", 0), 0);
        assert_eq!(s.total_cells(), 22);
        assert!(s.in_bounds("1-1", TimeSlot::new(2, 3)));
        assert!(!s.in_bounds("1-1", TimeSlot::new(2, 4)));
        assert!(!s.in_bounds("1-1", TimeSlot::new(0, 0)));
        assert_eq!(s.class_ids().collect::<Vec<_>>(), vec!["1-1", "1-2"]);
    }

    #[test]
    fn test_place_and_index() {
        let mut s = sample();
        s.place("1-1", TimeSlot::new(0, 1), lesson("math", "T1")).unwrap();

        assert!(!s.is_free("1-1", TimeSlot::new(0, 1)));
        assert!(s.is_teacher_busy("T1", TimeSlot::new(0, 1)));
        assert_eq!(s.classes_of_teacher_at("T1", TimeSlot::new(0, 1)), ["1-1"]);
        assert_eq!(s.subject_hours("1-1", "math"), 1);
        assert_eq!(s.filled_cells(), 1);
    }

    #[test]
    fn test_place_occupied_rejected() {
        let mut s = sample();
        let slot = TimeSlot::new(1, 2);
        s.place("1-1", slot, lesson("math", "T1")).unwrap();
        let err = s.place("1-1", slot, lesson("art", "T2")).unwrap_err();
        assert!(matches!(err, CellError::Occupied { .. }));
        // The index is untouched by the failed insert
        assert!(!s.is_teacher_busy("T2", slot));
    }

    #[test]
    fn test_out_of_bounds_and_unknown() {
        let mut s = sample();
        let err = s
            .place("1-1", TimeSlot::new(2, 4), lesson("math", "T1"))
            .unwrap_err();
        assert!(matches!(err, CellError::OutOfBounds { .. }));

        let err = s
            .place("7-7", TimeSlot::new(0, 1), lesson("math", "T1"))
            .unwrap_err();
        assert_eq!(err, CellError::UnknownClass("7-7".into()));
    }

    #[test]
    fn test_remove_placed() {
        let mut s = sample();
        let slot = TimeSlot::new(0, 3);
        s.place("1-2", slot, lesson("music", "T4")).unwrap();
        let removed = s.remove("1-2", slot).unwrap();
        assert_eq!(removed.subject_id, "music");
        assert!(s.is_free("1-2", slot));
        assert!(!s.is_teacher_busy("T4", slot));
        assert_eq!(s.teacher_ids().count(), 0);

        let err = s.remove("1-2", slot).unwrap_err();
        assert!(matches!(err, CellError::Empty { .. }));
    }

    #[test]
    fn test_fixed_is_immutable() {
        let mut s = sample();
        let slot = TimeSlot::new(0, 1);
        s.pin("1-1", slot, ScheduleSlot::new("assembly", "T1", SlotSource::Fixed))
            .unwrap();
        let err = s.remove("1-1", slot).unwrap_err();
        assert!(matches!(err, CellError::Immutable { .. }));
        assert!(s.cell("1-1", slot).unwrap().is_fixed());
        assert!(s.is_teacher_busy("T1", slot));
    }

    #[test]
    fn test_teacher_day() {
        let mut s = sample();
        s.place("1-1", TimeSlot::new(1, 3), lesson("math", "T1")).unwrap();
        s.place("1-2", TimeSlot::new(1, 1), lesson("math", "T1")).unwrap();
        s.place("1-2", TimeSlot::new(0, 1), lesson("math", "T1")).unwrap();

        assert_eq!(s.teacher_day("T1", 1), vec![(1, "1-2"), (3, "1-1")]);
        assert_eq!(s.teacher_day("T1", 0), vec![(1, "1-2")]);
        assert!(s.teacher_day("T1", 2).is_empty());
        assert_eq!(s.teacher_slots("T1").count(), 3);
    }

    #[test]
    fn test_co_taught_lesson_indexes_all_teachers() {
        let mut s = sample();
        let slot = TimeSlot::new(2, 2);
        let pair = ScheduleSlot::with_teachers(
            "english",
            vec!["T1".into(), "T2".into()],
            SlotSource::Constraint,
        );
        s.place("1-1", slot, pair).unwrap();
        assert!(s.is_teacher_busy("T1", slot));
        assert!(s.is_teacher_busy("T2", slot));
    }

    #[test]
    fn test_subject_counters() {
        let mut s = sample();
        let slot = TimeSlot::new(0, 2);
        s.place("1-1", slot, lesson("pe", "T5")).unwrap();
        s.place("1-2", slot, lesson("pe", "T6")).unwrap();
        assert_eq!(s.classes_with_subject_at("pe", slot), 2);
        assert_eq!(s.class_day_load("1-1", 0), 1);
        assert_eq!(s.class_day_load("1-1", 1), 0);
    }

    #[test]
    fn test_readd_class_clears_index() {
        let mut s = sample();
        s.place("1-1", TimeSlot::new(0, 1), lesson("math", "T1")).unwrap();
        s.add_class("1-1", &[2]);
        assert!(!s.is_teacher_busy("T1", TimeSlot::new(0, 1)));
        assert_eq!(s.layout("1-1"), vec![2]);
    }
}
