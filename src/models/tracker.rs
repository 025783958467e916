//! Teacher load bookkeeping.
//!
//! The tracker mirrors the schedule: every counted lesson a teacher is
//! part of adds one hour to their running total and to the per-subject,
//! per-class and per-grade breakdowns. Lessons in exempt categories are
//! not counted; deciding that is the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Schedule;

/// Running load of one teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherLoad {
    /// Counted lessons this week.
    pub current: u32,
    /// Weekly limit.
    pub max: u32,
    /// Lessons per subject.
    pub by_subject: BTreeMap<String, u32>,
    /// Lessons per class.
    pub by_class: BTreeMap<String, u32>,
    /// Lessons per grade.
    pub by_grade: BTreeMap<u8, u32>,
}

impl TeacherLoad {
    /// Hours left before the weekly limit.
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.current)
    }
}

/// Lesson identity used when booking hours.
#[derive(Debug, Clone, Copy)]
pub struct LessonRef<'a> {
    /// Class taught.
    pub class_id: &'a str,
    /// Grade of the class.
    pub grade: u8,
    /// Subject taught.
    pub subject_id: &'a str,
}

impl<'a> LessonRef<'a> {
    /// Creates a lesson reference.
    pub fn new(class_id: &'a str, grade: u8, subject_id: &'a str) -> Self {
        Self {
            class_id,
            grade,
            subject_id,
        }
    }
}

/// Per-teacher load tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherHoursTracker {
    loads: BTreeMap<String, TeacherLoad>,
}

fn bump<K: Ord>(map: &mut BTreeMap<K, u32>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}

fn drop_one<K: Ord>(map: &mut BTreeMap<K, u32>, key: &K) {
    if let Some(n) = map.get_mut(key) {
        *n = n.saturating_sub(1);
        if *n == 0 {
            map.remove(key);
        }
    }
}

impl TeacherHoursTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teacher with a weekly limit.
    pub fn register(&mut self, teacher_id: impl Into<String>, max: u32) {
        self.loads.entry(teacher_id.into()).or_default().max = max;
    }

    /// Books one hour.
    pub fn add(&mut self, teacher_id: &str, lesson: LessonRef<'_>) {
        let load = self.loads.entry(teacher_id.to_string()).or_default();
        load.current += 1;
        bump(&mut load.by_subject, lesson.subject_id.to_string());
        bump(&mut load.by_class, lesson.class_id.to_string());
        bump(&mut load.by_grade, lesson.grade);
    }

    /// Releases one hour.
    pub fn remove(&mut self, teacher_id: &str, lesson: LessonRef<'_>) {
        if let Some(load) = self.loads.get_mut(teacher_id) {
            load.current = load.current.saturating_sub(1);
            drop_one(&mut load.by_subject, &lesson.subject_id.to_string());
            drop_one(&mut load.by_class, &lesson.class_id.to_string());
            drop_one(&mut load.by_grade, &lesson.grade);
        }
    }

    /// Load of a teacher.
    pub fn load(&self, teacher_id: &str) -> Option<&TeacherLoad> {
        self.loads.get(teacher_id)
    }

    /// Counted lessons of a teacher.
    pub fn current(&self, teacher_id: &str) -> u32 {
        self.loads.get(teacher_id).map_or(0, |l| l.current)
    }

    /// Counted lessons of a teacher in a class.
    pub fn class_hours(&self, teacher_id: &str, class_id: &str) -> u32 {
        self.loads
            .get(teacher_id)
            .and_then(|l| l.by_class.get(class_id))
            .copied()
            .unwrap_or(0)
    }

    /// Counted lessons of a teacher in a grade.
    pub fn grade_hours(&self, teacher_id: &str, grade: u8) -> u32 {
        self.loads
            .get(teacher_id)
            .and_then(|l| l.by_grade.get(&grade))
            .copied()
            .unwrap_or(0)
    }

    /// Counted lessons of a teacher in a subject.
    pub fn subject_hours(&self, teacher_id: &str, subject_id: &str) -> u32 {
        self.loads
            .get(teacher_id)
            .and_then(|l| l.by_subject.get(subject_id))
            .copied()
            .unwrap_or(0)
    }

    /// All tracked teachers.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeacherLoad)> {
        self.loads.iter().map(|(id, load)| (id.as_str(), load))
    }

    /// Rebuilds the counts from a schedule.
    ///
    /// `counted` decides whether a subject's lessons count; `grade_of`
    /// resolves a class's grade. Weekly limits are copied from `self`.
    pub fn recount(
        &self,
        schedule: &Schedule,
        counted: impl Fn(&str) -> bool,
        grade_of: impl Fn(&str) -> u8,
    ) -> Self {
        let mut fresh = Self::new();
        for (id, load) in &self.loads {
            fresh.register(id.clone(), load.max);
        }
        for (class_id, _, cell) in schedule.occupied() {
            let Some(lesson) = cell.slot() else { continue };
            if !counted(&lesson.subject_id) {
                continue;
            }
            let grade = grade_of(class_id);
            for teacher in &lesson.teachers {
                fresh.add(teacher, LessonRef::new(class_id, grade, &lesson.subject_id));
            }
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduleSlot, SlotSource, TimeSlot};

    #[test]
    fn test_add_remove() {
        let mut t = TeacherHoursTracker::new();
        t.register("T1", 10);
        let lesson = LessonRef::new("1-1", 1, "math");
        t.add("T1", lesson);
        t.add("T1", lesson);
        t.add("T1", LessonRef::new("2-1", 2, "math"));

        assert_eq!(t.current("T1"), 3);
        assert_eq!(t.class_hours("T1", "1-1"), 2);
        assert_eq!(t.grade_hours("T1", 2), 1);
        assert_eq!(t.subject_hours("T1", "math"), 3);
        assert_eq!(t.load("T1").unwrap().remaining(), 7);

        t.remove("T1", lesson);
        assert_eq!(t.current("T1"), 2);
        assert_eq!(t.class_hours("T1", "1-1"), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut t = TeacherHoursTracker::new();
        t.remove("ghost", LessonRef::new("1-1", 1, "math"));
        assert_eq!(t.current("ghost"), 0);
    }

    #[test]
    fn test_breakdown_entries_dropped_at_zero() {
        let mut t = TeacherHoursTracker::new();
        let lesson = LessonRef::new("1-1", 1, "art");
        t.add("T1", lesson);
        t.remove("T1", lesson);
        let load = t.load("T1").unwrap();
        assert!(load.by_class.is_empty());
        assert!(load.by_subject.is_empty());
        assert!(load.by_grade.is_empty());
    }

    #[test]
    fn test_recount_matches_incremental() {
        let mut schedule = Schedule::new().with_class("1-1", &[3]);
        schedule
            .place("1-1", TimeSlot::new(0, 1), ScheduleSlot::new("math", "T1", SlotSource::Search))
            .unwrap();
        schedule
            .place("1-1", TimeSlot::new(0, 2), ScheduleSlot::new("club", "T1", SlotSource::Search))
            .unwrap();

        let mut incremental = TeacherHoursTracker::new();
        incremental.register("T1", 20);
        incremental.add("T1", LessonRef::new("1-1", 1, "math"));

        let rebuilt = incremental.recount(&schedule, |s| s != "club", |_| 1);
        assert_eq!(rebuilt, incremental);
    }
}
