//! Input bundle of a timetable problem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ClassUnit, Constraint, ConstraintSets, FixedClass, Subject, Teacher};

/// School-wide layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Periods on each weekday (index = day).
    pub periods_per_day: Vec<usize>,
    /// Number of classes per grade, used when no explicit classes are given.
    pub classes_per_grade: BTreeMap<u8, u32>,
}

impl BaseConfig {
    /// Creates a layout with the given periods per weekday.
    pub fn new(periods_per_day: Vec<usize>) -> Self {
        Self {
            periods_per_day,
            classes_per_grade: BTreeMap::new(),
        }
    }

    /// Sets the class count of a grade.
    pub fn with_grade(mut self, grade: u8, classes: u32) -> Self {
        self.classes_per_grade.insert(grade, classes);
        self
    }

    /// Classes derived from the grade counts, ids `"{grade}-{n}"`.
    pub fn derive_classes(&self) -> Vec<ClassUnit> {
        self.classes_per_grade
            .iter()
            .flat_map(|(&grade, &count)| {
                (1..=count).map(move |n| {
                    ClassUnit::new(format!("{grade}-{n}"), grade)
                        .with_name(format!("Grade {grade} Class {n}"))
                })
            })
            .collect()
    }

    /// Cells per class per week.
    pub fn weekly_periods(&self) -> usize {
        self.periods_per_day.iter().sum()
    }
}

/// Everything a generation call needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableData {
    /// School-wide layout.
    pub base: BaseConfig,
    /// Explicit classes. Empty = derive from `base`.
    pub classes: Vec<ClassUnit>,
    /// Subjects.
    pub subjects: Vec<Subject>,
    /// Teachers.
    pub teachers: Vec<Teacher>,
    /// Pinned lessons.
    pub fixed_classes: Vec<FixedClass>,
    /// Constraint sets.
    pub constraints: ConstraintSets,
    /// Weekly lesson caps per class, overriding the class's own cap.
    pub class_hour_overrides: BTreeMap<String, u32>,
}

impl TimetableData {
    /// Creates an empty bundle with the given layout.
    pub fn new(base: BaseConfig) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    /// Adds a class.
    pub fn with_class(mut self, class: ClassUnit) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a pinned lesson.
    pub fn with_fixed(mut self, fixed: FixedClass) -> Self {
        self.fixed_classes.push(fixed);
        self
    }

    /// Adds a mandatory constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.must.push(constraint);
        self
    }

    /// Adds an optional constraint.
    pub fn with_optional_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.optional.push(constraint);
        self
    }

    /// Overrides the weekly cap of a class.
    pub fn with_class_cap(mut self, class_id: impl Into<String>, cap: u32) -> Self {
        self.class_hour_overrides.insert(class_id.into(), cap);
        self
    }

    /// Classes with layout and cap overrides applied.
    ///
    /// Includes disabled classes; callers filter with
    /// [`ClassUnit::is_enabled`].
    pub fn resolved_classes(&self) -> Vec<ClassUnit> {
        let source = if self.classes.is_empty() {
            self.base.derive_classes()
        } else {
            self.classes.clone()
        };
        source
            .into_iter()
            .map(|mut class| {
                if class.periods_per_day.is_empty() {
                    class.periods_per_day = self.base.periods_per_day.clone();
                }
                if let Some(&cap) = self.class_hour_overrides.get(&class.id) {
                    class.weekly_hour_cap = Some(cap);
                }
                class
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_classes() {
        let base = BaseConfig::new(vec![6, 6, 6, 6, 5])
            .with_grade(1, 2)
            .with_grade(2, 1);
        let classes = base.derive_classes();
        let ids: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1-1", "1-2", "2-1"]);
        assert_eq!(classes[2].grade, 2);
        assert_eq!(base.weekly_periods(), 29);
    }

    #[test]
    fn test_resolved_classes_apply_layout_and_overrides() {
        let data = TimetableData::new(BaseConfig::new(vec![5, 5]))
            .with_class(ClassUnit::new("1-1", 1))
            .with_class(ClassUnit::new("1-2", 1).with_periods(vec![4, 4]))
            .with_class_cap("1-1", 0);

        let classes = data.resolved_classes();
        assert_eq!(classes[0].periods_per_day, vec![5, 5]);
        assert!(!classes[0].is_enabled());
        assert_eq!(classes[1].periods_per_day, vec![4, 4]);
        assert!(classes[1].is_enabled());
    }

    #[test]
    fn test_bundle_serde() {
        let data = TimetableData::new(BaseConfig::new(vec![4]).with_grade(1, 1))
            .with_subject(Subject::new("math", 2))
            .with_teacher(Teacher::new("T1").with_subject("math"))
            .with_constraint(Constraint::daily_once("math"));
        let json = serde_json::to_string(&data).unwrap();
        let back: TimetableData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
