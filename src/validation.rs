//! Input validation for timetable problems.
//!
//! Checks structural integrity of the input bundle before generation.
//! Detects:
//! - Duplicate class, teacher and subject IDs
//! - Dangling references from teachers, pinned lessons, constraints and
//!   class overrides
//! - Slots outside the weekly layout
//! - Malformed constraints (empty co-teaching pools, self-exclusion)
//! - Subjects some class needs that nobody can teach
//!
//! All problems are collected; generation is not attempted if any exist.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::models::{Constraint, TimeSlot, TimetableData};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Reference to a class that doesn't exist.
    UnknownClass,
    /// Reference to a teacher that doesn't exist.
    UnknownTeacher,
    /// Reference to a subject that doesn't exist.
    UnknownSubject,
    /// A slot lies outside the weekly layout.
    SlotOutOfRange,
    /// The weekly layout has no days.
    EmptyLayout,
    /// A constraint is malformed.
    InvalidConstraint,
    /// A class needs a subject no teacher is qualified for.
    NoQualifiedTeacher,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input bundle of a timetable problem.
///
/// `subject_aliases` lists subject pairs that may stand in for each
/// other when looking for a qualified teacher.
///
/// Checks:
/// 1. The layout has at least one day
/// 2. No duplicate class, teacher or subject IDs
/// 3. Teacher subjects, class allocations and exclusions resolve
/// 4. Teacher blocked and declared slots fit the layout
/// 5. Pinned lessons reference existing entities and fit the class layout
/// 6. Constraint references resolve and constraints are well formed
/// 7. Class overrides reference existing classes
/// 8. Every subject an enabled class needs has a qualified teacher
///    (fixed-only subjects excepted)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(data: &TimetableData, subject_aliases: &[(String, String)]) -> ValidationResult {
    let mut errors = Vec::new();

    if data.base.periods_per_day.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyLayout,
            "Base layout has no days",
        ));
    }
    let day_count = data.base.periods_per_day.len();
    let max_period = data.base.periods_per_day.iter().copied().max().unwrap_or(0);
    let slot_fits = |slot: &TimeSlot| slot.day < day_count && slot.period >= 1 && slot.period <= max_period;

    let classes = data.resolved_classes();

    let mut class_ids = BTreeSet::new();
    for c in &classes {
        if !class_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {}", c.id),
            ));
        }
    }

    let mut subject_ids = BTreeSet::new();
    for s in &data.subjects {
        if !subject_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject ID: {}", s.id),
            ));
        }
    }

    let mut teacher_ids = BTreeSet::new();
    for t in &data.teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
    }

    // Teacher references
    for t in &data.teachers {
        for s in &t.subjects {
            if !subject_ids.contains(s.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Teacher '{}' is qualified for unknown subject '{}'", t.id, s),
                ));
            }
        }
        for c in t.class_hours.keys() {
            if !class_ids.contains(c.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownClass,
                    format!("Teacher '{}' has hours in unknown class '{}'", t.id, c),
                ));
            }
        }
        for other in &t.mutually_exclusive {
            if other == &t.id || !teacher_ids.contains(other.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!("Teacher '{}' excludes invalid teacher '{}'", t.id, other),
                ));
            }
        }
        let declared = t.available_times.iter().flatten();
        for slot in t.unavailable.iter().chain(declared) {
            if !slot_fits(slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutOfRange,
                    format!("Teacher '{}' lists slot {} outside the layout", t.id, slot),
                ));
            }
        }
    }

    // Pinned lessons
    for f in &data.fixed_classes {
        match classes.iter().find(|c| c.id == f.class_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClass,
                format!("Fixed lesson references unknown class '{}'", f.class_id),
            )),
            Some(class) => {
                let periods = class.periods_per_day.get(f.slot.day).copied().unwrap_or(0);
                if f.slot.period == 0 || f.slot.period > periods {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::SlotOutOfRange,
                        format!(
                            "Fixed lesson at {} is outside the layout of class '{}'",
                            f.slot, f.class_id
                        ),
                    ));
                }
            }
        }
        if !subject_ids.contains(f.subject_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSubject,
                format!("Fixed lesson references unknown subject '{}'", f.subject_id),
            ));
        }
        for teacher in f.teachers() {
            if !teacher_ids.contains(teacher.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!("Fixed lesson references unknown teacher '{teacher}'"),
                ));
            }
        }
    }

    // Constraints
    for (constraint, _) in data.constraints.iter() {
        for t in constraint.teacher_refs() {
            if !teacher_ids.contains(t) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!("Constraint references unknown teacher '{t}'"),
                ));
            }
        }
        for s in constraint.subject_refs() {
            if !subject_ids.contains(s) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSubject,
                    format!("Constraint references unknown subject '{s}'"),
                ));
            }
        }
        if let Some(problem) = constraint_problem(constraint) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidConstraint,
                problem,
            ));
        }
    }

    for class_id in data.class_hour_overrides.keys() {
        if !class_ids.contains(class_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClass,
                format!("Hour override references unknown class '{class_id}'"),
            ));
        }
    }

    // Coverage
    let fixed_only: BTreeSet<&str> = data
        .constraints
        .iter()
        .filter_map(|(c, _)| match c {
            Constraint::FixedOnly { subject } => Some(subject.as_str()),
            _ => None,
        })
        .collect();
    for subject in &data.subjects {
        if fixed_only.contains(subject.id.as_str()) {
            continue;
        }
        let needed = classes
            .iter()
            .any(|c| c.is_enabled() && subject.hours_for_grade(c.grade) > 0);
        if !needed {
            continue;
        }
        let covered = data.teachers.iter().any(|t| {
            t.teaches(&subject.id)
                || subject_aliases.iter().any(|(a, b)| {
                    (a == &subject.id && t.teaches(b)) || (b == &subject.id && t.teaches(a))
                })
        });
        if !covered {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoQualifiedTeacher,
                format!("No teacher is qualified for subject '{}'", subject.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn constraint_problem(constraint: &Constraint) -> Option<String> {
    match constraint {
        Constraint::CoTeaching {
            main_teacher,
            secondary_teachers,
            max_teachers_per_session,
            ..
        } => {
            if secondary_teachers.is_empty() {
                Some(format!("Co-teaching for '{main_teacher}' has no secondary teachers"))
            } else if *max_teachers_per_session < 2 {
                Some(format!(
                    "Co-teaching for '{main_teacher}' allows fewer than two teachers per session"
                ))
            } else if secondary_teachers.contains(main_teacher) {
                Some(format!("Co-teaching lists '{main_teacher}' as their own secondary"))
            } else {
                None
            }
        }
        Constraint::TeacherMutualExclusion {
            teacher_a,
            teacher_b,
        } if teacher_a == teacher_b => Some(format!("Teacher '{teacher_a}' excludes themself")),
        Constraint::TeacherSameClassDailyLimit { max_per_day: 0, .. } => {
            Some("Same-class daily limit of zero".to_string())
        }
        _ => None,
    }
}
