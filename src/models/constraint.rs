//! Declarative timetable constraints.
//!
//! Constraints layer rules on top of entity attributes: co-teaching
//! pairings, block lessons, teacher exclusions, fixed-only subjects and
//! daily repetition limits. They come in two sets: `must` constraints are
//! enforced at their natural tier, `optional` ones are the first to be
//! relaxed.

use serde::{Deserialize, Serialize};

/// A timetable constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Every lesson of `main_teacher` in the targeted subject(s) is
    /// co-taught by members of `secondary_teachers`.
    CoTeaching {
        main_teacher: String,
        secondary_teachers: Vec<String>,
        /// Restrict to one subject. `None` = every subject of the main teacher.
        subject: Option<String>,
        /// Teachers per lesson including the main teacher.
        max_teachers_per_session: usize,
    },

    /// Lessons of `subject` take two consecutive periods.
    BlockPeriod { subject: String },

    /// The two teachers may never teach at the same (day, period).
    TeacherMutualExclusion { teacher_a: String, teacher_b: String },

    /// `subject` may only be placed through fixed classes.
    FixedOnly { subject: String },

    /// A class has at most one session of the subject per day.
    /// `None` applies to every subject.
    DailySubjectOnce { subject: Option<String> },

    /// A teacher teaches one class at most `max_per_day` periods a day.
    /// `None` applies to every teacher.
    TeacherSameClassDailyLimit {
        teacher: Option<String>,
        max_per_day: u32,
    },
}

impl Constraint {
    /// Creates a co-teaching constraint with two teachers per lesson.
    pub fn co_teaching(main_teacher: impl Into<String>, secondary_teachers: Vec<String>) -> Self {
        Self::CoTeaching {
            main_teacher: main_teacher.into(),
            secondary_teachers,
            subject: None,
            max_teachers_per_session: 2,
        }
    }

    /// Creates a co-teaching constraint restricted to one subject.
    pub fn co_teaching_for(
        main_teacher: impl Into<String>,
        secondary_teachers: Vec<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self::CoTeaching {
            main_teacher: main_teacher.into(),
            secondary_teachers,
            subject: Some(subject.into()),
            max_teachers_per_session: 2,
        }
    }

    /// Creates a block-period constraint.
    pub fn block(subject: impl Into<String>) -> Self {
        Self::BlockPeriod {
            subject: subject.into(),
        }
    }

    /// Creates a mutual-exclusion constraint.
    pub fn exclusion(teacher_a: impl Into<String>, teacher_b: impl Into<String>) -> Self {
        Self::TeacherMutualExclusion {
            teacher_a: teacher_a.into(),
            teacher_b: teacher_b.into(),
        }
    }

    /// Creates a fixed-only constraint.
    pub fn fixed_only(subject: impl Into<String>) -> Self {
        Self::FixedOnly {
            subject: subject.into(),
        }
    }

    /// Creates a daily-once constraint for one subject.
    pub fn daily_once(subject: impl Into<String>) -> Self {
        Self::DailySubjectOnce {
            subject: Some(subject.into()),
        }
    }

    /// Creates a daily same-class limit for one teacher.
    pub fn same_class_daily_limit(teacher: impl Into<String>, max_per_day: u32) -> Self {
        Self::TeacherSameClassDailyLimit {
            teacher: Some(teacher.into()),
            max_per_day,
        }
    }

    /// Teacher ids this constraint references.
    pub fn teacher_refs(&self) -> Vec<&str> {
        match self {
            Self::CoTeaching {
                main_teacher,
                secondary_teachers,
                ..
            } => std::iter::once(main_teacher.as_str())
                .chain(secondary_teachers.iter().map(String::as_str))
                .collect(),
            Self::TeacherMutualExclusion {
                teacher_a,
                teacher_b,
            } => vec![teacher_a.as_str(), teacher_b.as_str()],
            Self::TeacherSameClassDailyLimit {
                teacher: Some(t), ..
            } => vec![t.as_str()],
            _ => Vec::new(),
        }
    }

    /// Subject ids this constraint references.
    pub fn subject_refs(&self) -> Vec<&str> {
        match self {
            Self::CoTeaching {
                subject: Some(s), ..
            }
            | Self::DailySubjectOnce { subject: Some(s) } => vec![s.as_str()],
            Self::BlockPeriod { subject } | Self::FixedOnly { subject } => vec![subject.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Constraint sets of a timetable problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSets {
    /// Enforced at their natural tier.
    pub must: Vec<Constraint>,
    /// Evaluated at the lowest tier.
    pub optional: Vec<Constraint>,
}

impl ConstraintSets {
    /// Creates empty sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mandatory constraint.
    pub fn with_must(mut self, constraint: Constraint) -> Self {
        self.must.push(constraint);
        self
    }

    /// Adds an optional constraint.
    pub fn with_optional(mut self, constraint: Constraint) -> Self {
        self.optional.push(constraint);
        self
    }

    /// All constraints with their strength (`true` = must).
    pub fn iter(&self) -> impl Iterator<Item = (&Constraint, bool)> {
        self.must
            .iter()
            .map(|c| (c, true))
            .chain(self.optional.iter().map(|c| (c, false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co_teaching_constraint() {
        let c = Constraint::co_teaching_for("T1", vec!["T2".into(), "T3".into()], "english");
        match &c {
            Constraint::CoTeaching {
                main_teacher,
                secondary_teachers,
                subject,
                max_teachers_per_session,
            } => {
                assert_eq!(main_teacher, "T1");
                assert_eq!(secondary_teachers.len(), 2);
                assert_eq!(subject.as_deref(), Some("english"));
                assert_eq!(*max_teachers_per_session, 2);
            }
            _ => panic!("wrong variant"),
        }
        assert_eq!(c.teacher_refs(), vec!["T1", "T2", "T3"]);
        assert_eq!(c.subject_refs(), vec!["english"]);
    }

    #[test]
    fn test_refs_of_simple_constraints() {
        assert_eq!(Constraint::exclusion("A", "B").teacher_refs(), vec!["A", "B"]);
        assert!(Constraint::exclusion("A", "B").subject_refs().is_empty());
        assert_eq!(Constraint::fixed_only("assembly").subject_refs(), vec!["assembly"]);
        assert_eq!(Constraint::block("art").subject_refs(), vec!["art"]);
        assert!(Constraint::DailySubjectOnce { subject: None }
            .subject_refs()
            .is_empty());
        assert_eq!(
            Constraint::same_class_daily_limit("T9", 2).teacher_refs(),
            vec!["T9"]
        );
    }

    #[test]
    fn test_constraint_sets_strength() {
        let sets = ConstraintSets::new()
            .with_must(Constraint::block("art"))
            .with_optional(Constraint::daily_once("math"));

        let strengths: Vec<bool> = sets.iter().map(|(_, must)| must).collect();
        assert_eq!(strengths, vec![true, false]);
    }

    #[test]
    fn test_constraint_serde_tagged() {
        let c = Constraint::exclusion("A", "B");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"type\":\"teacher_mutual_exclusion\""));
        let back: Constraint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
