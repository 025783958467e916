//! Indexed, read-only view of a validated timetable problem.
//!
//! Built once per generation call. Resolves class layouts and caps,
//! per-class subject requirements, qualified teachers (including subject
//! aliases), symmetric teacher exclusions and the rule tables derived
//! from constraints, so the engine never scans input lists by id.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use crate::models::{
    ClassUnit, Constraint, FixedClass, LessonRef, Schedule, Subject, Teacher, TeacherHoursTracker,
    TimetableData,
};
use crate::validation::validate_input;

/// A resolved co-teaching constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct CoTeachingRule {
    /// Position among co-teaching rules (stable id).
    pub index: usize,
    /// Designated main teacher.
    pub main_teacher: String,
    /// Pool of secondary teachers.
    pub secondaries: Vec<String>,
    /// Subjects the rule covers (aliases included).
    pub subjects: BTreeSet<String>,
    /// Teachers per lesson including the main teacher.
    pub max_teachers: usize,
    /// From the `must` set.
    pub must: bool,
}

impl CoTeachingRule {
    /// Secondaries to attach to each lesson.
    pub fn secondaries_per_session(&self) -> usize {
        self.max_teachers.saturating_sub(1).clamp(1, self.secondaries.len().max(1))
    }

    /// Whether a lesson of `subject` with these teachers belongs to this rule.
    pub fn covers(&self, subject_id: &str, teachers: &[String]) -> bool {
        self.subjects.contains(subject_id) && teachers.iter().any(|t| t == &self.main_teacher)
    }
}

/// A daily-subject-once rule.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyOnceRule {
    /// Subject (`None` = every subject).
    pub subject: Option<String>,
    /// From the `must` set.
    pub must: bool,
}

/// A teacher-same-class daily limit.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLimitRule {
    /// Teacher (`None` = every teacher).
    pub teacher: Option<String>,
    /// Periods per class per day.
    pub max_per_day: u32,
    /// From the `must` set.
    pub must: bool,
}

/// Indexed problem data.
#[derive(Debug, Clone)]
pub struct Catalog {
    classes: BTreeMap<String, ClassUnit>,
    class_rank: BTreeMap<String, usize>,
    disabled: BTreeSet<String>,
    subjects: BTreeMap<String, Subject>,
    teachers: BTreeMap<String, Teacher>,
    qualified: BTreeMap<String, Vec<String>>,
    requirements: BTreeMap<String, BTreeMap<String, u32>>,
    exclusions: BTreeMap<String, BTreeSet<String>>,
    block_subjects: BTreeSet<String>,
    fixed_only: BTreeSet<String>,
    co_teaching: Vec<CoTeachingRule>,
    daily_once: Vec<DailyOnceRule>,
    daily_limits: Vec<DailyLimitRule>,
    aliases: Vec<(String, String)>,
    exempt_categories: BTreeSet<String>,
    fixed_classes: Vec<FixedClass>,
}

impl Catalog {
    /// Validates the input and builds the index.
    pub fn build(data: &TimetableData, config: &GenerationConfig) -> Result<Self> {
        validate_input(data, &config.subject_aliases).map_err(GenerationError::InvalidInput)?;

        let mut classes = BTreeMap::new();
        let mut disabled = BTreeSet::new();
        let mut class_rank = BTreeMap::new();
        for class in data.resolved_classes() {
            if class.is_enabled() {
                class_rank.insert(class.id.clone(), class_rank.len());
                classes.insert(class.id.clone(), class);
            } else {
                disabled.insert(class.id.clone());
            }
        }

        let subjects: BTreeMap<String, Subject> = data
            .subjects
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();
        let teachers: BTreeMap<String, Teacher> = data
            .teachers
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();

        let mut block_subjects: BTreeSet<String> = subjects
            .values()
            .filter(|s| s.is_block)
            .map(|s| s.id.clone())
            .collect();
        let mut fixed_only = BTreeSet::new();
        let mut exclusions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut co_teaching_raw = Vec::new();
        let mut daily_once = Vec::new();
        let mut daily_limits = Vec::new();

        for teacher in teachers.values() {
            for other in &teacher.mutually_exclusive {
                exclusions.entry(teacher.id.clone()).or_default().insert(other.clone());
                exclusions.entry(other.clone()).or_default().insert(teacher.id.clone());
            }
        }

        for (constraint, must) in data.constraints.iter() {
            match constraint {
                Constraint::CoTeaching { .. } => co_teaching_raw.push((constraint, must)),
                Constraint::BlockPeriod { subject } => {
                    block_subjects.insert(subject.clone());
                }
                Constraint::TeacherMutualExclusion {
                    teacher_a,
                    teacher_b,
                } => {
                    exclusions.entry(teacher_a.clone()).or_default().insert(teacher_b.clone());
                    exclusions.entry(teacher_b.clone()).or_default().insert(teacher_a.clone());
                }
                Constraint::FixedOnly { subject } => {
                    fixed_only.insert(subject.clone());
                }
                Constraint::DailySubjectOnce { subject } => daily_once.push(DailyOnceRule {
                    subject: subject.clone(),
                    must,
                }),
                Constraint::TeacherSameClassDailyLimit {
                    teacher,
                    max_per_day,
                } => daily_limits.push(DailyLimitRule {
                    teacher: teacher.clone(),
                    max_per_day: *max_per_day,
                    must,
                }),
            }
        }

        let requirements = classes
            .values()
            .map(|class| {
                let needs = subjects
                    .values()
                    .filter_map(|s| {
                        let hours = s.hours_for_grade(class.grade);
                        (hours > 0).then(|| (s.id.clone(), hours))
                    })
                    .collect();
                (class.id.clone(), needs)
            })
            .collect();

        let mut catalog = Self {
            classes,
            class_rank,
            disabled,
            subjects,
            teachers,
            qualified: BTreeMap::new(),
            requirements,
            exclusions,
            block_subjects,
            fixed_only,
            co_teaching: Vec::new(),
            daily_once,
            daily_limits,
            aliases: config.subject_aliases.clone(),
            exempt_categories: config.checker.exempt_categories.iter().cloned().collect(),
            fixed_classes: data.fixed_classes.clone(),
        };

        catalog.qualified = catalog
            .subjects
            .keys()
            .map(|subject_id| {
                let teachers = catalog
                    .teachers
                    .values()
                    .filter(|t| catalog.is_qualified(t, subject_id))
                    .map(|t| t.id.clone())
                    .collect();
                (subject_id.clone(), teachers)
            })
            .collect();

        catalog.co_teaching = co_teaching_raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, (constraint, must))| match constraint {
                Constraint::CoTeaching {
                    main_teacher,
                    secondary_teachers,
                    subject,
                    max_teachers_per_session,
                } => {
                    let base: Vec<String> = match subject {
                        Some(s) => vec![s.clone()],
                        None => catalog
                            .teachers
                            .get(main_teacher)
                            .map(|t| t.subjects.iter().cloned().collect())
                            .unwrap_or_default(),
                    };
                    let subjects = base
                        .iter()
                        .flat_map(|s| {
                            std::iter::once(s.clone())
                                .chain(catalog.aliases_of(s).into_iter().map(str::to_string))
                        })
                        .filter(|s| catalog.subjects.contains_key(s))
                        .collect();
                    Some(CoTeachingRule {
                        index,
                        main_teacher: main_teacher.clone(),
                        secondaries: secondary_teachers.clone(),
                        subjects,
                        max_teachers: *max_teachers_per_session,
                        must,
                    })
                }
                _ => None,
            })
            .collect();

        Ok(catalog)
    }

    /// Subjects declared as substitutes of `subject_id`.
    pub fn aliases_of(&self, subject_id: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter_map(|(a, b)| {
                if a == subject_id {
                    Some(b.as_str())
                } else if b == subject_id {
                    Some(a.as_str())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Whether a teacher may teach a subject (directly or via an alias).
    pub fn is_qualified(&self, teacher: &Teacher, subject_id: &str) -> bool {
        teacher.teaches(subject_id) || self.aliases_of(subject_id).iter().any(|a| teacher.teaches(a))
    }

    /// Enabled class by id.
    pub fn class(&self, class_id: &str) -> Option<&ClassUnit> {
        self.classes.get(class_id)
    }

    /// Enabled classes in id order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassUnit> {
        self.classes.values()
    }

    /// Whether the class exists but is disabled.
    pub fn is_disabled(&self, class_id: &str) -> bool {
        self.disabled.contains(class_id)
    }

    /// Position of the class in id order (0 = first).
    pub fn class_rank(&self, class_id: &str) -> usize {
        self.class_rank.get(class_id).copied().unwrap_or(usize::MAX)
    }

    /// Number of enabled classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Grade of a class (0 if unknown).
    pub fn grade_of(&self, class_id: &str) -> u8 {
        self.classes.get(class_id).map_or(0, |c| c.grade)
    }

    /// Subject by id.
    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.get(subject_id)
    }

    /// All subjects in id order.
    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    /// Teacher by id.
    pub fn teacher(&self, teacher_id: &str) -> Option<&Teacher> {
        self.teachers.get(teacher_id)
    }

    /// All teachers in id order.
    pub fn teachers(&self) -> impl Iterator<Item = &Teacher> {
        self.teachers.values()
    }

    /// Teachers qualified for a subject.
    pub fn qualified_teachers(&self, subject_id: &str) -> &[String] {
        self.qualified.get(subject_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weekly hours a class needs in a subject.
    pub fn required_hours(&self, class_id: &str, subject_id: &str) -> u32 {
        self.requirements
            .get(class_id)
            .and_then(|needs| needs.get(subject_id))
            .copied()
            .unwrap_or(0)
    }

    /// Subjects a class needs, with weekly hours.
    pub fn requirements(&self, class_id: &str) -> impl Iterator<Item = (&str, u32)> {
        self.requirements
            .get(class_id)
            .into_iter()
            .flat_map(|needs| needs.iter().map(|(s, h)| (s.as_str(), *h)))
    }

    /// Teachers excluded from teaching alongside `teacher_id`.
    pub fn exclusions_of(&self, teacher_id: &str) -> impl Iterator<Item = &str> {
        self.exclusions
            .get(teacher_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether lessons of the subject are two-period blocks.
    pub fn is_block(&self, subject_id: &str) -> bool {
        self.block_subjects.contains(subject_id)
    }

    /// Whether the subject may only come from pinned lessons.
    pub fn is_fixed_only(&self, subject_id: &str) -> bool {
        self.fixed_only.contains(subject_id)
    }

    /// Whether the subject is exempt from per-class caps and load counting.
    pub fn is_exempt(&self, subject_id: &str) -> bool {
        self.subjects
            .get(subject_id)
            .is_some_and(|s| self.exempt_categories.contains(&s.category))
    }

    /// Resolved co-teaching rules.
    pub fn co_teaching_rules(&self) -> &[CoTeachingRule] {
        &self.co_teaching
    }

    /// The co-teaching rule that governs lessons of `subject_id` in a class.
    ///
    /// A rule applies where its main teacher holds an allocation in the
    /// class and the subject is one of its targets.
    pub fn co_teaching_for(&self, class_id: &str, subject_id: &str) -> Option<&CoTeachingRule> {
        self.co_teaching.iter().find(|rule| {
            rule.subjects.contains(subject_id)
                && self
                    .teachers
                    .get(&rule.main_teacher)
                    .is_some_and(|t| t.allocation(class_id) > 0)
        })
    }

    /// Daily-subject-once rules.
    pub fn daily_once_rules(&self) -> &[DailyOnceRule] {
        &self.daily_once
    }

    /// Teacher-same-class daily limits.
    pub fn daily_limit_rules(&self) -> &[DailyLimitRule] {
        &self.daily_limits
    }

    /// Pinned lessons from the input.
    pub fn fixed_classes(&self) -> &[FixedClass] {
        &self.fixed_classes
    }

    /// Weekly lesson cap of a class.
    pub fn weekly_cap(&self, class_id: &str) -> Option<u32> {
        self.classes.get(class_id).and_then(|c| c.weekly_hour_cap)
    }

    /// Daily lesson cap of a class on a day.
    pub fn daily_cap(&self, class_id: &str, day: usize) -> usize {
        let Some(class) = self.classes.get(class_id) else {
            return 0;
        };
        let periods = class.periods_per_day.get(day).copied().unwrap_or(0);
        class.daily_cap.map_or(periods, |cap| cap.min(periods))
    }

    /// Lesson reference for tracker bookkeeping.
    pub fn lesson_ref<'a>(&self, class_id: &'a str, subject_id: &'a str) -> LessonRef<'a> {
        LessonRef::new(class_id, self.grade_of(class_id), subject_id)
    }

    /// An empty grid with every enabled class.
    pub fn empty_schedule(&self) -> Schedule {
        let mut schedule = Schedule::new();
        for class in self.classes.values() {
            schedule.add_class(class.id.clone(), &class.periods_per_day);
        }
        schedule
    }

    /// An empty tracker with every teacher's weekly limit.
    pub fn empty_tracker(&self) -> TeacherHoursTracker {
        let mut tracker = TeacherHoursTracker::new();
        for teacher in self.teachers.values() {
            tracker.register(teacher.id.clone(), teacher.max_hours_per_week);
        }
        tracker
    }
}
