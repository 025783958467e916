//! Exhaustive post-generation validation.
//!
//! Re-checks a finished schedule against every placement rule, plus
//! structural checks the search relies on:
//!
//! | Severity | Checks |
//! |----------|--------|
//! | CRITICAL | double booking, unavailability, mutual exclusion, broken blocks, co-teaching lessons without a pairing, tracker drift |
//! | HIGH | consecutive runs, teacher/class caps, space limits, subject hours, pinned lessons, co-teaching coverage (mandatory rules) |
//! | MEDIUM | block subjects split into singles, grade interleaving, mandatory daily rules |
//! | LOW | fixed-only subjects placed by search, optional daily rules, emergency placements |
//!
//! Any CRITICAL violation rejects the schedule; anything else marks it
//! usable with warnings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::quality::longest_run;
use super::Violation;
use crate::catalog::Catalog;
use crate::checker::{interleaves, Rule, Tier};
use crate::config::CheckerConfig;
use crate::models::{Cell, Schedule, ScheduleSlot, SlotSource, TeacherHoursTracker, TimeSlot};
use crate::scheduler::co_teaching;

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// No violations.
    Accepted,
    /// Only HIGH/MEDIUM/LOW violations.
    UsableWithWarnings,
    /// At least one CRITICAL violation.
    Rejected,
}

/// Violation counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ReportSummary {
    fn from_violations(violations: &[Violation]) -> Self {
        let mut summary = Self {
            total: violations.len(),
            ..Self::default()
        };
        for v in violations {
            match v.severity {
                Tier::Critical => summary.critical += 1,
                Tier::High => summary.high += 1,
                Tier::Medium => summary.medium += 1,
                Tier::Low => summary.low += 1,
            }
        }
        summary
    }
}

/// Result of validating a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No CRITICAL violations.
    pub is_valid: bool,
    /// Violations, most severe first.
    pub violations: Vec<Violation>,
    /// Counts per severity.
    pub summary: ReportSummary,
}

impl ValidationReport {
    /// Builds a report from a violation list.
    pub fn from_violations(mut violations: Vec<Violation>) -> Self {
        violations.sort_by_key(|v| v.severity);
        let summary = ReportSummary::from_violations(&violations);
        Self {
            is_valid: summary.critical == 0,
            violations,
            summary,
        }
    }

    /// Overall verdict.
    pub fn status(&self) -> ValidationStatus {
        if self.summary.critical > 0 {
            ValidationStatus::Rejected
        } else if self.summary.total > 0 {
            ValidationStatus::UsableWithWarnings
        } else {
            ValidationStatus::Accepted
        }
    }

    /// Violations of one rule.
    pub fn of_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }
}

/// Validates finished schedules.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleValidator<'a> {
    catalog: &'a Catalog,
    config: &'a CheckerConfig,
}

impl<'a> ScheduleValidator<'a> {
    /// Creates a validator.
    pub fn new(catalog: &'a Catalog, config: &'a CheckerConfig) -> Self {
        Self { catalog, config }
    }

    /// Checks a schedule and the tracker that was maintained with it.
    pub fn validate(&self, schedule: &Schedule, tracker: &TeacherHoursTracker) -> ValidationReport {
        let mut out = Vec::new();
        self.check_cells(schedule, &mut out);
        self.check_teacher_slots(schedule, &mut out);
        self.check_teacher_days(schedule, &mut out);
        self.check_loads(schedule, tracker, &mut out);
        self.check_classes(schedule, &mut out);
        self.check_space(schedule, &mut out);
        self.check_fixed(schedule, &mut out);
        out.extend(co_teaching::verify(self.catalog, schedule));
        ValidationReport::from_violations(out)
    }

    fn check_cells(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        for (class_id, slot, cell) in schedule.occupied() {
            let Some(lesson) = cell.slot() else { continue };
            for teacher_id in &lesson.teachers {
                let unavailable = self
                    .catalog
                    .teacher(teacher_id)
                    .is_some_and(|t| !t.is_available_at(slot));
                if unavailable {
                    out.push(
                        Violation::new(
                            Rule::TeacherUnavailable,
                            Tier::Critical,
                            format!("'{teacher_id}' teaches while unavailable"),
                        )
                        .in_class(class_id)
                        .for_teacher(teacher_id.clone())
                        .at(slot),
                    );
                }
            }
            if lesson.source == SlotSource::Constraint {
                let main_present = lesson
                    .main_teacher
                    .as_ref()
                    .is_some_and(|m| lesson.has_teacher(m));
                if lesson.teachers.len() < 2 || !main_present {
                    out.push(
                        Violation::new(
                            Rule::CoTeaching,
                            Tier::Critical,
                            "co-teaching lesson lacks its main teacher or a co-teacher",
                        )
                        .in_class(class_id)
                        .at(slot),
                    );
                }
            }
            if lesson.is_block_period && !block_is_intact(schedule, class_id, slot, lesson) {
                out.push(
                    Violation::new(
                        Rule::BlockPairing,
                        Tier::Critical,
                        format!("broken block of '{}'", lesson.subject_id),
                    )
                    .in_class(class_id)
                    .at(slot),
                );
            }
            if !cell.is_fixed() && self.catalog.is_fixed_only(&lesson.subject_id) {
                out.push(
                    Violation::new(
                        Rule::FixedOnly,
                        Tier::Low,
                        format!("fixed-only subject '{}' placed by search", lesson.subject_id),
                    )
                    .in_class(class_id)
                    .at(slot),
                );
            }
            if lesson.source.is_emergency() {
                out.push(
                    Violation::new(
                        Rule::EmergencyPlacement,
                        Tier::Low,
                        format!("'{}' placed by emergency fill ({:?})", lesson.subject_id, lesson.source),
                    )
                    .in_class(class_id)
                    .at(slot),
                );
            }
        }
    }

    fn check_teacher_slots(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        for teacher_id in schedule.teacher_ids() {
            let parallel = self
                .catalog
                .teacher(teacher_id)
                .is_some_and(|t| t.allow_parallel);
            for (slot, classes) in schedule.teacher_slots(teacher_id) {
                if classes.len() > 1 {
                    let mut subjects = classes
                        .iter()
                        .filter_map(|c| schedule.lesson(c, slot))
                        .map(|l| l.subject_id.as_str());
                    let first = subjects.next();
                    let same_subject = subjects.all(|s| Some(s) == first);
                    if !(parallel && same_subject) {
                        out.push(
                            Violation::new(
                                Rule::TeacherDoubleBooked,
                                Tier::Critical,
                                format!("'{teacher_id}' teaches {} classes at once", classes.len()),
                            )
                            .for_teacher(teacher_id)
                            .at(slot),
                        );
                    }
                }
                for partner in self.catalog.exclusions_of(teacher_id) {
                    // Each pair once
                    if partner > teacher_id && schedule.is_teacher_busy(partner, slot) {
                        out.push(
                            Violation::new(
                                Rule::MutualExclusion,
                                Tier::Critical,
                                format!("'{teacher_id}' and '{partner}' teach at the same time"),
                            )
                            .for_teacher(teacher_id)
                            .at(slot),
                        );
                    }
                }
            }
        }
    }

    fn check_teacher_days(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        let max = self.config.max_consecutive_periods;
        let day_count = schedule
            .class_ids()
            .map(|c| schedule.day_count(c))
            .max()
            .unwrap_or(0);
        for teacher_id in schedule.teacher_ids() {
            let sequential = self
                .catalog
                .teacher(teacher_id)
                .is_some_and(|t| t.sequential_grade_teaching);
            for day in 0..day_count {
                let plan = schedule.teacher_day(teacher_id, day);
                if plan.is_empty() {
                    continue;
                }
                let mut periods: Vec<usize> = plan.iter().map(|&(p, _)| p).collect();
                periods.dedup();
                let run = longest_run(&periods);
                if max > 0 && run > max {
                    out.push(
                        Violation::new(
                            Rule::ConsecutiveLimit,
                            Tier::High,
                            format!("'{teacher_id}' teaches {run} periods in a row on day {day}"),
                        )
                        .for_teacher(teacher_id),
                    );
                }
                if sequential && interleaves(plan.iter().map(|&(_, c)| self.catalog.grade_of(c))) {
                    out.push(
                        Violation::new(
                            Rule::SequentialGrade,
                            Tier::Medium,
                            format!("'{teacher_id}' interleaves grades on day {day}"),
                        )
                        .for_teacher(teacher_id),
                    );
                }
            }
        }
    }

    fn check_loads(&self, schedule: &Schedule, tracker: &TeacherHoursTracker, out: &mut Vec<Violation>) {
        let catalog = self.catalog;
        let recount = catalog.empty_tracker().recount(
            schedule,
            |s| !catalog.is_exempt(s),
            |c| catalog.grade_of(c),
        );
        for teacher in catalog.teachers() {
            let id = teacher.id.as_str();
            for (class_id, &cap) in &teacher.class_hours {
                let taught = recount.class_hours(id, class_id);
                if taught > cap {
                    out.push(
                        Violation::new(
                            Rule::TeacherClassCap,
                            Tier::High,
                            format!("'{id}' teaches {taught}/{cap} hours in '{class_id}'"),
                        )
                        .for_teacher(id)
                        .in_class(class_id.clone()),
                    );
                }
            }
            for (&grade, &cap) in &teacher.grade_hours {
                let taught = recount.grade_hours(id, grade);
                if taught > cap {
                    out.push(
                        Violation::new(
                            Rule::TeacherGradeCap,
                            Tier::High,
                            format!("'{id}' teaches {taught}/{cap} hours in grade {grade}"),
                        )
                        .for_teacher(id),
                    );
                }
            }
            let current = recount.current(id);
            if current > teacher.max_hours_per_week {
                out.push(
                    Violation::new(
                        Rule::TeacherWeeklyMax,
                        Tier::High,
                        format!("'{id}' teaches {current}/{} weekly hours", teacher.max_hours_per_week),
                    )
                    .for_teacher(id),
                );
            }
        }

        let counted = |t: &TeacherHoursTracker, id: &str| {
            t.load(id)
                .filter(|l| l.current > 0)
                .map(|l| (l.current, l.by_subject.clone(), l.by_class.clone(), l.by_grade.clone()))
        };
        let mut ids: Vec<&str> = recount.iter().map(|(id, _)| id).collect();
        ids.extend(tracker.iter().map(|(id, _)| id));
        ids.sort_unstable();
        ids.dedup();
        for id in ids {
            if counted(&recount, id) != counted(tracker, id) {
                out.push(
                    Violation::new(
                        Rule::TrackerMismatch,
                        Tier::Critical,
                        format!(
                            "tracker books {} hours for '{id}', the grid holds {}",
                            tracker.current(id),
                            recount.current(id)
                        ),
                    )
                    .for_teacher(id),
                );
            }
        }
    }

    fn check_classes(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        for class in self.catalog.classes() {
            let class_id = class.id.as_str();
            let days = schedule.day_count(class_id);
            let filled: usize = (0..days).map(|d| schedule.class_day_load(class_id, d)).sum();
            if let Some(cap) = self.catalog.weekly_cap(class_id) {
                if filled > cap as usize {
                    out.push(
                        Violation::new(
                            Rule::ClassWeeklyCap,
                            Tier::High,
                            format!("{filled}/{cap} weekly lessons"),
                        )
                        .in_class(class_id),
                    );
                }
            }
            for day in 0..days {
                let load = schedule.class_day_load(class_id, day);
                let cap = self.catalog.daily_cap(class_id, day);
                if load > cap {
                    out.push(
                        Violation::new(
                            Rule::ClassDailyCap,
                            Tier::High,
                            format!("{load}/{cap} lessons on day {day}"),
                        )
                        .in_class(class_id),
                    );
                }
            }
            self.check_hours(schedule, class_id, out);
            self.check_block_singles(schedule, class_id, out);
            self.check_daily_rules(schedule, class_id, out);
        }
    }

    fn check_hours(&self, schedule: &Schedule, class_id: &str, out: &mut Vec<Violation>) {
        let mut placed: BTreeMap<&str, u32> = BTreeMap::new();
        for (_, cell) in schedule.class_cells(class_id) {
            if let Some(lesson) = cell.slot() {
                *placed.entry(lesson.subject_id.as_str()).or_insert(0) += 1;
            }
        }
        for (subject_id, required) in self.catalog.requirements(class_id) {
            let has = placed.remove(subject_id).unwrap_or(0);
            if has != required {
                out.push(
                    Violation::new(
                        Rule::HoursMismatch,
                        Tier::High,
                        format!("'{subject_id}' needs {required} hours, has {has}"),
                    )
                    .in_class(class_id),
                );
            }
        }
        for (subject_id, has) in placed {
            out.push(
                Violation::new(
                    Rule::HoursMismatch,
                    Tier::High,
                    format!("'{subject_id}' is not required, has {has}"),
                )
                .in_class(class_id),
            );
        }
    }

    fn check_block_singles(&self, schedule: &Schedule, class_id: &str, out: &mut Vec<Violation>) {
        for (subject_id, required) in self.catalog.requirements(class_id) {
            if !self.catalog.is_block(subject_id) {
                continue;
            }
            let singles = schedule
                .class_cells(class_id)
                .filter(|(_, cell)| matches!(cell, Cell::Placed(l) if l.subject_id == subject_id && !l.is_block_period))
                .count() as u32;
            if singles > required % 2 {
                out.push(
                    Violation::new(
                        Rule::BlockPairing,
                        Tier::Medium,
                        format!("'{subject_id}' has {singles} single period(s) instead of blocks"),
                    )
                    .in_class(class_id),
                );
            }
        }
    }

    fn check_daily_rules(&self, schedule: &Schedule, class_id: &str, out: &mut Vec<Violation>) {
        for day in 0..schedule.day_count(class_id) {
            let sessions: Vec<&ScheduleSlot> = (1..=schedule.periods_on(class_id, day))
                .map(|p| TimeSlot::new(day, p))
                .filter(|&slot| !is_block_tail(schedule, class_id, slot))
                .filter_map(|slot| schedule.lesson(class_id, slot))
                .collect();

            for rule in self.catalog.daily_once_rules() {
                let severity = if rule.must { Tier::Medium } else { Tier::Low };
                let mut per_subject: BTreeMap<&str, usize> = BTreeMap::new();
                for lesson in &sessions {
                    if rule.subject.as_deref().is_none_or(|s| s == lesson.subject_id) {
                        *per_subject.entry(lesson.subject_id.as_str()).or_insert(0) += 1;
                    }
                }
                for (subject_id, n) in per_subject.into_iter().filter(|&(_, n)| n > 1) {
                    out.push(
                        Violation::new(
                            Rule::DailySubjectOnce,
                            severity,
                            format!("'{subject_id}' taught {n} times on day {day}"),
                        )
                        .in_class(class_id),
                    );
                }
            }

            for rule in self.catalog.daily_limit_rules() {
                let severity = if rule.must { Tier::Medium } else { Tier::Low };
                let mut per_teacher: BTreeMap<&str, u32> = BTreeMap::new();
                for lesson in &sessions {
                    for t in &lesson.teachers {
                        if rule.teacher.as_deref().is_none_or(|r| r == t) {
                            *per_teacher.entry(t.as_str()).or_insert(0) += 1;
                        }
                    }
                }
                for (teacher_id, n) in per_teacher.into_iter().filter(|&(_, n)| n > rule.max_per_day) {
                    out.push(
                        Violation::new(
                            Rule::TeacherSameClassDailyLimit,
                            severity,
                            format!("'{teacher_id}' has {n} sessions on day {day}, limit {}", rule.max_per_day),
                        )
                        .in_class(class_id)
                        .for_teacher(teacher_id),
                    );
                }
            }
        }
    }

    fn check_space(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        let mut concurrent: BTreeMap<(TimeSlot, &str), u32> = BTreeMap::new();
        for (_, slot, cell) in schedule.occupied() {
            if let Some(lesson) = cell.slot() {
                *concurrent.entry((slot, lesson.subject_id.as_str())).or_insert(0) += 1;
            }
        }
        for ((slot, subject_id), n) in concurrent {
            let limit = self
                .catalog
                .subject(subject_id)
                .and_then(|s| s.max_concurrent_classes);
            if let Some(limit) = limit.filter(|&l| n > l) {
                out.push(
                    Violation::new(
                        Rule::SpaceLimit,
                        Tier::High,
                        format!("'{subject_id}' runs in {n} classes at once, limit {limit}"),
                    )
                    .at(slot),
                );
            }
        }
    }

    fn check_fixed(&self, schedule: &Schedule, out: &mut Vec<Violation>) {
        for fixed in self.catalog.fixed_classes() {
            if self.catalog.class(&fixed.class_id).is_none() {
                continue;
            }
            let intact = match schedule.cell(&fixed.class_id, fixed.slot) {
                Some(Cell::Fixed(lesson)) => {
                    lesson.subject_id == fixed.subject_id && lesson.teachers == fixed.teachers()
                }
                _ => false,
            };
            if !intact {
                out.push(
                    Violation::new(
                        Rule::FixedIntegrity,
                        Tier::High,
                        format!("pinned '{}' is missing or altered", fixed.subject_id),
                    )
                    .in_class(fixed.class_id.clone())
                    .at(fixed.slot),
                );
            }
        }
    }
}

/// Second half of a block.
fn is_block_tail(schedule: &Schedule, class_id: &str, slot: TimeSlot) -> bool {
    schedule.lesson(class_id, slot).is_some_and(|l| {
        l.is_block_period && l.block_partner == Some(slot.period.saturating_sub(1))
    })
}

/// Adjacent, odd-started, reciprocal and identical halves.
fn block_is_intact(schedule: &Schedule, class_id: &str, slot: TimeSlot, lesson: &ScheduleSlot) -> bool {
    let Some(partner) = lesson.block_partner else {
        return false;
    };
    if partner.abs_diff(slot.period) != 1 || slot.period.min(partner) % 2 == 0 {
        return false;
    }
    schedule
        .lesson(class_id, TimeSlot::new(slot.day, partner))
        .is_some_and(|other| {
            other.is_block_period
                && other.block_partner == Some(slot.period)
                && other.subject_id == lesson.subject_id
                && other.teachers == lesson.teachers
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraint, FixedClass, Teacher};
    use crate::scheduler::Placement;
    use crate::test_support::{catalog, ids, small_school};

    fn commit(s: &mut Schedule, t: &mut TeacherHoursTracker, c: &Catalog, p: Placement) {
        p.apply(s, t, c).unwrap();
    }

    #[test]
    fn test_empty_schedule_reports_missing_hours() {
        let data = small_school();
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let report = ScheduleValidator::new(&c, &config).validate(&c.empty_schedule(), &c.empty_tracker());
        // 5 subjects x 2 classes
        assert_eq!(report.summary.high, 10);
        assert!(report.is_valid);
        assert_eq!(report.status(), ValidationStatus::UsableWithWarnings);
    }

    #[test]
    fn test_double_booking_is_critical() {
        let data = small_school();
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        let slot = TimeSlot::new(1, 1);
        commit(&mut s, &mut t, &c, Placement::new("1-1", "pe", slot, ids(&["P1"])));
        commit(&mut s, &mut t, &c, Placement::new("1-2", "pe", slot, ids(&["P1"])));

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        assert_eq!(report.of_rule(Rule::TeacherDoubleBooked).count(), 1);
        assert_eq!(report.status(), ValidationStatus::Rejected);
        assert_eq!(report.violations[0].severity, Tier::Critical);
    }

    #[test]
    fn test_tracker_drift_detected() {
        let data = small_school();
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        commit(&mut s, &mut t, &c, Placement::new("1-1", "math", TimeSlot::new(0, 1), ids(&["M1"])));
        let validator = ScheduleValidator::new(&c, &config);
        assert_eq!(validator.validate(&s, &t).of_rule(Rule::TrackerMismatch).count(), 0);

        t.add("M1", c.lesson_ref("1-1", "math"));
        assert_eq!(validator.validate(&s, &t).of_rule(Rule::TrackerMismatch).count(), 1);
    }

    #[test]
    fn test_broken_block_is_critical() {
        let data = small_school();
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        let half = ScheduleSlot::new("science", "S1", SlotSource::Search).as_block(3);
        s.place("1-1", TimeSlot::new(0, 2), half).unwrap();
        t.add("S1", c.lesson_ref("1-1", "science"));

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        assert_eq!(report.of_rule(Rule::BlockPairing).count(), 1);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_intact_block_and_singles() {
        let data = small_school();
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        commit(&mut s, &mut t, &c, Placement::new("1-1", "science", TimeSlot::new(0, 1), ids(&["S1"])).spanning(2));
        commit(&mut s, &mut t, &c, Placement::new("1-1", "science", TimeSlot::new(1, 2), ids(&["S1"])));
        commit(&mut s, &mut t, &c, Placement::new("1-1", "science", TimeSlot::new(2, 2), ids(&["S1"])));

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        let block: Vec<_> = report.of_rule(Rule::BlockPairing).collect();
        assert_eq!(block.len(), 1);
        assert_eq!(block[0].severity, Tier::Medium);
    }

    #[test]
    fn test_fixed_integrity_and_emergency() {
        let data = small_school().with_fixed(FixedClass::new("1-1", 0, 1, "music", "U1"));
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        commit(
            &mut s,
            &mut t,
            &c,
            Placement::new("1-1", "music", TimeSlot::new(0, 1), ids(&["U1"]))
                .with_source(SlotSource::Emergency),
        );

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        assert_eq!(report.of_rule(Rule::FixedIntegrity).count(), 1);
        let emergency: Vec<_> = report.of_rule(Rule::EmergencyPlacement).collect();
        assert_eq!(emergency.len(), 1);
        assert_eq!(emergency[0].severity, Tier::Low);
    }

    #[test]
    fn test_daily_rules_and_exclusion() {
        let data = small_school()
            .with_optional_constraint(Constraint::daily_once("math"))
            .with_constraint(Constraint::exclusion("K1", "K2"));
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        commit(&mut s, &mut t, &c, Placement::new("1-1", "math", TimeSlot::new(0, 1), ids(&["M1"])));
        commit(&mut s, &mut t, &c, Placement::new("1-1", "math", TimeSlot::new(0, 4), ids(&["M1"])));
        commit(&mut s, &mut t, &c, Placement::new("1-1", "korean", TimeSlot::new(1, 1), ids(&["K1"])));
        commit(&mut s, &mut t, &c, Placement::new("1-2", "korean", TimeSlot::new(1, 1), ids(&["K2"])));

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        let daily: Vec<_> = report.of_rule(Rule::DailySubjectOnce).collect();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].severity, Tier::Low);
        assert_eq!(report.of_rule(Rule::MutualExclusion).count(), 1);
    }

    #[test]
    fn test_unavailable_teacher_flagged() {
        let data = small_school().with_teacher(Teacher::new("X").with_subject("pe").with_unavailable(2, 2));
        let c = catalog(&data);
        let config = CheckerConfig::default();
        let mut s = c.empty_schedule();
        let mut t = c.empty_tracker();
        commit(&mut s, &mut t, &c, Placement::new("1-2", "pe", TimeSlot::new(2, 2), ids(&["X"])));

        let report = ScheduleValidator::new(&c, &config).validate(&s, &t);
        assert_eq!(report.of_rule(Rule::TeacherUnavailable).count(), 1);
        assert_eq!(report.status(), ValidationStatus::Rejected);
    }

    #[test]
    fn test_report_serializes() {
        let report = ValidationReport::from_violations(vec![
            Violation::new(Rule::HoursMismatch, Tier::High, "x"),
            Violation::new(Rule::TrackerMismatch, Tier::Critical, "y"),
        ]);
        assert_eq!(report.violations[0].rule, Rule::TrackerMismatch);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["critical"], 1);
        assert_eq!(json["is_valid"], false);
    }
}
