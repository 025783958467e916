//! Co-teaching session placement.
//!
//! Runs after pinned lessons and before the general search. For every
//! co-teaching rule it places the main teacher's sessions in the classes
//! where that teacher holds an allocation, attaching the secondary with
//! the lowest participation so far that passes the checker at the slot.
//! Equal participation is broken with the attempt's seeded RNG.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::history::Placement;
use crate::catalog::{Catalog, CoTeachingRule};
use crate::checker::{ConstraintChecker, PlacementRequest, Rule, Tier};
use crate::models::{Schedule, SlotSource, TeacherHoursTracker};
use crate::report::Violation;
use crate::slots::SlotFinder;

/// A co-teaching requirement left (partly) unmet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSessions {
    /// Class.
    pub class_id: String,
    /// Subject.
    pub subject_id: String,
    /// Hours that could not be placed.
    pub missing: u32,
}

/// Result of the co-teaching phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoTeachingReport {
    /// Sessions placed.
    pub placed: usize,
    /// Sessions that needed emergency candidates.
    pub emergency_sessions: usize,
    /// Requirements left for the general search.
    pub unresolved: Vec<UnresolvedSessions>,
    /// Sessions per secondary teacher, per rule index.
    pub participation: BTreeMap<usize, BTreeMap<String, u32>>,
}

/// Places co-teaching sessions.
#[derive(Debug, Clone)]
pub struct CoTeachingResolver<'f, 'a> {
    finder: &'f SlotFinder<'a>,
}

impl<'f, 'a> CoTeachingResolver<'f, 'a> {
    /// Creates a resolver over a slot finder.
    pub fn new(finder: &'f SlotFinder<'a>) -> Self {
        Self { finder }
    }

    /// Resolves every co-teaching rule of the catalog.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        rng: &mut R,
    ) -> CoTeachingReport {
        let catalog = self.finder.checker().catalog();
        let mut report = CoTeachingReport::default();
        for rule in catalog.co_teaching_rules() {
            let mut ledger: BTreeMap<String, u32> =
                rule.secondaries.iter().map(|t| (t.clone(), 0)).collect();
            self.resolve_rule(catalog, rule, schedule, tracker, &mut ledger, &mut report, rng);
            report.participation.insert(rule.index, ledger);
        }
        debug!(placed = report.placed, unresolved = report.unresolved.len(), "co-teaching resolved");
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_rule<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rule: &CoTeachingRule,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        ledger: &mut BTreeMap<String, u32>,
        report: &mut CoTeachingReport,
        rng: &mut R,
    ) {
        let Some(main) = catalog.teacher(&rule.main_teacher) else {
            return;
        };
        let classes: Vec<String> = catalog
            .classes()
            .filter(|c| main.allocation(&c.id) > 0)
            .map(|c| c.id.clone())
            .collect();
        for class_id in classes {
            let mut allocation_left = main
                .allocation(&class_id)
                .saturating_sub(tracker.class_hours(&main.id, &class_id));
            for subject_id in &rule.subjects {
                let required = catalog.required_hours(&class_id, subject_id);
                let placed = schedule.subject_hours(&class_id, subject_id);
                let mut sessions = allocation_left.min(required.saturating_sub(placed));
                while sessions > 0 {
                    let span = self
                        .finder
                        .session_span(schedule, &class_id, subject_id, Tier::Low)
                        .min(sessions as usize);
                    match self.place_session(rule, &class_id, subject_id, span, schedule, tracker, ledger, rng) {
                        Some(emergency) => {
                            report.placed += 1;
                            if emergency {
                                report.emergency_sessions += 1;
                            }
                            sessions -= span as u32;
                            allocation_left = allocation_left.saturating_sub(span as u32);
                        }
                        None => {
                            warn!(
                                class = %class_id,
                                subject = %subject_id,
                                teacher = %rule.main_teacher,
                                missing = sessions,
                                "co-teaching sessions left unresolved"
                            );
                            report.unresolved.push(UnresolvedSessions {
                                class_id: class_id.clone(),
                                subject_id: subject_id.clone(),
                                missing: sessions,
                            });
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Places one session. Returns whether emergency candidates were used,
    /// or `None` if nothing fit.
    #[allow(clippy::too_many_arguments)]
    fn place_session<R: Rng + ?Sized>(
        &self,
        rule: &CoTeachingRule,
        class_id: &str,
        subject_id: &str,
        span: usize,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        ledger: &mut BTreeMap<String, u32>,
        rng: &mut R,
    ) -> Option<bool> {
        let main = [rule.main_teacher.clone()];
        let mut emergency = false;
        let mut candidates =
            self.finder
                .find(schedule, tracker, class_id, subject_id, &main, span, Tier::Low, rng);
        if candidates.is_empty() {
            emergency = true;
            candidates = self
                .finder
                .find_emergency(schedule, class_id, subject_id, &main, span, rng);
        }

        let mut pool = rule.secondaries.clone();
        pool.shuffle(rng);
        pool.sort_by_key(|t| ledger.get(t).copied().unwrap_or(0));

        let strictness = (!emergency).then_some(Tier::Low);
        for candidate in candidates {
            let base = PlacementRequest::new(class_id, candidate.slot, subject_id, &main).spanning(candidate.span);
            let teachers = pick_co_teachers(
                self.finder.checker(),
                &base,
                &pool,
                rule.secondaries_per_session(),
                strictness,
                schedule,
                tracker,
            );
            if teachers.len() < 2 {
                continue;
            }
            let placement = Placement::new(class_id, subject_id, candidate.slot, teachers)
                .spanning(candidate.span)
                .with_source(SlotSource::Constraint)
                .with_main_teacher(rule.main_teacher.clone())
                .accepted(candidate.score, Tier::Low);
            let catalog = self.finder.checker().catalog();
            if placement.apply(schedule, tracker, catalog).is_err() {
                continue;
            }
            for secondary in &placement.teachers[1..] {
                *ledger.entry(secondary.clone()).or_insert(0) += 1;
            }
            return Some(emergency);
        }
        None
    }
}

/// The teachers of `base` plus up to `wanted` more from `pool`, taken in
/// pool order, each passing the checker at the slot with everyone chosen
/// before. `None` strictness checks double booking only.
pub(crate) fn pick_co_teachers(
    checker: &ConstraintChecker<'_>,
    base: &PlacementRequest<'_>,
    pool: &[String],
    wanted: usize,
    strictness: Option<Tier>,
    schedule: &Schedule,
    tracker: &TeacherHoursTracker,
) -> Vec<String> {
    let mut teachers = base.teachers.to_vec();
    let target = teachers.len() + wanted;
    for teacher in pool {
        if teachers.len() >= target {
            break;
        }
        if teachers.contains(teacher) {
            continue;
        }
        teachers.push(teacher.clone());
        let request = PlacementRequest {
            teachers: &teachers,
            ..*base
        };
        let allowed = match strictness {
            Some(tier) => checker.evaluate(schedule, tracker, &request, tier).is_allowed(),
            None => checker.evaluate_emergency(schedule, &request).is_allowed(),
        };
        if !allowed {
            teachers.pop();
        }
    }
    teachers
}

/// Sessions each secondary of a rule currently co-teaches. A block counts
/// once.
pub(crate) fn participation(rule: &CoTeachingRule, schedule: &Schedule) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<String, u32> = rule.secondaries.iter().map(|t| (t.clone(), 0)).collect();
    for (_, slot, cell) in schedule.occupied() {
        let Some(lesson) = cell.slot() else { continue };
        if !rule.covers(&lesson.subject_id, &lesson.teachers) {
            continue;
        }
        if lesson.is_block_period && lesson.block_partner == Some(slot.period.saturating_sub(1)) {
            continue;
        }
        for teacher in &lesson.teachers {
            if let Some(count) = counts.get_mut(teacher) {
                *count += 1;
            }
        }
    }
    counts
}

/// Checks that every lesson of a main teacher in a targeted subject is
/// co-taught with a member of the secondary pool.
pub fn verify(catalog: &Catalog, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in catalog.co_teaching_rules() {
        let severity = if rule.must { Tier::High } else { Tier::Low };
        for (class_id, slot, cell) in schedule.occupied() {
            let Some(lesson) = cell.slot() else { continue };
            if !rule.covers(&lesson.subject_id, &lesson.teachers) {
                continue;
            }
            let paired = lesson.is_co_teaching
                && lesson.teachers.iter().any(|t| rule.secondaries.contains(t));
            if !paired {
                violations.push(
                    Violation::new(
                        Rule::CoTeaching,
                        severity,
                        format!(
                            "'{}' taught by '{}' without a co-teacher",
                            lesson.subject_id, rule.main_teacher
                        ),
                    )
                    .in_class(class_id)
                    .at(slot)
                    .for_teacher(rule.main_teacher.clone()),
                );
            }
        }
    }
    violations
}
