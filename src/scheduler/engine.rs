//! Priority placement search.
//!
//! Each outer iteration rebuilds the backlog of (class, subject) pairs
//! still short of their weekly hours, orders it with a
//! [`PriorityEngine`] and makes one pass placing at most one session per
//! task. The first candidate slot that passes the checker is committed
//! (greedy, not exhaustive).
//!
//! An iteration that places nothing is a stall. A stall first triggers
//! smart backtracking: among the last few commits, the one accepted with
//! the lowest ranking score is undone and its start slot is not retried
//! at the current tier. After `stalls_before_relax` backtracks at a tier
//! (or with nothing left to undo) the search relaxes one tier, down to
//! the policy floor.
//!
//! # Reference
//! Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//! Strategies and Applications"

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::co_teaching::{participation, pick_co_teachers};
use super::history::{Placement, PlacementHistory};
use crate::checker::{PlacementRequest, Tier};
use crate::config::SearchPolicy;
use crate::models::{Schedule, TeacherHoursTracker, TimeSlot};
use crate::priority::{DifficultyWeights, PlacementTask, PriorityContext, PriorityEngine};
use crate::report::FailureAnalysis;
use crate::slots::{SlotCandidate, SlotFinder};

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Every placeable requirement is met.
    Complete,
    /// The search gave up; the schedule is partial.
    Exhausted {
        /// Why the search stopped.
        reason: String,
    },
    /// Stopped by the caller.
    Cancelled,
}

impl SearchStatus {
    /// Whether the backlog was emptied.
    pub fn is_complete(&self) -> bool {
        matches!(self, SearchStatus::Complete)
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// How the search ended.
    pub status: SearchStatus,
    /// Counters and failure tallies.
    pub analysis: FailureAnalysis,
    /// Placements still committed at the end.
    pub history: PlacementHistory,
}

/// The placement search.
#[derive(Clone)]
pub struct PlacementEngine<'f, 'a> {
    finder: &'f SlotFinder<'a>,
    policy: SearchPolicy,
    priority: PriorityEngine,
    difficulty: DifficultyWeights,
}

impl<'f, 'a> PlacementEngine<'f, 'a> {
    /// Creates an engine with the most-constrained-first ordering.
    pub fn new(finder: &'f SlotFinder<'a>, policy: SearchPolicy) -> Self {
        Self {
            finder,
            policy,
            priority: PriorityEngine::most_constrained_first(),
            difficulty: DifficultyWeights::default(),
        }
    }

    /// Replaces the task ordering.
    pub fn with_priority(mut self, priority: PriorityEngine) -> Self {
        self.priority = priority;
        self
    }

    /// Replaces the difficulty weights.
    pub fn with_difficulty(mut self, difficulty: DifficultyWeights) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Runs the search on a schedule that may already hold pinned and
    /// co-teaching lessons.
    pub fn run<R: Rng + ?Sized>(
        &self,
        schedule: &mut Schedule,
        tracker: &mut TeacherHoursTracker,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let mut search = Search {
            engine: self,
            schedule,
            tracker,
            rng,
            tier: Tier::Low,
            cache: BTreeMap::new(),
            tabu: BTreeSet::new(),
            history: PlacementHistory::new(),
            analysis: FailureAnalysis::new(),
        };
        let status = search.run(cancel);
        search.analysis.final_tier = Some(search.tier);
        info!(
            status = ?status,
            iterations = search.analysis.iterations,
            placed = search.analysis.successes,
            backtracks = search.analysis.backtracks,
            tier = %search.tier,
            "placement search finished"
        );
        SearchOutcome {
            status,
            analysis: search.analysis,
            history: search.history,
        }
    }
}

/// Candidate slots computed for one (class, subject) pair.
#[derive(Debug, Clone)]
struct CachedCandidates {
    /// Lead teacher(s); co-teachers are added per slot.
    teachers: Vec<String>,
    co_taught: bool,
    candidates: Vec<SlotCandidate>,
}

/// Co-teachers to attach to a session.
struct Pairing {
    /// Lowest participation first.
    pool: Vec<String>,
    wanted: usize,
}

enum Attempt {
    Placed,
    NoCandidate,
    Conflict,
}

enum Undo {
    Undone,
    NothingToUndo,
    BudgetExhausted,
}

/// Mutable state of one search run.
struct Search<'e, 'f, 'a, 's, R: Rng + ?Sized> {
    engine: &'e PlacementEngine<'f, 'a>,
    schedule: &'s mut Schedule,
    tracker: &'s mut TeacherHoursTracker,
    rng: &'s mut R,
    tier: Tier,
    cache: BTreeMap<(String, String), CachedCandidates>,
    tabu: BTreeSet<(String, String, TimeSlot)>,
    history: PlacementHistory,
    analysis: FailureAnalysis,
}

impl<R: Rng + ?Sized> Search<'_, '_, '_, '_, R> {
    fn run(&mut self, cancel: &CancellationToken) -> SearchStatus {
        let engine = self.engine;
        let policy = &engine.policy;
        let floor = policy.floor();
        let mut backtracks_at_tier = 0;

        for iteration in 0..policy.max_iterations {
            if cancel.is_cancelled() {
                return SearchStatus::Cancelled;
            }
            let tasks = self.tasks();
            if tasks.is_empty() {
                return SearchStatus::Complete;
            }
            self.analysis.iterations += 1;

            let context = PriorityContext::at_iteration(iteration)
                .with_strictness(self.tier)
                .with_class_count(engine.finder.checker().catalog().class_count());
            let order = engine.priority.sort_indices(&tasks, &context);

            let mut placed_any = false;
            for index in order {
                let task = &tasks[index];
                self.analysis.attempts += 1;
                match self.try_place(&task.class_id, &task.subject_id) {
                    Attempt::Placed => {
                        self.analysis.successes += 1;
                        placed_any = true;
                    }
                    Attempt::NoCandidate => {
                        self.analysis.record_no_candidate(&task.class_id, &task.subject_id)
                    }
                    Attempt::Conflict => {
                        self.analysis.record_conflict(&task.class_id, &task.subject_id)
                    }
                }
            }
            if placed_any {
                continue;
            }

            if backtracks_at_tier < policy.stalls_before_relax {
                match self.backtrack() {
                    Undo::Undone => {
                        backtracks_at_tier += 1;
                        continue;
                    }
                    Undo::BudgetExhausted => {
                        return SearchStatus::Exhausted {
                            reason: format!(
                                "backtrack budget of {} steps exhausted",
                                policy.max_backtrack_steps
                            ),
                        };
                    }
                    Undo::NothingToUndo => {}
                }
            }

            match self.tier.relaxed().filter(|&next| next >= floor) {
                Some(next) => {
                    debug!(from = %self.tier, to = %next, iteration, "relaxing strictness");
                    self.tier = next;
                    backtracks_at_tier = 0;
                    self.tabu.clear();
                    self.cache.clear();
                }
                None => {
                    return SearchStatus::Exhausted {
                        reason: format!("no placement possible at strictness '{}'", self.tier),
                    };
                }
            }
        }

        if self.backlog().is_empty() {
            SearchStatus::Complete
        } else {
            SearchStatus::Exhausted {
                reason: format!("iteration budget of {} exhausted", policy.max_iterations),
            }
        }
    }

    /// (class, subject, hours missing, hours required), fixed-only
    /// subjects excluded.
    fn backlog(&self) -> Vec<(String, String, u32, u32)> {
        let catalog = self.engine.finder.checker().catalog();
        let mut backlog = Vec::new();
        for class in catalog.classes() {
            for (subject_id, required) in catalog.requirements(&class.id) {
                if catalog.is_fixed_only(subject_id) {
                    continue;
                }
                let placed = self.schedule.subject_hours(&class.id, subject_id);
                if placed < required {
                    backlog.push((class.id.clone(), subject_id.to_string(), required - placed, required));
                }
            }
        }
        backlog
    }

    fn tasks(&mut self) -> Vec<PlacementTask> {
        let engine = self.engine;
        let catalog = engine.finder.checker().catalog();
        let backlog = self.backlog();
        let mut tasks = Vec::with_capacity(backlog.len());
        for (class_id, subject_id, needed, required) in backlog {
            let entry = self.candidates(&class_id, &subject_id);
            let teachers = entry.teachers.clone();
            let co_taught = entry.co_taught;
            let candidate_slots = entry.candidates.len();
            let span = entry.candidates.first().map_or(1, |c| c.span);

            let mut task = PlacementTask::new(class_id.as_str(), subject_id.as_str())
                .with_hours(needed, required)
                .with_candidates(candidate_slots);
            if catalog.is_block(&subject_id) {
                task = task.with_block(span);
            }
            if co_taught {
                task = task.with_co_teaching();
            }
            if let Some(subject) = catalog.subject(&subject_id) {
                task = task.with_subject_priority(subject.priority);
            }
            let grid: usize = self.schedule.layout(&class_id).iter().sum();
            task.teacher_availability = teachers
                .iter()
                .map(|t| {
                    catalog
                        .teacher(t)
                        .and_then(|t| t.available_times.as_ref().map(|set| set.len()))
                        .unwrap_or(grid)
                })
                .collect();
            task.qualified_teachers = catalog.qualified_teachers(&subject_id).len();
            task.class_rank = catalog.class_rank(&class_id);
            task.teachers = teachers;
            task.difficulty = engine.difficulty.difficulty(&task);
            tasks.push(task);
        }
        tasks
    }

    /// Cached teachers and ranked slots of a pair, computed on a miss.
    fn candidates(&mut self, class_id: &str, subject_id: &str) -> &CachedCandidates {
        let key = (class_id.to_string(), subject_id.to_string());
        if !self.cache.contains_key(&key) {
            let entry = self.staff(class_id, subject_id);
            self.cache.insert(key.clone(), entry);
        }
        &self.cache[&key]
    }

    /// Tries lead teachers in preference order and keeps the first one
    /// with open slots at the current tier.
    fn staff(&mut self, class_id: &str, subject_id: &str) -> CachedCandidates {
        let finder = self.engine.finder;
        let catalog = finder.checker().catalog();
        let span = finder.session_span(self.schedule, class_id, subject_id, self.tier);
        let co_taught = catalog.co_teaching_for(class_id, subject_id).is_some()
            || catalog.subject(subject_id).is_some_and(|s| s.requires_co_teaching);

        let mut first = None;
        for lead in self.lead_teachers(class_id, subject_id, span) {
            let candidates = finder.find(
                self.schedule,
                self.tracker,
                class_id,
                subject_id,
                &lead,
                span,
                self.tier,
                &mut *self.rng,
            );
            if !candidates.is_empty() {
                return CachedCandidates {
                    teachers: lead,
                    co_taught,
                    candidates,
                };
            }
            if first.is_none() {
                first = Some(lead);
            }
        }
        CachedCandidates {
            teachers: first.unwrap_or_default(),
            co_taught,
            candidates: Vec::new(),
        }
    }

    fn try_place(&mut self, class_id: &str, subject_id: &str) -> Attempt {
        match self.try_cached(class_id, subject_id) {
            Attempt::Conflict => {
                // Teacher loads may have moved since the entry was cached
                self.cache.remove(&(class_id.to_string(), subject_id.to_string()));
                self.try_cached(class_id, subject_id)
            }
            attempt => attempt,
        }
    }

    fn try_cached(&mut self, class_id: &str, subject_id: &str) -> Attempt {
        let entry = self.candidates(class_id, subject_id).clone();
        let open: Vec<SlotCandidate> = entry
            .candidates
            .into_iter()
            .filter(|c| {
                !self
                    .tabu
                    .contains(&(class_id.to_string(), subject_id.to_string(), c.slot))
            })
            .collect();

        if open.is_empty() {
            let any_free = self.schedule.class_cells(class_id).any(|(_, cell)| cell.is_empty());
            return if any_free {
                Attempt::Conflict
            } else {
                Attempt::NoCandidate
            };
        }

        let engine = self.engine;
        let checker = engine.finder.checker();
        let catalog = checker.catalog();
        let pairing = if entry.co_taught {
            self.pairing(class_id, subject_id, &entry.teachers)
        } else {
            None
        };
        for candidate in open {
            let teachers = match &pairing {
                Some(pairing) => {
                    let base = PlacementRequest::new(class_id, candidate.slot, subject_id, &entry.teachers)
                        .spanning(candidate.span);
                    let teachers = pick_co_teachers(
                        checker,
                        &base,
                        &pairing.pool,
                        pairing.wanted,
                        Some(self.tier),
                        self.schedule,
                        self.tracker,
                    );
                    if teachers.len() == entry.teachers.len() {
                        continue;
                    }
                    teachers
                }
                None => entry.teachers.clone(),
            };
            let request = PlacementRequest::new(class_id, candidate.slot, subject_id, &teachers)
                .spanning(candidate.span);
            let decision = checker.evaluate(self.schedule, self.tracker, &request, self.tier);
            if let Some(rule) = decision.rule() {
                self.analysis.record_denial(rule);
                continue;
            }

            let mut placement = Placement::new(class_id, subject_id, candidate.slot, teachers)
                .spanning(candidate.span)
                .accepted(candidate.score, self.tier);
            if let Some(rule) = catalog.co_teaching_for(class_id, subject_id) {
                placement = placement.with_main_teacher(rule.main_teacher.clone());
            }
            if let Err(err) = placement.apply(self.schedule, self.tracker, catalog) {
                warn!(class = class_id, subject = subject_id, error = %err, "commit refused");
                continue;
            }
            self.history.push(placement);
            self.invalidate(class_id);
            return Attempt::Placed;
        }
        Attempt::Conflict
    }

    fn backtrack(&mut self) -> Undo {
        let engine = self.engine;
        let policy = &engine.policy;
        if self.analysis.backtracks as usize >= policy.max_backtrack_steps {
            return Undo::BudgetExhausted;
        }
        let Some(index) = self.history.pick_undo(policy.backtrack_window) else {
            return Undo::NothingToUndo;
        };
        let Some(placement) = self.history.take(index) else {
            return Undo::NothingToUndo;
        };
        let catalog = engine.finder.checker().catalog();
        if let Err(err) = placement.revert(self.schedule, self.tracker, catalog) {
            warn!(class = %placement.class_id, error = %err, "undo failed");
            return Undo::NothingToUndo;
        }
        debug!(
            class = %placement.class_id,
            subject = %placement.subject_id,
            slot = %placement.slot,
            score = placement.score,
            "backtracked"
        );
        self.analysis.backtracks += 1;
        self.tabu.insert((placement.class_id, placement.subject_id, placement.slot));
        self.cache.clear();
        Undo::Undone
    }

    fn invalidate(&mut self, class_id: &str) {
        self.cache.retain(|(class, _), _| class != class_id);
    }

    /// Lead teacher sets of a pair, best first.
    ///
    /// A co-teaching rule leads with its main teacher. Otherwise each
    /// qualified teacher is a candidate lead: teachers with room under
    /// their caps come first, then a teacher already teaching the subject
    /// in the class, then one with allocation left in the class, then
    /// one uncapped there, least loaded first within each group.
    fn lead_teachers(&self, class_id: &str, subject_id: &str, span: usize) -> Vec<Vec<String>> {
        let catalog = self.engine.finder.checker().catalog();
        if let Some(rule) = catalog.co_teaching_for(class_id, subject_id) {
            return vec![vec![rule.main_teacher.clone()]];
        }

        let continuing: BTreeSet<&String> = self
            .schedule
            .class_cells(class_id)
            .filter_map(|(_, cell)| cell.slot())
            .filter(|lesson| lesson.subject_id == subject_id)
            .filter_map(|lesson| lesson.teachers.first())
            .collect();
        let rank = |teacher_id: &String| {
            let teacher = catalog.teacher(teacher_id);
            let group = if continuing.contains(teacher_id) {
                0
            } else if teacher.is_some_and(|t| t.allocation(class_id) > self.tracker.class_hours(teacher_id, class_id)) {
                1
            } else if teacher.is_some_and(|t| !t.class_hours.contains_key(class_id)) {
                2
            } else {
                3
            };
            (
                !self.has_capacity(teacher_id, class_id, subject_id, span),
                group,
                self.tracker.current(teacher_id),
            )
        };
        let mut leads = catalog.qualified_teachers(subject_id).to_vec();
        leads.sort_by_key(rank);
        leads.into_iter().map(|t| vec![t]).collect()
    }

    /// Whether a teacher can take `span` more periods in a class without
    /// reaching a class, grade or weekly cap.
    fn has_capacity(&self, teacher_id: &str, class_id: &str, subject_id: &str, span: usize) -> bool {
        let catalog = self.engine.finder.checker().catalog();
        if catalog.is_exempt(subject_id) {
            return true;
        }
        let Some(teacher) = catalog.teacher(teacher_id) else {
            return false;
        };
        let span = span as u32;
        let grade = catalog.grade_of(class_id);
        teacher
            .class_hours
            .get(class_id)
            .is_none_or(|&cap| self.tracker.class_hours(teacher_id, class_id) + span <= cap)
            && teacher
                .grade_hours
                .get(&grade)
                .is_none_or(|&cap| self.tracker.grade_hours(teacher_id, grade) + span <= cap)
            && self.tracker.current(teacher_id) + span <= teacher.max_hours_per_week
    }

    /// Co-teacher pool of a pair, lowest participation first with seeded
    /// tie-breaks. `None` when nobody besides the lead could join.
    fn pairing(&mut self, class_id: &str, subject_id: &str, lead: &[String]) -> Option<Pairing> {
        let catalog = self.engine.finder.checker().catalog();
        let (mut pool, wanted, counts) = if let Some(rule) = catalog.co_teaching_for(class_id, subject_id) {
            (rule.secondaries.clone(), rule.secondaries_per_session(), participation(rule, self.schedule))
        } else {
            let pool = catalog.qualified_teachers(subject_id).to_vec();
            let counts: BTreeMap<String, u32> = pool.iter().map(|t| (t.clone(), self.tracker.current(t))).collect();
            (pool, 1, counts)
        };
        pool.retain(|t| !lead.contains(t));
        if pool.is_empty() {
            return None;
        }
        pool.shuffle(&mut *self.rng);
        pool.sort_by_key(|t| counts.get(t).copied().unwrap_or(0));
        Some(Pairing { pool, wanted })
    }
}
