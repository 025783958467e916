//! Candidate slot enumeration and ranking.
//!
//! For a (class, teachers, subject) request the finder lists every start
//! slot where the lesson fits at the requested strictness, then ranks
//! them:
//!
//! - mid-morning periods first (distance from period 3),
//! - earlier weekdays first,
//! - slots every teacher declared as available get a bonus.
//!
//! Candidates are shuffled with the caller's seeded RNG before the stable
//! ranking sort, so equally ranked slots vary between attempts but a
//! given seed always yields the same order.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::checker::{ConstraintChecker, PlacementRequest, Tier};
use crate::models::{Schedule, TeacherHoursTracker, TimeSlot};

/// Preferred period for ranking.
const PREFERRED_PERIOD: usize = 3;

/// Ranking weights.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingWeights {
    /// Penalty per period away from the preferred period.
    pub period_distance: f64,
    /// Penalty per weekday index.
    pub day: f64,
    /// Bonus when all teachers declared the slot available.
    pub declared_available: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            period_distance: 1.0,
            day: 0.5,
            declared_available: 2.0,
        }
    }
}

/// A ranked start slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCandidate {
    /// First period of the lesson.
    pub slot: TimeSlot,
    /// Periods covered.
    pub span: usize,
    /// Ranking score (higher = better).
    pub score: f64,
}

/// Enumerates and ranks open slots.
#[derive(Debug, Clone)]
pub struct SlotFinder<'a> {
    checker: ConstraintChecker<'a>,
    weights: RankingWeights,
}

impl<'a> SlotFinder<'a> {
    /// Creates a finder with default ranking weights.
    pub fn new(checker: ConstraintChecker<'a>) -> Self {
        Self {
            checker,
            weights: RankingWeights::default(),
        }
    }

    /// Sets the ranking weights.
    pub fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    /// The underlying checker.
    pub fn checker(&self) -> &ConstraintChecker<'a> {
        &self.checker
    }

    /// Periods the next session of `subject_id` should cover.
    ///
    /// Block subjects take two periods while at least two hours remain and
    /// block pairing is enforced at `strictness`.
    pub fn session_span(
        &self,
        schedule: &Schedule,
        class_id: &str,
        subject_id: &str,
        strictness: Tier,
    ) -> usize {
        let catalog = self.checker.catalog();
        if !catalog.is_block(subject_id) || strictness < Tier::Medium {
            return 1;
        }
        let required = catalog.required_hours(class_id, subject_id);
        let placed = schedule.subject_hours(class_id, subject_id);
        if required.saturating_sub(placed) >= 2 {
            2
        } else {
            1
        }
    }

    /// Ranked start slots passing every rule up to `strictness`.
    #[allow(clippy::too_many_arguments)]
    pub fn find<R: Rng + ?Sized>(
        &self,
        schedule: &Schedule,
        tracker: &TeacherHoursTracker,
        class_id: &str,
        subject_id: &str,
        teachers: &[String],
        span: usize,
        strictness: Tier,
        rng: &mut R,
    ) -> Vec<SlotCandidate> {
        let candidates = self.open_starts(schedule, class_id, span).filter(|&slot| {
            let request = PlacementRequest::new(class_id, slot, subject_id, teachers).spanning(span);
            self.checker
                .evaluate(schedule, tracker, &request, strictness)
                .is_allowed()
        });
        self.rank(candidates.collect(), span, teachers, rng)
    }

    /// Ranked start slots where the cells are free and no teacher is
    /// double-booked. Every other rule is ignored.
    pub fn find_emergency<R: Rng + ?Sized>(
        &self,
        schedule: &Schedule,
        class_id: &str,
        subject_id: &str,
        teachers: &[String],
        span: usize,
        rng: &mut R,
    ) -> Vec<SlotCandidate> {
        let candidates = self.open_starts(schedule, class_id, span).filter(|&slot| {
            let request = PlacementRequest::new(class_id, slot, subject_id, teachers).spanning(span);
            self.checker.evaluate_emergency(schedule, &request).is_allowed()
        });
        self.rank(candidates.collect(), span, teachers, rng)
    }

    fn open_starts<'s>(
        &self,
        schedule: &'s Schedule,
        class_id: &'s str,
        span: usize,
    ) -> impl Iterator<Item = TimeSlot> + 's {
        let span = span.max(1);
        (0..schedule.day_count(class_id)).flat_map(move |day| {
            let periods = schedule.periods_on(class_id, day);
            (1..=periods.saturating_sub(span - 1))
                .map(move |period| TimeSlot::new(day, period))
                .filter(move |&start| {
                    (0..span).all(|i| schedule.is_free(class_id, TimeSlot::new(day, start.period + i)))
                })
        })
    }

    fn rank<R: Rng + ?Sized>(
        &self,
        mut slots: Vec<TimeSlot>,
        span: usize,
        teachers: &[String],
        rng: &mut R,
    ) -> Vec<SlotCandidate> {
        slots.shuffle(rng);
        let mut ranked: Vec<SlotCandidate> = slots
            .into_iter()
            .map(|slot| SlotCandidate {
                slot,
                span,
                score: self.score(slot, span, teachers),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    fn score(&self, slot: TimeSlot, span: usize, teachers: &[String]) -> f64 {
        let catalog = self.checker.catalog();
        let distance = slot.period.abs_diff(PREFERRED_PERIOD) as f64;
        let mut score = -distance * self.weights.period_distance - slot.day as f64 * self.weights.day;
        let declared = !teachers.is_empty()
            && teachers.iter().all(|t| {
                catalog.teacher(t).is_some_and(|teacher| {
                    (0..span).all(|i| {
                        teacher.declares_available(TimeSlot::new(slot.day, slot.period + i))
                    })
                })
            });
        if declared {
            score += self.weights.declared_available;
        }
        score
    }
}
