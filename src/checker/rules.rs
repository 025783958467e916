//! Rule implementations, one method per tier.

use crate::catalog::{Catalog, DailyLimitRule, DailyOnceRule};
use crate::config::CheckerConfig;
use crate::models::{Schedule, TeacherHoursTracker, TimeSlot};

use super::{Denial, PlacementRequest, Rule, Tier};

type Check = Result<(), Denial>;

pub(super) struct RuleContext<'c, 'r> {
    pub catalog: &'c Catalog,
    pub config: &'c CheckerConfig,
    pub schedule: &'c Schedule,
    pub tracker: &'c TeacherHoursTracker,
    pub request: &'c PlacementRequest<'r>,
}

impl RuleContext<'_, '_> {
    fn deny(&self, rule: Rule, tier: Tier, detail: String) -> Check {
        Err(Denial::new(rule, tier, detail))
    }

    /// Cell occupancy and double booking only.
    pub(super) fn physical(&self) -> Check {
        self.cells_free()?;
        self.no_double_booking()
    }

    pub(super) fn critical(&self) -> Check {
        self.physical()?;
        self.teachers_available()?;
        self.no_excluded_partner()
    }

    pub(super) fn high(&self) -> Check {
        self.consecutive_limit()?;
        if !self.catalog.is_exempt(self.request.subject_id) {
            self.teacher_caps()?;
        }
        self.class_weekly_cap()?;
        self.class_daily_cap()?;
        self.space_limit()
    }

    pub(super) fn medium(&self) -> Check {
        self.block_pairing()?;
        self.sequential_grades()?;
        self.daily_rules(true, Tier::Medium)
    }

    pub(super) fn low(&self) -> Check {
        let req = self.request;
        if self.catalog.is_fixed_only(req.subject_id) {
            return self.deny(
                Rule::FixedOnly,
                Tier::Low,
                format!("subject '{}' may only be pinned", req.subject_id),
            );
        }
        self.daily_rules(false, Tier::Low)
    }

    fn cells_free(&self) -> Check {
        let req = self.request;
        for slot in req.slots() {
            if !self.schedule.is_free(req.class_id, slot) {
                let detail = if self.schedule.in_bounds(req.class_id, slot) {
                    format!("cell {slot} of class '{}' is occupied", req.class_id)
                } else {
                    format!("{slot} is outside the layout of class '{}'", req.class_id)
                };
                return self.deny(Rule::CellOccupied, Tier::Critical, detail);
            }
        }
        Ok(())
    }

    fn no_double_booking(&self) -> Check {
        let req = self.request;
        for slot in req.slots() {
            for teacher_id in req.teachers {
                let busy_in = self.schedule.classes_of_teacher_at(teacher_id, slot);
                if busy_in.is_empty() {
                    continue;
                }
                let parallel_ok = self
                    .catalog
                    .teacher(teacher_id)
                    .is_some_and(|t| t.allow_parallel)
                    && busy_in.iter().all(|c| {
                        self.schedule
                            .lesson(c, slot)
                            .is_some_and(|l| l.subject_id == req.subject_id)
                    });
                if !parallel_ok {
                    return self.deny(
                        Rule::TeacherDoubleBooked,
                        Tier::Critical,
                        format!("teacher '{teacher_id}' already teaches '{}' at {slot}", busy_in[0]),
                    );
                }
            }
        }
        Ok(())
    }

    fn teachers_available(&self) -> Check {
        let req = self.request;
        for slot in req.slots() {
            for teacher_id in req.teachers {
                let Some(teacher) = self.catalog.teacher(teacher_id) else {
                    continue;
                };
                if !teacher.is_available_at(slot) {
                    return self.deny(
                        Rule::TeacherUnavailable,
                        Tier::Critical,
                        format!("teacher '{teacher_id}' is unavailable at {slot}"),
                    );
                }
            }
        }
        Ok(())
    }

    fn no_excluded_partner(&self) -> Check {
        let req = self.request;
        for slot in req.slots() {
            for teacher_id in req.teachers {
                for partner in self.catalog.exclusions_of(teacher_id) {
                    if self.schedule.is_teacher_busy(partner, slot) {
                        return self.deny(
                            Rule::MutualExclusion,
                            Tier::Critical,
                            format!("teacher '{teacher_id}' excludes '{partner}', who teaches at {slot}"),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn consecutive_limit(&self) -> Check {
        let max = self.config.max_consecutive_periods;
        if max == 0 {
            return Ok(());
        }
        let req = self.request;
        let day = req.slot.day;
        for teacher_id in req.teachers {
            let mut periods: Vec<usize> = self
                .schedule
                .teacher_day(teacher_id, day)
                .into_iter()
                .map(|(p, _)| p)
                .chain(req.slots().map(|s| s.period))
                .collect();
            periods.sort_unstable();
            periods.dedup();
            let run = longest_run_through(&periods, req.slot.period);
            if run > max {
                return self.deny(
                    Rule::ConsecutiveLimit,
                    Tier::High,
                    format!("teacher '{teacher_id}' would teach {run} periods in a row on day {day}"),
                );
            }
        }
        Ok(())
    }

    fn teacher_caps(&self) -> Check {
        let req = self.request;
        let span = req.span as u32;
        let grade = self.catalog.grade_of(req.class_id);
        for teacher_id in req.teachers {
            let Some(teacher) = self.catalog.teacher(teacher_id) else {
                continue;
            };
            if let Some(&cap) = teacher.class_hours.get(req.class_id) {
                let taught = self.tracker.class_hours(teacher_id, req.class_id);
                if taught + span > cap {
                    return self.deny(
                        Rule::TeacherClassCap,
                        Tier::High,
                        format!("teacher '{teacher_id}' has {taught}/{cap} hours in class '{}'", req.class_id),
                    );
                }
            }
            if let Some(&cap) = teacher.grade_hours.get(&grade) {
                let taught = self.tracker.grade_hours(teacher_id, grade);
                if taught + span > cap {
                    return self.deny(
                        Rule::TeacherGradeCap,
                        Tier::High,
                        format!("teacher '{teacher_id}' has {taught}/{cap} hours in grade {grade}"),
                    );
                }
            }
            let current = self.tracker.current(teacher_id);
            if current + span > teacher.max_hours_per_week {
                return self.deny(
                    Rule::TeacherWeeklyMax,
                    Tier::High,
                    format!(
                        "teacher '{teacher_id}' has {current}/{} weekly hours",
                        teacher.max_hours_per_week
                    ),
                );
            }
        }
        Ok(())
    }

    fn class_weekly_cap(&self) -> Check {
        let req = self.request;
        let Some(cap) = self.catalog.weekly_cap(req.class_id) else {
            return Ok(());
        };
        let load: usize = (0..self.schedule.day_count(req.class_id))
            .map(|day| self.schedule.class_day_load(req.class_id, day))
            .sum();
        if load + req.span > cap as usize {
            return self.deny(
                Rule::ClassWeeklyCap,
                Tier::High,
                format!("class '{}' has {load}/{cap} weekly lessons", req.class_id),
            );
        }
        Ok(())
    }

    fn class_daily_cap(&self) -> Check {
        let req = self.request;
        let day = req.slot.day;
        let cap = self.catalog.daily_cap(req.class_id, day);
        let load = self.schedule.class_day_load(req.class_id, day);
        if load + req.span > cap {
            return self.deny(
                Rule::ClassDailyCap,
                Tier::High,
                format!("class '{}' has {load}/{cap} lessons on day {day}", req.class_id),
            );
        }
        Ok(())
    }

    fn space_limit(&self) -> Check {
        let req = self.request;
        let Some(limit) = self
            .catalog
            .subject(req.subject_id)
            .and_then(|s| s.max_concurrent_classes)
        else {
            return Ok(());
        };
        for slot in req.slots() {
            let concurrent = self.schedule.classes_with_subject_at(req.subject_id, slot);
            if concurrent + 1 > limit as usize {
                return self.deny(
                    Rule::SpaceLimit,
                    Tier::High,
                    format!("'{}' already runs in {concurrent} class(es) at {slot}", req.subject_id),
                );
            }
        }
        Ok(())
    }

    fn block_pairing(&self) -> Check {
        let req = self.request;
        if !self.catalog.is_block(req.subject_id) {
            return Ok(());
        }
        if req.span >= 2 {
            if !req.slot.is_block_start() {
                return self.deny(
                    Rule::BlockPairing,
                    Tier::Medium,
                    format!("block '{}' cannot start on even period {}", req.subject_id, req.slot.period),
                );
            }
            return Ok(());
        }
        let required = self.catalog.required_hours(req.class_id, req.subject_id);
        let placed = self.schedule.subject_hours(req.class_id, req.subject_id);
        if required.saturating_sub(placed) >= 2 {
            return self.deny(
                Rule::BlockPairing,
                Tier::Medium,
                format!("block '{}' needs two consecutive periods", req.subject_id),
            );
        }
        Ok(())
    }

    fn sequential_grades(&self) -> Check {
        let req = self.request;
        let day = req.slot.day;
        let grade = self.catalog.grade_of(req.class_id);
        for teacher_id in req.teachers {
            let flagged = self
                .catalog
                .teacher(teacher_id)
                .is_some_and(|t| t.sequential_grade_teaching);
            if !flagged {
                continue;
            }
            let mut day_plan: Vec<(usize, u8)> = self
                .schedule
                .teacher_day(teacher_id, day)
                .into_iter()
                .map(|(p, class_id)| (p, self.catalog.grade_of(class_id)))
                .chain(req.slots().map(|s| (s.period, grade)))
                .collect();
            day_plan.sort_unstable();
            if interleaves(day_plan.iter().map(|&(_, g)| g)) {
                return self.deny(
                    Rule::SequentialGrade,
                    Tier::Medium,
                    format!("teacher '{teacher_id}' would interleave grades on day {day}"),
                );
            }
        }
        Ok(())
    }

    fn daily_rules(&self, must: bool, tier: Tier) -> Check {
        for rule in self.catalog.daily_once_rules().iter().filter(|r| r.must == must) {
            self.daily_once(rule, tier)?;
        }
        for rule in self.catalog.daily_limit_rules().iter().filter(|r| r.must == must) {
            self.daily_limit(rule, tier)?;
        }
        Ok(())
    }

    fn daily_once(&self, rule: &DailyOnceRule, tier: Tier) -> Check {
        let req = self.request;
        if rule.subject.as_deref().is_some_and(|s| s != req.subject_id) {
            return Ok(());
        }
        let day = req.slot.day;
        let periods = self.schedule.periods_on(req.class_id, day);
        let already = (1..=periods).any(|p| {
            self.schedule
                .lesson(req.class_id, TimeSlot::new(day, p))
                .is_some_and(|l| l.subject_id == req.subject_id)
        });
        if already {
            return self.deny(
                Rule::DailySubjectOnce,
                tier,
                format!("class '{}' already has '{}' on day {day}", req.class_id, req.subject_id),
            );
        }
        Ok(())
    }

    fn daily_limit(&self, rule: &DailyLimitRule, tier: Tier) -> Check {
        let req = self.request;
        let day = req.slot.day;
        for teacher_id in req.teachers {
            if rule.teacher.as_deref().is_some_and(|t| t != teacher_id) {
                continue;
            }
            let sessions = self
                .schedule
                .teacher_day(teacher_id, day)
                .into_iter()
                .filter(|&(p, class_id)| {
                    class_id == req.class_id && !self.is_block_tail(class_id, TimeSlot::new(day, p))
                })
                .count() as u32;
            if sessions + 1 > rule.max_per_day {
                return self.deny(
                    Rule::TeacherSameClassDailyLimit,
                    tier,
                    format!(
                        "teacher '{teacher_id}' already has {sessions} session(s) with class '{}' on day {day}",
                        req.class_id
                    ),
                );
            }
        }
        Ok(())
    }

    /// Second half of a block (counted with its first half).
    fn is_block_tail(&self, class_id: &str, slot: TimeSlot) -> bool {
        self.schedule.lesson(class_id, slot).is_some_and(|l| {
            l.is_block_period && l.block_partner == Some(slot.period.saturating_sub(1))
        })
    }
}

/// Length of the run of consecutive periods containing `period`.
///
/// `periods` must be sorted and deduplicated.
pub(crate) fn longest_run_through(periods: &[usize], period: usize) -> usize {
    let Some(pos) = periods.iter().position(|&p| p == period) else {
        return 0;
    };
    let mut start = pos;
    while start > 0 && periods[start - 1] + 1 == periods[start] {
        start -= 1;
    }
    let mut end = pos;
    while end + 1 < periods.len() && periods[end] + 1 == periods[end + 1] {
        end += 1;
    }
    end - start + 1
}

/// Whether a grade reappears after another grade was taught in between.
pub(crate) fn interleaves(grades: impl Iterator<Item = u8>) -> bool {
    let mut seen = Vec::new();
    for grade in grades {
        if seen.last() == Some(&grade) {
            continue;
        }
        if seen.contains(&grade) {
            return true;
        }
        seen.push(grade);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_run_through() {
        let periods = [1, 2, 3, 5, 6];
        assert_eq!(longest_run_through(&periods, 2), 3);
        assert_eq!(longest_run_through(&periods, 6), 2);
        assert_eq!(longest_run_through(&periods, 4), 0);
    }

    #[test]
    fn test_interleaves() {
        assert!(!interleaves([1, 1, 2, 2, 3].into_iter()));
        assert!(interleaves([1, 2, 1].into_iter()));
        assert!(!interleaves(std::iter::empty()));
    }
}
