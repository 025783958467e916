//! Emergency completion pass.
//!
//! Fills every cell the search left empty, ignoring all rules except
//! teacher double booking. A cell first tries every subject of the class
//! with a qualified teacher, short subjects first (tagged
//! [`SlotSource::Emergency`]); failing that, any free teacher takes the
//! most-needed subject (tagged
//! [`SlotSource::EmergencyFallback`]). Existing lessons are never touched.

use tracing::{info, warn};

use super::history::Placement;
use crate::catalog::Catalog;
use crate::models::{Schedule, SlotSource, TeacherHoursTracker, TimeSlot};

/// What the emergency pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmergencyReport {
    /// Cells filled with a qualified teacher.
    pub qualified: usize,
    /// Cells filled with any free teacher.
    pub fallback: usize,
    /// Cells left empty (no teacher free at all).
    pub unfilled: usize,
}

impl EmergencyReport {
    /// Cells filled by the pass.
    pub fn filled(&self) -> usize {
        self.qualified + self.fallback
    }
}

/// Fills the remaining empty cells of a schedule.
pub fn emergency_fill(
    catalog: &Catalog,
    schedule: &mut Schedule,
    tracker: &mut TeacherHoursTracker,
) -> EmergencyReport {
    let mut report = EmergencyReport::default();
    let class_ids: Vec<String> = catalog.classes().map(|c| c.id.clone()).collect();

    for class_id in &class_ids {
        let empty: Vec<TimeSlot> = schedule
            .class_cells(class_id)
            .filter(|(_, cell)| cell.is_empty())
            .map(|(slot, _)| slot)
            .collect();
        for slot in empty {
            let Some((subject_id, teacher_id, source)) = pick(catalog, schedule, tracker, class_id, slot)
            else {
                report.unfilled += 1;
                continue;
            };
            let placement = Placement::new(class_id.as_str(), subject_id.as_str(), slot, vec![teacher_id.clone()])
                .with_source(source);
            if let Err(err) = placement.apply(schedule, tracker, catalog) {
                warn!(class = %class_id, slot = %slot, error = %err, "emergency placement refused");
                report.unfilled += 1;
                continue;
            }
            warn!(
                class = %class_id,
                slot = %slot,
                subject = %subject_id,
                teacher = %teacher_id,
                source = ?source,
                "emergency placement"
            );
            match source {
                SlotSource::EmergencyFallback => report.fallback += 1,
                _ => report.qualified += 1,
            }
        }
    }

    info!(
        qualified = report.qualified,
        fallback = report.fallback,
        unfilled = report.unfilled,
        "emergency fill finished"
    );
    report
}

/// Subject, teacher and tag for one empty cell.
fn pick(
    catalog: &Catalog,
    schedule: &Schedule,
    tracker: &TeacherHoursTracker,
    class_id: &str,
    slot: TimeSlot,
) -> Option<(String, String, SlotSource)> {
    // Short subjects first (most missing), then the rest by weekly hours
    let mut subjects: Vec<(&str, u32, u32)> = catalog
        .requirements(class_id)
        .filter(|&(s, required)| required > 0 && !catalog.is_fixed_only(s))
        .map(|(s, required)| (s, required.saturating_sub(schedule.subject_hours(class_id, s)), required))
        .collect();
    subjects.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)).then_with(|| a.0.cmp(b.0)));

    let free = |teacher_id: &&String| !schedule.is_teacher_busy(teacher_id, slot);

    for &(subject_id, _, _) in &subjects {
        let teacher = catalog
            .qualified_teachers(subject_id)
            .iter()
            .filter(free)
            .min_by_key(|t| tracker.current(t));
        if let Some(teacher) = teacher {
            return Some((subject_id.to_string(), teacher.clone(), SlotSource::Emergency));
        }
    }

    let subject_id = subjects
        .first()
        .map(|&(s, _, _)| s)
        .or_else(|| catalog.requirements(class_id).map(|(s, _)| s).next())?;
    let teacher_ids: Vec<String> = catalog.teachers().map(|t| t.id.clone()).collect();
    let teacher = teacher_ids
        .iter()
        .filter(free)
        .min_by_key(|t| tracker.current(t))?;
    Some((subject_id.to_string(), teacher.clone(), SlotSource::EmergencyFallback))
}
