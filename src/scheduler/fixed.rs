//! Pinned lesson placement.

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::CellError;
use crate::models::{FixedClass, Schedule, ScheduleSlot, SlotSource, TeacherHoursTracker};

/// Why a pinned lesson was not placed.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedRejection {
    /// The class is disabled (weekly cap of zero).
    ClassDisabled,
    /// The grid refused the cell.
    Cell(CellError),
}

/// Result of the pinning phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedOutcome {
    /// Lessons pinned.
    pub applied: usize,
    /// Lessons skipped, with the reason.
    pub rejected: Vec<(FixedClass, FixedRejection)>,
}

/// Pins every fixed lesson of the catalog.
///
/// Rejections are logged and skipped; an occupied cell is never
/// overwritten.
pub fn apply_fixed(
    catalog: &Catalog,
    schedule: &mut Schedule,
    tracker: &mut TeacherHoursTracker,
) -> FixedOutcome {
    let mut outcome = FixedOutcome::default();
    for fixed in catalog.fixed_classes() {
        if catalog.is_disabled(&fixed.class_id) {
            warn!(class = %fixed.class_id, slot = %fixed.slot, "fixed lesson in disabled class skipped");
            outcome.rejected.push((fixed.clone(), FixedRejection::ClassDisabled));
            continue;
        }
        let teachers = fixed.teachers();
        let lesson = ScheduleSlot::with_teachers(fixed.subject_id.clone(), teachers.clone(), SlotSource::Fixed);
        if let Err(err) = schedule.pin(&fixed.class_id, fixed.slot, lesson) {
            warn!(class = %fixed.class_id, slot = %fixed.slot, error = %err, "fixed lesson rejected");
            outcome.rejected.push((fixed.clone(), FixedRejection::Cell(err)));
            continue;
        }
        if !catalog.is_exempt(&fixed.subject_id) {
            let lesson = catalog.lesson_ref(&fixed.class_id, &fixed.subject_id);
            for teacher in &teachers {
                tracker.add(teacher, lesson);
            }
        }
        outcome.applied += 1;
    }
    info!(
        applied = outcome.applied,
        rejected = outcome.rejected.len(),
        "fixed lessons pinned"
    );
    outcome
}
