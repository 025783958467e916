//! Cell wire shape for export and UI collaborators.
//!
//! A schedule serializes as `class id → days → periods`, each cell either
//! `null` or
//!
//! ```json
//! { "subject": "math", "teachers": ["M1"], "isCoTeaching": false,
//!   "isFixed": false, "isBlockPeriod": false }
//! ```
//!
//! Readers also accept the legacy shape where a cell is a bare teacher
//! name string (an empty string is an empty cell). Writers only produce
//! the structured shape. Legacy input is normalized into [`Cell`]s here
//! and nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::error::CellError;
use crate::models::{Cell, Schedule, ScheduleSlot, SlotSource, TimeSlot};

/// Errors from reading a wire schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A cell could not be written into the grid.
    #[error("invalid schedule cell: {0}")]
    Cell(#[from] CellError),

    /// A structured cell without teachers.
    #[error("cell {slot} of class '{class_id}' has no teacher")]
    NoTeacher { class_id: String, slot: TimeSlot },
}

/// Structured occupied cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSlot {
    /// Subject id.
    pub subject: String,
    /// Teachers, main teacher first.
    pub teachers: Vec<String>,
    /// Taught by more than one teacher.
    #[serde(default)]
    pub is_co_teaching: bool,
    /// Pinned lesson.
    #[serde(default)]
    pub is_fixed: bool,
    /// Half of a two-period block.
    #[serde(default)]
    pub is_block_period: bool,
    /// Provenance tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SlotSource>,
    /// Main teacher of a co-teaching pairing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_teacher: Option<String>,
}

/// A cell as read from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireCell {
    /// Structured shape.
    Slot(WireSlot),
    /// Legacy bare teacher name.
    Legacy(String),
}

/// Wire form of a [`Schedule`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireSchedule {
    /// class id → days → periods.
    pub classes: BTreeMap<String, Vec<Vec<Option<WireCell>>>>,
}

impl From<&ScheduleSlot> for WireSlot {
    fn from(lesson: &ScheduleSlot) -> Self {
        Self {
            subject: lesson.subject_id.clone(),
            teachers: lesson.teachers.clone(),
            is_co_teaching: lesson.is_co_teaching,
            is_fixed: lesson.source == SlotSource::Fixed,
            is_block_period: lesson.is_block_period,
            source: Some(lesson.source),
            main_teacher: lesson.main_teacher.clone(),
        }
    }
}

impl From<Schedule> for WireSchedule {
    fn from(schedule: Schedule) -> Self {
        WireSchedule::from(&schedule)
    }
}

impl From<&Schedule> for WireSchedule {
    fn from(schedule: &Schedule) -> Self {
        let classes = schedule
            .class_ids()
            .map(|class_id| {
                let days = schedule
                    .layout(class_id)
                    .iter()
                    .enumerate()
                    .map(|(day, &periods)| {
                        (1..=periods)
                            .map(|period| {
                                let cell = schedule.cell(class_id, TimeSlot::new(day, period));
                                cell.and_then(wire_cell)
                            })
                            .collect()
                    })
                    .collect();
                (class_id.to_string(), days)
            })
            .collect();
        Self { classes }
    }
}

fn wire_cell(cell: &Cell) -> Option<WireCell> {
    let lesson = cell.slot()?;
    let mut slot = WireSlot::from(lesson);
    slot.is_fixed = cell.is_fixed();
    Some(WireCell::Slot(slot))
}

impl TryFrom<WireSchedule> for Schedule {
    type Error = WireError;

    fn try_from(wire: WireSchedule) -> Result<Self, Self::Error> {
        let mut schedule = Schedule::new();
        for (class_id, days) in wire.classes {
            let layout: Vec<usize> = days.iter().map(Vec::len).collect();
            schedule.add_class(class_id.clone(), &layout);
            for (day, periods) in days.into_iter().enumerate() {
                for (index, cell) in periods.into_iter().enumerate() {
                    let slot = TimeSlot::new(day, index + 1);
                    let Some((lesson, fixed)) = read_cell(&class_id, slot, cell)? else {
                        continue;
                    };
                    if fixed {
                        schedule.pin(&class_id, slot, lesson)?;
                    } else {
                        schedule.place(&class_id, slot, lesson)?;
                    }
                }
            }
        }
        Ok(schedule)
    }
}

fn read_cell(
    class_id: &str,
    slot: TimeSlot,
    cell: Option<WireCell>,
) -> Result<Option<(ScheduleSlot, bool)>, WireError> {
    match cell {
        None => Ok(None),
        Some(WireCell::Legacy(name)) if name.trim().is_empty() => Ok(None),
        Some(WireCell::Legacy(name)) => Ok(Some((
            ScheduleSlot::new(String::new(), name.trim(), SlotSource::Search),
            false,
        ))),
        Some(WireCell::Slot(wire)) => {
            if wire.teachers.is_empty() {
                return Err(WireError::NoTeacher {
                    class_id: class_id.to_string(),
                    slot,
                });
            }
            let source = wire.source.unwrap_or(if wire.is_fixed {
                SlotSource::Fixed
            } else {
                SlotSource::Search
            });
            let mut lesson = ScheduleSlot::with_teachers(wire.subject, wire.teachers, source);
            lesson.is_co_teaching = wire.is_co_teaching;
            if wire.is_block_period {
                let partner = if slot.is_block_start() {
                    slot.period + 1
                } else {
                    slot.period - 1
                };
                lesson = lesson.as_block(partner);
            }
            if let Some(main) = wire.main_teacher {
                lesson = lesson.with_main_teacher(main);
            }
            Ok(Some((lesson, wire.is_fixed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Schedule {
        let mut s = Schedule::new().with_class("1-1", &[3, 2]);
        s.pin("1-1", TimeSlot::new(0, 1), ScheduleSlot::new("ethics", "E1", SlotSource::Fixed))
            .unwrap();
        s.place(
            "1-1",
            TimeSlot::new(0, 2),
            ScheduleSlot::with_teachers("english", vec!["T1".into(), "T2".into()], SlotSource::Constraint)
                .with_main_teacher("T1"),
        )
        .unwrap();
        s.place("1-1", TimeSlot::new(1, 1), ScheduleSlot::new("science", "S1", SlotSource::Search).as_block(2))
            .unwrap();
        s.place("1-1", TimeSlot::new(1, 2), ScheduleSlot::new("science", "S1", SlotSource::Search).as_block(1))
            .unwrap();
        s
    }

    #[test]
    fn test_structured_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        let day0 = &value["1-1"][0];
        assert_eq!(day0[0]["subject"], "ethics");
        assert_eq!(day0[0]["isFixed"], true);
        assert_eq!(day0[1]["isCoTeaching"], true);
        assert_eq!(day0[1]["teachers"], json!(["T1", "T2"]));
        assert!(day0[2].is_null());
        assert_eq!(value["1-1"][1][1]["isBlockPeriod"], true);
    }

    #[test]
    fn test_round_trip() {
        let schedule = sample();
        let json = serde_json::to_string(&schedule).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schedule);
        assert!(back.cell("1-1", TimeSlot::new(0, 1)).unwrap().is_fixed());
        assert_eq!(back.lesson("1-1", TimeSlot::new(1, 2)).unwrap().block_partner, Some(1));
    }

    #[test]
    fn test_legacy_strings() {
        let value = json!({
            "1-1": [["M1", "", null], [{"subject": "pe", "teachers": ["P1"]}]]
        });
        let schedule: Schedule = serde_json::from_value(value).unwrap();
        let legacy = schedule.lesson("1-1", TimeSlot::new(0, 1)).unwrap();
        assert_eq!(legacy.teachers, vec!["M1".to_string()]);
        assert!(legacy.subject_id.is_empty());
        assert!(schedule.is_free("1-1", TimeSlot::new(0, 2)));
        assert!(schedule.is_free("1-1", TimeSlot::new(0, 3)));
        assert!(schedule.is_teacher_busy("P1", TimeSlot::new(1, 1)));

        // Written back in the structured shape only
        let out = serde_json::to_value(&schedule).unwrap();
        assert_eq!(out["1-1"][0][0]["teachers"], json!(["M1"]));
    }

    #[test]
    fn test_teacherless_cell_rejected() {
        let value = json!({ "1-1": [[{"subject": "pe", "teachers": []}]] });
        assert!(serde_json::from_value::<Schedule>(value).is_err());
    }
}
