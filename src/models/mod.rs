//! Timetable domain models.
//!
//! Provides the data types describing a school timetable problem (classes,
//! teachers, subjects, constraints, pinned lessons) and its solution (the
//! schedule grid and the teacher load tracker).
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling term |
//! |-------------|-----------------|
//! | ClassUnit | Job family / consumer |
//! | Teacher | Human resource |
//! | Subject | Activity type with weekly demand |
//! | TimeSlot | Discrete time bucket |
//! | Schedule | Solution grid |

mod class_unit;
mod constraint;
mod data;
mod fixed_class;
mod schedule;
mod slot;
mod subject;
mod teacher;
mod tracker;

pub use class_unit::ClassUnit;
pub use constraint::{Constraint, ConstraintSets};
pub use data::{BaseConfig, TimetableData};
pub use fixed_class::FixedClass;
pub use schedule::Schedule;
pub use slot::{Cell, ScheduleSlot, SlotSource, TimeSlot};
pub use subject::{Subject, CREATIVE_ACTIVITY};
pub use teacher::Teacher;
pub use tracker::{LessonRef, TeacherHoursTracker, TeacherLoad};
