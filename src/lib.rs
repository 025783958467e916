//! School timetable generation engine.
//!
//! Assigns (subject, teachers) occupants to (class, weekday, period) cells
//! so that every class receives its required weekly hours while teacher
//! availability, load and pairing rules hold.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ClassUnit`, `Teacher`, `Subject`,
//!   `Constraint`, `FixedClass`, `Schedule`, `TeacherHoursTracker`
//! - **`validation`**: Up-front input feasibility checks (duplicate ids,
//!   dangling references, malformed constraints)
//! - **`catalog`**: Indexed view of a validated input
//! - **`checker`**: Tiered single-placement rule evaluation
//! - **`slots`**: Candidate slot enumeration and ranking
//! - **`priority`**: Most-constrained-first task ordering
//! - **`scheduler`**: Generation pipeline (pinning, co-teaching, search,
//!   emergency fill) and the repeat-until-best loop
//! - **`report`**: Validation, quality score and fill statistics
//! - **`wire`**: Cell wire shape with legacy-string reading
//!
//! # Example
//!
//! ```
//! use u_timetable::{
//!     AutoConfig, AutoGenerator, BaseConfig, CancellationToken, Subject, Teacher, TimetableData,
//! };
//!
//! let data = TimetableData::new(BaseConfig::new(vec![2, 2]).with_grade(1, 1))
//!     .with_subject(Subject::new("math", 2))
//!     .with_subject(Subject::new("korean", 2))
//!     .with_teacher(Teacher::new("M1").with_subject("math"))
//!     .with_teacher(Teacher::new("K1").with_subject("korean"));
//!
//! let outcome = AutoGenerator::new(AutoConfig::new())
//!     .run(&data, &CancellationToken::new(), |_| {})
//!     .unwrap();
//! assert_eq!(outcome.best_fill_rate(), 1.0);
//! ```
//!
//! # Architecture
//!
//! Single-threaded and synchronous. Each attempt exclusively owns its
//! schedule, tracker and placement log; the crate performs no I/O and
//! installs no `tracing` subscriber.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Pillay (2014), "A survey of school timetabling research"

pub mod catalog;
pub mod checker;
pub mod config;
pub mod error;
pub mod models;
pub mod priority;
pub mod report;
pub mod scheduler;
pub mod slots;
pub mod validation;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use catalog::Catalog;
pub use checker::{ConstraintChecker, Decision, Denial, PlacementRequest, Rule, Tier};
pub use config::{AutoConfig, CheckerConfig, GenerationConfig, QualityConfig, SearchPolicy};
pub use error::{CellError, GenerationError, Result};
pub use models::{
    BaseConfig, Cell, ClassUnit, Constraint, FixedClass, Schedule, ScheduleSlot, SlotSource,
    Subject, Teacher, TeacherHoursTracker, TimeSlot, TimetableData,
};
pub use report::{QualityScore, ScheduleStats, ValidationReport, Violation};
pub use scheduler::{
    AutoGenerator, AutoOutcome, CancellationToken, GenerationOutcome, Generator, SearchStatus,
};
