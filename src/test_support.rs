//! Shared test fixtures.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::Catalog;
use crate::config::GenerationConfig;
use crate::models::{BaseConfig, Constraint, Subject, Teacher, TimetableData};

/// Two grade-1 classes, five days of five periods, 20 required hours per
/// class. Every class has its own core teachers; PE and music are shared.
pub(crate) fn small_school() -> TimetableData {
    TimetableData::new(BaseConfig::new(vec![5, 5, 5, 5, 5]).with_grade(1, 2))
        .with_subject(Subject::new("korean", 5).with_priority(2))
        .with_subject(Subject::new("math", 5).with_priority(2))
        .with_subject(Subject::new("science", 4).block())
        .with_subject(Subject::new("pe", 3))
        .with_subject(Subject::new("music", 3))
        .with_teacher(Teacher::new("K1").with_subject("korean").with_class_hours("1-1", 5))
        .with_teacher(Teacher::new("K2").with_subject("korean").with_class_hours("1-2", 5))
        .with_teacher(Teacher::new("M1").with_subject("math").with_class_hours("1-1", 5))
        .with_teacher(Teacher::new("M2").with_subject("math").with_class_hours("1-2", 5))
        .with_teacher(Teacher::new("S1").with_subject("science").with_class_hours("1-1", 4))
        .with_teacher(Teacher::new("S2").with_subject("science").with_class_hours("1-2", 4))
        .with_teacher(Teacher::new("P1").with_subject("pe"))
        .with_teacher(Teacher::new("U1").with_subject("music"))
}

/// One main English teacher paired with two secondaries across two
/// classes (three sessions each), plus math to fill the week.
pub(crate) fn co_teaching_school() -> TimetableData {
    TimetableData::new(BaseConfig::new(vec![4, 4, 4, 4, 4]).with_grade(1, 2))
        .with_subject(Subject::new("english", 3))
        .with_subject(Subject::new("math", 4))
        .with_teacher(
            Teacher::new("T1")
                .with_subject("english")
                .with_class_hours("1-1", 3)
                .with_class_hours("1-2", 3),
        )
        .with_teacher(Teacher::new("T2").with_subject("english"))
        .with_teacher(Teacher::new("T3").with_subject("english"))
        .with_teacher(Teacher::new("M1").with_subject("math").with_class_hours("1-1", 4))
        .with_teacher(Teacher::new("M2").with_subject("math").with_class_hours("1-2", 4))
        .with_constraint(Constraint::co_teaching_for(
            "T1",
            vec!["T2".into(), "T3".into()],
            "english",
        ))
}

/// Required hours (12 per class) exceed the grid (4 cells per class).
pub(crate) fn over_constrained() -> TimetableData {
    TimetableData::new(BaseConfig::new(vec![2, 2]).with_grade(1, 2))
        .with_subject(Subject::new("math", 6))
        .with_subject(Subject::new("korean", 6))
        .with_teacher(Teacher::new("M1").with_subject("math").with_unavailable(0, 1))
        .with_teacher(Teacher::new("K1").with_subject("korean"))
}

/// Builds a catalog with default settings.
pub(crate) fn catalog(data: &TimetableData) -> Catalog {
    Catalog::build(data, &GenerationConfig::default()).unwrap()
}

/// Seeded RNG.
pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Owned teacher ids.
pub(crate) fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
