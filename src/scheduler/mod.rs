//! Timetable generation pipeline.
//!
//! One attempt runs these phases in order over a single exclusively owned
//! schedule and tracker:
//!
//! 1. [`apply_fixed`]: pin fixed lessons.
//! 2. [`CoTeachingResolver`]: place co-taught sessions with balanced
//!    secondary teachers.
//! 3. [`PlacementEngine`]: priority search with smart backtracking and
//!    tier relaxation.
//! 4. [`emergency_fill`]: optional relaxed completion (`force_complete`).
//! 5. Reports: [`ScheduleStats`], quality score and, when enabled, a
//!    [`ValidationReport`].
//!
//! [`AutoGenerator`] repeats whole attempts and keeps the best one.
//!
//! # Determinism
//! Every random choice draws from one `StdRng` seeded per attempt, so a
//! given (input, config, seed) always yields the same schedule.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Pillay (2014), "A survey of school timetabling research"

mod auto;
mod cancel;
pub(crate) mod co_teaching;
mod emergency;
mod engine;
mod fixed;
mod history;

pub use auto::{AttemptProgress, AutoGenerator, AutoOutcome};
pub use cancel::CancellationToken;
pub use co_teaching::{CoTeachingReport, CoTeachingResolver, UnresolvedSessions};
pub use emergency::{emergency_fill, EmergencyReport};
pub use engine::{PlacementEngine, SearchOutcome, SearchStatus};
pub use fixed::{apply_fixed, FixedOutcome, FixedRejection};
pub use history::{Placement, PlacementHistory};

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::catalog::Catalog;
use crate::checker::ConstraintChecker;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::models::{Schedule, TeacherHoursTracker, TimetableData};
use crate::report::{FailureAnalysis, QualityScorer, ScheduleStats, ScheduleValidator, ValidationReport};
use crate::slots::SlotFinder;

/// Everything one generation attempt produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Seed of the attempt.
    pub seed: u64,
    /// The (possibly partial) timetable.
    pub schedule: Schedule,
    /// Teacher loads matching `schedule`.
    pub tracker: TeacherHoursTracker,
    /// Fill metrics.
    pub stats: ScheduleStats,
    /// Search diagnostics, with the quality score.
    pub analysis: FailureAnalysis,
    /// Validation report (when enabled).
    pub report: Option<ValidationReport>,
    /// How the search ended.
    pub status: SearchStatus,
    /// Pinning phase result.
    pub fixed: FixedOutcome,
    /// Co-teaching phase result.
    pub co_teaching: CoTeachingReport,
    /// Emergency pass result (when it ran).
    pub emergency: Option<EmergencyReport>,
}

impl GenerationOutcome {
    /// Quality score (0 when not computed).
    pub fn quality_score(&self) -> f64 {
        self.analysis.quality.as_ref().map_or(0.0, |q| q.score)
    }

    /// Whether every required lesson was placed by the search.
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }
}

/// Runs generation attempts over one validated input.
#[derive(Debug, Clone)]
pub struct Generator {
    catalog: Catalog,
    config: GenerationConfig,
}

impl Generator {
    /// Validates the input and indexes it.
    ///
    /// # Errors
    /// [`GenerationError::InvalidInput`](crate::GenerationError::InvalidInput)
    /// listing every problem found when `data` fails the feasibility pass.
    pub fn new(data: &TimetableData, config: GenerationConfig) -> Result<Self> {
        let catalog = Catalog::build(data, &config)?;
        Ok(Self { catalog, config })
    }

    /// The indexed input.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The attempt settings.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Runs one full attempt.
    pub fn generate(&self, seed: u64, cancel: &CancellationToken) -> GenerationOutcome {
        let started = Instant::now();
        let catalog = &self.catalog;
        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut schedule = catalog.empty_schedule();
        let mut tracker = catalog.empty_tracker();
        info!(seed, classes = catalog.class_count(), "generation attempt started");

        let fixed = apply_fixed(catalog, &mut schedule, &mut tracker);

        let finder = SlotFinder::new(ConstraintChecker::new(catalog, &config.checker));
        let co_teaching = CoTeachingResolver::new(&finder).resolve(&mut schedule, &mut tracker, &mut rng);

        let search = PlacementEngine::new(&finder, config.search.clone()).run(
            &mut schedule,
            &mut tracker,
            &mut rng,
            cancel,
        );
        let mut analysis = search.analysis;

        let needs_fill = !ScheduleStats::from_schedule(&schedule).is_full();
        let emergency = (config.force_complete && needs_fill && search.status != SearchStatus::Cancelled)
            .then(|| emergency_fill(catalog, &mut schedule, &mut tracker));

        analysis.quality = Some(QualityScorer::new(config.quality.clone()).score(&schedule));
        let stats = ScheduleStats::from_schedule(&schedule);
        let report = config
            .validate
            .then(|| ScheduleValidator::new(catalog, &config.checker).validate(&schedule, &tracker));
        analysis.elapsed = started.elapsed();

        info!(
            seed,
            status = ?search.status,
            fill_rate = stats.fill_rate,
            violations = report.as_ref().map_or(0, |r| r.summary.total),
            elapsed_ms = analysis.elapsed.as_millis() as u64,
            "generation attempt finished"
        );

        GenerationOutcome {
            seed,
            schedule,
            tracker,
            stats,
            analysis,
            report,
            status: search.status,
            fixed,
            co_teaching,
            emergency,
        }
    }
}
