//! Repeat-until-best generation loop.
//!
//! Runs full generation attempts strictly one after another, attempt `n`
//! seeded with `base_seed + n`, and keeps the attempt with the highest
//! fill rate (higher quality score on equal fill). Stops early once an
//! attempt reaches the target fill rate. Cancellation is checked between
//! attempts and, inside an attempt, between search iterations.

use tracing::info;

use super::{CancellationToken, GenerationOutcome, Generator, SearchStatus};
use crate::config::AutoConfig;
use crate::error::Result;
use crate::models::TimetableData;

/// Progress notification sent after every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptProgress {
    /// Attempt number (1-based).
    pub attempt: usize,
    /// Attempt budget.
    pub max_attempts: usize,
    /// Seed of this attempt.
    pub seed: u64,
    /// Fill rate of this attempt.
    pub fill_rate: f64,
    /// Best fill rate so far.
    pub best_fill_rate: f64,
    /// How this attempt's search ended.
    pub status: SearchStatus,
}

/// Result of the loop.
#[derive(Debug, Clone, Default)]
pub struct AutoOutcome {
    /// Best attempt, if any attempt ran.
    pub best: Option<GenerationOutcome>,
    /// Attempts run.
    pub attempts: usize,
    /// Attempt number (1-based) of `best`.
    pub best_attempt: usize,
    /// Stopped because the target fill rate was reached.
    pub target_reached: bool,
    /// Stopped by the caller.
    pub cancelled: bool,
}

impl AutoOutcome {
    /// Fill rate of the best attempt (0 when nothing ran).
    pub fn best_fill_rate(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |b| b.stats.fill_rate)
    }
}

/// Drives repeated generation attempts.
#[derive(Debug, Clone, Default)]
pub struct AutoGenerator {
    config: AutoConfig,
}

impl AutoGenerator {
    /// Creates a loop with the given settings.
    pub fn new(config: AutoConfig) -> Self {
        Self { config }
    }

    /// The loop settings.
    pub fn config(&self) -> &AutoConfig {
        &self.config
    }

    /// Runs the loop.
    ///
    /// Only invalid input is an error; infeasible data yields the best
    /// partial schedule found.
    pub fn run<F>(&self, data: &TimetableData, cancel: &CancellationToken, mut progress: F) -> Result<AutoOutcome>
    where
        F: FnMut(&AttemptProgress),
    {
        let generator = Generator::new(data, self.config.generation.clone())?;
        let max_attempts = self.config.max_attempts;
        let mut outcome = AutoOutcome::default();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            let seed = self.config.base_seed.wrapping_add(attempt as u64 - 1);
            let result = generator.generate(seed, cancel);
            outcome.attempts = attempt;

            let fill_rate = result.stats.fill_rate;
            let status = result.status.clone();
            if is_better(&result, outcome.best.as_ref()) {
                outcome.best = Some(result);
                outcome.best_attempt = attempt;
            }
            progress(&AttemptProgress {
                attempt,
                max_attempts,
                seed,
                fill_rate,
                best_fill_rate: outcome.best_fill_rate(),
                status: status.clone(),
            });

            if fill_rate >= self.config.target_fill_rate {
                outcome.target_reached = true;
                break;
            }
            if status == SearchStatus::Cancelled {
                outcome.cancelled = true;
                break;
            }
        }

        info!(
            attempts = outcome.attempts,
            best_attempt = outcome.best_attempt,
            best_fill_rate = outcome.best_fill_rate(),
            target_reached = outcome.target_reached,
            cancelled = outcome.cancelled,
            "auto generation finished"
        );
        Ok(outcome)
    }
}

fn is_better(candidate: &GenerationOutcome, best: Option<&GenerationOutcome>) -> bool {
    let Some(best) = best else {
        return true;
    };
    let (fill, best_fill) = (candidate.stats.fill_rate, best.stats.fill_rate);
    if fill != best_fill {
        return fill > best_fill;
    }
    candidate.quality_score() > best.quality_score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::error::GenerationError;
    use crate::models::{BaseConfig, Subject, Teacher};
    use crate::test_support::{over_constrained, small_school};

    #[test]
    fn test_over_constrained_terminates_within_budget() {
        let generator = AutoGenerator::new(AutoConfig::new().with_max_attempts(5));
        let mut seen = Vec::new();
        let outcome = generator
            .run(&over_constrained(), &CancellationToken::new(), |p| seen.push(p.clone()))
            .unwrap();

        assert_eq!(outcome.attempts, 5);
        assert_eq!(seen.len(), 5);
        assert!(!outcome.target_reached);
        assert!(outcome.best_fill_rate() < 1.0);
        assert!(outcome.best_fill_rate() > 0.0);
        let seeds: Vec<u64> = seen.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, vec![0, 1, 2, 3, 4]);
        let best = seen.iter().map(|p| p.fill_rate).fold(0.0, f64::max);
        assert_eq!(outcome.best_fill_rate(), best);
    }

    #[test]
    fn test_stops_at_target() {
        let data = crate::models::TimetableData::new(BaseConfig::new(vec![2, 2]).with_grade(1, 1))
            .with_subject(Subject::new("math", 2))
            .with_subject(Subject::new("korean", 2))
            .with_teacher(Teacher::new("M1").with_subject("math"))
            .with_teacher(Teacher::new("K1").with_subject("korean"));
        let outcome = AutoGenerator::new(AutoConfig::new().with_max_attempts(5))
            .run(&data, &CancellationToken::new(), |_| {})
            .unwrap();
        assert!(outcome.target_reached);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.best_fill_rate(), 1.0);
    }

    #[test]
    fn test_forced_completion_reaches_target() {
        let config = AutoConfig::new()
            .with_max_attempts(5)
            .with_generation(GenerationConfig::new().with_force_complete(true));
        let outcome = AutoGenerator::new(config)
            .run(&over_constrained(), &CancellationToken::new(), |_| {})
            .unwrap();
        assert!(outcome.target_reached);
        assert_eq!(outcome.best_fill_rate(), 1.0);
    }

    #[test]
    fn test_cancelled_before_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = AutoGenerator::default()
            .run(&small_school(), &cancel, |_| panic!("no attempt expected"))
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let data = small_school().with_teacher(Teacher::new("K1").with_subject("korean"));
        let result = AutoGenerator::default().run(&data, &CancellationToken::new(), |_| {});
        assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
    }
}
