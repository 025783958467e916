//! Generation settings.
//!
//! All settings have defaults and can be loaded from any serde format, so
//! hosts can keep them next to their timetable data.

use serde::{Deserialize, Serialize};

use crate::checker::Tier;
use crate::models::CREATIVE_ACTIVITY;

/// Rule parameters used by the constraint checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Longest allowed run of consecutive lessons per teacher and day.
    /// A placement that would exceed it is denied.
    pub max_consecutive_periods: usize,
    /// Subject categories exempt from per-class hour caps and load counting.
    pub exempt_categories: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_periods: 2,
            exempt_categories: vec![CREATIVE_ACTIVITY.to_string()],
        }
    }
}

/// Budget and relaxation policy of the placement search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    /// Outer iterations before giving up.
    pub max_iterations: usize,
    /// Undo operations before giving up.
    pub max_backtrack_steps: usize,
    /// How many recent placements are considered when backtracking.
    pub backtrack_window: usize,
    /// Stalled iterations tolerated at a tier before relaxing it.
    pub stalls_before_relax: usize,
    /// Lowest strictness reached by ordinary relaxation.
    pub relax_floor: Tier,
    /// Permit relaxing down to CRITICAL-only checks.
    pub allow_degraded: bool,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 150,
            max_backtrack_steps: 200,
            backtrack_window: 5,
            stalls_before_relax: 3,
            relax_floor: Tier::High,
            allow_degraded: false,
        }
    }
}

impl SearchPolicy {
    /// Lowest strictness the search may relax to.
    pub fn floor(&self) -> Tier {
        if self.allow_degraded {
            Tier::Critical
        } else {
            self.relax_floor
        }
    }
}

/// Soft-quality scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Consecutive lessons a teacher may teach before a penalty applies.
    pub consecutive_cap: usize,
    /// Penalty per lesson beyond the cap.
    pub penalty_weight: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            consecutive_cap: 2,
            penalty_weight: 5.0,
        }
    }
}

/// Settings of one generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Checker parameters.
    pub checker: CheckerConfig,
    /// Search budget and relaxation.
    pub search: SearchPolicy,
    /// Quality scoring.
    pub quality: QualityConfig,
    /// Run the emergency fill when the search leaves cells empty.
    pub force_complete: bool,
    /// Subject pairs that may stand in for each other.
    pub subject_aliases: Vec<(String, String)>,
    /// Produce a validation report for each attempt.
    pub validate: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            checker: CheckerConfig::default(),
            search: SearchPolicy::default(),
            quality: QualityConfig::default(),
            force_complete: false,
            subject_aliases: Vec::new(),
            validate: true,
        }
    }
}

impl GenerationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search policy.
    pub fn with_search(mut self, search: SearchPolicy) -> Self {
        self.search = search;
        self
    }

    /// Sets the checker parameters.
    pub fn with_checker(mut self, checker: CheckerConfig) -> Self {
        self.checker = checker;
        self
    }

    /// Sets the quality parameters.
    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    /// Enables the emergency fill.
    pub fn with_force_complete(mut self, force: bool) -> Self {
        self.force_complete = force;
        self
    }

    /// Declares two subjects as substitutes.
    pub fn with_alias(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.subject_aliases.push((a.into(), b.into()));
        self
    }

    /// Turns per-attempt validation on or off.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Settings of the repeat-until-best loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfig {
    /// Attempts before giving up.
    pub max_attempts: usize,
    /// Stop as soon as an attempt reaches this fill rate (0.0..=1.0).
    pub target_fill_rate: f64,
    /// Seed of the first attempt; attempt `n` uses `base_seed + n`.
    pub base_seed: u64,
    /// Per-attempt settings.
    pub generation: GenerationConfig,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            target_fill_rate: 1.0,
            base_seed: 0,
            generation: GenerationConfig::default(),
        }
    }
}

impl AutoConfig {
    /// Creates the default loop configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt budget.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the early-stop fill rate.
    pub fn with_target_fill_rate(mut self, rate: f64) -> Self {
        self.target_fill_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the first seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets per-attempt settings.
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.checker.max_consecutive_periods, 2);
        assert_eq!(config.quality.consecutive_cap, 2);
        assert_eq!(config.search.max_iterations, 150);
        assert!(!config.force_complete);
        assert!(config.validate);
        assert_eq!(config.search.floor(), Tier::High);
    }

    #[test]
    fn test_degraded_floor() {
        let policy = SearchPolicy {
            allow_degraded: true,
            ..SearchPolicy::default()
        };
        assert_eq!(policy.floor(), Tier::Critical);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "force_complete": true, "search": { "max_iterations": 40 } }"#;
        let config: GenerationConfig = serde_json::from_str(json).unwrap();
        assert!(config.force_complete);
        assert_eq!(config.search.max_iterations, 40);
        assert_eq!(config.search.max_backtrack_steps, 200);
        assert_eq!(config.checker, CheckerConfig::default());
    }

    #[test]
    fn test_auto_builder() {
        let auto = AutoConfig::new()
            .with_max_attempts(3)
            .with_target_fill_rate(1.5)
            .with_seed(7)
            .with_generation(GenerationConfig::new().with_alias("native", "english"));
        assert_eq!(auto.max_attempts, 3);
        assert!((auto.target_fill_rate - 1.0).abs() < 1e-10);
        assert_eq!(auto.base_seed, 7);
        assert_eq!(auto.generation.subject_aliases.len(), 1);
    }
}
