//! Search state passed to priority rules.

use crate::checker::Tier;

/// Runtime state passed to priority rules.
#[derive(Debug, Clone, Default)]
pub struct PriorityContext {
    /// Outer iteration (0-based).
    pub iteration: usize,
    /// Strictness of the current pass.
    pub strictness: Tier,
    /// Enabled classes.
    pub class_count: usize,
}

impl PriorityContext {
    /// Creates a context for an iteration.
    pub fn at_iteration(iteration: usize) -> Self {
        Self {
            iteration,
            ..Default::default()
        }
    }

    /// Sets the strictness.
    pub fn with_strictness(mut self, strictness: Tier) -> Self {
        self.strictness = strictness;
        self
    }

    /// Sets the class count.
    pub fn with_class_count(mut self, count: usize) -> Self {
        self.class_count = count;
        self
    }
}
