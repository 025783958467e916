//! Class (homeroom group) model.
//!
//! A class is the unit that receives lessons. Its weekly layout gives the
//! number of periods on each weekday; the grade drives per-grade subject
//! hours and teacher caps.

use serde::{Deserialize, Serialize};

/// A class receiving lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassUnit {
    /// Unique class identifier (e.g., "1-3").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Grade (year group).
    pub grade: u8,
    /// Periods per weekday. Empty = use the base layout.
    pub periods_per_day: Vec<usize>,
    /// Weekly lesson cap. `Some(0)` disables the class entirely.
    pub weekly_hour_cap: Option<u32>,
    /// Maximum lessons on a single day. `None` = the day's period count.
    pub daily_cap: Option<usize>,
}

impl ClassUnit {
    /// Creates a class in the given grade.
    pub fn new(id: impl Into<String>, grade: u8) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            grade,
            periods_per_day: Vec::new(),
            weekly_hour_cap: None,
            daily_cap: None,
        }
    }

    /// Sets the class name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the weekly period layout.
    pub fn with_periods(mut self, periods_per_day: Vec<usize>) -> Self {
        self.periods_per_day = periods_per_day;
        self
    }

    /// Sets the weekly lesson cap.
    pub fn with_weekly_cap(mut self, cap: u32) -> Self {
        self.weekly_hour_cap = Some(cap);
        self
    }

    /// Sets the daily lesson cap.
    pub fn with_daily_cap(mut self, cap: usize) -> Self {
        self.daily_cap = Some(cap);
        self
    }

    /// Whether the class takes part in generation.
    pub fn is_enabled(&self) -> bool {
        self.weekly_hour_cap != Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_builder() {
        let c = ClassUnit::new("2-1", 2)
            .with_name("Grade 2 Class 1")
            .with_periods(vec![6, 6, 5, 6, 5])
            .with_weekly_cap(26)
            .with_daily_cap(6);

        assert_eq!(c.id, "2-1");
        assert_eq!(c.grade, 2);
        assert_eq!(c.periods_per_day.len(), 5);
        assert_eq!(c.weekly_hour_cap, Some(26));
        assert_eq!(c.daily_cap, Some(6));
        assert!(c.is_enabled());
    }

    #[test]
    fn test_zero_cap_disables() {
        let c = ClassUnit::new("6-9", 6).with_weekly_cap(0);
        assert!(!c.is_enabled());
    }
}
