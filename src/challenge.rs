use crate::solution::{parse, SolutionSet};

/// One shortcut to learn, plus the fields a session mutates while playing it
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    pub category: String,
    pub description: String,
    pub solutions: SolutionSet,
    pub failed: bool,
    pub attempt: u32,
    pub seconds_spent: u32,
}

impl Challenge {
    pub fn new(category: impl Into<String>, description: impl Into<String>, solutions: SolutionSet) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            solutions,
            failed: false,
            attempt: 1,
            seconds_spent: 0,
        }
    }

    /// Builds a challenge from the solution grammar.
    pub fn from_keys(category: impl Into<String>, description: impl Into<String>, keys: &str) -> Self {
        Self::new(category, description, parse(keys))
    }

    pub fn reset_for_new_session(&mut self) {
        self.failed = false;
        self.attempt = 1;
        self.seconds_spent = 0;
    }
}
