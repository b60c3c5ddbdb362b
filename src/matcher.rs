//! Compares recorded input against every accepted alternative.
//!
//! Alternatives are checked independently and without backtracking. Key steps
//! need exact simultaneity. Literal steps accept partial progress: the text
//! typed so far is collapsed ("flattened") into one [`InputStep::Text`] step.

use tracing::debug;

use crate::recorder::InputStep;
use crate::solution::{SolutionAlternative, SolutionSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum MatchOutcome {
    Progressing,
    Correct,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum FailureCause {
    /// No alternative matched a single step
    NoMatch,
    /// A literal step can no longer be typed from the input
    StringMismatch,
    /// Every alternative is shorter than what was entered
    InputTooLong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: MatchOutcome,
    pub cause: Option<FailureCause>,
    /// Input steps were collapsed into text; the preview shown to the player changed.
    pub flattened: bool,
}

impl Evaluation {
    fn progressing(flattened: bool) -> Self {
        Self {
            outcome: MatchOutcome::Progressing,
            cause: None,
            flattened,
        }
    }

    fn correct(flattened: bool) -> Self {
        Self {
            outcome: MatchOutcome::Correct,
            cause: None,
            flattened,
        }
    }

    fn failed(cause: FailureCause, flattened: bool) -> Self {
        Self {
            outcome: MatchOutcome::Failed,
            cause: Some(cause),
            flattened,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LiteralMatch {
    /// The consumed steps spell the whole literal
    Full { consumed: usize, text: String },
    /// The consumed steps spell a prefix of the literal
    Partial { consumed: usize, text: String },
    Mismatch,
}

/// Accumulates the text of input steps from `start` until it reaches the
/// literal's length, then classifies it against `literal`.
fn match_literal(literal: &str, steps: &[InputStep], start: usize) -> LiteralMatch {
    let expected = literal.to_lowercase();
    let wanted = expected.chars().count();

    let mut typed = String::new();
    let mut consumed = 0;
    for step in &steps[start..] {
        if typed.chars().count() >= wanted {
            break;
        }
        typed.push_str(&step.as_text());
        consumed += 1;
    }

    if typed == expected {
        LiteralMatch::Full {
            consumed,
            text: typed,
        }
    } else if expected.starts_with(&typed) {
        LiteralMatch::Partial {
            consumed,
            text: typed,
        }
    } else {
        LiteralMatch::Mismatch
    }
}

/// Replaces `steps[start..start + consumed]` with one text step.
/// Returns true when the recording actually changed.
fn flatten(steps: &mut Vec<InputStep>, start: usize, consumed: usize, text: String) -> bool {
    if consumed == 0 {
        return false;
    }
    let replacement = InputStep::Text(text);
    if consumed == 1 && steps[start] == replacement {
        return false;
    }
    steps.splice(start..start + consumed, std::iter::once(replacement));
    true
}

#[derive(Debug, Default)]
struct AlternativeProgress {
    matched: usize,
    partial: bool,
    mismatch: bool,
    flattened: bool,
}

fn walk_alternative(alternative: &SolutionAlternative, steps: &mut Vec<InputStep>) -> AlternativeProgress {
    let mut progress = AlternativeProgress::default();

    for (idx, step) in alternative.steps().iter().enumerate() {
        if idx >= steps.len() {
            break;
        }

        let Some(literal) = step.literal_text() else {
            if step.matches_keys(&steps[idx]) {
                progress.matched += 1;
            }
            continue;
        };

        match match_literal(literal, steps, idx) {
            LiteralMatch::Full { consumed, text } => {
                progress.flattened |= flatten(steps, idx, consumed, text);
                progress.matched += 1;
            }
            LiteralMatch::Partial { consumed, text } => {
                progress.flattened |= flatten(steps, idx, consumed, text);
                progress.partial = true;
                progress.matched += 1;
            }
            LiteralMatch::Mismatch => {
                debug!(literal, "typed text cannot become the literal");
                progress.mismatch = true;
            }
        }
    }

    progress
}

/// Classifies the recorded input against all alternatives, flattening literal
/// progress into `steps` as a side effect.
pub fn evaluate(solutions: &SolutionSet, steps: &mut Vec<InputStep>) -> Evaluation {
    if steps.is_empty() {
        return Evaluation::progressing(false);
    }

    let mut correct = false;
    let mut has_any_match = false;
    let mut string_mismatch = false;
    let mut all_shorter_than_input = true;
    let mut flattened = false;

    for (idx, alternative) in solutions.alternatives().iter().enumerate() {
        let progress = walk_alternative(alternative, steps);
        debug!(
            alternative = idx,
            matched = progress.matched,
            of = alternative.len(),
            partial = progress.partial,
            "alternative checked"
        );

        flattened |= progress.flattened;
        string_mismatch |= progress.mismatch;
        if progress.matched > 0 {
            has_any_match = true;
        }
        if !correct && !progress.partial && progress.matched == alternative.len() {
            debug!(alternative = idx, "alternative complete");
            correct = true;
        }
        if progress.partial || progress.matched >= steps.len() {
            all_shorter_than_input = false;
        }
    }

    if correct {
        Evaluation::correct(flattened)
    } else if string_mismatch {
        Evaluation::failed(FailureCause::StringMismatch, flattened)
    } else if !has_any_match {
        Evaluation::failed(FailureCause::NoMatch, flattened)
    } else if all_shorter_than_input {
        Evaluation::failed(FailureCause::InputTooLong, flattened)
    } else {
        Evaluation::progressing(flattened)
    }
}
