//! Accepted solutions for a challenge and the compact grammar they are written in.
//!
//! `||` separates alternatives, `,` separates steps, `+` joins keys pressed
//! together and a step wrapped in single quotes is text typed key by key:
//!
//! ```
//! use hotkey_drill::solution::parse;
//!
//! let set = parse("Ctrl+K,Ctrl+Oem5||Ctrl+K+Oem5");
//! assert_eq!(set.alternatives().len(), 2);
//! assert_eq!(set.to_string(), "Ctrl+K,Ctrl+Oem5||Ctrl+K+Oem5");
//! ```

use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::char,
    combinator::{not, recognize},
    multi::{many0, separated_list1},
    sequence::terminated,
    IResult, Parser,
};
use tracing::debug;

use crate::recorder::InputStep;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    Key,
    Literal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionPart {
    pub kind: PartKind,
    pub value: String,
}

impl SolutionPart {
    pub fn key(value: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Key,
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Literal,
            value: value.into(),
        }
    }
}

impl fmt::Display for SolutionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PartKind::Key => write!(f, "{}", self.value),
            PartKind::Literal => write!(f, "'{}'", self.value),
        }
    }
}

/// One point-in-time unit of required input: a key combination or a literal run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionStep {
    parts: Vec<SolutionPart>,
}

impl SolutionStep {
    pub fn new(parts: Vec<SolutionPart>) -> Self {
        Self { parts }
    }

    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(keys.into_iter().map(SolutionPart::key).collect())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(vec![SolutionPart::literal(text)])
    }

    pub fn parts(&self) -> &[SolutionPart] {
        &self.parts
    }

    /// Text of the first literal part, if the step has one.
    pub fn literal_text(&self) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.kind == PartKind::Literal)
            .map(|p| p.value.as_str())
    }

    /// Exact set equality between the step's keys and a recorded combination.
    /// Order inside the step is irrelevant; key identifiers are case-sensitive.
    pub fn matches_keys(&self, input: &InputStep) -> bool {
        let InputStep::Keys(pressed) = input else {
            return false;
        };
        if self.literal_text().is_some() {
            return false;
        }
        let expected: HashSet<&str> = self.parts.iter().map(|p| p.value.as_str()).collect();
        let actual: HashSet<&str> = pressed.iter().map(String::as_str).collect();
        expected == actual
    }
}

impl fmt::Display for SolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.iter().join("+"))
    }
}

/// An ordered sequence of steps; steps are matched positionally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionAlternative {
    steps: Vec<SolutionStep>,
}

impl SolutionAlternative {
    pub fn new(steps: Vec<SolutionStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for SolutionAlternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steps.iter().join(","))
    }
}

/// Every accepted way of completing a challenge. Any alternative may match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionSet {
    alternatives: Vec<SolutionAlternative>,
}

impl SolutionSet {
    pub fn new(alternatives: Vec<SolutionAlternative>) -> Self {
        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[SolutionAlternative] {
        &self.alternatives
    }

    /// Canonical rendering of the first alternative, shown to the player on failure.
    pub fn canonical(&self) -> String {
        self.alternatives
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// True when at least one alternative has at least one step.
    pub fn is_playable(&self) -> bool {
        self.alternatives.iter().any(|a| !a.is_empty())
    }
}

impl fmt::Display for SolutionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alternatives.iter().join("||"))
    }
}

impl From<&str> for SolutionSet {
    fn from(text: &str) -> Self {
        parse(text)
    }
}

/// Raw text of one step: everything up to `,` or `||`. A lone `|` is part of the step.
fn raw_step(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((
        is_not(",|"),
        terminated(tag("|"), not(char('|'))),
    ))))
    .parse(input)
}

fn raw_alternative(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), raw_step).parse(input)
}

fn raw_solution_set(input: &str) -> IResult<&str, Vec<Vec<&str>>> {
    separated_list1(tag("||"), raw_alternative).parse(input)
}

/// Classifies the raw text of one step.
///
/// Fully quoted, non-empty text is a literal. Anything else with a quote in it
/// degrades to a single key carrying the raw text. Otherwise `+` splits a combination.
fn step_from_raw(raw: &str) -> SolutionStep {
    if let Some(text) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|text| !text.is_empty())
    {
        return SolutionStep::literal(text);
    }
    if raw.contains('\'') {
        debug!(step = raw, "unbalanced quote, treating step as a single key");
        return SolutionStep::keys([raw]);
    }
    SolutionStep::keys(raw.split('+'))
}

/// Parses the solution grammar. Never fails: malformed fragments become
/// best-effort single-key steps.
pub fn parse(text: &str) -> SolutionSet {
    match raw_solution_set(text) {
        Ok((rest, alternatives)) if rest.is_empty() => SolutionSet::new(
            alternatives
                .into_iter()
                .map(|steps| SolutionAlternative::new(steps.into_iter().map(step_from_raw).collect()))
                .collect(),
        ),
        other => {
            debug!(text, result = ?other, "solution grammar not fully consumed");
            SolutionSet::new(vec![SolutionAlternative::new(vec![SolutionStep::keys([
                text,
            ])])])
        }
    }
}
