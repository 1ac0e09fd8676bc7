//! Ordered strategy matching for single invoice fields.
//!
//! A field is described by a [`FieldRule`]: an ordered list of [`Strategy`]
//! values and a [`Selection`] policy. The first strategy that matches anywhere
//! in the text wins, so a labeled value beats an unlabeled decoy even when the
//! decoy appears earlier in the document.

use regex::{Captures, Regex};
use tracing::trace;

use super::FieldExtractor;

/// Which match of the winning strategy becomes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// First match in reading order.
    FirstMatch,
    /// Last match in reading order (summary rows follow per-item rows).
    LastMatch,
}

/// One pattern rule: a regex plus the capture groups forming its value.
#[derive(Debug, Clone)]
pub struct Strategy {
    /// Short identifier used in logs and fallback reports.
    pub name: &'static str,
    pattern: &'static Regex,
    groups: Vec<usize>,
    /// Whether this is an unlabeled structural guess.
    pub fallback: bool,
}

impl Strategy {
    /// A labeled strategy capturing a single group.
    pub fn labeled(name: &'static str, pattern: &'static Regex, group: usize) -> Self {
        Self {
            name,
            pattern,
            groups: vec![group],
            fallback: false,
        }
    }

    /// An unlabeled fallback strategy capturing a single group.
    pub fn fallback(name: &'static str, pattern: &'static Regex, group: usize) -> Self {
        Self {
            fallback: true,
            ..Self::labeled(name, pattern, group)
        }
    }

    /// Capture several groups per match instead of one.
    pub fn with_groups(mut self, groups: &[usize]) -> Self {
        self.groups = groups.to_vec();
        self
    }

    fn candidate(&self, caps: &Captures<'_>) -> MatchCandidate {
        let values = self
            .groups
            .iter()
            .map(|g| {
                caps.get(*g)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        MatchCandidate {
            values,
            strategy: self.name,
            fallback: self.fallback,
        }
    }
}

/// A value proposed by one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Captured values, one per selected group.
    pub values: Vec<String>,
    /// Name of the producing strategy.
    pub strategy: &'static str,
    /// Whether the producing strategy is a fallback.
    pub fallback: bool,
}

impl MatchCandidate {
    /// First captured value.
    pub fn value(&self) -> &str {
        self.group(0)
    }

    /// Captured value at `index`, or empty.
    pub fn group(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Run `strategies` in order; the first one with a match decides the value.
pub fn extract_field(
    text: &str,
    strategies: &[Strategy],
    selection: Selection,
) -> Option<MatchCandidate> {
    strategies.iter().enumerate().find_map(|(rank, strategy)| {
        let mut matches = strategy.pattern.captures_iter(text);
        let caps = match selection {
            Selection::FirstMatch => matches.next(),
            Selection::LastMatch => matches.last(),
        }?;
        trace!("strategy {} matched at rank {}", strategy.name, rank);
        Some(strategy.candidate(&caps))
    })
}

/// Strategies and selection policy for one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Field name for logs.
    pub field: &'static str,
    /// Strategies in priority order.
    pub strategies: Vec<Strategy>,
    /// Selection policy.
    pub selection: Selection,
}

impl FieldRule {
    pub fn new(field: &'static str, selection: Selection, strategies: Vec<Strategy>) -> Self {
        Self {
            field,
            strategies,
            selection,
        }
    }

    /// Drop every fallback strategy when `enabled` is false.
    pub fn fallbacks_enabled(mut self, enabled: bool) -> Self {
        if !enabled {
            self.strategies.retain(|s| !s.fallback);
        }
        self
    }
}

impl FieldExtractor for FieldRule {
    type Output = MatchCandidate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        extract_field(text, &self.strategies, self.selection)
    }
}
