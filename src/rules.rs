//! Selection rule validator.
//!
//! Decides whether a set of module and software selections is admissible for
//! the chosen option. The check is a pure function of its inputs so the same
//! code runs in the form before submission and again at admission, where the
//! client is not trusted.
//!
//! # Rule table
//!
//! ```text
//! Option 1   majors == 2   total == 2   (no sub-modules, no software)
//! Option 2   majors == 1   total == 3
//! Option 3   majors == 0   total == 4
//! ```
//!
//! `total` is majors + sub-modules + distinct software.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::response::Selections;
use crate::types::SelectedOption;

/// Character that marks a label as a major module
pub const MAJOR_MARKER: char = '*';

/// True if the label carries the major marker anywhere in its text.
///
/// Classification is purely structural: a sub-module whose title happens to
/// contain `*` is counted as a major.
pub fn is_major(label: &str) -> bool {
    label.contains(MAJOR_MARKER)
}

/// Counted selections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectionCounts {
    pub majors: usize,
    pub subs: usize,
    pub software: usize,
}

impl SelectionCounts {
    pub fn total(&self) -> usize {
        self.majors + self.subs + self.software
    }
}

impl fmt::Display for SelectionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} major(s), {} sub-module(s), {} software",
            self.majors, self.subs, self.software
        )
    }
}

/// Expected composition for an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRule {
    pub majors: usize,
    pub total: usize,
}

impl OptionRule {
    pub const fn for_option(option: SelectedOption) -> Self {
        match option {
            SelectedOption::Option1 => Self { majors: 2, total: 2 },
            SelectedOption::Option2 => Self { majors: 1, total: 3 },
            SelectedOption::Option3 => Self { majors: 0, total: 4 },
        }
    }

    pub fn accepts(&self, counts: &SelectionCounts) -> bool {
        counts.majors == self.majors && counts.total() == self.total
    }
}

/// Why a selection set was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// No option chosen, or an option the survey does not know
    #[error("Please select an option")]
    MissingOption,

    /// Counts do not satisfy the chosen option's rule
    #[error("{option} requires {} (selected {actual})", .option.requirement())]
    CompositionMismatch {
        option: SelectedOption,
        actual: SelectionCounts,
    },
}

/// Count majors, sub-modules and distinct software.
///
/// Blank entries are ignored.
pub fn count_selections(selections: &Selections) -> SelectionCounts {
    let mut counts = SelectionCounts::default();

    for (_, list) in selections.categories() {
        for label in list.iter().filter(|l| !l.trim().is_empty()) {
            if is_major(label) {
                counts.majors += 1;
            } else {
                counts.subs += 1;
            }
        }
    }

    counts.software = selections
        .software()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .len();

    counts
}

/// Validate selections against the chosen option.
///
/// Returns the counts on success so callers can display them.
pub fn validate(
    selected_option: Option<SelectedOption>,
    selections: &Selections,
) -> Result<SelectionCounts, RejectionReason> {
    let option = selected_option.ok_or(RejectionReason::MissingOption)?;
    let counts = count_selections(selections);

    debug!(%option, %counts, "Checking selection composition");

    if OptionRule::for_option(option).accepts(&counts) {
        Ok(counts)
    } else {
        Err(RejectionReason::CompositionMismatch {
            option,
            actual: counts,
        })
    }
}
