//! Survey wizard state machine.
//!
//! The form is filled in four steps:
//!
//! ```text
//! Personal -> Option -> Modules -> Review
//! ```
//!
//! Forward moves are guarded: a step is left only once its fields are
//! complete, and the Modules step only once the selection satisfies the
//! chosen option. Going back is always allowed except from the first step.
//! Failed transitions return a [`WizardError`] and leave the step unchanged.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::response::{NewResponse, Selections};
use crate::rules::{self, RejectionReason, SelectionCounts};
use crate::submission::check_email;
use crate::types::{SelectedOption, YearOfStudy};

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    /// Email, index number, year, phone
    #[default]
    Personal,
    /// One of the three composition plans
    Option,
    /// Module and software checkboxes
    Modules,
    /// Summary and additional courses
    Review,
}

impl WizardStep {
    /// Total number of steps.
    pub const TOTAL_STEPS: usize = 4;

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Option),
            Self::Option => Some(Self::Modules),
            Self::Modules => Some(Self::Review),
            Self::Review => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Option => Some(Self::Personal),
            Self::Modules => Some(Self::Option),
            Self::Review => Some(Self::Modules),
        }
    }

    /// Get the display title for this step.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::Option => "Module Option",
            Self::Modules => "Select Modules",
            Self::Review => "Review & Submit",
        }
    }

    /// Get the step number (1-indexed for display).
    pub const fn step_number(self) -> usize {
        match self {
            Self::Personal => 1,
            Self::Option => 2,
            Self::Modules => 3,
            Self::Review => 4,
        }
    }

    pub const fn all() -> [Self; Self::TOTAL_STEPS] {
        [Self::Personal, Self::Option, Self::Modules, Self::Review]
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Errors raised by wizard transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// A field of the current step is missing or malformed
    #[error("{field}: {reason}")]
    IncompleteField { field: &'static str, reason: String },

    /// No option chosen on the Option step
    #[error("Please select an option")]
    NoOption,

    /// Selections do not satisfy the chosen option
    #[error("{0}")]
    Rejected(#[from] RejectionReason),

    /// `back` on the first step
    #[error("Already at the first step")]
    AtFirstStep,

    /// `advance` on the last step
    #[error("Already at the last step, submit instead")]
    AtLastStep,

    /// `finish` before reaching Review
    #[error("Cannot submit from step {step}, complete the remaining steps first")]
    NotAtReview { step: WizardStep },
}

/// Personal details typed on the first step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalDetails {
    pub email: String,
    pub index_number: String,
    pub year_of_study: Option<YearOfStudy>,
    pub phone_number: String,
}

impl PersonalDetails {
    /// First problem with the details, if any
    pub fn check(&self) -> Result<(), WizardError> {
        let incomplete = |field: &'static str, reason: &str| WizardError::IncompleteField {
            field,
            reason: reason.to_string(),
        };

        if self.email.trim().is_empty() {
            return Err(incomplete("Email", "Email is required"));
        }
        if check_email(self.email.trim()).is_err() {
            return Err(incomplete("Email", "Invalid email address"));
        }
        if self.index_number.trim().is_empty() {
            return Err(incomplete("Index Number", "Index number is required"));
        }
        if self.year_of_study.is_none() {
            return Err(incomplete("Year of Study", "Year of study is required"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(incomplete("Phone Number", "Phone number is required"));
        }
        Ok(())
    }
}

/// Guarded survey form
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: WizardStep,
    pub personal: PersonalDetails,
    option: Option<SelectedOption>,
    selections: Selections,
    pub additional_courses: String,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn option(&self) -> Option<SelectedOption> {
        self.option
    }

    /// Choose an option. Existing selections are kept.
    pub fn choose_option(&mut self, option: SelectedOption) {
        self.option = Some(option);
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Tick or untick `label` in category `number`. Returns the new state.
    pub fn toggle_module(&mut self, number: usize, label: &str) -> bool {
        match self.selections.category_mut(number) {
            Some(list) => toggle(list, label),
            None => false,
        }
    }

    /// Tick or untick a software. Returns the new state.
    pub fn toggle_software(&mut self, name: &str) -> bool {
        toggle(&mut self.selections.software_selections, name)
    }

    pub fn is_module_selected(&self, number: usize, label: &str) -> bool {
        self.selections
            .category(number)
            .is_some_and(|list| list.iter().any(|l| l == label))
    }

    pub fn is_software_selected(&self, name: &str) -> bool {
        self.selections.software().iter().any(|s| s == name)
    }

    /// Live counts shown next to the checkboxes
    pub fn counts(&self) -> SelectionCounts {
        rules::count_selections(&self.selections)
    }

    /// Check the current step without moving
    pub fn check_step(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::Personal => self.personal.check(),
            WizardStep::Option => self.option.map(|_| ()).ok_or(WizardError::NoOption),
            WizardStep::Modules => {
                rules::validate(self.option, &self.selections)?;
                Ok(())
            }
            WizardStep::Review => Ok(()),
        }
    }

    /// Move forward if the current step is complete
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.step.next().ok_or(WizardError::AtLastStep)?;
        self.check_step()?;
        debug!(from = %self.step, to = %next, "Wizard advanced");
        self.step = next;
        Ok(next)
    }

    /// Move one step back
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// Build the submission payload. Only allowed on the Review step.
    pub fn finish(&self) -> Result<NewResponse, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotAtReview { step: self.step });
        }

        // Fields could have been edited after their step was left
        self.personal.check()?;
        rules::validate(self.option, &self.selections)?;

        Ok(NewResponse {
            email: self.personal.email.trim().to_string(),
            index_number: self.personal.index_number.trim().to_string(),
            year_of_study: self
                .personal
                .year_of_study
                .map(|y| y.to_string())
                .unwrap_or_default(),
            phone_number: self.personal.phone_number.trim().to_string(),
            selected_option: self.option.map(|o| o.to_string()),
            selections: self.selections.clone(),
            additional_courses: Some(self.additional_courses.trim().to_string()),
        })
    }

    /// Start over after a successful submission
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn toggle(list: &mut Vec<String>, item: &str) -> bool {
    if let Some(pos) = list.iter().position(|l| l == item) {
        list.remove(pos);
        false
    } else {
        list.push(item.to_string());
        true
    }
}
