//! Application state definitions
//!
//! The wizard owns the survey answers; this module holds what only the
//! terminal front end needs on top of it: focus, cursors and the feedback line.

use strum::IntoEnumIterator;

use crate::catalog::Catalog;
use crate::rules::is_major;
use crate::theme::MessageKind;
use crate::types::{SelectedOption, YearOfStudy};
use crate::wizard::Wizard;

/// Input fields of the personal information step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Email,
    IndexNumber,
    YearOfStudy,
    PhoneNumber,
}

impl PersonalField {
    /// Get all fields in order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Email,
            Self::IndexNumber,
            Self::YearOfStudy,
            Self::PhoneNumber,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email Address",
            Self::IndexNumber => "Index Number",
            Self::YearOfStudy => "Year of Study",
            Self::PhoneNumber => "Phone Number",
        }
    }

    /// The year is picked from a fixed list instead of typed
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::YearOfStudy)
    }
}

/// One tickable row of the module step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistItem {
    Module { category: usize, label: String },
    Software(String),
}

impl ChecklistItem {
    /// Rows in display order: every category's modules, then software
    pub fn from_catalog(catalog: &Catalog) -> Vec<Self> {
        let mut categories: Vec<_> = catalog.categories.iter().collect();
        categories.sort_by_key(|c| c.number);

        let modules = categories.into_iter().flat_map(|c| {
            c.modules.iter().map(move |label| Self::Module {
                category: c.number,
                label: label.clone(),
            })
        });
        let software = catalog.software.iter().cloned().map(Self::Software);

        modules.chain(software).collect()
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Module { label, .. } => label,
            Self::Software(name) => name,
        }
    }

    pub fn is_major(&self) -> bool {
        matches!(self, Self::Module { label, .. } if is_major(label))
    }

    pub fn is_checked(&self, wizard: &Wizard) -> bool {
        match self {
            Self::Module { category, label } => wizard.is_module_selected(*category, label),
            Self::Software(name) => wizard.is_software_selected(name),
        }
    }

    pub fn toggle(&self, wizard: &mut Wizard) -> bool {
        match self {
            Self::Module { category, label } => wizard.toggle_module(*category, label),
            Self::Software(name) => wizard.toggle_software(name),
        }
    }
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub wizard: Wizard,
    pub catalog: Catalog,
    /// Checklist rows built from the catalog
    pub items: Vec<ChecklistItem>,
    /// Focused field on the personal step
    pub personal_field: usize,
    /// Highlighted option on the option step
    pub option_cursor: usize,
    /// Highlighted row on the module step
    pub module_cursor: usize,
    /// Feedback line under the current screen
    pub message: Option<(MessageKind, String)>,
    /// Where submissions go, shown in the header
    pub store_label: String,
    /// Number of responses stored during this session
    pub submitted_count: usize,
}

impl AppState {
    pub fn new(catalog: Catalog, store_label: impl Into<String>) -> Self {
        Self {
            wizard: Wizard::new(),
            items: ChecklistItem::from_catalog(&catalog),
            catalog,
            personal_field: 0,
            option_cursor: 0,
            module_cursor: 0,
            message: None,
            store_label: store_label.into(),
            submitted_count: 0,
        }
    }

    pub fn current_field(&self) -> PersonalField {
        PersonalField::all()[self.personal_field]
    }

    pub fn next_field(&mut self) {
        let max = PersonalField::all().len() - 1;
        if self.personal_field < max {
            self.personal_field += 1;
        }
    }

    pub fn previous_field(&mut self) {
        self.personal_field = self.personal_field.saturating_sub(1);
    }

    /// Text buffer behind a typed field
    pub fn field_value_mut(&mut self, field: PersonalField) -> Option<&mut String> {
        let personal = &mut self.wizard.personal;
        match field {
            PersonalField::Email => Some(&mut personal.email),
            PersonalField::IndexNumber => Some(&mut personal.index_number),
            PersonalField::PhoneNumber => Some(&mut personal.phone_number),
            PersonalField::YearOfStudy => None,
        }
    }

    /// Display text of a field
    pub fn field_value(&self, field: PersonalField) -> String {
        let personal = &self.wizard.personal;
        match field {
            PersonalField::Email => personal.email.clone(),
            PersonalField::IndexNumber => personal.index_number.clone(),
            PersonalField::PhoneNumber => personal.phone_number.clone(),
            PersonalField::YearOfStudy => personal
                .year_of_study
                .map(|y| y.to_string())
                .unwrap_or_default(),
        }
    }

    /// Step the year choice forward or backward, wrapping around
    pub fn cycle_year(&mut self, forward: bool) {
        let years: Vec<YearOfStudy> = YearOfStudy::iter().collect();
        let current = self
            .wizard
            .personal
            .year_of_study
            .and_then(|y| years.iter().position(|&c| c == y));

        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => years.len() - 1,
            (Some(i), true) => (i + 1) % years.len(),
            (Some(i), false) => (i + years.len() - 1) % years.len(),
        };
        self.wizard.personal.year_of_study = Some(years[next]);
    }

    /// Option under the cursor on the option step
    pub fn highlighted_option(&self) -> SelectedOption {
        SelectedOption::iter()
            .nth(self.option_cursor)
            .unwrap_or(SelectedOption::Option1)
    }

    pub fn set_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some((kind, text.into()));
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Fresh form after a submission; the session counter survives
    pub fn reset_form(&mut self) {
        self.wizard.reset();
        self.personal_field = 0;
        self.option_cursor = 0;
        self.module_cursor = 0;
    }
}
