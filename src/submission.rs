//! Admission of untrusted survey payloads.
//!
//! [`admit`] is the only constructor of [`ValidResponse`], and every
//! [`ResponseStore::create`] takes a `ValidResponse`. A payload therefore
//! cannot reach a store without passing the identity checks, the optional
//! catalog check and the selection rule validator, whichever client sent it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::{Result, SurveyError};
use crate::response::{NewResponse, Selections, SurveyResponse};
use crate::rules::{self, SelectionCounts};
use crate::store::ResponseStore;
use crate::types::{SelectedOption, YearOfStudy};

/// Admission settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Reject labels the catalog does not offer, and duplicates
    pub enforce_catalog: bool,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            enforce_catalog: true,
        }
    }
}

/// A payload that passed admission. Fields are trimmed and blank selections dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidResponse {
    email: String,
    index_number: String,
    year_of_study: YearOfStudy,
    phone_number: String,
    selected_option: SelectedOption,
    selections: Selections,
    additional_courses: Option<String>,
    counts: SelectionCounts,
}

impl ValidResponse {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn index_number(&self) -> &str {
        &self.index_number
    }

    pub fn selected_option(&self) -> SelectedOption {
        self.selected_option
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn counts(&self) -> SelectionCounts {
        self.counts
    }

    /// Wire payload for a remote store
    pub fn to_payload(&self) -> NewResponse {
        NewResponse {
            email: self.email.clone(),
            index_number: self.index_number.clone(),
            year_of_study: self.year_of_study.to_string(),
            phone_number: self.phone_number.clone(),
            selected_option: Some(self.selected_option.to_string()),
            selections: self.selections.clone(),
            additional_courses: Some(self.additional_courses.clone().unwrap_or_default()),
        }
    }

    /// Stored record with the id and timestamp assigned by a store
    pub fn into_record(self, id: u64, submitted_at: DateTime<Utc>) -> SurveyResponse {
        SurveyResponse {
            id,
            email: self.email,
            index_number: self.index_number,
            year_of_study: self.year_of_study,
            phone_number: self.phone_number,
            selected_option: self.selected_option,
            selections: self.selections,
            additional_courses: self.additional_courses,
            submitted_at,
            email_sent: None,
            email_sent_at: None,
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SurveyError::invalid_field(field, "is required"));
    }
    Ok(value.to_string())
}

/// Minimal `local@domain.tld` shape check
pub fn check_email(email: &str) -> Result<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(SurveyError::invalid_field("email", "must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(SurveyError::invalid_field("email", "is not a valid address"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(SurveyError::invalid_field("email", "domain is not valid"));
    }
    if email.contains(char::is_whitespace) {
        return Err(SurveyError::invalid_field("email", "cannot contain whitespace"));
    }
    Ok(())
}

/// Parse the year field
pub fn parse_year(raw: &str) -> Result<YearOfStudy> {
    let raw = required("year_of_study", raw)?;
    raw.parse()
        .map_err(|_| SurveyError::invalid_field("year_of_study", format!("unknown year '{}'", raw)))
}

fn clean(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize(selections: &Selections) -> Selections {
    let mut cleaned = Selections {
        software_selections: clean(selections.software()),
        ..Selections::default()
    };
    for (number, list) in selections.categories() {
        if let Some(target) = cleaned.category_mut(number) {
            *target = clean(list);
        }
    }
    cleaned
}

/// Every label must be offered where it was ticked, and ticked once.
fn check_catalog(catalog: &Catalog, selections: &Selections) -> Result<()> {
    let mut seen = HashSet::new();

    for (number, list) in selections.categories() {
        for label in list {
            if !catalog.offers_module(number, label) {
                return Err(SurveyError::unknown_selection(format!(
                    "'{}' is not a module of category {}",
                    label, number
                )));
            }
            if !seen.insert(label.as_str()) {
                return Err(SurveyError::unknown_selection(format!(
                    "'{}' selected more than once",
                    label
                )));
            }
        }
    }

    let mut seen_software = HashSet::new();
    for name in selections.software() {
        if !catalog.offers_software(name) {
            return Err(SurveyError::unknown_selection(format!(
                "'{}' is not an offered software",
                name
            )));
        }
        if !seen_software.insert(name.as_str()) {
            return Err(SurveyError::unknown_selection(format!(
                "'{}' selected more than once",
                name
            )));
        }
    }

    Ok(())
}

/// Check a payload and turn it into a [`ValidResponse`].
pub fn admit(
    payload: &NewResponse,
    catalog: &Catalog,
    policy: AdmissionPolicy,
) -> Result<ValidResponse> {
    let email = required("email", &payload.email)?;
    check_email(&email)?;
    let index_number = required("index_number", &payload.index_number)?;
    let year_of_study = parse_year(&payload.year_of_study)?;
    let phone_number = required("phone_number", &payload.phone_number)?;

    let selections = normalize(&payload.selections);
    let selected_option = SelectedOption::from_field(payload.selected_option.as_deref());

    if policy.enforce_catalog {
        check_catalog(catalog, &selections)?;
    }

    let counts = rules::validate(selected_option, &selections).map_err(|reason| {
        warn!(index_number = %index_number, %reason, "Submission rejected");
        SurveyError::from(reason)
    })?;

    // `validate` only succeeds with an option present
    let selected_option = selected_option.ok_or(rules::RejectionReason::MissingOption)?;

    let additional_courses = payload
        .additional_courses
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ValidResponse {
        email,
        index_number,
        year_of_study,
        phone_number,
        selected_option,
        selections,
        additional_courses,
        counts,
    })
}

/// Admit a payload and persist it. Rejection happens before any store call.
pub fn submit<S: ResponseStore + ?Sized>(
    store: &mut S,
    payload: &NewResponse,
    catalog: &Catalog,
    policy: AdmissionPolicy,
) -> Result<SurveyResponse> {
    let valid = admit(payload, catalog, policy)?;
    let stored = store.create(valid)?;
    info!(
        id = stored.id,
        option = %stored.selected_option,
        "Survey response stored"
    );
    Ok(stored)
}
