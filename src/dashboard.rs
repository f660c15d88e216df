//! Admin dashboard queries: filtering, statistics and display lines.

use serde::Serialize;

use crate::flatten::{TIMESTAMP_FORMAT, join_list};
use crate::response::SurveyResponse;
use crate::rules::{self, SelectionCounts};
use crate::types::{OptionFilter, SelectedOption, YearOfStudy};

/// Keep only responses that pass `filter`
pub fn filter(responses: &[SurveyResponse], filter: OptionFilter) -> Vec<SurveyResponse> {
    responses
        .iter()
        .filter(|r| filter.matches(r.selected_option))
        .cloned()
        .collect()
}

/// Listing query: option filter, optional year, optional text search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseQuery {
    pub option: OptionFilter,
    pub year: Option<YearOfStudy>,
    /// Case-insensitive substring of email or index number
    pub search: Option<String>,
}

impl ResponseQuery {
    pub fn matches(&self, response: &SurveyResponse) -> bool {
        if !self.option.matches(response.selected_option) {
            return false;
        }
        if self.year.is_some_and(|y| y != response.year_of_study) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                response.email.to_lowercase().contains(&needle)
                    || response.index_number.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    pub fn apply(&self, responses: &[SurveyResponse]) -> Vec<SurveyResponse> {
        responses
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// Response totals per option
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptionStats {
    pub total: usize,
    pub option1: usize,
    pub option2: usize,
    pub option3: usize,
}

impl OptionStats {
    pub fn from_responses(responses: &[SurveyResponse]) -> Self {
        responses
            .iter()
            .fold(Self::default(), |mut stats, response| {
                stats.total += 1;
                match response.selected_option {
                    SelectedOption::Option1 => stats.option1 += 1,
                    SelectedOption::Option2 => stats.option2 += 1,
                    SelectedOption::Option3 => stats.option3 += 1,
                }
                stats
            })
    }

    pub fn count(&self, option: SelectedOption) -> usize {
        match option {
            SelectedOption::Option1 => self.option1,
            SelectedOption::Option2 => self.option2,
            SelectedOption::Option3 => self.option3,
        }
    }
}

/// Major/sub/software counts of a stored response
pub fn selection_summary(response: &SurveyResponse) -> SelectionCounts {
    rules::count_selections(&response.selections)
}

/// One listing line: id, index, email, year, option, counts, date
pub fn summary_line(response: &SurveyResponse) -> String {
    format!(
        "#{:<4} {:<14} {:<32} {:<7} {:<9} {:<40} {}",
        response.id,
        response.index_number,
        response.email,
        response.year_of_study.to_string(),
        response.selected_option.to_string(),
        selection_summary(response).to_string(),
        response.submitted_at.format("%Y-%m-%d")
    )
}

/// Full detail view, one line per field
pub fn detail_lines(response: &SurveyResponse) -> Vec<String> {
    let mut lines = vec![
        format!("Response #{}", response.id),
        format!("Index Number:    {}", response.index_number),
        format!("Email:           {}", response.email),
        format!("Year of Study:   {}", response.year_of_study),
        format!("Phone Number:    {}", response.phone_number),
        format!(
            "Selected Option: {} ({})",
            response.selected_option,
            response.selected_option.label()
        ),
        format!(
            "Submitted At:    {}",
            response.submitted_at.format(TIMESTAMP_FORMAT)
        ),
        format!("Selection:       {}", selection_summary(response)),
    ];

    for (number, list) in response.selections.categories() {
        if !list.is_empty() {
            lines.push(format!("Category {}:      {}", number, join_list(list)));
        }
    }
    if !response.selections.software().is_empty() {
        lines.push(format!(
            "Software:        {}",
            join_list(response.selections.software())
        ));
    }
    if let Some(courses) = response.additional_courses() {
        lines.push(format!("Additional:      {}", courses));
    }
    if let Some(status) = confirmation_status(response) {
        lines.push(format!("Confirmation:    {}", status));
    }

    lines
}

/// Confirmation e-mail status, when the store reports one
fn confirmation_status(response: &SurveyResponse) -> Option<String> {
    match (response.email_sent?, response.email_sent_at) {
        (true, Some(at)) => Some(format!("e-mail sent {}", at.format(TIMESTAMP_FORMAT))),
        (true, None) => Some("e-mail sent".to_string()),
        (false, _) => Some("e-mail not sent".to_string()),
    }
}

/// Export base name for a filtered download, e.g. `mmesa-survey-option-2`
pub fn export_base_name(base: &str, filter: OptionFilter) -> String {
    format!("{}-{}", base, filter.slug())
}
