//! Survey response records and wire payloads.
//!
//! Field names follow the REST API the survey form talks to
//! (`index_number`, `category1_selections`, ...). The form itself speaks a
//! camelCase shape ([`FormPayload`]) that is converted into a [`NewResponse`]
//! before admission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{SelectedOption, YearOfStudy};

/// Number of module categories on the form
pub const CATEGORY_COUNT: usize = 7;

/// Treat a missing or `null` list the same as an empty one.
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-category module selections plus software, keyed as on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    #[serde(default, deserialize_with = "nullable_list")]
    pub category1_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category2_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category3_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category4_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category5_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category6_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category7_selections: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub software_selections: Vec<String>,
}

impl Selections {
    /// Selections of category `number` (1-based). Out-of-range numbers yield `None`.
    pub fn category(&self, number: usize) -> Option<&[String]> {
        let list = match number {
            1 => &self.category1_selections,
            2 => &self.category2_selections,
            3 => &self.category3_selections,
            4 => &self.category4_selections,
            5 => &self.category5_selections,
            6 => &self.category6_selections,
            7 => &self.category7_selections,
            _ => return None,
        };
        Some(list.as_slice())
    }

    /// Mutable access to category `number` (1-based).
    pub fn category_mut(&mut self, number: usize) -> Option<&mut Vec<String>> {
        match number {
            1 => Some(&mut self.category1_selections),
            2 => Some(&mut self.category2_selections),
            3 => Some(&mut self.category3_selections),
            4 => Some(&mut self.category4_selections),
            5 => Some(&mut self.category5_selections),
            6 => Some(&mut self.category6_selections),
            7 => Some(&mut self.category7_selections),
            _ => None,
        }
    }

    /// All categories in order, paired with their 1-based number.
    pub fn categories(&self) -> impl Iterator<Item = (usize, &[String])> {
        (1..=CATEGORY_COUNT).filter_map(move |n| self.category(n).map(|list| (n, list)))
    }

    pub fn software(&self) -> &[String] {
        &self.software_selections
    }

    /// True if no module and no software is selected
    pub fn is_empty(&self) -> bool {
        self.categories().all(|(_, list)| list.is_empty()) && self.software_selections.is_empty()
    }
}

/// Creation payload as received from a client.
///
/// `year_of_study` and `selected_option` stay raw strings: an untrusted client
/// may send anything, and admission reports bad values as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResponse {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub index_number: String,
    #[serde(default)]
    pub year_of_study: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(flatten)]
    pub selections: Selections,
    #[serde(default)]
    pub additional_courses: Option<String>,
}

/// A persisted survey submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: u64,
    pub email: String,
    pub index_number: String,
    pub year_of_study: YearOfStudy,
    pub phone_number: String,
    pub selected_option: SelectedOption,
    #[serde(flatten)]
    pub selections: Selections,
    #[serde(default)]
    pub additional_courses: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// Confirmation e-mail status, as reported by the survey API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent_at: Option<DateTime<Utc>>,
}

impl SurveyResponse {
    /// Additional course suggestion, with blank text treated as absent
    pub fn additional_courses(&self) -> Option<&str> {
        self.additional_courses
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Raw form values as produced by the survey form.
///
/// Keys are exactly `category1` ... `category7` and `software`; every list
/// may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub index_number: String,
    #[serde(default)]
    pub year_of_study: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category1: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category2: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category3: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category4: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category5: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category6: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub category7: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub software: Vec<String>,
    #[serde(default)]
    pub additional_courses: Option<String>,
}

impl From<FormPayload> for NewResponse {
    fn from(form: FormPayload) -> Self {
        Self {
            email: form.email,
            index_number: form.index_number,
            year_of_study: form.year_of_study,
            phone_number: form.phone_number,
            selected_option: form.selected_option,
            selections: Selections {
                category1_selections: form.category1,
                category2_selections: form.category2,
                category3_selections: form.category3,
                category4_selections: form.category4,
                category5_selections: form.category5,
                category6_selections: form.category6,
                category7_selections: form.category7,
                software_selections: form.software,
            },
            additional_courses: Some(form.additional_courses.unwrap_or_default()),
        }
    }
}

/// Parse a submission file that holds either the form shape or the API shape.
///
/// The form shape is recognised by its camelCase `indexNumber` key.
pub fn parse_submission(json: &str) -> serde_json::Result<NewResponse> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("indexNumber").is_some() {
        let form: FormPayload = serde_json::from_value(value)?;
        Ok(form.into())
    } else {
        serde_json::from_value(value)
    }
}
