//! Response flattening for tabular export.
//!
//! Every response becomes one row with the same fixed columns in the same
//! order. Missing lists and missing text flatten to `""`, never to a null
//! marker, so the encoders never see a hole.

use indexmap::IndexMap;

use crate::response::{CATEGORY_COUNT, SurveyResponse};

/// Separator used to join list cells
pub const LIST_DELIMITER: &str = "; ";

/// Timestamp layout of the `Submitted At` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Column schema, in export order
pub const COLUMNS: [&str; 16] = [
    "ID",
    "Index Number",
    "Email",
    "Year of Study",
    "Phone Number",
    "Selected Option",
    "Submitted At",
    "Category 1 Selections",
    "Category 2 Selections",
    "Category 3 Selections",
    "Category 4 Selections",
    "Category 5 Selections",
    "Category 6 Selections",
    "Category 7 Selections",
    "Software Selections",
    "Additional Courses",
];

/// One flattened response: column name to cell text, in column order
pub type FlatRow = IndexMap<String, String>;

/// Join a list cell
pub fn join_list(items: &[String]) -> String {
    items.join(LIST_DELIMITER)
}

/// Inverse of [`join_list`] for items that do not contain the delimiter
pub fn split_joined(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(LIST_DELIMITER).map(str::to_string).collect()
}

/// Column name of category `number` (1-based)
pub fn category_column(number: usize) -> String {
    format!("Category {} Selections", number)
}

/// Flatten one response into a row with every column present.
pub fn flatten(response: &SurveyResponse) -> FlatRow {
    let mut row = FlatRow::with_capacity(COLUMNS.len());

    row.insert("ID".into(), response.id.to_string());
    row.insert("Index Number".into(), response.index_number.clone());
    row.insert("Email".into(), response.email.clone());
    row.insert("Year of Study".into(), response.year_of_study.to_string());
    row.insert("Phone Number".into(), response.phone_number.clone());
    row.insert(
        "Selected Option".into(),
        response.selected_option.to_string(),
    );
    row.insert(
        "Submitted At".into(),
        response.submitted_at.format(TIMESTAMP_FORMAT).to_string(),
    );

    for number in 1..=CATEGORY_COUNT {
        let cell = response
            .selections
            .category(number)
            .map(join_list)
            .unwrap_or_default();
        row.insert(category_column(number), cell);
    }

    row.insert(
        "Software Selections".into(),
        join_list(response.selections.software()),
    );
    row.insert(
        "Additional Courses".into(),
        response.additional_courses.clone().unwrap_or_default(),
    );

    row
}
