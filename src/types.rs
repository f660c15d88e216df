//! Type-safe survey types
//!
//! Options and years travel as strings on the wire. Here they are enums
//! with the same spelling, so a typo is a parse error instead of a silently
//! unmatched rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Module selection plan a participant commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum SelectedOption {
    #[serde(rename = "Option 1")]
    #[strum(serialize = "Option 1")]
    Option1,
    #[serde(rename = "Option 2")]
    #[strum(serialize = "Option 2")]
    Option2,
    #[serde(rename = "Option 3")]
    #[strum(serialize = "Option 3")]
    Option3,
}

impl SelectedOption {
    /// Parse a raw form value. Absent, blank and unknown values all yield `None`.
    pub fn from_field(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }

    /// Short label shown next to the radio button
    pub const fn label(self) -> &'static str {
        match self {
            Self::Option1 => "Only 2 major modules",
            Self::Option2 => "Only 3 modules (1 major module + 2 sub-modules)",
            Self::Option3 => "Only 4 sub-modules of your choice from any category",
        }
    }

    /// Composition the option requires, as shown to the participant
    pub const fn requirement(self) -> &'static str {
        match self {
            Self::Option1 => "exactly 2 major modules (no software allowed)",
            Self::Option2 => "1 major module + 2 sub-modules/software",
            Self::Option3 => "exactly 4 sub-modules/software (no major modules)",
        }
    }
}

/// Participant's current year of study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum YearOfStudy {
    #[serde(rename = "Year 2")]
    #[strum(serialize = "Year 2")]
    Year2,
    #[serde(rename = "Year 3")]
    #[strum(serialize = "Year 3")]
    Year3,
    #[serde(rename = "Year 4")]
    #[strum(serialize = "Year 4")]
    Year4,
}

/// Export file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// File extension without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Dashboard filter over the selected option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionFilter {
    #[default]
    All,
    Only(SelectedOption),
}

impl OptionFilter {
    /// True if the response's option passes this filter
    pub fn matches(self, option: SelectedOption) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == option,
        }
    }

    /// File-name friendly form: `all`, `option-1`, ...
    pub fn slug(self) -> String {
        self.to_string().to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for OptionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(option) => write!(f, "{}", option),
        }
    }
}

/// Error returned when an option filter cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid option filter '{0}'. Valid values: all, \"Option 1\", \"Option 2\", \"Option 3\" (or 1, 2, 3)")]
pub struct OptionFilterError(String);

impl FromStr for OptionFilter {
    type Err = OptionFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();

        match normalized.as_str() {
            "all" => Ok(Self::All),
            "option1" | "1" => Ok(Self::Only(SelectedOption::Option1)),
            "option2" | "2" => Ok(Self::Only(SelectedOption::Option2)),
            "option3" | "3" => Ok(Self::Only(SelectedOption::Option3)),
            _ => Err(OptionFilterError(s.to_string())),
        }
    }
}
