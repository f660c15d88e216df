//! modsurvey library
//!
//! Module-selection survey: the option rule validator, admission of
//! submissions, response stores, the terminal wizard and the CSV/XLSX
//! exporter used by the admin commands.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config_file;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod flatten;
pub mod response;
pub mod rules;
pub mod store;
pub mod submission;
pub mod theme;
pub mod types;
pub mod ui;
pub mod wizard;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use config_file::AppConfig;
pub use error::{Result, SurveyError};
pub use export::{ExportFile, export_delimited, export_tabular};
pub use flatten::{COLUMNS, FlatRow, flatten};
pub use response::{NewResponse, Selections, SurveyResponse};
pub use rules::{RejectionReason, SelectionCounts, validate};
pub use store::{HttpStore, JsonFileStore, MemoryStore, ResponseStore};
pub use submission::{AdmissionPolicy, ValidResponse, admit, submit};
pub use types::{ExportFormat, OptionFilter, SelectedOption, YearOfStudy};
pub use wizard::{Wizard, WizardError, WizardStep};
