//! Integration tests for modsurvey
//!
//! Exercise the public API end to end: admission into a file store,
//! dashboard queries, export files on disk and configuration loading.

use std::fs;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::{NamedTempFile, tempdir};

use modsurvey::catalog::Catalog;
use modsurvey::config_file::{AppConfig, StoreConfig};
use modsurvey::dashboard::{self, OptionStats, ResponseQuery};
use modsurvey::export;
use modsurvey::flatten::COLUMNS;
use modsurvey::response::{NewResponse, Selections, parse_submission};
use modsurvey::store::{HttpStore, HttpStoreConfig, JsonFileStore, ResponseStore};
use modsurvey::submission::{AdmissionPolicy, admit, submit};
use modsurvey::types::{ExportFormat, OptionFilter, SelectedOption, YearOfStudy};
use modsurvey::{RejectionReason, SurveyError};

const MAJOR_1: &str = "*Drilling & Blasting Technology*";
const MAJOR_2: &str = "*Mine Excavation & Materials Transportation*";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn payload(index: &str, year: &str, option: &str, c1: &[&str], c2: &[&str], sw: &[&str]) -> NewResponse {
    NewResponse {
        email: format!("{}@st.umat.edu.gh", index.to_lowercase().replace('/', "")),
        index_number: index.to_string(),
        year_of_study: year.to_string(),
        phone_number: "0241234567".to_string(),
        selected_option: Some(option.to_string()),
        selections: Selections {
            category1_selections: strings(c1),
            category2_selections: strings(c2),
            software_selections: strings(sw),
            ..Selections::default()
        },
        additional_courses: Some(String::new()),
    }
}

fn option1(index: &str) -> NewResponse {
    payload(index, "Year 3", "Option 1", &[MAJOR_1], &[MAJOR_2], &[])
}

fn option2(index: &str) -> NewResponse {
    payload(
        index,
        "Year 2",
        "Option 2",
        &[MAJOR_1, "Blast Design & Engineering"],
        &[],
        &["Surpac"],
    )
}

fn option3(index: &str) -> NewResponse {
    payload(
        index,
        "Year 4",
        "Option 3",
        &["Drilling Technology & Equipment"],
        &["Hauling & Transportation Systems"],
        &["Matlab", "Ansys"],
    )
}

/// Fill a file store with one response per option
fn seeded_store(path: &std::path::Path) -> JsonFileStore {
    let catalog = Catalog::standard();
    let mut store = JsonFileStore::open(path);
    for new in [option1("MN/0001/22"), option2("MN/0002/22"), option3("MN/0003/22")] {
        submit(&mut store, &new, &catalog, AdmissionPolicy::default()).unwrap();
    }
    store
}

// =============================================================================
// Submission and storage
// =============================================================================

#[test]
fn test_submissions_persist_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.json");
    seeded_store(&path);

    let reopened = JsonFileStore::open(&path);
    let all = reopened.list().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(all[2].selected_option, SelectedOption::Option3);
    assert_eq!(all[0].additional_courses, None);

    let second = reopened.get(2).unwrap();
    assert_eq!(second.index_number, "MN/0002/22");
    assert!(matches!(reopened.get(99), Err(SurveyError::NotFound(99))));
}

#[test]
fn test_rejected_submission_never_stored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.json");
    let catalog = Catalog::standard();
    let mut store = JsonFileStore::open(&path);

    // One major and one sub-module is not a valid Option 1
    let bad = payload(
        "MN/0009/22",
        "Year 3",
        "Option 1",
        &[MAJOR_1],
        &["Hauling & Transportation Systems"],
        &[],
    );
    let err = submit(&mut store, &bad, &catalog, AdmissionPolicy::default()).unwrap_err();
    assert!(matches!(
        err,
        SurveyError::Rejected(RejectionReason::CompositionMismatch { .. })
    ));
    assert!(err.is_recoverable());
    assert!(!path.exists());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_missing_option_rejected() {
    let mut new = option1("MN/0010/22");
    new.selected_option = None;
    let err = admit(&new, &Catalog::standard(), AdmissionPolicy::default()).unwrap_err();
    assert!(matches!(err, SurveyError::Rejected(RejectionReason::MissingOption)));
}

#[test]
fn test_catalog_enforcement_is_configurable() {
    let new = payload(
        "MN/0011/22",
        "Year 2",
        "Option 1",
        &["*Underground Mine Design*"],
        &[MAJOR_2],
        &[],
    );
    let catalog = Catalog::standard();

    let err = admit(&new, &catalog, AdmissionPolicy::default()).unwrap_err();
    assert!(matches!(err, SurveyError::UnknownSelection(_)));

    let relaxed = AdmissionPolicy {
        enforce_catalog: false,
    };
    let valid = admit(&new, &catalog, relaxed).unwrap();
    assert_eq!(valid.counts().majors, 2);
}

#[test]
fn test_form_file_round_trip_through_store() {
    let dir = tempdir().unwrap();
    let form = r#"{
        "email": "esi@st.umat.edu.gh",
        "indexNumber": "MN/0100/21",
        "yearOfStudy": "Year 4",
        "phoneNumber": "0209999999",
        "selectedOption": "Option 3",
        "category1": ["Drilling Technology & Equipment", "Explosives Science & Technology"],
        "software": ["Datamine", "Deswik"],
        "additionalCourses": "  Mine ventilation  "
    }"#;
    let new = parse_submission(form).unwrap();

    let mut store = JsonFileStore::open(dir.path().join("store.json"));
    let stored = submit(&mut store, &new, &Catalog::standard(), AdmissionPolicy::default()).unwrap();
    assert_eq!(stored.year_of_study, YearOfStudy::Year4);
    assert_eq!(stored.additional_courses(), Some("Mine ventilation"));
    assert!(stored.selections.category(2).unwrap().is_empty());
}

// =============================================================================
// Dashboard
// =============================================================================

#[test]
fn test_dashboard_filters_and_stats() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir.path().join("responses.json"));
    let all = store.list().unwrap();

    let stats = OptionStats::from_responses(&all);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.count(SelectedOption::Option2), 1);

    let only2 = dashboard::filter(&all, OptionFilter::Only(SelectedOption::Option2));
    assert_eq!(only2.len(), 1);
    assert_eq!(only2[0].index_number, "MN/0002/22");

    let query = ResponseQuery {
        option: OptionFilter::All,
        year: Some(YearOfStudy::Year4),
        search: Some("mn/0003".into()),
    };
    let found = query.apply(&all);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].selected_option, SelectedOption::Option3);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_csv_export_written_to_disk() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir.path().join("responses.json"));
    let filter = OptionFilter::Only(SelectedOption::Option3);
    let responses = dashboard::filter(&store.list().unwrap(), filter);
    let base = dashboard::export_base_name("mmesa-survey", filter);
    let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

    let file = export::export(ExportFormat::Csv, &responses, &base, date).unwrap();
    let out = dir.path().join("exports");
    let path = file.write_to(&out).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "mmesa-survey-option-3-2025-06-30.csv"
    );

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][1], "MN/0003/22");
    assert_eq!(&records[0][5], "Option 3");
    assert_eq!(&records[0][14], "Matlab; Ansys");
}

#[test]
fn test_empty_export_has_header_only() {
    let dir = tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let file = export::export(ExportFormat::Csv, &[], "mmesa-survey", date).unwrap();
    let path = file.write_to(dir.path()).unwrap();

    let text = fs::read_to_string(path).unwrap();
    assert_eq!(text, format!("{}\r\n", COLUMNS.join(",")));
}

#[test]
fn test_xlsx_export_written_to_disk() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir.path().join("responses.json"));
    let all = store.list().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

    let file = export::export(ExportFormat::Xlsx, &all, "mmesa-survey", date).unwrap();
    assert_eq!(file.file_name, "mmesa-survey-2025-06-30.xlsx");

    let path = file.write_to(dir.path()).unwrap();
    let bytes = fs::read(path).unwrap();
    // XLSX is a zip container
    assert_eq!(&bytes[..2], b"PK");
}

// =============================================================================
// Configuration and stores
// =============================================================================

#[test]
fn test_config_file_selects_store() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("data.json");
    seeded_store(&store_path);

    let config = AppConfig {
        store: StoreConfig::File {
            path: store_path.clone(),
        },
        ..AppConfig::default()
    };
    let file = NamedTempFile::new().unwrap();
    config.save_to_file(file.path()).unwrap();

    let loaded = AppConfig::load_from_file(file.path()).unwrap();
    assert_eq!(loaded, config);
    let store = loaded.store.open().unwrap();
    assert_eq!(store.list().unwrap().len(), 3);
}

#[test]
fn test_config_rejects_bad_api_url() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"{"store": {"kind": "api", "base_url": "ftp://survey.local"}}"#,
    )
    .unwrap();
    let loaded = AppConfig::load_from_file(file.path()).unwrap();
    assert!(matches!(loaded.store, StoreConfig::Api { timeout_secs: 10, .. }));
    assert!(loaded.validate().is_err());
}

#[test]
fn test_unreachable_api_is_transport_error() {
    let mut store = HttpStore::new(HttpStoreConfig {
        base_url: "http://127.0.0.1:9/api".into(),
        timeout: Duration::from_millis(500),
    })
    .unwrap();

    let err = submit(
        &mut store,
        &option1("MN/0004/22"),
        &Catalog::standard(),
        AdmissionPolicy::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SurveyError::Transport(_)));
    assert!(!err.is_recoverable());
}
