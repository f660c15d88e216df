//! CSV and XLSX export of flattened responses.
//!
//! Both encoders take their header from the first flattened row and apply
//! that column order to every row. With no responses the fixed
//! [`COLUMNS`] schema is used, so an empty export is a header-only file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{info, warn};

use crate::error::{Result, SurveyError};
use crate::flatten::{COLUMNS, FlatRow, flatten};
use crate::response::SurveyResponse;
use crate::types::ExportFormat;

/// Worksheet name of the XLSX export
pub const SHEET_NAME: &str = "Survey Responses";

/// Upper bound of an XLSX column width, in characters
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Column written as a number in the XLSX sheet
const ID_COLUMN: &str = "ID";

/// An encoded export, ready to be written or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write into `dir`, creating it if needed. Returns the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| {
            SurveyError::export(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .map_err(|e| SurveyError::export(format!("cannot write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = self.bytes.len(), "Export written");
        Ok(path)
    }
}

/// `{base_name}-{YYYY-MM-DD}.{ext}`
pub fn export_file_name(base_name: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{}-{}.{}",
        base_name,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn header_of(first: Option<&FlatRow>) -> Vec<String> {
    match first {
        Some(row) => row.keys().cloned().collect(),
        None => COLUMNS.iter().map(|c| c.to_string()).collect(),
    }
}

fn cells<'a>(row: &'a FlatRow, header: &'a [String]) -> impl Iterator<Item = &'a str> {
    header
        .iter()
        .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
}

/// Stream responses as CSV into `writer`, one flattened row at a time.
pub fn write_delimited<W: Write>(responses: &[SurveyResponse], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let mut rows = responses.iter().map(flatten);
    let first = rows.next();
    let header = header_of(first.as_ref());

    csv.write_record(&header)?;
    for row in first.into_iter().chain(rows) {
        csv.write_record(cells(&row, &header))?;
    }
    csv.flush()
        .map_err(|e| SurveyError::export(e.to_string()))?;

    Ok(())
}

/// Encode responses as a CSV file.
pub fn export_delimited(
    responses: &[SurveyResponse],
    base_name: &str,
    date: NaiveDate,
) -> Result<ExportFile> {
    if responses.is_empty() {
        warn!("Exporting zero responses, file will only contain the header");
    }

    let mut bytes = Vec::new();
    write_delimited(responses, &mut bytes)?;

    info!(rows = responses.len(), "CSV export encoded");
    Ok(ExportFile {
        file_name: export_file_name(base_name, date, ExportFormat::Csv),
        bytes,
    })
}

/// Column widths: longest data cell + 2, capped. Header text is not measured.
fn column_widths(rows: &[FlatRow], header: &[String]) -> Vec<Option<usize>> {
    let mut widths = vec![None; header.len()];
    for row in rows {
        for (slot, cell) in widths.iter_mut().zip(cells(row, header)) {
            let len = cell.chars().count();
            *slot = Some(slot.map_or(len, |w: usize| w.max(len)));
        }
    }
    widths
        .into_iter()
        .map(|w| w.map(|w| (w + 2).min(MAX_COLUMN_WIDTH)))
        .collect()
}

fn numeric_id(column: &str, cell: &str) -> Option<u64> {
    if column == ID_COLUMN {
        cell.parse().ok()
    } else {
        None
    }
}

/// Encode responses as an XLSX workbook with a single sheet.
pub fn export_tabular(
    responses: &[SurveyResponse],
    base_name: &str,
    date: NaiveDate,
) -> Result<ExportFile> {
    if responses.is_empty() {
        warn!("Exporting zero responses, sheet will only contain the header");
    }

    let rows: Vec<FlatRow> = responses.iter().map(flatten).collect();
    let header = header_of(rows.first());

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &bold)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, (name, cell)) in header.iter().zip(cells(row, &header)).enumerate() {
            // IDs stay numeric so the sheet sorts them as numbers
            match numeric_id(name, cell) {
                Some(id) => sheet.write_number(line, col as u16, id as f64)?,
                None => sheet.write_string(line, col as u16, cell)?,
            };
        }
    }

    for (col, width) in column_widths(&rows, &header).into_iter().enumerate() {
        if let Some(width) = width {
            sheet.set_column_width(col as u16, width as f64)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;

    info!(rows = rows.len(), "XLSX export encoded");
    Ok(ExportFile {
        file_name: export_file_name(base_name, date, ExportFormat::Xlsx),
        bytes,
    })
}

/// Dispatch on [`ExportFormat`]
pub fn export(
    format: ExportFormat,
    responses: &[SurveyResponse],
    base_name: &str,
    date: NaiveDate,
) -> Result<ExportFile> {
    match format {
        ExportFormat::Csv => export_delimited(responses, base_name, date),
        ExportFormat::Xlsx => export_tabular(responses, base_name, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Selections;
    use crate::types::{SelectedOption, YearOfStudy};
    use chrono::{TimeZone, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
    }

    fn response(id: u64, software: &[&str], notes: Option<&str>) -> SurveyResponse {
        SurveyResponse {
            id,
            email: format!("student{}@st.umat.edu.gh", id),
            index_number: format!("MN/{:04}/22", id),
            year_of_study: YearOfStudy::Year3,
            phone_number: "0240000000".into(),
            selected_option: SelectedOption::Option3,
            selections: Selections {
                category1_selections: vec![
                    "Drilling Technology & Equipment".into(),
                    "Blast Design & Engineering".into(),
                ],
                software_selections: software.iter().map(|s| s.to_string()).collect(),
                ..Selections::default()
            },
            additional_courses: notes.map(str::to_string),
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
            email_sent: None,
            email_sent_at: None,
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            export_file_name("mmesa-survey-all", date(), ExportFormat::Csv),
            "mmesa-survey-all-2025-06-03.csv"
        );
        assert_eq!(
            export_file_name("x", date(), ExportFormat::Xlsx),
            "x-2025-06-03.xlsx"
        );
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let file = export_delimited(&[], "mmesa-survey-all", date()).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text, format!("{}\r\n", COLUMNS.join(",")));
        assert_eq!(file.file_name, "mmesa-survey-all-2025-06-03.csv");
    }

    #[test]
    fn test_csv_rows_and_quoting() {
        let responses = vec![
            response(1, &["Matlab", "Ansys"], Some("Mine ventilation, surveying")),
            response(2, &["Surpac", "Deswik"], None),
        ];
        let file = export_delimited(&responses, "out", date()).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "");
        assert!(lines[1].starts_with("1,MN/0001/22,student1@st.umat.edu.gh,Year 3,"));
        assert!(lines[1].contains("Matlab; Ansys"));
        assert!(lines[1].ends_with("\"Mine ventilation, surveying\""));
        assert!(lines[2].ends_with("Surpac; Deswik,"));
    }

    #[test]
    fn test_write_delimited_streams_to_writer() {
        let mut out = Vec::new();
        write_delimited(&[response(5, &["Leapfrog", "Datamine"], None)], &mut out).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), COLUMNS.len());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "5");
        assert_eq!(&record[14], "Leapfrog; Datamine");
    }

    #[test]
    fn test_column_widths_use_data_only() {
        let rows = vec![flatten(&response(1, &[], None))];
        let header = header_of(rows.first());
        let widths = column_widths(&rows, &header);
        // "1" + 2
        assert_eq!(widths[0], Some(3));
        // "Year 3" + 2, header "Year of Study" is longer but ignored
        assert_eq!(widths[3], Some(8));
        // empty additional courses
        assert_eq!(widths[15], Some(2));
    }

    #[test]
    fn test_column_widths_capped() {
        let long = "x".repeat(120);
        let rows = vec![flatten(&response(1, &[], Some(&long)))];
        let header = header_of(rows.first());
        assert_eq!(column_widths(&rows, &header)[15], Some(MAX_COLUMN_WIDTH));
        assert!(column_widths(&[], &header).iter().all(Option::is_none));
    }

    #[test]
    fn test_xlsx_is_zip_container() {
        let file = export_tabular(&[response(1, &["Matlab", "Ansys"], None)], "out", date())
            .unwrap();
        assert_eq!(file.file_name, "out-2025-06-03.xlsx");
        assert_eq!(&file.bytes[..2], b"PK");

        let empty = export_tabular(&[], "out", date()).unwrap();
        assert_eq!(&empty.bytes[..2], b"PK");
    }

    /// Read one XML part out of an XLSX container
    fn read_part(bytes: &[u8], name: &str) -> String {
        use std::io::Read;

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }

    /// Shared string table, in index order
    fn shared_strings(xml: &str) -> Vec<String> {
        xml.split("<t")
            .skip(1)
            .filter_map(|piece| {
                let open_end = piece.find('>')?;
                if piece[..open_end].ends_with('/') {
                    return Some(String::new());
                }
                let end = piece.find("</t>")?;
                Some(unescape(&piece[open_end + 1..end]))
            })
            .collect()
    }

    /// The `<c>` element of a cell reference such as `A1`
    fn cell_xml<'a>(sheet: &'a str, reference: &str) -> &'a str {
        let start = sheet.find(&format!("<c r=\"{}\"", reference)).unwrap();
        let end = start + sheet[start..].find("</c>").unwrap();
        &sheet[start..end]
    }

    fn attr(element: &str, name: &str) -> Option<f64> {
        let key = format!(" {}=\"", name);
        let start = element.find(&key)? + key.len();
        let end = start + element[start..].find('"')?;
        element[start..end].parse().ok()
    }

    /// Width of 1-based column `col` from the `<cols>` block
    fn column_width(sheet: &str, col: usize) -> Option<f64> {
        sheet.split("<col ").skip(1).find_map(|piece| {
            let element = format!(" {}", &piece[..piece.find('>')?]);
            let min = attr(&element, "min")? as usize;
            let max = attr(&element, "max")? as usize;
            (min..=max).contains(&col).then(|| attr(&element, "width")).flatten()
        })
    }

    /// Excel stores a character width plus 5 pixels of padding (at 7 px per char)
    fn assert_width(sheet: &str, col: usize, chars: usize) {
        let width = column_width(sheet, col).unwrap();
        let expected = chars as f64 + 5.0 / 7.0;
        assert!(
            (width - expected).abs() < 0.01,
            "column {} width {} != {}",
            col,
            width,
            expected
        );
    }

    #[test]
    fn test_xlsx_sheet_contents() {
        let notes = "x".repeat(120);
        let record = response(1, &["Matlab", "Ansys"], Some(&notes));
        let file = export_tabular(std::slice::from_ref(&record), "out", date()).unwrap();

        let workbook = read_part(&file.bytes, "xl/workbook.xml");
        assert!(workbook.contains(&format!("<sheet name=\"{}\"", SHEET_NAME)));

        // Header first, then the data row's text cells in column order
        let strings = shared_strings(&read_part(&file.bytes, "xl/sharedStrings.xml"));
        assert_eq!(&strings[..COLUMNS.len()], COLUMNS.map(String::from).as_slice());

        let row = flatten(&record);
        let mut expected: Vec<String> = Vec::new();
        for (column, cell) in row.iter().skip(1) {
            assert_ne!(column, ID_COLUMN);
            if !cell.is_empty() && !expected.contains(cell) {
                expected.push(cell.clone());
            }
        }
        let data: Vec<String> = strings[COLUMNS.len()..]
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();
        assert_eq!(data, expected);
        assert!(data.contains(&"Drilling Technology & Equipment; Blast Design & Engineering".to_string()));

        let sheet = read_part(&file.bytes, "xl/worksheets/sheet1.xml");

        // Bold header: styled cell, and a bold font in the stylesheet
        assert!(cell_xml(&sheet, "A1").contains(" s=\""));
        assert!(read_part(&file.bytes, "xl/styles.xml").contains("<b/>"));

        // Numeric ID, unstyled
        let id = cell_xml(&sheet, "A2");
        assert!(!id.contains("t=\"s\""));
        assert!(!id.contains(" s=\""));
        assert!(id.contains("<v>1</v>"));

        // Longest data cell + 2, capped
        assert_width(&sheet, 1, 3);
        assert_width(&sheet, 2, "MN/0001/22".len() + 2);
        assert_width(&sheet, 7, "2025-06-01 09:30:00 UTC".len() + 2);
        assert_width(&sheet, 10, 2);
        assert_width(&sheet, 16, MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_xlsx_empty_sheet_has_header_only() {
        let file = export_tabular(&[], "out", date()).unwrap();
        let strings = shared_strings(&read_part(&file.bytes, "xl/sharedStrings.xml"));
        assert_eq!(strings, COLUMNS.map(String::from).to_vec());

        let sheet = read_part(&file.bytes, "xl/worksheets/sheet1.xml");
        assert!(!sheet.contains("<c r=\"A2\""));
        assert!(column_width(&sheet, 1).is_none());
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = export_delimited(&[], "base", date()).unwrap();
        let path = file.write_to(&dir.path().join("exports")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), file.bytes);
    }
}
