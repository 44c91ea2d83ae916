//! Catalog loading and row normalization.
//!
//! The catalog is a small table with the columns `gender`, `style`,
//! `temp_range` and `filename`, stored either as CSV or as a spreadsheet
//! workbook (first worksheet). Loading is strict about the schema and lenient
//! about rows: a missing column aborts the load, while a row that cannot be
//! normalized is dropped and reported.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader};
use thiserror::Error;

use crate::models::{ClothingRecord, Gender, Style};

use super::range_parser::parse_temp_range;

/// Columns every catalog source must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["gender", "style", "temp_range", "filename"];

/// Failures that prevent a catalog from loading at all
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Failed to open catalog '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read CSV catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read workbook catalog: {0}")]
    Workbook(String),
    #[error("Unsupported catalog format: '{0}' (expected .csv, .xlsx, .xls or .ods)")]
    UnsupportedFormat(String),
}

/// Why a row was left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Malformed(String),
    UnknownGender(String),
    UnknownStyle(String),
    StyleNotOffered { style: Style, gender: Gender },
    InvalidRange(String),
    InvalidFilename(String),
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::Malformed(msg) => write!(f, "malformed row: {}", msg),
            DropReason::UnknownGender(g) => write!(f, "unknown gender '{}'", g),
            DropReason::UnknownStyle(s) => write!(f, "unknown style '{}'", s),
            DropReason::StyleNotOffered { style, gender } => {
                write!(f, "style {} is not offered for gender {}", style, gender)
            }
            DropReason::InvalidRange(r) => write!(f, "unrecognized temp_range '{}'", r),
            DropReason::InvalidFilename(n) => write!(f, "invalid filename '{}'", n),
        }
    }
}

/// A row that did not make it into the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based line in the source, header included
    pub line: usize,
    pub reason: DropReason,
}

/// What happened while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub dropped: Vec<DroppedRow>,
}

/// Immutable, in-memory set of clothing records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<ClothingRecord>,
}

impl Catalog {
    pub fn new(records: Vec<ClothingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ClothingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads a catalog file, choosing the reader from the file extension
    pub fn load(path: &Path) -> Result<(Self, LoadReport), CatalogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let result = match ext.as_str() {
            "csv" => {
                let file = File::open(path).map_err(|source| CatalogError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_csv_reader(file)
            }
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_workbook(path),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }?;

        tracing::info!(
            path = %path.display(),
            rows_read = result.1.rows_read,
            rows_loaded = result.1.rows_loaded,
            rows_dropped = result.1.dropped.len(),
            "Catalog loaded"
        );

        Ok(result)
    }

    /// Reads a CSV table from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<(Self, LoadReport), CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let rows = reader.records().map(|result| {
            result
                .map(|record| record.iter().map(str::to_string).collect::<Vec<String>>())
                .map_err(|e| e.to_string())
        });

        Self::from_table(&headers, rows)
    }

    /// Reads the first worksheet of a spreadsheet workbook
    pub fn from_workbook(path: &Path) -> Result<(Self, LoadReport), CatalogError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| CatalogError::Workbook(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CatalogError::Workbook("workbook has no worksheets".to_string()))?
            .map_err(|e| CatalogError::Workbook(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .unwrap_or_default();

        let rows = rows.map(|row| {
            Ok::<Vec<String>, String>(row.iter().map(|value| value.to_string()).collect())
        });

        Self::from_table(&headers, rows)
    }

    /// Builds a catalog from a header row and data rows.
    ///
    /// Each data row is either its cells or a message describing why the
    /// source could not produce it.
    pub fn from_table<I>(headers: &[String], rows: I) -> Result<(Self, LoadReport), CatalogError>
    where
        I: IntoIterator<Item = Result<Vec<String>, String>>,
    {
        let header_map = build_header_map(headers);
        ensure_required_columns(&header_map)?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (idx, row) in rows.into_iter().enumerate() {
            // header occupies line 1
            let line = idx + 2;
            report.rows_read += 1;

            let outcome = row.map_err(DropReason::Malformed).and_then(|cells| {
                normalize_row(
                    cell(&cells, &header_map, "gender"),
                    cell(&cells, &header_map, "style"),
                    cell(&cells, &header_map, "temp_range"),
                    cell(&cells, &header_map, "filename"),
                )
            });

            match outcome {
                Ok(record) => records.push(record),
                Err(reason) => {
                    tracing::warn!(line, reason = %reason, "Dropping catalog row");
                    report.dropped.push(DroppedRow { line, reason });
                }
            }
        }

        report.rows_loaded = records.len();
        Ok((Self::new(records), report))
    }
}

/// Normalizes one raw row into a record.
///
/// Gender and style tokens are matched case-insensitively, the filename is
/// reduced to its final path component and the range goes through
/// [`parse_temp_range`].
pub fn normalize_row(
    gender: &str,
    style: &str,
    temp_range: &str,
    filename: &str,
) -> Result<ClothingRecord, DropReason> {
    let gender: Gender = gender
        .parse()
        .map_err(|_| DropReason::UnknownGender(gender.trim().to_string()))?;
    let style: Style = style
        .parse()
        .map_err(|_| DropReason::UnknownStyle(style.trim().to_string()))?;
    if !style.is_offered_for(gender) {
        return Err(DropReason::StyleNotOffered { style, gender });
    }

    let band = parse_temp_range(temp_range)
        .ok_or_else(|| DropReason::InvalidRange(temp_range.trim().to_string()))?;

    let image_ref = image_basename(filename)
        .ok_or_else(|| DropReason::InvalidFilename(filename.trim().to_string()))?;

    Ok(ClothingRecord::new(gender, style, band, image_ref))
}

/// Final path component of a file reference, either separator style accepted
pub fn image_basename(filename: &str) -> Option<String> {
    let normalized = filename.trim().replace('\\', "/");
    let base = normalized.rsplit('/').next().unwrap_or("").trim();
    match base {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Value of a named column, empty when the row is too short
fn cell<'a>(cells: &'a [String], header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|&i| cells.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // first occurrence wins on duplicate headers
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // spreadsheet exports often prefix the first header with a BOM
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn ensure_required_columns(header_map: &HashMap<String, usize>) -> Result<(), CatalogError> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(CatalogError::MissingColumns(missing))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::models::TempBand;

    fn load_csv(text: &str) -> Result<(Catalog, LoadReport), CatalogError> {
        Catalog::from_csv_reader(text.as_bytes())
    }

    #[test]
    fn test_loads_valid_rows() {
        let (catalog, report) = load_csv(
            "gender,style,temp_range,filename\n\
             F,CASUAL,20-25,a.png\n\
             F,CASUAL,26+,b.png\n\
             M,MINIMAL,04-,c.png\n",
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_loaded, 3);
        assert!(report.dropped.is_empty());
        assert_eq!(
            catalog.records()[2],
            ClothingRecord::new(Gender::Male, Style::Minimal, TempBand::new(-20, 4), "c.png")
        );
    }

    #[test]
    fn test_headers_and_tokens_are_case_insensitive() {
        let (catalog, _) = load_csv(
            "\u{feff} Gender , STYLE,Temp_Range,FileName\n\
             f , casual ,  27-23 , look.jpg\n",
        )
        .unwrap();

        let record = &catalog.records()[0];
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.style, Style::Casual);
        assert_eq!((record.temp_low, record.temp_high), (23, 27));
        assert_eq!(record.image_ref, "look.jpg");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let (catalog, _) = load_csv(
            "filename,temp_range,extra,style,gender\n\
             a.png,10-15,ignored,OFFICE,M\n",
        )
        .unwrap();
        assert_eq!(catalog.records()[0].style, Style::Office);
        assert_eq!(catalog.records()[0].image_ref, "a.png");
    }

    #[test]
    fn test_directory_components_are_stripped() {
        let (catalog, _) = load_csv(
            "gender,style,temp_range,filename\n\
             F,STREET,10-15,images/street/f1.png\n\
             F,STREET,10-15,C:\\photos\\f2.png\n\
             F,STREET,10-15,images/f3.png\n",
        )
        .unwrap();

        let names: Vec<&str> = catalog.records().iter().map(|r| r.image_ref.as_str()).collect();
        assert_eq!(names, vec!["f1.png", "f2.png", "f3.png"]);
    }

    #[test]
    fn test_bad_rows_are_dropped_and_reported() {
        let (catalog, report) = load_csv(
            "gender,style,temp_range,filename\n\
             F,CASUAL,abc,a.png\n\
             X,CASUAL,20-25,b.png\n\
             F,GOTHIC,20-25,c.png\n\
             M,LOVELY,20-25,d.png\n\
             F,CASUAL,20-25,images/\n\
             F,CASUAL,20-25,ok.png\n",
        )
        .unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].image_ref, "ok.png");
        assert_eq!(report.rows_read, 6);
        assert_eq!(report.rows_loaded, 1);

        let reasons: Vec<(usize, DropReason)> = report
            .dropped
            .into_iter()
            .map(|d| (d.line, d.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (2, DropReason::InvalidRange("abc".to_string())),
                (3, DropReason::UnknownGender("X".to_string())),
                (4, DropReason::UnknownStyle("GOTHIC".to_string())),
                (
                    5,
                    DropReason::StyleNotOffered {
                        style: Style::Lovely,
                        gender: Gender::Male
                    }
                ),
                (6, DropReason::InvalidFilename("images/".to_string())),
            ]
        );
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let (catalog, report) = load_csv(
            "gender,style,temp_range,filename\n\
             F,CASUAL\n",
        )
        .unwrap();
        assert!(catalog.is_empty());
        assert_eq!(report.dropped.len(), 1);
        assert!(matches!(report.dropped[0].reason, DropReason::InvalidRange(_)));
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let err = load_csv("gender,style,range\nF,CASUAL,20-25\n").unwrap_err();
        match err {
            CatalogError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["filename".to_string(), "temp_range".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_columns_message_names_columns() {
        let err = CatalogError::MissingColumns(vec!["filename".into(), "gender".into()]);
        assert_eq!(
            err.to_string(),
            "Catalog is missing required columns: filename, gender"
        );
    }

    #[test]
    fn test_malformed_source_row_is_dropped() {
        let rows = vec![
            Ok(vec!["F".into(), "OFFICE".into(), "5-10".into(), "o.png".into()]),
            Err("bad quoting".to_string()),
        ];
        let headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let (catalog, report) = Catalog::from_table(&headers, rows).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                line: 3,
                reason: DropReason::Malformed("bad quoting".to_string())
            }]
        );
    }

    #[test]
    fn test_load_from_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "gender,style,temp_range,filename").unwrap();
        writeln!(file, "M,STREET,12-19,street.png").unwrap();

        let (catalog, report) = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(report.rows_loaded, 1);
    }

    fn write_workbook(path: &Path, rows: &[&[&str]]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_load_from_xlsx_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_db.xlsx");
        write_workbook(
            &path,
            &[
                &["Gender", " STYLE ", "Temp_Range", "FileName"],
                &["f", "casual", "20-25", "C:\\closet\\a.png"],
                &["M", "MINIMAL", "warm", "m.png"],
                &["M", "street", "04-", "photos/s.png"],
            ],
        );

        let (catalog, report) = Catalog::load(&path).unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_loaded, 2);
        assert_eq!(
            catalog.records(),
            &[
                ClothingRecord::new(Gender::Female, Style::Casual, TempBand::new(20, 25), "a.png"),
                ClothingRecord::new(Gender::Male, Style::Street, TempBand::new(-20, 4), "s.png"),
            ]
        );
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                line: 3,
                reason: DropReason::InvalidRange("warm".to_string())
            }]
        );
    }

    #[test]
    fn test_xlsx_numeric_cells_are_read_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, header) in REQUIRED_COLUMNS.iter().enumerate() {
            sheet.write_string(0, c as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "F").unwrap();
        sheet.write_string(1, 1, "OFFICE").unwrap();
        sheet.write_number(1, 2, 15).unwrap();
        sheet.write_string(1, 3, "o.png").unwrap();
        workbook.save(&path).unwrap();

        let (catalog, report) = Catalog::load(&path).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                line: 2,
                reason: DropReason::InvalidRange("15".to_string())
            }]
        );
    }

    #[test]
    fn test_xlsx_missing_columns_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_db.xlsx");
        write_workbook(&path, &[&["gender", "style", "image"], &["F", "CASUAL", "a.png"]]);

        match Catalog::load(&path).unwrap_err() {
            CatalogError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["filename".to_string(), "temp_range".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Open { .. }));
    }

    #[test]
    fn test_image_basename() {
        assert_eq!(image_basename(" a.png "), Some("a.png".to_string()));
        assert_eq!(image_basename("x/y/z.png"), Some("z.png".to_string()));
        assert_eq!(image_basename("x\\z.png"), Some("z.png".to_string()));
        assert_eq!(image_basename(""), None);
        assert_eq!(image_basename("dir/.."), None);
    }
}
