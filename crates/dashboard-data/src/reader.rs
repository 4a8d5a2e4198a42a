//! Spreadsheet intake for the sales dashboard.
//!
//! Reads an uploaded file once into memory and turns its first (or named)
//! worksheet into a [`Dataset`]. Workbooks go through `calamine`; CSV files
//! through the `csv` crate with explicit per-field typing.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use dashboard_core::dates::{excel_serial_to_datetime, parse_date_text};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{CellValue, Dataset};
use tracing::{debug, info};

// ── FileFormat ────────────────────────────────────────────────────────────────

/// Container format of an uploaded spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Anything `calamine` opens: xlsx, xlsm, xlsb, xls, ods.
    Workbook,
    /// Comma-separated values with a header line.
    Csv,
}

impl FileFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(FileFormat::Workbook),
            Some("csv") => Ok(FileFormat::Csv),
            _ => Err(DashboardError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read `path` from disk and parse it into a [`Dataset`].
///
/// `sheet` selects a worksheet by name; `None` takes the first one. Ignored
/// for CSV files.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let format = FileFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_dataset(bytes, format, sheet)?;
    info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse an in-memory spreadsheet.
pub fn parse_dataset(bytes: Vec<u8>, format: FileFormat, sheet: Option<&str>) -> Result<Dataset> {
    match format {
        FileFormat::Workbook => read_workbook(bytes, sheet),
        FileFormat::Csv => read_csv(Cursor::new(bytes)),
    }
}

// ── Workbooks ─────────────────────────────────────────────────────────────────

fn read_workbook(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DashboardError::Workbook(e.to_string()))?;

    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| DashboardError::SheetNotFound(wanted.to_string()))?,
        None => names.first().cloned().ok_or(DashboardError::NoSheets)?,
    };
    debug!("Reading worksheet {:?} (of {})", name, names.len());

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| DashboardError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(DashboardError::EmptySheet)?;
    let columns = header_names(header.iter().map(convert_cell));

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    Ok(Dataset::new(columns, data))
}

/// Map a `calamine` cell to a [`CellValue`].
///
/// Error cells (`#DIV/0!` and friends) become blanks.
fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .or_else(|| excel_serial_to_datetime(dt.as_f64()))
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_date_text(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            debug!("Treating error cell {:?} as blank", e);
            CellValue::Empty
        }
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let header = csv_reader
        .headers()
        .map_err(|e| DashboardError::Csv(e.to_string()))?
        .clone();
    if header.is_empty() {
        return Err(DashboardError::EmptySheet);
    }
    let columns = header_names(header.iter().map(|h| CellValue::Text(h.to_string())));

    let mut data = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| DashboardError::Csv(e.to_string()))?;
        let row: Vec<CellValue> = record.iter().map(type_csv_field).collect();
        if !row.iter().all(CellValue::is_empty) {
            data.push(row);
        }
    }

    Ok(Dataset::new(columns, data))
}

/// Assign a type to one CSV field: blank, number, boolean, else text.
///
/// Dates stay textual; the `dates` module parses them where a view needs it.
fn type_csv_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return CellValue::Number(n);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::Text(field.to_string()),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Turn header cells into column names.
///
/// Names are trimmed; blank headers become `Unnamed: <index>`. A repeated
/// name gets a `.1`, `.2`, ... suffix so every column stays addressable.
fn header_names(cells: impl Iterator<Item = CellValue>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for (i, cell) in cells.enumerate() {
        let base = cell.to_text().trim().to_string();
        let base = if base.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            base
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            debug!("Renamed duplicate column '{}' to '{}'", base, name);
        }
        taken.insert(name.clone());
        names.push(name);
    }
    names
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use rust_xlsxwriter::{Format, Workbook};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.set_name("Penjualan").unwrap();

        sheet.write_string(0, 0, "bulan").unwrap();
        sheet.write_string(0, 1, "pend_total").unwrap();
        sheet.write_string(0, 2, "tgl_jual").unwrap();
        sheet.write_string(0, 3, "prov").unwrap();

        sheet.write_number(1, 0, 1).unwrap();
        sheet.write_number(1, 1, 1500.5).unwrap();
        sheet
            .write_number_with_format(1, 2, 45306, &date_format)
            .unwrap();
        sheet.write_string(1, 3, "Jawa Barat").unwrap();

        sheet.write_string(2, 0, "Feb").unwrap();
        sheet.write_number(2, 1, 900).unwrap();
        sheet
            .write_number_with_format(2, 2, 45337, &date_format)
            .unwrap();
        sheet.write_string(2, 3, "Bali").unwrap();

        let other = workbook.add_worksheet();
        other.set_name("Catatan").unwrap();
        other.write_string(0, 0, "note").unwrap();
        other.write_string(1, 0, "ignore me").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    // ── FileFormat ────────────────────────────────────────────────────────

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("data.XLSX")).unwrap(),
            FileFormat::Workbook
        );
        assert_eq!(
            FileFormat::from_path(Path::new("data.ods")).unwrap(),
            FileFormat::Workbook
        );
        assert_eq!(
            FileFormat::from_path(Path::new("data.csv")).unwrap(),
            FileFormat::Csv
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("data.pdf")),
            Err(DashboardError::UnsupportedFormat(_))
        ));
        assert!(FileFormat::from_path(Path::new("no_extension")).is_err());
    }

    // ── Workbooks ─────────────────────────────────────────────────────────

    #[test]
    fn test_read_workbook_first_sheet() {
        let ds = parse_dataset(sample_xlsx(), FileFormat::Workbook, None).unwrap();

        assert_eq!(ds.columns(), &["bulan", "pend_total", "tgl_jual", "prov"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0][0], CellValue::Number(1.0));
        assert_eq!(ds.rows()[0][1], CellValue::Number(1500.5));
        assert_eq!(ds.rows()[1][0], CellValue::Text("Feb".to_string()));
        assert_eq!(ds.rows()[0][3], CellValue::Text("Jawa Barat".to_string()));
    }

    #[test]
    fn test_read_workbook_date_cells_become_datetimes() {
        let ds = parse_dataset(sample_xlsx(), FileFormat::Workbook, None).unwrap();
        match &ds.rows()[0][2] {
            CellValue::DateTime(dt) => {
                assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
            }
            other => panic!("expected a date cell, got {:?}", other),
        }
        match &ds.rows()[1][2] {
            CellValue::DateTime(dt) => assert_eq!(dt.month(), 2),
            other => panic!("expected a date cell, got {:?}", other),
        }
    }

    #[test]
    fn test_read_workbook_named_sheet() {
        let ds = parse_dataset(sample_xlsx(), FileFormat::Workbook, Some("Catatan")).unwrap();
        assert_eq!(ds.columns(), &["note"]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_read_workbook_unknown_sheet() {
        let err = parse_dataset(sample_xlsx(), FileFormat::Workbook, Some("Nope")).unwrap_err();
        assert!(matches!(err, DashboardError::SheetNotFound(name) if name == "Nope"));
    }

    #[test]
    fn test_read_workbook_rejects_garbage_bytes() {
        let err = parse_dataset(b"not a workbook".to_vec(), FileFormat::Workbook, None)
            .unwrap_err();
        assert!(matches!(err, DashboardError::Workbook(_)));
    }

    // ── CSV ───────────────────────────────────────────────────────────────

    #[test]
    fn test_read_csv_types_fields() {
        let csv = "bulan, diskon ,jenis_penjualan,aktif\n1,10,retail,true\n2,,giveaway,FALSE\n";
        let ds = parse_dataset(csv.as_bytes().to_vec(), FileFormat::Csv, None).unwrap();

        assert_eq!(ds.columns(), &["bulan", "diskon", "jenis_penjualan", "aktif"]);
        assert_eq!(ds.rows()[0][1], CellValue::Number(10.0));
        assert_eq!(ds.rows()[1][1], CellValue::Empty);
        assert_eq!(ds.rows()[0][2], CellValue::Text("retail".to_string()));
        assert_eq!(ds.rows()[0][3], CellValue::Bool(true));
        assert_eq!(ds.rows()[1][3], CellValue::Bool(false));
    }

    #[test]
    fn test_read_csv_skips_blank_rows_and_pads_short_ones() {
        let csv = "a,b,c\n1,2,3\n,,\n4\n";
        let ds = parse_dataset(csv.as_bytes().to_vec(), FileFormat::Csv, None).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1], vec![CellValue::Number(4.0), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_read_csv_blank_header_is_named() {
        let csv = "a,,c\n1,2,3\n";
        let ds = parse_dataset(csv.as_bytes().to_vec(), FileFormat::Csv, None).unwrap();
        assert_eq!(ds.columns(), &["a", "Unnamed: 1", "c"]);
    }

    #[test]
    fn test_read_csv_duplicate_headers_get_suffixes() {
        let csv = "qty,qty.1,qty,qty\n1,2,3,4\n";
        let ds = parse_dataset(csv.as_bytes().to_vec(), FileFormat::Csv, None).unwrap();
        assert_eq!(ds.columns(), &["qty", "qty.1", "qty.2", "qty.3"]);
        let third: Vec<&CellValue> = ds.column("qty.2").unwrap().collect();
        assert_eq!(third, vec![&CellValue::Number(3.0)]);
    }

    #[test]
    fn test_read_csv_dates_stay_textual() {
        let csv = "tgl_jual\n2024-03-05\n";
        let ds = parse_dataset(csv.as_bytes().to_vec(), FileFormat::Csv, None).unwrap();
        assert_eq!(ds.rows()[0][0], CellValue::Text("2024-03-05".to_string()));
    }

    // ── load_dataset ──────────────────────────────────────────────────────

    #[test]
    fn test_load_dataset_from_disk() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("penjualan.xlsx");
        std::fs::write(&path, sample_xlsx()).expect("write workbook");

        let ds = load_dataset(&path, None).unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let err = load_dataset(&PathBuf::from("/nonexistent/penjualan.csv"), None).unwrap_err();
        match err {
            DashboardError::FileRead { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/penjualan.csv"));
            }
            other => panic!("expected FileRead, got {:?}", other),
        }
    }
}
