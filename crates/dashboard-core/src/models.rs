use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single typed spreadsheet cell.
///
/// Readers decide the variant explicitly; nothing downstream re-infers types
/// from text except through [`CellValue::as_number`] and the `dates` module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Blank cell.
    Empty,
    /// Free text.
    Text(String),
    /// Any numeric cell (spreadsheets do not distinguish ints from floats).
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// A date or date-time cell.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Deterministic textual form used for category axes and group keys.
    ///
    /// Whole numbers print without a fractional part so that a month column
    /// stored as `1.0` labels as `"1"`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_plain_number(*n),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Interpret the cell as a finite number.
    ///
    /// Numeric text (after trimming) is accepted; blanks, booleans, dates and
    /// non-finite values are not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// `true` for blank cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn format_plain_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// An ordered, immutable table parsed from one spreadsheet.
///
/// Every row is padded (or truncated) to the header width on construction so
/// cell lookups by column index never go out of bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from a header row and data rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All data rows in file order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the header row.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
    }

    /// Iterate over one column's cells in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Keep the rows for which `keep` returns `true`, preserving order.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[CellValue]) -> bool) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// ── Derived structures ────────────────────────────────────────────────────────

/// One point of a line or bar series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Ordered `(label, value)` points.
pub type DerivedSeries = Vec<SeriesPoint>;

/// The row holding an extreme value of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    /// Zero-based row position in the dataset the lookup ran on.
    pub index: usize,
    pub value: f64,
}

/// Maximum and minimum of one column, each resolved independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremumPair {
    pub max: Extremum,
    pub min: Extremum,
}

/// Ordered tuple of key values identifying a partition.
pub type GroupKey = Vec<String>;

/// One partition of a grouping operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: GroupKey,
    /// Sum or count, depending on the operation.
    pub value: f64,
    /// Number of input rows that fell into this partition.
    pub rows: usize,
}

/// Partitions in first-seen order (unless an operation documents otherwise).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub groups: Vec<Group>,
}

impl GroupAggregate {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up the aggregated value for `key`.
    pub fn get(&self, key: &[&str]) -> Option<f64> {
        self.groups
            .iter()
            .find(|g| g.key.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|g| g.value)
    }

    /// Sum of all partition values.
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.value).sum()
    }

    /// Sum of all partition row counts.
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows).sum()
    }
}

/// A grouped sum together with the partition holding the largest sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSum {
    pub aggregate: GroupAggregate,
    /// First-encountered key among those with the maximum sum.
    pub max_key: GroupKey,
}

/// Per-month totals of the two sides of a month-aligned merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// Calendar month, 1–12.
    pub month: u32,
    pub left: f64,
    pub right: f64,
}

// ── Configuration types ───────────────────────────────────────────────────────

/// How malformed cells are treated by operations that must interpret them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Fail the whole view on the first malformed cell.
    #[default]
    Strict,
    /// Drop the malformed row and log a warning.
    Skip,
}

/// One side of a month-aligned merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSource {
    /// Column holding the date the month is derived from.
    pub date_column: String,
    /// Column summed per month.
    pub value_column: String,
}

impl MonthSource {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
        }
    }
}

/// Names of the columns each dashboard view reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub month: String,
    pub revenue: String,
    pub discount: String,
    pub quantity: String,
    pub sale_type: String,
    pub province: String,
    pub category: String,
    pub item_type: String,
    pub sale_date: String,
    pub production_date: String,
    pub sale_quantity: String,
    pub production_quantity: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            month: "bulan".to_string(),
            revenue: "pend_total".to_string(),
            discount: "diskon".to_string(),
            quantity: "qty".to_string(),
            sale_type: "jenis_penjualan".to_string(),
            province: "prov".to_string(),
            category: "kategori".to_string(),
            item_type: "jenis_barang".to_string(),
            sale_date: "tgl_jual".to_string(),
            production_date: "tgl_prod".to_string(),
            sale_quantity: "qty1".to_string(),
            production_quantity: "qty2".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_to_text_whole_number_has_no_fraction() {
        assert_eq!(CellValue::Number(1.0).to_text(), "1");
        assert_eq!(CellValue::Number(-12.0).to_text(), "-12");
    }

    #[test]
    fn test_to_text_fractional_number() {
        assert_eq!(CellValue::Number(2.5).to_text(), "2.5");
    }

    #[test]
    fn test_to_text_date_and_bool() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_text(), "2024-03-01 00:00:00");
        assert_eq!(CellValue::Bool(true).to_text(), "True");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_to_text_is_stable_across_calls() {
        let v = CellValue::Number(0.1 + 0.2);
        assert_eq!(v.to_text(), v.to_text());
    }

    #[test]
    fn test_as_number_accepts_numeric_text() {
        assert_eq!(text(" 42.5 ").as_number(), Some(42.5));
        assert_eq!(CellValue::Number(7.0).as_number(), Some(7.0));
    }

    #[test]
    fn test_as_number_rejects_non_numeric() {
        assert_eq!(text("abc").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_dataset_pads_short_rows() {
        let ds = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(ds.rows()[0].len(), 2);
        assert_eq!(ds.rows()[0][1], CellValue::Empty);
    }

    #[test]
    fn test_dataset_missing_column() {
        let ds = Dataset::new(vec!["a".to_string()], vec![]);
        match ds.column_index("bulan") {
            Err(DashboardError::MissingColumn(name)) => assert_eq!(name, "bulan"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_dataset_head_and_filter() {
        let ds = Dataset::new(
            vec!["n".to_string()],
            (0..10).map(|i| vec![CellValue::Number(i as f64)]).collect(),
        );
        assert_eq!(ds.head(3).len(), 3);
        assert_eq!(ds.head(50).len(), 10);

        let even = ds.filter_rows(|r| r[0].as_number().map(|n| n % 2.0 == 0.0).unwrap_or(false));
        assert_eq!(even.len(), 5);
        assert_eq!(even.columns(), ds.columns());
    }

    #[test]
    fn test_group_aggregate_lookup_and_totals() {
        let agg = GroupAggregate {
            groups: vec![
                Group {
                    key: vec!["A".to_string(), "x".to_string()],
                    value: 3.0,
                    rows: 2,
                },
                Group {
                    key: vec!["B".to_string(), "x".to_string()],
                    value: 4.0,
                    rows: 1,
                },
            ],
        };
        assert_eq!(agg.get(&["A", "x"]), Some(3.0));
        assert_eq!(agg.get(&["A", "y"]), None);
        assert_eq!(agg.total(), 7.0);
        assert_eq!(agg.row_count(), 3);
    }

    #[test]
    fn test_cell_value_serialises_untagged() {
        let json = serde_json::to_string(&vec![
            CellValue::Empty,
            CellValue::Number(1.5),
            text("x"),
        ])
        .unwrap();
        assert_eq!(json, "[null,1.5,\"x\"]");
    }

    #[test]
    fn test_column_map_defaults() {
        let map = ColumnMap::default();
        assert_eq!(map.month, "bulan");
        assert_eq!(map.sale_quantity, "qty1");
        assert_eq!(map.production_date, "tgl_prod");
    }
}
