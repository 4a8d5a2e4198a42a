//! Aggregation pipeline over an in-memory [`Dataset`].
//!
//! Every function here is a pure, single-pass transformation: it reads the
//! dataset, never mutates it, and returns a freshly built value. Grouping
//! operations keep partitions in first-seen order so tie-breaks are
//! deterministic for a given row order.

use std::collections::{BTreeMap, HashMap};

use dashboard_core::dates::month_of;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{
    CellValue, Dataset, DerivedSeries, Extremum, ExtremumPair, Group, GroupAggregate, GroupKey,
    GroupedSum, MonthSource, MonthlyTotal, RowPolicy, SeriesPoint,
};
use tracing::{debug, warn};

// ── Axis & series ─────────────────────────────────────────────────────────────

/// Textual form of every value in `column`, in row order.
pub fn coerce_month_axis(dataset: &Dataset, column: &str) -> Result<Vec<String>> {
    Ok(dataset.column(column)?.map(CellValue::to_text).collect())
}

/// Pair the coerced `label_column` with the numeric `value_column`.
///
/// Rows whose value is not numeric are left out of the series.
pub fn series(dataset: &Dataset, label_column: &str, value_column: &str) -> Result<DerivedSeries> {
    let labels = coerce_month_axis(dataset, label_column)?;
    let values = dataset.column(value_column)?;

    Ok(labels
        .into_iter()
        .zip(values)
        .filter_map(|(label, cell)| cell.as_number().map(|value| SeriesPoint { label, value }))
        .collect())
}

// ── Extremum ──────────────────────────────────────────────────────────────────

/// Locate the maximum and minimum of a numeric column.
///
/// Non-numeric and blank cells are skipped. Ties resolve to the earliest row.
pub fn find_extremum(dataset: &Dataset, column: &str) -> Result<ExtremumPair> {
    let cells = dataset.column(column)?;
    if dataset.is_empty() {
        return Err(DashboardError::EmptyInput {
            operation: "find_extremum",
        });
    }

    let mut best: Option<ExtremumPair> = None;
    for (index, cell) in cells.enumerate() {
        let Some(value) = cell.as_number() else {
            continue;
        };
        let here = Extremum { index, value };
        best = Some(match best {
            None => ExtremumPair {
                max: here,
                min: here,
            },
            Some(mut pair) => {
                if value > pair.max.value {
                    pair.max = here;
                }
                if value < pair.min.value {
                    pair.min = here;
                }
                pair
            }
        });
    }

    best.ok_or_else(|| DashboardError::NoValidValues {
        column: column.to_string(),
    })
}

// ── Row filters ───────────────────────────────────────────────────────────────

/// Keep rows where `lo < value < hi`. Non-numeric rows are dropped.
pub fn filter_open_interval(dataset: &Dataset, column: &str, lo: f64, hi: f64) -> Result<Dataset> {
    let idx = dataset.column_index(column)?;
    let filtered = dataset.filter_rows(|row| {
        row[idx]
            .as_number()
            .map(|v| lo < v && v < hi)
            .unwrap_or(false)
    });
    debug!(
        "filter_open_interval({}, {}, {}): {} -> {} rows",
        column,
        lo,
        hi,
        dataset.len(),
        filtered.len()
    );
    Ok(filtered)
}

/// Drop rows whose `column` reads exactly `excluded`.
///
/// Matching nothing is not an error.
pub fn exclude_value(dataset: &Dataset, column: &str, excluded: &str) -> Result<Dataset> {
    let idx = dataset.column_index(column)?;
    let kept = dataset.filter_rows(|row| row[idx].to_text() != excluded);
    debug!(
        "exclude_value({} == {:?}): removed {} rows",
        column,
        excluded,
        dataset.len() - kept.len()
    );
    Ok(kept)
}

// ── Grouping ──────────────────────────────────────────────────────────────────

/// Sum `value_column` per distinct tuple of `keys`.
///
/// Blank values contribute nothing. Non-numeric text fails the call under
/// [`RowPolicy::Strict`]; under [`RowPolicy::Skip`] the row still counts
/// toward its partition but adds nothing to the sum.
pub fn grouped_sum(
    dataset: &Dataset,
    keys: &[&str],
    value_column: &str,
    policy: RowPolicy,
) -> Result<GroupedSum> {
    let key_idx = key_indices(dataset, keys)?;
    let value_idx = dataset.column_index(value_column)?;
    if dataset.is_empty() {
        return Err(DashboardError::EmptyInput {
            operation: "grouped_sum",
        });
    }

    let mut partitions = Partitions::default();
    for (row_no, row) in dataset.rows().iter().enumerate() {
        let amount = numeric_or_policy(&row[value_idx], value_column, row_no, policy)?;
        partitions.add(make_key(row, &key_idx), amount.unwrap_or(0.0));
    }

    let aggregate = partitions.finish();
    let max_key = aggregate
        .groups
        .iter()
        .fold(None::<&Group>, |best, g| match best {
            Some(b) if b.value >= g.value => Some(b),
            _ => Some(g),
        })
        .map(|g| g.key.clone())
        .ok_or(DashboardError::EmptyInput {
            operation: "grouped_sum",
        })?;

    debug!(
        "grouped_sum({:?}, {}): {} partitions, max {:?}",
        keys,
        value_column,
        aggregate.len(),
        max_key
    );
    Ok(GroupedSum { aggregate, max_key })
}

/// Count rows per distinct tuple of `keys`, in first-seen order.
pub fn cross_tabulate(dataset: &Dataset, keys: &[&str]) -> Result<GroupAggregate> {
    let key_idx = key_indices(dataset, keys)?;

    let mut partitions = Partitions::default();
    for row in dataset.rows() {
        partitions.add(make_key(row, &key_idx), 1.0);
    }
    Ok(partitions.finish())
}

/// Count non-blank values of `column`, most frequent first.
///
/// Equal counts keep first-seen order.
pub fn value_counts(dataset: &Dataset, column: &str) -> Result<GroupAggregate> {
    let idx = dataset.column_index(column)?;

    let mut partitions = Partitions::default();
    for row in dataset.rows() {
        let cell = &row[idx];
        if cell.is_empty() {
            continue;
        }
        partitions.add(vec![cell.to_text()], 1.0);
    }

    Ok(most_common_first(partitions))
}

/// Count the numeric values of `column`, most frequent first.
///
/// Cells are keyed by their parsed number, so `25`, `"25.0"` and `" 25"` land
/// in one group. Blank and non-numeric cells are not counted.
pub fn numeric_value_counts(dataset: &Dataset, column: &str) -> Result<GroupAggregate> {
    let idx = dataset.column_index(column)?;

    let mut partitions = Partitions::default();
    for row in dataset.rows() {
        if let Some(v) = row[idx].as_number() {
            partitions.add(vec![CellValue::Number(v).to_text()], 1.0);
        }
    }

    Ok(most_common_first(partitions))
}

// ── Month-aligned merge ───────────────────────────────────────────────────────

/// Sum each side's value column per calendar month of its date column and
/// outer-join the two on month.
///
/// A month present on only one side reads `0.0` on the other. Output is
/// ascending by month.
pub fn month_aligned_merge(
    dataset: &Dataset,
    left: &MonthSource,
    right: &MonthSource,
    policy: RowPolicy,
) -> Result<Vec<MonthlyTotal>> {
    let left_sums = monthly_sums(dataset, left, policy)?;
    let right_sums = monthly_sums(dataset, right, policy)?;

    let mut merged: BTreeMap<u32, MonthlyTotal> = BTreeMap::new();
    for (&month, &sum) in &left_sums {
        merged
            .entry(month)
            .or_insert(MonthlyTotal {
                month,
                left: 0.0,
                right: 0.0,
            })
            .left = sum;
    }
    for (&month, &sum) in &right_sums {
        merged
            .entry(month)
            .or_insert(MonthlyTotal {
                month,
                left: 0.0,
                right: 0.0,
            })
            .right = sum;
    }

    debug!(
        "month_aligned_merge: {} left months, {} right months, {} merged",
        left_sums.len(),
        right_sums.len(),
        merged.len()
    );
    Ok(merged.into_values().collect())
}

/// Per-month sum of one [`MonthSource`].
fn monthly_sums(
    dataset: &Dataset,
    source: &MonthSource,
    policy: RowPolicy,
) -> Result<BTreeMap<u32, f64>> {
    let date_idx = dataset.column_index(&source.date_column)?;
    let value_idx = dataset.column_index(&source.value_column)?;

    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for (row_no, row) in dataset.rows().iter().enumerate() {
        let month = match month_of(&row[date_idx], &source.date_column, row_no) {
            Ok(m) => m,
            Err(e) if policy == RowPolicy::Skip => {
                warn!("Skipping row: {}", e);
                continue;
            }
            Err(e) => return Err(e),
        };
        let amount = numeric_or_policy(&row[value_idx], &source.value_column, row_no, policy)?;
        *sums.entry(month).or_insert(0.0) += amount.unwrap_or(0.0);
    }
    Ok(sums)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// First-seen-ordered partitions keyed by [`GroupKey`].
#[derive(Default)]
struct Partitions {
    index: HashMap<GroupKey, usize>,
    groups: Vec<Group>,
}

impl Partitions {
    fn add(&mut self, key: GroupKey, amount: f64) {
        let slot = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.groups.len();
                self.index.insert(key.clone(), i);
                self.groups.push(Group {
                    key,
                    value: 0.0,
                    rows: 0,
                });
                i
            }
        };
        let group = &mut self.groups[slot];
        group.value += amount;
        group.rows += 1;
    }

    fn finish(self) -> GroupAggregate {
        GroupAggregate {
            groups: self.groups,
        }
    }
}

/// Stable sort by row count, descending.
fn most_common_first(partitions: Partitions) -> GroupAggregate {
    let mut aggregate = partitions.finish();
    aggregate.groups.sort_by(|a, b| b.rows.cmp(&a.rows));
    aggregate
}

fn key_indices(dataset: &Dataset, keys: &[&str]) -> Result<Vec<usize>> {
    keys.iter().map(|k| dataset.column_index(k)).collect()
}

fn make_key(row: &[CellValue], key_idx: &[usize]) -> GroupKey {
    key_idx.iter().map(|&i| row[i].to_text()).collect()
}

/// Read a numeric cell for summation.
///
/// `Ok(None)` means "contributes nothing": a blank cell, or malformed text
/// under [`RowPolicy::Skip`].
fn numeric_or_policy(
    cell: &CellValue,
    column: &str,
    row: usize,
    policy: RowPolicy,
) -> Result<Option<f64>> {
    if let Some(v) = cell.as_number() {
        return Ok(Some(v));
    }
    if cell.is_empty() {
        return Ok(None);
    }
    let err = DashboardError::InvalidNumber {
        column: column.to_string(),
        row,
        value: cell.to_text(),
    };
    match policy {
        RowPolicy::Strict => Err(err),
        RowPolicy::Skip => {
            warn!("Ignoring value: {}", err);
            Ok(None)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
