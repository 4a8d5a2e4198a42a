//! Dashboard report assembly.
//!
//! Runs every view of the dashboard over one loaded [`Dataset`] and collects
//! the outcomes into a [`DashboardReport`] ready for the UI or JSON output.
//! Each view fails on its own; a failed view is recorded and logged while the
//! rest of the report is still produced.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{
    ColumnMap, Dataset, DerivedSeries, ExtremumPair, GroupAggregate, GroupKey, GroupedSum,
    MonthSource, MonthlyTotal, RowPolicy,
};
use dashboard_core::settings::Settings;

use crate::pipeline;
use crate::reader::load_dataset;

// ── Options ───────────────────────────────────────────────────────────────────

/// Knobs shared by every view.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Column names read by the views.
    pub columns: ColumnMap,
    /// Malformed-cell handling.
    pub policy: RowPolicy,
    /// Exclusive `(lo, hi)` bounds of the discount mix.
    pub discount_bounds: (f64, f64),
    /// Sale type removed before the sales-type mix.
    pub excluded_sale_type: String,
    /// Rows kept in the preview.
    pub preview_rows: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            policy: RowPolicy::Strict,
            discount_bounds: (0.0, 100.0),
            excluded_sale_type: "giveaway".to_string(),
            preview_rows: 5,
        }
    }
}

impl ReportOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            columns: ColumnMap::default(),
            policy: settings.bad_rows,
            discount_bounds: (settings.discount_min, settings.discount_max),
            excluded_sale_type: settings.exclude_sale_type.clone(),
            preview_rows: settings.preview_rows,
        }
    }
}

// ── View payloads ─────────────────────────────────────────────────────────────

/// Outcome of one view. Serialised as `{"ok": ...}` or `{"error": "..."}`.
pub type ViewOutcome<T> = std::result::Result<T, DashboardError>;

/// Revenue per month with the highest and lowest points marked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    /// Every month label in row order.
    pub axis: Vec<String>,
    /// Points with a numeric revenue.
    pub series: DerivedSeries,
    pub extremum: ExtremumPair,
    /// Axis label of the maximum row.
    pub max_label: String,
    /// Axis label of the minimum row.
    pub min_label: String,
}

/// Slices of a share chart with one slice pulled out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareView {
    pub slices: GroupAggregate,
    /// Key of the emphasised slice.
    pub highlight: GroupKey,
}

/// Metadata produced alongside the views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// File (or label) the dataset came from.
    pub source: String,
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of data rows in the dataset.
    pub rows: usize,
    /// Header row of the dataset.
    pub columns: Vec<String>,
    /// Wall-clock seconds spent reading the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent computing the views.
    pub build_time_seconds: f64,
}

/// Every view computed from one load of the source file.
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    #[serde(serialize_with = "outcome::serialize")]
    pub preview: ViewOutcome<Dataset>,
    #[serde(serialize_with = "outcome::serialize")]
    pub trend: ViewOutcome<TrendView>,
    #[serde(serialize_with = "outcome::serialize")]
    pub discount: ViewOutcome<ShareView>,
    #[serde(serialize_with = "outcome::serialize")]
    pub sales_type: ViewOutcome<ShareView>,
    #[serde(serialize_with = "outcome::serialize")]
    pub bars: ViewOutcome<GroupedSum>,
    #[serde(serialize_with = "outcome::serialize")]
    pub crosstab: ViewOutcome<GroupAggregate>,
    #[serde(serialize_with = "outcome::serialize")]
    pub monthly: ViewOutcome<Vec<MonthlyTotal>>,
}

impl DashboardReport {
    /// Names of the views that failed, in display order.
    pub fn failed_views(&self) -> Vec<&'static str> {
        let checks = [
            ("preview", self.preview.is_err()),
            ("trend", self.trend.is_err()),
            ("discount", self.discount.is_err()),
            ("sales-type", self.sales_type.is_err()),
            ("bars", self.bars.is_err()),
            ("crosstab", self.crosstab.is_err()),
            ("monthly", self.monthly.is_err()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, failed)| failed.then_some(name))
            .collect()
    }

    /// Pretty-printed JSON document of the whole report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load `path` and build its report.
///
/// Only intake errors fail the call; view errors live inside the report.
pub fn analyze_file(
    path: &Path,
    sheet: Option<&str>,
    options: &ReportOptions,
) -> Result<DashboardReport> {
    // ── Step 1: Load dataset ──────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let dataset = load_dataset(path, sheet)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Build views ───────────────────────────────────────────────────
    let mut report = build_report(&dataset, options, &path.display().to_string());
    report.metadata.load_time_seconds = load_time;
    Ok(report)
}

/// Run every view over `dataset`.
pub fn build_report(dataset: &Dataset, options: &ReportOptions, source: &str) -> DashboardReport {
    let build_start = std::time::Instant::now();
    let cols = &options.columns;

    let mut report = DashboardReport {
        preview: Ok(dataset.head(options.preview_rows)),
        trend: trend_view(dataset, cols),
        discount: discount_view(dataset, cols, options.discount_bounds),
        sales_type: sales_type_view(dataset, cols, &options.excluded_sale_type, options.policy),
        bars: pipeline::grouped_sum(
            dataset,
            &[cols.province.as_str(), cols.category.as_str()],
            &cols.quantity,
            options.policy,
        ),
        crosstab: pipeline::cross_tabulate(
            dataset,
            &[
                cols.province.as_str(),
                cols.category.as_str(),
                cols.item_type.as_str(),
            ],
        ),
        monthly: pipeline::month_aligned_merge(
            dataset,
            &MonthSource::new(cols.sale_date.as_str(), cols.sale_quantity.as_str()),
            &MonthSource::new(cols.production_date.as_str(), cols.production_quantity.as_str()),
            options.policy,
        ),
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            rows: dataset.len(),
            columns: dataset.columns().to_vec(),
            load_time_seconds: 0.0,
            build_time_seconds: 0.0,
        },
    };

    report.metadata.build_time_seconds = build_start.elapsed().as_secs_f64();
    log_failures(&report);
    info!(
        "Built report for {} ({} rows, {} failed views)",
        source,
        dataset.len(),
        report.failed_views().len()
    );
    report
}

// ── View builders ─────────────────────────────────────────────────────────────

fn trend_view(dataset: &Dataset, cols: &ColumnMap) -> ViewOutcome<TrendView> {
    let axis = pipeline::coerce_month_axis(dataset, &cols.month)?;
    let series = pipeline::series(dataset, &cols.month, &cols.revenue)?;
    let extremum = pipeline::find_extremum(dataset, &cols.revenue)?;

    let label_at = |index: usize| axis.get(index).cloned().unwrap_or_default();
    Ok(TrendView {
        max_label: label_at(extremum.max.index),
        min_label: label_at(extremum.min.index),
        axis,
        series,
        extremum,
    })
}

fn discount_view(dataset: &Dataset, cols: &ColumnMap, (lo, hi): (f64, f64)) -> ViewOutcome<ShareView> {
    let filtered = pipeline::filter_open_interval(dataset, &cols.discount, lo, hi)?;
    let slices = pipeline::numeric_value_counts(&filtered, &cols.discount)?;
    let highlight = slices
        .groups
        .first()
        .map(|g| g.key.clone())
        .ok_or(DashboardError::EmptyInput {
            operation: "discount_mix",
        })?;
    Ok(ShareView { slices, highlight })
}

fn sales_type_view(
    dataset: &Dataset,
    cols: &ColumnMap,
    excluded: &str,
    policy: RowPolicy,
) -> ViewOutcome<ShareView> {
    let kept = pipeline::exclude_value(dataset, &cols.sale_type, excluded)?;
    let sums = pipeline::grouped_sum(&kept, &[cols.sale_type.as_str()], &cols.revenue, policy)?;
    Ok(ShareView {
        slices: sums.aggregate,
        highlight: sums.max_key,
    })
}

fn log_failures(report: &DashboardReport) {
    let errors: [(&str, Option<&DashboardError>); 7] = [
        ("preview", report.preview.as_ref().err()),
        ("trend", report.trend.as_ref().err()),
        ("discount", report.discount.as_ref().err()),
        ("sales-type", report.sales_type.as_ref().err()),
        ("bars", report.bars.as_ref().err()),
        ("crosstab", report.crosstab.as_ref().err()),
        ("monthly", report.monthly.as_ref().err()),
    ];
    for (view, err) in errors {
        if let Some(e) = err {
            warn!(view, error = %e, "View failed");
        }
    }
}

// ── Serialisation ─────────────────────────────────────────────────────────────

mod outcome {
    use serde::ser::{SerializeMap, Serializer};
    use serde::Serialize;

    use super::ViewOutcome;

    pub fn serialize<T, S>(value: &ViewOutcome<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match value {
            Ok(v) => map.serialize_entry("ok", v)?,
            Err(e) => map.serialize_entry("error", &e.to_string())?,
        }
        map.end()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
