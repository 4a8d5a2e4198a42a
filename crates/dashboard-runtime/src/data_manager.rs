//! Report cache for the reload cycle.
//!
//! Wraps [`analyze_file`] with change detection and a last-good fallback.
//! Callers use [`DataManager::refresh`] to reload the source file; when a load
//! fails the previous report stays current and the error is recorded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use dashboard_data::report::{analyze_file, DashboardReport, ReportOptions};

/// Maximum number of load attempts per refresh.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DataManager ───────────────────────────────────────────────────────────────

/// Loads the source spreadsheet and keeps the last good report.
///
/// # Example
/// ```no_run
/// use dashboard_runtime::data_manager::DataManager;
/// use dashboard_data::report::ReportOptions;
///
/// let mut mgr = DataManager::new("penjualan.xlsx".into(), None, ReportOptions::default());
/// if let Some(report) = mgr.refresh() {
///     println!("rows: {}", report.metadata.rows);
/// }
/// ```
pub struct DataManager {
    /// Spreadsheet to load.
    path: PathBuf,
    /// Worksheet override.
    sheet: Option<String>,
    /// View options forwarded to the report builder.
    options: ReportOptions,
    /// Most recent successfully built report.
    cache: Option<Arc<DashboardReport>>,
    /// Modification time observed at the last refresh.
    last_modified: Option<SystemTime>,
    /// Display form of the last load error.
    last_error: Option<String>,
    /// Number of refresh attempts so far.
    reload_count: u64,
}

impl DataManager {
    pub fn new(path: PathBuf, sheet: Option<String>, options: ReportOptions) -> Self {
        Self {
            path,
            sheet,
            options,
            cache: None,
            last_modified: None,
            last_error: None,
            reload_count: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Reload the file and rebuild the report from scratch.
    ///
    /// On failure the previous report (if any) is returned and
    /// [`DataManager::last_error`] describes what went wrong.
    pub fn refresh(&mut self) -> Option<Arc<DashboardReport>> {
        self.reload_count += 1;
        self.last_modified = modified_time(&self.path);

        match self.load_with_retry() {
            Ok(report) => {
                tracing::debug!(
                    rows = report.metadata.rows,
                    failed_views = report.failed_views().len(),
                    "report cache updated"
                );
                self.cache = Some(Arc::new(report));
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed; keeping previous report");
                self.last_error = Some(e);
            }
        }
        self.cache.clone()
    }

    /// `true` when the file's modification time differs from the one seen at
    /// the last refresh (or when nothing has been loaded yet).
    pub fn has_changed(&self) -> bool {
        self.reload_count == 0 || modified_time(&self.path) != self.last_modified
    }

    /// Display form of the last load error, or `None` after a success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of refreshes performed.
    pub fn reload_count(&self) -> u64 {
        self.reload_count
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] loads with a short back-off, so a
    /// file caught mid-save gets another chance.
    fn load_with_retry(&self) -> Result<DashboardReport, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match analyze_file(&self.path, self.sheet.as_deref(), &self.options) {
                Ok(report) => return Ok(report),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "load attempt failed");
                    last_err = e.to_string();
                }
            }
        }

        Err(last_err)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("penjualan.csv");
        fs::write(&path, body).unwrap();
        path
    }

    fn bump_mtime(path: &Path, secs: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_new_manager_is_empty() {
        let mgr = DataManager::new("x.csv".into(), None, ReportOptions::default());
        assert!(mgr.last_error().is_none());
        assert_eq!(mgr.reload_count(), 0);
        assert!(mgr.has_changed());
    }

    #[test]
    fn test_refresh_loads_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_csv(&dir, "bulan,pend_total\n1,100\n2,500\n");

        let mut mgr = DataManager::new(path, None, ReportOptions::default());
        let report = mgr.refresh().expect("report after first refresh");

        assert_eq!(report.metadata.rows, 2);
        assert!(mgr.last_error().is_none());
        assert_eq!(mgr.reload_count(), 1);
    }

    #[test]
    fn test_refresh_recomputes_from_scratch() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_csv(&dir, "bulan,pend_total\n1,100\n");

        let mut mgr = DataManager::new(path.clone(), None, ReportOptions::default());
        let first = mgr.refresh().unwrap();

        fs::write(&path, "bulan,pend_total\n1,100\n2,900\n3,5\n").unwrap();
        let second = mgr.refresh().unwrap();

        assert_eq!(first.metadata.rows, 1);
        assert_eq!(second.metadata.rows, 3);
        let trend = second.trend.as_ref().unwrap();
        assert_eq!(trend.max_label, "2");
    }

    #[test]
    fn test_failed_refresh_keeps_last_good_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_csv(&dir, "bulan,pend_total\n1,100\n");

        let mut mgr = DataManager::new(path.clone(), None, ReportOptions::default());
        mgr.refresh().unwrap();

        fs::remove_file(&path).unwrap();
        let fallback = mgr.refresh().expect("previous report is kept");

        assert_eq!(fallback.metadata.rows, 1);
        assert!(mgr.last_error().unwrap().contains("Failed to read file"));
        assert_eq!(mgr.reload_count(), 2);
    }

    #[test]
    fn test_refresh_without_previous_report() {
        let mut mgr = DataManager::new(
            "/nonexistent/penjualan.csv".into(),
            None,
            ReportOptions::default(),
        );
        assert!(mgr.refresh().is_none());
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_has_changed_tracks_mtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_csv(&dir, "bulan,pend_total\n1,100\n");

        let mut mgr = DataManager::new(path.clone(), None, ReportOptions::default());
        mgr.refresh();
        assert!(!mgr.has_changed());

        bump_mtime(&path, 10);
        assert!(mgr.has_changed());

        mgr.refresh();
        assert!(!mgr.has_changed());
    }
}
