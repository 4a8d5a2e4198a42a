use clap::Parser;
use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::models::RowPolicy;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive dashboard for spreadsheet sales data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-dashboard",
    about = "Interactive dashboard for spreadsheet sales data",
    version
)]
pub struct Settings {
    /// Spreadsheet to load (.xlsx, .xlsm, .xls, .ods or .csv)
    #[arg(env = "SALES_DASHBOARD_FILE")]
    pub file: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long, env = "SALES_DASHBOARD_SHEET")]
    pub sheet: Option<String>,

    /// Output mode
    #[arg(long, default_value = "tui", value_parser = ["tui", "json"])]
    pub output: String,

    /// Initial view
    #[arg(
        long,
        default_value = "trend",
        value_parser = ["preview", "trend", "discount", "sales-type", "bars", "crosstab", "monthly"]
    )]
    pub view: String,

    /// Display theme
    #[arg(long, env = "SALES_DASHBOARD_THEME", default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// How malformed cells are handled
    #[arg(long, value_enum, default_value_t = RowPolicy::Strict, env = "SALES_DASHBOARD_BAD_ROWS")]
    pub bad_rows: RowPolicy,

    /// Lower (exclusive) bound of the discount mix
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub discount_min: f64,

    /// Upper (exclusive) bound of the discount mix
    #[arg(long, default_value = "100", allow_negative_numbers = true)]
    pub discount_max: f64,

    /// Sale type left out of the sales-type mix
    #[arg(long, default_value = "giveaway")]
    pub exclude_sale_type: String,

    /// Number of rows shown in the preview
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Reload the file whenever it changes on disk
    #[arg(long)]
    pub watch: bool,

    /// Seconds between file change checks (1-60)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub refresh_rate: u32,

    /// Logging level
    #[arg(long, env = "SALES_DASHBOARD_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply derived values.
    ///
    /// Usage errors, `--help` and `--version` are reported by clap itself,
    /// which exits with its own status code.
    pub fn load() -> Result<Self> {
        Settings::parse().resolve()
    }

    /// Same as [`Settings::load`] with an explicit argument list, returning
    /// usage errors as [`DashboardError::Cli`] instead of exiting.
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args)?.resolve()
    }

    /// Check cross-field constraints and apply the `--debug` override.
    fn resolve(mut self) -> Result<Self> {
        if !(self.discount_min < self.discount_max) {
            return Err(DashboardError::Config(format!(
                "--discount-min ({}) must be below --discount-max ({})",
                self.discount_min, self.discount_max
            )));
        }

        if self.debug {
            self.log_level = "DEBUG".to_string();
        }

        Ok(self)
    }

    /// `true` when the JSON output mode was requested.
    pub fn is_json_output(&self) -> bool {
        self.output == "json"
    }

    /// Log destination: the explicit `--log-file`, otherwise the default
    /// under [`Settings::data_dir`] when running the terminal UI.
    ///
    /// JSON mode logs to stderr unless a file was given.
    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        if self.log_file.is_some() {
            return self.log_file.clone();
        }
        if self.is_json_output() {
            None
        } else {
            Some(Self::data_dir().join("logs").join("sales-dashboard.log"))
        }
    }

    /// `~/.sales-dashboard`, falling back to the working directory.
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sales-dashboard")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
