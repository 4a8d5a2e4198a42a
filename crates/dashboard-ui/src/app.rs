//! Main application state and TUI event loop for the sales dashboard.
//!
//! [`App`] owns the theme, the selected view and the last received
//! [`DashboardSnapshot`]. Snapshots arrive over a channel from the reload
//! orchestrator; key presses switch views, request reloads or quit.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use dashboard_core::formatting::{format_rupiah, format_value};
use dashboard_core::models::ColumnMap;
use dashboard_data::report::{DashboardReport, ViewOutcome};
use dashboard_runtime::orchestrator::{DashboardSnapshot, ReloadHandle};

use crate::components::header::Header;
use crate::themes::Theme;
use crate::{bar_view, pie_view, table_view, trend_view};

// ── ViewKind ──────────────────────────────────────────────────────────────────

/// Which dashboard view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Preview,
    Trend,
    Discount,
    SalesType,
    Bars,
    Crosstab,
    Monthly,
}

impl ViewKind {
    /// Every view in tab order.
    pub const ALL: [ViewKind; 7] = [
        ViewKind::Preview,
        ViewKind::Trend,
        ViewKind::Discount,
        ViewKind::SalesType,
        ViewKind::Bars,
        ViewKind::Crosstab,
        ViewKind::Monthly,
    ];

    /// Parse a `--view` value. Unknown names select the trend view.
    pub fn from_name(name: &str) -> Self {
        match name {
            "preview" => ViewKind::Preview,
            "discount" => ViewKind::Discount,
            "sales-type" => ViewKind::SalesType,
            "bars" => ViewKind::Bars,
            "crosstab" => ViewKind::Crosstab,
            "monthly" => ViewKind::Monthly,
            _ => ViewKind::Trend,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Preview => "Preview",
            ViewKind::Trend => "Revenue Trend",
            ViewKind::Discount => "Discount Mix",
            ViewKind::SalesType => "Sales Type",
            ViewKind::Bars => "Province Bars",
            ViewKind::Crosstab => "Cross-tab",
            ViewKind::Monthly => "Monthly",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Reload,
    Quit,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// View currently on screen.
    pub view: ViewKind,
    /// Column names used for table headers.
    pub columns: ColumnMap,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent snapshot, `None` until the first reload finishes.
    pub snapshot: Option<DashboardSnapshot>,
}

impl App {
    pub fn new(theme_name: &str, view_name: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view: ViewKind::from_name(view_name),
            columns: ColumnMap::default(),
            should_quit: false,
            snapshot: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the dashboard, receiving snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so key handling
    /// stays on this thread while snapshots are drained with `try_recv`.
    /// The loop exits on `q`, `Esc` or `Ctrl+C`, or when the channel closes.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<DashboardSnapshot>,
        reloads: &ReloadHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => match self.handle_key(key) {
                        KeyAction::Quit => break Ok(()),
                        KeyAction::Reload => reloads.request_reload(),
                        KeyAction::None => {}
                    },
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.update_from_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State updates ─────────────────────────────────────────────────────────

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyAction::Quit
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Reload,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.view = self.view.next();
                KeyAction::None
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.view = self.view.prev();
                KeyAction::None
            }
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                self.view = ViewKind::ALL[idx];
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    /// Store a fresh snapshot.
    pub fn update_from_snapshot(&mut self, snapshot: DashboardSnapshot) {
        if let Some(err) = &snapshot.error {
            tracing::warn!(error = %err, reload = snapshot.reload_count, "reload failed");
        }
        self.snapshot = Some(snapshot);
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let report = self.snapshot.as_ref().and_then(|s| s.report.as_deref());

        let tabs: Vec<&str> = ViewKind::ALL.iter().map(|v| v.title()).collect();
        let loaded_at = self
            .snapshot
            .as_ref()
            .map(|s| s.loaded_at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let (source, rows) = report
            .map(|r| (r.metadata.source.as_str(), r.metadata.rows))
            .unwrap_or(("-", 0));
        let header = Header::new(
            source,
            rows,
            &loaded_at,
            &tabs,
            self.view.index(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        match report {
            Some(report) => self.render_view(frame, chunks[1], report),
            None => {
                let err = self.snapshot.as_ref().and_then(|s| s.error.as_deref());
                table_view::render_no_data(frame, chunks[1], err, &self.theme);
            }
        }

        frame.render_widget(Paragraph::new(self.status_line()), chunks[2]);
    }

    /// Bottom status line: the reload error, or the key help.
    pub fn status_line(&self) -> Line<'static> {
        match self.snapshot.as_ref() {
            Some(DashboardSnapshot {
                error: Some(err),
                report: Some(_),
                ..
            }) => Line::from(Span::styled(
                format!("Reload failed, showing previous data: {}", err),
                self.theme.warning,
            )),
            _ => Line::from(Span::styled(
                "←/→ switch view · 1-7 jump · r reload · q quit",
                self.theme.dim,
            )),
        }
    }

    fn render_view(&self, frame: &mut Frame, area: Rect, report: &DashboardReport) {
        let theme = &self.theme;
        let title = self.view.title();
        let cols = &self.columns;

        match self.view {
            ViewKind::Preview => with_outcome(frame, area, title, &report.preview, theme, |f, ds| {
                table_view::render_preview(f, area, ds, theme)
            }),
            ViewKind::Trend => with_outcome(frame, area, title, &report.trend, theme, |f, trend| {
                trend_view::render_trend_view(f, area, trend, theme)
            }),
            ViewKind::Discount => {
                with_outcome(frame, area, title, &report.discount, theme, |f, mix| {
                    let fmt = |n: f64| format!("{} rows", format_value(n));
                    pie_view::render_share_view(f, area, "Discount Mix", mix, theme, &fmt)
                })
            }
            ViewKind::SalesType => {
                with_outcome(frame, area, title, &report.sales_type, theme, |f, mix| {
                    pie_view::render_share_view(
                        f,
                        area,
                        "Revenue by Sales Type",
                        mix,
                        theme,
                        &format_rupiah,
                    )
                })
            }
            ViewKind::Bars => with_outcome(frame, area, title, &report.bars, theme, |f, sums| {
                bar_view::render_bar_view(f, area, "Quantity by Province and Category", sums, theme)
            }),
            ViewKind::Crosstab => {
                with_outcome(frame, area, title, &report.crosstab, theme, |f, table| {
                    let keys = [
                        cols.province.as_str(),
                        cols.category.as_str(),
                        cols.item_type.as_str(),
                    ];
                    table_view::render_crosstab(f, area, &keys, table, theme)
                })
            }
            ViewKind::Monthly => {
                with_outcome(frame, area, title, &report.monthly, theme, |f, months| {
                    table_view::render_monthly(
                        f,
                        area,
                        &cols.sale_quantity,
                        &cols.production_quantity,
                        months,
                        theme,
                    )
                })
            }
        }
    }
}

/// Render `outcome` with `draw`, or the error placeholder when it failed.
fn with_outcome<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    outcome: &ViewOutcome<T>,
    theme: &Theme,
    draw: impl FnOnce(&mut Frame, &T),
) {
    match outcome {
        Ok(value) => draw(frame, value),
        Err(e) => table_view::render_error(frame, area, title, &e.to_string(), theme),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
