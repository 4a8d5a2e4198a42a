use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative sparkle string placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Dashboard header rendering four lines:
///
/// 1. Application title with sparkle decorations.
/// 2. A 60-column `=` separator.
/// 3. Source information in `[ file | rows | loaded at ]` format.
/// 4. The view tabs, the active one highlighted.
pub struct Header<'a> {
    /// File the report was built from.
    pub source: &'a str,
    /// Number of data rows in the report.
    pub rows: usize,
    /// Formatted time of the last reload.
    pub loaded_at: &'a str,
    /// Tab titles in display order.
    pub tabs: &'a [&'a str],
    /// Index of the active tab.
    pub active: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a str,
        rows: usize,
        loaded_at: &'a str,
        tabs: &'a [&'a str],
        active: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            rows,
            loaded_at,
            tabs,
            active,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let mut tab_spans = Vec::with_capacity(self.tabs.len() * 2);
        for (i, title) in self.tabs.iter().enumerate() {
            let style = if i == self.active {
                self.theme.tab_active
            } else {
                self.theme.tab
            };
            tab_spans.push(Span::styled(format!(" {} {} ", i + 1, title), style));
            tab_spans.push(Span::raw(" "));
        }

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" SALES DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} rows", self.rows), self.theme.value),
                Span::styled(" | loaded ", self.theme.label),
                Span::styled(self.loaded_at, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(tab_spans),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
