use crate::components::pad_to_width;
use crate::themes::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Configuration controlling the visual appearance of a share bar.
pub struct ShareBarConfig {
    /// Columns reserved for the label.
    pub label_width: usize,
    /// Columns of the bar portion.
    pub bar_width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            label_width: 18,
            bar_width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// One horizontal bar: `label  ████░░░░  value (pct%)`.
///
/// Used for pie-style share views and for grouped bar charts. The highlighted
/// bar is marked with `▶` and drawn bold.
pub struct ShareBar<'a> {
    pub label: String,
    /// Bar length as a fraction of the full width, clamped to `[0.0, 1.0]`.
    pub fill: f64,
    /// Text shown after the bar.
    pub caption: String,
    pub style: Style,
    pub highlighted: bool,
    pub theme: &'a Theme,
    pub config: ShareBarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(
        label: impl Into<String>,
        fill: f64,
        caption: String,
        style: Style,
        theme: &'a Theme,
    ) -> Self {
        Self {
            label: label.into(),
            fill: if fill.is_finite() { fill.clamp(0.0, 1.0) } else { 0.0 },
            caption,
            style,
            highlighted: false,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    pub fn highlighted(mut self, on: bool) -> Self {
        self.highlighted = on;
        self
    }

    /// Render the bar as a single [`Line`].
    pub fn to_line(&self) -> Line<'a> {
        let filled = (self.fill * self.config.bar_width as f64).round() as usize;
        let empty = (self.config.bar_width as usize).saturating_sub(filled);

        let (marker, label_style, bar_style) = if self.highlighted {
            (
                "▶ ",
                self.theme.bold,
                self.style.add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", self.theme.label, self.style)
        };

        Line::from(vec![
            Span::styled(marker, self.style),
            Span::styled(
                pad_to_width(&self.label, self.config.label_width),
                label_style,
            ),
            Span::raw(" "),
            Span::styled(self.config.filled_char.to_string().repeat(filled), bar_style),
            Span::styled(
                self.config.empty_char.to_string().repeat(empty),
                self.theme.bar_empty,
            ),
            Span::styled(format!(" {}", self.caption), self.theme.text),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
