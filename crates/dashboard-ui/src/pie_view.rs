//! Share views: the discount mix and the sales-type mix.
//!
//! Each slice is drawn as a horizontal bar proportional to its share of the
//! total; the emphasised slice (most common discount, top sales type) is
//! pulled out with a marker.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use dashboard_core::formatting::format_share;
use dashboard_data::report::ShareView;

use crate::components::share_bar::ShareBar;
use crate::themes::Theme;

/// One line per slice, in slice order.
///
/// `value_fmt` formats the slice value (a count or a revenue sum).
pub fn share_lines<'a>(
    view: &'a ShareView,
    theme: &'a Theme,
    value_fmt: &dyn Fn(f64) -> String,
) -> Vec<Line<'a>> {
    let total = view.slices.total();
    view.slices
        .groups
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let label = slice.key.first().map(String::as_str).unwrap_or("");
            let fill = if total > 0.0 { slice.value / total } else { 0.0 };
            let caption = format!(
                "{} ({})",
                value_fmt(slice.value),
                format_share(slice.value, total)
            );
            ShareBar::new(label, fill, caption, theme.slice_style(i), theme)
                .highlighted(slice.key == view.highlight)
                .to_line()
        })
        .collect()
}

/// Render a share view inside a bordered block titled `title`.
pub fn render_share_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    view: &ShareView,
    theme: &Theme,
    value_fmt: &dyn Fn(f64) -> String,
) {
    let mut lines = vec![Line::from("")];
    lines.extend(share_lines(view, theme, value_fmt));

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::formatting::format_value;
    use dashboard_core::models::{Group, GroupAggregate};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_view() -> ShareView {
        ShareView {
            slices: GroupAggregate {
                groups: vec![
                    Group {
                        key: vec!["25".to_string()],
                        value: 2.0,
                        rows: 2,
                    },
                    Group {
                        key: vec!["10".to_string()],
                        value: 1.0,
                        rows: 1,
                    },
                ],
            },
            highlight: vec!["25".to_string()],
        }
    }

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_share_lines_one_per_slice() {
        let theme = Theme::dark();
        let view = make_view();
        let lines = share_lines(&view, &theme, &format_value);
        assert_eq!(lines.len(), 2);
        assert!(text_of(&lines[0]).ends_with("2 (66.7%)"));
        assert!(text_of(&lines[1]).ends_with("1 (33.3%)"));
    }

    #[test]
    fn test_share_lines_marks_highlight() {
        let theme = Theme::dark();
        let view = make_view();
        let lines = share_lines(&view, &theme, &format_value);
        assert!(text_of(&lines[0]).starts_with("▶ 25"));
        assert!(text_of(&lines[1]).starts_with("  10"));
    }

    #[test]
    fn test_render_share_view_does_not_panic() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let view = make_view();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_share_view(frame, area, "Discount Mix", &view, &theme, &format_value);
            })
            .unwrap();
    }

    #[test]
    fn test_render_share_view_empty_does_not_panic() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::classic();
        let view = ShareView {
            slices: GroupAggregate::default(),
            highlight: vec![],
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_share_view(frame, area, "Sales Type", &view, &theme, &format_value);
            })
            .unwrap();
    }
}
