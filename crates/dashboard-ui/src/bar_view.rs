//! Grouped bar view: quantity per province, one bar per category.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use dashboard_core::formatting::format_value;
use dashboard_core::models::{Group, GroupedSum};

use crate::components::share_bar::ShareBar;
use crate::themes::Theme;

/// Partitions regrouped by their leading key value, both levels in
/// first-seen order.
pub fn group_by_leading_key(sums: &GroupedSum) -> Vec<(&str, Vec<&Group>)> {
    let mut out: Vec<(&str, Vec<&Group>)> = Vec::new();
    for group in &sums.aggregate.groups {
        let lead = group.key.first().map(String::as_str).unwrap_or("");
        match out.iter_mut().find(|(name, _)| *name == lead) {
            Some((_, members)) => members.push(group),
            None => out.push((lead, vec![group])),
        }
    }
    out
}

/// Lines of the grouped bar chart.
///
/// Bars are scaled against the largest partition; the partition holding the
/// maximum is highlighted.
pub fn bar_lines<'a>(sums: &'a GroupedSum, theme: &'a Theme) -> Vec<Line<'a>> {
    let peak = sums
        .aggregate
        .groups
        .iter()
        .map(|g| g.value)
        .fold(0.0_f64, f64::max);

    let mut lines = Vec::new();
    for (lead, members) in group_by_leading_key(sums) {
        lines.push(Line::from(Span::styled(lead.to_string(), theme.bold)));
        for group in members {
            let inner = group.key.get(1..).map(|rest| rest.join(" / ")).unwrap_or_default();
            let fill = if peak > 0.0 { group.value / peak } else { 0.0 };
            let style = theme.slice_style(inner_index(sums, &inner));
            let bar = ShareBar::new(inner, fill, format_value(group.value), style, theme)
                .highlighted(group.key == sums.max_key);
            lines.push(bar.to_line());
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Stable colour slot for an inner key so a category keeps its colour in
/// every group.
fn inner_index(sums: &GroupedSum, inner: &str) -> usize {
    let mut seen: Vec<String> = Vec::new();
    for g in &sums.aggregate.groups {
        let name = g.key.get(1..).map(|rest| rest.join(" / ")).unwrap_or_default();
        if name == inner {
            return seen.len();
        }
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen.len()
}

/// Render the grouped bar chart inside a bordered block titled `title`.
pub fn render_bar_view(frame: &mut Frame, area: Rect, title: &str, sums: &GroupedSum, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(bar_lines(sums, theme)).block(
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
    use dashboard_core::models::GroupAggregate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn group(prov: &str, kategori: &str, value: f64) -> Group {
        Group {
            key: vec![prov.to_string(), kategori.to_string()],
            value,
            rows: 1,
        }
    }

    fn make_sums() -> GroupedSum {
        GroupedSum {
            aggregate: GroupAggregate {
                groups: vec![
                    group("Bali", "makanan", 4.0),
                    group("Jawa Barat", "makanan", 10.0),
                    group("Bali", "minuman", 6.0),
                ],
            },
            max_key: vec!["Jawa Barat".to_string(), "makanan".to_string()],
        }
    }

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_group_by_leading_key_order() {
        let sums = make_sums();
        let grouped = group_by_leading_key(&sums);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "Bali");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "Jawa Barat");
    }

    #[test]
    fn test_bar_lines_layout() {
        let theme = Theme::dark();
        let sums = make_sums();
        let lines = bar_lines(&sums, &theme);
        // Two headers, three bars, two spacers.
        assert_eq!(lines.len(), 7);
        assert_eq!(text_of(&lines[0]), "Bali");
        assert!(text_of(&lines[1]).starts_with("  makanan"));
        assert!(text_of(&lines[5]).starts_with("▶ makanan"));
    }

    #[test]
    fn test_inner_index_is_stable_per_category() {
        let sums = make_sums();
        assert_eq!(inner_index(&sums, "makanan"), 0);
        assert_eq!(inner_index(&sums, "minuman"), 1);
    }

    #[test]
    fn test_render_bar_view_does_not_panic() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let sums = make_sums();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_bar_view(frame, area, "Quantity by Province", &sums, &theme);
            })
            .unwrap();
    }
}
