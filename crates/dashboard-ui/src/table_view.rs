//! Tabular views: the data preview, the cross-tabulation and the
//! month-aligned merge, plus the placeholders shown for empty or failed views.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use dashboard_core::formatting::{self, month_name};
use dashboard_core::models::{Dataset, GroupAggregate, MonthlyTotal};

use crate::components::truncate_to_width;
use crate::themes::Theme;

/// Widest column the preview table will allot.
const MAX_PREVIEW_COLUMN: usize = 18;

fn bordered<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

fn row_style(i: usize, theme: &Theme) -> ratatui::style::Style {
    if i % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    }
}

// ── Preview ───────────────────────────────────────────────────────────────────

/// Column widths for the preview: the widest cell per column, capped.
pub fn preview_widths(dataset: &Dataset) -> Vec<usize> {
    dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let widest = dataset
                .rows()
                .iter()
                .map(|r| unicode_width::UnicodeWidthStr::width(r[i].to_text().as_str()))
                .max()
                .unwrap_or(0);
            widest
                .max(unicode_width::UnicodeWidthStr::width(name.as_str()))
                .clamp(3, MAX_PREVIEW_COLUMN)
        })
        .collect()
}

/// Render the first rows of the dataset.
pub fn render_preview(frame: &mut Frame, area: Rect, dataset: &Dataset, theme: &Theme) {
    let widths = preview_widths(dataset);

    let header = Row::new(
        dataset
            .columns()
            .iter()
            .zip(&widths)
            .map(|(c, &w)| Cell::from(truncate_to_width(c, w)).style(theme.table_header)),
    );

    let rows: Vec<Row> = dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(
                row.iter()
                    .zip(&widths)
                    .map(|(cell, &w)| Cell::from(truncate_to_width(&cell.to_text(), w))),
            )
            .style(row_style(i, theme))
        })
        .collect();

    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|&w| Constraint::Length(w as u16))
        .collect();

    let title = format!("Preview ({} rows)", dataset.len());
    let table = Table::new(rows, constraints)
        .header(header)
        .block(bordered(&title, theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Cross-tabulation ──────────────────────────────────────────────────────────

/// Render row counts per key tuple with a total row.
///
/// `key_names` labels the key columns.
pub fn render_crosstab(
    frame: &mut Frame,
    area: Rect,
    key_names: &[&str],
    table: &GroupAggregate,
    theme: &Theme,
) {
    let header = Row::new(
        key_names
            .iter()
            .map(|k| Cell::from(k.to_string()))
            .chain(std::iter::once(Cell::from("Count")))
            .map(|c| c.style(theme.table_header)),
    );

    let mut rows: Vec<Row> = table
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Row::new(
                g.key
                    .iter()
                    .map(|k| Cell::from(k.clone()))
                    .chain(std::iter::once(Cell::from(formatting::format_value(g.value)))),
            )
            .style(row_style(i, theme))
        })
        .collect();

    let mut total = vec![Cell::from("TOTAL")];
    total.extend((1..key_names.len()).map(|_| Cell::from("")));
    total.push(Cell::from(formatting::format_value(table.total())));
    rows.push(Row::new(total).style(theme.table_total));

    let mut widths = vec![Constraint::Length(18); key_names.len()];
    widths.push(Constraint::Length(10));

    let widget = Table::new(rows, widths)
        .header(header)
        .block(bordered("Cross-tabulation", theme))
        .style(theme.text);
    frame.render_widget(widget, area);
}

// ── Monthly merge ─────────────────────────────────────────────────────────────

/// Render the month-aligned merge with a totals row.
pub fn render_monthly(
    frame: &mut Frame,
    area: Rect,
    left_name: &str,
    right_name: &str,
    months: &[MonthlyTotal],
    theme: &Theme,
) {
    let header = Row::new(
        ["Month", left_name, right_name, "Difference"]
            .into_iter()
            .map(|h| Cell::from(h.to_string()).style(theme.table_header)),
    );

    let mut rows: Vec<Row> = months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Row::new(vec![
                Cell::from(month_name(m.month)),
                Cell::from(formatting::format_value(m.left)),
                Cell::from(formatting::format_value(m.right)),
                Cell::from(formatting::format_value(m.left - m.right)),
            ])
            .style(row_style(i, theme))
        })
        .collect();

    let left: f64 = months.iter().map(|m| m.left).sum();
    let right: f64 = months.iter().map(|m| m.right).sum();
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(formatting::format_value(left)),
            Cell::from(formatting::format_value(right)),
            Cell::from(formatting::format_value(left - right)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let widget = Table::new(rows, widths)
        .header(header)
        .block(bordered("Sales vs Production per Month", theme))
        .style(theme.text);
    frame.render_widget(widget, area);
}

// ── Placeholders ──────────────────────────────────────────────────────────────

/// Shown for a view whose computation failed.
pub fn render_error(frame: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("This view could not be computed", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Fix the spreadsheet and press 'r' to reload",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(bordered(title, theme)),
        area,
    );
}

/// Shown before the first report arrives, or when no report could be built.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: Option<&str>, theme: &Theme) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("No sales data loaded", theme.warning)),
        Line::from(""),
    ];
    if let Some(msg) = message {
        text.push(Line::from(Span::styled(msg.to_string(), theme.error)));
        text.push(Line::from(""));
    }
    text.push(Line::from(Span::styled(
        "Press 'r' to reload, 'q' or Ctrl+C to exit",
        theme.dim,
    )));
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(bordered("Sales Dashboard", theme)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::{CellValue, Group};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_dataset() -> Dataset {
        Dataset::new(
            vec!["bulan".to_string(), "prov".to_string()],
            vec![
                vec![CellValue::Number(1.0), CellValue::Text("Bali".into())],
                vec![
                    CellValue::Number(2.0),
                    CellValue::Text("Nusa Tenggara Timur Selatan".into()),
                ],
            ],
        )
    }

    fn draw(width: u16, height: u16, f: impl FnOnce(&mut Frame)) {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(f).unwrap();
    }

    #[test]
    fn test_preview_widths_capped() {
        let widths = preview_widths(&make_dataset());
        assert_eq!(widths, vec![5, MAX_PREVIEW_COLUMN]);
    }

    #[test]
    fn test_render_preview_does_not_panic() {
        let theme = Theme::dark();
        let ds = make_dataset();
        draw(100, 20, |frame| {
            let area = frame.area();
            render_preview(frame, area, &ds, &theme);
        });
    }

    #[test]
    fn test_render_crosstab_does_not_panic() {
        let theme = Theme::dark();
        let table = GroupAggregate {
            groups: vec![
                Group {
                    key: vec!["A".into(), "x".into(), "snack".into()],
                    value: 2.0,
                    rows: 2,
                },
                Group {
                    key: vec!["B".into(), "y".into(), "jus".into()],
                    value: 1.0,
                    rows: 1,
                },
            ],
        };
        draw(100, 20, |frame| {
            let area = frame.area();
            render_crosstab(frame, area, &["prov", "kategori", "jenis_barang"], &table, &theme);
        });
    }

    #[test]
    fn test_render_monthly_does_not_panic() {
        let theme = Theme::light();
        let months = vec![
            MonthlyTotal {
                month: 1,
                left: 15.0,
                right: 6.0,
            },
            MonthlyTotal {
                month: 12,
                left: 0.0,
                right: 4.0,
            },
        ];
        draw(80, 20, |frame| {
            let area = frame.area();
            render_monthly(frame, area, "qty1", "qty2", &months, &theme);
        });
    }

    #[test]
    fn test_render_monthly_empty_does_not_panic() {
        let theme = Theme::dark();
        draw(80, 10, |frame| {
            let area = frame.area();
            render_monthly(frame, area, "qty1", "qty2", &[], &theme);
        });
    }

    #[test]
    fn test_render_error_and_no_data_do_not_panic() {
        let theme = Theme::dark();
        draw(60, 12, |frame| {
            let area = frame.area();
            render_error(frame, area, "Monthly", "Missing column: tgl_prod", &theme);
        });
        draw(60, 12, |frame| {
            let area = frame.area();
            render_no_data(frame, area, Some("Failed to read file"), &theme);
        });
        draw(60, 12, |frame| {
            let area = frame.area();
            render_no_data(frame, area, None, &theme);
        });
    }
}
