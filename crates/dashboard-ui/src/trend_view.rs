//! Revenue trend view: a line chart of revenue per month with the highest
//! and lowest points marked and annotated.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Paragraph},
    Frame,
};

use dashboard_core::formatting::format_rupiah;
use dashboard_core::models::SeriesPoint;
use dashboard_data::report::TrendView;

use crate::themes::Theme;

/// Chart coordinates of a series: x is the point position, y the value.
pub fn chart_points(series: &[SeriesPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect()
}

/// Position in `series` of the first point carrying `value`.
pub fn point_position(series: &[SeriesPoint], value: f64) -> Option<usize> {
    series.iter().position(|p| p.value == value)
}

/// `[lo, hi]` y bounds with a little headroom so extremes are not drawn on
/// the border.
pub fn y_bounds(trend: &TrendView) -> [f64; 2] {
    let lo = trend.extremum.min.value;
    let hi = trend.extremum.max.value;
    let pad = ((hi - lo).abs() * 0.1).max(1.0);
    [lo - pad, hi + pad]
}

/// Highest/lowest annotation lines shown under the chart.
pub fn extreme_notes<'a>(trend: &TrendView, theme: &Theme) -> Vec<Line<'a>> {
    vec![
        Line::from(vec![
            Span::styled("▲ Highest: ", theme.extreme_high),
            Span::styled(trend.max_label.clone(), theme.value),
            Span::styled(
                format!("  {}", format_rupiah(trend.extremum.max.value)),
                theme.text,
            ),
        ]),
        Line::from(vec![
            Span::styled("▼ Lowest:  ", theme.extreme_low),
            Span::styled(trend.min_label.clone(), theme.value),
            Span::styled(
                format!("  {}", format_rupiah(trend.extremum.min.value)),
                theme.text,
            ),
        ]),
    ]
}

/// Render the trend chart and its notes into `area`.
pub fn render_trend_view(frame: &mut Frame, area: Rect, trend: &TrendView, theme: &Theme) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(4)]).split(area);

    let points = chart_points(&trend.series);
    let max_point: Vec<(f64, f64)> = point_position(&trend.series, trend.extremum.max.value)
        .map(|i| vec![points[i]])
        .unwrap_or_default();
    let min_point: Vec<(f64, f64)> = point_position(&trend.series, trend.extremum.min.value)
        .map(|i| vec![points[i]])
        .unwrap_or_default();

    let datasets = vec![
        ChartDataset::default()
            .name("Revenue")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_line)
            .data(&points),
        ChartDataset::default()
            .name("Highest")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.extreme_high)
            .data(&max_point),
        ChartDataset::default()
            .name("Lowest")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.extreme_low)
            .data(&min_point),
    ];

    let last = points.len().saturating_sub(1);
    let x_labels: Vec<Span> = match trend.series.as_slice() {
        [] => vec![],
        [only] => vec![Span::raw(only.label.clone())],
        series => vec![
            Span::raw(series[0].label.clone()),
            Span::raw(series[last / 2].label.clone()),
            Span::raw(series[last].label.clone()),
        ],
    };
    let [y_lo, y_hi] = y_bounds(trend);
    let y_labels = vec![
        Span::raw(format_rupiah(trend.extremum.min.value)),
        Span::raw(format_rupiah(trend.extremum.max.value)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Revenue per Month "),
        )
        .x_axis(
            Axis::default()
                .title("Month")
                .style(theme.chart_axis)
                .bounds([0.0, (last as f64).max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Revenue")
                .style(theme.chart_axis)
                .bounds([y_lo, y_hi])
                .labels(y_labels),
        );
    frame.render_widget(chart, chunks[0]);

    frame.render_widget(
        Paragraph::new(extreme_notes(trend, theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border),
        ),
        chunks[1],
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
