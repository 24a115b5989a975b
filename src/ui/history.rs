//! History view rendering.
//!
//! Controls line (selected record count, refresh hint) above a line chart of
//! the last N readings, newest on the right.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use co2watch_types::ChartSeries;

use crate::app::App;
use crate::data::{HistoryDisplay, HistoryView, ALLOWED_RECORD_COUNTS};

/// Render the history view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.history();

    let block = Block::default()
        .title(" CO2 Level History ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [controls, _, body] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(inner);

    render_controls(frame, app, &view, controls);

    match view.display {
        HistoryDisplay::Loading => render_notice(
            frame,
            body,
            "Loading data...",
            Style::default().fg(app.theme.muted),
        ),
        HistoryDisplay::Error(ref message) => {
            render_notice(frame, body, message, app.theme.error_style())
        }
        HistoryDisplay::NoData => render_notice(
            frame,
            body,
            "No valid CO2 data found in response",
            app.theme.error_style(),
        ),
        HistoryDisplay::Rendered(ref series) => render_chart(frame, app, &view, series, body),
    }
}

fn render_controls(frame: &mut Frame, app: &App, view: &HistoryView, area: Rect) {
    let selected = app.selected_records().get();
    let muted = Style::default().fg(app.theme.muted);

    let options: Vec<Span> = ALLOWED_RECORD_COUNTS
        .iter()
        .flat_map(|&n| {
            let style = if n == selected {
                app.theme.tab_active.add_modifier(Modifier::REVERSED)
            } else {
                muted
            };
            [Span::styled(format!(" {} ", n), style), Span::raw(" ")]
        })
        .collect();

    let mut spans = vec![Span::styled(" Number of records: ", muted)];
    spans.extend(options);
    spans.push(Span::raw("  "));
    if view.display.is_loading() {
        spans.push(Span::styled("Loading...", app.theme.header));
    } else {
        spans.push(Span::styled("[r] Refresh Data", app.theme.header));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    let y = area.y + area.height / 2;
    frame.render_widget(paragraph, Rect::new(area.x, y, area.width, 2.min(area.height)));
}

fn render_chart(frame: &mut Frame, app: &App, view: &HistoryView, series: &ChartSeries, area: Rect) {
    let points = chart_points(series);
    let x_max = (series.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("CO2 Level")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.highlight))
            .data(&points),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD))
            .data(&points),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", view.title()), app.theme.header))
                .borders(Borders::TOP)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(app.theme.muted))
                .bounds([0.0, x_max])
                .labels(x_labels(series)),
        )
        .y_axis(
            Axis::default()
                .title("PPM")
                .style(Style::default().fg(app.theme.muted))
                .bounds([series.y_min, series.y_max])
                .labels(y_labels(series)),
        );

    frame.render_widget(chart, area);
}

/// Chart coordinates. The series is newest-first; the newest point is
/// placed rightmost.
fn chart_points(series: &ChartSeries) -> Vec<(f64, f64)> {
    let last = series.len().saturating_sub(1);
    series
        .values()
        .enumerate()
        .map(|(position, value)| ((last - position) as f64, value))
        .collect()
}

/// X axis labels, left to right: oldest, middle and newest point.
fn x_labels(series: &ChartSeries) -> Vec<String> {
    let ordered: Vec<&str> = series.labels().rev().collect();
    match ordered.len() {
        0 => Vec::new(),
        1 | 2 => ordered.iter().map(|s| s.to_string()).collect(),
        n => vec![
            ordered[0].to_string(),
            ordered[(n - 1) / 2].to_string(),
            ordered[n - 1].to_string(),
        ],
    }
}

fn y_labels(series: &ChartSeries) -> Vec<String> {
    let mid = (series.y_min + series.y_max) / 2.0;
    [series.y_min, mid, series.y_max]
        .iter()
        .map(|v| format!("{:.0}", v))
        .collect()
}
