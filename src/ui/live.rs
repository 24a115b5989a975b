//! Live view rendering.
//!
//! A single card: clock and last-update times, the reading in its band
//! color, a band badge, a 0-2000 ppm gauge and a legend of all bands. A
//! fetch error replaces the whole card.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::clock;
use crate::data::{gauge_ratio, LiveDisplay, LiveState, StatusBand};

/// Tick labels under the gauge.
const SCALE_LABELS: [&str; 5] = ["0", "500", "1000", "1500", "2000+"];

/// Render the live view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.live();

    let block = Block::default()
        .title(" Live CO2 Reading ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match state.display() {
        LiveDisplay::Error(message) => render_error(frame, app, inner, message),
        LiveDisplay::Loading => render_card(frame, app, inner, &state, None),
        LiveDisplay::Reading { reading, status } => {
            render_card(frame, app, inner, &state, Some((reading.ppm(), status)))
        }
    }
}

fn render_error(frame: &mut Frame, app: &App, area: Rect, message: &str) {
    let [_, body] = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.error));
    let paragraph = Paragraph::new(message.to_string())
        .style(app.theme.error_style())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    let height = 5u16.min(body.height);
    frame.render_widget(paragraph, Rect::new(body.x, body.y, body.width, height));
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    state: &LiveState,
    reading: Option<(f64, StatusBand)>,
) {
    let band = reading.map_or(StatusBand::Loading, |(_, band)| band);

    let [times, _, value, badge, _, gauge, scale, _, legend] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(time_lines(app, state)), times);

    let value_text = match reading {
        Some((ppm, _)) => format!("{} PPM", ppm),
        None => band.label().to_string(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(value_text, app.theme.band_style(band)))
            .alignment(Alignment::Center),
        value,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("  {}  ", band.label()),
            app.theme.badge_style(band),
        ))
        .alignment(Alignment::Center),
        badge,
    );

    let ratio = reading.map_or(0.0, |(ppm, _)| gauge_ratio(ppm));
    frame.render_widget(
        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(app.theme.band_color(band))
                    .bg(app.theme.gauge_track),
            )
            .ratio(ratio)
            .label(""),
        gauge,
    );

    frame.render_widget(
        Paragraph::new(scale_labels(scale.width))
            .style(Style::default().fg(app.theme.muted)),
        scale,
    );

    frame.render_widget(Paragraph::new(legend_lines(app, band)), legend);
}

fn time_lines(app: &App, state: &LiveState) -> Vec<Line<'static>> {
    let label = Style::default().fg(app.theme.muted);
    let value = Style::default().add_modifier(Modifier::BOLD);

    let clock_text = state
        .clock
        .map_or_else(|| "-".to_string(), |t| clock::format_datetime(&t));

    let updated_text = match state.last_updated_at {
        Some(t) => {
            let age = (clock::now() - t).whole_seconds();
            format!("{} ({})", clock::format_datetime(&t), clock::format_age(age))
        }
        None => "-".to_string(),
    };

    vec![
        Line::from(vec![
            Span::styled(" Current time:  ", label),
            Span::styled(clock_text, value),
        ]),
        Line::from(vec![
            Span::styled(" Last reading:  ", label),
            Span::styled(updated_text, value),
        ]),
    ]
}

/// Lay out [`SCALE_LABELS`] evenly across `width` columns.
fn scale_labels(width: u16) -> String {
    let width = width as usize;
    let mut row = vec![' '; width];
    let last = SCALE_LABELS.len() - 1;

    for (i, label) in SCALE_LABELS.iter().enumerate() {
        let len = label.chars().count();
        if len > width {
            continue;
        }
        let anchor = i * width.saturating_sub(1) / last;
        let start = anchor.saturating_sub(len / 2).min(width - len);
        for (offset, c) in label.chars().enumerate() {
            row[start + offset] = c;
        }
    }

    row.into_iter().collect()
}

/// Format a band's range, e.g. "600 - 800 ppm" or "> 1500 ppm".
fn band_range(band: StatusBand) -> String {
    match (band.lower_bound(), band.upper_bound()) {
        (Some(lower), Some(upper)) => format!("{} - {} ppm", lower, upper),
        (Some(lower), None) => format!("> {} ppm", lower),
        _ => String::new(),
    }
}

fn legend_lines(app: &App, current: StatusBand) -> Vec<Line<'static>> {
    StatusBand::all()
        .into_iter()
        .map(|band| {
            let marker = if band == current { "▶" } else { " " };
            let name_style = if band == current {
                app.theme.band_style(band)
            } else {
                Style::default().fg(app.theme.band_color(band))
            };
            Line::from(vec![
                Span::raw(format!(" {} ", marker)),
                Span::styled("■ ", Style::default().fg(app.theme.band_color(band))),
                Span::styled(format!("{:<10}", band.label()), name_style),
                Span::styled(band_range(band), Style::default().fg(app.theme.muted)),
            ])
        })
        .collect()
}
