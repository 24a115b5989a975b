//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{clock, LiveState, PollPhase};

/// Render the header bar.
///
/// Displays: band indicator (live view), data source, wall clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (dot_style, band_label) = match app.current_view {
        View::Live => {
            let band = app.live().status();
            (app.theme.band_style(band), band.label())
        }
        View::History => (Style::default().add_modifier(Modifier::DIM), "-"),
    };

    let line = Line::from(vec![
        Span::styled(" ● ", dot_style),
        Span::styled("CO2 MONITOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(band_label, dot_style),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().fg(app.theme.muted),
        ),
        Span::raw(" │ "),
        Span::raw(clock::format_time_of_day(&clock::now())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Live "), Line::from(" 2:History ")];

    let selected = match app.current_view {
        View::Live => 0,
        View::History => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the view name, poll state or record count, and available
/// controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = match app.current_view {
        View::Live => format!(
            " {} | {} | Tab:switch ?:help q:quit",
            View::Live.label(),
            live_summary(&app.live()),
        ),
        View::History => format!(
            " {} | Records: {} | +/-:records r:refresh Tab:switch ?:help q:quit",
            View::History.label(),
            app.selected_records().get(),
        ),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// One-line poller summary, e.g. "Updated 3s ago" or "2 failed fetches".
fn live_summary(state: &LiveState) -> String {
    let updated = state.last_updated_at.map(|t| {
        let age = (clock::now() - t).whole_seconds();
        format!("Updated {}", clock::format_age(age))
    });

    match (state.phase, updated) {
        (PollPhase::Failed, _) => {
            let noun = if state.consecutive_failures == 1 {
                "fetch"
            } else {
                "fetches"
            };
            format!("{} failed {}", state.consecutive_failures, noun)
        }
        (PollPhase::Fetching, Some(updated)) => format!("Fetching... ({})", updated),
        (PollPhase::Fetching, None) => "Fetching...".to_string(),
        (_, Some(updated)) => updated,
        (phase, None) => phase.label().to_string(),
    }
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  1 / 2       Live / History"),
        Line::from("  Tab ←/→     Switch views"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " History",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  + / -       More / fewer records"),
        Line::from("  r           Refresh data"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle help"),
        Line::from("  q Esc       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
