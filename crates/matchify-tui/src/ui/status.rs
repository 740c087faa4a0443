//! Status bar
//!
//! Displays pairing status, the local user and the latest notice.

use matchify_app::App;
use matchify_client::PairingState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let pairing_status = match app.state() {
        PairingState::Idle => Span::styled("Idle", Style::default().fg(Color::Red)),
        PairingState::Searching { category } => {
            Span::styled(format!("Searching {category}..."), Style::default().fg(Color::Yellow))
        },
        PairingState::Paired { peer } => Span::styled(
            format!("Chatting with {peer}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let notice = app.status_message().map_or_else(String::new, |message| format!(" | {message}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        pairing_status,
        Span::raw(format!(" | {}", app.identity().username)),
        Span::styled(notice, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
