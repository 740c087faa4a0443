//! Chat area
//!
//! Displays the conversation, or a waiting notice while searching.

use matchify_app::App;
use matchify_client::{LogEntry, PairingState};
use matchify_proto::SYSTEM_SENDER;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (title, items) = match app.state() {
        PairingState::Paired { peer } => {
            let peer_name = peer.to_string();
            let mut items: Vec<ListItem> =
                app.messages().iter().map(|entry| message_item(app, &peer_name, entry)).collect();
            if app.peer_typing() {
                items.push(ListItem::new(Line::from(Span::styled(
                    format!("{peer} is typing..."),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ))));
            }
            (format!(" {peer} "), items)
        },
        PairingState::Searching { category } => (
            " Searching ".to_string(),
            vec![ListItem::new(Line::from(Span::styled(
                format!("Looking for someone who loves {category}... (Esc to cancel)"),
                Style::default().fg(Color::DarkGray),
            )))],
        ),
        PairingState::Idle => (" Chat ".to_string(), Vec::new()),
    };

    let block = Block::default().borders(Borders::ALL).title(title);

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_item(app: &App, peer: &str, entry: &LogEntry) -> ListItem<'static> {
    if entry.sender_id == SYSTEM_SENDER {
        return ListItem::new(Line::from(Span::styled(
            format!("* {}", entry.text),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    let (sender, color) = if entry.sender_id == app.identity().user_id {
        ("You".to_string(), Color::Green)
    } else {
        (peer.to_string(), Color::Cyan)
    };

    ListItem::new(Line::from(vec![
        Span::styled(sender, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(": "),
        Span::raw(entry.text.clone()),
    ]))
}
