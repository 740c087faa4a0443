//! Lobby
//!
//! Category picker shown while not chatting.

use matchify_app::App;
use matchify_proto::Category;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const SELECTED_PREFIX: &str = "> ";
const UNSELECTED_PREFIX: &str = "  ";
const LABEL_WIDTH: usize = 8;

/// Render the lobby.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut items: Vec<ListItem> = Category::ALL
        .iter()
        .map(|&category| {
            let selected = category == app.category();
            let (prefix, style) = if selected {
                (SELECTED_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (UNSELECTED_PREFIX, Style::default())
            };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("{:<LABEL_WIDTH$}", category.label()), style),
                Span::raw("  "),
                Span::styled(category.description(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    items.push(ListItem::new(Line::default()));
    items.push(ListItem::new(Line::from(Span::styled(
        "Enter to find someone, Tab to switch category, /help for commands",
        Style::default().fg(Color::DarkGray),
    ))));

    let title = format!(" Hi {}, who do you want to meet? ", app.identity().username);
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(List::new(items).block(block), area);
}
