//! Terminal-agnostic keyboard input.
//!
//! [`InputState`] owns the text buffer and cursor and handles character-level
//! key events. Command parsing happens here on Enter.

use matchify_client::PairingPhase;

use crate::{
    App, AppAction,
    app::HELP_TEXT,
    commands::{self, Command},
};

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (cycle categories).
    Tab,
    /// Escape key (cancel, leave, or quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Text input state.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Text buffer for user input.
    buffer: String,
    /// Cursor position within the buffer, in characters.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position, in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key input event.
    ///
    /// Editing keys while paired also report [`AppAction::Typing`].
    pub fn handle_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                edited(app)
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                edited(app)
            },
            KeyInput::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                edited(app)
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.cursor = self.char_len();
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.handle_enter(app),
            KeyInput::Tab => app.cycle_category(),
            KeyInput::Esc => app.back(),
            KeyInput::Up | KeyInput::Down => vec![],
        }
    }

    /// Handle Enter key - parse command and call App API.
    fn handle_enter(&mut self, app: &mut App) -> Vec<AppAction> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        if text.trim().is_empty() {
            // Enter on an empty lobby input starts a search
            if app.phase() == PairingPhase::Idle {
                return app.start_search(app.category());
            }
            return vec![AppAction::Render];
        }

        match commands::parse(&text) {
            Command::Find { category } => {
                let category = category.unwrap_or(app.category());
                app.start_search(category)
            },
            Command::Cancel => app.cancel(),
            Command::Leave => app.leave(),
            Command::Help => {
                app.set_status(HELP_TEXT);
                vec![AppAction::Render]
            },
            Command::Quit => app.quit(),
            Command::Message { text } => app.send_message(text),
            Command::Unknown { input } => {
                app.set_status(format!("Unknown command: /{input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}

fn edited(app: &App) -> Vec<AppAction> {
    if app.phase() == PairingPhase::Paired {
        vec![AppAction::Typing, AppAction::Render]
    } else {
        vec![AppAction::Render]
    }
}

#[cfg(test)]
mod tests {
    use matchify_client::LocalIdentity;
    use matchify_proto::{Category, PeerIdentity};

    use super::*;
    use crate::AppEvent;

    fn app() -> App {
        App::new(LocalIdentity::new("me", "Me"))
    }

    fn paired_app() -> App {
        let mut app = app();
        app.handle(AppEvent::Searching { category: Category::Artists });
        app.handle(AppEvent::Paired { peer: PeerIdentity::new("alice") });
        app
    }

    fn type_str(input: &mut InputState, app: &mut App, s: &str) -> Vec<AppAction> {
        s.chars().flat_map(|c| input.handle_key(KeyInput::Char(c), app)).collect()
    }

    #[test]
    fn editing_handles_multibyte() {
        let mut app = app();
        let mut input = InputState::new();
        type_str(&mut input, &mut app, "héllo");
        input.handle_key(KeyInput::Left, &mut app);
        input.handle_key(KeyInput::Backspace, &mut app);
        assert_eq!(input.buffer(), "hélo");

        input.handle_key(KeyInput::Home, &mut app);
        input.handle_key(KeyInput::Right, &mut app);
        input.handle_key(KeyInput::Delete, &mut app);
        assert_eq!(input.buffer(), "hlo");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn typing_reported_only_when_paired() {
        let mut app = app();
        let mut input = InputState::new();
        let actions = type_str(&mut input, &mut app, "hi");
        assert!(!actions.contains(&AppAction::Typing));

        let mut app = paired_app();
        let mut input = InputState::new();
        let actions = type_str(&mut input, &mut app, "hi");
        assert_eq!(actions.iter().filter(|a| **a == AppAction::Typing).count(), 2);

        let actions = input.handle_key(KeyInput::Backspace, &mut app);
        assert!(actions.contains(&AppAction::Typing));
    }

    #[test]
    fn enter_does_not_count_as_typing() {
        let mut app = paired_app();
        let mut input = InputState::new();
        type_str(&mut input, &mut app, "hello");

        let actions = input.handle_key(KeyInput::Enter, &mut app);
        assert!(matches!(actions.as_slice(), [
            AppAction::SendMessage { text },
            AppAction::Render
        ] if text == "hello"));
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn enter_in_lobby_finds_selected_category() {
        let mut app = app();
        let mut input = InputState::new();
        input.handle_key(KeyInput::Tab, &mut app);

        let actions = input.handle_key(KeyInput::Enter, &mut app);
        assert_eq!(actions, vec![
            AppAction::StartSearch { category: Category::Albums },
            AppAction::Render
        ]);
    }

    #[test]
    fn find_command_with_category() {
        let mut app = app();
        let mut input = InputState::new();
        type_str(&mut input, &mut app, "/find movies");

        let actions = input.handle_key(KeyInput::Enter, &mut app);
        assert_eq!(actions[0], AppAction::StartSearch { category: Category::Movies });
    }

    #[test]
    fn unknown_command_sets_status() {
        let mut app = app();
        let mut input = InputState::new();
        type_str(&mut input, &mut app, "/dance");
        input.handle_key(KeyInput::Enter, &mut app);

        assert_eq!(app.status_message(), Some("Unknown command: /dance"));
    }
}
