use crate::ui::commands::{parse_slash_command, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter was pressed on ordinary text; the content stays in place until
    /// the client accepts it
    Submit,
    Command(SlashCommand),
    None,
}

/// State for the single-line text input
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Cursor position in characters, not bytes
    pub cursor: usize,
}

impl TextAreaState {
    fn byte_index(&self, cursor: usize) -> usize {
        self.content
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Text input for the debate prompt
#[derive(Debug, Clone)]
pub struct Composer {
    state: TextAreaState,
    placeholder: String,
}

impl Composer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(&self.state.content) {
                    self.clear();
                    return ComposerResult::Command(command);
                }
                return ComposerResult::Submit;
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match c {
                        'a' => self.state.cursor = 0,
                        'e' => self.state.cursor = self.state.char_len(),
                        'u' => self.clear(),
                        _ => {}
                    }
                } else {
                    self.insert_char(c);
                }
            }
            KeyCode::Backspace => {
                if self.state.cursor > 0 {
                    self.state.cursor -= 1;
                    let at = self.state.byte_index(self.state.cursor);
                    self.state.content.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.state.cursor < self.state.char_len() {
                    let at = self.state.byte_index(self.state.cursor);
                    self.state.content.remove(at);
                }
            }
            KeyCode::Left => {
                self.state.cursor = self.state.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor < self.state.char_len() {
                    self.state.cursor += 1;
                }
            }
            KeyCode::Home => self.state.cursor = 0,
            KeyCode::End => self.state.cursor = self.state.char_len(),
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text, flattening newlines since the input is one line
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    fn insert_char(&mut self, c: char) {
        let at = self.state.byte_index(self.state.cursor);
        self.state.content.insert(at, c);
        self.state.cursor += 1;
    }

    /// Mutable access for the submission handler, which clears it on send
    pub fn content_mut(&mut self) -> &mut String {
        &mut self.state.content
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Keep the cursor inside the content after it was edited externally
    pub fn clamp_cursor(&mut self) {
        self.state.cursor = self.state.cursor.min(self.state.char_len());
    }

    pub fn clear(&mut self) {
        self.state.content.clear();
        self.state.cursor = 0;
    }

    /// Screen position of the cursor inside `area`, if it fits
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let offset = u16::try_from(self.state.cursor).ok()?;
        if offset >= inner.width {
            return None;
        }
        Some((inner.x + offset, inner.y))
    }
}

/// Renders a [`Composer`] with the connection-phase label as its title
pub struct ComposerWidget<'a> {
    pub composer: &'a Composer,
    pub label: &'a str,
    pub enabled: bool,
}

impl Widget for ComposerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (border, title) = if self.enabled {
            (
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(format!(" {} ", self.label), title));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let content = self.composer.content();
        let line = if content.is_empty() {
            Line::from(vec![Span::styled(
                self.composer.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )])
        } else {
            Line::from(vec![Span::raw(content)])
        };
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_on_text_requests_submit_without_clearing() {
        let mut composer = Composer::new("Ask something");
        type_str(&mut composer, "Tea or coffee?");

        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::Submit);
        assert_eq!(composer.content(), "Tea or coffee?");
    }

    #[test]
    fn enter_on_slash_command_clears() {
        let mut composer = Composer::new("");
        type_str(&mut composer, "/quit");

        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Command(SlashCommand::Quit)
        );
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn editing_handles_multibyte_chars() {
        let mut composer = Composer::new("");
        type_str(&mut composer, "café");
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "caé");

        composer.handle_key(press(KeyCode::Home));
        composer.handle_key(press(KeyCode::Delete));
        assert_eq!(composer.content(), "aé");

        composer.handle_key(press(KeyCode::End));
        type_str(&mut composer, "!");
        assert_eq!(composer.content(), "aé!");
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut composer = Composer::new("");
        composer.insert_str("line one\nline two");
        assert_eq!(composer.content(), "line one line two");
    }

    #[test]
    fn clamp_after_external_clear() {
        let mut composer = Composer::new("");
        type_str(&mut composer, "abc");
        composer.content_mut().clear();
        composer.clamp_cursor();

        type_str(&mut composer, "x");
        assert_eq!(composer.content(), "x");
    }
}
