//! The fixed grid of debate panes.
//!
//! ```text
//! ┌ Judge · Speech ───────────────────────┐
//! └───────────────────────────────────────┘
//! ┌ Bot Alpha · Thought ┐┌ Bot Bravo · Thought ┐
//! ┌ Bot Alpha · Speech  ┐┌ Bot Bravo · Speech  ┐
//! ```

use crate::panels::{PanelRegistry, Region};
use crate::protocol::{ContentKind, PanelId};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

pub struct PanelBoard<'a> {
    pub registry: &'a PanelRegistry,
    pub show_thoughts: bool,
}

impl Widget for PanelBoard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);

        self.render_region(PanelId::Intermediary, ContentKind::Speech, rows[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        for (bot, column) in [(PanelId::BotAlpha, columns[0]), (PanelId::BotBravo, columns[1])] {
            if self.show_thoughts {
                let stack = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(column);
                self.render_region(bot, ContentKind::Thought, stack[0], buf);
                self.render_region(bot, ContentKind::Speech, stack[1], buf);
            } else {
                self.render_region(bot, ContentKind::Speech, column, buf);
            }
        }
    }
}

impl PanelBoard<'_> {
    fn render_region(&self, panel: PanelId, kind: ContentKind, area: Rect, buf: &mut Buffer) {
        let Some(region) = self.registry.region(panel, kind) else {
            return;
        };

        let accent = panel_color(panel);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title(Span::styled(
                format!(" {} · {} ", panel.display_name(), kind.display_name()),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ));

        let inner = block.inner(area);
        block.render(area, buf);

        let style = match kind {
            ContentKind::Thought => Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            ContentKind::Speech => Style::default(),
        };

        for (i, text) in visible_lines(region, inner.width, inner.height).iter().enumerate() {
            let line = Line::from(vec![Span::styled(text.as_str(), style)]);
            buf.set_line(inner.x, inner.y + i as u16, &line, inner.width);
        }
    }
}

fn panel_color(panel: PanelId) -> Color {
    match panel {
        PanelId::Intermediary => Color::Yellow,
        PanelId::BotAlpha => Color::Cyan,
        PanelId::BotBravo => Color::Magenta,
        PanelId::User => Color::Blue,
    }
}

/// Lines to draw for a region: the newest ones when it follows its tail,
/// the first ones otherwise.
pub fn visible_lines(region: &Region, width: u16, height: u16) -> Vec<String> {
    let lines = wrap_text(region.text(), width as usize);
    let height = height as usize;

    if region.follows_tail() {
        let start = lines.len().saturating_sub(height);
        lines[start..].to_vec()
    } else {
        lines.into_iter().take(height).collect()
    }
}

/// Wrap text to fit within the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }

            if word_len > width {
                // Hard-break words longer than the pane
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width) {
                    if current_len > 0 {
                        lines.push(std::mem::take(&mut current_line));
                    }
                    current_line = chunk.iter().collect();
                    current_len = chunk.len();
                }
                continue;
            }

            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_line.push_str(word);
            current_len += word_len;
        }

        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::InboundMessage;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn keeps_paragraph_breaks() {
        assert_eq!(wrap_text("one\n\ntwo", 20), vec!["one", "", "two"]);
    }

    #[test]
    fn hard_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn tail_of_long_text_is_visible() {
        let mut region = Region::default();
        region.replace("l1\nl2\nl3\nl4\nl5");

        assert_eq!(visible_lines(&region, 10, 2), vec!["l4", "l5"]);
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_every_pane_title_and_content() {
        let mut registry = PanelRegistry::debate();
        registry.apply(&InboundMessage {
            target_panel: PanelId::BotBravo,
            message_type: ContentKind::Speech,
            content: "Coffee wins".to_string(),
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(
                    PanelBoard {
                        registry: &registry,
                        show_thoughts: true,
                    },
                    frame.size(),
                )
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Judge · Speech"));
        assert!(text.contains("Bot Alpha · Thought"));
        assert!(text.contains("Bot Bravo · Speech"));
        assert!(text.contains("Coffee wins"));
    }

    #[test]
    fn hidden_thoughts_are_not_drawn() {
        let registry = PanelRegistry::debate();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(
                    PanelBoard {
                        registry: &registry,
                        show_thoughts: false,
                    },
                    frame.size(),
                )
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(!text.contains("Thought"));
        assert!(text.contains("Bot Alpha · Speech"));
    }
}
