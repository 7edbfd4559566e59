use crate::client::{ConnectionState, PanelClient};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One-line footer: connection phase, endpoint and the last notice
pub struct StatusBar<'a> {
    pub client: &'a PanelClient,
    pub notice: Option<&'a str>,
}

impl StatusBar<'_> {
    fn state_span(&self) -> Span<'static> {
        let state = self.client.state();
        let color = match state {
            ConnectionState::Open => Color::Green,
            ConnectionState::Connecting => Color::Yellow,
            ConnectionState::Closed => Color::Red,
            ConnectionState::Disconnected => Color::DarkGray,
        };

        let text = match (state, self.client.opened_at()) {
            (ConnectionState::Open, Some(since)) => {
                format!("● Open since {}", since.format("%H:%M:%S"))
            }
            (ConnectionState::Closed, _) => {
                format!("● {} · retry #{}", state.display_name(), self.client.retries())
            }
            _ => format!("● {}", state.display_name()),
        };

        Span::styled(text, Style::default().fg(color))
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            self.state_span(),
            Span::styled(
                format!("  {}", self.client.endpoint()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(notice) = self.notice {
            spans.push(Span::styled(
                format!("  {}", notice),
                Style::default().fg(Color::Gray),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
