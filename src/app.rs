use crate::client::{Command, PanelClient};
use crate::config::Config;
use crate::events::{AppEvent, SocketEvent, TuiEvent};
use crate::panels::PanelRegistry;
use crate::socket::SocketDriver;
use crate::ui::{
    help_text, Composer, ComposerResult, ComposerWidget, PanelBoard, SlashCommand, StatusBar,
};
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Owns the client context and the composer; turns events into commands
pub struct App {
    config: Config,
    client: PanelClient,
    composer: Composer,
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = PanelClient::new(
            PanelRegistry::debate(),
            config.endpoint(),
            config.reconnect_delay(),
        );

        Self {
            config,
            client,
            composer: Composer::new("Ask the bots a question... (/help for commands)"),
            notice: None,
            should_quit: false,
        }
    }

    /// Initial connection attempt
    pub fn start(&mut self) -> Vec<Command> {
        self.client.connect()
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::Tui(TuiEvent::Key(key)) => self.handle_key(key),
            AppEvent::Tui(TuiEvent::Paste(text)) => {
                self.composer.insert_str(&text);
                Vec::new()
            }
            AppEvent::Tui(TuiEvent::Resize(width, height)) => {
                debug!(width, height, "terminal resized");
                Vec::new()
            }
            AppEvent::Socket { generation, event } => match event {
                SocketEvent::Opened => self.client.on_open(generation),
                SocketEvent::Frame(raw) => self.client.on_message(generation, &raw),
                SocketEvent::Error(e) => self.client.on_error(generation, &e),
                SocketEvent::Closed => self.client.on_close(generation),
            },
            AppEvent::ReconnectDue => self.client.on_reconnect_due(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind == KeyEventKind::Press
            && (key.code == KeyCode::Esc
                || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
        {
            self.should_quit = true;
            return Vec::new();
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submit => {
                let commands = self.client.submit(self.composer.content_mut());
                self.composer.clamp_cursor();
                if !commands.is_empty() {
                    self.notice = None;
                }
                commands
            }
            ComposerResult::Command(SlashCommand::Quit) => {
                self.should_quit = true;
                Vec::new()
            }
            ComposerResult::Command(SlashCommand::Help) => {
                self.notice = Some(help_text());
                Vec::new()
            }
            ComposerResult::None => Vec::new(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[allow(dead_code)]
    pub fn client(&self) -> &PanelClient {
        &self.client
    }

    #[allow(dead_code)]
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Panels
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Status
            ])
            .split(frame.size());

        frame.render_widget(
            PanelBoard {
                registry: self.client.registry(),
                show_thoughts: self.config.ui.show_thoughts,
            },
            chunks[0],
        );

        let enabled = self.client.is_open();
        let label = if enabled {
            &self.config.ui.action_label
        } else {
            &self.config.ui.connecting_label
        };
        frame.render_widget(
            ComposerWidget {
                composer: &self.composer,
                label,
                enabled,
            },
            chunks[1],
        );
        if enabled {
            if let Some((x, y)) = self.composer.cursor_position(chunks[1]) {
                frame.set_cursor(x, y);
            }
        }

        frame.render_widget(
            StatusBar {
                client: &self.client,
                notice: self.notice.as_deref(),
            },
            chunks[2],
        );
    }
}

/// Set up the terminal, run the event loop until the user quits, restore
pub async fn run(config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, config).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let mut driver = SocketDriver::new(tx);
    let mut app = App::new(config);
    driver.execute_all(app.start());

    loop {
        terminal
            .draw(|frame| app.render(frame))
            .context("Failed to draw frame")?;

        let Some(event) = rx.recv().await else {
            break;
        };
        let commands = app.handle_event(event);
        driver.execute_all(commands);

        if app.should_quit() {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}

/// Crossterm reads block, so they live on their own thread and feed the
/// app channel. The thread exits once the channel is closed.
fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    error!("terminal poll failed: {}", e);
                    break;
                }
            }

            let tui_event = match event::read() {
                Ok(Event::Key(key)) => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(Event::Resize(width, height)) => TuiEvent::Resize(width, height),
                Ok(_) => continue,
                Err(e) => {
                    error!("terminal read failed: {}", e);
                    break;
                }
            };

            if tx.send(AppEvent::Tui(tui_event)).is_err() {
                break;
            }
        }
    });
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
