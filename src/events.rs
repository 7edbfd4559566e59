/// Everything the app loop reacts to, funneled through one channel so
/// handlers run one at a time in arrival order.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard, paste or resize input from the terminal
    Tui(TuiEvent),

    /// Lifecycle or data from the connection with the given generation
    Socket { generation: u64, event: SocketEvent },

    /// The reconnect delay has elapsed
    ReconnectDue,
}

/// TUI-specific events (keyboard, paste, resize)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),
}

/// Notifications from a connection task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake finished
    Opened,

    /// A text frame arrived
    Frame(String),

    /// Transport failure; a `Closed` always follows
    Error(String),

    /// The connection is gone
    Closed,
}
