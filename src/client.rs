use crate::panels::PanelRegistry;
use crate::protocol::{InboundMessage, OutboundMessage};
use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of the single connection owned by a [`PanelClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt has been made yet
    Disconnected,
    /// Handshake in flight
    Connecting,
    /// Frames can be sent and received
    Open,
    /// Lost the connection; a reconnect is scheduled
    Closed,
}

impl ConnectionState {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Open",
            ConnectionState::Closed => "Closed (will retry)",
        }
    }
}

/// Work the handlers ask the transport to perform.
///
/// Every connection attempt gets a fresh generation number; socket events
/// carry the generation they belong to so stale ones can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect { generation: u64, url: String },
    Send { generation: u64, frame: String },
    Close { generation: u64 },
    ScheduleReconnect { after: Duration },
}

/// Connection state plus the panel registry, driven by event handlers.
///
/// Handlers never perform I/O themselves. They update state and return the
/// [`Command`]s the socket driver should carry out, in order.
pub struct PanelClient {
    registry: PanelRegistry,
    state: ConnectionState,
    endpoint: String,
    reconnect_delay: Duration,
    generation: u64,
    opened_at: Option<DateTime<Local>>,
    retries: u32,
}

impl PanelClient {
    pub fn new(registry: PanelRegistry, endpoint: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            registry,
            state: ConnectionState::Disconnected,
            endpoint: endpoint.into(),
            reconnect_delay,
            generation: 0,
            opened_at: None,
            retries: 0,
        }
    }

    /// Start a new connection attempt, superseding any previous one
    pub fn connect(&mut self) -> Vec<Command> {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.opened_at = None;
        info!(generation = self.generation, url = %self.endpoint, "connecting");

        vec![Command::Connect {
            generation: self.generation,
            url: self.endpoint.clone(),
        }]
    }

    pub fn on_open(&mut self, generation: u64) -> Vec<Command> {
        if self.is_stale(generation) {
            return Vec::new();
        }

        info!(generation, "connected to {}", self.endpoint);
        self.state = ConnectionState::Open;
        self.opened_at = Some(Local::now());
        self.retries = 0;
        Vec::new()
    }

    /// Route one text frame to its region. Frames that fail to decode or
    /// address nothing are dropped.
    pub fn on_message(&mut self, generation: u64, raw: &str) -> Vec<Command> {
        if self.is_stale(generation) {
            return Vec::new();
        }

        match InboundMessage::decode(raw) {
            Ok(message) => {
                if !self.registry.apply(&message) {
                    debug!(
                        panel = %message.target_panel,
                        kind = %message.message_type,
                        "no region for address, dropping frame"
                    );
                }
            }
            Err(e) => {
                debug!("dropping frame: {}", e);
            }
        }
        Vec::new()
    }

    pub fn on_close(&mut self, generation: u64) -> Vec<Command> {
        if self.is_stale(generation) || self.state == ConnectionState::Closed {
            return Vec::new();
        }

        self.state = ConnectionState::Closed;
        self.opened_at = None;
        self.retries = self.retries.saturating_add(1);
        info!(
            generation,
            retry = self.retries,
            "connection closed, reconnecting in {:?}",
            self.reconnect_delay
        );

        vec![Command::ScheduleReconnect {
            after: self.reconnect_delay,
        }]
    }

    /// Errors only force the socket closed; the close event that follows
    /// schedules the reconnect.
    pub fn on_error(&mut self, generation: u64, error: &str) -> Vec<Command> {
        if self.is_stale(generation) || self.state == ConnectionState::Closed {
            return Vec::new();
        }

        warn!(generation, "connection error: {}", error);
        vec![Command::Close { generation }]
    }

    /// The reconnect delay elapsed
    pub fn on_reconnect_due(&mut self) -> Vec<Command> {
        if self.state != ConnectionState::Closed {
            debug!(state = ?self.state, "reconnect timer fired while not closed, ignoring");
            return Vec::new();
        }
        self.connect()
    }

    /// Send the user's query and reset every region for the new exchange.
    ///
    /// Does nothing, and leaves `input` untouched, when the text is blank or
    /// the connection is not open.
    pub fn submit(&mut self, input: &mut String) -> Vec<Command> {
        if input.trim().is_empty() || self.state != ConnectionState::Open {
            return Vec::new();
        }

        let frame = match OutboundMessage::new(input.as_str()).encode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("could not encode submission: {}", e);
                return Vec::new();
            }
        };

        self.registry.clear_all();
        input.clear();
        debug!(generation = self.generation, "submitting query");

        vec![Command::Send {
            generation: self.generation,
            frame,
        }]
    }

    fn is_stale(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "ignoring event from superseded connection");
            return true;
        }
        false
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[allow(dead_code)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn opened_at(&self) -> Option<DateTime<Local>> {
        self.opened_at
    }

    /// Consecutive closes since the last successful open
    pub fn retries(&self) -> u32 {
        self.retries
    }
}
