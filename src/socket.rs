//! Executes [`Command`]s against a real WebSocket.
//!
//! At most one connection task is alive at a time. Each task reports back on
//! the app channel tagged with its generation, and always finishes with a
//! single [`SocketEvent::Closed`].

use crate::client::Command;
use crate::events::{AppEvent, SocketEvent};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

enum Outbound {
    Frame(String),
    Close,
}

struct Connection {
    generation: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

pub struct SocketDriver {
    events: mpsc::UnboundedSender<AppEvent>,
    current: Option<Connection>,
}

impl SocketDriver {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            current: None,
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::Connect { generation, url } => self.connect(generation, url),
            Command::Send { generation, frame } => self.send(generation, frame),
            Command::Close { generation } => self.close(generation),
            Command::ScheduleReconnect { after } => self.schedule_reconnect(after),
        }
    }

    pub fn execute_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.execute(command);
        }
    }

    fn connect(&mut self, generation: u64, url: String) {
        if let Some(previous) = self.current.take() {
            debug!(generation = previous.generation, "dropping superseded connection");
            previous.task.abort();
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let events = self.events.clone();
        let task = tokio::spawn(run_connection(generation, url, outbound_rx, events));

        self.current = Some(Connection {
            generation,
            outbound: outbound_tx,
            task,
        });
    }

    fn send(&mut self, generation: u64, frame: String) {
        match self.live(generation) {
            Some(connection) => {
                if connection.outbound.send(Outbound::Frame(frame)).is_err() {
                    emit(
                        &self.events,
                        generation,
                        SocketEvent::Error("connection task has exited".to_string()),
                    );
                }
            }
            None => warn!(generation, "no live connection to send on"),
        }
    }

    fn close(&mut self, generation: u64) {
        if let Some(connection) = self.live(generation) {
            // The task may already be gone; its Closed event is on the way.
            let _ = connection.outbound.send(Outbound::Close);
        }
    }

    fn schedule_reconnect(&self, after: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(AppEvent::ReconnectDue);
        });
    }

    fn live(&self, generation: u64) -> Option<&Connection> {
        self.current
            .as_ref()
            .filter(|connection| connection.generation == generation)
    }
}

fn emit(events: &mpsc::UnboundedSender<AppEvent>, generation: u64, event: SocketEvent) {
    let _ = events.send(AppEvent::Socket { generation, event });
}

async fn run_connection(
    generation: u64,
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<AppEvent>,
) {
    match connect_async(url.as_str()).await {
        Ok((stream, _response)) => {
            emit(&events, generation, SocketEvent::Opened);
            let (mut sink, mut source) = stream.split();

            loop {
                tokio::select! {
                    incoming = source.next() => match incoming {
                        Some(Ok(Message::Text(text))) => {
                            emit(&events, generation, SocketEvent::Frame(text));
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!(generation, ?frame, "server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            emit(&events, generation, SocketEvent::Error(e.to_string()));
                            break;
                        }
                        None => break,
                    },
                    outgoing = outbound.recv() => match outgoing {
                        Some(Outbound::Frame(text)) => {
                            if let Err(e) = sink.send(Message::Text(text)).await {
                                emit(&events, generation, SocketEvent::Error(e.to_string()));
                                break;
                            }
                        }
                        Some(Outbound::Close) | None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                }
            }
        }
        Err(e) => {
            emit(&events, generation, SocketEvent::Error(e.to_string()));
        }
    }

    emit(&events, generation, SocketEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    async fn next_socket_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> (u64, SocketEvent) {
        loop {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for event")
                .expect("channel closed");
            if let AppEvent::Socket { generation, event } = event {
                return (generation, event);
            }
        }
    }

    #[tokio::test]
    async fn refused_connection_reports_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SocketDriver::new(tx);
        driver.execute(Command::Connect {
            generation: 7,
            url: format!("ws://{}/ws", addr),
        });

        let (generation, event) = next_socket_event(&mut rx).await;
        assert_eq!(generation, 7);
        assert!(matches!(event, SocketEvent::Error(_)));
        assert_eq!(next_socket_event(&mut rx).await, (7, SocketEvent::Closed));
    }

    #[tokio::test]
    async fn relays_frames_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(
                r#"{"target_panel":"intermediary","message_type":"speech","content":"hi"}"#.to_string(),
            ))
            .await
            .unwrap();

            let received = loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => break text,
                    Some(Ok(_)) => continue,
                    other => panic!("unexpected {:?}", other),
                }
            };
            ws.close(None).await.ok();
            received
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SocketDriver::new(tx);
        driver.execute(Command::Connect {
            generation: 1,
            url: format!("ws://{}/ws", addr),
        });

        assert_eq!(next_socket_event(&mut rx).await, (1, SocketEvent::Opened));
        let (_, event) = next_socket_event(&mut rx).await;
        assert_eq!(
            event,
            SocketEvent::Frame(
                r#"{"target_panel":"intermediary","message_type":"speech","content":"hi"}"#.to_string()
            )
        );

        driver.execute(Command::Send {
            generation: 1,
            frame: r#"{"content":"question"}"#.to_string(),
        });
        assert_eq!(server.await.unwrap(), r#"{"content":"question"}"#);

        assert_eq!(next_socket_event(&mut rx).await, (1, SocketEvent::Closed));
    }

    #[tokio::test]
    async fn reconnect_timer_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SocketDriver::new(tx);
        driver.execute(Command::ScheduleReconnect {
            after: Duration::from_millis(20),
        });

        let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(event, AppEvent::ReconnectDue));
    }

    #[tokio::test]
    async fn send_without_connection_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SocketDriver::new(tx);
        driver.execute(Command::Send {
            generation: 3,
            frame: "{}".to_string(),
        });
        driver.execute(Command::Close { generation: 3 });
        drop(driver);

        assert!(rx.recv().await.is_none());
    }
}
