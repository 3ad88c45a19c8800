//! WebSocket transport to the game-instrumentation process.
//!
//! Receive-only: the instrumentation pushes one JSON frame per message
//! and expects nothing back. The read loop forwards payloads on an
//! unbounded channel in delivery order - no reordering, no batching.

use crate::error::{Error, Result};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Events the transport reports to the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One message payload, as text.
    Message(String),
    /// The peer closed the connection or the stream ended.
    Closed,
    /// The connection failed mid-stream.
    Error(String),
}

/// An established WebSocket connection.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Dials `url`; resolves once the handshake completes (the "open"
    /// signal). The caller bounds this with the configured timeout.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) =
            connect_async(url)
                .await
                .map_err(|err| Error::ConnectFailed {
                    url: url.to_string(),
                    reason: err.to_string(),
                })?;

        Ok(Self { stream })
    }

    /// Read loop. Forwards every payload until the peer closes or the
    /// stream errors, then reports the terminal event and returns.
    pub async fn run(mut self, events: mpsc::UnboundedSender<TransportEvent>) {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if events.send(TransportEvent::Message(text)).is_err() {
                        // Driver went away; stop reading.
                        return;
                    }
                }
                Ok(Message::Binary(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    if events.send(TransportEvent::Message(text)).is_err() {
                        return;
                    }
                }
                Ok(Message::Close(_)) => {
                    let _ = events.send(TransportEvent::Closed);
                    return;
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "transport read error");
                    let _ = events.send(TransportEvent::Error(err.to_string()));
                    return;
                }
            }
        }

        let _ = events.send(TransportEvent::Closed);
    }
}
