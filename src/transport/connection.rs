//! WebSocket client connection and event loop.
//!
//! One [`Connection`] is one attempt to talk to the build server. After
//! the handshake it spawns a tokio task that forwards inbound frames and
//! transport failures to the registered [`EventHandler`].
//!
//! # Event Loop
//!
//! The spawned task handles:
//!
//! - Incoming text frames (delivered as [`TransportEvent::Message`])
//! - Read failures (delivered as [`TransportEvent::Error`])
//! - Shutdown requests
//!
//! # Threading Contract
//!
//! The handler runs on the event-loop task of its connection, one event
//! at a time, in the order the server sent them. The handler slot lock is
//! held during delivery, so [`Connection::clear_event_handler`] blocks
//! until an in-flight delivery returns and nothing is delivered after it.
//!
//! A panicking handler does not end the loop. The panic is logged and
//! handed back to the same handler as [`Error::Handler`].

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Stream type produced by `connect_async`.
type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event handler callback type.
///
/// Called for each event of the connection it is registered on.
pub type EventHandler = Arc<dyn Fn(TransportEvent) + Send + Sync>;

// ============================================================================
// TransportEvent
// ============================================================================

/// Event pushed by a connection to its handler.
#[derive(Debug)]
pub enum TransportEvent {
    /// A text frame from the server.
    Message(String),
    /// Connect or receive failure, or a panic in the handler.
    Error(Error),
}

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a [`Connection`].
///
/// `Disconnected → Connecting → Connected → Closing → Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. Initial and terminal state.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Event loop running.
    Connected,
    /// Close requested, event loop winding down.
    Closing,
}

// ============================================================================
// ConnectionId
// ============================================================================

/// Identifier used to correlate log lines of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket client connection to the build server.
///
/// Owned exclusively by [`ConnectionManager`](super::ConnectionManager).
/// Dropping it closes the socket.
pub struct Connection {
    /// Log correlation id.
    id: ConnectionId,
    /// Target URL as configured.
    url: String,
    /// Lifecycle state (shared with event loop).
    state: Arc<Mutex<ConnectionState>>,
    /// Event handler (shared with event loop).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
    /// Shutdown signal for the event loop, present once connected.
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Creates a disconnected connection to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: ConnectionId::generate(),
            url: url.into(),
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            event_handler: Arc::new(Mutex::new(None)),
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Returns the connection id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the target URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Sets the event handler callback.
    pub fn set_event_handler(&self, handler: EventHandler) {
        let mut guard = self.event_handler.lock();
        *guard = Some(handler);
    }

    /// Clears the event handler.
    ///
    /// Waits for an in-flight delivery to return.
    pub fn clear_event_handler(&self) {
        let mut guard = self.event_handler.lock();
        *guard = None;
    }

    /// Performs the WebSocket handshake and starts the event loop.
    ///
    /// Failures are not returned: they go to the event handler as
    /// [`TransportEvent::Error`] and leave the connection
    /// [`ConnectionState::Disconnected`]. No retry is attempted.
    pub async fn connect(&self) {
        self.set_state(ConnectionState::Connecting);
        debug!(connection_id = %self.id, url = %self.url, "Connecting");

        let ws_stream = match self.handshake().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(connection_id = %self.id, url = %self.url, error = %e, "Connect failed");
                self.set_state(ConnectionState::Disconnected);
                Self::deliver(self.id, &self.event_handler, TransportEvent::Error(e));
                return;
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(shutdown_tx);
        self.set_state(ConnectionState::Connected);

        info!(connection_id = %self.id, url = %self.url, "Connected");

        tokio::spawn(Self::run_event_loop(
            self.id,
            ws_stream,
            shutdown_rx,
            Arc::clone(&self.state),
            Arc::clone(&self.event_handler),
        ));
    }

    /// Requests a close without waiting for it to complete.
    pub fn shutdown(&self) {
        let tx = self.shutdown_tx.lock().take();

        match tx.map(|tx| tx.send(()).is_ok()) {
            Some(true) => {
                let mut state = self.state.lock();
                if *state == ConnectionState::Connected {
                    *state = ConnectionState::Closing;
                }
                debug!(connection_id = %self.id, "Close requested");
            }
            _ => self.set_state(ConnectionState::Disconnected),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    async fn handshake(&self) -> Result<ClientStream> {
        let url = Url::parse(&self.url).map_err(|e| Error::invalid_url(&self.url, e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_url(&self.url, "scheme must be ws or wss"));
        }

        let (ws_stream, _response) = connect_async(url.as_str()).await?;
        Ok(ws_stream)
    }

    /// Invokes the handler, if one is registered, while holding the slot.
    ///
    /// A panic is caught and reported to the handler once as
    /// [`Error::Handler`].
    fn deliver(id: ConnectionId, event_handler: &Mutex<Option<EventHandler>>, event: TransportEvent) {
        let guard = event_handler.lock();
        let Some(handler) = guard.as_ref() else {
            trace!(connection_id = %id, ?event, "No handler registered, dropping event");
            return;
        };

        let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(event))) else {
            return;
        };

        let message = panic_message(payload.as_ref());
        error!(connection_id = %id, panic = %message, "Event handler panicked");

        let report = TransportEvent::Error(Error::handler(message));
        if panic::catch_unwind(AssertUnwindSafe(|| handler(report))).is_err() {
            error!(connection_id = %id, "Event handler panicked again while reporting a panic");
        }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        id: ConnectionId,
        ws_stream: ClientStream,
        mut shutdown_rx: oneshot::Receiver<()>,
        state: Arc<Mutex<ConnectionState>>,
        event_handler: Arc<Mutex<Option<EventHandler>>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(connection_id = %id, len = text.len(), "Text frame");
                            Self::deliver(
                                id,
                                &event_handler,
                                TransportEvent::Message(text.as_str().to_owned()),
                            );
                        }

                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                            Ok(text) => Self::deliver(id, &event_handler, TransportEvent::Message(text)),
                            Err(_) => trace!(connection_id = %id, "Ignoring non-UTF-8 binary frame"),
                        },

                        Some(Ok(Message::Close(_))) => {
                            debug!(connection_id = %id, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            warn!(connection_id = %id, error = %e, "WebSocket error");
                            Self::deliver(id, &event_handler, TransportEvent::Error(e.into()));
                            break;
                        }

                        None => {
                            debug!(connection_id = %id, "WebSocket stream ended");
                            break;
                        }

                        // Ping/Pong are answered by tungstenite
                        _ => {}
                    }
                }

                // Sender dropped counts as a shutdown request
                _ = &mut shutdown_rx => {
                    debug!(connection_id = %id, "Shutting down");
                    let _ = ws_write.close().await;
                    break;
                }
            }
        }

        *state.lock() = ConnectionState::Disconnected;
        debug!(connection_id = %id, "Event loop terminated");
    }
}

/// Extracts the text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Barrier;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
    use tokio::time::timeout;

    /// Accepts one client and pushes every frame sent on the returned channel.
    async fn spawn_server() -> (String, UnboundedSender<&'static str>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            loop {
                tokio::select! {
                    frame = rx.recv() => match frame {
                        Some(frame) => {
                            if ws.send(Message::Text(frame.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    incoming = ws.next() => {
                        if !matches!(incoming, Some(Ok(_))) {
                            break;
                        }
                    }
                }
            }
        });

        (format!("ws://127.0.0.1:{port}"), tx)
    }

    fn channel_handler() -> (EventHandler, UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler: EventHandler = Arc::new(move |event: TransportEvent| {
            let _ = tx.send(event);
        });
        (handler, rx)
    }

    async fn next_event(rx: &mut UnboundedReceiver<TransportEvent>) -> TransportEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event timed out")
            .expect("handler dropped")
    }

    #[test]
    fn test_new_is_disconnected() {
        let connection = Connection::new("ws://localhost:1");
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert_eq!(connection.url(), "ws://localhost:1");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u32), "non-string panic payload");
    }

    #[tokio::test]
    async fn test_messages_are_delivered_in_order() {
        let (url, frames) = spawn_server().await;
        let (handler, mut rx) = channel_handler();

        let connection = Connection::new(url);
        connection.set_event_handler(handler);
        connection.connect().await;
        assert_eq!(connection.state(), ConnectionState::Connected);

        frames.send("SUCCESS:one").unwrap();
        frames.send("FAILURE:two").unwrap();

        for expected in ["SUCCESS:one", "FAILURE:two"] {
            match next_event(&mut rx).await {
                TransportEvent::Message(text) => assert_eq!(text, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_connect_refused_reports_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (handler, mut rx) = channel_handler();
        let connection = Connection::new(format!("ws://127.0.0.1:{port}"));
        connection.set_event_handler(handler);
        connection.connect().await;

        assert_eq!(connection.state(), ConnectionState::Disconnected);
        match next_event(&mut rx).await {
            TransportEvent::Error(e) => assert!(e.is_connection_error()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_reports_error() {
        let (handler, mut rx) = channel_handler();
        let connection = Connection::new("http://example.com");
        connection.set_event_handler(handler);
        connection.connect().await;

        assert!(matches!(
            next_event(&mut rx).await,
            TransportEvent::Error(Error::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_cleared_handler_receives_nothing() {
        let (url, frames) = spawn_server().await;
        let (handler, mut rx) = channel_handler();

        let connection = Connection::new(url);
        connection.set_event_handler(handler);
        connection.connect().await;
        connection.clear_event_handler();
        frames.send("FAILURE:late").unwrap();

        // Clearing drops the handler, which closes the channel.
        let received = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(!matches!(received, Ok(Some(_))), "no event expected after clear");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_clear_waits_for_in_flight_delivery() {
        let (url, frames) = spawn_server().await;

        let (entered_tx, entered_rx) = std::sync::mpsc::channel::<()>();
        let release = Arc::new(Barrier::new(2));
        let delivered = Arc::new(AtomicUsize::new(0));
        let returned = Arc::new(AtomicBool::new(false));

        let handler: EventHandler = {
            let release = Arc::clone(&release);
            let delivered = Arc::clone(&delivered);
            let returned = Arc::clone(&returned);
            Arc::new(move |event: TransportEvent| {
                if let TransportEvent::Message(_) = event {
                    delivered.fetch_add(1, Ordering::SeqCst);
                    let _ = entered_tx.send(());
                    release.wait();
                    returned.store(true, Ordering::SeqCst);
                }
            })
        };

        let connection = Connection::new(url);
        connection.set_event_handler(handler);
        connection.connect().await;

        frames.send("SUCCESS:slow").unwrap();
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("handler never entered");

        std::thread::scope(|scope| {
            let clearer = scope.spawn(|| {
                connection.clear_event_handler();
                returned.load(Ordering::SeqCst)
            });

            std::thread::sleep(Duration::from_millis(100));
            let returned_early = clearer.is_finished();

            release.wait();
            assert!(!returned_early, "clear returned during delivery");
            assert!(clearer.join().unwrap(), "clear returned before the handler");
        });

        frames.send("FAILURE:after-clear").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_is_reported_and_loop_continues() {
        let (url, frames) = spawn_server().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler: EventHandler = Arc::new(move |event: TransportEvent| {
            if matches!(&event, TransportEvent::Message(text) if text == "FAILURE:first") {
                panic!("presenter failed");
            }
            let _ = tx.send(event);
        });

        let connection = Connection::new(url);
        connection.set_event_handler(handler);
        connection.connect().await;

        frames.send("FAILURE:first").unwrap();
        match next_event(&mut rx).await {
            TransportEvent::Error(Error::Handler { message }) => {
                assert_eq!(message, "presenter failed");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        frames.send("FAILURE:second").unwrap();
        assert!(matches!(
            next_event(&mut rx).await,
            TransportEvent::Message(text) if text == "FAILURE:second"
        ));
        assert_eq!(connection.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_shutdown_reaches_disconnected() {
        let (url, _frames) = spawn_server().await;
        let connection = Connection::new(url);
        connection.connect().await;

        connection.shutdown();
        assert_ne!(connection.state(), ConnectionState::Connected);

        timeout(Duration::from_secs(5), async {
            while connection.state() != ConnectionState::Disconnected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("connection did not close");

        connection.shutdown();
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_shutdown_without_connect_is_noop() {
        let connection = Connection::new("ws://localhost:1");
        connection.shutdown();
        connection.shutdown();
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }
}
