//! Single-slot owner of the live connection.
//!
//! [`ConnectionManager`] holds at most one [`Connection`]. Opening a new
//! one first detaches and closes the previous one, so a frame is never
//! delivered twice and a replaced connection stays silent.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::connection::{Connection, ConnectionState, EventHandler};

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the one live connection to the build server.
///
/// Mutation goes through `&mut self`, so replacing and closing are
/// serialized by whoever owns the manager.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use build_notifier::transport::{ConnectionManager, TransportEvent};
///
/// let mut manager = ConnectionManager::new(Arc::new(|event: TransportEvent| {
///     println!("{event:?}");
/// }));
/// manager.open("ws://ci.local:8080/").await;
/// // settings changed
/// manager.open("ws://ci.example.com/").await;
/// manager.close();
/// ```
pub struct ConnectionManager {
    /// Handler registered on every connection this manager opens.
    handler: EventHandler,
    /// The owned connection, if any.
    current: Option<Connection>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Creates a manager with no connection.
    #[must_use]
    pub fn new(handler: EventHandler) -> Self {
        Self {
            handler,
            current: None,
        }
    }

    /// Replaces the current connection with a new one to `url`.
    ///
    /// The previous connection's handler is unregistered and a close is
    /// requested without waiting for it. The new connection is stored,
    /// gets the handler, and then connects. Connect failures are reported
    /// to the handler only; the manager keeps the disconnected connection
    /// and does not retry.
    pub async fn open(&mut self, url: &str) {
        self.detach();

        info!(url = %url, "Opening connection");

        let connection = self.current.insert(Connection::new(url));
        connection.set_event_handler(Arc::clone(&self.handler));
        connection.connect().await;
    }

    /// Closes and forgets the current connection. No-op when there is none.
    pub fn close(&mut self) {
        if self.detach() {
            info!("Connection closed");
        }
    }

    /// Returns the owned connection, if any.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        self.current.as_ref()
    }

    /// Returns the state of the owned connection.
    ///
    /// [`ConnectionState::Disconnected`] when nothing is owned.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.current
            .as_ref()
            .map_or(ConnectionState::Disconnected, Connection::state)
    }

    /// Unregisters and closes the owned connection. Returns `true` if one existed.
    fn detach(&mut self) -> bool {
        let Some(previous) = self.current.take() else {
            return false;
        };

        debug!(connection_id = %previous.id(), url = %previous.url(), "Detaching connection");
        previous.clear_event_handler();
        previous.shutdown();
        true
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.detach();
    }
}

// ============================================================================
// Tests
// ============================================================================
