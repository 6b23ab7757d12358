//! WebSocket transport layer.
//!
//! This module owns the connection to the build server and turns socket
//! activity into [`TransportEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                        ┌─────────────────┐
//! │  ConnectionManager   │        WebSocket       │  Build server   │
//! │  └─ Connection ──────┼───────────────────────►│                 │
//! │      └─ event loop   │◄───────────────────────┤  "FAILURE:..."  │
//! └──────────┬───────────┘                        └─────────────────┘
//!            │ TransportEvent::{Message, Error}
//!            ▼
//!      EventHandler
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `ConnectionManager::open` - Detach and close the previous connection
//! 2. `Connection::connect` - Handshake, spawn event loop
//! 3. Event loop delivers frames and errors to the handler
//! 4. `ConnectionManager::close` - Unregister handler, request close
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `manager` | Single-slot connection ownership |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Owner of the live connection.
pub mod manager;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionId, ConnectionState, EventHandler, TransportEvent};
pub use manager::ConnectionManager;
