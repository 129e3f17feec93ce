//! # Slotwise
//!
//! Client-side access layer for Redis-compatible distributed key-value
//! stores. Slotwise sits between application code and a lower-level
//! transport and adds three things the transport does not give you:
//!
//! - a closed domain error taxonomy: every transport failure is translated
//!   before it reaches application code, with ancestor-chain resolution for
//!   error kinds newer than the mapping table;
//! - fork-safe connections: a connection is never silently reused across a
//!   process fork unless explicitly permitted;
//! - cluster transaction routing (`cluster` feature): a multi-command
//!   transaction is refused before any I/O when its commands cannot be
//!   guaranteed to land on a single node.
//!
//! ## Features
//!
//! - `cluster` - slot hashing and single-node transaction routing
//! - `resp3` - newer protocol revision; adds the out-of-memory error kind
//! - `test-utils` - scripted in-memory transport for tests
//!
//! ## Example
//!
//! ```no_run
//! use slotwise::{Client, Cmd, Transport};
//!
//! async fn example<T: Transport>(transport: T) -> slotwise::Result<()> {
//!     let mut client = Client::new(transport);
//!     client.call(Cmd::new("SET").arg("key").arg("value")).await?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod translate;
pub(crate) mod transport;

#[cfg(feature = "cluster")]
pub(crate) mod cluster;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export the client surface for convenience
pub use crate::core::command::{self, Cmd};
pub use crate::core::config::{ClientConfig, ConfigBuilder};
pub use crate::core::state::ConnectionState;
pub use crate::core::{Client, ReconnectionDisabled};
pub use crate::error::{Error, Result};
pub use crate::transport::{kind, Reply, Transport, TransportError};

#[cfg(feature = "cluster")]
pub use crate::cluster::{
    key_slot, route_transaction, ClusterClient, KeyResolver, NodeId, SlotMap, SlotRange,
    SLOT_COUNT,
};
