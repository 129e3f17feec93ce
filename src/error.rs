//! Domain error taxonomy.
//!
//! Application code only ever sees these variants. Transport failures are
//! rewritten by the translator before crossing the client boundary; the one
//! exception is [`Error::Transport`], the deliberate fail-loud passthrough
//! for transport kinds the mapping table has never heard of.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for slotwise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to application code.
///
/// Variants produced by translation keep the transport message and carry
/// the original error as their source, so nothing about the failure is
/// lost. [`Error::Inherited`] and [`Error::AmbiguousNode`] originate on the
/// client side and never pass through translation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level connect failure.
    #[error("connection error: {message}")]
    Connection {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// A usable connection could not be established.
    ///
    /// Authentication and failover failures are folded into this variant;
    /// callers treat them identically.
    #[error("cannot connect: {message}")]
    CannotConnect {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The server did not reply within the read timeout.
    #[error("read timed out: {message}")]
    Timeout {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The server rejected the command.
    #[error("command error: {message}")]
    Command {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The server refused the command for ACL reasons.
    #[error("permission denied: {message}")]
    Permission {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// Operation applied against a key holding another type.
    #[error("wrong type: {message}")]
    WrongType {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// Write issued against a read-only replica.
    #[error("read-only replica: {message}")]
    ReadOnly {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The reply stream violated the protocol grammar.
    #[error("protocol error: {message}")]
    Protocol {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The server is out of memory.
    #[cfg(feature = "resp3")]
    #[error("server out of memory: {message}")]
    OutOfMemory {
        /// Message from the originating transport error.
        message: String,
        /// The transport error this was translated from.
        #[source]
        source: TransportError,
    },

    /// The connection was used from a process that does not own it.
    ///
    /// Fatal usage error, never retried: reusing a socket after a fork can
    /// corrupt another process's connection state.
    #[error(
        "tried to use a connection from a child process without reconnecting; \
         reconnect after forking or call inherit_socket"
    )]
    Inherited,

    /// A transaction's commands resolve to more than one cluster node.
    ///
    /// Raised before any command is sent. Never retried automatically.
    #[cfg(feature = "cluster")]
    #[error("transaction spans multiple nodes: {}", nodes.join(", "))]
    AmbiguousNode {
        /// The distinct nodes the batch resolved to.
        nodes: Vec<String>,
    },

    /// A key hashed to a slot no known node is assigned to.
    #[cfg(feature = "cluster")]
    #[error("no node assigned to slot {slot}")]
    UncoveredSlot {
        /// The uncovered slot number.
        slot: u16,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// A transport error whose kind has no mapped ancestor.
    ///
    /// Propagated unmodified rather than coerced into a generic domain
    /// kind, preserving diagnostic fidelity for failures the mapping
    /// table's author never anticipated.
    #[error("unmapped transport error")]
    Transport {
        /// The original transport error, untouched.
        #[source]
        source: TransportError,
    },
}

impl Error {
    /// The message of the transport error this was translated from, when
    /// there is one.
    pub fn transport_message(&self) -> Option<&str> {
        match self {
            Error::Connection { source, .. }
            | Error::CannotConnect { source, .. }
            | Error::Timeout { source, .. }
            | Error::Command { source, .. }
            | Error::Permission { source, .. }
            | Error::WrongType { source, .. }
            | Error::ReadOnly { source, .. }
            | Error::Protocol { source, .. }
            | Error::Transport { source } => Some(source.message()),
            #[cfg(feature = "resp3")]
            Error::OutOfMemory { source, .. } => Some(source.message()),
            _ => None,
        }
    }
}
