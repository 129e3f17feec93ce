//! Transport adapter interface.
//!
//! The transport performs the actual socket I/O, command encoding, and
//! reconnection handling. Slotwise consumes it through the [`Transport`]
//! trait and never inspects the wire format itself. Failures cross the
//! boundary as [`TransportError`] values and are rewritten into domain
//! errors before reaching application code.

use std::backtrace::Backtrace;
// Alias so the thiserror derive does not detect the `Backtrace` field and
// generate a `provide` impl, which requires the unstable
// `error_generic_member_access` feature on stable toolchains.
use std::backtrace::Backtrace as CapturedBacktrace;
use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::core::command::Cmd;
use crate::core::config::ClientConfig;

/// Well-known transport error kind identifiers.
///
/// Adapters are free to raise kinds that are not listed here; unknown kinds
/// carry their own supertype chain (see [`TransportError::with_ancestors`])
/// and are resolved against the mapping table at translation time.
pub mod kind {
    /// Root of the transport error hierarchy.
    pub const ERROR: &str = "error";
    /// Transport-level connect failure.
    pub const CONNECTION: &str = "connection";
    /// A usable connection could not be established.
    pub const CANNOT_CONNECT: &str = "cannot_connect";
    /// Failover to another endpoint failed.
    pub const FAILOVER: &str = "failover";
    /// The server did not reply within the read timeout.
    pub const READ_TIMEOUT: &str = "read_timeout";
    /// The server rejected the command.
    pub const COMMAND: &str = "command";
    /// Authentication handshake failed.
    pub const AUTHENTICATION: &str = "authentication";
    /// The server refused the command for ACL reasons.
    pub const PERMISSION: &str = "permission";
    /// Operation applied against a key holding another type.
    pub const WRONG_TYPE: &str = "wrong_type";
    /// Write issued against a read-only replica.
    pub const READ_ONLY: &str = "read_only";
    /// The reply stream violated the protocol grammar.
    pub const PROTOCOL: &str = "protocol";
    /// The server is out of memory. Only raised by newer protocol revisions.
    pub const OUT_OF_MEMORY: &str = "out_of_memory";
}

/// Supertype chain for the well-known kinds, most specific first.
fn builtin_ancestors(k: &str) -> &'static [&'static str] {
    match k {
        kind::ERROR => &[],
        kind::CONNECTION | kind::COMMAND | kind::PROTOCOL => &[kind::ERROR],
        kind::CANNOT_CONNECT | kind::FAILOVER | kind::READ_TIMEOUT => {
            &[kind::CONNECTION, kind::ERROR]
        }
        kind::AUTHENTICATION => &[kind::CANNOT_CONNECT, kind::CONNECTION, kind::ERROR],
        kind::PERMISSION | kind::WRONG_TYPE | kind::READ_ONLY | kind::OUT_OF_MEMORY => {
            &[kind::COMMAND, kind::ERROR]
        }
        _ => &[kind::ERROR],
    }
}

/// A failure raised by the transport adapter.
///
/// Transport libraries grow new error subclasses across versions, so the
/// kind space is open: an error is identified by a kind string plus an
/// ordered chain of supertype kinds. Well-known kinds get their chain from
/// a builtin table; adapter-specific kinds supply their own.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    kind: Cow<'static, str>,
    ancestors: Vec<Cow<'static, str>>,
    message: String,
    trace: CapturedBacktrace,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    ///
    /// The supertype chain defaults to the builtin hierarchy for well-known
    /// kinds, and to the root kind for everything else.
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        let kind = kind.into();
        let ancestors = builtin_ancestors(&kind)
            .iter()
            .map(|a| Cow::Borrowed(*a))
            .collect();
        Self {
            kind,
            ancestors,
            message: message.into(),
            trace: Backtrace::capture(),
        }
    }

    /// Replaces the supertype chain, most specific first.
    ///
    /// Adapters use this for error kinds the builtin table does not know.
    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }

    /// The exact kind identifier of this error.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The supertype chain, most specific first. Does not include the kind
    /// itself.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.ancestors.iter().map(|a| a.as_ref())
    }

    /// The human-readable message from the adapter.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backtrace captured when the error was constructed.
    pub fn trace(&self) -> &Backtrace {
        &self.trace
    }
}

/// A reply value returned by the server.
///
/// The wire grammar is the adapter's concern; replies cross the boundary
/// already decoded into this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A simple status string (e.g. `OK`, `PONG`).
    Simple(String),
    /// A bulk payload, `None` when the key does not exist.
    Bulk(Option<Bytes>),
    /// A signed integer reply.
    Int(i64),
    /// An array of nested replies.
    Array(Vec<Reply>),
}

/// The lower-level connection the client wraps.
///
/// Implementations own the socket, the encoder, and the reconnection
/// policy. The `retryable` flag tells the adapter whether it may
/// transparently reconnect and retry; the guarded transaction path always
/// passes `false`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Connection configuration exposed by the adapter.
    fn config(&self) -> &ClientConfig;

    /// Sends one command and awaits its reply.
    async fn call(&mut self, cmd: Cmd, retryable: bool) -> Result<Reply, TransportError>;

    /// Sends one command with a caller-supplied read timeout.
    async fn call_blocking(
        &mut self,
        timeout: Option<Duration>,
        cmd: Cmd,
        retryable: bool,
    ) -> Result<Reply, TransportError>;

    /// Sends a pipeline of commands and awaits every reply.
    async fn call_pipelined(
        &mut self,
        cmds: Vec<Cmd>,
        retryable: bool,
    ) -> Result<Vec<Reply>, TransportError>;

    /// Sends commands inside a MULTI/EXEC block and awaits every reply.
    async fn call_multi(
        &mut self,
        cmds: Vec<Cmd>,
        retryable: bool,
    ) -> Result<Vec<Reply>, TransportError>;

    /// Releases the underlying connection.
    async fn close(&mut self);
}
