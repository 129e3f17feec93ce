//! Guarded client over a transport adapter.
//!
//! [`Client`] wraps (does not inherit from) the transport: every blocking
//! operation goes through a fork-safety check first, every transport error
//! comes back translated into the domain taxonomy, and the transaction path
//! runs with reconnection disabled so a silent reconnect can never split an
//! atomic sequence.

use std::time::Duration;

use tracing::instrument;

use crate::error::Result;
use crate::translate::translate;
use crate::transport::{Reply, Transport};

/// Command construction helpers.
pub mod command;
/// Connection configuration.
pub mod config;
/// Fork-safety state tracking.
pub mod state;

use self::command::Cmd;
use self::config::ClientConfig;
use self::state::ConnectionState;

/// Extra margin added to a caller-supplied blocking timeout.
///
/// The command timeout cannot double as the connection timeout or the two
/// race; the margin covers the network round-trip delay.
const BLOCKING_TIMEOUT_GRACE: Duration = Duration::from_millis(100);

/// A guarded connection to a single server.
///
/// # Example
///
/// ```no_run
/// use slotwise::{Client, Cmd, Transport};
///
/// async fn example<T: Transport>(transport: T) -> slotwise::Result<()> {
///     let mut client = Client::new(transport);
///     client.call(Cmd::new("SET").arg("key").arg("value")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    state: ConnectionState,
}

impl<T: Transport> Client<T> {
    /// Wraps a transport in a guarded client.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::new(),
        }
    }

    /// Connection configuration exposed by the transport.
    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Caller-assigned connection identifier.
    pub fn id(&self) -> Option<&str> {
        self.config().id.as_deref()
    }

    /// Server hostname; `None` when connected over a unix socket.
    pub fn host(&self) -> Option<&str> {
        let config = self.config();
        config.path.is_none().then_some(config.host.as_str())
    }

    /// Server port; `None` when connected over a unix socket.
    pub fn port(&self) -> Option<u16> {
        let config = self.config();
        config.path.is_none().then_some(config.port)
    }

    /// Unix socket path, when configured.
    pub fn path(&self) -> Option<&str> {
        self.config().path.as_deref()
    }

    /// Selected logical database.
    pub fn db(&self) -> u8 {
        self.config().db
    }

    /// Username for ACL authentication.
    pub fn username(&self) -> Option<&str> {
        self.config().username.as_deref()
    }

    /// Password for authentication.
    pub fn password(&self) -> Option<&str> {
        self.config().password.as_deref()
    }

    /// Read timeout applied at the transport boundary.
    pub fn timeout(&self) -> Option<Duration> {
        self.config().read_timeout
    }

    /// Sends one command and awaits its reply.
    pub async fn call(&mut self, cmd: Cmd) -> Result<Reply> {
        self.guarded_call(cmd, true).await
    }

    /// Sends one command with a caller-supplied read timeout.
    ///
    /// A positive timeout is widened by a fixed grace margin before being
    /// handed to the transport, so the protocol-level timeout fires before
    /// the connection-level one.
    pub async fn blocking_call(&mut self, timeout: Option<Duration>, cmd: Cmd) -> Result<Reply> {
        self.ensure_owned()?;
        let timeout = timeout.map(|t| {
            if t > Duration::ZERO {
                t + BLOCKING_TIMEOUT_GRACE
            } else {
                t
            }
        });
        self.transport
            .call_blocking(timeout, cmd, true)
            .await
            .map_err(translate)
    }

    /// Sends a pipeline of commands and awaits every reply.
    pub async fn pipelined(&mut self, cmds: Vec<Cmd>) -> Result<Vec<Reply>> {
        self.ensure_owned()?;
        self.transport
            .call_pipelined(cmds, true)
            .await
            .map_err(translate)
    }

    /// Sends commands inside a MULTI/EXEC block.
    ///
    /// Runs with reconnection disabled: a transparent reconnect in the
    /// middle of a transaction would break atomicity expectations.
    pub async fn multi(&mut self, cmds: Vec<Cmd>) -> Result<Vec<Reply>> {
        self.ensure_owned()?;
        self.transport
            .call_multi(cmds, false)
            .await
            .map_err(translate)
    }

    /// Permanently disables the fork check for this connection.
    ///
    /// Only for callers who have taken explicit responsibility for a
    /// deliberate fork-and-share pattern.
    pub fn inherit_socket(&mut self) {
        self.state.inherit_socket();
    }

    /// Returns a handle whose calls run with reconnection disabled.
    ///
    /// Used for sequences where a silent reconnect between commands would
    /// violate the caller's consistency expectations.
    pub fn disable_reconnection(&mut self) -> ReconnectionDisabled<'_, T> {
        ReconnectionDisabled { client: self }
    }

    /// Releases the connection and forgets the owning process, so a future
    /// reconnect re-captures it.
    pub async fn close(&mut self) {
        self.transport.close().await;
        self.state.reset();
    }

    #[instrument(skip(self, cmd), level = "debug", fields(command = %cmd.name()))]
    async fn guarded_call(&mut self, cmd: Cmd, retryable: bool) -> Result<Reply> {
        self.ensure_owned()?;
        self.transport.call(cmd, retryable).await.map_err(translate)
    }

    fn ensure_owned(&mut self) -> Result<()> {
        self.state.ensure_owned(std::process::id())
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut ConnectionState {
        &mut self.state
    }
}

/// Borrow-scoped view of a [`Client`] with reconnection disabled.
///
/// Every call passes `retryable = false` to the transport. Dropping the
/// handle restores normal behavior.
#[derive(Debug)]
pub struct ReconnectionDisabled<'a, T> {
    client: &'a mut Client<T>,
}

impl<T: Transport> ReconnectionDisabled<'_, T> {
    /// Sends one command without permitting a reconnect.
    pub async fn call(&mut self, cmd: Cmd) -> Result<Reply> {
        self.client.guarded_call(cmd, false).await
    }

    /// Sends a pipeline of commands without permitting a reconnect.
    pub async fn pipelined(&mut self, cmds: Vec<Cmd>) -> Result<Vec<Reply>> {
        self.client.ensure_owned()?;
        self.client
            .transport
            .call_pipelined(cmds, false)
            .await
            .map_err(translate)
    }
}
