//! Per-connection fork-safety state.

use tracing::error;

use crate::error::{Error, Result};

/// Tracks which process owns a connection.
///
/// An OS socket shared across a fork is a latent corruption bug: parent and
/// child would interleave writes on the same descriptor. The owning process
/// id is captured lazily on the first guarded call and compared on every
/// later one. A mismatch is a fatal usage error unless the caller has
/// explicitly opted into sharing via [`ConnectionState::inherit_socket`].
#[derive(Debug, Default)]
pub struct ConnectionState {
    inherit_socket: bool,
    owner_pid: Option<u32>,
}

impl ConnectionState {
    /// Creates state with no owner captured yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently disables the fork check for this connection.
    pub fn inherit_socket(&mut self) {
        self.inherit_socket = true;
    }

    /// Whether the fork check is disabled.
    pub fn is_inheritable(&self) -> bool {
        self.inherit_socket
    }

    /// The process id that owns this connection, if captured.
    pub fn owner_pid(&self) -> Option<u32> {
        self.owner_pid
    }

    /// Verifies the calling process owns this connection.
    ///
    /// Captures `current_pid` as the owner on first use. A mismatch is
    /// [`Error::Inherited`]: fatal and non-retryable, because retrying on
    /// the same socket after a fork can corrupt the parent's connection.
    pub(crate) fn ensure_owned(&mut self, current_pid: u32) -> Result<()> {
        if self.inherit_socket {
            return Ok(());
        }
        match self.owner_pid {
            None => {
                self.owner_pid = Some(current_pid);
                Ok(())
            }
            Some(owner) if owner == current_pid => Ok(()),
            Some(owner) => {
                error!(owner, current = current_pid, "connection used across a fork boundary");
                Err(Error::Inherited)
            }
        }
    }

    /// Forgets the owner so a future reconnect re-captures it.
    pub(crate) fn reset(&mut self) {
        self.owner_pid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_captured_on_first_use() {
        let mut state = ConnectionState::new();
        assert!(state.owner_pid().is_none());
        state.ensure_owned(42).unwrap();
        assert_eq!(state.owner_pid(), Some(42));
    }

    #[test]
    fn test_same_process_passes() {
        let mut state = ConnectionState::new();
        state.ensure_owned(42).unwrap();
        assert!(state.ensure_owned(42).is_ok());
    }

    #[test]
    fn test_forked_child_is_rejected() {
        let mut state = ConnectionState::new();
        state.ensure_owned(42).unwrap();
        assert!(matches!(state.ensure_owned(43), Err(Error::Inherited)));
        // Owner is unchanged after the rejection.
        assert_eq!(state.owner_pid(), Some(42));
    }

    #[test]
    fn test_inherit_socket_disables_check() {
        let mut state = ConnectionState::new();
        state.ensure_owned(42).unwrap();
        state.inherit_socket();
        assert!(state.ensure_owned(43).is_ok());
        assert!(state.is_inheritable());
    }

    #[test]
    fn test_reset_recaptures_next_owner() {
        let mut state = ConnectionState::new();
        state.ensure_owned(42).unwrap();
        state.reset();
        assert!(state.ensure_owned(43).is_ok());
        assert_eq!(state.owner_pid(), Some(43));
    }
}
