//! Test support: an in-memory transport with scripted replies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::command::Cmd;
use crate::core::config::ClientConfig;
use crate::transport::{Reply, Transport, TransportError};

/// Which transport entry point a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `call`
    Call,
    /// `call_blocking`
    Blocking,
    /// `call_pipelined`
    Pipelined,
    /// `call_multi`
    Multi,
}

/// One recorded transport invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Entry point used.
    pub kind: CallKind,
    /// Commands passed in submission order.
    pub commands: Vec<Cmd>,
    /// The reconnection flag the caller passed through.
    pub retryable: bool,
    /// The timeout handed to `call_blocking`, if that entry point was used.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    replies: VecDeque<Result<Reply, TransportError>>,
    calls: Vec<RecordedCall>,
    closed: bool,
}

/// A scripted [`Transport`] for tests.
///
/// Replies and errors are queued up front; every invocation is recorded
/// for later inspection. Clones share the same state, so a test can keep a
/// handle while the client owns the transport. With an empty queue every
/// command answers `+OK`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
    config: Arc<ClientConfig>,
}

impl MockTransport {
    /// Creates a mock with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock exposing the given configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            inner: Arc::default(),
            config: Arc::new(config),
        }
    }

    /// Queues a reply for the next call.
    pub fn enqueue(&self, reply: Reply) {
        self.lock().replies.push_back(Ok(reply));
    }

    /// Queues a transport error for the next call.
    pub fn enqueue_error(&self, error: TransportError) {
        self.lock().replies.push_back(Err(error));
    }

    /// Every invocation recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Total number of commands sent through this transport.
    pub fn command_count(&self) -> usize {
        self.lock().calls.iter().map(|c| c.commands.len()).sum()
    }

    /// Whether `close` was called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, kind: CallKind, commands: Vec<Cmd>, retryable: bool, timeout: Option<Duration>) {
        self.lock().calls.push(RecordedCall {
            kind,
            commands,
            retryable,
            timeout,
        });
    }

    fn next_reply(&self) -> Result<Reply, TransportError> {
        self.lock()
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Simple("OK".to_string())))
    }

    fn next_replies(&self, n: usize) -> Result<Vec<Reply>, TransportError> {
        (0..n).map(|_| self.next_reply()).collect()
    }
}

impl Transport for MockTransport {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn call(&mut self, cmd: Cmd, retryable: bool) -> Result<Reply, TransportError> {
        self.record(CallKind::Call, vec![cmd], retryable, None);
        self.next_reply()
    }

    async fn call_blocking(
        &mut self,
        timeout: Option<Duration>,
        cmd: Cmd,
        retryable: bool,
    ) -> Result<Reply, TransportError> {
        self.record(CallKind::Blocking, vec![cmd], retryable, timeout);
        self.next_reply()
    }

    async fn call_pipelined(
        &mut self,
        cmds: Vec<Cmd>,
        retryable: bool,
    ) -> Result<Vec<Reply>, TransportError> {
        let n = cmds.len();
        self.record(CallKind::Pipelined, cmds, retryable, None);
        self.next_replies(n)
    }

    async fn call_multi(
        &mut self,
        cmds: Vec<Cmd>,
        retryable: bool,
    ) -> Result<Vec<Reply>, TransportError> {
        let n = cmds.len();
        self.record(CallKind::Multi, cmds, retryable, None);
        self.next_replies(n)
    }

    async fn close(&mut self) {
        self.lock().closed = true;
    }
}
