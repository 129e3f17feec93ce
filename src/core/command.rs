//! Command construction helpers.

use bytes::Bytes;

/// A command ready to be handed to the transport.
///
/// Commands are built with the builder pattern; the first argument is the
/// command name.
///
/// # Example
///
/// ```
/// use slotwise::Cmd;
///
/// let cmd = Cmd::new("SET").arg("key").arg("value");
/// assert_eq!(cmd.name(), "SET");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    args: Vec<Bytes>,
}

impl Cmd {
    /// Creates a new command with the given name.
    #[inline]
    pub fn new(name: impl Into<Bytes>) -> Self {
        Self {
            args: vec![name.into()],
        }
    }

    /// Appends an argument to the command.
    #[inline]
    pub fn arg<T: Into<Bytes>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The command name, uppercased.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.args[0]).to_ascii_uppercase()
    }

    /// All arguments including the command name.
    #[inline]
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// The keys this command touches.
    ///
    /// Key positions follow the conventional layout of the command family:
    /// administrative and connection commands touch no keys, variadic
    /// commands treat every argument as a key, MSET-style commands every
    /// other one, and anything else is assumed to be key-first. Empty is a
    /// valid answer; such commands are node-agnostic in cluster mode.
    pub fn keys(&self) -> Vec<Bytes> {
        match self.name().as_str() {
            "PING" | "ECHO" | "AUTH" | "SELECT" | "HELLO" | "RESET" | "INFO" | "CLUSTER"
            | "CLIENT" | "CONFIG" | "COMMAND" | "DBSIZE" | "FLUSHALL" | "FLUSHDB" | "SCRIPT"
            | "MULTI" | "EXEC" | "DISCARD" | "UNWATCH" | "WAIT" | "TIME" => Vec::new(),
            "MGET" | "DEL" | "EXISTS" | "UNLINK" | "TOUCH" | "WATCH" | "PFCOUNT" => {
                self.args[1..].to_vec()
            }
            "MSET" | "MSETNX" => self.args[1..].iter().step_by(2).cloned().collect(),
            _ => self.args.get(1).cloned().into_iter().collect(),
        }
    }
}

/// Creates a PING command.
#[inline]
pub fn ping() -> Cmd {
    Cmd::new("PING")
}

/// Creates an ECHO command.
#[inline]
pub fn echo(msg: impl Into<Bytes>) -> Cmd {
    Cmd::new("ECHO").arg(msg)
}

/// Creates a GET command.
#[inline]
pub fn get(key: impl Into<Bytes>) -> Cmd {
    Cmd::new("GET").arg(key)
}

/// Creates a SET command.
#[inline]
pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    Cmd::new("SET").arg(key).arg(value)
}

/// Creates a DEL command for one or more keys.
#[inline]
pub fn del<I, K>(keys: I) -> Cmd
where
    I: IntoIterator<Item = K>,
    K: Into<Bytes>,
{
    keys.into_iter().fold(Cmd::new("DEL"), Cmd::arg)
}

/// Creates an EXISTS command.
#[inline]
pub fn exists(key: impl Into<Bytes>) -> Cmd {
    Cmd::new("EXISTS").arg(key)
}

/// Creates an INCR command.
#[inline]
pub fn incr(key: impl Into<Bytes>) -> Cmd {
    Cmd::new("INCR").arg(key)
}

/// Creates an MGET command.
#[inline]
pub fn mget<I, K>(keys: I) -> Cmd
where
    I: IntoIterator<Item = K>,
    K: Into<Bytes>,
{
    keys.into_iter().fold(Cmd::new("MGET"), Cmd::arg)
}
