//! Transport-to-domain error translation.
//!
//! Every transport error crossing the client boundary goes through
//! [`translate`]. The mapping starts from a fixed base table and grows at
//! runtime: a kind that is absent from the table but has a mapped supertype
//! is memoized on first sight, so later lookups for that exact kind are a
//! single hash probe. Kinds with no mapped supertype at all are passed
//! through untranslated.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use tracing::{debug, warn};

use crate::error::Error;
use crate::transport::{kind, TransportError};

/// Domain kind a transport kind maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Connection,
    CannotConnect,
    Timeout,
    Command,
    Permission,
    WrongType,
    ReadOnly,
    Protocol,
    #[cfg(feature = "resp3")]
    OutOfMemory,
}

/// Fixed entries known at build time.
///
/// Authentication and failover failures are deliberately folded into
/// `CannotConnect`; callers treat them identically.
const BASE_MAPPING: &[(&str, Target)] = &[
    (kind::CONNECTION, Target::Connection),
    (kind::COMMAND, Target::Command),
    (kind::READ_TIMEOUT, Target::Timeout),
    (kind::CANNOT_CONNECT, Target::CannotConnect),
    (kind::AUTHENTICATION, Target::CannotConnect),
    (kind::FAILOVER, Target::CannotConnect),
    (kind::PERMISSION, Target::Permission),
    (kind::WRONG_TYPE, Target::WrongType),
    (kind::READ_ONLY, Target::ReadOnly),
    (kind::PROTOCOL, Target::Protocol),
];

/// Process-wide mapping cache. Append-only for the life of the process.
static MAPPING: LazyLock<RwLock<HashMap<String, Target>>> = LazyLock::new(|| {
    let mut map: HashMap<String, Target> = BASE_MAPPING
        .iter()
        .map(|(k, t)| (k.to_string(), *t))
        .collect();
    // The out-of-memory kind only exists in newer protocol revisions.
    #[cfg(feature = "resp3")]
    map.insert(kind::OUT_OF_MEMORY.to_string(), Target::OutOfMemory);
    RwLock::new(map)
});

/// Rewrites a transport error into its domain counterpart.
///
/// Total over the kinds the adapter actually raises: mapped kinds become
/// the corresponding domain variant with message and source preserved,
/// unmapped kinds come back as [`Error::Transport`] untouched.
pub(crate) fn translate(err: TransportError) -> Error {
    match resolve(&err) {
        Some(target) => domain_error(target, err),
        None => {
            warn!(kind = err.kind(), "transport error kind has no mapped ancestor");
            Error::Transport { source: err }
        }
    }
}

fn resolve(err: &TransportError) -> Option<Target> {
    {
        let map = MAPPING.read().unwrap_or_else(|e| e.into_inner());
        if let Some(target) = map.get(err.kind()) {
            return Some(*target);
        }
    }

    // Walk the supertype chain, most specific first, and memoize the exact
    // kind against the first hit. Insertion is idempotent, so a concurrent
    // fill of the same kind is harmless.
    for ancestor in err.ancestors() {
        let hit = {
            let map = MAPPING.read().unwrap_or_else(|e| e.into_inner());
            map.get(ancestor).copied()
        };
        if let Some(target) = hit {
            let mut map = MAPPING.write().unwrap_or_else(|e| e.into_inner());
            map.entry(err.kind().to_string()).or_insert(target);
            debug!(kind = err.kind(), ancestor, "memoized transport error kind");
            return Some(target);
        }
    }

    None
}

fn domain_error(target: Target, source: TransportError) -> Error {
    let message = source.message().to_string();
    match target {
        Target::Connection => Error::Connection { message, source },
        Target::CannotConnect => Error::CannotConnect { message, source },
        Target::Timeout => Error::Timeout { message, source },
        Target::Command => Error::Command { message, source },
        Target::Permission => Error::Permission { message, source },
        Target::WrongType => Error::WrongType { message, source },
        Target::ReadOnly => Error::ReadOnly { message, source },
        Target::Protocol => Error::Protocol { message, source },
        #[cfg(feature = "resp3")]
        Target::OutOfMemory => Error::OutOfMemory { message, source },
    }
}

/// Whether the mapping currently holds an exact entry for a kind.
#[cfg(test)]
fn is_mapped(kind: &str) -> bool {
    MAPPING
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .contains_key(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_kinds_translate_exactly() {
        let cases: &[(&str, fn(&Error) -> bool)] = &[
            (kind::CONNECTION, |e| matches!(e, Error::Connection { .. })),
            (kind::COMMAND, |e| matches!(e, Error::Command { .. })),
            (kind::READ_TIMEOUT, |e| matches!(e, Error::Timeout { .. })),
            (kind::CANNOT_CONNECT, |e| {
                matches!(e, Error::CannotConnect { .. })
            }),
            (kind::AUTHENTICATION, |e| {
                matches!(e, Error::CannotConnect { .. })
            }),
            (kind::FAILOVER, |e| matches!(e, Error::CannotConnect { .. })),
            (kind::PERMISSION, |e| matches!(e, Error::Permission { .. })),
            (kind::WRONG_TYPE, |e| matches!(e, Error::WrongType { .. })),
            (kind::READ_ONLY, |e| matches!(e, Error::ReadOnly { .. })),
            (kind::PROTOCOL, |e| matches!(e, Error::Protocol { .. })),
        ];

        for (k, check) in cases {
            let error = translate(TransportError::new(*k, format!("{k} failed")));
            assert!(check(&error), "kind {k} translated to {error:?}");
            assert_eq!(
                error.transport_message(),
                Some(format!("{k} failed").as_str()),
                "message must survive translation for {k}"
            );
        }
    }

    #[test]
    fn test_subclass_resolves_through_ancestor_and_is_memoized() {
        let subclass = "connection_reset_by_peer";
        assert!(!is_mapped(subclass));

        let error = translate(
            TransportError::new(subclass, "peer reset")
                .with_ancestors([kind::CONNECTION, kind::ERROR]),
        );
        assert!(matches!(error, Error::Connection { .. }));

        // Second sighting hits the exact-kind entry.
        assert!(is_mapped(subclass));
        let error = translate(
            TransportError::new(subclass, "peer reset again")
                .with_ancestors([kind::CONNECTION, kind::ERROR]),
        );
        assert!(matches!(error, Error::Connection { .. }));
    }

    #[test]
    fn test_deep_chain_resolves_to_most_specific_mapped_ancestor() {
        let error = translate(
            TransportError::new("acl_subcommand_denied", "NOPERM").with_ancestors([
                kind::PERMISSION,
                kind::COMMAND,
                kind::ERROR,
            ]),
        );
        assert!(matches!(error, Error::Permission { .. }));
    }

    #[test]
    fn test_unmapped_kind_passes_through_unchanged() {
        let error = translate(
            TransportError::new("vendor_watchdog", "watchdog fired").with_ancestors(["vendor_base"]),
        );
        match error {
            Error::Transport { source } => {
                assert_eq!(source.kind(), "vendor_watchdog");
                assert_eq!(source.message(), "watchdog fired");
            }
            other => panic!("expected passthrough, got {other:?}"),
        }
        assert!(!is_mapped("vendor_watchdog"));
    }

    #[cfg(feature = "resp3")]
    #[test]
    fn test_out_of_memory_mapped_with_resp3() {
        let error = translate(TransportError::new(kind::OUT_OF_MEMORY, "OOM"));
        assert!(matches!(error, Error::OutOfMemory { .. }));
    }

    #[cfg(not(feature = "resp3"))]
    #[test]
    fn test_out_of_memory_resolves_through_command_without_resp3() {
        // Without the newer protocol revision the exact kind is absent from
        // the table, but its supertype chain still lands on Command.
        let error = translate(TransportError::new(kind::OUT_OF_MEMORY, "OOM"));
        assert!(matches!(error, Error::Command { .. }));
    }

    #[test]
    fn test_concurrent_memoization_is_idempotent() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    translate(
                        TransportError::new("racy_subclass", format!("attempt {i}"))
                            .with_ancestors([kind::READ_TIMEOUT, kind::CONNECTION, kind::ERROR]),
                    )
                })
            })
            .collect();

        for handle in handles {
            let error = handle.join().expect("translation thread panicked");
            assert!(matches!(error, Error::Timeout { .. }));
        }
        assert!(is_mapped("racy_subclass"));
    }
}
