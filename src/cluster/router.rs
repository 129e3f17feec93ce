//! Single-node routing for multi-command transactions.
//!
//! A transaction is only atomic if every command in it lands on the same
//! node. The router settles that question up front: it resolves the target
//! node of every command in the batch and refuses the whole batch before
//! any I/O when the answer is not unique.

use std::collections::BTreeSet;

use tracing::debug;

use super::slot::hash_tag;
use super::topology::{KeyResolver, NodeId};
use crate::core::command::Cmd;
use crate::error::{Error, Result};

/// Resolves the single node a transaction batch may be sent to.
///
/// Pure and synchronous; no I/O happens here. Keyless commands are
/// node-agnostic and never contribute to ambiguity. Returns `Ok(None)`
/// when no command in the batch is keyed (the caller picks a node),
/// `Ok(Some(node))` when exactly one node is targeted, and
/// [`Error::AmbiguousNode`] listing the conflicting nodes otherwise.
///
/// A single command whose own keys span several nodes is rejected on its
/// own, before the batch-level check.
pub fn route_transaction<R: KeyResolver>(cmds: &[Cmd], resolver: &R) -> Result<Option<NodeId>> {
    let mut batch_nodes: BTreeSet<NodeId> = BTreeSet::new();

    for cmd in cmds {
        let keys = resolver.keys_of(cmd);
        if keys.is_empty() {
            continue;
        }

        let mut cmd_nodes: BTreeSet<NodeId> = BTreeSet::new();
        for key in &keys {
            let slot = resolver.slot_for_tag(hash_tag(key));
            let node = resolver
                .node_for_slot(slot)
                .ok_or(Error::UncoveredSlot { slot })?;
            cmd_nodes.insert(node);
        }

        if cmd_nodes.len() > 1 {
            debug!(command = %cmd.name(), "command keys span multiple nodes");
            return Err(ambiguous(cmd_nodes));
        }
        batch_nodes.extend(cmd_nodes);
    }

    if batch_nodes.len() > 1 {
        return Err(ambiguous(batch_nodes));
    }

    let target = batch_nodes.into_iter().next();
    debug!(commands = cmds.len(), target = ?target, "transaction routed");
    Ok(target)
}

fn ambiguous(nodes: BTreeSet<NodeId>) -> Error {
    Error::AmbiguousNode {
        nodes: nodes.iter().map(NodeId::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command;
    use crate::cluster::topology::SlotMap;

    fn two_node_map() -> SlotMap {
        let mut map = SlotMap::new();
        map.assign(0, 8191, "node-a");
        map.assign(8192, 16383, "node-b");
        map
    }

    #[test]
    fn test_empty_batch_is_node_agnostic() {
        let target = route_transaction(&[], &two_node_map()).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn test_keyless_commands_never_cause_ambiguity() {
        let cmds: Vec<_> = (0..100).map(|_| command::ping()).collect();
        let target = route_transaction(&cmds, &two_node_map()).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn test_shared_hash_tag_settles_on_one_node() {
        let cmds: Vec<_> = (0..100)
            .map(|i| command::set(format!("{{key}}{i}"), i.to_string()))
            .collect();
        let target = route_transaction(&cmds, &two_node_map()).unwrap();
        assert!(target.is_some());
    }

    #[test]
    fn test_untagged_spread_keys_are_rejected() {
        let cmds: Vec<_> = (0..100)
            .map(|i| command::set(format!("key{i}"), i.to_string()))
            .collect();
        let error = route_transaction(&cmds, &two_node_map()).unwrap_err();
        match error {
            Error::AmbiguousNode { nodes } => {
                assert_eq!(nodes, vec!["node-a".to_string(), "node-b".to_string()]);
            }
            other => panic!("expected AmbiguousNode, got {other:?}"),
        }
    }

    #[test]
    fn test_keyless_commands_mixed_with_one_keyed_command() {
        let cmds = vec![
            command::ping(),
            command::set("{user}name", "x"),
            command::ping(),
        ];
        let target = route_transaction(&cmds, &two_node_map()).unwrap();
        assert!(target.is_some());
    }

    #[test]
    fn test_multikey_command_spanning_nodes_rejected_on_its_own() {
        // Find two untagged keys living on different nodes.
        let map = two_node_map();
        let on_a = (0..).map(|i| format!("a{i}")).find(|k| {
            crate::cluster::slot::key_slot(k.as_bytes()) < 8192
        });
        let on_b = (0..).map(|i| format!("b{i}")).find(|k| {
            crate::cluster::slot::key_slot(k.as_bytes()) >= 8192
        });
        let cmd = command::mget([on_a.unwrap(), on_b.unwrap()]);

        let error = route_transaction(std::slice::from_ref(&cmd), &map).unwrap_err();
        assert!(matches!(error, Error::AmbiguousNode { .. }));
    }

    #[test]
    fn test_multikey_command_with_shared_tag_is_fine() {
        let cmd = command::mget(["{user}a", "{user}b", "{user}c"]);
        let target = route_transaction(std::slice::from_ref(&cmd), &two_node_map()).unwrap();
        assert!(target.is_some());
    }

    #[test]
    fn test_uncovered_slot_is_reported() {
        let mut map = SlotMap::new();
        map.assign(0, 0, "node-a");
        let error = route_transaction(&[command::get("some-key")], &map).unwrap_err();
        assert!(matches!(error, Error::UncoveredSlot { .. }));
    }

    #[test]
    fn test_routing_is_deterministic() {
        let cmds = vec![command::set("{order:77}total", "9")];
        let map = two_node_map();
        let first = route_transaction(&cmds, &map).unwrap();
        let second = route_transaction(&cmds, &map).unwrap();
        assert_eq!(first, second);
    }
}
