//! Transaction routing across a mocked two-node cluster.
//!
//! Run with:
//! ```bash
//! cargo test --test cluster_transactions --features cluster,test-utils
//! ```

use slotwise::testing::{CallKind, MockTransport};
use slotwise::{command, key_slot, ClusterClient, Error, NodeId, SlotMap};

const SPLIT: u16 = 8192;

/// Two-node cluster: node-a owns the lower half of the slot space,
/// node-b the upper half. Returns the client plus inspection handles.
fn two_node_cluster() -> (ClusterClient<MockTransport>, MockTransport, MockTransport) {
    let mut slots = SlotMap::new();
    slots.assign(0, SPLIT - 1, "node-a");
    slots.assign(SPLIT, 16383, "node-b");

    let a = MockTransport::new();
    let b = MockTransport::new();
    let client = ClusterClient::new(
        [
            (NodeId::new("node-a"), a.clone()),
            (NodeId::new("node-b"), b.clone()),
        ],
        slots,
    );
    (client, a, b)
}

/// The mock that owns the given key under the two-node split.
fn owner<'m>(key: &str, a: &'m MockTransport, b: &'m MockTransport) -> &'m MockTransport {
    if key_slot(key.as_bytes()) < SPLIT {
        a
    } else {
        b
    }
}

#[tokio::test]
async fn transaction_with_hash_tag_settles_on_one_node() {
    let (mut client, a, b) = two_node_cluster();

    let cmds: Vec<_> = (0..100)
        .map(|i| command::set(format!("{{key}}{i}"), i.to_string()))
        .collect();
    let replies = client.multi(cmds).await.expect("tagged batch must route");
    assert_eq!(replies.len(), 100);

    let target = owner("{key}0", &a, &b);
    let other = if std::ptr::eq(target, &a) { &b } else { &a };

    let calls = target.calls();
    assert_eq!(calls.len(), 1, "one MULTI block on the owning node");
    assert_eq!(calls[0].kind, CallKind::Multi);
    assert_eq!(calls[0].commands.len(), 100);
    assert!(
        !calls[0].retryable,
        "transactions must not silently reconnect"
    );
    assert_eq!(other.command_count(), 0, "other node must see nothing");
}

#[tokio::test]
async fn transaction_without_hash_tag_is_refused_with_zero_io() {
    let (mut client, a, b) = two_node_cluster();

    let cmds: Vec<_> = (0..100)
        .map(|i| command::set(format!("key{i}"), i.to_string()))
        .collect();
    let error = client.multi(cmds).await.unwrap_err();

    match error {
        Error::AmbiguousNode { nodes } => {
            assert_eq!(nodes, vec!["node-a".to_string(), "node-b".to_string()]);
        }
        other => panic!("expected AmbiguousNode, got {other:?}"),
    }
    assert_eq!(a.command_count(), 0, "no command may reach node-a");
    assert_eq!(b.command_count(), 0, "no command may reach node-b");
}

#[tokio::test]
async fn keyless_batch_goes_to_first_node() {
    let (mut client, a, b) = two_node_cluster();

    let replies = client
        .multi(vec![command::ping(), command::ping()])
        .await
        .unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(a.calls().len(), 1);
    assert_eq!(b.command_count(), 0);
}

#[tokio::test]
async fn route_is_pure_and_performs_no_io() {
    let (client, a, b) = two_node_cluster();

    let cmds = vec![command::set("{user}name", "x"), command::get("{user}name")];
    let target = client.route(&cmds).await.unwrap();
    assert!(target.is_some());
    assert_eq!(a.command_count() + b.command_count(), 0);
}

#[tokio::test]
async fn single_call_is_routed_by_key() {
    let (mut client, a, b) = two_node_cluster();

    client.call(command::set("{user}name", "x")).await.unwrap();
    let target = owner("{user}name", &a, &b);
    assert_eq!(target.calls().len(), 1);
    assert_eq!(target.calls()[0].kind, CallKind::Call);
}

#[tokio::test]
async fn topology_update_redirects_transactions() {
    let (mut client, a, b) = two_node_cluster();

    // Reassign the whole slot space to node-b.
    let mut slots = SlotMap::new();
    slots.assign(0, 16383, "node-b");
    client.update_topology(slots).await;

    let cmds: Vec<_> = (0..10)
        .map(|i| command::set(format!("key{i}"), i.to_string()))
        .collect();
    client
        .multi(cmds)
        .await
        .expect("single-node cluster cannot be ambiguous");

    assert_eq!(a.command_count(), 0);
    assert_eq!(b.calls().len(), 1);
    assert_eq!(b.calls()[0].commands.len(), 10);
}

#[tokio::test]
async fn transaction_errors_are_translated() {
    use slotwise::{kind, TransportError};

    let (mut client, a, b) = two_node_cluster();
    let target = owner("{k}1", &a, &b);
    target.enqueue_error(TransportError::new(kind::WRONG_TYPE, "WRONGTYPE"));

    let error = client
        .multi(vec![command::set("{k}1", "v")])
        .await
        .unwrap_err();
    assert!(matches!(error, Error::WrongType { .. }));
}
