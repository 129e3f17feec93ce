//! Cluster client with single-node transaction scoping.

use tokio::sync::RwLock;

use super::router::route_transaction;
use super::topology::{NodeId, SlotMap};
use crate::core::command::Cmd;
use crate::core::Client;
use crate::error::{Error, Result};
use crate::transport::{Reply, Transport};

/// A client spanning every node of a cluster.
///
/// Holds one guarded [`Client`] per node and the current slot map. Single
/// commands are routed by their key's slot; transactions are routed as a
/// whole batch and refused with [`Error::AmbiguousNode`] before any I/O
/// when their commands do not settle on one node.
#[derive(Debug)]
pub struct ClusterClient<T> {
    nodes: Vec<(NodeId, Client<T>)>,
    topology: RwLock<SlotMap>,
}

impl<T: Transport> ClusterClient<T> {
    /// Creates a cluster client from per-node transports and a slot map.
    ///
    /// The slot map comes from whatever topology discovery the transport
    /// side performs; it can be refreshed later with
    /// [`ClusterClient::update_topology`].
    pub fn new<I>(transports: I, slots: SlotMap) -> Self
    where
        I: IntoIterator<Item = (NodeId, T)>,
    {
        Self {
            nodes: transports
                .into_iter()
                .map(|(id, transport)| (id, Client::new(transport)))
                .collect(),
            topology: RwLock::new(slots),
        }
    }

    /// Replaces the slot map after a topology change.
    pub async fn update_topology(&self, slots: SlotMap) {
        let mut topology = self.topology.write().await;
        *topology = slots;
    }

    /// Number of known nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolves the target node of a batch without executing anything.
    pub async fn route(&self, cmds: &[Cmd]) -> Result<Option<NodeId>> {
        let topology = self.topology.read().await;
        route_transaction(cmds, &*topology)
    }

    /// Sends one command to the node owning its key.
    ///
    /// Keyless commands go to the first node.
    pub async fn call(&mut self, cmd: Cmd) -> Result<Reply> {
        let target = self.route(std::slice::from_ref(&cmd)).await?;
        self.client_for(target)?.call(cmd).await
    }

    /// Executes a batch of commands as one transaction on a single node.
    ///
    /// Routing happens first and performs no I/O: if the batch is
    /// ambiguous, no command is ever sent. A batch with no keyed commands
    /// is valid and goes to the first node. The transaction itself runs
    /// with reconnection disabled on the node's guarded client.
    pub async fn multi(&mut self, cmds: Vec<Cmd>) -> Result<Vec<Reply>> {
        let target = self.route(&cmds).await?;
        self.client_for(target)?.multi(cmds).await
    }

    /// The guarded client for a specific node.
    pub fn node_client(&mut self, node: &NodeId) -> Option<&mut Client<T>> {
        self.nodes
            .iter_mut()
            .find(|(id, _)| id == node)
            .map(|(_, client)| client)
    }

    /// Closes every node connection.
    pub async fn close(&mut self) {
        for (_, client) in &mut self.nodes {
            client.close().await;
        }
    }

    fn client_for(&mut self, target: Option<NodeId>) -> Result<&mut Client<T>> {
        match target {
            Some(node) => {
                self.node_client(&node).ok_or_else(|| Error::InvalidArgument {
                    message: format!("no connection for node {node}"),
                })
            }
            None => self
                .nodes
                .first_mut()
                .map(|(_, client)| client)
                .ok_or_else(|| Error::InvalidArgument {
                    message: "cluster client has no nodes".to_string(),
                }),
        }
    }
}
