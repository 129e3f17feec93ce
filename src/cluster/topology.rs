//! Cluster topology: nodes, slot ranges, and key resolution.
//!
//! Topology discovery itself (querying the cluster for its slot layout) is
//! the transport side's concern; this module only models the resulting
//! slot-to-node assignment and exposes it through the [`KeyResolver`]
//! trait the transaction router consumes.

use bytes::Bytes;

use super::slot;
use crate::core::command::Cmd;

/// Identifier of a node in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contiguous range of slots owned by one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRange {
    /// First slot of the range, inclusive.
    pub start: u16,
    /// Last slot of the range, inclusive.
    pub end: u16,
    /// Node owning the range.
    pub node: NodeId,
}

impl SlotRange {
    /// Whether the given slot falls inside this range.
    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }
}

/// Slot-to-node assignment for the whole cluster.
#[derive(Debug, Clone, Default)]
pub struct SlotMap {
    ranges: Vec<SlotRange>,
}

impl SlotMap {
    /// Creates an empty slot map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a slot range to a node.
    pub fn assign(&mut self, start: u16, end: u16, node: impl Into<NodeId>) {
        self.ranges.push(SlotRange {
            start,
            end,
            node: node.into(),
        });
    }

    /// The node owning a slot, if any range covers it.
    pub fn node_for_slot(&self, slot: u16) -> Option<&NodeId> {
        self.ranges
            .iter()
            .find(|range| range.contains(slot))
            .map(|range| &range.node)
    }

    /// Distinct nodes in assignment order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = Vec::new();
        for range in &self.ranges {
            if !nodes.contains(&range.node) {
                nodes.push(range.node.clone());
            }
        }
        nodes
    }

    /// The assigned slot ranges.
    pub fn ranges(&self) -> &[SlotRange] {
        &self.ranges
    }

    /// Whether every slot from 0 to 16383 is assigned.
    pub fn is_fully_covered(&self) -> bool {
        let mut covered = vec![false; slot::SLOT_COUNT as usize];
        for range in &self.ranges {
            for s in range.start..=range.end {
                covered[s as usize] = true;
            }
        }
        covered.iter().all(|&c| c)
    }
}

/// Resolves commands to keys, tags to slots, and slots to nodes.
///
/// The transaction router is generic over this trait so routing decisions
/// can be tested without any topology machinery behind them.
pub trait KeyResolver {
    /// The keys a command touches; empty for node-agnostic commands.
    fn keys_of(&self, cmd: &Cmd) -> Vec<Bytes>;

    /// The slot a hash tag maps to.
    fn slot_for_tag(&self, tag: &[u8]) -> u16;

    /// The node assigned to a slot, if covered.
    fn node_for_slot(&self, slot: u16) -> Option<NodeId>;
}

impl KeyResolver for SlotMap {
    fn keys_of(&self, cmd: &Cmd) -> Vec<Bytes> {
        cmd.keys()
    }

    fn slot_for_tag(&self, tag: &[u8]) -> u16 {
        slot::tag_slot(tag)
    }

    fn node_for_slot(&self, slot: u16) -> Option<NodeId> {
        SlotMap::node_for_slot(self, slot).cloned()
    }
}
