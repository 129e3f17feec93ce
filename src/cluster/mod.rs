//! Cluster mode: slot hashing, topology modeling, and transaction routing.
//!
//! Enable the `cluster` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! slotwise = { version = "0.3", features = ["cluster"] }
//! ```
//!
//! A transaction batch is executed on exactly one node or not at all. The
//! router decides before any network activity: keys are reduced to their
//! hash tags, tags to slots, slots to nodes, and the batch is refused with
//! [`crate::Error::AmbiguousNode`] when more than one node is targeted.

mod client;
mod router;
mod slot;
mod topology;

pub use client::ClusterClient;
pub use router::route_transaction;
pub use slot::{key_slot, SLOT_COUNT};
pub use topology::{KeyResolver, NodeId, SlotMap, SlotRange};
