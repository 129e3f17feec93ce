//! Key-to-slot mapping.
//!
//! The key space is partitioned into 16384 slots; ownership of a slot
//! assigns a key to a node. Slot assignment hashes the key's hash tag with
//! CRC16, so keys sharing a tag are guaranteed to land on the same node.

use crc::{Crc, CRC_16_IBM_SDLC};

/// Number of hash slots in the cluster key space.
pub const SLOT_COUNT: u16 = 16384;

/// CRC-16/XMODEM, the checksum the cluster protocol specifies.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Calculates the slot for a key.
///
/// If the key contains a hash tag (`{...}`), only the tag content is
/// hashed.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "cluster")]
/// # {
/// use slotwise::key_slot;
///
/// assert_eq!(key_slot(b"{user1000}.following"), key_slot(b"{user1000}.followers"));
/// # }
/// ```
pub fn key_slot(key: &[u8]) -> u16 {
    tag_slot(hash_tag(key))
}

/// Calculates the slot for an already-extracted hash tag.
pub(crate) fn tag_slot(tag: &[u8]) -> u16 {
    CRC16.checksum(tag) % SLOT_COUNT
}

/// Extracts the hash tag from a key.
///
/// The tag is the content between the first `{` and the next `}`. Keys
/// without braces, with an unmatched brace, or with an empty tag (`{}`)
/// have no tag; the whole key is used. Only the first matched pair counts;
/// nesting is not interpreted.
pub(crate) fn hash_tag(key: &[u8]) -> &[u8] {
    if let Some(open) = key.iter().position(|&b| b == b'{') {
        if let Some(len) = key[open + 1..].iter().position(|&b| b == b'}') {
            if len > 0 {
                return &key[open + 1..open + 1 + len];
            }
        }
    }
    key
}
