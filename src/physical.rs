//! Physical list manager: finds a reusable node for a bucket, or extends
//! the bucket's physical chain by appending a fresh node at end of file.
//!
//! See `SPEC_FULL.md` §4.2 for the recyclable-slot discovery table and the
//! append-splice ordering this module follows exactly.

use tracing::trace;

use crate::error::Result;
use crate::file::HashFile;
use crate::node::NodeHeader;
use crate::value::NodeValue;

/// Locate a node to hold a new record in `bucket`: a tombstone, the
/// bucket's still-virgin anchor, or (failing both) a freshly appended node
/// at end of file.
///
/// Returns the offset of the acquired node. Its on-disk header is left
/// with `used = false`; physical linkage is already consistent (for an
/// appended node, the splice described in §4.2 has already been applied).
/// The caller (the logical list manager) is responsible for setting
/// `used`, `key`, the logical pointers, and the payload.
pub(crate) fn acquire_node_slot<V: NodeValue>(
    file: &mut HashFile<V>,
    bucket: u32,
) -> Result<u64> {
    let anchor = file.anchor_offset(bucket);
    let mut current = anchor;

    loop {
        let header = file.read_node_header(current)?;
        if !header.used {
            trace!(bucket, offset = current, "recycling physical slot");
            return Ok(current);
        }
        if header.physic_next == anchor {
            return append_after_tail(file, bucket, anchor, current, header);
        }
        current = header.physic_next;
    }
}

fn append_after_tail<V: NodeValue>(
    file: &mut HashFile<V>,
    bucket: u32,
    anchor: u64,
    tail_offset: u64,
    mut tail_header: NodeHeader,
) -> Result<u64> {
    let new_header = NodeHeader {
        used: false,
        physic_prev: tail_offset,
        physic_next: anchor,
        logic_prev: anchor,
        logic_next: anchor,
        key: 0,
    };
    let new_offset = file.append_node_zeroed(new_header)?;
    trace!(bucket, offset = new_offset, "appended new physical node");

    tail_header.physic_next = new_offset;
    file.write_node_header(tail_offset, tail_header)?;

    let mut anchor_header = file.read_node_header(anchor)?;
    anchor_header.physic_prev = new_offset;
    file.write_node_header(anchor, anchor_header)?;

    Ok(new_offset)
}
