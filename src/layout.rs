//! Byte-offset arithmetic for the on-disk layout:
//!
//! `Header ‖ SlotInfo[slot_cnt] ‖ HeaderData ‖ (NodeHeader ‖ payload)[slot_cnt]`
//!
//! followed by appended `(NodeHeader ‖ payload)` records at end of file.

use crate::header::Header;
use crate::node::NodeHeader;
use crate::slot::SlotInfo;

/// Byte size of one on-disk record: the fixed node header plus its payload.
#[must_use]
pub const fn node_record_size(node_value_size: usize) -> usize {
    NodeHeader::SIZE + node_value_size
}

/// Offset of the `SlotInfo` directory, immediately after the file `Header`.
#[must_use]
pub const fn slot_directory_offset() -> u64 {
    Header::SIZE as u64
}

/// Offset of the `HeaderData` payload region.
#[must_use]
pub const fn header_data_offset(slot_cnt: u32) -> u64 {
    slot_directory_offset() + (slot_cnt as u64) * (SlotInfo::SIZE as u64)
}

/// Offset of the first pre-allocated node record (bucket 0's anchor).
#[must_use]
pub const fn nodes_base_offset(slot_cnt: u32, header_value_size: u32) -> u64 {
    header_data_offset(slot_cnt) + header_value_size as u64
}

/// Offset immediately past the last pre-allocated bucket anchor; this is
/// where the first appended node lands.
#[must_use]
pub const fn eof_floor(slot_cnt: u32, header_value_size: u32, node_value_size: u32) -> u64 {
    nodes_base_offset(slot_cnt, header_value_size)
        + (slot_cnt as u64) * (node_record_size(node_value_size as usize) as u64)
}

/// Anchor offset of bucket `index` (the bucket's pre-allocated node).
///
/// `index` must be `< slot_cnt`; this is a precondition, not checked here.
#[must_use]
pub const fn anchor_offset(
    index: u32,
    slot_cnt: u32,
    header_value_size: u32,
    node_value_size: u32,
) -> u64 {
    nodes_base_offset(slot_cnt, header_value_size)
        + (index as u64) * (node_record_size(node_value_size as usize) as u64)
}
