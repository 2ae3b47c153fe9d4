//! Logical list manager: threads live nodes of a bucket into the
//! user-visible circular doubly-linked list, and splices nodes in and out
//! on insert/delete. See `SPEC_FULL.md` §4.3.

use tracing::trace;

use crate::error::Result;
use crate::file::HashFile;
use crate::physical::acquire_node_slot;
use crate::value::NodeValue;

/// A predicate against a live node's payload, used both to find an
/// insert's predecessor and to locate the record a delete targets.
///
/// Blanket-implemented for `Fn(&V) -> bool` closures so callers rarely
/// need to name a concrete type.
pub trait Matcher<V> {
    fn matches(&self, candidate: &V) -> bool;
}

impl<V, F> Matcher<V> for F
where
    F: Fn(&V) -> bool,
{
    fn matches(&self, candidate: &V) -> bool {
        self(candidate)
    }
}

/// Matches nothing; used when an insert has no predecessor to search for.
pub struct NoPredecessor;

impl<V> Matcher<V> for NoPredecessor {
    fn matches(&self, _candidate: &V) -> bool {
        false
    }
}

/// Scan the physical chain of `bucket` for the first live node whose
/// payload satisfies `matcher`. Tombstones are skipped; the first physical
/// match wins when several would satisfy the predicate.
pub(crate) fn find_predecessor<V: NodeValue, M: Matcher<V>>(
    file: &mut HashFile<V>,
    bucket: u32,
    matcher: &M,
) -> Result<Option<u64>> {
    let anchor = file.anchor_offset(bucket);
    let mut current = anchor;
    loop {
        let header = file.read_node_header(current)?;
        if header.used {
            let value = file.read_node_value(current)?;
            if matcher.matches(&value) {
                return Ok(Some(current));
            }
        }
        let next = header.physic_next;
        if next == anchor {
            return Ok(None);
        }
        current = next;
    }
}

/// Scan the logical chain of `bucket` for the first live node whose
/// payload satisfies `matcher`.
pub(crate) fn find_in_logical_chain<V: NodeValue, M: Matcher<V>>(
    file: &mut HashFile<V>,
    bucket: u32,
    matcher: &M,
) -> Result<Option<u64>> {
    let slot = file.read_slot_info(bucket)?;
    if slot.is_empty() {
        return Ok(None);
    }
    let start = slot.first_logic_node_offset;
    let mut current = start;
    loop {
        let header = file.read_node_header(current)?;
        let value = file.read_node_value(current)?;
        if matcher.matches(&value) {
            return Ok(Some(current));
        }
        current = header.logic_next;
        if current == start {
            return Ok(None);
        }
    }
}

/// Insert `value` under `key` into `bucket`, splicing it in after the
/// predecessor located by `matcher` (or at the logical tail if no
/// predecessor matches and the bucket is non-empty, or as the sole element
/// if the bucket is empty). Returns the offset of the inserted node.
pub(crate) fn insert<V: NodeValue, M: Matcher<V>>(
    file: &mut HashFile<V>,
    bucket: u32,
    matcher: &M,
    key: u32,
    value: &V,
) -> Result<u64> {
    let predecessor = find_predecessor(file, bucket, matcher)?;
    let new_offset = acquire_node_slot(file, bucket)?;
    let mut slot = file.read_slot_info(bucket)?;

    let mut new_header = file.read_node_header(new_offset)?;
    new_header.used = true;
    new_header.key = key;

    if slot.is_empty() {
        new_header.logic_prev = new_offset;
        new_header.logic_next = new_offset;
        file.write_node(new_offset, new_header, value)?;

        slot.node_cnt = 1;
        slot.first_logic_node_offset = new_offset;
        file.write_slot_info(bucket, slot)?;
        trace!(bucket, offset = new_offset, "inserted sole element");
        return Ok(new_offset);
    }

    let predecessor_offset = match predecessor {
        Some(offset) => offset,
        None => {
            let first = file.read_node_header(slot.first_logic_node_offset)?;
            first.logic_prev
        }
    };

    let mut predecessor_header = file.read_node_header(predecessor_offset)?;
    let successor_offset = predecessor_header.logic_next;

    if predecessor_offset == successor_offset {
        predecessor_header.logic_next = new_offset;
        predecessor_header.logic_prev = new_offset;
        new_header.logic_prev = predecessor_offset;
        new_header.logic_next = predecessor_offset;
        file.write_node_header(predecessor_offset, predecessor_header)?;
    } else {
        predecessor_header.logic_next = new_offset;
        let mut successor_header = file.read_node_header(successor_offset)?;
        successor_header.logic_prev = new_offset;
        new_header.logic_prev = predecessor_offset;
        new_header.logic_next = successor_offset;
        file.write_node_header(predecessor_offset, predecessor_header)?;
        file.write_node_header(successor_offset, successor_header)?;
    }

    file.write_node(new_offset, new_header, value)?;

    slot.node_cnt += 1;
    file.write_slot_info(bucket, slot)?;
    trace!(bucket, offset = new_offset, predecessor_offset, "inserted node");
    Ok(new_offset)
}

/// Remove the node at `doomed_offset` from `bucket`'s logical chain,
/// turning it into a tombstone. The physical chain is left untouched.
pub(crate) fn delete_node_at<V: NodeValue>(
    file: &mut HashFile<V>,
    bucket: u32,
    doomed_offset: u64,
) -> Result<()> {
    let mut slot = file.read_slot_info(bucket)?;
    let doomed = file.read_node_header(doomed_offset)?;
    let predecessor_offset = doomed.logic_prev;
    let successor_offset = doomed.logic_next;
    let anchor = file.anchor_offset(bucket);

    if predecessor_offset == doomed_offset && successor_offset == doomed_offset {
        let mut doomed_after = doomed;
        doomed_after.used = false;
        doomed_after.key = 0;
        doomed_after.logic_prev = doomed_offset;
        doomed_after.logic_next = doomed_offset;
        file.write_node_header(doomed_offset, doomed_after)?;
        file.zero_node_value(doomed_offset)?;

        if doomed_offset != anchor {
            let mut anchor_header = file.read_node_header(anchor)?;
            anchor_header.logic_prev = anchor;
            anchor_header.logic_next = anchor;
            file.write_node_header(anchor, anchor_header)?;
        }

        slot.node_cnt = 0;
        slot.first_logic_node_offset = anchor;
        file.write_slot_info(bucket, slot)?;
        trace!(bucket, offset = doomed_offset, "deleted sole element, bucket empty");
        return Ok(());
    }

    if slot.first_logic_node_offset == doomed_offset {
        slot.first_logic_node_offset = successor_offset;
    }

    if predecessor_offset == successor_offset {
        let mut predecessor_header = file.read_node_header(predecessor_offset)?;
        predecessor_header.logic_prev = predecessor_offset;
        predecessor_header.logic_next = predecessor_offset;
        file.write_node_header(predecessor_offset, predecessor_header)?;
    } else {
        let mut predecessor_header = file.read_node_header(predecessor_offset)?;
        predecessor_header.logic_next = successor_offset;
        file.write_node_header(predecessor_offset, predecessor_header)?;

        let mut successor_header = file.read_node_header(successor_offset)?;
        successor_header.logic_prev = predecessor_offset;
        file.write_node_header(successor_offset, successor_header)?;
    }

    let mut doomed_after = file.read_node_header(doomed_offset)?;
    doomed_after.used = false;
    doomed_after.key = 0;
    file.write_node_header(doomed_offset, doomed_after)?;
    file.zero_node_value(doomed_offset)?;

    slot.node_cnt -= 1;
    file.write_slot_info(bucket, slot)?;
    trace!(bucket, offset = doomed_offset, "deleted node");
    Ok(())
}
