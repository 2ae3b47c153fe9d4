//! The traverser: walks one bucket's physical or logical chain, or every
//! bucket in index order, invoking a caller-supplied visitor per live node.
//! See `SPEC_FULL.md` §4.4.

use tracing::trace;

use crate::error::{HashFileError, Result};
use crate::file::HashFile;
use crate::logical::delete_node_at;
use crate::value::NodeValue;

/// Which linkage to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseBy {
    /// The user-visible order, following `logic_next` pointers.
    Logical,
    /// Allocation order, following `physic_next` pointers. Visits
    /// tombstones only to skip them, never handing one to the visitor.
    Physical,
}

/// What a [`Visitor`] asks the traverser to do with the node it just saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    /// Leave the node as-is.
    DoNothing,
    /// Persist the (possibly mutated) payload the visitor was given.
    Update,
    /// Splice the node out of its bucket's logical chain, turning it into
    /// a tombstone.
    Delete,
    /// Stop the entire traversal immediately after this node.
    Break,
}

/// A callback interface for [`traverse`], replacing the source engine's
/// function-pointer visitor with a capability the compiler can check.
pub trait Visitor<V> {
    fn visit(&mut self, key: u32, value: &mut V) -> VisitAction;
}

impl<V, F> Visitor<V> for F
where
    F: FnMut(u32, &mut V) -> VisitAction,
{
    fn visit(&mut self, key: u32, value: &mut V) -> VisitAction {
        self(key, value)
    }
}

/// Walk `by` over `which_slot` (or every bucket, if `None` or out of
/// range), invoking `visitor` on each live node. Returns `true` if the
/// walk was stopped early by [`VisitAction::Break`].
///
/// `printable` controls whether skipped tombstones are logged during a
/// [`TraverseBy::Physical`] walk; it has no effect on a `Logical` walk,
/// where a tombstone can never legitimately appear (see
/// [`HashFileError::Corruption`]).
pub fn traverse<V: NodeValue>(
    file: &mut HashFile<V>,
    by: TraverseBy,
    which_slot: Option<u32>,
    printable: bool,
    visitor: &mut dyn Visitor<V>,
) -> Result<bool> {
    let slot_cnt = file.slot_cnt();
    let range: Box<dyn Iterator<Item = u32>> = match which_slot {
        Some(index) if index < slot_cnt => Box::new(std::iter::once(index)),
        _ => Box::new(0..slot_cnt),
    };

    for bucket in range {
        let broke = match by {
            TraverseBy::Logical => traverse_bucket_logical(file, bucket, visitor)?,
            TraverseBy::Physical => traverse_bucket_physical(file, bucket, printable, visitor)?,
        };
        if broke {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Walks by counting down from the bucket's `node_cnt` captured once at
/// the start of the walk, rather than comparing against a remembered
/// "first" offset. A delete can retarget `first_logic_node_offset`
/// mid-walk, which would make an offset-equality stop condition either
/// loop forever or stop one node early; counting down a decreasing
/// budget of not-yet-visited live nodes sidesteps that entirely, since
/// every delete still leaves exactly one fewer live node to visit.
fn traverse_bucket_logical<V: NodeValue>(
    file: &mut HashFile<V>,
    bucket: u32,
    visitor: &mut dyn Visitor<V>,
) -> Result<bool> {
    let slot = file.read_slot_info(bucket)?;
    if slot.is_empty() {
        return Ok(false);
    }

    let mut current = slot.first_logic_node_offset;
    let mut remaining = slot.node_cnt;

    while remaining > 0 {
        let header = file.read_node_header(current)?;
        if !header.used {
            return Err(HashFileError::Corruption(format!(
                "tombstone at offset {current} encountered during logical walk of bucket {bucket}"
            )));
        }
        let mut value = file.read_node_value(current)?;
        let action = visitor.visit(header.key, &mut value);
        let next = header.logic_next;
        remaining -= 1;

        match action {
            VisitAction::Update => file.write_node(current, header, &value)?,
            VisitAction::Delete => delete_node_at(file, bucket, current)?,
            VisitAction::Break => return Ok(true),
            VisitAction::DoNothing => {}
        }
        current = next;
    }
    Ok(false)
}

fn traverse_bucket_physical<V: NodeValue>(
    file: &mut HashFile<V>,
    bucket: u32,
    printable: bool,
    visitor: &mut dyn Visitor<V>,
) -> Result<bool> {
    let anchor = file.anchor_offset(bucket);
    let mut current = anchor;

    loop {
        let header = file.read_node_header(current)?;
        if header.used {
            let mut value = file.read_node_value(current)?;
            let action = visitor.visit(header.key, &mut value);
            match action {
                VisitAction::Update => file.write_node(current, header, &value)?,
                VisitAction::Delete => delete_node_at(file, bucket, current)?,
                VisitAction::Break => return Ok(true),
                VisitAction::DoNothing => {}
            }
        } else if printable {
            trace!(bucket, offset = current, "skipping tombstone during physical walk");
        }

        let next = header.physic_next;
        if next == anchor {
            break;
        }
        current = next;
    }
    Ok(false)
}
