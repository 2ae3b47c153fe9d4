//! The thin public API: `add`, `delete`, slot queries, header-data
//! get/set, and `traverse`, wired together from the layout/physical/
//! logical/traverse layers below. See `SPEC_FULL.md` §4.5.

use std::path::Path;

use tracing::warn;

use crate::error::{HashFileError, Result};
use crate::file::{HashFile, InitMode};
use crate::logical::{self, Matcher};
use crate::traverse::{self, TraverseBy, Visitor};
use crate::value::NodeValue;

/// A persistent hash table over fixed-width records of type `V`.
///
/// Each operation maps a `key` to a bucket by `key % slot_cnt`, per the
/// invariant that every live node's key is congruent to its bucket index.
pub struct HashTable<V> {
    file: HashFile<V>,
}

impl<V: NodeValue> HashTable<V> {
    /// # Errors
    /// Returns [`HashFileError::Io`] on any underlying file failure.
    pub fn init(
        path: impl AsRef<Path>,
        mode: InitMode,
        slot_cnt: u32,
        node_value_size: u32,
        header_value_size: u32,
    ) -> Result<Self> {
        let file = HashFile::init(path, mode, slot_cnt, node_value_size, header_value_size)?;
        Ok(Self { file })
    }

    #[must_use]
    pub const fn slot_cnt(&self) -> u32 {
        self.file.slot_cnt()
    }

    fn bucket_of(&self, key: u32) -> u32 {
        key % self.file.slot_cnt()
    }

    /// Insert `value` under `key`, splicing it in after the predecessor
    /// matched by `predecessor_matcher` against existing live payloads in
    /// the same bucket (or at the logical tail / as the sole element if
    /// nothing matches — see `SPEC_FULL.md` §4.3).
    ///
    /// # Errors
    /// Returns [`HashFileError::Io`] on I/O failure.
    pub fn add<M: Matcher<V>>(
        &mut self,
        key: u32,
        predecessor_matcher: &M,
        value: &V,
    ) -> Result<u64> {
        let bucket = self.bucket_of(key);
        logical::insert(&mut self.file, bucket, predecessor_matcher, key, value)
    }

    /// Delete the first live node in `key`'s bucket whose payload
    /// satisfies `matcher`, scanning in logical order.
    ///
    /// # Errors
    /// Returns [`HashFileError::NotFound`] if nothing matches.
    pub fn delete<M: Matcher<V>>(&mut self, key: u32, matcher: &M) -> Result<()> {
        let bucket = self.bucket_of(key);
        match logical::find_in_logical_chain(&mut self.file, bucket, matcher)? {
            Some(offset) => logical::delete_node_at(&mut self.file, bucket, offset),
            None => {
                warn!(key, bucket, "delete found no matching record");
                Err(HashFileError::NotFound)
            }
        }
    }

    /// # Errors
    /// Returns [`HashFileError::Io`] on failure, e.g. an out-of-range index.
    pub fn get_slot_node_count(&mut self, index: u32) -> Result<u32> {
        self.file.read_slot_info(index).map(|slot| slot.node_cnt)
    }

    /// # Errors
    /// Returns [`HashFileError::Io`] on failure.
    pub fn is_slot_empty(&mut self, index: u32) -> Result<bool> {
        self.file.read_slot_info(index).map(|slot| slot.is_empty())
    }

    /// # Errors
    /// Returns [`HashFileError::InvalidBufferSize`] if `out` does not match
    /// the configured header payload width, or [`HashFileError::Io`] on I/O
    /// failure.
    pub fn get_header_data(&mut self, out: &mut [u8]) -> Result<()> {
        self.file.get_header_data(out)
    }

    /// # Errors
    /// Returns [`HashFileError::InvalidBufferSize`] if `data` does not match
    /// the configured header payload width, or [`HashFileError::Io`] on I/O
    /// failure.
    pub fn set_header_data(&mut self, data: &[u8]) -> Result<()> {
        self.file.set_header_data(data)
    }

    /// # Errors
    /// Returns [`HashFileError::Corruption`] if a tombstone is found on a
    /// logical walk, or [`HashFileError::Io`] on file failure.
    pub fn traverse(
        &mut self,
        by: TraverseBy,
        which_slot: Option<u32>,
        printable: bool,
        visitor: &mut dyn Visitor<V>,
    ) -> Result<bool> {
        traverse::traverse(&mut self.file, by, which_slot, printable, visitor)
    }

    /// # Errors
    /// Returns [`HashFileError::Io`] on failure.
    pub fn sync(&self) -> Result<()> {
        self.file.sync()
    }
}
