use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{HashFileError, Result};
use crate::header::Header;
use crate::layout;
use crate::node::NodeHeader;
use crate::slot::SlotInfo;
use crate::value::NodeValue;

/// How [`HashFile::init`] should treat an existing file at the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// Use the existing file untouched if present; create and lay it out
    /// fresh otherwise. No validation is performed against an existing
    /// file's contents.
    OpenOrCreate,
    /// Delete any existing file at the path and lay out a fresh one.
    Rebuild,
}

/// A hash table persisted as a single fixed-layout file, generic over its
/// per-node payload type.
///
/// Holds one long-lived [`File`] handle for its entire lifetime rather than
/// opening and closing per operation, and caches the three-field [`Header`]
/// in memory; everything else (the slot directory and every node) is read
/// and written directly against the file on each operation.
pub struct HashFile<V> {
    file: File,
    header: Header,
    _value: PhantomData<fn() -> V>,
}

impl<V: NodeValue> HashFile<V> {
    /// Lay out a fresh hash file, or open an existing one untouched,
    /// depending on `mode`.
    ///
    /// # Errors
    /// Returns [`HashFileError::Io`] on any underlying file failure.
    pub fn init(
        path: impl AsRef<Path>,
        mode: InitMode,
        slot_cnt: u32,
        node_value_size: u32,
        header_value_size: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        if mode == InitMode::Rebuild && path.exists() {
            debug!(path = %path.display(), "rebuilding hash file, removing existing contents");
            std::fs::remove_file(path)?;
        }

        let existed = path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if existed {
            debug!(path = %path.display(), "opening existing hash file without validation");
            let header = Self::read_header_from(&mut file)?;
            return Ok(Self {
                file,
                header,
                _value: PhantomData,
            });
        }

        debug!(
            path = %path.display(),
            slot_cnt,
            node_value_size,
            header_value_size,
            "initializing fresh hash file layout"
        );
        let header = Header::new(slot_cnt, header_value_size, node_value_size);
        Self::write_fresh_layout(&mut file, header)?;
        file.flush()?;

        Ok(Self {
            file,
            header,
            _value: PhantomData,
        })
    }

    fn read_header_from(file: &mut File) -> Result<Header> {
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = [0_u8; Header::SIZE];
        file.read_exact(&mut bytes)?;
        Header::from_bytes(&bytes)
    }

    fn write_fresh_layout(file: &mut File, header: Header) -> Result<()> {
        file.seek(SeekFrom::Start(0))?;
        let mut header_bytes = [0_u8; Header::SIZE];
        header.to_bytes(&mut header_bytes);
        file.write_all(&header_bytes)?;

        for i in 0..header.slot_cnt {
            let anchor = layout::anchor_offset(
                i,
                header.slot_cnt,
                header.header_data_value_size,
                header.node_data_value_size,
            );
            let mut slot_bytes = [0_u8; SlotInfo::SIZE];
            SlotInfo::empty_at(anchor).to_bytes(&mut slot_bytes);
            file.write_all(&slot_bytes)?;
        }

        let zero_header_data = vec![0_u8; header.header_data_value_size as usize];
        file.write_all(&zero_header_data)?;

        let zero_payload = vec![0_u8; header.node_data_value_size as usize];
        for i in 0..header.slot_cnt {
            let anchor = layout::anchor_offset(
                i,
                header.slot_cnt,
                header.header_data_value_size,
                header.node_data_value_size,
            );
            let mut node_bytes = [0_u8; NodeHeader::SIZE];
            NodeHeader::virgin_anchor(anchor).to_bytes(&mut node_bytes);
            file.write_all(&node_bytes)?;
            file.write_all(&zero_payload)?;
        }

        Ok(())
    }

    #[must_use]
    pub const fn slot_cnt(&self) -> u32 {
        self.header.slot_cnt
    }

    #[must_use]
    pub const fn header(&self) -> Header {
        self.header
    }

    /// Byte offset of bucket `index`'s pre-allocated anchor node.
    #[must_use]
    pub fn anchor_offset(&self, index: u32) -> u64 {
        layout::anchor_offset(
            index,
            self.header.slot_cnt,
            self.header.header_data_value_size,
            self.header.node_data_value_size,
        )
    }

    /// Flush any buffered writes and request the OS durably persist them.
    ///
    /// # Errors
    /// Returns [`HashFileError::Io`] on failure.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// # Errors
    /// Returns [`HashFileError::InvalidBufferSize`] if `out` does not match
    /// the configured header payload width, or [`HashFileError::Io`] on I/O
    /// failure.
    pub fn get_header_data(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.header.header_data_value_size as usize {
            return Err(HashFileError::InvalidBufferSize {
                expected: self.header.header_data_value_size as usize,
                actual: out.len(),
            });
        }
        let offset = layout::header_data_offset(self.header.slot_cnt);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(out)?;
        Ok(())
    }

    /// # Errors
    /// Returns [`HashFileError::InvalidBufferSize`] if `data` does not match
    /// the configured header payload width, or [`HashFileError::Io`] on I/O
    /// failure.
    pub fn set_header_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.header.header_data_value_size as usize {
            return Err(HashFileError::InvalidBufferSize {
                expected: self.header.header_data_value_size as usize,
                actual: data.len(),
            });
        }
        let offset = layout::header_data_offset(self.header.slot_cnt);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }

    pub(crate) fn read_slot_info(&mut self, index: u32) -> Result<SlotInfo> {
        let offset = layout::slot_directory_offset() + u64::from(index) * SlotInfo::SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        let mut bytes = [0_u8; SlotInfo::SIZE];
        self.file.read_exact(&mut bytes)?;
        SlotInfo::from_bytes(&bytes)
    }

    pub(crate) fn write_slot_info(&mut self, index: u32, slot: SlotInfo) -> Result<()> {
        let offset = layout::slot_directory_offset() + u64::from(index) * SlotInfo::SIZE as u64;
        let mut bytes = [0_u8; SlotInfo::SIZE];
        slot.to_bytes(&mut bytes);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    pub(crate) fn read_node_header(&mut self, offset: u64) -> Result<NodeHeader> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut bytes = [0_u8; NodeHeader::SIZE];
        self.file.read_exact(&mut bytes)?;
        NodeHeader::from_bytes(&bytes)
    }

    pub(crate) fn write_node_header(&mut self, offset: u64, header: NodeHeader) -> Result<()> {
        let mut bytes = [0_u8; NodeHeader::SIZE];
        header.to_bytes(&mut bytes);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    pub(crate) fn read_node_value(&mut self, offset: u64) -> Result<V> {
        let mut bytes = vec![0_u8; self.header.node_data_value_size as usize];
        self.file
            .seek(SeekFrom::Start(offset + NodeHeader::SIZE as u64))?;
        self.file.read_exact(&mut bytes)?;
        V::from_bytes(&bytes)
    }

    pub(crate) fn write_node_value(&mut self, offset: u64, value: &V) -> Result<()> {
        let mut bytes = vec![0_u8; self.header.node_data_value_size as usize];
        value.to_bytes(&mut bytes);
        self.file
            .seek(SeekFrom::Start(offset + NodeHeader::SIZE as u64))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    pub(crate) fn write_node(&mut self, offset: u64, header: NodeHeader, value: &V) -> Result<()> {
        self.write_node_header(offset, header)?;
        self.write_node_value(offset, value)?;
        Ok(())
    }

    /// Append a brand-new node record with a zeroed payload, for the case
    /// where the physical list manager must extend a bucket's chain before
    /// the logical list manager has a payload ready to splice in.
    pub(crate) fn append_node_zeroed(&mut self, header: NodeHeader) -> Result<u64> {
        let offset = self.file.seek(SeekFrom::End(0))?;
        trace!(offset, "appending zeroed node at end of file");
        self.write_node_header(offset, header)?;
        let zero = vec![0_u8; self.header.node_data_value_size as usize];
        self.file
            .seek(SeekFrom::Start(offset + NodeHeader::SIZE as u64))?;
        self.file.write_all(&zero)?;
        Ok(offset)
    }

    /// Zero a node's payload in place, leaving its linkage fields untouched.
    /// Used when a node becomes a tombstone.
    pub(crate) fn zero_node_value(&mut self, offset: u64) -> Result<()> {
        let zero = vec![0_u8; self.header.node_data_value_size as usize];
        self.file
            .seek(SeekFrom::Start(offset + NodeHeader::SIZE as u64))?;
        self.file.write_all(&zero)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::MusicRecord;

    #[test]
    fn init_fresh_file_lays_out_anchors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("playlist.hash");
        let mut hash_file: HashFile<MusicRecord> =
            HashFile::init(&path, InitMode::OpenOrCreate, 4, 204, 8).expect("init");

        assert_eq!(hash_file.slot_cnt(), 4);
        for i in 0..4 {
            let anchor = hash_file.anchor_offset(i);
            let header = hash_file.read_node_header(anchor).expect("read");
            assert!(header.is_virgin(anchor));

            let slot = hash_file.read_slot_info(i).expect("read slot");
            assert!(slot.is_empty());
            assert_eq!(slot.first_logic_node_offset, anchor);
        }
    }

    #[test]
    fn reopen_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("playlist.hash");
        {
            let _hash_file: HashFile<MusicRecord> =
                HashFile::init(&path, InitMode::OpenOrCreate, 4, 204, 8).expect("init");
        }
        let before = std::fs::read(&path).expect("read file");

        {
            let _hash_file: HashFile<MusicRecord> =
                HashFile::init(&path, InitMode::OpenOrCreate, 4, 204, 8).expect("reopen");
        }
        let after = std::fs::read(&path).expect("read file again");
        assert_eq!(before, after);
    }

    #[test]
    fn rebuild_truncates_existing_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("playlist.hash");
        let mut hash_file: HashFile<MusicRecord> =
            HashFile::init(&path, InitMode::OpenOrCreate, 4, 204, 8).expect("init");
        hash_file
            .set_header_data(&[1; 8])
            .expect("set header data");
        drop(hash_file);

        let mut rebuilt: HashFile<MusicRecord> =
            HashFile::init(&path, InitMode::Rebuild, 4, 204, 8).expect("rebuild");
        let mut out = [0_u8; 8];
        rebuilt.get_header_data(&mut out).expect("get header data");
        assert_eq!(out, [0; 8]);
    }

    #[test]
    fn header_data_rejects_mismatched_buffer_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("playlist.hash");
        let mut hash_file: HashFile<MusicRecord> =
            HashFile::init(&path, InitMode::OpenOrCreate, 4, 204, 8).expect("init");

        let err = hash_file
            .set_header_data(&[0; 7])
            .expect_err("undersized buffer");
        assert!(matches!(
            err,
            HashFileError::InvalidBufferSize {
                expected: 8,
                actual: 7
            }
        ));

        let mut out = [0_u8; 9];
        let err = hash_file
            .get_header_data(&mut out)
            .expect_err("oversized buffer");
        assert!(matches!(
            err,
            HashFileError::InvalidBufferSize {
                expected: 8,
                actual: 9
            }
        ));
    }
}
