use std::fmt;

use crate::error::{HashFileError, Result};

mod offsets {
    pub const SLOT_CNT: usize = 0;
    pub const HEADER_DATA_VALUE_SIZE: usize = 4;
    pub const NODE_DATA_VALUE_SIZE: usize = 8;
}

/// The hash file's prelude: the three sizing fields that govern the rest
/// of the layout. Cached in memory for the life of a [`crate::file::HashFile`]
/// once read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub slot_cnt: u32,
    pub header_data_value_size: u32,
    pub node_data_value_size: u32,
}

impl Header {
    /// Canonical on-disk width, including reserved padding.
    pub const SIZE: usize = 32;

    #[must_use]
    pub const fn new(slot_cnt: u32, header_data_value_size: u32, node_data_value_size: u32) -> Self {
        Self {
            slot_cnt,
            header_data_value_size,
            node_data_value_size,
        }
    }

    pub fn to_bytes(self, out: &mut [u8; Self::SIZE]) {
        out.fill(0);
        out[offsets::SLOT_CNT..offsets::SLOT_CNT + 4].copy_from_slice(&self.slot_cnt.to_le_bytes());
        out[offsets::HEADER_DATA_VALUE_SIZE..offsets::HEADER_DATA_VALUE_SIZE + 4]
            .copy_from_slice(&self.header_data_value_size.to_le_bytes());
        out[offsets::NODE_DATA_VALUE_SIZE..offsets::NODE_DATA_VALUE_SIZE + 4]
            .copy_from_slice(&self.node_data_value_size.to_le_bytes());
    }

    /// # Errors
    /// Returns [`HashFileError::Corruption`] if `bytes` is short.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(HashFileError::Corruption(
                "header record shorter than expected".to_owned(),
            ));
        }
        let read_u32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Ok(Self {
            slot_cnt: read_u32(offsets::SLOT_CNT),
            header_data_value_size: read_u32(offsets::HEADER_DATA_VALUE_SIZE),
            node_data_value_size: read_u32(offsets::NODE_DATA_VALUE_SIZE),
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header {{ slot_cnt: {}, header_data_value_size: {}, node_data_value_size: {} }}",
            self.slot_cnt, self.header_data_value_size, self.node_data_value_size
        )
    }
}
