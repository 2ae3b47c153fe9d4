//! A concrete payload demonstrating the shape of record the playlist
//! collaborator stores: a disposition tag plus a fixed-width path, matching
//! the original engine's `music_t` record (`action_t delete_or_not` +
//! `char path[200]`). This module does not implement playlist scanning,
//! path-to-key hashing, or any interactive behavior; those remain the
//! external collaborator's responsibility.

use crate::error::{HashFileError, Result};
use crate::value::NodeValue;

/// Width of the fixed path field, matching the original `MUSIC_PATH_LEN`.
pub const MUSIC_PATH_LEN: usize = 200;

/// Mirrors the original `action_t` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Delete,
    Keep,
    DoNothing,
}

impl Disposition {
    const fn to_u32(self) -> u32 {
        match self {
            Self::Delete => 0,
            Self::Keep => 1,
            Self::DoNothing => 2,
        }
    }

    fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Delete),
            1 => Ok(Self::Keep),
            2 => Ok(Self::DoNothing),
            other => Err(HashFileError::Corruption(format!(
                "invalid disposition tag {other}"
            ))),
        }
    }
}

/// One playlist entry: a disposition tag plus a fixed-width path.
///
/// `node_data_value_size` for a [`crate::file::HashFile<MusicRecord>`] is
/// always [`MusicRecord::SIZE`] (204 bytes: a 4-byte tag plus the 200-byte
/// path), matching the end-to-end scenarios' `node_value_size=204`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicRecord {
    pub disposition: Disposition,
    path: [u8; MUSIC_PATH_LEN],
}

impl MusicRecord {
    /// # Errors
    /// Returns an error if `path` does not fit within [`MUSIC_PATH_LEN`] bytes.
    pub fn new(disposition: Disposition, path: &str) -> Result<Self> {
        let bytes = path.as_bytes();
        if bytes.len() >= MUSIC_PATH_LEN {
            return Err(HashFileError::Corruption(format!(
                "path {} bytes long exceeds the {MUSIC_PATH_LEN}-byte field",
                bytes.len()
            )));
        }
        let mut buf = [0_u8; MUSIC_PATH_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            disposition,
            path: buf,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        let end = self.path.iter().position(|&b| b == 0).unwrap_or(self.path.len());
        std::str::from_utf8(&self.path[..end]).unwrap_or("")
    }
}

impl NodeValue for MusicRecord {
    const SIZE: usize = 4 + MUSIC_PATH_LEN;

    fn to_bytes(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.disposition.to_u32().to_le_bytes());
        out[4..4 + MUSIC_PATH_LEN].copy_from_slice(&self.path);
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(HashFileError::Corruption(
                "music record shorter than expected".to_owned(),
            ));
        }
        let tag = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let disposition = Disposition::from_u32(tag)?;
        let mut path = [0_u8; MUSIC_PATH_LEN];
        path.copy_from_slice(&bytes[4..4 + MUSIC_PATH_LEN]);
        Ok(Self { disposition, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bytes() {
        let record = MusicRecord::new(Disposition::Keep, "library/song.mp3").expect("new");
        let mut bytes = vec![0_u8; MusicRecord::SIZE];
        record.to_bytes(&mut bytes);
        let decoded = MusicRecord::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, record);
        assert_eq!(decoded.path(), "library/song.mp3");
    }

    #[test]
    fn rejects_oversized_path() {
        let too_long = "a".repeat(MUSIC_PATH_LEN);
        assert!(MusicRecord::new(Disposition::Keep, &too_long).is_err());
    }
}
