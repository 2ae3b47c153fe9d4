//! A persistent, file-backed hash table engine.
//!
//! Each hash bucket threads its nodes through two interwoven circular
//! doubly-linked lists: a **physical** list (allocation order, used to
//! recycle tombstoned nodes or extend the file) and a **logical** list
//! (the order a caller sees when iterating). See `SPEC_FULL.md` for the
//! full design.
//!
//! ```ignore
//! use hashfile::engine::HashTable;
//! use hashfile::file::InitMode;
//! use hashfile::logical::NoPredecessor;
//! use hashfile::playlist::{Disposition, MusicRecord};
//!
//! let mut table: HashTable<MusicRecord> =
//!     HashTable::init("playlist.hash", InitMode::OpenOrCreate, 256, 204, 8)?;
//! let song = MusicRecord::new(Disposition::Keep, "library/song.mp3")?;
//! table.add(42, &NoPredecessor, &song)?;
//! # Ok::<(), hashfile::error::HashFileError>(())
//! ```

pub mod engine;
pub mod error;
pub mod file;
pub mod header;
pub mod layout;
pub mod logical;
pub mod node;
pub mod physical;
pub mod playlist;
pub mod slot;
pub mod traverse;
pub mod value;
