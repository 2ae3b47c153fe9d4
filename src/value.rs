use crate::error::Result;

/// A fixed-width node payload stored alongside the hash table's own
/// linkage fields.
///
/// Every payload for a given [`crate::file::HashFile`] must serialize to
/// exactly `SIZE` bytes; this replaces the source engine's untyped
/// payload pointer with a type the compiler can check.
pub trait NodeValue: Sized {
    /// On-disk width of the serialized payload, in bytes.
    const SIZE: usize;

    /// Serialize `self` into `out`, which is exactly `Self::SIZE` bytes long.
    fn to_bytes(&self, out: &mut [u8]);

    /// Deserialize from `bytes`, which is exactly `Self::SIZE` bytes long.
    ///
    /// # Errors
    /// Returns an error if `bytes` does not encode a valid value.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}
