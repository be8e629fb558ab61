//! Row encoding
//!
//! Rows are held as MessagePack blobs with named fields, so a row written
//! by one build decodes in another even if struct field order changes.
//! Codec failures mean the stored bytes are unusable; they surface as
//! `StoreUnavailable`.

use docfield_core::{Error, Record, Result};

/// Encoded row with the version it was written at
///
/// The version is kept outside the blob so the optimistic check does not
/// need to decode.
#[derive(Debug, Clone)]
pub struct StoredRow {
    /// Version of the encoded row
    pub version: u64,
    /// MessagePack bytes
    pub bytes: Vec<u8>,
}

impl StoredRow {
    /// Encode `row` at its current version
    pub fn encode<R: Record>(row: &R) -> Result<Self> {
        let bytes = rmp_serde::to_vec_named(row).map_err(|e| {
            Error::unavailable(format!("failed to encode {} {}: {e}", R::KIND, row.id()))
        })?;
        Ok(StoredRow {
            version: row.version(),
            bytes,
        })
    }

    /// Decode back into a row
    pub fn decode<R: Record>(&self) -> Result<R> {
        rmp_serde::from_slice(&self.bytes)
            .map_err(|e| Error::unavailable(format!("failed to decode {} row: {e}", R::KIND)))
    }
}
