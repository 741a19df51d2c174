//! The blob type registry.
//!
//! Maps a blob type name to its version and byte-order swap routine. The
//! registry is an explicitly constructed object passed by reference to
//! whatever needs it (aggregates, loaders); its lifetime is tied to the
//! pipeline that built it, and it is populated once before any
//! (de)serialization happens.

use crate::alloc_prelude::Vec;
use crate::blob::{Blob, MAX_BLOB_TYPE_NAME_LEN};
use crate::endian::Endianness;
use crate::error::{BlobError, Result};

/// Swap routine for one blob type's payload.
pub type SwapFn = fn(&mut [u8], Endianness) -> Result<()>;

/// Registered description of one blob type.
#[derive(Debug, Clone, Copy)]
pub struct BlobTypeDesc {
    /// Wire name of the blob type.
    pub name: &'static str,
    /// Payload layout version.
    pub version: u32,
    /// In-place byte-order swap for the payload.
    pub swap: SwapFn,
}

/// Table of blob types known to one generation pipeline.
#[derive(Debug, Default)]
pub struct BlobTypeRegistry {
    entries: Vec<BlobTypeDesc>,
}

impl BlobTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a blob type.
    ///
    /// Registering the same (name, version) pair again is a no-op.
    ///
    /// # Errors
    /// - `BlobTypeNameTooLong` when the wire name exceeds 23 bytes.
    /// - `ConflictingRegistration` when the name is already registered
    ///   with a different version.
    pub fn register<T: Blob>(&mut self) -> Result<()> {
        if T::BLOB_TYPE.len() > MAX_BLOB_TYPE_NAME_LEN {
            return Err(BlobError::BlobTypeNameTooLong { name: T::BLOB_TYPE });
        }
        if let Some(existing) = self.lookup(T::BLOB_TYPE) {
            if existing.version != T::BLOB_VERSION {
                return Err(BlobError::ConflictingRegistration {
                    name: T::BLOB_TYPE,
                    existing_version: existing.version,
                    new_version: T::BLOB_VERSION,
                });
            }
            return Ok(());
        }
        self.entries.push(BlobTypeDesc {
            name: T::BLOB_TYPE,
            version: T::BLOB_VERSION,
            swap: T::swap_payload,
        });
        Ok(())
    }

    /// Look up a blob type by wire name. `None` when unregistered.
    pub fn lookup(&self, name: &str) -> Option<&BlobTypeDesc> {
        self.entries.iter().find(|desc| desc.name == name)
    }

    /// Whether a blob type is registered.
    pub fn is_registered<T: Blob>(&self) -> bool {
        self.lookup(T::BLOB_TYPE).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
