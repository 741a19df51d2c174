//! Multi-blob aggregate files.
//!
//! An aggregate persists any number of blobs to a single file. The layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ FILE HEADER (20 bytes)                                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  0-11:  Magic "PathDataAgg\0" (12 bytes)                    │
//! │ 12-15:  endianness marker, 1 written in the file's order    │
//! │ 16-19:  blob count (file order)                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │ For each blob:                                              │
//! │   BLOB HEADER (32 bytes)                                    │
//! │     0-23:  type name, NUL-padded                            │
//! │    24-27:  version (file order)                             │
//! │    28-31:  payload size in bytes (file order)               │
//! │   PAYLOAD (`size` bytes, zero-padded to a 4-byte boundary)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! In memory, payloads always use the host byte order; conversion happens
//! at the file boundary using the swap routine registered for each blob
//! type. Loading a file that contains an unregistered blob type fails;
//! there is no "skip unknown blobs" mode.

#[cfg(feature = "std")]
use std::io::{Read, Write};

use crate::alloc_prelude::{String, ToString, Vec};
use crate::blob::{Blob, PayloadReader, PayloadWriter};
use crate::endian::Endianness;
use crate::error::{BlobError, Result};
use crate::registry::BlobTypeRegistry;

/// Magic bytes opening an aggregate file.
pub const AGGREGATE_MAGIC: [u8; 12] = *b"PathDataAgg\0";

/// File header size in bytes.
pub const FILE_HEADER_SIZE: usize = 20;

/// Per-blob header size in bytes.
pub const BLOB_HEADER_SIZE: usize = 32;

/// One blob held by an aggregate: its wire identity plus its payload in
/// host byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDesc {
    name: String,
    version: u32,
    payload: Vec<u8>,
}

impl BlobDesc {
    /// The blob's wire type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The blob's layout version.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The payload bytes (host byte order).
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether this desc holds a blob of type `T`.
    #[inline]
    pub fn is_a<T: Blob>(&self) -> bool {
        self.name == T::BLOB_TYPE
    }
}

/// An ordered collection of blobs bound to a blob type registry.
///
/// The registry reference must outlive the aggregate; every type added or
/// loaded must be registered in it.
#[derive(Debug)]
pub struct BlobAggregate<'r> {
    registry: &'r BlobTypeRegistry,
    descs: Vec<BlobDesc>,
}

impl<'r> BlobAggregate<'r> {
    /// Create an empty aggregate bound to a registry.
    pub fn new(registry: &'r BlobTypeRegistry) -> Self {
        Self {
            registry,
            descs: Vec::new(),
        }
    }

    /// The registry this aggregate validates against.
    #[inline]
    pub fn registry(&self) -> &'r BlobTypeRegistry {
        self.registry
    }

    /// Serialize a blob and append it.
    ///
    /// # Errors
    /// `UnregisteredBlobType` when `T` was never registered.
    pub fn add_blob<T: Blob>(&mut self, blob: &T) -> Result<()> {
        if !self.registry.is_registered::<T>() {
            return Err(BlobError::UnregisteredBlobType {
                name: T::BLOB_TYPE.to_string(),
            });
        }
        let mut payload = Vec::new();
        let mut writer = PayloadWriter::new(&mut payload, Endianness::host());
        blob.write_payload(&mut writer)?;
        self.descs.push(BlobDesc {
            name: String::from(T::BLOB_TYPE),
            version: T::BLOB_VERSION,
            payload,
        });
        Ok(())
    }

    /// Number of blobs held.
    #[inline]
    pub fn blob_count(&self) -> usize {
        self.descs.len()
    }

    /// The blob descriptions, in insertion/file order.
    #[inline]
    pub fn descs(&self) -> &[BlobDesc] {
        &self.descs
    }

    /// Decode every blob of type `T`, in order.
    ///
    /// # Errors
    /// - `UnregisteredBlobType` when `T` was never registered, even if the
    ///   aggregate holds no blob of that type.
    /// - `VersionMismatch` when a stored blob's version differs from
    ///   `T::BLOB_VERSION`.
    /// - Any payload decoding error, including trailing unread bytes.
    pub fn decode_all<T: Blob>(&self) -> Result<Vec<T>> {
        if !self.registry.is_registered::<T>() {
            return Err(BlobError::UnregisteredBlobType {
                name: T::BLOB_TYPE.to_string(),
            });
        }
        let mut blobs = Vec::new();
        for desc in self.descs.iter().filter(|d| d.is_a::<T>()) {
            if desc.version != T::BLOB_VERSION {
                return Err(BlobError::VersionMismatch {
                    name: desc.name.clone(),
                    expected: T::BLOB_VERSION,
                    got: desc.version,
                });
            }
            let mut reader = PayloadReader::new(&desc.payload, Endianness::host());
            let blob = T::read_payload(&mut reader)?;
            if reader.remaining() != 0 {
                return Err(BlobError::InvalidFormat {
                    message: "payload has trailing bytes after decode",
                });
            }
            blobs.push(blob);
        }
        Ok(blobs)
    }

    /// Total size of the serialized aggregate in bytes.
    pub fn compute_byte_size(&self) -> usize {
        let mut size = FILE_HEADER_SIZE;
        for desc in &self.descs {
            size += BLOB_HEADER_SIZE + padded_len(desc.payload.len());
        }
        size
    }

    /// Write the aggregate in the given byte order.
    #[cfg(feature = "std")]
    pub fn save<W: Write>(&self, writer: &mut W, endianness: Endianness) -> Result<()> {
        writer.write_all(&AGGREGATE_MAGIC)?;
        writer.write_all(&endianness.u32_to_bytes(1))?;
        writer.write_all(&endianness.u32_to_bytes(self.descs.len() as u32))?;

        for desc in &self.descs {
            let swap = self
                .registry
                .lookup(&desc.name)
                .ok_or_else(|| BlobError::UnregisteredBlobType {
                    name: desc.name.clone(),
                })?
                .swap;

            let mut name_field = [0u8; 24];
            name_field[..desc.name.len()].copy_from_slice(desc.name.as_bytes());
            writer.write_all(&name_field)?;
            writer.write_all(&endianness.u32_to_bytes(desc.version))?;
            writer.write_all(&endianness.u32_to_bytes(desc.payload.len() as u32))?;

            if endianness == Endianness::host() {
                writer.write_all(&desc.payload)?;
            } else {
                let mut swapped = desc.payload.clone();
                swap(&mut swapped, Endianness::host())?;
                writer.write_all(&swapped)?;
            }
            let padding = padded_len(desc.payload.len()) - desc.payload.len();
            writer.write_all(&[0u8; 3][..padding])?;
        }
        Ok(())
    }

    /// Read an aggregate, converting payloads to host byte order.
    #[cfg(feature = "std")]
    pub fn load<R: Read>(registry: &'r BlobTypeRegistry, reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 12];
        reader.read_exact(&mut magic)?;
        if magic != AGGREGATE_MAGIC {
            return Err(BlobError::InvalidFormat {
                message: "bad aggregate magic",
            });
        }

        let mut marker = [0u8; 4];
        reader.read_exact(&mut marker)?;
        let file_order = if Endianness::Little.u32_from_bytes(marker) == 1 {
            Endianness::Little
        } else if Endianness::Big.u32_from_bytes(marker) == 1 {
            Endianness::Big
        } else {
            return Err(BlobError::InvalidFormat {
                message: "bad endianness marker",
            });
        };

        let mut count_bytes = [0u8; 4];
        reader.read_exact(&mut count_bytes)?;
        let blob_count = file_order.u32_from_bytes(count_bytes);

        let mut descs = Vec::new();
        for _ in 0..blob_count {
            let mut header = [0u8; BLOB_HEADER_SIZE];
            reader.read_exact(&mut header)?;

            let name_field = &header[..24];
            let name_len = name_field
                .iter()
                .position(|&b| b == 0)
                .ok_or(BlobError::InvalidFormat {
                    message: "blob type name is not NUL-terminated",
                })?;
            if name_len == 0 {
                return Err(BlobError::InvalidFormat {
                    message: "blob type name is empty",
                });
            }
            let name = core::str::from_utf8(&name_field[..name_len])
                .map_err(|_| BlobError::InvalidFormat {
                    message: "blob type name is not valid UTF-8",
                })?
                .to_string();

            let version =
                file_order.u32_from_bytes([header[24], header[25], header[26], header[27]]);
            let size = file_order.u32_from_bytes([header[28], header[29], header[30], header[31]])
                as usize;

            let mut payload = Vec::new();
            payload.resize(size, 0u8);
            reader.read_exact(&mut payload)?;
            let padding = padded_len(size) - size;
            let mut pad = [0u8; 3];
            reader.read_exact(&mut pad[..padding])?;

            let desc = registry
                .lookup(&name)
                .ok_or_else(|| BlobError::UnregisteredBlobType { name: name.clone() })?;
            if desc.version != version {
                return Err(BlobError::VersionMismatch {
                    name: name.clone(),
                    expected: desc.version,
                    got: version,
                });
            }

            if file_order != Endianness::host() {
                (desc.swap)(&mut payload, file_order)?;
            }

            descs.push(BlobDesc {
                name,
                version,
                payload,
            });
        }

        Ok(Self { registry, descs })
    }

    /// Save the aggregate to a file path.
    #[cfg(feature = "std")]
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
        endianness: Endianness,
    ) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.save(&mut file, endianness)
    }

    /// Load an aggregate from a file path.
    #[cfg(feature = "std")]
    pub fn load_from_file<P: AsRef<std::path::Path>>(
        registry: &'r BlobTypeRegistry,
        path: P,
    ) -> Result<Self> {
        let mut file = std::fs::File::open(path)?;
        Self::load(registry, &mut file)
    }
}

#[inline]
const fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}
