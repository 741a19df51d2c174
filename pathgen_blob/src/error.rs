//! Error types for pathgen_blob operations.
//!
//! Provides specific error variants for registration, serialization, and
//! aggregate file failures.

use core::fmt;

use crate::alloc_prelude::String;

/// Errors that can occur during blob operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// A blob type name exceeds the 23-byte wire limit.
    BlobTypeNameTooLong {
        /// The offending type name.
        name: &'static str,
    },

    /// A blob type name is already registered with a different version.
    ConflictingRegistration {
        /// The type name.
        name: &'static str,
        /// The version already in the registry.
        existing_version: u32,
        /// The version of the rejected registration.
        new_version: u32,
    },

    /// A blob type was used without prior registration.
    UnregisteredBlobType {
        /// The unregistered type name.
        name: String,
    },

    /// A blob's stored version differs from the registered one.
    VersionMismatch {
        /// The type name.
        name: String,
        /// The registered version.
        expected: u32,
        /// The version found in the data.
        got: u32,
    },

    /// Malformed binary data (bad magic, bad endianness marker, bad
    /// header fields, non-UTF-8 strings).
    InvalidFormat {
        /// Description of the format error.
        message: &'static str,
    },

    /// A payload ended before a read or swap completed.
    PayloadTruncated {
        /// Bytes needed by the operation.
        needed: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// I/O error during save or load.
    #[cfg(feature = "std")]
    Io(String),
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::BlobTypeNameTooLong { name } => {
                write!(f, "blob type name '{}' exceeds 23 bytes", name)
            }
            BlobError::ConflictingRegistration {
                name,
                existing_version,
                new_version,
            } => {
                write!(
                    f,
                    "blob type '{}' already registered with version {} (rejected version {})",
                    name, existing_version, new_version
                )
            }
            BlobError::UnregisteredBlobType { name } => {
                write!(f, "blob type '{}' is not registered", name)
            }
            BlobError::VersionMismatch {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "blob type '{}' version mismatch: registered {}, data has {}",
                    name, expected, got
                )
            }
            BlobError::InvalidFormat { message } => {
                write!(f, "invalid blob data: {}", message)
            }
            BlobError::PayloadTruncated { needed, remaining } => {
                write!(
                    f,
                    "payload truncated: needed {} bytes, {} remaining",
                    needed, remaining
                )
            }
            #[cfg(feature = "std")]
            BlobError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BlobError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err.to_string())
    }
}

/// Result type alias for pathgen_blob operations.
pub type Result<T> = core::result::Result<T, BlobError>;
