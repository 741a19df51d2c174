//! # pathgen_blob
//!
//! Blob serialization layer for the pathgen path-data toolchain.
//!
//! A *blob* is a fixed-layout, endianness-portable binary record with a
//! wire type name and a version. This crate provides:
//!
//! - [`Blob`]: the serialization contract each record type implements
//! - [`BlobTypeRegistry`]: an explicit (never global) table of known blob
//!   types and their byte-order swap routines
//! - [`BlobAggregate`]: the multi-blob container file format
//! - [`load_file_bytes`]: whole-file read with non-fatal failure
//!
//! Every blob type that passes through an aggregate must be registered
//! first; unregistered types fail loudly rather than falling back to any
//! default behavior.
//!
//! # Crate Features
//!
//! - `std` (default): file I/O and `std::error::Error` impls
//! - `alloc`: heap allocation without full std

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(any(feature = "std", feature = "alloc")))]
compile_error!("pathgen_blob requires either the `std` or the `alloc` feature");

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal alloc prelude for conditional compilation
#[cfg(feature = "std")]
mod alloc_prelude {
    pub use std::format;
    pub use std::string::{String, ToString};
    pub use std::vec::Vec;
}

#[cfg(all(feature = "alloc", not(feature = "std")))]
mod alloc_prelude {
    pub use alloc::format;
    pub use alloc::string::{String, ToString};
    pub use alloc::vec::Vec;
}

pub mod aggregate;
pub mod blob;
pub mod endian;
pub mod error;
pub mod file;
pub mod registry;

pub use aggregate::{BlobAggregate, BlobDesc, AGGREGATE_MAGIC, BLOB_HEADER_SIZE, FILE_HEADER_SIZE};
pub use blob::{Blob, PayloadReader, PayloadSwapper, PayloadWriter, MAX_BLOB_TYPE_NAME_LEN};
pub use endian::{swap_u32_words, Endianness};
pub use error::{BlobError, Result};
#[cfg(feature = "std")]
pub use file::load_file_bytes;
pub use registry::{BlobTypeDesc, BlobTypeRegistry, SwapFn};
