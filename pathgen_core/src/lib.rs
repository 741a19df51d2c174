//! # pathgen_core
//!
//! Pure partition math and core types for the pathgen path-data generation
//! toolchain.
//!
//! This crate carries no I/O and no pipeline state: it defines the world /
//! pixel / cell coordinate model that every other pathgen crate agrees on,
//! plus the sector GUIDs that key generated data.
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support
//! - `alloc`: Enables heap allocation (for [`GuidCompound`]) without full std
//!
//! ## Modules
//!
//! - [`types`]: Coordinate types (`Vec3`, `Triangle`, `PixelPos`, `CellPos`)
//! - [`boxes`]: Inclusive 2D bounding boxes (`PixelBox`, `CellBox`)
//! - [`partition`]: The world/pixel/cell square partition
//! - [`guid`]: Sector GUIDs and canonical GUID compounds
//! - [`error`]: Error types

#![no_std]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal alloc prelude for conditional compilation
#[cfg(feature = "std")]
mod alloc_prelude {
    pub use std::vec::Vec;
}

#[cfg(all(feature = "alloc", not(feature = "std")))]
mod alloc_prelude {
    pub use alloc::vec::Vec;
}

pub mod boxes;
pub mod error;
pub mod guid;
pub mod partition;
pub mod types;

pub use boxes::{CellBox, CellBoxIter, PixelBox};
pub use error::{CoreError, Result};
pub use guid::Guid;
#[cfg(any(feature = "std", feature = "alloc"))]
pub use guid::GuidCompound;
pub use partition::SquarePartition;
pub use types::{CellPos, PixelPos, Triangle, Vec3};
