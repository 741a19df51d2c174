//! # pathgen
//!
//! Offline navmesh / path-data generation pipeline.
//!
//! Terrain triangles go in, endianness-portable path-data files come out:
//!
//! ```text
//! pathgen_core (partition math, GUIDs)
//!     │
//!     ├──────────────────────┐
//!     ▼                      ▼
//! pathgen_blob           pathgen
//! (registry, blobs,      (rasterization, builders,
//!  aggregate files)       sectors, generator)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use pathgen::{Generator, GlobalConfig, RunOptions, Sector, SectorInput};
//! use pathgen_core::{Guid, Triangle, Vec3};
//!
//! let mut input = SectorInput::new();
//! input.push_triangle(
//!     Triangle::new(
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(8.0, 0.0, 0.0),
//!         Vec3::new(0.0, 8.0, 0.0),
//!     ),
//!     0,
//! );
//!
//! let mut generator = Generator::new(
//!     GlobalConfig::default(),
//!     RunOptions::default(),
//!     "out/pathdata",
//! )?;
//! generator.add_sector(Sector::with_input("plaza", Guid::from_bytes([1; 16]), input))?;
//! generator.generate()?;
//! # Ok::<(), pathgen::GenError>(())
//! ```
//!
//! The run writes one `.pathdata` aggregate per element (sector or sector
//! overlap) and one `.pathdataindex` listing them all.
//!
//! ## Pipeline stages
//!
//! - [`input`]: triangle soup split into per-cell [`input::InputCell`]s
//! - [`raster`]: per-cell rasterization into sparse altitude columns
//! - [`grid`]: the sparse two-sided column storage behind rasterization
//! - [`navmesh`], [`pathobject`], [`index`]: blob builders
//! - [`element`]: the map of planned generation units
//! - [`generator`]: the driver running all stages in order

#![warn(missing_docs)]

pub mod config;
pub mod element;
pub mod error;
pub mod generator;
pub mod grid;
pub mod index;
pub mod input;
pub mod navmesh;
pub mod pathobject;
pub mod raster;
pub mod sector;
pub mod system;

pub use config::{GlobalConfig, OutputEndianness, RunOptions};
pub use element::{PathDataElement, PathDataElementMap};
pub use error::{GenError, Result};
pub use generator::Generator;
pub use grid::{DynamicGrid, TwoSidedColumn};
pub use index::{IndexSource, PathDataIndexBlob, PathDataIndexBlobBuilder, PathDataIndexEntry};
pub use input::{InputCell, SectorInput, TaggedTriangle};
pub use navmesh::{NavCellRecord, NavFloor, NavMeshBlob, NavMeshBlobBuilder, NavMeshBuildFlags};
pub use pathobject::{
    JumpCandidateBlob, JumpCandidateBlobBuilder, PathObjectCandidate, PathObjectKind,
};
pub use raster::{DynamicCell, FloorSpan, MergeStatus, RasterCellBlob, RasterCellBlobBuilder};
pub use sector::{Sector, SectorGenerator, SectorPartitioner};
pub use system::GenSystem;
