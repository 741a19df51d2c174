//! The navmesh blob and its builder.
//!
//! The navmesh blob is the flattened, endianness-portable form of one
//! element's walkable space: per cell, the floors found by rasterization,
//! each floor being one altitude layer of one terrain type with its pixel
//! coverage. The builder consumes finalized [`DynamicCell`]s and never
//! mutates them.

use std::collections::BTreeMap;

use pathgen_blob::{
    Blob, BlobError, Endianness, PayloadReader, PayloadSwapper, PayloadWriter, Result as BlobResult,
};
use pathgen_core::{CellBox, CellPos, Guid, GuidCompound};

use crate::error::{GenError, Result};
use crate::raster::DynamicCell;
use crate::system::GenSystem;

/// Option flags for a navmesh build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavMeshBuildFlags(u32);

impl NavMeshBuildFlags {
    /// No options.
    pub const NONE: Self = Self(0);
    /// Record cells that hold no floor instead of omitting them.
    pub const INCLUDE_EMPTY_CELLS: Self = Self(1);

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rebuild from a raw bit value.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for NavMeshBuildFlags {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// One floor of one cell: an altitude layer of a single terrain type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavFloor {
    /// Lowest floor altitude in the layer.
    pub altitude_min: f32,
    /// Highest floor altitude in the layer.
    pub altitude_max: f32,
    /// Terrain tag shared by the layer's pixels.
    pub terrain_type: u32,
    /// Number of pixels standing on this floor.
    pub pixel_count: u32,
}

/// The floors of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct NavCellRecord {
    /// Position of the cell.
    pub cell_pos: CellPos,
    /// Floors ordered by altitude layer, then terrain.
    pub floors: Vec<NavFloor>,
}

/// Flattened navmesh data covering exactly one cell box.
#[derive(Debug, Clone, PartialEq)]
pub struct NavMeshBlob {
    /// GUIDs of the contributing sectors, canonical order.
    pub guids: Vec<Guid>,
    /// The region covered.
    pub cell_box: CellBox,
    /// Flags the blob was built with.
    pub flags: NavMeshBuildFlags,
    /// Per-cell floor data.
    pub cells: Vec<NavCellRecord>,
}

impl Blob for NavMeshBlob {
    const BLOB_TYPE: &'static str = "NavMesh";
    const BLOB_VERSION: u32 = 2;

    fn write_payload(&self, w: &mut PayloadWriter<'_>) -> BlobResult<()> {
        w.write_u32(self.guids.len() as u32);
        for guid in &self.guids {
            w.write_guid(guid);
        }
        w.write_cell_box(&self.cell_box);
        w.write_u32(self.flags.bits());
        w.write_u32(self.cells.len() as u32);
        for cell in &self.cells {
            w.write_cell_pos(cell.cell_pos);
            w.write_u32(cell.floors.len() as u32);
            for floor in &cell.floors {
                w.write_f32(floor.altitude_min);
                w.write_f32(floor.altitude_max);
                w.write_u32(floor.terrain_type);
                w.write_u32(floor.pixel_count);
            }
        }
        Ok(())
    }

    fn read_payload(r: &mut PayloadReader<'_>) -> BlobResult<Self> {
        let guid_count = r.read_u32()?;
        let mut guids = Vec::with_capacity(guid_count as usize);
        for _ in 0..guid_count {
            guids.push(r.read_guid()?);
        }
        let cell_box = r.read_cell_box()?;
        let flags = NavMeshBuildFlags::from_bits(r.read_u32()?);
        let cell_count = r.read_u32()?;
        let mut cells = Vec::with_capacity(cell_count as usize);
        for _ in 0..cell_count {
            let cell_pos = r.read_cell_pos()?;
            let floor_count = r.read_u32()?;
            let mut floors = Vec::with_capacity(floor_count as usize);
            for _ in 0..floor_count {
                floors.push(NavFloor {
                    altitude_min: r.read_f32()?,
                    altitude_max: r.read_f32()?,
                    terrain_type: r.read_u32()?,
                    pixel_count: r.read_u32()?,
                });
            }
            cells.push(NavCellRecord { cell_pos, floors });
        }
        Ok(Self {
            guids,
            cell_box,
            flags,
            cells,
        })
    }

    fn swap_payload(bytes: &mut [u8], from: Endianness) -> BlobResult<()> {
        let mut swapper = PayloadSwapper::new(bytes, from);
        let guid_count = swapper.swap_u32()? as usize;
        swapper.skip_bytes(guid_count * 16)?;
        // cell box, flags, counts and floors are 32-bit words to the end
        swapper.swap_rest_u32()
    }
}

/// Builds one [`NavMeshBlob`] from finalized per-cell raster data.
///
/// Bound to its inputs at construction; `build` consumes the builder, so
/// one builder produces exactly one blob.
pub struct NavMeshBlobBuilder<'a> {
    system: &'a GenSystem,
    guid_compound: &'a GuidCompound,
    cell_box: &'a CellBox,
    cells: &'a [DynamicCell],
    flags: NavMeshBuildFlags,
}

impl<'a> NavMeshBlobBuilder<'a> {
    /// Bind a builder to its system context, identity, region and data.
    pub fn new(
        system: &'a GenSystem,
        guid_compound: &'a GuidCompound,
        cell_box: &'a CellBox,
        cells: &'a [DynamicCell],
        flags: NavMeshBuildFlags,
    ) -> Self {
        Self {
            system,
            guid_compound,
            cell_box,
            cells,
            flags,
        }
    }

    /// Build the blob.
    ///
    /// # Errors
    /// - `EmptyCellCollection` when no dynamic cell was supplied.
    /// - `CellOutsideBox` when a dynamic cell falls outside the cell box.
    /// - `CellNotFinalized` when a dynamic cell's columns were never ended.
    pub fn build(self) -> Result<NavMeshBlob> {
        if self.cells.is_empty() {
            return Err(GenError::EmptyCellCollection);
        }
        for cell in self.cells {
            let pos = cell.cell_pos();
            if !self.cell_box.contains(pos) {
                return Err(GenError::CellOutsideBox { x: pos.x, y: pos.y });
            }
            if !cell.is_finalized() {
                return Err(GenError::CellNotFinalized { x: pos.x, y: pos.y });
            }
        }

        let mut records = Vec::new();
        for cell in self.cells {
            let record = self.flatten_cell(cell)?;
            if record.floors.is_empty() && !self.flags.contains(NavMeshBuildFlags::INCLUDE_EMPTY_CELLS)
            {
                continue;
            }
            records.push(record);
        }

        Ok(NavMeshBlob {
            guids: self.guid_compound.guids().to_vec(),
            cell_box: *self.cell_box,
            flags: self.flags,
            cells: records,
        })
    }

    /// Group one cell's floor spans into per-layer floors.
    ///
    /// Only the cell's exact pixel box contributes; the enlarged border
    /// exists for raster correctness, not for output.
    fn flatten_cell(&self, cell: &DynamicCell) -> Result<NavCellRecord> {
        let partition = self.system.partition();
        let layer_height = self.system.config().altitude_layer_height;
        let exact_box = partition.pixel_box_of_cell(cell.cell_pos());

        let mut layers: BTreeMap<(i32, u32), NavFloor> = BTreeMap::new();
        for y in exact_box.min.y..=exact_box.max.y {
            for x in exact_box.min.x..=exact_box.max.x {
                let Some(spans) = cell.final_column(pathgen_core::PixelPos::new(x, y)) else {
                    continue;
                };
                for span in spans {
                    let row = (span.altitude / layer_height).floor() as i32;
                    layers
                        .entry((row, span.terrain_type))
                        .and_modify(|floor| {
                            floor.altitude_min = floor.altitude_min.min(span.altitude);
                            floor.altitude_max = floor.altitude_max.max(span.altitude);
                            floor.pixel_count += 1;
                        })
                        .or_insert(NavFloor {
                            altitude_min: span.altitude,
                            altitude_max: span.altitude,
                            terrain_type: span.terrain_type,
                            pixel_count: 1,
                        });
                }
            }
        }

        Ok(NavCellRecord {
            cell_pos: cell.cell_pos(),
            floors: layers.into_values().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_ops() {
        let flags = NavMeshBuildFlags::NONE | NavMeshBuildFlags::INCLUDE_EMPTY_CELLS;
        assert!(flags.contains(NavMeshBuildFlags::INCLUDE_EMPTY_CELLS));
        assert!(!NavMeshBuildFlags::NONE.contains(NavMeshBuildFlags::INCLUDE_EMPTY_CELLS));
        assert_eq!(NavMeshBuildFlags::from_bits(flags.bits()), flags);
    }

    #[test]
    fn test_blob_payload_roundtrip() {
        let blob = NavMeshBlob {
            guids: vec![Guid::from_bytes([1; 16]), Guid::from_bytes([2; 16])],
            cell_box: CellBox::new(CellPos::new(-1, -1), CellPos::new(1, 1)),
            flags: NavMeshBuildFlags::INCLUDE_EMPTY_CELLS,
            cells: vec![NavCellRecord {
                cell_pos: CellPos::new(0, 0),
                floors: vec![NavFloor {
                    altitude_min: 0.5,
                    altitude_max: 0.75,
                    terrain_type: 3,
                    pixel_count: 64,
                }],
            }],
        };

        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::host());
        blob.write_payload(&mut w).unwrap();
        let mut r = PayloadReader::new(&payload, Endianness::host());
        let back = NavMeshBlob::read_payload(&mut r).unwrap();
        assert_eq!(back, blob);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_swap_twice_restores_payload() {
        let blob = NavMeshBlob {
            guids: vec![Guid::from_bytes([9; 16])],
            cell_box: CellBox::single(CellPos::new(4, -4)),
            flags: NavMeshBuildFlags::NONE,
            cells: Vec::new(),
        };
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::Little);
        blob.write_payload(&mut w).unwrap();
        let original = payload.clone();

        NavMeshBlob::swap_payload(&mut payload, Endianness::Little).unwrap();
        assert_ne!(payload, original);
        NavMeshBlob::swap_payload(&mut payload, Endianness::Big).unwrap();
        assert_eq!(payload, original);
    }

    #[test]
    fn test_swap_rejects_truncated_guids() {
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::Little);
        w.write_u32(2); // claims two guids, provides none
        assert!(matches!(
            NavMeshBlob::swap_payload(&mut payload, Endianness::Little),
            Err(BlobError::PayloadTruncated { .. })
        ));
    }
}
