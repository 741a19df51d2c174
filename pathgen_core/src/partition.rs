//! Square partition of the world into pixels and cells.
//!
//! The partition stacks two integer rasters on top of continuous world
//! space:
//!
//! ```text
//!   world (f32) --/ raster_precision /--> pixel (i32) --/ pixels_per_cell /--> cell (i32)
//! ```
//!
//! Pixel `p` covers the world interval `[p * precision, (p + 1) * precision)`
//! per axis, and cell `c` covers pixels `[c * n, (c + 1) * n)` with
//! `n = pixels_per_cell`. All conversions floor toward negative infinity so
//! that negative world regions partition exactly like positive ones.
//!
//! A cell's *enlarged* pixel box extends `pixel_enlargement` pixels beyond
//! the cell on every side; rasterization uses it so that geometry from
//! neighboring cells contributes to the border pixels of each cell.

use crate::boxes::{CellBox, PixelBox};
use crate::error::{CoreError, Result};
use crate::types::{CellPos, PixelPos, Vec3};

/// The pixel/cell partition used by one generation run.
///
/// Immutable after construction; shared by reference across the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquarePartition {
    /// World size of one pixel (the raster precision).
    pub raster_precision: f32,
    /// Number of pixels on a cell side.
    pub pixels_per_cell: i32,
    /// Margin in pixels added around a cell by [`enlarged_pixel_box_of_cell`](Self::enlarged_pixel_box_of_cell).
    pub pixel_enlargement: i32,
}

impl SquarePartition {
    /// Create a partition, validating its parameters.
    ///
    /// # Errors
    /// Returns `InvalidPartition` when the precision is not strictly
    /// positive and finite, when `pixels_per_cell < 1`, or when the
    /// enlargement is negative.
    pub fn new(raster_precision: f32, pixels_per_cell: i32, pixel_enlargement: i32) -> Result<Self> {
        if !(raster_precision > 0.0) || !raster_precision.is_finite() {
            return Err(CoreError::InvalidPartition {
                message: "raster precision must be finite and > 0",
            });
        }
        if pixels_per_cell < 1 {
            return Err(CoreError::InvalidPartition {
                message: "pixels per cell must be >= 1",
            });
        }
        if pixel_enlargement < 0 {
            return Err(CoreError::InvalidPartition {
                message: "pixel enlargement must be >= 0",
            });
        }
        Ok(Self {
            raster_precision,
            pixels_per_cell,
            pixel_enlargement,
        })
    }

    /// World size of one cell side.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.raster_precision * self.pixels_per_cell as f32
    }

    // -------------------- world -> pixel --------------------

    /// Pixel coordinate containing a world coordinate (one axis).
    #[inline]
    pub fn world_to_pixel_coord(&self, v: f32) -> i32 {
        libm::floorf(v / self.raster_precision) as i32
    }

    /// Pixel containing a world position (altitude ignored).
    #[inline]
    pub fn world_to_pixel(&self, p: Vec3) -> PixelPos {
        PixelPos::new(self.world_to_pixel_coord(p.x), self.world_to_pixel_coord(p.y))
    }

    /// World coordinate of the low edge of a pixel (one axis).
    #[inline]
    pub fn pixel_coord_to_world(&self, c: i32) -> f32 {
        c as f32 * self.raster_precision
    }

    /// World position of the center of a pixel, at the given altitude.
    #[inline]
    pub fn pixel_center(&self, pos: PixelPos, altitude: f32) -> Vec3 {
        Vec3::new(
            (pos.x as f32 + 0.5) * self.raster_precision,
            (pos.y as f32 + 0.5) * self.raster_precision,
            altitude,
        )
    }

    // -------------------- pixel <-> cell --------------------

    /// Cell coordinate containing a pixel coordinate (one axis).
    #[inline]
    pub fn pixel_to_cell_coord(&self, c: i32) -> i32 {
        c.div_euclid(self.pixels_per_cell)
    }

    /// Cell containing a pixel.
    #[inline]
    pub fn pixel_to_cell(&self, pos: PixelPos) -> CellPos {
        CellPos::new(self.pixel_to_cell_coord(pos.x), self.pixel_to_cell_coord(pos.y))
    }

    /// Cell containing a world position.
    #[inline]
    pub fn world_to_cell(&self, p: Vec3) -> CellPos {
        self.pixel_to_cell(self.world_to_pixel(p))
    }

    /// The exact pixel box of a cell (no enlargement).
    #[inline]
    pub fn pixel_box_of_cell(&self, cell: CellPos) -> PixelBox {
        let n = self.pixels_per_cell;
        PixelBox::new(
            PixelPos::new(cell.x * n, cell.y * n),
            PixelPos::new(cell.x * n + n - 1, cell.y * n + n - 1),
        )
    }

    /// The pixel box of a cell grown by the partition's enlargement margin.
    #[inline]
    pub fn enlarged_pixel_box_of_cell(&self, cell: CellPos) -> PixelBox {
        self.pixel_box_of_cell(cell).enlarged(self.pixel_enlargement)
    }

    /// Smallest cell box covering a pixel box.
    pub fn cell_box_of_pixel_box(&self, pixel_box: &PixelBox) -> CellBox {
        CellBox::new(
            self.pixel_to_cell(pixel_box.min),
            self.pixel_to_cell(pixel_box.max),
        )
    }

    /// Smallest cell box covering the world-space xy extent `[min, max]`.
    pub fn cell_box_of_world_extent(&self, min: Vec3, max: Vec3) -> CellBox {
        CellBox::new(self.world_to_cell(min), self.world_to_cell(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> SquarePartition {
        SquarePartition::new(0.5, 8, 2).unwrap()
    }

    #[test]
    fn test_invalid_partitions_rejected() {
        assert!(SquarePartition::new(0.0, 8, 2).is_err());
        assert!(SquarePartition::new(-1.0, 8, 2).is_err());
        assert!(SquarePartition::new(f32::NAN, 8, 2).is_err());
        assert!(SquarePartition::new(0.5, 0, 2).is_err());
        assert!(SquarePartition::new(0.5, 8, -1).is_err());
    }

    #[test]
    fn test_world_to_pixel_floors_toward_negative_infinity() {
        let p = partition();
        assert_eq!(p.world_to_pixel_coord(0.0), 0);
        assert_eq!(p.world_to_pixel_coord(0.49), 0);
        assert_eq!(p.world_to_pixel_coord(0.5), 1);
        assert_eq!(p.world_to_pixel_coord(-0.01), -1);
        assert_eq!(p.world_to_pixel_coord(-0.5), -1);
        assert_eq!(p.world_to_pixel_coord(-0.51), -2);
    }

    #[test]
    fn test_pixel_to_cell_negative_coords() {
        let p = partition();
        assert_eq!(p.pixel_to_cell_coord(0), 0);
        assert_eq!(p.pixel_to_cell_coord(7), 0);
        assert_eq!(p.pixel_to_cell_coord(8), 1);
        assert_eq!(p.pixel_to_cell_coord(-1), -1);
        assert_eq!(p.pixel_to_cell_coord(-8), -1);
        assert_eq!(p.pixel_to_cell_coord(-9), -2);
    }

    #[test]
    fn test_pixel_box_of_cell() {
        let p = partition();
        let b = p.pixel_box_of_cell(CellPos::new(-1, 2));
        assert_eq!(b.min, PixelPos::new(-8, 16));
        assert_eq!(b.max, PixelPos::new(-1, 23));
        assert_eq!(b.pixel_count(), 64);
    }

    #[test]
    fn test_enlarged_pixel_box_of_cell() {
        let p = partition();
        let b = p.enlarged_pixel_box_of_cell(CellPos::new(0, 0));
        assert_eq!(b.min, PixelPos::new(-2, -2));
        assert_eq!(b.max, PixelPos::new(9, 9));
    }

    #[test]
    fn test_every_pixel_of_cell_box_maps_back() {
        let p = partition();
        for cell_x in -2..2 {
            for cell_y in -2..2 {
                let cell = CellPos::new(cell_x, cell_y);
                let b = p.pixel_box_of_cell(cell);
                assert_eq!(p.pixel_to_cell(b.min), cell);
                assert_eq!(p.pixel_to_cell(b.max), cell);
            }
        }
    }

    #[test]
    fn test_cell_box_of_world_extent() {
        let p = partition();
        // cell size = 4.0 world units
        let b = p.cell_box_of_world_extent(Vec3::new(-4.0, 0.0, 0.0), Vec3::new(3.9, 7.9, 0.0));
        assert_eq!(b.min, CellPos::new(-1, 0));
        assert_eq!(b.max, CellPos::new(0, 1));
    }
}
