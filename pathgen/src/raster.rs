//! Triangle rasterization into per-cell dynamic data.
//!
//! A [`DynamicCell`] samples the walkable triangles covering one generation
//! cell at pixel-center resolution. While filling, samples live in a
//! [`DynamicGrid`] of sparse altitude-layer columns; `end_columns` then
//! flattens each column into an ordered list of floor spans, optionally
//! merging floors that leave an entity less than its height of clearance.
//! Builders consume only finalized cells.

use pathgen_core::{CellPos, PixelBox, PixelPos, SquarePartition, Vec3};

use crate::config::GlobalConfig;
use crate::grid::DynamicGrid;
use crate::input::InputCell;

/// Whether `end_columns` merges floors with insufficient clearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Merge floors closer than the entity height.
    MergeEnabled,
    /// Keep every raster layer as its own floor.
    MergeDisabled,
}

/// One altitude sample accumulated into a column layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnSample {
    /// Highest altitude seen in this layer.
    pub altitude: f32,
    /// Terrain tag of the sample that set `altitude`.
    pub terrain_type: u32,
    /// Number of samples accumulated.
    pub sample_count: u32,
}

/// One walkable floor at a pixel after finalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorSpan {
    /// Floor altitude.
    pub altitude: f32,
    /// Terrain tag.
    pub terrain_type: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    New,
    Filling,
    Finalized,
}

/// Per-cell raster data, dynamic while filling, ordered spans once done.
#[derive(Debug)]
pub struct DynamicCell {
    cell_pos: CellPos,
    pixel_box: PixelBox,
    partition: SquarePartition,
    layer_height: f32,
    merge_distance: f32,
    dynamic: Option<DynamicGrid<ColumnSample>>,
    final_columns: Vec<Vec<FloorSpan>>,
    stage: Stage,
}

impl DynamicCell {
    /// Create the raster cell for `cell_pos` under the given configuration.
    ///
    /// The cell rasterizes over its *enlarged* pixel box so neighbor
    /// geometry contributes to border pixels.
    pub fn new(partition: &SquarePartition, config: &GlobalConfig, cell_pos: CellPos) -> Self {
        Self {
            cell_pos,
            pixel_box: partition.enlarged_pixel_box_of_cell(cell_pos),
            partition: *partition,
            layer_height: config.altitude_layer_height,
            merge_distance: config.entity_height,
            dynamic: None,
            final_columns: Vec::new(),
            stage: Stage::New,
        }
    }

    /// The cell this raster covers.
    #[inline]
    pub fn cell_pos(&self) -> CellPos {
        self.cell_pos
    }

    /// The enlarged pixel box being rasterized.
    #[inline]
    pub fn pixel_box(&self) -> &PixelBox {
        &self.pixel_box
    }

    /// Whether `end_columns` has run.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.stage == Stage::Finalized
    }

    /// Whether no pixel holds any floor.
    pub fn is_empty(&self) -> bool {
        match self.stage {
            Stage::New => true,
            Stage::Filling => self.dynamic.as_ref().map_or(true, |g| g.is_empty()),
            Stage::Finalized => self.final_columns.iter().all(|spans| spans.is_empty()),
        }
    }

    /// Start (or restart) the dynamic fill stage.
    pub fn begin_columns(&mut self) {
        self.dynamic = Some(DynamicGrid::new(self.pixel_box));
        self.final_columns.clear();
        self.stage = Stage::Filling;
    }

    /// Accumulate one altitude sample. Pixels outside the cell's box are
    /// ignored; call between `begin_columns` and `end_columns`.
    pub fn push_pixel(&mut self, pos: PixelPos, altitude: f32, terrain_type: u32) {
        debug_assert_eq!(self.stage, Stage::Filling);
        let Some(grid) = self.dynamic.as_mut() else {
            return;
        };
        let Some(column) = grid.column_or_create(pos) else {
            return;
        };
        let row = (altitude / self.layer_height).floor() as i32;
        let sample = column.get_or_create(row);
        if sample.sample_count == 0 || altitude > sample.altitude {
            sample.altitude = altitude;
            sample.terrain_type = terrain_type;
        }
        sample.sample_count += 1;
    }

    /// Rasterize the walkable triangles of the given input cells.
    ///
    /// Calls `begin_columns` and fills the dynamic grid; the caller decides
    /// when to finalize and whether to merge.
    pub fn rasterize(&mut self, inputs: &[&InputCell]) {
        self.begin_columns();
        for input in inputs {
            for tagged in &input.triangles {
                self.raster_triangle(&tagged.triangle.vertices, tagged.terrain_type);
            }
        }
    }

    fn raster_triangle(&mut self, vertices: &[Vec3; 3], terrain_type: u32) {
        let [a, b, c] = *vertices;

        // Signed double area in the xy plane; near-zero means a wall or a
        // degenerate triangle, neither of which produces floor samples.
        let det = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        if det.abs() < 1e-6 {
            return;
        }

        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        let low = self.partition.world_to_pixel(min);
        let high = self.partition.world_to_pixel(max);

        let x0 = low.x.max(self.pixel_box.min.x);
        let x1 = high.x.min(self.pixel_box.max.x);
        let y0 = low.y.max(self.pixel_box.min.y);
        let y1 = high.y.min(self.pixel_box.max.y);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = PixelPos::new(x, y);
                let center = self.partition.pixel_center(pos, 0.0);

                // Barycentric coordinates of the pixel center.
                let v = ((center.x - a.x) * (c.y - a.y) - (c.x - a.x) * (center.y - a.y)) / det;
                let w = ((b.x - a.x) * (center.y - a.y) - (center.x - a.x) * (b.y - a.y)) / det;
                let u = 1.0 - v - w;
                if u < 0.0 || v < 0.0 || w < 0.0 {
                    continue;
                }

                let altitude = u * a.z + v * b.z + w * c.z;
                self.push_pixel(pos, altitude, terrain_type);
            }
        }
    }

    /// Flatten dynamic columns into ordered floor spans and release the
    /// dynamic grid.
    pub fn end_columns(&mut self, merge_status: MergeStatus) {
        let Some(grid) = self.dynamic.take() else {
            self.stage = Stage::Finalized;
            return;
        };

        self.final_columns = vec![Vec::new(); self.pixel_box.pixel_count()];
        for (pos, column) in grid.iter_occupied() {
            let mut spans: Vec<FloorSpan> = Vec::new();
            for (_, sample) in column.iter() {
                let span = FloorSpan {
                    altitude: sample.altitude,
                    terrain_type: sample.terrain_type,
                };
                match (merge_status, spans.last_mut()) {
                    (MergeStatus::MergeEnabled, Some(last))
                        if span.altitude - last.altitude < self.merge_distance =>
                    {
                        // Not enough clearance to stand on the lower floor:
                        // the upper one replaces it.
                        *last = span;
                    }
                    _ => spans.push(span),
                }
            }
            if let Some(index) = self.pixel_box.row_major_index(pos) {
                self.final_columns[index] = spans;
            }
        }
        self.stage = Stage::Finalized;
    }

    /// The finalized floor spans at a pixel, lowest first.
    ///
    /// `None` when the pixel lies outside the cell's box; an empty slice
    /// when it holds no floor. Only valid after `end_columns`.
    pub fn final_column(&self, pos: PixelPos) -> Option<&[FloorSpan]> {
        debug_assert!(self.is_finalized());
        let index = self.pixel_box.row_major_index(pos)?;
        Some(self.final_columns.get(index).map_or(&[][..], |v| v))
    }

    /// The highest floor at a pixel, if any. Only valid after `end_columns`.
    pub fn top_floor(&self, pos: PixelPos) -> Option<FloorSpan> {
        self.final_column(pos)?.last().copied()
    }
}

/// Intermediate raster data of one cell, persisted when a run asks for
/// intermediate output.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCellBlob {
    /// Position of the rasterized cell.
    pub cell_pos: CellPos,
    /// The (enlarged) pixel box the columns cover.
    pub pixel_box: PixelBox,
    /// Floor spans per pixel, row-major over `pixel_box`, lowest first.
    pub columns: Vec<Vec<FloorSpan>>,
}

impl pathgen_blob::Blob for RasterCellBlob {
    const BLOB_TYPE: &'static str = "RasterCell";
    const BLOB_VERSION: u32 = 1;

    fn write_payload(
        &self,
        w: &mut pathgen_blob::PayloadWriter<'_>,
    ) -> pathgen_blob::Result<()> {
        w.write_cell_pos(self.cell_pos);
        w.write_i32(self.pixel_box.min.x);
        w.write_i32(self.pixel_box.min.y);
        w.write_i32(self.pixel_box.max.x);
        w.write_i32(self.pixel_box.max.y);
        w.write_u32(self.columns.len() as u32);
        for spans in &self.columns {
            w.write_u32(spans.len() as u32);
            for span in spans {
                w.write_f32(span.altitude);
                w.write_u32(span.terrain_type);
            }
        }
        Ok(())
    }

    fn read_payload(r: &mut pathgen_blob::PayloadReader<'_>) -> pathgen_blob::Result<Self> {
        let cell_pos = r.read_cell_pos()?;
        let min = PixelPos::new(r.read_i32()?, r.read_i32()?);
        let max = PixelPos::new(r.read_i32()?, r.read_i32()?);
        let column_count = r.read_u32()?;
        let mut columns = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            let span_count = r.read_u32()?;
            let mut spans = Vec::with_capacity(span_count as usize);
            for _ in 0..span_count {
                spans.push(FloorSpan {
                    altitude: r.read_f32()?,
                    terrain_type: r.read_u32()?,
                });
            }
            columns.push(spans);
        }
        Ok(Self {
            cell_pos,
            pixel_box: PixelBox::new(min, max),
            columns,
        })
    }

    fn swap_payload(
        bytes: &mut [u8],
        _from: pathgen_blob::Endianness,
    ) -> pathgen_blob::Result<()> {
        // 32-bit words throughout
        pathgen_blob::swap_u32_words(bytes)
    }
}

/// Builds one [`RasterCellBlob`] from a single finalized dynamic cell.
pub struct RasterCellBlobBuilder<'a> {
    cell: &'a DynamicCell,
}

impl<'a> RasterCellBlobBuilder<'a> {
    /// Bind a builder to one dynamic cell.
    pub fn new(cell: &'a DynamicCell) -> Self {
        Self { cell }
    }

    /// Build the blob.
    ///
    /// # Errors
    /// `CellNotFinalized` when the cell's columns were never ended.
    pub fn build(self) -> crate::error::Result<RasterCellBlob> {
        if !self.cell.is_finalized() {
            let pos = self.cell.cell_pos();
            return Err(crate::error::GenError::CellNotFinalized { x: pos.x, y: pos.y });
        }
        let pixel_box = *self.cell.pixel_box();
        let mut columns = Vec::with_capacity(pixel_box.pixel_count());
        for y in pixel_box.min.y..=pixel_box.max.y {
            for x in pixel_box.min.x..=pixel_box.max.x {
                let spans = self
                    .cell
                    .final_column(PixelPos::new(x, y))
                    .unwrap_or(&[])
                    .to_vec();
                columns.push(spans);
            }
        }
        Ok(RasterCellBlob {
            cell_pos: self.cell.cell_pos(),
            pixel_box,
            columns,
        })
    }
}
