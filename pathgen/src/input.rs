//! Generation input: tagged triangles grouped into per-cell input cells.
//!
//! A sector's input is a triangle soup plus any hand-placed connection
//! objects (doors, teleporters). Before rasterization the soup is split
//! into [`InputCell`]s: one bucket per generation cell, where a triangle
//! lands in every cell whose enlarged region its footprint touches, so
//! border pixels see the geometry of neighboring cells.

use pathgen_core::{CellBox, CellPos, SquarePartition, Triangle, Vec3};

use crate::pathobject::PathObjectKind;

/// A triangle carrying its terrain tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedTriangle {
    /// The geometry.
    pub triangle: Triangle,
    /// Terrain type propagated into the generated floors.
    pub terrain_type: u32,
}

/// A hand-placed connection between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplicitPathObject {
    /// How an entity traverses the connection.
    pub kind: PathObjectKind,
    /// Entry position.
    pub start: Vec3,
    /// Exit position.
    pub end: Vec3,
}

/// The raw input of one sector.
#[derive(Debug, Clone, Default)]
pub struct SectorInput {
    /// The terrain triangles.
    pub triangles: Vec<TaggedTriangle>,
    /// Hand-placed connection objects.
    pub path_objects: Vec<ExplicitPathObject>,
}

impl SectorInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tagged triangle.
    pub fn push_triangle(&mut self, triangle: Triangle, terrain_type: u32) {
        self.triangles.push(TaggedTriangle {
            triangle,
            terrain_type,
        });
    }

    /// Add a hand-placed connection object.
    pub fn push_path_object(&mut self, kind: PathObjectKind, start: Vec3, end: Vec3) {
        self.path_objects.push(ExplicitPathObject { kind, start, end });
    }

    /// Whether the input carries no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// The triangles contributing to one generation cell.
#[derive(Debug, Clone)]
pub struct InputCell {
    /// Position of the cell.
    pub cell_pos: CellPos,
    /// Triangles whose footprint touches the cell's enlarged region.
    pub triangles: Vec<TaggedTriangle>,
}

/// Split a triangle soup into per-cell input cells.
///
/// Returns cells in no particular order; cells without any triangle are
/// not produced.
pub fn build_input_cells(triangles: &[TaggedTriangle], partition: &SquarePartition) -> Vec<InputCell> {
    let margin = partition.pixel_enlargement as f32 * partition.raster_precision;
    let mut cells: Vec<InputCell> = Vec::new();

    for tagged in triangles {
        let Some(cell_box) = footprint_cell_box(&tagged.triangle, partition, margin) else {
            continue;
        };
        for cell_pos in cell_box.iter() {
            match cells.iter_mut().find(|c| c.cell_pos == cell_pos) {
                Some(cell) => cell.triangles.push(*tagged),
                None => cells.push(InputCell {
                    cell_pos,
                    triangles: vec![*tagged],
                }),
            }
        }
    }
    cells
}

/// Cells whose enlarged region a triangle's xy footprint touches.
fn footprint_cell_box(
    triangle: &Triangle,
    partition: &SquarePartition,
    margin: f32,
) -> Option<CellBox> {
    let [a, b, c] = triangle.vertices;
    let min = a.min(b).min(c);
    let max = a.max(b).max(c);
    if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
        return None;
    }
    Some(partition.cell_box_of_world_extent(
        Vec3::new(min.x - margin, min.y - margin, min.z),
        Vec3::new(max.x + margin, max.y + margin, max.z),
    ))
}

/// Smallest cell box covering every input cell, or `None` when empty.
pub fn cell_box_of_input_cells(cells: &[InputCell]) -> Option<CellBox> {
    let mut iter = cells.iter();
    let first = CellBox::single(iter.next()?.cell_pos);
    Some(iter.fold(first, |acc, cell| acc.union(&CellBox::single(cell.cell_pos))))
}
