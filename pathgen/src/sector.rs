//! Sectors, per-sector generation state, and the sector partitioner.
//!
//! A [`Sector`] is a named, GUID-identified block of terrain input. Its
//! [`SectorGenerator`] holds everything derived from it during a run:
//! prepared input cells, the generated flag, and the index entries its
//! elements produced. The [`SectorPartitioner`] optionally re-partitions a
//! sector's region into smaller square output sectors.

use pathgen_core::{CellBox, CellPos, Guid, GuidCompound, SquarePartition};

use crate::error::{GenError, Result};
use crate::index::PathDataIndexEntry;
use crate::input::{build_input_cells, InputCell, SectorInput};

/// One block of terrain to generate path data for.
#[derive(Debug, Clone)]
pub struct Sector {
    /// Name, used for output file stems. Unique within a generator.
    pub name: String,
    /// Identity of the sector. Unique within a generator.
    pub guid: Guid,
    /// The sector's terrain input.
    pub input: SectorInput,
}

impl Sector {
    /// Create a sector with empty input.
    pub fn new(name: impl Into<String>, guid: Guid) -> Self {
        Self {
            name: name.into(),
            guid,
            input: SectorInput::new(),
        }
    }

    /// Create a sector with the given input.
    pub fn with_input(name: impl Into<String>, guid: Guid, input: SectorInput) -> Self {
        Self {
            name: name.into(),
            guid,
            input,
        }
    }
}

/// Per-sector state across one generation run.
///
/// Owned and driven by the generator; exposed read-only so index builders
/// can bind to a single sector as their upstream source.
#[derive(Debug)]
pub struct SectorGenerator {
    sector: Sector,
    partitioner: Option<SectorPartitioner>,
    input_cells: Vec<InputCell>,
    generated: bool,
    produced: Vec<PathDataIndexEntry>,
}

impl SectorGenerator {
    /// Wrap a sector for generation.
    pub fn new(sector: Sector) -> Self {
        Self {
            sector,
            partitioner: None,
            input_cells: Vec::new(),
            generated: false,
            produced: Vec::new(),
        }
    }

    /// Wrap a sector that will be re-partitioned into smaller outputs.
    pub fn with_partitioner(sector: Sector, partitioner: SectorPartitioner) -> Self {
        Self {
            partitioner: Some(partitioner),
            ..Self::new(sector)
        }
    }

    /// The wrapped sector.
    #[inline]
    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    /// The partitioner, when configured.
    #[inline]
    pub fn partitioner(&self) -> Option<&SectorPartitioner> {
        self.partitioner.as_ref()
    }

    pub(crate) fn partitioner_mut(&mut self) -> Option<&mut SectorPartitioner> {
        self.partitioner.as_mut()
    }

    /// Split the sector's triangle soup into per-cell input cells.
    pub(crate) fn prepare_input(&mut self, partition: &SquarePartition) {
        self.input_cells = build_input_cells(&self.sector.input.triangles, partition);
        log::debug!(
            "sector '{}': {} input cells",
            self.sector.name,
            self.input_cells.len()
        );
    }

    /// The prepared input cells.
    #[inline]
    pub fn input_cells(&self) -> &[InputCell] {
        &self.input_cells
    }

    /// The input cell at a position, if the sector covers it.
    pub fn input_cell_at(&self, pos: CellPos) -> Option<&InputCell> {
        self.input_cells.iter().find(|cell| cell.cell_pos == pos)
    }

    /// Whether this sector's generation stage has completed.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Index entries for the elements this sector produced.
    #[inline]
    pub fn produced_entries(&self) -> &[PathDataIndexEntry] {
        &self.produced
    }

    pub(crate) fn record_produced(&mut self, entry: PathDataIndexEntry) {
        self.produced.push(entry);
    }

    pub(crate) fn mark_generated(&mut self) {
        self.generated = true;
    }

    /// Drop the state of a previous run.
    pub(crate) fn reset_run(&mut self) {
        self.input_cells.clear();
        self.produced.clear();
        self.generated = false;
        if let Some(partitioner) = self.partitioner.as_mut() {
            partitioner.reset();
        }
    }
}

/// Re-partitions one sector's region into square sub-sectors.
///
/// Each sub-sector gets a name derived from the sector's (`<name>_<tx>_<ty>`
/// for tile `(tx, ty)`) and a GUID derived deterministically from the
/// sector's GUID and the tile position.
#[derive(Debug)]
pub struct SectorPartitioner {
    cells_per_side: i32,
    planned: Vec<PathDataIndexEntry>,
    partitioned: bool,
}

impl SectorPartitioner {
    /// Create a partitioner producing tiles of `cells_per_side` cells.
    ///
    /// # Errors
    /// `InvalidConfig` when `cells_per_side < 1`.
    pub fn new(cells_per_side: i32) -> Result<Self> {
        if cells_per_side < 1 {
            return Err(GenError::InvalidConfig {
                message: "partitioner tile side must be >= 1 cell".into(),
            });
        }
        Ok(Self {
            cells_per_side,
            planned: Vec::new(),
            partitioned: false,
        })
    }

    /// Tile side in cells.
    #[inline]
    pub fn cells_per_side(&self) -> i32 {
        self.cells_per_side
    }

    /// Whether [`partition`](Self::partition) has run.
    #[inline]
    pub fn is_partitioned(&self) -> bool {
        self.partitioned
    }

    /// The sub-sector entries planned by the last partition run.
    #[inline]
    pub fn planned_entries(&self) -> &[PathDataIndexEntry] {
        &self.planned
    }

    pub(crate) fn reset(&mut self) {
        self.planned.clear();
        self.partitioned = false;
    }

    /// Split `cell_box` into tiles, keeping only tiles that cover at least
    /// one occupied cell. Returns the planned entries.
    pub fn partition(
        &mut self,
        sector_name: &str,
        sector_guid: Guid,
        cell_box: &CellBox,
        occupied_cells: &[CellPos],
    ) -> &[PathDataIndexEntry] {
        self.planned.clear();
        let side = self.cells_per_side;

        let tiles_x = (cell_box.count_x() + side - 1) / side;
        let tiles_y = (cell_box.count_y() + side - 1) / side;
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let min = CellPos::new(
                    cell_box.min.x + tx * side,
                    cell_box.min.y + ty * side,
                );
                let max = CellPos::new(
                    (min.x + side - 1).min(cell_box.max.x),
                    (min.y + side - 1).min(cell_box.max.y),
                );
                let tile = CellBox::new(min, max);
                if !occupied_cells.iter().any(|&pos| tile.contains(pos)) {
                    continue;
                }
                let name = format!("{}_{}_{}", sector_name, tx, ty);
                self.planned.push(PathDataIndexEntry {
                    guid_compound: GuidCompound::single(derive_sub_guid(sector_guid, tx, ty)),
                    cell_box: tile,
                    file_name: format!("{}.pathdata", name),
                });
            }
        }
        self.partitioned = true;
        &self.planned
    }
}

/// Deterministic GUID for tile `(tx, ty)` of the sector identified by `guid`.
fn derive_sub_guid(guid: Guid, tx: i32, ty: i32) -> Guid {
    let mut bytes = *guid.as_bytes();
    for (slot, byte) in bytes[8..12].iter_mut().zip(tx.to_le_bytes()) {
        *slot ^= byte;
    }
    for (slot, byte) in bytes[12..16].iter_mut().zip(ty.to_le_bytes()) {
        *slot ^= byte;
    }
    // Marker bit distinguishing a derived GUID from its parent.
    bytes[7] ^= 0x80;
    Guid::from_bytes(bytes)
}
