//! Connection candidates between floors.
//!
//! Connections that cannot be expressed by the navmesh itself (drops, hand
//! placed doors, teleporters) are recorded as candidates and persisted in
//! their own blob. The traversal behavior is a tagged value chosen at
//! construction, not a type hierarchy.

use pathgen_blob::{swap_u32_words, Blob, Endianness, PayloadReader, PayloadWriter, Result as BlobResult};
use pathgen_core::{PixelPos, Vec3};

use crate::error::{GenError, Result};
use crate::input::ExplicitPathObject;
use crate::raster::DynamicCell;
use crate::system::GenSystem;

/// How an entity traverses a connection candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathObjectKind {
    /// A detected drop the entity can jump down.
    Jump,
    /// A hand-placed door between two positions.
    Door,
    /// A hand-placed instantaneous teleport.
    Teleporter,
}

impl PathObjectKind {
    /// Wire value of the kind.
    pub const fn to_u32(self) -> u32 {
        match self {
            PathObjectKind::Jump => 0,
            PathObjectKind::Door => 1,
            PathObjectKind::Teleporter => 2,
        }
    }

    /// Decode a wire value.
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(PathObjectKind::Jump),
            1 => Some(PathObjectKind::Door),
            2 => Some(PathObjectKind::Teleporter),
            _ => None,
        }
    }
}

/// One connection candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathObjectCandidate {
    /// Traversal behavior.
    pub kind: PathObjectKind,
    /// Entry position.
    pub start: Vec3,
    /// Exit position.
    pub end: Vec3,
}

/// The connection candidates generated for one element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JumpCandidateBlob {
    /// All candidates, detected jumps first, explicit objects after.
    pub candidates: Vec<PathObjectCandidate>,
}

impl Blob for JumpCandidateBlob {
    const BLOB_TYPE: &'static str = "JumpCandidates";
    const BLOB_VERSION: u32 = 1;

    fn write_payload(&self, w: &mut PayloadWriter<'_>) -> BlobResult<()> {
        w.write_u32(self.candidates.len() as u32);
        for candidate in &self.candidates {
            w.write_u32(candidate.kind.to_u32());
            for v in [candidate.start, candidate.end] {
                w.write_f32(v.x);
                w.write_f32(v.y);
                w.write_f32(v.z);
            }
        }
        Ok(())
    }

    fn read_payload(r: &mut PayloadReader<'_>) -> BlobResult<Self> {
        let count = r.read_u32()?;
        let mut candidates = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = PathObjectKind::from_u32(r.read_u32()?).ok_or(
                pathgen_blob::BlobError::InvalidFormat {
                    message: "unknown path object kind",
                },
            )?;
            let mut points = [Vec3::default(); 2];
            for point in &mut points {
                *point = Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
            }
            candidates.push(PathObjectCandidate {
                kind,
                start: points[0],
                end: points[1],
            });
        }
        Ok(Self { candidates })
    }

    fn swap_payload(bytes: &mut [u8], _from: Endianness) -> BlobResult<()> {
        // count + (kind + 2 points) per candidate: 32-bit words throughout
        swap_u32_words(bytes)
    }
}

/// Builds one [`JumpCandidateBlob`] from finalized per-cell raster data
/// plus a sector's hand-placed objects.
///
/// Jump candidates are detected wherever the top floors of two adjacent
/// pixels differ by a drop inside the configured range; the candidate runs
/// from the higher pixel down to the lower one.
pub struct JumpCandidateBlobBuilder<'a> {
    system: &'a GenSystem,
    cells: &'a [DynamicCell],
    explicit: &'a [ExplicitPathObject],
}

impl<'a> JumpCandidateBlobBuilder<'a> {
    /// Bind a builder to its system context and data.
    pub fn new(
        system: &'a GenSystem,
        cells: &'a [DynamicCell],
        explicit: &'a [ExplicitPathObject],
    ) -> Self {
        Self {
            system,
            cells,
            explicit,
        }
    }

    /// Build the blob.
    ///
    /// # Errors
    /// `CellNotFinalized` when a dynamic cell's columns were never ended.
    pub fn build(self) -> Result<JumpCandidateBlob> {
        for cell in self.cells {
            if !cell.is_finalized() {
                let pos = cell.cell_pos();
                return Err(GenError::CellNotFinalized { x: pos.x, y: pos.y });
            }
        }

        let config = self.system.config();
        let partition = self.system.partition();
        let mut candidates = Vec::new();

        for cell in self.cells {
            let exact_box = partition.pixel_box_of_cell(cell.cell_pos());
            for y in exact_box.min.y..=exact_box.max.y {
                for x in exact_box.min.x..=exact_box.max.x {
                    let pos = PixelPos::new(x, y);
                    let Some(top) = cell.top_floor(pos) else {
                        continue;
                    };
                    for (dx, dy) in [(1, 0), (0, 1)] {
                        let neighbor = PixelPos::new(x + dx, y + dy);
                        let Some(neighbor_top) = cell.top_floor(neighbor) else {
                            continue;
                        };
                        let drop = (top.altitude - neighbor_top.altitude).abs();
                        if drop < config.jump_min_drop || drop > config.jump_max_drop {
                            continue;
                        }
                        let (high_pos, high_alt, low_pos, low_alt) =
                            if top.altitude >= neighbor_top.altitude {
                                (pos, top.altitude, neighbor, neighbor_top.altitude)
                            } else {
                                (neighbor, neighbor_top.altitude, pos, top.altitude)
                            };
                        candidates.push(PathObjectCandidate {
                            kind: PathObjectKind::Jump,
                            start: partition.pixel_center(high_pos, high_alt),
                            end: partition.pixel_center(low_pos, low_alt),
                        });
                    }
                }
            }
        }

        for object in self.explicit {
            candidates.push(PathObjectCandidate {
                kind: object.kind,
                start: object.start,
                end: object.end,
            });
        }

        Ok(JumpCandidateBlob { candidates })
    }
}
