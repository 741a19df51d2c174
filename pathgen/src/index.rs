//! The path-data index blob and its builder.
//!
//! The index is the run's table of contents: one entry per generated
//! element, naming the sectors behind it, the region it covers, and the
//! aggregate file holding its data. Three different upstream sources (the
//! whole generator, a sector partitioner, a single sector generator) can
//! produce the same index format, so the builder is one type over a tagged
//! source rather than a hierarchy.

use pathgen_blob::{
    Blob, Endianness, PayloadReader, PayloadSwapper, PayloadWriter, Result as BlobResult,
};
use pathgen_core::{CellBox, GuidCompound};

use crate::error::{GenError, Result};
use crate::generator::Generator;
use crate::sector::{SectorGenerator, SectorPartitioner};

/// One element recorded in a path-data index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDataIndexEntry {
    /// Sectors the element was generated from.
    pub guid_compound: GuidCompound,
    /// Region the element covers.
    pub cell_box: CellBox,
    /// File holding the element's aggregate.
    pub file_name: String,
}

/// Table of contents of a generation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathDataIndexBlob {
    /// Entries in stable (file name) order.
    pub entries: Vec<PathDataIndexEntry>,
}

impl Blob for PathDataIndexBlob {
    const BLOB_TYPE: &'static str = "PathDataIndex";
    const BLOB_VERSION: u32 = 1;

    fn write_payload(&self, w: &mut PayloadWriter<'_>) -> BlobResult<()> {
        w.write_u32(self.entries.len() as u32);
        for entry in &self.entries {
            w.write_u32(entry.guid_compound.len() as u32);
            for guid in entry.guid_compound.guids() {
                w.write_guid(guid);
            }
            w.write_cell_box(&entry.cell_box);
            w.write_str(&entry.file_name);
        }
        Ok(())
    }

    fn read_payload(r: &mut PayloadReader<'_>) -> BlobResult<Self> {
        let entry_count = r.read_u32()?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let guid_count = r.read_u32()?;
            let mut guids = Vec::with_capacity(guid_count as usize);
            for _ in 0..guid_count {
                guids.push(r.read_guid()?);
            }
            entries.push(PathDataIndexEntry {
                guid_compound: GuidCompound::from_guids(guids),
                cell_box: r.read_cell_box()?,
                file_name: r.read_str()?,
            });
        }
        Ok(Self { entries })
    }

    fn swap_payload(bytes: &mut [u8], from: Endianness) -> BlobResult<()> {
        let mut swapper = PayloadSwapper::new(bytes, from);
        let entry_count = swapper.swap_u32()?;
        for _ in 0..entry_count {
            let guid_count = swapper.swap_u32()? as usize;
            swapper.skip_bytes(guid_count * 16)?;
            swapper.swap_u32_run(4)?; // cell box
            swapper.swap_str()?;
        }
        if !swapper.is_done() {
            return Err(pathgen_blob::BlobError::InvalidFormat {
                message: "index payload has trailing bytes",
            });
        }
        Ok(())
    }
}

/// The upstream source a path-data index is built from.
pub enum IndexSource<'a> {
    /// Every element of a completed generation run.
    Generator(&'a Generator),
    /// The sub-sectors planned by a partitioner that has run.
    Partitioner(&'a SectorPartitioner),
    /// The elements produced by one completed sector generator.
    Sector(&'a SectorGenerator),
}

/// Builds one [`PathDataIndexBlob`] from its bound source.
///
/// The builder fails, rather than producing a partial index, when its
/// source has not completed its own generation stage.
pub struct PathDataIndexBlobBuilder<'a> {
    source: IndexSource<'a>,
}

impl<'a> PathDataIndexBlobBuilder<'a> {
    /// Bind a builder to one upstream source.
    pub fn new(source: IndexSource<'a>) -> Self {
        Self { source }
    }

    /// Build the index blob.
    ///
    /// # Errors
    /// `SourceNotReady` when the bound source has not finished generating
    /// (or, for a partitioner, has not partitioned anything yet).
    pub fn build(self) -> Result<PathDataIndexBlob> {
        let entries = match self.source {
            IndexSource::Generator(generator) => {
                if !generator.is_generated() {
                    return Err(GenError::SourceNotReady {
                        name: generator.name().to_string(),
                    });
                }
                generator
                    .system()
                    .element_map()
                    .iter_sorted()
                    .map(|element| PathDataIndexEntry {
                        guid_compound: element.guid_compound.clone(),
                        cell_box: element.cell_box,
                        file_name: format!("{}.pathdata", element.name),
                    })
                    .collect()
            }
            IndexSource::Partitioner(partitioner) => {
                if !partitioner.is_partitioned() {
                    return Err(GenError::SourceNotReady {
                        name: "sector partitioner".to_string(),
                    });
                }
                partitioner.planned_entries().to_vec()
            }
            IndexSource::Sector(sector_generator) => {
                if !sector_generator.is_generated() {
                    return Err(GenError::SourceNotReady {
                        name: sector_generator.sector().name.clone(),
                    });
                }
                sector_generator.produced_entries().to_vec()
            }
        };
        Ok(PathDataIndexBlob { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathgen_core::{CellPos, Guid};

    fn entry(tag: u8, name: &str) -> PathDataIndexEntry {
        PathDataIndexEntry {
            guid_compound: GuidCompound::single(Guid::from_bytes([tag; 16])),
            cell_box: CellBox::new(CellPos::new(-2, 0), CellPos::new(3, 5)),
            file_name: format!("{}.pathdata", name),
        }
    }

    #[test]
    fn test_payload_roundtrip() {
        let blob = PathDataIndexBlob {
            entries: vec![entry(1, "alpha"), entry(2, "beta")],
        };
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::host());
        blob.write_payload(&mut w).unwrap();

        let mut r = PayloadReader::new(&payload, Endianness::host());
        let back = PathDataIndexBlob::read_payload(&mut r).unwrap();
        assert_eq!(back, blob);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_swap_twice_restores_payload() {
        let blob = PathDataIndexBlob {
            entries: vec![entry(7, "g"), entry(9, "with_longer_name")],
        };
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::Big);
        blob.write_payload(&mut w).unwrap();
        let original = payload.clone();

        PathDataIndexBlob::swap_payload(&mut payload, Endianness::Big).unwrap();
        PathDataIndexBlob::swap_payload(&mut payload, Endianness::Little).unwrap();
        assert_eq!(payload, original);
    }

    #[test]
    fn test_swap_converts_for_foreign_reader() {
        let blob = PathDataIndexBlob {
            entries: vec![entry(3, "cross")],
        };
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::Big);
        blob.write_payload(&mut w).unwrap();

        PathDataIndexBlob::swap_payload(&mut payload, Endianness::Big).unwrap();
        let mut r = PayloadReader::new(&payload, Endianness::Little);
        let back = PathDataIndexBlob::read_payload(&mut r).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_unpartitioned_source_not_ready() {
        let partitioner = SectorPartitioner::new(2).unwrap();
        let builder = PathDataIndexBlobBuilder::new(IndexSource::Partitioner(&partitioner));
        assert!(matches!(
            builder.build(),
            Err(GenError::SourceNotReady { .. })
        ));
    }

    #[test]
    fn test_ungenerated_sector_source_not_ready() {
        let sector_generator =
            SectorGenerator::new(crate::sector::Sector::new("s", Guid::from_bytes([1; 16])));
        let builder = PathDataIndexBlobBuilder::new(IndexSource::Sector(&sector_generator));
        assert!(matches!(
            builder.build(),
            Err(GenError::SourceNotReady { name }) if name == "s"
        ));
    }
}
