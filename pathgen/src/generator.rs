//! The generation pipeline driver.
//!
//! One [`Generator`] runs the whole batch pipeline for its sectors,
//! sequentially and in a fixed order:
//!
//! ```text
//! prepare inputs -> global cell grid -> path-data elements
//!     -> per-element raster + builders -> .pathdata aggregates
//!     -> path-data index -> params dump
//! ```
//!
//! Cells covered by several sectors become their own overlap elements so
//! the data of each sector can still stream independently at runtime.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use pathgen_blob::BlobAggregate;
use pathgen_core::{CellBox, CellPos, GuidCompound};
use serde::Serialize;

use crate::config::{GlobalConfig, RunOptions};
use crate::element::PathDataElement;
use crate::error::{GenError, Result};
use crate::index::{IndexSource, PathDataIndexBlobBuilder, PathDataIndexEntry};
use crate::input::{ExplicitPathObject, InputCell};
use crate::navmesh::{NavMeshBlobBuilder, NavMeshBuildFlags};
use crate::pathobject::JumpCandidateBlobBuilder;
use crate::raster::{DynamicCell, MergeStatus, RasterCellBlobBuilder};
use crate::sector::{Sector, SectorGenerator, SectorPartitioner};
use crate::system::GenSystem;

/// The principal object of the pipeline: sectors in, path data out.
#[derive(Debug)]
pub struct Generator {
    name: String,
    sys: GenSystem,
    sector_generators: Vec<SectorGenerator>,
    global_grid: HashMap<CellPos, Vec<usize>>,
    build_flags: NavMeshBuildFlags,
    generated: bool,
}

impl Generator {
    /// Create a generator writing into `output_dir`.
    pub fn new(
        config: GlobalConfig,
        run_options: RunOptions,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            name: String::from("Generator"),
            sys: GenSystem::new(config, run_options, output_dir.into())?,
            sector_generators: Vec::new(),
            global_grid: HashMap::new(),
            build_flags: NavMeshBuildFlags::NONE,
            generated: false,
        })
    }

    /// Name used for the `.pathdataindex` file stem.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the generator.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The system context of this run.
    #[inline]
    pub fn system(&self) -> &GenSystem {
        &self.sys
    }

    /// Flags applied to every navmesh build.
    pub fn set_build_flags(&mut self, flags: NavMeshBuildFlags) {
        self.build_flags = flags;
    }

    /// Add a sector.
    ///
    /// # Errors
    /// `DuplicateSector` when the name or GUID is already taken.
    pub fn add_sector(&mut self, sector: Sector) -> Result<()> {
        self.check_unique(&sector)?;
        self.sector_generators.push(SectorGenerator::new(sector));
        Ok(())
    }

    /// Add a sector whose output will be re-partitioned into smaller
    /// sub-sectors.
    pub fn add_sector_with_partitioner(
        &mut self,
        sector: Sector,
        partitioner: SectorPartitioner,
    ) -> Result<()> {
        self.check_unique(&sector)?;
        self.sector_generators
            .push(SectorGenerator::with_partitioner(sector, partitioner));
        Ok(())
    }

    fn check_unique(&self, sector: &Sector) -> Result<()> {
        for existing in &self.sector_generators {
            if existing.sector().name == sector.name {
                return Err(GenError::DuplicateSector {
                    name: sector.name.clone(),
                });
            }
            if existing.sector().guid == sector.guid {
                return Err(GenError::DuplicateSector {
                    name: sector.guid.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of sectors added.
    #[inline]
    pub fn sector_count(&self) -> usize {
        self.sector_generators.len()
    }

    /// The per-sector generation state, in insertion order.
    #[inline]
    pub fn sector_generators(&self) -> &[SectorGenerator] {
        &self.sector_generators
    }

    /// Whether [`generate`](Self::generate) has completed.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Run the whole pipeline for every sector.
    ///
    /// Can be called again after adding sectors; the run restarts from
    /// scratch.
    pub fn generate(&mut self) -> Result<()> {
        self.generated = false;
        self.global_grid.clear();
        self.sys.element_map_mut().clear();
        for sector_generator in &mut self.sector_generators {
            sector_generator.reset_run();
        }

        let run_start = Instant::now();

        let start = Instant::now();
        let partition = *self.sys.partition();
        for sector_generator in &mut self.sector_generators {
            sector_generator.prepare_input(&partition);
        }
        log_phase("prepare inputs", start);

        let start = Instant::now();
        self.make_global_grid();
        log_phase("global cell grid", start);

        let start = Instant::now();
        self.make_path_data_elements()?;
        log_phase("path-data elements", start);

        let start = Instant::now();
        self.generate_sectors()?;
        log_phase("sector generation", start);

        self.generated = true;

        if self.sys.run_options().write_pathdata {
            let start = Instant::now();
            self.save_path_data_index()?;
            log_phase("path-data index", start);
        }

        self.dump_generation_parameters()?;

        log::info!(
            "generated {} elements from {} sectors in {:.1} ms",
            self.sys.element_map().len(),
            self.sector_generators.len(),
            run_start.elapsed().as_secs_f64() * 1e3
        );
        Ok(())
    }

    /// Record which sectors contribute input to each cell.
    fn make_global_grid(&mut self) {
        for (index, sector_generator) in self.sector_generators.iter().enumerate() {
            for input_cell in sector_generator.input_cells() {
                self.global_grid
                    .entry(input_cell.cell_pos)
                    .or_default()
                    .push(index);
            }
        }
    }

    /// Plan one element per distinct contributor set (splitting partitioned
    /// sectors into their tiles).
    fn make_path_data_elements(&mut self) -> Result<()> {
        let mut groups: HashMap<Vec<usize>, Vec<CellPos>> = HashMap::new();
        for (&cell_pos, contributors) in &self.global_grid {
            groups.entry(contributors.clone()).or_default().push(cell_pos);
        }
        let mut groups: Vec<(Vec<usize>, Vec<CellPos>)> = groups.into_iter().collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));

        for (contributors, cells) in groups {
            let cell_box = cells
                .iter()
                .skip(1)
                .fold(CellBox::single(cells[0]), |acc, &pos| {
                    acc.union(&CellBox::single(pos))
                });
            let owner = contributors[0];

            // A lone partitioned sector splits into its tiles; any other
            // group becomes a single element.
            if contributors.len() == 1 {
                let sector_generator = &mut self.sector_generators[owner];
                let sector_name = sector_generator.sector().name.clone();
                let sector_guid = sector_generator.sector().guid;
                if let Some(partitioner) = sector_generator.partitioner_mut() {
                    let planned = partitioner
                        .partition(&sector_name, sector_guid, &cell_box, &cells)
                        .to_vec();

                    for entry in planned {
                        let name = entry
                            .file_name
                            .strip_suffix(".pathdata")
                            .unwrap_or(&entry.file_name)
                            .to_string();
                        self.sys.element_map_mut().insert(PathDataElement {
                            guid_compound: entry.guid_compound,
                            cell_box: entry.cell_box,
                            name,
                            owner_sector: owner,
                            contributing_sectors: contributors.clone(),
                        })?;
                    }
                    continue;
                }
            }

            let guids = contributors
                .iter()
                .map(|&i| self.sector_generators[i].sector().guid)
                .collect();
            let name = contributors
                .iter()
                .map(|&i| self.sector_generators[i].sector().name.as_str())
                .collect::<Vec<_>>()
                .join("+");
            self.sys.element_map_mut().insert(PathDataElement {
                guid_compound: GuidCompound::from_guids(guids),
                cell_box,
                name,
                owner_sector: owner,
                contributing_sectors: contributors,
            })?;
        }
        Ok(())
    }

    /// Rasterize and build every element, owner sector by owner sector.
    fn generate_sectors(&mut self) -> Result<()> {
        let elements: Vec<PathDataElement> =
            self.sys.element_map().iter_sorted().cloned().collect();

        for element in &elements {
            let entry = self.generate_element(element)?;
            self.sector_generators[element.owner_sector].record_produced(entry);
        }
        for sector_generator in &mut self.sector_generators {
            sector_generator.mark_generated();
        }
        Ok(())
    }

    /// Build and persist one element's blobs.
    fn generate_element(&self, element: &PathDataElement) -> Result<PathDataIndexEntry> {
        let sys = &self.sys;
        let partition = sys.partition();
        let config = sys.config();

        let mut dynamic_cells: Vec<DynamicCell> = Vec::new();
        for cell_pos in element.cell_box.iter() {
            let Some(contributors) = self.global_grid.get(&cell_pos) else {
                continue;
            };
            if *contributors != element.contributing_sectors {
                continue;
            }
            let inputs: Vec<&InputCell> = contributors
                .iter()
                .filter_map(|&i| self.sector_generators[i].input_cell_at(cell_pos))
                .collect();

            let mut cell = DynamicCell::new(partition, config, cell_pos);
            cell.rasterize(&inputs);
            cell.end_columns(MergeStatus::MergeEnabled);
            dynamic_cells.push(cell);
        }

        let navmesh = NavMeshBlobBuilder::new(
            sys,
            &element.guid_compound,
            &element.cell_box,
            &dynamic_cells,
            self.build_flags,
        )
        .build()?;

        let owner = &self.sector_generators[element.owner_sector];
        let explicit: Vec<ExplicitPathObject> = owner
            .sector()
            .input
            .path_objects
            .iter()
            .filter(|object| {
                element
                    .cell_box
                    .contains(partition.world_to_cell(object.start))
            })
            .copied()
            .collect();
        let candidates = JumpCandidateBlobBuilder::new(sys, &dynamic_cells, &explicit).build()?;

        let mut aggregate = BlobAggregate::new(sys.registry());
        aggregate.add_blob(&navmesh)?;
        aggregate.add_blob(&candidates)?;
        if sys.run_options().write_intermediate_data {
            for cell in &dynamic_cells {
                aggregate.add_blob(&RasterCellBlobBuilder::new(cell).build()?)?;
            }
        }
        if sys.run_options().write_pathdata {
            sys.save_aggregate(&aggregate, &element.name, "pathdata")?;
        }

        log::debug!(
            "element '{}': {} cells, {} navmesh cells, {} candidates",
            element.name,
            dynamic_cells.len(),
            navmesh.cells.len(),
            candidates.candidates.len()
        );

        Ok(PathDataIndexEntry {
            guid_compound: element.guid_compound.clone(),
            cell_box: element.cell_box,
            file_name: format!("{}.pathdata", element.name),
        })
    }

    /// Persist the run's table of contents.
    fn save_path_data_index(&self) -> Result<()> {
        let blob = PathDataIndexBlobBuilder::new(IndexSource::Generator(self)).build()?;
        let mut aggregate = BlobAggregate::new(self.sys.registry());
        aggregate.add_blob(&blob)?;
        self.sys
            .save_aggregate(&aggregate, &self.name, "pathdataindex")?;
        Ok(())
    }

    /// Write a record of every parameter this run used, when asked to.
    fn dump_generation_parameters(&self) -> Result<()> {
        let Some(file_name) = &self.sys.run_options().params_dump_file else {
            return Ok(());
        };

        #[derive(Serialize)]
        struct ParamsDump<'a> {
            name: &'a str,
            config: &'a GlobalConfig,
            run_options: &'a RunOptions,
            sectors: Vec<&'a str>,
        }

        let dump = ParamsDump {
            name: &self.name,
            config: self.sys.config(),
            run_options: self.sys.run_options(),
            sectors: self
                .sector_generators
                .iter()
                .map(|sg| sg.sector().name.as_str())
                .collect(),
        };
        let text = ron::ser::to_string_pretty(&dump, ron::ser::PrettyConfig::default())
            .map_err(|err| GenError::ParamsDump(err.to_string()))?;

        std::fs::create_dir_all(self.sys.output_dir())?;
        std::fs::write(self.sys.output_dir().join(file_name), text)?;
        Ok(())
    }
}

fn log_phase(name: &str, start: Instant) {
    log::info!(
        "phase '{}' finished in {:.1} ms",
        name,
        start.elapsed().as_secs_f64() * 1e3
    );
}
