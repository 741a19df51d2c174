//! The generation system context.
//!
//! [`GenSystem`] gathers everything global across one generation run:
//! configuration, run options, the square partition derived from them, the
//! blob type registry, the path-data element map and the output directory.
//! The generator constructs and owns it; builders borrow it for the
//! duration of one build.

use std::path::{Path, PathBuf};

use pathgen_blob::{BlobAggregate, BlobTypeRegistry};
use pathgen_core::SquarePartition;

use crate::config::{GlobalConfig, RunOptions};
use crate::element::PathDataElementMap;
use crate::error::Result;
use crate::navmesh::NavMeshBlob;
use crate::pathobject::JumpCandidateBlob;
use crate::raster::RasterCellBlob;

/// Everything global across one generation run.
#[derive(Debug)]
pub struct GenSystem {
    config: GlobalConfig,
    run_options: RunOptions,
    partition: SquarePartition,
    registry: BlobTypeRegistry,
    element_map: PathDataElementMap,
    output_dir: PathBuf,
}

impl GenSystem {
    /// Build a system from validated configuration.
    ///
    /// Registers every blob type the pipeline produces, so the registry is
    /// complete before any builder runs.
    pub fn new(config: GlobalConfig, run_options: RunOptions, output_dir: PathBuf) -> Result<Self> {
        config.validate()?;
        let partition = config.partition()?;

        let mut registry = BlobTypeRegistry::new();
        registry.register::<NavMeshBlob>()?;
        registry.register::<JumpCandidateBlob>()?;
        registry.register::<RasterCellBlob>()?;
        registry.register::<crate::index::PathDataIndexBlob>()?;

        Ok(Self {
            config,
            run_options,
            partition,
            registry,
            element_map: PathDataElementMap::new(),
            output_dir,
        })
    }

    /// The generation configuration.
    #[inline]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// The run options.
    #[inline]
    pub fn run_options(&self) -> &RunOptions {
        &self.run_options
    }

    /// The pixel/cell partition.
    #[inline]
    pub fn partition(&self) -> &SquarePartition {
        &self.partition
    }

    /// The blob type registry for this run.
    #[inline]
    pub fn registry(&self) -> &BlobTypeRegistry {
        &self.registry
    }

    /// The path-data element map.
    #[inline]
    pub fn element_map(&self) -> &PathDataElementMap {
        &self.element_map
    }

    pub(crate) fn element_map_mut(&mut self) -> &mut PathDataElementMap {
        &mut self.element_map
    }

    /// The directory persisted files go to.
    #[inline]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Full path of an output file `<stem>.<extension>`.
    pub fn output_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, extension))
    }

    /// Save an aggregate under the run's output byte order.
    pub fn save_aggregate(
        &self,
        aggregate: &BlobAggregate<'_>,
        stem: &str,
        extension: &str,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(stem, extension);
        let endianness = self.run_options.output_endianness.resolve();
        aggregate.save_to_file(&path, endianness)?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> GenSystem {
        GenSystem::new(
            GlobalConfig::default(),
            RunOptions::default(),
            std::env::temp_dir().join("pathgen_system_test"),
        )
        .unwrap()
    }

    #[test]
    fn test_all_pipeline_blob_types_registered() {
        let sys = system();
        for name in ["NavMesh", "JumpCandidates", "RasterCell", "PathDataIndex"] {
            assert!(sys.registry().lookup(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GlobalConfig {
            entity_height: -1.0,
            ..GlobalConfig::default()
        };
        assert!(GenSystem::new(config, RunOptions::default(), PathBuf::from("/tmp")).is_err());
    }

    #[test]
    fn test_output_path_shape() {
        let sys = system();
        let path = sys.output_path("sector_a", "pathdata");
        assert!(path.to_string_lossy().ends_with("sector_a.pathdata"));
    }
}
