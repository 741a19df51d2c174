//! Generation configuration.
//!
//! [`GlobalConfig`] controls the characteristics of the generated data
//! (raster density, entity dimensions, jump detection); [`RunOptions`]
//! controls how one run behaves (which outputs are written, in which byte
//! order). Both are plain values copied into the system context at
//! generation time, and both serialize with serde so a run can dump the
//! exact parameters it used.

use pathgen_blob::Endianness;
use pathgen_core::SquarePartition;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Parameters shared by every sector of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// World size of one raster pixel.
    pub raster_precision: f32,
    /// Pixels on a generation-cell side.
    pub pixels_per_cell: i32,
    /// Extra pixels rasterized around each cell so neighbor geometry
    /// contributes to border pixels.
    pub pixel_enlargement: i32,
    /// Height of the walking entity; floors with less clearance merge.
    pub entity_height: f32,
    /// Radius of the walking entity.
    pub entity_radius: f32,
    /// Altitude quantum separating floor layers during rasterization.
    pub altitude_layer_height: f32,
    /// Smallest drop recorded as a jump candidate.
    pub jump_min_drop: f32,
    /// Largest drop recorded as a jump candidate.
    pub jump_max_drop: f32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            raster_precision: 0.25,
            pixels_per_cell: 16,
            pixel_enlargement: 2,
            entity_height: 1.8,
            entity_radius: 0.4,
            altitude_layer_height: 0.5,
            jump_min_drop: 1.0,
            jump_max_drop: 4.0,
        }
    }
}

impl GlobalConfig {
    /// Build the pixel/cell partition implied by this configuration.
    pub fn partition(&self) -> Result<SquarePartition> {
        Ok(SquarePartition::new(
            self.raster_precision,
            self.pixels_per_cell,
            self.pixel_enlargement,
        )?)
    }

    /// Validate the parameters that the partition does not already check.
    pub fn validate(&self) -> Result<()> {
        if !(self.entity_height > 0.0) {
            return Err(GenError::InvalidConfig {
                message: "entity height must be > 0".into(),
            });
        }
        if !(self.altitude_layer_height > 0.0) {
            return Err(GenError::InvalidConfig {
                message: "altitude layer height must be > 0".into(),
            });
        }
        if self.jump_min_drop > self.jump_max_drop {
            return Err(GenError::InvalidConfig {
                message: "jump drop range is inverted".into(),
            });
        }
        // partition() re-validates precision/pixel counts
        self.partition().map(|_| ())
    }
}

/// Byte order requested for persisted output.
///
/// Mirrors [`Endianness`] with an extra `Host` value so run options stay
/// plain data (and serde-serializable) without reaching into the blob
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputEndianness {
    /// Whatever the generating machine uses.
    #[default]
    Host,
    /// Force little-endian output.
    Little,
    /// Force big-endian output.
    Big,
}

impl OutputEndianness {
    /// Resolve to a concrete byte order.
    pub fn resolve(self) -> Endianness {
        match self {
            OutputEndianness::Host => Endianness::host(),
            OutputEndianness::Little => Endianness::Little,
            OutputEndianness::Big => Endianness::Big,
        }
    }
}

/// Options controlling one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Write the final `.pathdata` aggregate per element.
    pub write_pathdata: bool,
    /// Also write intermediate raster data into each aggregate.
    pub write_intermediate_data: bool,
    /// Byte order of all persisted output.
    pub output_endianness: OutputEndianness,
    /// When set, dump all generation parameters to this file (RON).
    pub params_dump_file: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            write_pathdata: true,
            write_intermediate_data: false,
            output_endianness: OutputEndianness::Host,
            params_dump_file: None,
        }
    }
}
