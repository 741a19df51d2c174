//! Error types for the generation pipeline.

use thiserror::Error;

/// Errors that can occur while generating path data.
#[derive(Error, Debug)]
pub enum GenError {
    /// Configuration rejected before generation started.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },

    /// Two sectors share a name or a GUID.
    #[error("duplicate sector name or guid: {name}")]
    DuplicateSector {
        /// The colliding name or GUID.
        name: String,
    },

    /// Two path-data elements resolved to the same GUID compound.
    #[error("duplicate path-data element for compound {compound}")]
    DuplicateElement {
        /// Display form of the compound.
        compound: String,
    },

    /// A builder was asked to build from a source that has not completed
    /// its own generation stage. Fatal for that build call.
    #[error("upstream source '{name}' has not completed generation")]
    SourceNotReady {
        /// Name of the unfinished source.
        name: String,
    },

    /// A navmesh build was attempted over an empty dynamic-cell collection.
    #[error("navmesh build over an empty dynamic cell collection")]
    EmptyCellCollection,

    /// A dynamic cell lies outside the cell box the builder was given.
    #[error("dynamic cell at ({x}, {y}) lies outside the build cell box")]
    CellOutsideBox {
        /// Cell x coordinate.
        x: i32,
        /// Cell y coordinate.
        y: i32,
    },

    /// A dynamic cell was consumed before `end_columns` finalized it.
    #[error("dynamic cell at ({x}, {y}) was not finalized before use")]
    CellNotFinalized {
        /// Cell x coordinate.
        x: i32,
        /// Cell y coordinate.
        y: i32,
    },

    /// Partition math rejected the configuration.
    #[error(transparent)]
    Core(#[from] pathgen_core::CoreError),

    /// Blob registration or (de)serialization failed.
    #[error(transparent)]
    Blob(#[from] pathgen_blob::BlobError),

    /// Filesystem failure outside the blob layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The generation-parameters dump could not be produced.
    #[error("params dump failed: {0}")]
    ParamsDump(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, GenError>;
