//! Sparse per-pixel storage used while a cell's data is still dynamic,
//! before builders flatten it into blobs.

mod column;
mod dynamic_grid;

pub use column::TwoSidedColumn;
pub use dynamic_grid::DynamicGrid;
