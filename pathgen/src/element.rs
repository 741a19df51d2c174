//! The path-data element map.
//!
//! One *element* is the unit of generated data: everything produced for
//! one GUID compound (a plain sector, or the overlap region of several).
//! The map is populated once while the generator plans a run and is
//! read-only afterwards; it owns its elements.

use std::collections::HashMap;

use pathgen_core::{CellBox, GuidCompound};

use crate::error::{GenError, Result};

/// One planned unit of generated path data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDataElement {
    /// The sectors contributing to this element.
    pub guid_compound: GuidCompound,
    /// The cells this element covers.
    pub cell_box: CellBox,
    /// Output file stem (`<stem>.pathdata`).
    pub name: String,
    /// Index of the sector whose generator produces this element.
    pub owner_sector: usize,
    /// Indices of every contributing sector.
    pub contributing_sectors: Vec<usize>,
}

/// Associative index from GUID compound to element.
#[derive(Debug, Default)]
pub struct PathDataElementMap {
    elements: HashMap<GuidCompound, PathDataElement>,
}

impl PathDataElementMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element keyed by its compound.
    ///
    /// # Errors
    /// `DuplicateElement` when the compound is already present.
    pub fn insert(&mut self, element: PathDataElement) -> Result<()> {
        if self.elements.contains_key(&element.guid_compound) {
            return Err(GenError::DuplicateElement {
                compound: element.guid_compound.to_string(),
            });
        }
        self.elements.insert(element.guid_compound.clone(), element);
        Ok(())
    }

    /// Look up the element for a compound. `None` when absent.
    pub fn get(&self, compound: &GuidCompound) -> Option<&PathDataElement> {
        self.elements.get(compound)
    }

    /// Iterate all elements in stable (name) order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &PathDataElement> {
        let mut elements: Vec<&PathDataElement> = self.elements.values().collect();
        elements.sort_by(|a, b| a.name.cmp(&b.name));
        elements.into_iter()
    }

    /// Elements owned by the given sector, in stable order.
    pub fn owned_by(&self, sector: usize) -> impl Iterator<Item = &PathDataElement> {
        self.iter_sorted()
            .filter(move |element| element.owner_sector == sector)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the map holds no element.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
