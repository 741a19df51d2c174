//! Per-pixel column grid over a pixel box.

use pathgen_core::{PixelBox, PixelPos};

use super::column::TwoSidedColumn;

/// A dense 2D arrangement of sparse columns, one per pixel of a box.
///
/// The grid owns its columns and their elements. Columns are created
/// lazily on first write; a pixel that was never written reads back as an
/// absent column.
#[derive(Debug)]
pub struct DynamicGrid<T> {
    pixel_box: PixelBox,
    columns: Vec<Option<TwoSidedColumn<T>>>,
}

impl<T> DynamicGrid<T> {
    /// Create an empty grid covering `pixel_box`.
    pub fn new(pixel_box: PixelBox) -> Self {
        let mut columns = Vec::new();
        columns.resize_with(pixel_box.pixel_count(), || None);
        Self { pixel_box, columns }
    }

    /// The box this grid covers.
    #[inline]
    pub fn pixel_box(&self) -> &PixelBox {
        &self.pixel_box
    }

    /// The column at `pos`, if that pixel was ever written.
    pub fn column(&self, pos: PixelPos) -> Option<&TwoSidedColumn<T>> {
        let index = self.pixel_box.row_major_index(pos)?;
        self.columns[index].as_ref()
    }

    /// The column at `pos`, creating it if absent.
    ///
    /// Returns `None` only when `pos` lies outside the grid's box.
    pub fn column_or_create(&mut self, pos: PixelPos) -> Option<&mut TwoSidedColumn<T>> {
        let index = self.pixel_box.row_major_index(pos)?;
        Some(self.columns[index].get_or_insert_with(TwoSidedColumn::new))
    }

    /// Number of pixels whose column holds at least one populated row.
    pub fn occupied_pixel_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| column.as_ref().is_some_and(|c| !c.is_empty()))
            .count()
    }

    /// Whether no pixel holds any populated row.
    pub fn is_empty(&self) -> bool {
        self.occupied_pixel_count() == 0
    }

    /// Iterate pixels with a non-empty column, row-major.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (PixelPos, &TwoSidedColumn<T>)> {
        let pixel_box = self.pixel_box;
        self.columns.iter().enumerate().filter_map(move |(i, column)| {
            let column = column.as_ref()?;
            if column.is_empty() {
                return None;
            }
            let count_x = pixel_box.count_x() as usize;
            let pos = PixelPos::new(
                pixel_box.min.x + (i % count_x) as i32,
                pixel_box.min.y + (i / count_x) as i32,
            );
            Some((pos, column))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> DynamicGrid<u32> {
        DynamicGrid::new(PixelBox::new(PixelPos::new(-2, -2), PixelPos::new(2, 2)))
    }

    #[test]
    fn test_unwritten_pixel_has_no_column() {
        let g = grid();
        assert!(g.column(PixelPos::new(0, 0)).is_none());
        assert!(g.is_empty());
    }

    #[test]
    fn test_out_of_box_pixel_rejected() {
        let mut g = grid();
        assert!(g.column_or_create(PixelPos::new(3, 0)).is_none());
        assert!(g.column(PixelPos::new(3, 0)).is_none());
    }

    #[test]
    fn test_write_then_read_column() {
        let mut g = grid();
        *g.column_or_create(PixelPos::new(-2, 1))
            .unwrap()
            .get_or_create(-3) = 7;

        let column = g.column(PixelPos::new(-2, 1)).unwrap();
        assert_eq!(column.get(-3), Some(&7));
        assert_eq!(g.occupied_pixel_count(), 1);
    }

    #[test]
    fn test_iter_occupied_positions() {
        let mut g = grid();
        g.column_or_create(PixelPos::new(0, 0)).unwrap().get_or_create(0);
        g.column_or_create(PixelPos::new(2, -2)).unwrap().get_or_create(1);
        // A created-but-never-populated column is not occupied.
        g.column_or_create(PixelPos::new(1, 1));

        let positions: Vec<PixelPos> = g.iter_occupied().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![PixelPos::new(2, -2), PixelPos::new(0, 0)]);
    }
}
