//! Grid of cells, each holding the domain of variants still possible there.
//!
//! Cells are stored flat with index `x + y * size_x + z * size_x * height`.
//! A domain only ever shrinks: the only mutators are [`Domain::collapse_to`]
//! and [`Domain::narrow_to`], and both refuse to add variants.

use super::catalog::{TileCatalog, TileIndex};
use super::direction::Direction;
use bevy::math::IVec3;
use std::fmt;

/// Errors constructing a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// At least one dimension is zero
    ZeroSized { size_x: usize, height: usize, size_z: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ZeroSized {
                size_x,
                height,
                size_z,
            } => write!(
                f,
                "grid dimensions must be non-zero, got {}x{}x{}",
                size_x, height, size_z
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Set of variants still possible at a cell, kept sorted by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    tiles: Vec<TileIndex>,
}

impl Domain {
    /// Every variant of a catalog of `count` tiles.
    pub fn full(count: usize) -> Self {
        Self {
            tiles: (0..count).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.tiles.len() == 1
    }

    pub fn contains(&self, tile: TileIndex) -> bool {
        self.tiles.binary_search(&tile).is_ok()
    }

    pub fn tiles(&self) -> &[TileIndex] {
        &self.tiles
    }

    /// The single remaining variant, if collapsed.
    pub fn collapsed_tile(&self) -> Option<TileIndex> {
        match self.tiles.as_slice() {
            [tile] => Some(*tile),
            _ => None,
        }
    }

    /// Narrow to exactly `tile`. Returns false (and leaves the domain alone)
    /// if `tile` is not currently possible.
    pub fn collapse_to(&mut self, tile: TileIndex) -> bool {
        if !self.contains(tile) {
            return false;
        }
        self.tiles.clear();
        self.tiles.push(tile);
        true
    }

    /// Keep only the variants for which `keep` returns true.
    /// Returns how many variants were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(TileIndex) -> bool) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|&t| keep(t));
        before - self.tiles.len()
    }

    /// Replace the domain with `subset`. Variants outside the current domain
    /// are dropped, so this can never grow it. Returns the new size.
    pub fn narrow_to(&mut self, subset: &[TileIndex]) -> usize {
        self.tiles.retain(|t| subset.contains(t));
        self.tiles.len()
    }
}

/// One grid position and its domain.
#[derive(Debug, Clone)]
pub struct Cell {
    pub pos: IVec3,
    pub domain: Domain,
}

/// Fixed-size 3-D container of cells.
#[derive(Debug, Clone)]
pub struct Grid {
    size_x: usize,
    height: usize,
    size_z: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid where every cell may still be any of `catalog_len` variants.
    pub fn new(
        size_x: usize,
        height: usize,
        size_z: usize,
        catalog_len: usize,
    ) -> Result<Self, GridError> {
        if size_x == 0 || height == 0 || size_z == 0 {
            return Err(GridError::ZeroSized {
                size_x,
                height,
                size_z,
            });
        }

        let mut cells = Vec::with_capacity(size_x * height * size_z);
        for z in 0..size_z {
            for y in 0..height {
                for x in 0..size_x {
                    cells.push(Cell {
                        pos: IVec3::new(x as i32, y as i32, z as i32),
                        domain: Domain::full(catalog_len),
                    });
                }
            }
        }

        Ok(Self {
            size_x,
            height,
            size_z,
            cells,
        })
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec3) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as usize) < self.size_x
            && (pos.y as usize) < self.height
            && (pos.z as usize) < self.size_z
    }

    /// Flat index of an in-bounds position.
    #[inline]
    pub fn index(&self, pos: IVec3) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(
            pos.x as usize
                + pos.y as usize * self.size_x
                + pos.z as usize * self.size_x * self.height,
        )
    }

    pub fn cell(&self, pos: IVec3) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, pos: IVec3) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        Some(&mut self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// In-bounds neighbor of `pos` across face `dir`.
    pub fn neighbor(&self, pos: IVec3, dir: Direction) -> Option<IVec3> {
        let n = pos + dir.offset();
        self.in_bounds(n).then_some(n)
    }

    /// Faces of `pos` that look out of the map on the horizontal ring
    /// (x = 0, x = size_x - 1, z = 0, z = size_z - 1).
    pub fn outward_faces(&self, pos: IVec3) -> Vec<Direction> {
        let mut faces = Vec::new();
        if pos.x == 0 {
            faces.push(Direction::West);
        }
        if pos.x as usize == self.size_x - 1 {
            faces.push(Direction::East);
        }
        if pos.z == 0 {
            faces.push(Direction::South);
        }
        if pos.z as usize == self.size_z - 1 {
            faces.push(Direction::North);
        }
        faces
    }

    /// Strip from every ring cell the variants whose outward sockets expect a
    /// neighbor. Returns the positions whose domain shrank.
    pub fn apply_boundary_constraints(&mut self, catalog: &TileCatalog) -> Vec<IVec3> {
        let mut shrunk = Vec::new();
        for i in 0..self.cells.len() {
            let pos = self.cells[i].pos;
            let faces = self.outward_faces(pos);
            if faces.is_empty() {
                continue;
            }
            let removed = self.cells[i].domain.retain(|tile| {
                let variant = catalog.variant(tile);
                faces.iter().all(|&dir| variant.socket(dir).is_none())
            });
            if removed > 0 {
                shrunk.push(pos);
            }
        }
        shrunk
    }

    /// Number of cells with exactly one variant left.
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.domain.is_collapsed()).count()
    }

    /// Number of cells with no variant left.
    pub fn gap_count(&self) -> usize {
        self.cells.iter().filter(|c| c.domain.is_empty()).count()
    }

    /// Every cell has domain size 0 or 1.
    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(|c| c.domain.len() <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wfc::catalog::tests::straight_and_empty;

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(3, 1, 4, 2).unwrap();
        assert_eq!(grid.len(), 12);
        for cell in grid.cells() {
            assert_eq!(cell.domain.len(), 2);
        }
        assert_eq!(grid.cell(IVec3::new(2, 0, 3)).unwrap().pos, IVec3::new(2, 0, 3));
    }

    #[test]
    fn test_grid_zero_sized() {
        assert!(matches!(
            Grid::new(0, 1, 3, 2),
            Err(GridError::ZeroSized { .. })
        ));
    }

    #[test]
    fn test_bounds_and_neighbors() {
        let grid = Grid::new(2, 1, 2, 1).unwrap();
        assert!(grid.in_bounds(IVec3::new(1, 0, 1)));
        assert!(!grid.in_bounds(IVec3::new(2, 0, 0)));
        assert!(!grid.in_bounds(IVec3::new(0, -1, 0)));
        assert_eq!(
            grid.neighbor(IVec3::ZERO, Direction::North),
            Some(IVec3::new(0, 0, 1))
        );
        assert_eq!(grid.neighbor(IVec3::ZERO, Direction::West), None);
        assert_eq!(grid.neighbor(IVec3::ZERO, Direction::Top), None);
    }

    #[test]
    fn test_domain_only_shrinks() {
        let mut domain = Domain::full(4);
        assert_eq!(domain.narrow_to(&[1, 2, 7]), 2);
        assert_eq!(domain.tiles(), &[1, 2]);
        // 3 was already gone; narrowing cannot bring it back
        assert_eq!(domain.narrow_to(&[1, 2, 3]), 2);
        assert!(!domain.collapse_to(3));
        assert!(domain.collapse_to(2));
        assert_eq!(domain.collapsed_tile(), Some(2));
    }

    #[test]
    fn test_outward_faces() {
        let grid = Grid::new(3, 1, 3, 1).unwrap();
        assert_eq!(
            grid.outward_faces(IVec3::new(0, 0, 0)),
            vec![Direction::West, Direction::South]
        );
        assert_eq!(
            grid.outward_faces(IVec3::new(2, 0, 2)),
            vec![Direction::East, Direction::North]
        );
        assert!(grid.outward_faces(IVec3::new(1, 0, 1)).is_empty());
    }

    #[test]
    fn test_boundary_constraints() {
        let catalog = straight_and_empty();
        let mut grid = Grid::new(3, 1, 3, catalog.len()).unwrap();
        let shrunk = grid.apply_boundary_constraints(&catalog);

        // Straight has Path north and south, so the z = 0 and z = 2 rows lose it
        assert_eq!(shrunk.len(), 6);
        for x in 0..3 {
            for z in [0, 2] {
                let cell = grid.cell(IVec3::new(x, 0, z)).unwrap();
                assert_eq!(cell.domain.tiles(), &[1]);
            }
            let middle = grid.cell(IVec3::new(x, 0, 1)).unwrap();
            assert_eq!(middle.domain.tiles(), &[0, 1]);
        }
    }
}
