//! Collapse a selected cell to a single variant.

use super::catalog::TileIndex;
use super::grid::Grid;
use crate::rng::GenRng;
use bevy::math::IVec3;

/// Pick one variant of the cell's domain uniformly at random and narrow the
/// domain to it. Returns the chosen variant, or `None` if the position is out
/// of bounds or the domain is already empty.
pub fn collapse_cell(grid: &mut Grid, pos: IVec3, rng: &mut dyn GenRng) -> Option<TileIndex> {
    let cell = grid.cell_mut(pos)?;
    let tiles = cell.domain.tiles();
    if tiles.is_empty() {
        return None;
    }
    let tile = tiles[rng.next_usize_max(tiles.len())];
    cell.domain.collapse_to(tile);
    Some(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StdRandom;

    #[test]
    fn test_collapse_leaves_one_tile_from_domain() {
        let mut grid = Grid::new(1, 1, 1, 5).unwrap();
        grid.cell_mut(IVec3::ZERO).unwrap().domain.narrow_to(&[1, 3]);
        let mut rng = StdRandom::from_u64_seed(11);

        let tile = collapse_cell(&mut grid, IVec3::ZERO, &mut rng).unwrap();
        assert!(tile == 1 || tile == 3);
        assert_eq!(grid.cell(IVec3::ZERO).unwrap().domain.tiles(), &[tile]);
    }

    #[test]
    fn test_collapse_picks_every_option_over_many_seeds() {
        let mut seen = [false; 3];
        for seed in 0..64 {
            let mut grid = Grid::new(1, 1, 1, 3).unwrap();
            let mut rng = StdRandom::from_u64_seed(seed);
            let tile = collapse_cell(&mut grid, IVec3::ZERO, &mut rng).unwrap();
            seen[tile] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_collapse_empty_or_out_of_bounds() {
        let mut grid = Grid::new(1, 1, 1, 2).unwrap();
        let mut rng = StdRandom::from_u64_seed(0);
        assert_eq!(collapse_cell(&mut grid, IVec3::new(4, 0, 0), &mut rng), None);
        grid.cell_mut(IVec3::ZERO).unwrap().domain.narrow_to(&[]);
        assert_eq!(collapse_cell(&mut grid, IVec3::ZERO, &mut rng), None);
    }
}
