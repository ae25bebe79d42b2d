//! Lowest-entropy cell selection.
//!
//! Entropy here is simply the domain size. Collapsed cells (size 1) are done,
//! empty cells (size 0) are known gaps; neither is a candidate.

use super::grid::Grid;
use crate::rng::GenRng;
use bevy::log::trace;
use bevy::math::IVec3;

/// Result of one scan over the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every cell with the minimum domain size above 1, in scan order.
    Candidates { entropy: usize, cells: Vec<IVec3> },
    /// No cell has more than one option left.
    Complete,
}

/// Scan every cell and return the minimum-entropy candidates.
pub fn lowest_entropy_cells(grid: &Grid) -> Selection {
    let mut min_entropy = usize::MAX;
    let mut cells = Vec::new();

    for cell in grid.cells() {
        let entropy = cell.domain.len();
        if entropy == 0 {
            trace!("Skipping contradicted cell at {}", cell.pos);
            continue;
        }
        if entropy == 1 {
            continue;
        }
        if entropy < min_entropy {
            min_entropy = entropy;
            cells.clear();
            cells.push(cell.pos);
        } else if entropy == min_entropy {
            cells.push(cell.pos);
        }
    }

    if cells.is_empty() {
        Selection::Complete
    } else {
        Selection::Candidates {
            entropy: min_entropy,
            cells,
        }
    }
}

/// Pick one candidate uniformly at random.
pub fn choose_candidate(candidates: &[IVec3], rng: &mut dyn GenRng) -> Option<IVec3> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.next_usize_max(candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StdRandom;

    #[test]
    fn test_full_grid_every_cell_is_candidate() {
        let grid = Grid::new(2, 1, 2, 3).unwrap();
        match lowest_entropy_cells(&grid) {
            Selection::Candidates { entropy, cells } => {
                assert_eq!(entropy, 3);
                assert_eq!(cells.len(), 4);
            }
            Selection::Complete => panic!("fresh grid is not complete"),
        }
    }

    #[test]
    fn test_minimum_wins_and_collapsed_excluded() {
        let mut grid = Grid::new(3, 1, 1, 3).unwrap();
        grid.cell_mut(IVec3::new(0, 0, 0)).unwrap().domain.collapse_to(0);
        grid.cell_mut(IVec3::new(1, 0, 0))
            .unwrap()
            .domain
            .narrow_to(&[0, 2]);

        assert_eq!(
            lowest_entropy_cells(&grid),
            Selection::Candidates {
                entropy: 2,
                cells: vec![IVec3::new(1, 0, 0)]
            }
        );
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let mut grid = Grid::new(2, 1, 1, 2).unwrap();
        grid.cell_mut(IVec3::new(0, 0, 0)).unwrap().domain.narrow_to(&[]);
        grid.cell_mut(IVec3::new(1, 0, 0)).unwrap().domain.collapse_to(1);
        assert_eq!(lowest_entropy_cells(&grid), Selection::Complete);
    }

    #[test]
    fn test_choose_candidate_is_seeded() {
        let cells: Vec<IVec3> = (0..10).map(|x| IVec3::new(x, 0, 0)).collect();
        let mut a = StdRandom::from_u64_seed(5);
        let mut b = StdRandom::from_u64_seed(5);
        for _ in 0..20 {
            assert_eq!(
                choose_candidate(&cells, &mut a),
                choose_candidate(&cells, &mut b)
            );
        }
        assert_eq!(choose_candidate(&[], &mut a), None);
    }
}
