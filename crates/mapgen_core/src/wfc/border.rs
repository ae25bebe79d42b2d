//! Filler ring placed around a finished map.
//!
//! Purely additive: the ring lies strictly outside [0, size_x) x [0, size_z)
//! and the grid is never consulted or touched.

use bevy::math::IVec3;

/// Positions one cell beyond the grid on every side, at height 0.
///
/// Row-major over x then z, corners included. A 3x3 grid yields 16 positions.
pub fn border_ring(size_x: usize, size_z: usize) -> Vec<IVec3> {
    let (sx, sz) = (size_x as i32, size_z as i32);
    let mut ring = Vec::with_capacity(2 * (size_x + size_z) + 4);
    for x in -1..=sx {
        for z in -1..=sz {
            let inside = x >= 0 && x < sx && z >= 0 && z < sz;
            if !inside {
                ring.push(IVec3::new(x, 0, z));
            }
        }
    }
    ring
}
