//! Lattice cells of the sensing grid

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, Vec3};

/// Horizontal expansion directions (±X, ±Z)
pub const HORIZONTAL_DIRECTIONS: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];

/// All six axis-aligned expansion directions
pub const ALL_DIRECTIONS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Integer lattice offset from the pass origin, in grid steps.
///
/// World position is `origin + cell * resolution`. Hashing and equality are
/// on the integer index, so repeated visits always land on the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCell {
    /// The pass origin itself
    pub const ORIGIN: GridCell = GridCell { x: 0, y: 0, z: 0 };

    /// Create a new cell offset
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbor one grid step along `direction`
    pub fn step(&self, direction: IVec3) -> Self {
        Self::from(self.as_ivec3() + direction)
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// World-space position given the pass origin and grid step
    pub fn to_world(&self, origin: Vec3, resolution: f32) -> Vec3 {
        origin + self.as_ivec3().as_vec3() * resolution
    }

    /// Squared distance from the origin, in grid steps
    pub fn length_squared(&self) -> i64 {
        let (x, y, z) = (self.x as i64, self.y as i64, self.z as i64);
        x * x + y * y + z * z
    }

    /// Squared x/z (flat) distance from the origin, in grid steps
    pub fn flat_length_squared(&self) -> i64 {
        let (x, z) = (self.x as i64, self.z as i64);
        x * x + z * z
    }

    /// Layer of this cell: the dominant horizontal offset minus one.
    ///
    /// Cells on the origin's vertical column are layer 0.
    pub fn layer(&self) -> i32 {
        (self.x.abs().max(self.z.abs()) - 1).max(0)
    }

    /// True when the cell is strictly above or below the origin plane
    pub fn is_off_plane(&self) -> bool {
        self.y != 0
    }
}

impl From<IVec3> for GridCell {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<GridCell> for IVec3 {
    fn from(cell: GridCell) -> Self {
        cell.as_ivec3()
    }
}
