//! Result of one flood-fill pass

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cell::GridCell;
use crate::core::types::Vec3;

/// Counters for one pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    /// Cells in the reachable set
    pub reachable: usize,
    /// Cells in the spawn-candidate set
    pub spawn_candidates: usize,
    /// Line-of-sight queries issued
    pub los_queries: usize,
    /// Cells dequeued and expanded
    pub expanded: usize,
    /// Wall time of the pass
    pub duration: Duration,
}

/// Reachable and spawn-candidate cells discovered around one origin.
///
/// Immutable once built; every refresh produces a new field.
#[derive(Clone, Debug)]
pub struct SensorField {
    origin: Vec3,
    resolution: f32,
    reachable: HashSet<GridCell>,
    spawn_candidates: HashSet<GridCell>,
    stats: PassStats,
}

impl SensorField {
    pub(crate) fn new(
        origin: Vec3,
        resolution: f32,
        reachable: HashSet<GridCell>,
        spawn_candidates: HashSet<GridCell>,
        stats: PassStats,
    ) -> Self {
        Self {
            origin,
            resolution,
            reachable,
            spawn_candidates,
            stats,
        }
    }

    /// Floored reference position the pass was centered on
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Grid step the pass used
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Traversable cells, as offsets from the origin
    pub fn reachable(&self) -> &HashSet<GridCell> {
        &self.reachable
    }

    /// Spawn candidates, as offsets from the origin
    pub fn spawn_candidates(&self) -> &HashSet<GridCell> {
        &self.spawn_candidates
    }

    pub fn contains_reachable(&self, cell: GridCell) -> bool {
        self.reachable.contains(&cell)
    }

    pub fn contains_spawn(&self, cell: GridCell) -> bool {
        self.spawn_candidates.contains(&cell)
    }

    /// World position of a cell in this field
    pub fn world_position(&self, cell: GridCell) -> Vec3 {
        cell.to_world(self.origin, self.resolution)
    }

    /// World positions of the reachable cells
    pub fn reachable_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.reachable.iter().map(|cell| self.world_position(*cell))
    }

    /// World positions of the spawn candidates
    pub fn spawn_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.spawn_candidates.iter().map(|cell| self.world_position(*cell))
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty() && self.spawn_candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> SensorField {
        let reachable = [GridCell::new(1, 0, 0), GridCell::new(0, 0, 1)].into_iter().collect();
        let spawn = [GridCell::new(3, 0, 0)].into_iter().collect();
        let stats = PassStats {
            reachable: 2,
            spawn_candidates: 1,
            los_queries: 5,
            expanded: 3,
            duration: Duration::from_micros(40),
        };
        SensorField::new(Vec3::new(4.0, 1.0, -2.0), 0.5, reachable, spawn, stats)
    }

    #[test]
    fn test_world_positions() {
        let field = sample_field();
        let spawns: Vec<Vec3> = field.spawn_positions().collect();
        assert_eq!(spawns, vec![Vec3::new(5.5, 1.0, -2.0)]);

        let mut reachable: Vec<Vec3> = field.reachable_positions().collect();
        reachable.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(reachable, vec![Vec3::new(4.0, 1.0, -1.5), Vec3::new(4.5, 1.0, -2.0)]);
    }

    #[test]
    fn test_membership() {
        let field = sample_field();
        assert!(field.contains_reachable(GridCell::new(1, 0, 0)));
        assert!(!field.contains_reachable(GridCell::new(3, 0, 0)));
        assert!(field.contains_spawn(GridCell::new(3, 0, 0)));
        assert!(!field.is_empty());
        assert_eq!(field.stats().los_queries, 5);
    }
}
