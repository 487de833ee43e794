//! Bounded breadth-first flood-fill around the reference position
//!
//! Each pass seeds a FIFO frontier with the floored reference position and
//! expands axis-aligned neighbors one grid step at a time. Every candidate
//! that survives the range, revisit and dead-zone checks costs one
//! line-of-sight query from the origin:
//!
//! - unobstructed: the cell is reachable and joins the frontier
//! - obstructed beyond `min_spawn_dist` (flat): spawn candidate, a leaf
//! - obstructed and closer: dropped, recorded nowhere
//!
//! Expansion stops at `max_distance`, and a cell enters at most one of the
//! two sets, so a pass visits a bounded number of cells.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use super::cell::{GridCell, ALL_DIRECTIONS, HORIZONTAL_DIRECTIONS};
use super::config::SensorConfig;
use super::field::{PassStats, SensorField};
use super::oracle::{LineOfSight, ReferencePosition};
use crate::core::types::{Vec2, Vec3};
use crate::core::{Error, Result};

/// Snap a reference position onto the pass origin
pub fn grid_origin(position: Vec3) -> Vec3 {
    position.floor()
}

/// Outcome of visiting one candidate cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Beyond `max_distance`
    OutOfRange,
    /// Already in one of the output sets
    AlreadyVisited,
    /// Inside the exclusion band above or below the origin
    DeadZone,
    /// Visible, recorded and queued for expansion
    Reachable,
    /// Obstructed far enough out to spawn at
    SpawnCandidate,
    /// Obstructed and too close to spawn at
    Discarded,
}

impl Visit {
    /// True if the visit added the cell to an output set
    pub fn is_recorded(self) -> bool {
        matches!(self, Visit::Reachable | Visit::SpawnCandidate)
    }
}

/// State of a single flood-fill pass.
pub struct FloodFill<'a, L: LineOfSight> {
    config: &'a SensorConfig,
    los: &'a L,
    origin: Vec3,
    reachable: HashSet<GridCell>,
    spawn_candidates: HashSet<GridCell>,
    frontier: VecDeque<GridCell>,
    los_queries: usize,
    expanded: usize,
    started: Instant,
}

impl<'a, L: LineOfSight> FloodFill<'a, L> {
    /// Start a pass at `origin` (world space, already snapped).
    ///
    /// The origin is only the seed; it is not recorded in either set.
    pub fn new(config: &'a SensorConfig, los: &'a L, origin: Vec3) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(GridCell::ORIGIN);

        Self {
            config,
            los,
            origin,
            reachable: HashSet::new(),
            spawn_candidates: HashSet::new(),
            frontier,
            los_queries: 0,
            expanded: 0,
            started: Instant::now(),
        }
    }

    /// Expand cells until the frontier is exhausted
    pub fn drain(&mut self) {
        while let Some(cell) = self.frontier.pop_front() {
            self.expand_neighbors(cell);
        }
    }

    /// Run the pass to completion
    pub fn run(mut self) -> SensorField {
        self.drain();
        self.finish()
    }

    /// Generate and classify the neighbors of `cell`.
    ///
    /// Returns how many neighbors were newly recorded. Expanding a cell
    /// whose neighbors were all classified already records nothing.
    pub fn expand_neighbors(&mut self, cell: GridCell) -> usize {
        self.expanded += 1;

        let layer = cell.layer() as i64;
        let directions: &[_] = if cell.flat_length_squared() == layer * layer {
            &HORIZONTAL_DIRECTIONS
        } else {
            &ALL_DIRECTIONS
        };

        let mut recorded = 0;
        for direction in directions {
            if self.visit(cell, cell.step(*direction)).is_recorded() {
                recorded += 1;
            }
        }
        recorded
    }

    /// Classify `candidate`, reached by one step from `from`.
    pub fn visit(&mut self, from: GridCell, candidate: GridCell) -> Visit {
        // World-space offset, the same value the query target is built from
        let offset = candidate.as_ivec3().as_vec3() * self.config.resolution;
        if offset.length() > self.config.max_distance {
            return Visit::OutOfRange;
        }

        if self.reachable.contains(&candidate) || self.spawn_candidates.contains(&candidate) {
            return Visit::AlreadyVisited;
        }

        // Dead-zone radius grows with the layer of the cell being expanded
        let flat_distance = Vec2::new(offset.x, offset.z).length();
        let dead_zone_radius = from.layer() as f32 * self.config.resolution + self.config.dead_zone;
        if flat_distance < dead_zone_radius && candidate.is_off_plane() {
            return Visit::DeadZone;
        }

        let target = self.origin + offset;
        self.los_queries += 1;
        let obstructed = self.los.is_obstructed(self.origin, target);

        let visit = if !obstructed {
            self.reachable.insert(candidate);
            self.frontier.push_back(candidate);
            Visit::Reachable
        } else if flat_distance > self.config.min_spawn_dist {
            self.spawn_candidates.insert(candidate);
            Visit::SpawnCandidate
        } else {
            Visit::Discarded
        };

        log::trace!("cell {:?} -> {:?}", candidate, visit);
        visit
    }

    pub fn reachable(&self) -> &HashSet<GridCell> {
        &self.reachable
    }

    pub fn spawn_candidates(&self) -> &HashSet<GridCell> {
        &self.spawn_candidates
    }

    /// Cells waiting for expansion
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Line-of-sight queries issued so far
    pub fn los_queries(&self) -> usize {
        self.los_queries
    }

    /// Close the pass and hand over its result
    pub fn finish(self) -> SensorField {
        let stats = PassStats {
            reachable: self.reachable.len(),
            spawn_candidates: self.spawn_candidates.len(),
            los_queries: self.los_queries,
            expanded: self.expanded,
            duration: self.started.elapsed(),
        };
        SensorField::new(
            self.origin,
            self.config.resolution,
            self.reachable,
            self.spawn_candidates,
            stats,
        )
    }
}

/// Flood-fill driver owning the configuration and both host capabilities.
pub struct VolumeSampler<L, P> {
    config: SensorConfig,
    los: L,
    reference: P,
}

impl<L: LineOfSight, P: ReferencePosition> VolumeSampler<L, P> {
    /// Create a sampler. Fails on an invalid configuration.
    pub fn new(config: SensorConfig, los: L, reference: P) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, los, reference })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Run a full pass around the current reference position.
    ///
    /// Fails only when a host capability is unavailable; callers should
    /// skip the pass and try again on the next cycle.
    pub fn regenerate_field(&self) -> Result<SensorField> {
        let position = self
            .reference
            .position()
            .filter(|p| p.is_finite())
            .ok_or(Error::PositionUnavailable)?;

        if !self.los.is_ready() {
            return Err(Error::GeometryUnavailable);
        }

        let field = self.flood_fill_from(grid_origin(position));
        let stats = field.stats();
        log::debug!(
            "Sensor pass at {:?}: {} reachable, {} spawn, {} queries in {:.2}ms",
            field.origin(),
            stats.reachable,
            stats.spawn_candidates,
            stats.los_queries,
            stats.duration.as_secs_f32() * 1000.0
        );
        Ok(field)
    }

    /// Run a full pass around an explicit world position
    pub fn flood_fill_from(&self, position: Vec3) -> SensorField {
        FloodFill::new(&self.config, &self.los, grid_origin(position)).run()
    }
}
