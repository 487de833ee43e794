//! Host capabilities the sensor depends on

use std::sync::{Arc, Mutex};

use crate::core::types::Vec3;

/// Segment visibility query supplied by the host's geometry system.
///
/// This is a straight-segment test. A swept cylinder would match the
/// traversal semantics better; hosts wanting that must provide it here.
pub trait LineOfSight: Send + Sync + 'static {
    /// True if the segment `from -> to` is obstructed. Must not mutate.
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool;

    /// False while the host geometry cannot answer queries yet.
    fn is_ready(&self) -> bool {
        true
    }
}

impl<F> LineOfSight for F
where
    F: Fn(Vec3, Vec3) -> bool + Send + Sync + 'static,
{
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool {
        self(from, to)
    }
}

/// Live position the flood-fill is centered on.
pub trait ReferencePosition: Send + Sync + 'static {
    /// Current position, or None while undefined.
    fn position(&self) -> Option<Vec3>;
}

impl<F> ReferencePosition for F
where
    F: Fn() -> Option<Vec3> + Send + Sync + 'static,
{
    fn position(&self) -> Option<Vec3> {
        self()
    }
}

/// Position written by the host each frame and read by the sensor.
#[derive(Clone, Debug, Default)]
pub struct SharedPosition {
    inner: Arc<Mutex<Option<Vec3>>>,
}

impl SharedPosition {
    /// Create with no position yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an initial position
    pub fn at(position: Vec3) -> Self {
        let shared = Self::new();
        shared.set(position);
        shared
    }

    /// Publish the latest tracked position
    pub fn set(&self, position: Vec3) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(position),
            Err(poisoned) => *poisoned.into_inner() = Some(position),
        }
    }

    /// Mark the position undefined (tracking lost)
    pub fn clear(&self) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl ReferencePosition for SharedPosition {
    fn position(&self) -> Option<Vec3> {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
