//! Line-of-sight volume sensing
//!
//! [`VolumeSampler`] flood-fills the grid around a reference position and
//! classifies cells as reachable or as spawn candidates. [`RefreshTask`]
//! repeats that on a fixed cadence and publishes each result as an
//! immutable [`SensorField`].

pub mod cell;
pub mod config;
pub mod field;
pub mod oracle;
pub mod refresh;
pub mod sampler;

pub use cell::GridCell;
pub use config::SensorConfig;
pub use field::{PassStats, SensorField};
pub use oracle::{LineOfSight, ReferencePosition, SharedPosition};
pub use refresh::{FieldReader, RefreshHandle, RefreshState, RefreshTask};
pub use sampler::{FloodFill, Visit, VolumeSampler};
