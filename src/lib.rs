//! volsense - line-of-sight flood-fill volume sensing

pub mod core;
pub mod math;
pub mod sensor;
pub mod scene;
