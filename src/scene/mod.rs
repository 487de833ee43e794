//! Reference host geometry for line-of-sight queries

pub mod box_scene;

pub use box_scene::BoxScene;
