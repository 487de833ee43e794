//! Geometry primitives used by the reference line-of-sight adapter

pub mod aabb;
pub mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
