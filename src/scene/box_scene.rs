//! Scene made of axis-aligned boxes

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::core::Result;
use crate::math::{Aabb, Ray};
use crate::sensor::LineOfSight;

/// Static geometry answering segment queries by brute-force slab tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoxScene {
    pub boxes: Vec<Aabb>,
}

impl BoxScene {
    pub fn new(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }

    /// A 24x24 room with a floor, four walls, two pillars and a low wall
    pub fn demo() -> Self {
        let half = 12.0;
        let height = 4.0;
        let thickness = 0.5;
        let mut boxes = vec![
            // Floor, top face at y = 0
            Aabb::new(Vec3::new(-half, -1.0, -half), Vec3::new(half, 0.0, half)),
            // Outer walls
            Aabb::new(Vec3::new(-half, 0.0, -half), Vec3::new(half, height, -half + thickness)),
            Aabb::new(Vec3::new(-half, 0.0, half - thickness), Vec3::new(half, height, half)),
            Aabb::new(Vec3::new(-half, 0.0, -half), Vec3::new(-half + thickness, height, half)),
            Aabb::new(Vec3::new(half - thickness, 0.0, -half), Vec3::new(half, height, half)),
        ];
        // Pillars
        for center in [Vec3::new(4.5, 0.0, 3.5), Vec3::new(-5.5, 0.0, -4.5)] {
            boxes.push(Aabb::new(center - Vec3::new(0.75, 0.0, 0.75), center + Vec3::new(0.75, height, 0.75)));
        }
        // Half-height divider
        boxes.push(Aabb::new(Vec3::new(-2.25, 0.0, 6.25), Vec3::new(6.25, 1.25, 6.75)));

        Self { boxes }
    }

    /// Bounds of all boxes, or None for an empty scene
    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.boxes.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.merged(b)))
    }

    /// Parse a scene from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&json)
    }
}

impl LineOfSight for BoxScene {
    fn is_obstructed(&self, from: Vec3, to: Vec3) -> bool {
        let Some((ray, length)) = Ray::segment(from, to) else {
            return false;
        };
        self.boxes.iter().any(|b| ray.hits_within(b, length))
    }
}
