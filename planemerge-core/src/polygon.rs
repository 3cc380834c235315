//! Boundary polygons of planar patches

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A planar polygon given by its ordered boundary vertices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point3f>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3f>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the polygon encloses an area (at least 3 vertices)
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Area of the polygon, from the magnitude of its vector area
    pub fn area(&self) -> f32 {
        if !self.is_valid() {
            return 0.0;
        }
        let mut vector_area = Vector3f::zeros();
        for (i, current) in self.vertices.iter().enumerate() {
            let next = &self.vertices[(i + 1) % self.vertices.len()];
            vector_area += current.coords.cross(&next.coords);
        }
        vector_area.norm() * 0.5
    }
}
