//! Core traits for planemerge

use crate::point::*;

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;

    /// Whether at least one indexed point lies within `radius` of the query
    fn has_neighbor_within(&self, query: &Point3f, radius: f32) -> bool {
        !self.find_radius_neighbors(query, radius).is_empty()
    }
}
