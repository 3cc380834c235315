//! Nearest neighbor search implementations

use planemerge_core::{is_finite_point, squared_distance, NearestNeighborSearch, Point3f, PointCloud};
use rstar::RTree;

/// A point with its position in the indexed cloud
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPoint {
    point: Point3f,
    index: usize,
}

impl IndexedPoint {
    fn query(point: &Point3f) -> Self {
        Self { point: *point, index: usize::MAX }
    }
}

impl rstar::Point for IndexedPoint {
    type Scalar = f32;
    const DIMENSIONS: usize = 3;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            point: Point3f::new(generator(0), generator(1), generator(2)),
            index: usize::MAX,
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.point.x,
            1 => self.point.y,
            2 => self.point.z,
            _ => unreachable!("IndexedPoint has 3 dimensions"),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.point.x,
            1 => &mut self.point.y,
            2 => &mut self.point.z,
            _ => unreachable!("IndexedPoint has 3 dimensions"),
        }
    }
}

/// Spatial index over the points of a single patch.
///
/// Built once per patch and queried with the points of other patches to
/// decide whether two patches touch. Points with a non-finite coordinate are
/// left out of the index and never match a query.
pub struct SpatialProximityIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialProximityIndex {
    pub fn new(points: &[Point3f]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter(|(_, point)| is_finite_point(point))
            .map(|(index, point)| IndexedPoint { point: *point, index })
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn from_cloud(cloud: &PointCloud<Point3f>) -> Self {
        Self::new(&cloud.points)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Whether any point of `cloud` lies within `radius` of an indexed point.
    ///
    /// Stops at the first point that has a neighbor.
    pub fn is_near_cloud(&self, cloud: &PointCloud<Point3f>, radius: f32) -> bool {
        if self.is_empty() {
            return false;
        }
        cloud.iter().any(|point| self.has_neighbor_within(point, radius))
    }
}

impl NearestNeighborSearch for SpatialProximityIndex {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if !is_finite_point(query) {
            return Vec::new();
        }
        let radius_squared = radius * radius;
        let mut neighbors: Vec<(usize, f32)> = self.tree
            .locate_within_distance(IndexedPoint::query(query), radius_squared)
            .map(|neighbor| (neighbor.index, squared_distance(&neighbor.point, query).sqrt()))
            .collect();

        neighbors.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        neighbors
    }

    fn has_neighbor_within(&self, query: &Point3f, radius: f32) -> bool {
        if !is_finite_point(query) {
            return false;
        }
        self.tree
            .nearest_neighbor(&IndexedPoint::query(query))
            .map(|nearest| squared_distance(&nearest.point, query) <= radius * radius)
            .unwrap_or(false)
    }
}

/// Linear scan over every point, used to cross-check the R*-tree
#[cfg(test)]
struct BruteForceSearch {
    points: Vec<Point3f>,
}

#[cfg(test)]
impl BruteForceSearch {
    fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

#[cfg(test)]
impl NearestNeighborSearch for BruteForceSearch {
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        let mut neighbors: Vec<(usize, f32)> = self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                let distance_squared = squared_distance(point, query);
                if distance_squared <= radius_squared {
                    Some((idx, distance_squared.sqrt()))
                } else {
                    None
                }
            })
            .collect();

        neighbors.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn grid(origin: Point3f, count: usize, spacing: f32) -> Vec<Point3f> {
        let mut points = Vec::with_capacity(count * count);
        for i in 0..count {
            for j in 0..count {
                points.push(Point3f::new(
                    origin.x + i as f32 * spacing,
                    origin.y + j as f32 * spacing,
                    origin.z,
                ));
            }
        }
        points
    }

    #[test]
    fn test_flat_patch_with_many_coplanar_points() {
        let points = grid(Point3f::origin(), 20, 0.1);
        let index = SpatialProximityIndex::new(&points);
        assert_eq!(index.len(), 400);

        let nearest = index.find_radius_neighbors(&Point3f::new(0.52, 0.48, 0.0), 0.05);
        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].0, 5 * 20 + 5);
    }

    #[test]
    fn test_has_neighbor_within_is_inclusive_enough() {
        let index = SpatialProximityIndex::new(&[Point3f::origin()]);
        assert!(index.has_neighbor_within(&Point3f::new(0.05, 0.0, 0.0), 0.06));
        assert!(!index.has_neighbor_within(&Point3f::new(0.07, 0.0, 0.0), 0.06));
    }

    #[test]
    fn test_empty_index_is_never_near() {
        let index = SpatialProximityIndex::new(&[]);
        let cloud = PointCloud::from_points(vec![Point3f::origin()]);
        assert!(index.is_empty());
        assert!(!index.is_near_cloud(&cloud, 10.0));
    }

    #[test]
    fn test_is_near_cloud() {
        let index = SpatialProximityIndex::new(&grid(Point3f::origin(), 5, 0.1));
        let touching = PointCloud::from_points(grid(Point3f::new(0.41, 0.0, 0.0), 5, 0.1));
        let distant = PointCloud::from_points(grid(Point3f::new(2.0, 0.0, 0.0), 5, 0.1));

        assert!(index.is_near_cloud(&touching, 0.05));
        assert!(!index.is_near_cloud(&distant, 0.05));
        assert!(!index.is_near_cloud(&PointCloud::new(), 0.05));
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point3f> = (0..200)
            .map(|_| Point3f::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let index = SpatialProximityIndex::new(&points);
        let brute = BruteForceSearch::new(&points);

        for _ in 0..20 {
            let query = Point3f::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));

            let fast: Vec<usize> = index.find_radius_neighbors(&query, 0.3).iter().map(|n| n.0).collect();
            let slow: Vec<usize> = brute.find_radius_neighbors(&query, 0.3).iter().map(|n| n.0).collect();
            assert_eq!(fast, slow);

            assert_eq!(
                index.has_neighbor_within(&query, 0.1),
                brute.has_neighbor_within(&query, 0.1)
            );
        }
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let mut points = grid(Point3f::origin(), 5, 0.1);
        points[7] = Point3f::new(f32::NAN, 0.1, 0.0);
        points[12] = Point3f::new(0.2, f32::INFINITY, 0.0);

        let index = SpatialProximityIndex::new(&points);
        assert_eq!(index.len(), 23);

        let neighbors = index.find_radius_neighbors(&Point3f::new(0.1, 0.2, 0.0), 0.15);
        assert!(neighbors.iter().all(|&(i, _)| i != 7 && i != 12));
        assert!(!neighbors.is_empty());

        let nan_query = Point3f::new(f32::NAN, 0.0, 0.0);
        assert!(!index.has_neighbor_within(&nan_query, 10.0));
        assert!(index.find_radius_neighbors(&nan_query, 10.0).is_empty());

        let touching = PointCloud::from_points(vec![nan_query, Point3f::new(0.45, 0.0, 0.0)]);
        assert!(index.is_near_cloud(&touching, 0.06));
    }
}
