//! Connectivity between planar patches
//!
//! Two patches are connected when their plane normals agree within an
//! angular threshold and at least one point of one patch lies within a
//! distance threshold of the other patch's points.

use crate::nearest_neighbor::SpatialProximityIndex;
use log::{debug, trace};
use planemerge_core::{Error, PlaneModel, Point3f, PointCloud, Result};

/// Undirected adjacency between patch ids `0..N`.
///
/// Every patch lists itself first, followed by the patches it is connected
/// to in the order the connections were discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    adjacency: Vec<Vec<usize>>,
}

impl ConnectivityGraph {
    /// Graph of `patch_count` patches where every patch is connected only to itself
    pub fn new(patch_count: usize) -> Self {
        Self {
            adjacency: (0..patch_count).map(|id| vec![id]).collect(),
        }
    }

    /// Number of patches in the graph
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Record a connection between `a` and `b` in both directions.
    ///
    /// Panics if either id is out of range.
    pub fn connect(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if !self.adjacency[a].contains(&b) {
            self.adjacency[a].push(b);
        }
        if !self.adjacency[b].contains(&a) {
            self.adjacency[b].push(a);
        }
    }

    /// Patches connected to `id`, starting with `id` itself
    pub fn neighbors(&self, id: usize) -> &[usize] {
        &self.adjacency[id]
    }

    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        self.adjacency
            .get(a)
            .map(|neighbors| neighbors.contains(&b))
            .unwrap_or(false)
    }

    /// Number of distinct connections, self-loops excluded
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len() - 1).sum::<usize>() / 2
    }
}

/// Thresholds for deciding that two patches are the same surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityParams {
    /// Maximum angle between plane normals, in radians (exclusive)
    pub angular_threshold: f32,
    /// Maximum gap between the two point sets (inclusive)
    pub distance_threshold: f32,
}

/// Build the connectivity graph of a set of patches.
///
/// For every pair `i < j` the cheap angle test runs first; the proximity
/// test against the spatial index of patch `i` runs only when the angle
/// test passes.
///
/// # Arguments
/// * `clouds` - Points of each patch
/// * `planes` - Plane model of each patch, same order as `clouds`
/// * `params` - Connection thresholds
pub fn build_connectivity_graph(
    clouds: &[PointCloud<Point3f>],
    planes: &[PlaneModel],
    params: &ConnectivityParams,
) -> Result<ConnectivityGraph> {
    if clouds.len() != planes.len() {
        return Err(Error::InvalidData(format!(
            "Got {} patch clouds but {} plane models",
            clouds.len(),
            planes.len()
        )));
    }

    let mut graph = ConnectivityGraph::new(clouds.len());

    for i in 0..clouds.len() {
        let index = SpatialProximityIndex::from_cloud(&clouds[i]);
        let focused_plane = &planes[i];

        for j in (i + 1)..clouds.len() {
            let angle = focused_plane.angle(&planes[j]);
            if angle >= params.angular_threshold {
                trace!("Patches {} and {} rejected by angle {:.4}", i, j, angle);
                continue;
            }
            if index.is_near_cloud(&clouds[j], params.distance_threshold) {
                debug!("Patches {} and {} connected (angle {:.4})", i, j, angle);
                graph.connect(i, j);
            } else {
                trace!("Patches {} and {} rejected by distance", i, j);
            }
        }
    }

    Ok(graph)
}
