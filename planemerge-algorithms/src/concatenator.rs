//! Plane concatenation pipeline
//!
//! Runs connectivity, grouping, index merging, refinement and polygon
//! construction over one frame of planar patches. The configuration is
//! shared with a reconfiguration path and guarded by a single lock that is
//! held for the whole run.

use crate::config::ConcatenatorConfig;
use crate::connectivity::build_connectivity_graph;
use crate::grouping::connected_components;
use crate::merge::merge_groups;
use crate::polygon::convex_polygon;
use crate::refinement::refine_plane;
use crate::vital::{VitalChecker, VitalStatus};
use log::{debug, info};
use parking_lot::Mutex;
use planemerge_core::{is_finite_point, Error, PlaneModel, Point3f, PointCloud, PointIndices, Polygon, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One snapshot of segmented planes.
///
/// `indices[k]`, `coefficients[k]` and `polygons[k]` describe the same patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Full cloud the indices refer to
    pub cloud: PointCloud<Point3f>,
    /// Point membership of each patch
    pub indices: Vec<PointIndices>,
    /// Plane coefficients `[a, b, c, d]` of each patch
    pub coefficients: Vec<Vec<f32>>,
    /// Boundary polygon of each patch
    pub polygons: Vec<Polygon>,
}

impl Frame {
    /// Number of patches in the frame
    pub fn patch_count(&self) -> usize {
        self.indices.len()
    }

    /// Check the frame's internal consistency and decode its plane models
    pub fn validate(&self) -> Result<Vec<PlaneModel>> {
        let patch_count = self.indices.len();
        if self.coefficients.len() != patch_count || self.polygons.len() != patch_count {
            return Err(Error::InvalidData(format!(
                "Mismatched frame: {} index sets, {} coefficient sets, {} polygons",
                patch_count,
                self.coefficients.len(),
                self.polygons.len()
            )));
        }

        if patch_count > 0 && self.cloud.is_empty() {
            return Err(Error::InvalidData(format!(
                "Frame has {} patches but an empty cloud",
                patch_count
            )));
        }

        for (patch, indices) in self.indices.iter().enumerate() {
            if let Some(max_index) = indices.max_index() {
                if max_index >= self.cloud.len() {
                    return Err(Error::InvalidData(format!(
                        "Patch {} references point {} but the cloud has {} points",
                        patch,
                        max_index,
                        self.cloud.len()
                    )));
                }
            }
            if let Some(&bad) = indices.iter().find(|&&i| !is_finite_point(&self.cloud[i])) {
                return Err(Error::InvalidData(format!(
                    "Patch {} references point {} with a non-finite coordinate: {:?}",
                    patch, bad, self.cloud[bad]
                )));
            }
        }

        self.coefficients
            .iter()
            .enumerate()
            .map(|(patch, values)| {
                PlaneModel::from_coefficients(values).map_err(|e| {
                    Error::InvalidData(format!("Patch {}: {}", patch, e))
                })
            })
            .collect()
    }
}

/// Merged planes of one frame, one entry per emitted group in every field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutput {
    /// Point membership of each merged plane
    pub indices: Vec<PointIndices>,
    /// Refined plane of each merged plane
    pub coefficients: Vec<PlaneModel>,
    /// Convex boundary of each merged plane
    pub polygons: Vec<Polygon>,
    /// Input patch ids that make up each merged plane
    pub groups: Vec<Vec<usize>>,
}

impl MergeOutput {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Merges over-segmented planar patches into one plane per physical surface
#[derive(Debug)]
pub struct PlaneConcatenator {
    config: Mutex<ConcatenatorConfig>,
    vital: VitalChecker,
}

impl PlaneConcatenator {
    pub fn new(config: ConcatenatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Mutex::new(config),
            vital: VitalChecker::default(),
        })
    }

    /// Like [`PlaneConcatenator::new`] with a custom stall timeout for diagnostics
    pub fn with_dead_duration(config: ConcatenatorConfig, dead_duration: Duration) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Mutex::new(config),
            vital: VitalChecker::new(dead_duration),
        })
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ConcatenatorConfig {
        self.config.lock().clone()
    }

    /// Replace the configuration.
    ///
    /// Waits for a running frame to finish; an invalid configuration is
    /// rejected and the previous one stays in effect.
    pub fn reconfigure(&self, config: ConcatenatorConfig) -> Result<()> {
        config.validate()?;
        let mut current = self.config.lock();
        debug!("Reconfigured: {:?}", config);
        *current = config;
        Ok(())
    }

    /// Health of the processing loop
    pub fn diagnostic(&self) -> VitalStatus {
        self.vital.status()
    }

    /// Merge the patches of `frame`.
    ///
    /// Fails only when the frame itself is malformed; refinement problems
    /// fall back to the original plane of each group.
    pub fn concatenate(&self, frame: &Frame) -> Result<MergeOutput> {
        let config = self.config.lock();
        self.vital.poke();

        let planes = frame.validate()?;
        let clouds = frame
            .indices
            .iter()
            .map(|indices| frame.cloud.extract(indices))
            .collect::<Result<Vec<_>>>()?;

        let graph = build_connectivity_graph(&clouds, &planes, &config.connectivity_params())?;
        let groups = connected_components(&graph);
        let merged = merge_groups(&groups, &frame.indices, &planes)?;

        let refinement_params = config.refinement_params();
        let mut rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut output = MergeOutput::default();
        for group in merged {
            if group.indices.len() < config.min_size {
                debug!(
                    "Dropping group {:?}: {} points is below min_size {}",
                    group.members,
                    group.indices.len(),
                    config.min_size
                );
                continue;
            }

            let refined = refine_plane(
                &frame.cloud,
                &group.indices,
                &group.plane,
                &refinement_params,
                &mut rng,
            )?;
            if !refined.refined {
                debug!("Group {:?} kept the plane of patch {}", group.members, group.representative);
            }

            let polygon = convex_polygon(&frame.cloud, &group.indices, &refined.model)?;

            output.indices.push(group.indices);
            output.coefficients.push(refined.model);
            output.polygons.push(polygon);
            output.groups.push(group.members);
        }

        info!(
            "Concatenated {} patches into {} planes ({} connections)",
            frame.patch_count(),
            output.len(),
            graph.edge_count()
        );

        Ok(output)
    }
}
