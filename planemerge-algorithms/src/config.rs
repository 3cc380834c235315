//! Runtime configuration of the plane concatenator

use crate::connectivity::ConnectivityParams;
use crate::refinement::RefinementParams;
use planemerge_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Thresholds used by one concatenation run.
///
/// Missing fields take their default values when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcatenatorConfig {
    /// Maximum angle between two patch normals for them to connect (radians)
    pub connect_angular_threshold: f32,
    /// Maximum gap between two patches for them to connect
    pub connect_distance_threshold: f32,
    /// RANSAC iteration cap for the refit of a merged plane
    pub ransac_refinement_max_iteration: usize,
    /// Inlier distance for the refit of a merged plane
    pub ransac_refinement_outlier_threshold: f32,
    /// Allowed deviation of the refit normal from the original normal (radians)
    pub ransac_refinement_eps_angle: f32,
    /// Merged groups with fewer points are dropped; 0 keeps everything
    pub min_size: usize,
    /// Seed for refinement sampling; drawn from entropy when absent
    pub random_seed: Option<u64>,
}

impl Default for ConcatenatorConfig {
    fn default() -> Self {
        Self {
            connect_angular_threshold: 0.1,
            connect_distance_threshold: 0.1,
            ransac_refinement_max_iteration: 100,
            ransac_refinement_outlier_threshold: 0.1,
            ransac_refinement_eps_angle: 0.1,
            min_size: 0,
            random_seed: None,
        }
    }
}

impl ConcatenatorConfig {
    /// Reject non-finite or negative thresholds
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("connect_angular_threshold", self.connect_angular_threshold),
            ("connect_distance_threshold", self.connect_distance_threshold),
            ("ransac_refinement_outlier_threshold", self.ransac_refinement_outlier_threshold),
            ("ransac_refinement_eps_angle", self.ransac_refinement_eps_angle),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn connectivity_params(&self) -> ConnectivityParams {
        ConnectivityParams {
            angular_threshold: self.connect_angular_threshold,
            distance_threshold: self.connect_distance_threshold,
        }
    }

    pub fn refinement_params(&self) -> RefinementParams {
        RefinementParams {
            max_iterations: self.ransac_refinement_max_iteration,
            outlier_threshold: self.ransac_refinement_outlier_threshold,
            eps_angle: self.ransac_refinement_eps_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ConcatenatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let negative = ConcatenatorConfig {
            connect_distance_threshold: -0.1,
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(Error::InvalidConfig(_))));

        let nan = ConcatenatorConfig {
            ransac_refinement_eps_angle: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let infinite = ConcatenatorConfig {
            connect_angular_threshold: f32::INFINITY,
            ..Default::default()
        };
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_params_mirror_config() {
        let config = ConcatenatorConfig {
            connect_angular_threshold: 0.2,
            connect_distance_threshold: 0.05,
            ransac_refinement_max_iteration: 42,
            ransac_refinement_outlier_threshold: 0.01,
            ransac_refinement_eps_angle: 0.03,
            ..Default::default()
        };

        let connectivity = config.connectivity_params();
        assert_eq!(connectivity.angular_threshold, 0.2);
        assert_eq!(connectivity.distance_threshold, 0.05);

        let refinement = config.refinement_params();
        assert_eq!(refinement.max_iterations, 42);
        assert_eq!(refinement.outlier_threshold, 0.01);
        assert_eq!(refinement.eps_angle, 0.03);
    }
}
