//! Constrained plane refinement
//!
//! Re-fits a single plane over the merged points of a group with RANSAC,
//! only accepting candidate planes whose normal stays close to the group's
//! original orientation.

use log::debug;
use planemerge_core::{PlaneModel, Point3f, PointCloud, PointIndices, Result};
use rand::seq::index;
use rand::Rng;

/// Probability that at least one sample is free of outliers, used to stop early
const SUCCESS_PROBABILITY: f64 = 0.99;

/// Number of points needed to span a plane
const SAMPLE_SIZE: usize = 3;

/// RANSAC parameters for plane refinement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementParams {
    /// Maximum number of RANSAC iterations
    pub max_iterations: usize,
    /// Maximum distance for a point to be considered an inlier
    pub outlier_threshold: f32,
    /// Maximum angle between a candidate normal and the original normal, in radians
    pub eps_angle: f32,
}

/// Plane refinement result
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedPlane {
    /// The refined plane, or the original plane when refinement found nothing
    pub model: PlaneModel,
    /// Cloud indices of the inliers of `model`; empty on fallback
    pub inliers: Vec<usize>,
    /// Number of RANSAC iterations performed
    pub iterations: usize,
    /// Whether `model` came from the fit rather than the fallback
    pub refined: bool,
}

impl RefinedPlane {
    fn fallback(original: &PlaneModel, iterations: usize) -> Self {
        Self {
            model: *original,
            inliers: Vec::new(),
            iterations,
            refined: false,
        }
    }
}

/// Re-fit a plane to the points of `cloud` selected by `indices`.
///
/// Candidate planes come from random 3-point samples and are kept only when
/// their normal lies within `eps_angle` of `original`'s normal. The best
/// candidate is polished with a least-squares fit over its inliers and
/// oriented to agree with `original`. When no candidate gathers a single
/// inlier the original plane is returned unchanged.
///
/// # Arguments
/// * `cloud` - Full frame cloud
/// * `indices` - Points of the merged group
/// * `original` - Representative plane of the group
/// * `params` - RANSAC parameters
/// * `rng` - Source of randomness for sampling
///
/// # Returns
/// * `Result<RefinedPlane>` - Fails only if `indices` reference points outside `cloud`
pub fn refine_plane<R: Rng + ?Sized>(
    cloud: &PointCloud<Point3f>,
    indices: &PointIndices,
    original: &PlaneModel,
    params: &RefinementParams,
    rng: &mut R,
) -> Result<RefinedPlane> {
    let points = cloud.extract(indices)?;
    let points = &points.points;

    if points.len() < SAMPLE_SIZE || params.max_iterations == 0 {
        debug!(
            "Skipping refinement: {} points, {} iterations allowed",
            points.len(),
            params.max_iterations
        );
        return Ok(RefinedPlane::fallback(original, 0));
    }

    let mut best: Option<(PlaneModel, usize)> = None;
    let mut required_iterations = params.max_iterations as f64;
    let mut iterations = 0;

    while iterations < params.max_iterations && (iterations as f64) < required_iterations {
        iterations += 1;

        let sample = index::sample(rng, points.len(), SAMPLE_SIZE);
        let candidate = match PlaneModel::from_points(
            &points[sample.index(0)],
            &points[sample.index(1)],
            &points[sample.index(2)],
        ) {
            Some(model) => model,
            None => continue,
        };

        if candidate.angle(original) > params.eps_angle {
            continue;
        }

        let inlier_count = count_inliers(&candidate, points, params.outlier_threshold);
        if inlier_count > best.map(|(_, count)| count).unwrap_or(0) {
            best = Some((candidate, inlier_count));
            required_iterations = adaptive_iteration_bound(inlier_count, points.len());
        }
    }

    let (model, _) = match best {
        Some(found) => found,
        None => {
            debug!("Refinement found no inliers after {} iterations, keeping original plane", iterations);
            return Ok(RefinedPlane::fallback(original, iterations));
        }
    };

    let mut local_inliers = select_inliers(&model, points, params.outlier_threshold);
    let model = match optimize_model(&model, &local_inliers, points, original, params) {
        Some((optimized, optimized_inliers)) => {
            local_inliers = optimized_inliers;
            optimized
        }
        None => model,
    };

    let inliers = local_inliers.iter().map(|&local| indices.indices[local]).collect();

    Ok(RefinedPlane {
        model: model.oriented_like(original),
        inliers,
        iterations,
        refined: true,
    })
}

/// Number of points within `threshold` of `model`
fn count_inliers(model: &PlaneModel, points: &[Point3f], threshold: f32) -> usize {
    points
        .iter()
        .filter(|point| model.distance_to_point(point) <= threshold)
        .count()
}

/// Positions in `points` of those within `threshold` of `model`
fn select_inliers(model: &PlaneModel, points: &[Point3f], threshold: f32) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| model.distance_to_point(point) <= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Least-squares refit over the inliers of `model`.
///
/// The refit is rejected when it leaves the angular corridor around
/// `original` or loses every inlier.
fn optimize_model(
    model: &PlaneModel,
    inliers: &[usize],
    points: &[Point3f],
    original: &PlaneModel,
    params: &RefinementParams,
) -> Option<(PlaneModel, Vec<usize>)> {
    let inlier_points: Vec<Point3f> = inliers.iter().map(|&i| points[i]).collect();
    let optimized = PlaneModel::fit_least_squares(&inlier_points)?;

    if optimized.angle(original) > params.eps_angle {
        debug!(
            "Least-squares refit drifted {:.4} rad from the original normal, keeping sampled plane {:?}",
            optimized.angle(original),
            model.to_array()
        );
        return None;
    }

    let optimized_inliers = select_inliers(&optimized, points, params.outlier_threshold);
    if optimized_inliers.is_empty() {
        return None;
    }
    Some((optimized, optimized_inliers))
}

/// Iterations needed to draw one all-inlier sample with [`SUCCESS_PROBABILITY`]
fn adaptive_iteration_bound(inlier_count: usize, total: usize) -> f64 {
    let inlier_ratio = inlier_count as f64 / total as f64;
    let p_no_outliers = (1.0 - inlier_ratio.powi(SAMPLE_SIZE as i32))
        .clamp(f64::EPSILON, 1.0 - f64::EPSILON);
    (1.0 - SUCCESS_PROBABILITY).ln() / p_no_outliers.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> RefinementParams {
        RefinementParams {
            max_iterations: 200,
            outlier_threshold: 0.02,
            eps_angle: 0.2,
        }
    }

    /// A 10x10 grid on z = `z` plus a few points well off the plane
    fn noisy_floor(z: f32) -> PointCloud<Point3f> {
        let mut cloud = PointCloud::new();
        for i in 0..10 {
            for j in 0..10 {
                let wobble = if (i + j) % 2 == 0 { 0.003 } else { -0.003 };
                cloud.push(Point3f::new(i as f32 * 0.1, j as f32 * 0.1, z + wobble));
            }
        }
        cloud.push(Point3f::new(0.5, 0.5, z + 1.0));
        cloud.push(Point3f::new(0.2, 0.7, z - 0.8));
        cloud.push(Point3f::new(0.9, 0.1, z + 0.5));
        cloud
    }

    fn all_indices(cloud: &PointCloud<Point3f>) -> PointIndices {
        (0..cloud.len()).collect()
    }

    #[test]
    fn test_refines_slightly_tilted_original() {
        let cloud = noisy_floor(1.0);
        let original = PlaneModel::new(0.05, 0.0, 1.0, -1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let result = refine_plane(&cloud, &all_indices(&cloud), &original, &params(), &mut rng).unwrap();

        assert!(result.refined);
        assert!(result.inliers.len() >= 100, "Should keep the floor points: {}", result.inliers.len());
        assert!(!result.inliers.contains(&100));
        assert!(!result.inliers.contains(&101));
        assert!(result.model.normal().z > 0.99);
        assert_relative_eq!(result.model.offset(), -1.0, epsilon = 0.01);
    }

    #[test]
    fn test_refined_normal_follows_original_sign() {
        let cloud = noisy_floor(0.0);
        let original = PlaneModel::new(0.0, 0.0, -1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);

        let result = refine_plane(&cloud, &all_indices(&cloud), &original, &params(), &mut rng).unwrap();
        assert!(result.refined);
        assert!(result.model.normal().z < -0.99);
    }

    #[test]
    fn test_inliers_are_cloud_indices() {
        let cloud = noisy_floor(0.0);
        let subset: PointIndices = (50..103).collect();
        let original = PlaneModel::new(0.0, 0.0, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(11);

        let result = refine_plane(&cloud, &subset, &original, &params(), &mut rng).unwrap();
        assert!(result.refined);
        assert!(result.inliers.iter().all(|&i| (50..100).contains(&i)));
        assert_eq!(result.inliers.len(), 50);
    }

    #[test]
    fn test_fallback_when_orientation_disagrees() {
        // Every sampled plane is horizontal or degenerate, the original is vertical
        let cloud: PointCloud<Point3f> = (0..10)
            .flat_map(|i| (0..10).map(move |j| Point3f::new(i as f32 * 0.1, j as f32 * 0.1, 0.0)))
            .collect();
        let original = PlaneModel::new(1.0, 0.0, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(5);

        let result = refine_plane(&cloud, &all_indices(&cloud), &original, &params(), &mut rng).unwrap();
        assert!(!result.refined);
        assert!(result.inliers.is_empty());
        assert_eq!(result.model, original);
    }

    #[test]
    fn test_fallback_with_too_few_points() {
        let cloud = PointCloud::from_points(vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)]);
        let original = PlaneModel::new(0.0, 0.0, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);

        let result = refine_plane(&cloud, &all_indices(&cloud), &original, &params(), &mut rng).unwrap();
        assert!(!result.refined);
        assert_eq!(result.model, original);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_fallback_with_zero_iterations() {
        let cloud = noisy_floor(0.0);
        let original = PlaneModel::new(0.0, 0.1, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let params = RefinementParams { max_iterations: 0, ..params() };

        let result = refine_plane(&cloud, &all_indices(&cloud), &original, &params, &mut rng).unwrap();
        assert!(!result.refined);
        assert_eq!(result.model, original);
    }

    #[test]
    fn test_out_of_bounds_indices() {
        let cloud = noisy_floor(0.0);
        let original = PlaneModel::new(0.0, 0.0, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let indices = PointIndices::from_indices(vec![0, 1, 5000]);

        assert!(refine_plane(&cloud, &indices, &original, &params(), &mut rng).is_err());
    }

    #[test]
    fn test_adaptive_bound_stops_early_on_clean_data() {
        let cloud = noisy_floor(0.0);
        let clean: PointIndices = (0..100).collect();
        let original = PlaneModel::new(0.0, 0.0, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(9);
        let params = RefinementParams { max_iterations: 10_000, ..params() };

        let result = refine_plane(&cloud, &clean, &original, &params, &mut rng).unwrap();
        assert!(result.refined);
        assert!(result.iterations < 10_000);
    }

    #[test]
    fn test_adaptive_iteration_bound() {
        assert!(adaptive_iteration_bound(100, 100) < 1.0);
        let half = adaptive_iteration_bound(50, 100);
        assert!(half > 30.0 && half < 40.0, "bound for 50% inliers: {}", half);
    }
}
