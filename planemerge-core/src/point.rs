//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Squared Euclidean distance between two points
#[inline]
pub fn squared_distance(a: &Point3f, b: &Point3f) -> f32 {
    (a - b).norm_squared()
}

/// Whether every coordinate of `point` is finite
#[inline]
pub fn is_finite_point(point: &Point3f) -> bool {
    point.coords.iter().all(|v| v.is_finite())
}
