//! Plane models

use crate::error::{Error, Result};
use crate::point::*;
use nalgebra::{Matrix3, Vector4};
use serde::{Deserialize, Serialize};

const DEGENERATE_NORMAL_EPSILON: f32 = 1e-8;

/// A 3D plane model defined by the equation ax + by + cz + d = 0
///
/// Constructors normalize the coefficients so that `(a, b, c)` is a unit
/// normal and `d` is the signed offset from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaneModel {
    /// Plane coefficients [a, b, c, d] where ax + by + cz + d = 0
    pub coefficients: Vector4<f32>,
}

impl PlaneModel {
    /// Create a new plane model from coefficients.
    ///
    /// The coefficients are rescaled so the normal has unit length. A zero
    /// normal is kept as given; use [`PlaneModel::from_coefficients`] to
    /// reject it instead.
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        let coefficients = Vector4::new(a, b, c, d);
        let magnitude = Vector3f::new(a, b, c).norm();
        if magnitude > DEGENERATE_NORMAL_EPSILON {
            Self { coefficients: coefficients / magnitude }
        } else {
            Self { coefficients }
        }
    }

    /// Build a plane model from a decoded coefficient vector `[a, b, c, d]`.
    pub fn from_coefficients(values: &[f32]) -> Result<Self> {
        if values.len() != 4 {
            return Err(Error::InvalidData(format!(
                "Plane coefficients need 4 values, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Plane coefficients must be finite: {:?}",
                values
            )));
        }
        let magnitude = Vector3f::new(values[0], values[1], values[2]).norm();
        if magnitude <= DEGENERATE_NORMAL_EPSILON {
            return Err(Error::InvalidData(format!(
                "Plane coefficients have a zero normal: {:?}",
                values
            )));
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Create a plane model from three points
    pub fn from_points(p1: &Point3f, p2: &Point3f, p3: &Point3f) -> Option<Self> {
        let v1 = p2 - p1;
        let v2 = p3 - p1;
        let normal = v1.cross(&v2);

        // Collinear points span no plane
        if normal.magnitude() < DEGENERATE_NORMAL_EPSILON {
            return None;
        }

        let normal = normal.normalize();
        let d = -normal.dot(&p1.coords);

        Some(PlaneModel::new(normal.x, normal.y, normal.z, d))
    }

    /// Least-squares plane through `points`.
    ///
    /// The normal is the eigenvector of the covariance matrix with the
    /// smallest eigenvalue. Returns `None` for fewer than 3 points.
    pub fn fit_least_squares(points: &[Point3f]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let mut centroid = Vector3f::zeros();
        for point in points {
            centroid += point.coords;
        }
        centroid /= points.len() as f32;

        let mut covariance = Matrix3::zeros();
        for point in points {
            let diff = point.coords - centroid;
            covariance += diff * diff.transpose();
        }

        let eigen = covariance.symmetric_eigen();
        let smallest = eigen.eigenvalues.imin();
        let normal = eigen.eigenvectors.column(smallest).into_owned();
        if !normal.iter().all(|v| v.is_finite()) || normal.norm() < DEGENERATE_NORMAL_EPSILON {
            return None;
        }
        let normal = normal.normalize();
        let d = -normal.dot(&centroid);

        Some(PlaneModel::new(normal.x, normal.y, normal.z, d))
    }

    /// Get the normal vector of the plane
    pub fn normal(&self) -> Vector3f {
        Vector3f::new(
            self.coefficients.x,
            self.coefficients.y,
            self.coefficients.z,
        )
    }

    /// Signed offset `d` of the plane equation
    pub fn offset(&self) -> f32 {
        self.coefficients.w
    }

    /// Coefficients as a plain `[a, b, c, d]` array
    pub fn to_array(&self) -> [f32; 4] {
        [
            self.coefficients.x,
            self.coefficients.y,
            self.coefficients.z,
            self.coefficients.w,
        ]
    }

    /// The same plane with the normal pointing the other way
    pub fn flipped(&self) -> Self {
        Self { coefficients: -self.coefficients }
    }

    /// This plane, flipped if needed so its normal agrees in sign with `reference`
    pub fn oriented_like(&self, reference: &PlaneModel) -> Self {
        if self.normal().dot(&reference.normal()) < 0.0 {
            self.flipped()
        } else {
            *self
        }
    }

    /// Angle between the normals of two planes, folded into `[0, π/2]`.
    ///
    /// A plane's normal has no canonical direction, so `angle(a, b)` and
    /// `angle(a, b.flipped())` are identical.
    pub fn angle(&self, other: &PlaneModel) -> f32 {
        let n1 = self.normal();
        let n2 = other.normal();
        n1.cross(&n2).norm().atan2(n1.dot(&n2).abs())
    }

    /// Signed distance from the plane to a point, positive on the normal side
    pub fn signed_distance(&self, point: &Point3f) -> f32 {
        let normal = self.normal();
        let normal_magnitude = normal.magnitude();

        if normal_magnitude < DEGENERATE_NORMAL_EPSILON {
            return f32::INFINITY;
        }

        (normal.dot(&point.coords) + self.coefficients.w) / normal_magnitude
    }

    /// Calculate the distance from a point to the plane
    pub fn distance_to_point(&self, point: &Point3f) -> f32 {
        self.signed_distance(point).abs()
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project_point(&self, point: &Point3f) -> Point3f {
        let normal = self.normal();
        point - normal * (normal.dot(&point.coords) + self.coefficients.w)
    }
}
