//! Point cloud data structures and functionality

use crate::error::{Error, Result};
use crate::indices::PointIndices;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A generic point cloud container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Get the point at `index`, if any
    pub fn get(&self, index: usize) -> Option<&T> {
        self.points.get(index)
    }
}

impl<T: Clone> PointCloud<T> {
    /// Copy the points referenced by `indices` into a new cloud, preserving
    /// the order of `indices`.
    ///
    /// Fails if any index is out of bounds for this cloud.
    pub fn extract(&self, indices: &PointIndices) -> Result<PointCloud<T>> {
        let mut extracted = PointCloud::with_capacity(indices.len());
        for &index in indices.iter() {
            let point = self.points.get(index).ok_or_else(|| {
                Error::InvalidData(format!(
                    "Point index {} out of bounds for cloud of {} points",
                    index,
                    self.points.len()
                ))
            })?;
            extracted.push(point.clone());
        }
        Ok(extracted)
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}
