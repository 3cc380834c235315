//! Core data structures and traits for planemerge
//! 
//! This crate provides the fundamental types shared by the plane merging
//! pipeline: points, point clouds, index sets into a cloud, plane models,
//! boundary polygons, and the nearest neighbor search trait.

pub mod point;
pub mod point_cloud;
pub mod indices;
pub mod plane;
pub mod polygon;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use indices::*;
pub use plane::*;
pub use polygon::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4, Matrix3};
