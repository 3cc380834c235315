//! # planemerge Algorithms
//!
//! Algorithms for consolidating over-segmented planar patches.
//!
//! Patches whose planes agree in orientation and whose points touch are
//! connected, connected patches are grouped, their point memberships are
//! merged, and one plane is re-fitted per group with RANSAC constrained to
//! the group's original orientation.

pub mod nearest_neighbor;
pub mod connectivity;
pub mod grouping;
pub mod merge;
pub mod refinement;
pub mod polygon;
pub mod config;
pub mod vital;
pub mod concatenator;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use connectivity::*;
pub use grouping::*;
pub use merge::*;
pub use refinement::*;
pub use polygon::*;
pub use config::*;
pub use vital::*;
pub use concatenator::*;
