//! Index sets referencing points of a shared cloud

use serde::{Deserialize, Serialize};

/// An ordered list of indices into a point cloud.
///
/// Each input cluster of a frame is described by one of these, and every
/// merged output plane carries one as its point membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointIndices {
    pub indices: Vec<usize>,
}

impl PointIndices {
    /// Create an empty index set
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// Wrap an existing list of indices
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.indices.iter()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Largest referenced index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }
}

impl From<Vec<usize>> for PointIndices {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

impl FromIterator<usize> for PointIndices {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: Vec::from_iter(iter),
        }
    }
}

impl<'a> IntoIterator for &'a PointIndices {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}
