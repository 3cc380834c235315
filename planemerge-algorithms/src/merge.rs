//! Merging the point membership of grouped patches

use planemerge_core::{Error, PlaneModel, PointIndices, Result};
use std::collections::BTreeSet;

/// The combined membership of one group of connected patches
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGroup {
    /// Patch ids in the group, ascending
    pub members: Vec<usize>,
    /// Sorted, deduplicated union of the members' point indices
    pub indices: PointIndices,
    /// Smallest member id; its plane constrains refinement and is the fallback
    pub representative: usize,
    /// Plane model of the representative patch
    pub plane: PlaneModel,
}

/// Deduplicated union of the index sets of `members`, sorted ascending
pub fn merge_indices(members: &BTreeSet<usize>, all_indices: &[PointIndices]) -> Result<PointIndices> {
    let mut merged = BTreeSet::new();
    for &member in members {
        let indices = all_indices.get(member).ok_or_else(|| {
            Error::InvalidData(format!(
                "Patch {} has no index set ({} available)",
                member,
                all_indices.len()
            ))
        })?;
        merged.extend(indices.iter().copied());
    }
    Ok(merged.into_iter().collect())
}

/// Merge every group into a [`MergedGroup`], in the order of `groups`
pub fn merge_groups(
    groups: &[BTreeSet<usize>],
    all_indices: &[PointIndices],
    planes: &[PlaneModel],
) -> Result<Vec<MergedGroup>> {
    groups
        .iter()
        .map(|group| {
            let representative = *group
                .first()
                .ok_or_else(|| Error::InvalidData("Cannot merge an empty group".to_string()))?;
            let plane = *planes.get(representative).ok_or_else(|| {
                Error::InvalidData(format!(
                    "Patch {} has no plane model ({} available)",
                    representative,
                    planes.len()
                ))
            })?;

            Ok(MergedGroup {
                members: group.iter().copied().collect(),
                indices: merge_indices(group, all_indices)?,
                representative,
                plane,
            })
        })
        .collect()
}
