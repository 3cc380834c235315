//! Connected components of the patch connectivity graph

use crate::connectivity::ConnectivityGraph;
use std::collections::{BTreeSet, VecDeque};

/// Partition the patches of `graph` into connected components.
///
/// Connections are followed in both directions regardless of how the graph
/// was built. Components are returned ordered by their smallest member id,
/// and every patch id appears in exactly one component.
pub fn connected_components(graph: &ConnectivityGraph) -> Vec<BTreeSet<usize>> {
    let patch_count = graph.len();

    // Reverse edges so one-sided adjacency lists are still traversed both ways
    let mut undirected: Vec<Vec<usize>> = vec![Vec::new(); patch_count];
    for id in 0..patch_count {
        for &neighbor in graph.neighbors(id) {
            if neighbor < patch_count && neighbor != id {
                undirected[id].push(neighbor);
                undirected[neighbor].push(id);
            }
        }
    }

    let mut visited = vec![false; patch_count];
    let mut groups = Vec::new();

    for start in 0..patch_count {
        if visited[start] {
            continue;
        }

        let mut group = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(id) = queue.pop_front() {
            group.insert(id);
            for &neighbor in &undirected[id] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        groups.push(group);
    }

    groups
}
