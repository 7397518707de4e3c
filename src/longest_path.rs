//! Exhaustive longest simple path search.
//!
//! Every simple path from every start vertex is enumerated by backtracking
//! over an explicit on-path set. There is no memoisation and the cost is
//! exponential on dense or cyclic components.

use std::collections::HashSet;

use log::warn;

use crate::graph::{AdjacencyMap, UserKey};

/// Components larger than this that contain a cycle get a warning before the
/// search starts.
pub const EXHAUSTIVE_SEARCH_WARN_THRESHOLD: usize = 16;

/// Length in edges of the longest path starting at `source` that never
/// revisits a user.
pub fn longest_path_from<N: UserKey>(adjacency: &AdjacencyMap<N>, source: N) -> usize {
    let mut on_path = HashSet::new();
    on_path.insert(source);
    extend(adjacency, source, &mut on_path)
}

/// Longest path over all users of `component`, each tried as a start.
pub fn longest_path<N: UserKey>(component: &[N], adjacency: &AdjacencyMap<N>) -> usize {
    warn_if_expensive(component, adjacency);

    component
        .iter()
        .map(|&source| longest_path_from(adjacency, source))
        .max()
        .unwrap_or(0)
}

/// One user on the current path, with the neighbours still to try from it.
struct Frame<N, I> {
    user: N,
    neighbors: I,
    deepest: Option<usize>,
}

/// Deepest extension of the current path beyond `tip`.
///
/// `on_path` holds every user already on the path, `tip` included. The walk
/// keeps its own stack of frames, so path length is bounded by memory rather
/// than the thread stack. A user joins `on_path` when its frame is pushed and
/// leaves it when the frame is popped; `tip` itself stays.
fn extend<N: UserKey>(adjacency: &AdjacencyMap<N>, tip: N, on_path: &mut HashSet<N>) -> usize {
    let mut frames = vec![Frame {
        user: tip,
        neighbors: adjacency.neighbors(tip),
        deepest: None,
    }];

    while let Some(frame) = frames.last_mut() {
        if let Some(next) = frame.neighbors.find(|next| !on_path.contains(next)) {
            on_path.insert(next);
            frames.push(Frame {
                user: next,
                neighbors: adjacency.neighbors(next),
                deepest: None,
            });
            continue;
        }

        let Some(finished) = frames.pop() else { break };
        let depth = finished.deepest.map_or(0, |d| d + 1);
        let Some(parent) = frames.last_mut() else {
            return depth;
        };
        on_path.remove(&finished.user);
        if parent.deepest.is_none_or(|d| depth > d) {
            parent.deepest = Some(depth);
        }
    }

    0
}

/// Whether `component` is big enough and cyclic enough that the exhaustive
/// search is worth a warning.
pub fn search_is_expensive<N: UserKey>(component: &[N], adjacency: &AdjacencyMap<N>) -> bool {
    if component.len() <= EXHAUSTIVE_SEARCH_WARN_THRESHOLD {
        return false;
    }
    let degree_sum: usize = component.iter().map(|&user| adjacency.degree(user)).sum();
    // A connected component with as many edges as vertices has a cycle.
    degree_sum / 2 >= component.len()
}

fn warn_if_expensive<N: UserKey>(component: &[N], adjacency: &AdjacencyMap<N>) {
    if search_is_expensive(component, adjacency) {
        let degree_sum: usize = component.iter().map(|&user| adjacency.degree(user)).sum();
        warn!(
            "Exhaustive longest-path search over {} users and {} friendships may take exponential time",
            component.len(),
            degree_sum / 2
        );
    }
}
