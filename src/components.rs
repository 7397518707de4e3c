use petgraph::visit::{Dfs, VisitMap};

use crate::graph::{AdjacencyMap, UserKey};

/// Users of one maximal connected subgraph, in depth-first discovery order.
pub type Component<N> = Vec<N>;

/// Partitions the users of `adjacency` into connected components.
///
/// Starts are taken in user order; the discovered set is shared between
/// starts so each user lands in exactly one component.
pub fn connected_components<N: UserKey>(adjacency: &AdjacencyMap<N>) -> Vec<Component<N>> {
    let graph = adjacency.as_graph();
    let mut dfs = Dfs::empty(graph);
    let mut components = Vec::new();

    for start in adjacency.users() {
        if dfs.discovered.is_visited(&start) {
            continue;
        }
        dfs.move_to(start);
        let mut component = Vec::new();
        while let Some(user) = dfs.next(graph) {
            component.push(user);
        }
        components.push(component);
    }

    components
}
