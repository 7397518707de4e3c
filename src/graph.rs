use std::fmt::Debug;

use log::warn;
use petgraph::graphmap::{NodeTrait, UnGraphMap};

use crate::error::GraphError;

/// Identifier usable as a vertex of the friendship graph.
pub trait UserKey: NodeTrait + Debug {}

impl<T: NodeTrait + Debug> UserKey for T {}

/// Symmetric adjacency over every known user, isolated ones included.
///
/// Users and neighbours iterate in the order they were first supplied, so
/// every traversal over the map is deterministic for a given snapshot.
#[derive(Debug, Clone)]
pub struct AdjacencyMap<N: UserKey> {
    graph: UnGraphMap<N, ()>,
}

impl<N: UserKey> AdjacencyMap<N> {
    /// Builds the map from a user snapshot and the friendship pairs between them.
    ///
    /// Pair direction carries no meaning. Repeated pairs collapse into one
    /// edge and self-pairs are skipped. A pair naming a user outside `users`
    /// is rejected.
    pub fn build<U, E>(users: U, friendships: E) -> Result<Self, GraphError>
    where
        U: IntoIterator<Item = N>,
        E: IntoIterator<Item = (N, N)>,
    {
        let mut graph = UnGraphMap::new();
        for user in users {
            graph.add_node(user);
        }

        for (a, b) in friendships {
            for endpoint in [a, b] {
                if !graph.contains_node(endpoint) {
                    return Err(GraphError::UnknownUser {
                        from: format!("{:?}", a),
                        to: format!("{:?}", b),
                        missing: format!("{:?}", endpoint),
                    });
                }
            }
            if a == b {
                warn!("Ignoring self-friendship of {:?}", a);
                continue;
            }
            graph.add_edge(a, b, ());
        }

        Ok(AdjacencyMap { graph })
    }

    pub fn users(&self) -> impl Iterator<Item = N> + '_ {
        self.graph.nodes()
    }

    /// Neighbours of `user`; empty for an unknown user.
    pub fn neighbors(&self, user: N) -> impl Iterator<Item = N> + '_ {
        self.graph.neighbors(user)
    }

    pub fn degree(&self, user: N) -> usize {
        self.graph.neighbors(user).count()
    }

    pub fn contains(&self, user: N) -> bool {
        self.graph.contains_node(user)
    }

    pub fn are_friends(&self, a: N, b: N) -> bool {
        self.graph.contains_edge(a, b)
    }

    pub fn user_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn friendship_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn as_graph(&self) -> &UnGraphMap<N, ()> {
        &self.graph
    }
}
