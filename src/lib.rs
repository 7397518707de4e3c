//! Community analysis of a social network's friendship graph.
//!
//! Users and friendships are turned into an undirected graph, split into
//! connected communities, and each community is scored by the longest simple
//! path through it. The communities tied at the highest score are the most
//! active ones.

pub mod communities;
pub mod components;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod logger;
pub mod longest_path;
pub mod network;
pub mod ranking;
pub mod store;
pub mod validate;

pub use communities::{CommunityDetector, compute_communities, most_active_communities};
pub use components::{Component, connected_components};
pub use error::{GraphError, NetworkError, ValidationError};
pub use graph::{AdjacencyMap, UserKey};
pub use longest_path::{longest_path, longest_path_from, search_is_expensive};
pub use network::{Friendship, FriendshipKey, Network, User, UserId};
pub use ranking::{CommunityResult, RankedCommunity, rank_communities};
pub use store::SocialStore;
pub use validate::ValidationStrategy;
