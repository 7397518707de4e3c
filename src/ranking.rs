use log::debug;

use crate::components::Component;
use crate::graph::{AdjacencyMap, UserKey};
use crate::longest_path::longest_path;

/// A community together with its activity score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCommunity<N> {
    pub members: Component<N>,
    pub longest_path: usize,
}

/// Every community of one snapshot, in discovery order, with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityResult<N> {
    pub communities: Vec<RankedCommunity<N>>,
}

impl<N> Default for CommunityResult<N> {
    fn default() -> Self {
        CommunityResult {
            communities: Vec::new(),
        }
    }
}

impl<N> CommunityResult<N> {
    pub fn count(&self) -> usize {
        self.communities.len()
    }

    pub fn max_longest_path(&self) -> Option<usize> {
        self.communities.iter().map(|c| c.longest_path).max()
    }

    /// Communities tied at the highest longest-path value.
    ///
    /// Ties are all kept, including the case where every community is a
    /// lone user scoring 0.
    pub fn most_active(&self) -> Vec<&RankedCommunity<N>> {
        let mut best: Option<usize> = None;
        let mut retained = Vec::new();

        for community in &self.communities {
            match best {
                Some(max) if community.longest_path < max => {}
                Some(max) if community.longest_path == max => retained.push(community),
                _ => {
                    retained.clear();
                    retained.push(community);
                    best = Some(community.longest_path);
                }
            }
        }

        retained
    }
}

/// Scores each component by its longest path.
pub fn rank_communities<N: UserKey>(
    components: Vec<Component<N>>,
    adjacency: &AdjacencyMap<N>,
) -> CommunityResult<N> {
    let communities = components
        .into_iter()
        .map(|members| {
            let longest_path = longest_path(&members, adjacency);
            debug!(
                "Community of {} users has longest path {}",
                members.len(),
                longest_path
            );
            RankedCommunity {
                members,
                longest_path,
            }
        })
        .collect();

    CommunityResult { communities }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(members: Vec<u32>, longest_path: usize) -> RankedCommunity<u32> {
        RankedCommunity {
            members,
            longest_path,
        }
    }

    #[test]
    fn empty_result_has_no_most_active() {
        let result = CommunityResult::<u32>::default();
        assert_eq!(result.count(), 0);
        assert_eq!(result.max_longest_path(), None);
        assert!(result.most_active().is_empty());
    }

    #[test]
    fn strictly_greater_replaces_retained() {
        let result = CommunityResult {
            communities: vec![
                ranked(vec![1, 2], 1),
                ranked(vec![3, 4], 1),
                ranked(vec![5, 6, 7], 2),
                ranked(vec![8], 0),
            ],
        };

        let most_active = result.most_active();
        assert_eq!(most_active, vec![&result.communities[2]]);
        assert_eq!(result.max_longest_path(), Some(2));
    }

    #[test]
    fn ties_are_kept_in_order() {
        let result = CommunityResult {
            communities: vec![
                ranked(vec![1, 2, 3], 2),
                ranked(vec![4], 0),
                ranked(vec![5, 6, 7], 2),
            ],
        };

        let members: Vec<&Vec<u32>> = result.most_active().into_iter().map(|c| &c.members).collect();
        assert_eq!(members, vec![&vec![1, 2, 3], &vec![5, 6, 7]]);
    }

    #[test]
    fn all_isolated_users_are_all_most_active() {
        let adjacency = AdjacencyMap::build([1u32, 2, 3], Vec::new()).unwrap();
        let result = rank_communities(vec![vec![1], vec![2], vec![3]], &adjacency);

        assert_eq!(result.most_active().len(), 3);
        assert!(result.communities.iter().all(|c| c.longest_path == 0));
    }

    #[test]
    fn ranking_scores_each_component() {
        let adjacency =
            AdjacencyMap::build([1u32, 2, 3, 4, 5], [(1, 2), (2, 3), (4, 5)]).unwrap();
        let result = rank_communities(vec![vec![1, 2, 3], vec![4, 5]], &adjacency);

        let scores: Vec<usize> = result.communities.iter().map(|c| c.longest_path).collect();
        assert_eq!(scores, vec![2, 1]);
        assert_eq!(result.most_active()[0].members, vec![1, 2, 3]);
    }
}
