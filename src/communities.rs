use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::info;
use petgraph::dot::{Config, Dot};

use crate::components::{Component, connected_components};
use crate::error::GraphError;
use crate::graph::{AdjacencyMap, UserKey};
use crate::ranking::{CommunityResult, RankedCommunity, rank_communities};
use crate::store::SocialStore;

/// Number of communities and their members.
pub fn compute_communities<N, U, E>(
    users: U,
    friendships: E,
) -> Result<(usize, Vec<Component<N>>), GraphError>
where
    N: UserKey,
    U: IntoIterator<Item = N>,
    E: IntoIterator<Item = (N, N)>,
{
    let adjacency = AdjacencyMap::build(users, friendships)?;
    let components = connected_components(&adjacency);
    Ok((components.len(), components))
}

/// Communities tied at the highest longest-path value.
pub fn most_active_communities<N, U, E>(
    users: U,
    friendships: E,
) -> Result<Vec<Component<N>>, GraphError>
where
    N: UserKey,
    U: IntoIterator<Item = N>,
    E: IntoIterator<Item = (N, N)>,
{
    let mut detector = CommunityDetector::from_snapshot(users, friendships)?;
    detector.detect_communities();
    Ok(detector
        .most_active()
        .into_iter()
        .map(|community| community.members.clone())
        .collect())
}

/// Community analysis over one snapshot of the friendship graph.
pub struct CommunityDetector<N: UserKey> {
    pub adjacency: AdjacencyMap<N>,
    pub labels: HashMap<N, usize>,
    result: CommunityResult<N>,
}

impl<N: UserKey> CommunityDetector<N> {
    pub fn from_snapshot<U, E>(users: U, friendships: E) -> Result<Self, GraphError>
    where
        U: IntoIterator<Item = N>,
        E: IntoIterator<Item = (N, N)>,
    {
        let adjacency = AdjacencyMap::build(users, friendships)?;
        Ok(CommunityDetector {
            adjacency,
            labels: HashMap::new(),
            result: CommunityResult::default(),
        })
    }

    pub fn from_store<S>(store: &S) -> Result<Self, GraphError>
    where
        S: SocialStore<Id = N>,
    {
        Self::from_snapshot(store.list_all_user_ids(), store.list_all_friendship_pairs())
    }

    /// Partitions the snapshot, scores every community and labels each user
    /// with the index of its community.
    pub fn detect_communities(&mut self) {
        let components = connected_components(&self.adjacency);
        self.result = rank_communities(components, &self.adjacency);

        self.labels = self
            .result
            .communities
            .iter()
            .enumerate()
            .flat_map(|(community_id, community)| {
                community.members.iter().map(move |&user| (user, community_id))
            })
            .collect();

        info!(
            "Detected {} communities among {} users and {} friendships",
            self.result.count(),
            self.adjacency.user_count(),
            self.adjacency.friendship_count()
        );
    }

    pub fn number_of_communities(&self) -> usize {
        self.result.count()
    }

    pub fn communities(&self) -> &[RankedCommunity<N>] {
        &self.result.communities
    }

    pub fn result(&self) -> &CommunityResult<N> {
        &self.result
    }

    pub fn most_active(&self) -> Vec<&RankedCommunity<N>> {
        self.result.most_active()
    }

    pub fn community_of(&self, user: N) -> Option<usize> {
        self.labels.get(&user).copied()
    }

    /// Writes the friendship graph as Graphviz DOT, one fill colour per
    /// community. `label` names each user.
    pub fn save_graph_to_dot<P, L>(&self, filename: P, label: L) -> io::Result<()>
    where
        P: AsRef<Path>,
        L: Fn(N) -> String,
    {
        let graph = self.adjacency.as_graph();
        let edge_attributes = |_, _| String::new();
        let node_attributes = |_, (user, _): (N, &N)| {
            let hue = self
                .community_of(user)
                .map_or(0.0, |id| (id as f32 * 0.618_034) % 1.0);
            format!(
                "label=\"{}\", style=filled, fillcolor=\"{:.3} 0.5 0.9\"",
                escape_label(&label(user)),
                hue
            )
        };
        let dot = Dot::with_attr_getters(
            graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &edge_attributes,
            &node_attributes,
        );

        std::fs::write(filename, format!("{:?}", dot))
    }

    /// Renders a DOT file to PNG with the `dot` executable.
    pub fn render_graph(dot_file: &Path, output_image: &Path) -> io::Result<()> {
        let status = Command::new("dot")
            .arg("-Tpng")
            .arg(dot_file)
            .arg("-o")
            .arg(output_image)
            .status()?;
        ensure_success("dot", status)
    }

    pub fn open_image(image: &Path) -> io::Result<()> {
        let opener = if cfg!(target_os = "windows") {
            "start"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };

        let status = Command::new(opener).arg(image).status()?;
        ensure_success(opener, status)
    }
}

/// Quotes a DOT label body: backslashes first, then double quotes.
fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn ensure_success(program: &str, status: ExitStatus) -> io::Result<()> {
    if !status.success() {
        return Err(io::Error::other(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_labels_every_user() {
        let mut detector =
            CommunityDetector::from_snapshot([1u32, 2, 3, 4], [(1, 2), (3, 4)]).unwrap();
        detector.detect_communities();

        assert_eq!(detector.number_of_communities(), 2);
        assert_eq!(detector.community_of(1), detector.community_of(2));
        assert_ne!(detector.community_of(1), detector.community_of(3));
        assert_eq!(detector.community_of(99), None);
        assert_eq!(detector.labels.len(), 4);
    }

    #[test]
    fn undetected_snapshot_reports_nothing() {
        let detector = CommunityDetector::from_snapshot([1u32], Vec::new()).unwrap();
        assert_eq!(detector.number_of_communities(), 0);
        assert!(detector.most_active().is_empty());
    }

    #[test]
    fn zero_users() {
        let (count, components) =
            compute_communities(Vec::<u32>::new(), Vec::new()).unwrap();
        assert_eq!(count, 0);
        assert!(components.is_empty());
        assert!(most_active_communities(Vec::<u32>::new(), Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn dangling_friendship_fails() {
        assert!(compute_communities([1u32], [(1, 2)]).is_err());
        assert!(most_active_communities([1u32], [(1, 2)]).is_err());
    }

    #[test]
    fn dot_output_contains_labels_and_edges() {
        let mut detector =
            CommunityDetector::from_snapshot(['a', 'b', 'c'], [('a', 'b')]).unwrap();
        detector.detect_communities();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        detector
            .save_graph_to_dot(&path, |user| format!("user {}", user))
            .unwrap();

        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("label=\"user a\""));
        assert!(dot.contains("label=\"user c\""));
        assert!(dot.contains("0 -- 1"));
    }

    #[test]
    fn dot_labels_escape_quotes_and_backslashes() {
        let mut detector = CommunityDetector::from_snapshot([1u32, 2], [(1, 2)]).unwrap();
        detector.detect_communities();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        detector
            .save_graph_to_dot(&path, |user| match user {
                1 => "ends in \\".to_string(),
                _ => "say \"hi\"".to_string(),
            })
            .unwrap();

        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.contains(r#"label="ends in \\""#));
        assert!(dot.contains(r#"label="say \"hi\"""#));
    }

    #[test]
    fn escape_label_doubles_backslashes_before_quoting() {
        assert_eq!(escape_label("plain"), "plain");
        assert_eq!(escape_label(r#"a\"b"#), r#"a\\\"b"#);
    }

    #[cfg(unix)]
    #[test]
    fn failed_exit_status_is_an_error() {
        use std::os::unix::process::ExitStatusExt;

        assert!(ensure_success("dot", ExitStatus::from_raw(0)).is_ok());
        let err = ensure_success("dot", ExitStatus::from_raw(1 << 8)).unwrap_err();
        assert!(err.to_string().starts_with("dot exited with"));
    }

    #[test]
    fn rendering_a_missing_dot_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.dot");
        let image = dir.path().join("out.png");

        // fails whether `dot` is absent or exits non-zero on the missing input
        assert!(CommunityDetector::<u32>::render_graph(&missing, &image).is_err());
        assert!(!image.exists());
    }
}
