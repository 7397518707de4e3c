use crate::graph::UserKey;

/// Read side of a user/friendship store, as consumed by community detection.
///
/// Implementations must return a consistent snapshot: every id appearing in
/// a friendship pair also appears in the user list.
pub trait SocialStore {
    type Id: UserKey;

    /// Every user id, in a stable order.
    fn list_all_user_ids(&self) -> Vec<Self::Id>;

    /// Every friendship as an unordered pair.
    fn list_all_friendship_pairs(&self) -> Vec<(Self::Id, Self::Id)>;
}
