use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::communities::CommunityDetector;
use crate::error::{NetworkError, Result};
use crate::store::SocialStore;
use crate::validate::{ValidationStrategy, validate_friendship, validate_user};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(UserId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        User {
            id: UserId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} <{}> ({})", self.first_name, self.last_name, self.email, self.id)
    }
}

/// Unordered pair of users, stored lowest id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FriendshipKey(UserId, UserId);

impl FriendshipKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            FriendshipKey(a, b)
        } else {
            FriendshipKey(b, a)
        }
    }

    pub fn users(&self) -> (UserId, UserId) {
        (self.0, self.1)
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.0 == user || self.1 == user
    }

    /// The member of the pair that is not `user`.
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if self.0 == user {
            Some(self.1)
        } else if self.1 == user {
            Some(self.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friendship {
    pub key: FriendshipKey,
    pub since: NaiveDateTime,
}

/// In-memory social network of users and their friendships.
#[derive(Debug, Default, Clone)]
pub struct Network {
    users: BTreeMap<UserId, User>,
    friendships: BTreeMap<FriendshipKey, Friendship>,
    /// Lowercased email of every user.
    emails: HashMap<String, UserId>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        strategy: ValidationStrategy,
    ) -> Result<UserId> {
        let user = User::new(first_name, last_name, email);
        let id = user.id;
        self.insert_user(user, strategy)?;
        Ok(id)
    }

    pub fn insert_user(&mut self, user: User, strategy: ValidationStrategy) -> Result<()> {
        validate_user(&user, strategy)?;
        if self.users.contains_key(&user.id) {
            return Err(NetworkError::DuplicateUser(user.id));
        }
        let email = user.email.to_ascii_lowercase();
        if self.emails.contains_key(&email) {
            return Err(NetworkError::DuplicateEmail(user.email));
        }
        debug!("Adding user {}", user);
        self.emails.insert(email, user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Removes a user together with all of their friendships.
    pub fn remove_user(&mut self, id: UserId) -> Result<User> {
        let user = self.users.remove(&id).ok_or(NetworkError::UserNotFound(id))?;
        self.emails.remove(&user.email.to_ascii_lowercase());
        let before = self.friendships.len();
        self.friendships.retain(|key, _| !key.involves(id));
        debug!(
            "Removed user {} and {} friendships",
            user,
            before - self.friendships.len()
        );
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or(NetworkError::UserNotFound(id))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn add_friendship(&mut self, a: UserId, b: UserId) -> Result<()> {
        self.add_friendship_at(a, b, Local::now().naive_local())
    }

    pub fn add_friendship_at(&mut self, a: UserId, b: UserId, since: NaiveDateTime) -> Result<()> {
        validate_friendship(a, b)?;
        self.user(a)?;
        self.user(b)?;

        let key = FriendshipKey::new(a, b);
        if self.friendships.contains_key(&key) {
            return Err(NetworkError::DuplicateFriendship(a, b));
        }
        self.friendships.insert(key, Friendship { key, since });
        Ok(())
    }

    /// Removes the friendship between `a` and `b`, in either order.
    pub fn remove_friendship(&mut self, a: UserId, b: UserId) -> Result<Friendship> {
        self.friendships
            .remove(&FriendshipKey::new(a, b))
            .ok_or(NetworkError::FriendshipNotFound(a, b))
    }

    pub fn friendships(&self) -> impl Iterator<Item = &Friendship> {
        self.friendships.values()
    }

    pub fn friendship_count(&self) -> usize {
        self.friendships.len()
    }

    pub fn are_friends(&self, a: UserId, b: UserId) -> bool {
        self.friendships.contains_key(&FriendshipKey::new(a, b))
    }

    pub fn friends_of(&self, id: UserId) -> Result<Vec<&User>> {
        self.user(id)?;
        Ok(self
            .friendships
            .keys()
            .filter_map(|key| key.other(id))
            .filter_map(|friend| self.users.get(&friend))
            .collect())
    }

    /// Friend count of every user with at least one friend.
    fn friend_counts(&self) -> HashMap<UserId, usize> {
        let mut counts = HashMap::with_capacity(self.users.len());
        for key in self.friendships.keys() {
            let (a, b) = key.users();
            *counts.entry(a).or_insert(0) += 1;
            *counts.entry(b).or_insert(0) += 1;
        }
        counts
    }

    /// Users with at least `minimum` friends, most connected first, then by
    /// first and last name.
    pub fn users_with_minimum_friends(&self, minimum: usize) -> Vec<(&User, usize)> {
        let counts = self.friend_counts();
        let mut found: Vec<(&User, usize)> = self
            .users
            .values()
            .map(|user| (user, counts.get(&user.id).copied().unwrap_or(0)))
            .filter(|&(_, count)| count >= minimum)
            .collect();
        found.sort_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        found
    }

    /// Friends of `id` whose friendship started in `month` (1 to 12), with the
    /// friendship date.
    pub fn friends_from_month(&self, id: UserId, month: u32) -> Result<Vec<(&User, NaiveDateTime)>> {
        if !(1..=12).contains(&month) {
            return Err(NetworkError::InvalidMonth(month));
        }
        self.user(id)?;
        Ok(self
            .friendships
            .values()
            .filter(|friendship| friendship.since.month() == month)
            .filter_map(|friendship| {
                let friend = friendship.key.other(id)?;
                self.users.get(&friend).map(|user| (user, friendship.since))
            })
            .collect())
    }

    pub fn last_name_contains(&self, fragment: &str) -> Vec<&User> {
        let needle = fragment.to_lowercase();
        self.users
            .values()
            .filter(|user| user.last_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Snapshots the network and runs community detection over it.
    pub fn communities(&self) -> Result<CommunityDetector<UserId>> {
        let mut detector = CommunityDetector::from_store(self)?;
        detector.detect_communities();
        Ok(detector)
    }
}

impl SocialStore for Network {
    type Id = UserId;

    fn list_all_user_ids(&self) -> Vec<UserId> {
        self.users.keys().copied().collect()
    }

    fn list_all_friendship_pairs(&self) -> Vec<(UserId, UserId)> {
        self.friendships.keys().map(FriendshipKey::users).collect()
    }
}
