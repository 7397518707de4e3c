//! CSV persistence and synthetic network generation.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, Local, NaiveDateTime};
use csv::{Reader, Writer};
use log::info;
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::network::{Network, User, UserId};
use crate::validate::ValidationStrategy;

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct FriendshipRecord {
    user1: UserId,
    user2: UserId,
    since: NaiveDateTime,
}

/// Loads users and friendships from two CSV files.
///
/// Rows go through the same checks as interactive edits, so a friendship
/// naming an unknown user or repeating an earlier pair fails the load.
pub fn load_network(users_csv: &Path, friendships_csv: &Path) -> Result<Network> {
    let mut network = Network::new();

    for record in Reader::from_path(users_csv)?.deserialize() {
        let user: User = record?;
        network.insert_user(user, ValidationStrategy::Quick)?;
    }

    for record in Reader::from_path(friendships_csv)?.deserialize() {
        let friendship: FriendshipRecord = record?;
        network.add_friendship_at(friendship.user1, friendship.user2, friendship.since)?;
    }

    info!(
        "Loaded {} users and {} friendships",
        network.user_count(),
        network.friendship_count()
    );
    Ok(network)
}

pub fn save_network(network: &Network, users_csv: &Path, friendships_csv: &Path) -> Result<()> {
    let mut writer = Writer::from_path(users_csv)?;
    for user in network.users() {
        writer.serialize(user)?;
    }
    writer.flush()?;

    let mut writer = Writer::from_path(friendships_csv)?;
    for friendship in network.friendships() {
        let (user1, user2) = friendship.key.users();
        writer.serialize(FriendshipRecord {
            user1,
            user2,
            since: friendship.since,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub struct NameGenerator {
    first_names: Vec<&'static str>,
    last_names: Vec<&'static str>,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        NameGenerator {
            first_names: vec![
                "Ana", "Ion", "Laura", "Marius", "Vlad", "Florin", "Cosmin", "Oana", "Ioana",
                "Andrei", "Maria", "Radu", "Elena", "Mihai", "Irina", "Dan",
            ],
            last_names: vec![
                "Remus", "Chiriac", "Popovici", "Matei", "Andrei", "Manole", "Vantu", "Marin",
                "Ilie", "Pruna", "Florian", "Purice", "Pop", "Smith", "Snow", "Stan",
            ],
        }
    }

    /// Draws `count` names in parallel and keeps the distinct ones, so the
    /// batch may come back shorter than requested.
    pub fn generate_unique_batch(&self, count: usize) -> Vec<(String, String)> {
        let drawn: Vec<(String, String)> = (0..count)
            .into_par_iter()
            .map_init(thread_rng, |rng, _| self.draw(rng))
            .collect();
        distinct(drawn)
    }

    /// Sequential counterpart of [`generate_unique_batch`](Self::generate_unique_batch):
    /// the same `rng` state always yields the same batch.
    pub fn generate_unique_batch_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Vec<(String, String)> {
        let drawn: Vec<(String, String)> = (0..count).map(|_| self.draw(rng)).collect();
        distinct(drawn)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, String) {
        let first = self.first_names.choose(rng).copied().unwrap_or("Ana");
        let last = self.last_names.choose(rng).copied().unwrap_or("Pop");
        let suffix = rng.gen_range(1..100);
        (first.to_string(), format!("{}{}", last, to_letters(suffix)))
    }
}

fn distinct(drawn: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = HashSet::with_capacity(drawn.len());
    drawn
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Spells a number with lowercase letters so generated last names stay
/// alphabetic.
fn to_letters(mut n: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
        if n == 0 {
            break;
        }
    }
    letters.into_iter().rev().collect()
}

/// Builds a random network with up to `num_users` users and up to
/// `num_friendships` friendships dated within the last year.
///
/// Self-pairs and repeated pairs drawn by the generator are dropped.
pub fn generate_network(num_users: usize, num_friendships: usize) -> Result<Network> {
    let names = NameGenerator::new().generate_unique_batch(num_users);
    let (mut network, ids) = populate(names)?;
    if ids.len() < 2 {
        return Ok(network);
    }

    let now = Local::now().naive_local();
    let pairs: Vec<(UserId, UserId, NaiveDateTime)> = (0..num_friendships)
        .into_par_iter()
        .map_init(thread_rng, |rng, _| draw_friendship(rng, &ids, now))
        .collect();

    connect(&mut network, pairs)?;
    Ok(network)
}

/// Like [`generate_network`] but draws everything from `rng`, so a seeded
/// generator reproduces the same names and the same friendship structure.
pub fn generate_network_with<R: Rng + ?Sized>(
    rng: &mut R,
    num_users: usize,
    num_friendships: usize,
) -> Result<Network> {
    let names = NameGenerator::new().generate_unique_batch_with(rng, num_users);
    let (mut network, ids) = populate(names)?;
    if ids.len() < 2 {
        return Ok(network);
    }

    let now = Local::now().naive_local();
    let pairs: Vec<(UserId, UserId, NaiveDateTime)> = (0..num_friendships)
        .map(|_| draw_friendship(rng, &ids, now))
        .collect();

    connect(&mut network, pairs)?;
    Ok(network)
}

/// Adds one user per name and returns their ids in insertion order.
fn populate(names: Vec<(String, String)>) -> Result<(Network, Vec<UserId>)> {
    let mut network = Network::new();
    let mut ids = Vec::with_capacity(names.len());
    for (first, last) in names {
        let email = format!("{}.{}@mail.com", first, last).to_lowercase();
        ids.push(network.add_user(&first, &last, &email, ValidationStrategy::Strict)?);
    }
    Ok((network, ids))
}

fn draw_friendship<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &[UserId],
    now: NaiveDateTime,
) -> (UserId, UserId, NaiveDateTime) {
    let a = ids[rng.gen_range(0..ids.len())];
    let b = ids[rng.gen_range(0..ids.len())];
    let age = Duration::seconds(rng.gen_range(0..SECONDS_PER_YEAR));
    (a, b, now - age)
}

fn connect(network: &mut Network, pairs: Vec<(UserId, UserId, NaiveDateTime)>) -> Result<()> {
    for (a, b, since) in pairs {
        if a == b || network.are_friends(a, b) {
            continue;
        }
        network.add_friendship_at(a, b, since)?;
    }

    info!(
        "Generated {} users and {} friendships",
        network.user_count(),
        network.friendship_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::validate::validate_user;

    #[test]
    fn letters_are_lowercase_base26() {
        assert_eq!(to_letters(0), "a");
        assert_eq!(to_letters(25), "z");
        assert_eq!(to_letters(26), "ba");
    }

    #[test]
    fn batch_names_are_unique_and_strictly_valid() {
        let names = NameGenerator::new().generate_unique_batch(200);
        let distinct: HashSet<_> = names.iter().collect();

        assert!(!names.is_empty());
        assert_eq!(distinct.len(), names.len());
        for (first, last) in &names {
            let user = User::new(first, last, "someone@mail.com");
            assert!(validate_user(&user, ValidationStrategy::Strict).is_ok());
        }
    }

    fn assert_consistent(network: &Network, max_users: usize, max_friendships: usize) {
        assert!(network.user_count() <= max_users);
        assert!(network.friendship_count() <= max_friendships);
        for friendship in network.friendships() {
            let (a, b) = friendship.key.users();
            assert_ne!(a, b);
            assert!(network.user(a).is_ok() && network.user(b).is_ok());
        }
    }

    #[test]
    fn generated_network_is_consistent() {
        let network = generate_network(30, 60).unwrap();
        assert_consistent(&network, 30, 60);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_network_with(&mut StdRng::seed_from_u64(11), 30, 20).unwrap();
        let second = generate_network_with(&mut StdRng::seed_from_u64(11), 30, 20).unwrap();
        assert_consistent(&first, 30, 20);

        let names = |network: &Network| -> Vec<String> {
            let mut names: Vec<String> = network.users().map(|user| user.full_name()).collect();
            names.sort();
            names
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(first.friendship_count(), second.friendship_count());
    }

    #[test]
    fn sparse_generated_network_has_communities() {
        let network = generate_network_with(&mut StdRng::seed_from_u64(3), 30, 20).unwrap();
        assert_consistent(&network, 30, 20);

        let detector = network.communities().unwrap();
        let members: usize = detector.communities().iter().map(|c| c.members.len()).sum();
        assert_eq!(members, network.user_count());
        // each friendship merges at most two communities
        let floor = network.user_count().saturating_sub(network.friendship_count());
        assert!(detector.number_of_communities() >= floor);
    }

    #[test]
    fn save_then_load_keeps_the_network() {
        let network = generate_network_with(&mut StdRng::seed_from_u64(5), 12, 20).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users.csv");
        let friendships = dir.path().join("friendships.csv");

        save_network(&network, &users, &friendships).unwrap();
        let loaded = load_network(&users, &friendships).unwrap();

        assert_eq!(loaded.user_count(), network.user_count());
        assert_eq!(loaded.friendship_count(), network.friendship_count());
        for friendship in network.friendships() {
            let (a, b) = friendship.key.users();
            assert!(loaded.are_friends(b, a));
        }
    }

    #[test]
    fn loading_a_dangling_friendship_fails() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("users.csv");
        let friendships = dir.path().join("friendships.csv");
        let known = UserId::new();
        std::fs::write(
            &users,
            format!("id,first_name,last_name,email\n{},Ana,Pop,ana@mail.com\n", known),
        )
        .unwrap();
        std::fs::write(
            &friendships,
            format!("user1,user2,since\n{},{},2024-05-01T10:00:00\n", known, UserId::new()),
        )
        .unwrap();

        assert!(load_network(&users, &friendships).is_err());
    }
}
