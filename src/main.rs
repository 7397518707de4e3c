use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use friend_communities::dataset::{
    generate_network, generate_network_with, load_network, save_network,
};
use friend_communities::logger::init_logger;
use friend_communities::{CommunityDetector, Network, UserId};

#[derive(Parser)]
#[command(name = "friend-communities", version, about = "Find the most active communities of a friendship network")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a random network as users.csv and friendships.csv.
    Generate {
        #[arg(long, default_value_t = 40)]
        users: usize,
        #[arg(long, default_value_t = 50)]
        friendships: usize,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Seed the generator for a reproducible network.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print every community and the most active ones.
    Analyze {
        #[command(flatten)]
        data: DataArgs,
        /// Write the graph as Graphviz DOT.
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Render the DOT file to PNG (needs graphviz).
        #[arg(long, requires = "dot")]
        png: Option<PathBuf>,
        /// Open the rendered PNG.
        #[arg(long, requires = "png")]
        open: bool,
    },
    /// List users with at least N friends.
    Popular {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value_t = 1)]
        min: usize,
    },
}

#[derive(Args)]
struct DataArgs {
    #[arg(long, default_value = "users.csv")]
    users: PathBuf,
    #[arg(long, default_value = "friendships.csv")]
    friendships: PathBuf,
}

impl DataArgs {
    fn load(&self) -> Result<Network> {
        load_network(&self.users, &self.friendships).with_context(|| {
            format!(
                "failed to load {} and {}",
                self.users.display(),
                self.friendships.display()
            )
        })
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Generate {
            users,
            friendships,
            out,
            seed,
        } => generate(users, friendships, &out, seed),
        Commands::Analyze {
            data,
            dot,
            png,
            open,
        } => analyze(&data.load()?, dot.as_deref(), png.as_deref(), open),
        Commands::Popular { data, min } => popular(&data.load()?, min),
    }
}

fn generate(users: usize, friendships: usize, out: &Path, seed: Option<u64>) -> Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let network = match seed {
        Some(seed) => generate_network_with(&mut StdRng::seed_from_u64(seed), users, friendships)?,
        None => generate_network(users, friendships)?,
    };
    let users_csv = out.join("users.csv");
    let friendships_csv = out.join("friendships.csv");
    save_network(&network, &users_csv, &friendships_csv)?;

    println!(
        "Wrote {} users to {} and {} friendships to {}",
        network.user_count(),
        users_csv.display(),
        network.friendship_count(),
        friendships_csv.display()
    );
    Ok(())
}

fn analyze(network: &Network, dot: Option<&Path>, png: Option<&Path>, open: bool) -> Result<()> {
    let detector = network.communities()?;
    let name = |id: UserId| {
        network
            .user(id)
            .map(|user| user.full_name())
            .unwrap_or_else(|_| id.to_string())
    };

    println!("Detected {} communities:", detector.number_of_communities());
    for (id, community) in detector.communities().iter().enumerate() {
        println!(
            "Community {} ({} members, longest path {})",
            id,
            community.members.len(),
            community.longest_path
        );
    }

    let most_active = detector.most_active();
    if let Some(first) = most_active.first() {
        println!("\nMost active (longest path {}):", first.longest_path);
        for community in &most_active {
            let members: Vec<String> = community.members.iter().map(|&id| name(id)).collect();
            println!("  {}", members.join(", "));
        }
        if first.longest_path == 0 {
            println!("Note: there are no friendships, so no community is more active than another.");
        }
    }

    if let Some(dot) = dot {
        detector
            .save_graph_to_dot(dot, name)
            .with_context(|| format!("failed to write {}", dot.display()))?;
        if let Some(png) = png {
            CommunityDetector::<UserId>::render_graph(dot, png).context("failed to run graphviz")?;
            if open {
                CommunityDetector::<UserId>::open_image(png)?;
            }
        }
    }
    Ok(())
}

fn popular(network: &Network, min: usize) -> Result<()> {
    let found = network.users_with_minimum_friends(min);
    if found.is_empty() {
        println!("No user has at least {} friends.", min);
    }
    for (user, friends) in found {
        println!("{} - {} friends", user, friends);
    }
    Ok(())
}
