mod config;
mod error;
mod models;
mod services;
mod utils;

use crate::config::Config;
use crate::models::dashboard::DuoStats;
use crate::models::types::{DuoRequest, RiotId, Server};
use crate::services::api::RiotClient;
use crate::services::update::{self, RefreshSettings};
use crate::utils::storage::StatsCache;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "duo-stats")]
#[command(about = "Double Up stats for two TFT players", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fresh stats for a pair, unless its cooldown is still running
    Update {
        /// First player, as name#tag
        player1: RiotId,
        /// Teammate, as name#tag
        player2: RiotId,
        /// NA, BR, LAN, LAS, EUW, EUNE, TR, KR or JP
        #[arg(short, long)]
        server: Server,
    },

    /// Print cached stats without touching the API
    Show {
        player1: Option<RiotId>,
        player2: Option<RiotId>,
        #[arg(short, long)]
        server: Option<Server>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "duo_stats=debug"
    } else {
        "duo_stats=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Update {
            player1,
            player2,
            server,
        } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let request = DuoRequest {
                player1,
                player2,
                server,
            };
            let api = RiotClient::new(&config, server);
            let mut cache = StatsCache::open(&config.cache_file);
            let settings = RefreshSettings {
                cooldown: config.cooldown,
                concurrency: config.fetch_concurrency,
            };

            let outcome = update::refresh(&api, &mut cache, &request, settings, Utc::now())
                .await
                .with_context(|| format!("Error saving to cache file {}", cache.path().display()))?;
            render(cli.output, &outcome.status(), outcome.stats());
            if outcome.is_failure() {
                process::exit(1);
            }
        }
        Commands::Show {
            player1,
            player2,
            server,
        } => {
            let cache = StatsCache::open(config::cache_file_from_env());
            let stats = match (player1, player2, server) {
                (Some(player1), Some(player2), Some(server)) => {
                    let key = StatsCache::key(&DuoRequest {
                        player1,
                        player2,
                        server,
                    });
                    cache.stats(&key)
                }
                (None, None, None) => cache.latest(),
                _ => bail!("show needs both players and --server, or nothing at all"),
            };
            let status = if stats.is_some() {
                "Cached stats"
            } else {
                "No cached stats yet"
            };
            render(cli.output, status, stats);
        }
    }
    Ok(())
}

fn render(format: OutputFormat, status: &str, stats: Option<&DuoStats>) {
    let placeholder;
    let stats = match stats {
        Some(stats) => stats,
        None => {
            placeholder = DuoStats::placeholder();
            &placeholder
        }
    };
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "status": status, "stats": stats });
            println!("{}", body);
        }
        OutputFormat::Pretty => print_pretty(status, stats),
    }
}

fn print_pretty(status: &str, stats: &DuoStats) {
    println!("{}", status);
    println!();
    for p in [&stats.player1, &stats.player2] {
        let rank = p.rank.as_deref().unwrap_or("-");
        if p.tag.is_empty() {
            println!("{} [{}]", p.name, rank);
        } else {
            println!("{}#{} [{}]", p.name, p.tag, rank);
        }
        if let Some(traits) = &p.favorite_traits {
            let listed: Vec<String> = traits
                .iter()
                .map(|t| format!("{} ({})", t.name, t.count))
                .collect();
            println!("  favorite traits: {}", listed.join(", "));
        }
    }
    println!();
    println!(
        "Games: {}  Wins: {}  Win rate: {:.1}%  Best streak: {}",
        stats.total_games, stats.wins, stats.win_rate, stats.best_streak
    );
    if stats.match_history.is_empty() {
        return;
    }
    println!();
    for game in &stats.match_history {
        println!(
            "{}  #{}  {}  |  {}",
            game.local_datetime(),
            game.placement,
            game.player1_traits,
            game.player2_traits
        );
    }
}
