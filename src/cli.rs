use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use userloc_boundary as json;
use userloc_core::{
    cache::GeocodeCache,
    usecases::{group_users, resolve_users, GeocodeResolver},
};
use userloc_entities::{key::NormalizedKey, user::User};

use crate::{adapters, config::Config, gateways};

#[derive(Parser)]
#[command(name = "userloc")]
#[command(about = "Group users by location and place them on a map")]
#[command(version)]
struct Cli {
    /// Configuration file [default: userloc.toml]
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Group users by their normalized location without geocoding
    Group {
        /// JSON file with an array of users ('-' reads from stdin)
        users: PathBuf,
    },
    /// Geocode all user groups and calculate the map viewport
    Resolve {
        /// JSON file with an array of users ('-' reads from stdin)
        users: PathBuf,
    },
    /// Print the normalized lookup key of an address
    Normalize { text: String },
}

pub async fn run() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    match command {
        Command::Normalize { text } => {
            println!("{}", NormalizedKey::normalize(&text));
        }
        Command::Group { users } => {
            let groups: Vec<json::UserGroup> = group_users(read_users(&users)?)
                .into_iter()
                .map(Into::into)
                .collect();
            print_json(&groups)?;
        }
        Command::Resolve { users } => {
            let cfg = Config::try_load_from_file_or_default(config)?;
            let users = read_users(&users)?;
            let gateway = gateways::geocoding_gateway(&cfg.geocoding)?;
            let cache = GeocodeCache::new();
            let resolver = GeocodeResolver::new(&gateway, &cache)
                .with_country(cfg.geocoding.country_name)
                .with_retry_policy(cfg.geocoding.retry);
            let result = resolve_users(&resolver, users, &cfg.viewport).await;
            log::info!(
                "Resolved {} of {} locations ({} cached lookups)",
                result.resolved_count,
                result.resolved_count + result.unresolved_count,
                cache.len()
            );
            print_json(&adapters::json::resolution_result(result, &cfg.viewport))?;
        }
    }
    Ok(())
}

fn read_users(path: &Path) -> Result<Vec<User>> {
    if path == Path::new("-") {
        return adapters::json::read_users(io::stdin().lock());
    }
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    adapters::json::read_users(BufReader::new(file))
        .with_context(|| format!("Unable to read users from {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
