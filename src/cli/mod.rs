//! Command-line interface for streamlet.
//!
//! Each subcommand is implemented as a function that takes the parsed
//! arguments and returns an `anyhow::Result<()>`. Commands run on their own
//! tokio runtime.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::{self, Config};
use crate::cover::CoverResolver;
use crate::{db, scanner};

/// Streamlet CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: OS config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the music library and ingest new tracks
    Scan {
        /// Override the library root from the config
        path: Option<PathBuf>,
    },
    /// Reconcile cover artifacts for all known tracks
    Covers,
    /// Scan, then reconcile covers (the default when no command is given)
    Run,
    /// List all tracks in the database
    List,
    /// Record one play of a track, bumping its play counter
    Play {
        /// Database ID of the track
        id: i64,
    },
    /// Write the active configuration to the default config location
    InitConfig,
}

/// Run the specified CLI command, defaulting to the full pipeline.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = config::load(cli.config.as_deref());

    match &cli.command {
        Some(Commands::Scan { path }) => cmd_scan(&rt, &config, path.as_deref()),
        Some(Commands::Covers) => cmd_covers(&rt, &config),
        Some(Commands::Run) | None => cmd_run(&rt, &config),
        Some(Commands::List) => cmd_list(&rt, &config),
        Some(Commands::Play { id }) => cmd_play(&rt, &config, *id),
        Some(Commands::InitConfig) => {
            config::save(&config)?;
            if let Some(path) = config::config_path() {
                println!("Config written to {}", path.display());
            }
            Ok(())
        }
    }
}

async fn open_pool(config: &Config) -> anyhow::Result<sqlx::SqlitePool> {
    let db_url = db::db_url(config.library.db_path.as_deref());
    Ok(db::init_db(&db_url).await?)
}

fn cmd_scan(rt: &Runtime, config: &Config, path: Option<&std::path::Path>) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(config).await?;
        let root = path.unwrap_or(&config.library.root);

        println!("Scanning directory: {:?}", root);
        let summary = scanner::scan_library(&pool, root, config.library.scan_depth).await?;
        println!(
            "Scan complete. Added: {}, Skipped: {}, Errors: {}",
            summary.added, summary.skipped, summary.errors
        );
        Ok(())
    })
}

fn cmd_covers(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(config).await?;
        let resolver = CoverResolver::new(pool, config)?;

        let summary = resolver.reconcile_all().await?;
        println!(
            "Covers reconciled. Existing: {}, Embedded: {}, Downloaded: {}, Generated: {}, Errors: {}",
            summary.existing, summary.embedded, summary.downloaded, summary.generated, summary.errors
        );
        Ok(())
    })
}

/// Full pipeline: ingest the library, then make sure every track has a cover.
fn cmd_run(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(config).await?;

        info!("Starting library scan");
        let scan = scanner::scan_library(&pool, &config.library.root, config.library.scan_depth)
            .await?;
        println!(
            "Scan complete. Added: {}, Skipped: {}, Errors: {}",
            scan.added, scan.skipped, scan.errors
        );

        let resolver = CoverResolver::new(pool, config)?;
        let covers = resolver.reconcile_all().await?;
        println!(
            "Covers reconciled. Existing: {}, Embedded: {}, Downloaded: {}, Generated: {}, Errors: {}",
            covers.existing, covers.embedded, covers.downloaded, covers.generated, covers.errors
        );
        Ok(())
    })
}

fn cmd_play(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(config).await?;
        let Some(track) = db::get_track_by_id(&pool, id).await? else {
            anyhow::bail!("no track with id {id}");
        };
        let count = db::increment_play_count(&pool, id).await?;
        println!("{} - {} ({} plays)", track.artist, track.title, count);
        Ok(())
    })
}

fn cmd_list(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(config).await?;
        let tracks = db::get_all_tracks(&pool).await?;
        for track in tracks {
            println!(
                "{} - {} [{}]",
                track.artist,
                track.title,
                track.cover_url.as_deref().unwrap_or("no cover")
            );
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_defaults_to_pipeline() {
        let cli = Cli::parse_from(["streamlet"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_scan_with_path() {
        let cli = Cli::parse_from(["streamlet", "scan", "/srv/music"]);
        match cli.command {
            Some(Commands::Scan { path }) => {
                assert_eq!(path, Some(PathBuf::from("/srv/music")));
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_play_takes_track_id() {
        let cli = Cli::parse_from(["streamlet", "play", "7"]);
        match cli.command {
            Some(Commands::Play { id }) => assert_eq!(id, 7),
            _ => panic!("expected play command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["streamlet", "--config", "/tmp/c.toml", "covers"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Commands::Covers)));
    }
}
