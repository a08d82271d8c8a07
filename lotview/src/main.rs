//! Live auction page.
//!
//! Renders the page into an in-memory live tree, either once or for a timed
//! run against a simulated backend, and prints the resulting markup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lotview::app::{RunOptions, render_once, run_app};
use lotview::io::api::{bundled_lots, load_lots_file};
use lotview::io::config::{AppConfig, CONFIG_FILE, load_config, write_config};
use lotview::logging;
use tokio::task::LocalSet;

#[derive(Parser, Debug)]
#[command(
    name = "lotview",
    version,
    about = "Live auction page rendered through a reconciling store"
)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Render the page once with lots loaded and print the markup.
    Render {
        /// Lot list (JSON). Defaults to the configured or bundled list.
        #[arg(long)]
        lots: Option<PathBuf>,
    },
    /// Run the page against the simulated backend and print the final markup.
    Run {
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        /// Click the favorite button of this lot half way through.
        #[arg(long)]
        favorite: Option<u64>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Render { lots } => cmd_render(&cli.config, lots.as_deref()),
        Command::Run { seconds, favorite } => cmd_run(&cli.config, seconds, favorite),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &AppConfig::default())
}

fn cmd_render(config: &Path, lots: Option<&Path>) -> Result<()> {
    let cfg = load_config(config)?;
    let lots = match lots.or(cfg.lots_path.as_deref()) {
        Some(path) => load_lots_file(path)?,
        None => bundled_lots()?,
    };
    let markup = render_once(lots, cfg.reconciler)?;
    println!("{}", markup);
    Ok(())
}

fn cmd_run(config: &Path, seconds: u64, favorite: Option<u64>) -> Result<()> {
    if seconds == 0 {
        bail!("--seconds must be > 0");
    }
    let cfg = load_config(config)?;
    let options = RunOptions {
        duration: Duration::from_secs(seconds),
        favorite,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build runtime")?;
    let local = LocalSet::new();
    let report = runtime.block_on(local.run_until(run_app(&cfg, &options)))?;
    println!("{}", report.markup);
    println!("renders: {}", report.renders);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_five_seconds() {
        let cli = Cli::try_parse_from(["lotview", "run"]).expect("parse");
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
        match cli.command {
            Command::Run { seconds, favorite } => {
                assert_eq!(seconds, 5);
                assert_eq!(favorite, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_config_flag_follows_subcommand() {
        let cli = Cli::try_parse_from(["lotview", "render", "--config", "other.toml"])
            .expect("parse");
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn favorite_requires_numeric_id() {
        assert!(Cli::try_parse_from(["lotview", "run", "--favorite", "apple"]).is_err());
        let cli = Cli::try_parse_from(["lotview", "run", "--seconds", "2", "--favorite", "1"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Run {
                seconds: 2,
                favorite: Some(1)
            }
        ));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        cmd_init(&path, false).expect("first init");
        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).expect("forced init");
        assert_eq!(load_config(&path).expect("load"), AppConfig::default());
    }
}
