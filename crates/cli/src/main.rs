//! wac - watch files, copy them on change

use anyhow::{bail, Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use wac_core::{Config, ConfigError, DEFAULT_CONFIG_FILE};
use watcher::registry::{self, ActiveWatchList};
use watcher::{build_active_list, Poller, DEFAULT_POLL_INTERVAL};

mod discover;

/// Watch a file or files for changes and copy each changed file to a
/// destination directory. For more complex setups, a wac.config.json
/// file defines which files to watch and where to copy them.
#[derive(Parser)]
#[command(name = "wac")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source directory to look for watch files in
    find: Option<PathBuf>,

    /// Destination directory changed files are copied to
    dest: Option<PathBuf>,

    /// File name(s) or pattern(s) used to find files to watch
    #[arg(short, long, num_args = 1..)]
    name: Vec<String>,

    /// Search subdirectories; nested hits are copied to same-named
    /// directories under the destination
    #[arg(short, long)]
    recursive: bool,

    /// Run the watcher from the wac.config.json watch list
    #[arg(long)]
    conf: bool,

    /// Apply --add/--delete to the ignore list instead of the watch
    /// list
    #[arg(short, long)]
    ignore: bool,

    /// Add file(s) and destination to the config watch list (or the
    /// ignore list with --ignore)
    #[arg(short, long, conflicts_with = "delete")]
    add: bool,

    /// Remove file(s) and destination from the config watch list (or
    /// the ignore list with --ignore)
    #[arg(short, long)]
    delete: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut cli = Cli::parse();

    let discovered = match (&cli.find, &cli.dest) {
        (Some(_), None) | (None, Some(_)) => {
            bail!("a destination must be provided for watch files")
        }
        (None, None) => {
            // No positional args defaults to config mode.
            cli.conf = true;
            None
        }
        (Some(find), Some(dest)) => {
            if cli.name.is_empty() {
                bail!("a file name or pattern must be provided with --name");
            }
            let files = discover::discover(find, dest, &cli.name, cli.recursive)?;
            Some((files, dest.clone()))
        }
    };

    match discovered {
        Some((files, dest)) if !(cli.conf || cli.add || cli.delete) => {
            // Ad-hoc session: watch the discovered files directly,
            // nothing persisted.
            run_session(registry::single_group(files, &dest)).await;
        }
        discovered => run_config_mode(&cli, discovered).await?,
    }

    Ok(())
}

/// Config-backed modes: apply --add/--delete edits, then watch with
/// --conf.
async fn run_config_mode(cli: &Cli, discovered: Option<(Vec<PathBuf>, PathBuf)>) -> Result<()> {
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let mut config = load_or_create(config_path)?;

    if cli.add || cli.delete {
        match &discovered {
            Some((files, dest)) if !files.is_empty() => {
                apply_config_edit(cli, &mut config, files, dest);
            }
            _ => println!("No files matched; config unchanged."),
        }
        wac_core::save(&config, config_path).context("failed to write config file")?;
    }

    if cli.conf {
        run_session(build_active_list(&config)).await;
    }

    Ok(())
}

/// Apply an --add/--delete intent to the loaded config.
fn apply_config_edit(cli: &Cli, config: &mut Config, files: &[PathBuf], dest: &Path) {
    if cli.add {
        if cli.ignore {
            config.add_ignore_files(files);
            println!("Added {} file(s) to the ignore list.", files.len());
        } else {
            config.add_watch_files(files, dest);
            println!(
                "Added {} file(s) to the watch list for {}.",
                files.len(),
                dest.display()
            );
        }
    } else if cli.delete {
        if cli.ignore {
            config.remove_ignore_files(files);
            println!("Removed {} file(s) from the ignore list.", files.len());
        } else {
            config.remove_watch_files(files, dest);
            println!(
                "Removed {} file(s) from the watch list for {}.",
                files.len(),
                dest.display()
            );
        }
    }
}

/// Load the config, offering to create an empty one when it does not
/// exist yet. Declining is fatal: no config, no watching.
fn load_or_create(path: &Path) -> Result<Config> {
    match wac_core::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            if prompt_create(path)? {
                let config = Config::default();
                wac_core::save(&config, path).context("failed to create config file")?;
                println!("Created {}.", path.display());
                Ok(config)
            } else {
                bail!("could not load config file: file does not exist");
            }
        }
        Err(err) => Err(err).context("failed to load config file"),
    }
}

fn prompt_create(path: &Path) -> Result<bool> {
    print!(
        "Could not find {}. Would you like to create one? (y/n): ",
        path.display()
    );
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read answer")?;
    let answer = answer.trim().to_ascii_lowercase();

    Ok(answer == "y" || answer == "yes")
}

/// Run the polling loop until Ctrl-C.
async fn run_session(list: ActiveWatchList) {
    println!(
        "{} {} file(s) across {} destination(s). Press Ctrl-C to stop.",
        "Watching".green().bold(),
        list.len(),
        list.groups.len()
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(err) => {
                // Without a signal handler the loop can only be killed
                // externally; keep running rather than exiting at once.
                tracing::error!("failed to listen for Ctrl-C: {err}");
                std::future::pending::<()>().await
            }
        }
    };

    Poller::new(list, DEFAULT_POLL_INTERVAL).run(shutdown).await;

    println!("{}", "Stopped.".dimmed());
}
