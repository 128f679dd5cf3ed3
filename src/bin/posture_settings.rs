//! posture_settings - show or update the user settings file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use posture_sentinel::SettingsStore;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (defaults to the per-user config dir).
    #[arg(long, env = "POSTURE_SETTINGS")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current settings as JSON.
    Show,
    /// Update one or more settings. Values are clamped to their valid ranges.
    Set {
        #[arg(long)]
        notifications: Option<bool>,
        /// Seconds between samples, 10-300.
        #[arg(long)]
        check_interval: Option<u32>,
        /// 0.1 (lenient) to 1.0 (strict).
        #[arg(long)]
        sensitivity: Option<f32>,
        #[arg(long)]
        auto_start: Option<bool>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let store = match args.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::at_default_path()?,
    };
    let mut settings = store.load()?;

    if let Some(Command::Set {
        notifications,
        check_interval,
        sensitivity,
        auto_start,
    }) = args.command
    {
        if let Some(enabled) = notifications {
            settings.notifications_enabled = enabled;
        }
        if let Some(seconds) = check_interval {
            settings.set_check_interval_secs(seconds);
        }
        if let Some(sensitivity) = sensitivity {
            settings.set_posture_sensitivity(sensitivity);
        }
        if let Some(auto_start) = auto_start {
            settings.auto_start = auto_start;
        }
        store.save(&settings)?;
        log::info!("settings written to {}", store.path().display());
    }

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
