//! posture_stats - print posture statistics from the local database

use anyhow::Result;
use clap::Parser;

use posture_sentinel::config::default_db_path;
use posture_sentinel::{DailyStats, SqliteStatisticsStore, StatisticsStore};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the statistics database (defaults to the per-user data dir).
    #[arg(long, env = "POSTURE_DB_PATH")]
    db_path: Option<String>,
    /// Show the last seven days instead of today.
    #[arg(long)]
    weekly: bool,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let db_path = match args.db_path {
        Some(path) => path,
        None => default_db_path()?.to_string_lossy().into_owned(),
    };
    let store = SqliteStatisticsStore::open(&db_path)?;
    let now_s = posture_sentinel::now_s()?;

    if args.weekly {
        let days = store.weekly_stats(now_s)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&days)?);
        } else if days.is_empty() {
            println!("no posture data recorded in the last 7 days");
        } else {
            print_header();
            for day in &days {
                print_row(day);
            }
        }
    } else {
        let today = store.daily_stats(now_s)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&today)?);
        } else {
            print_header();
            print_row(&today);
        }
    }
    Ok(())
}

fn print_header() {
    println!(
        "{:<12} {:>8} {:>6} {:>8} {:>10}",
        "date", "checks", "good", "good %", "tracked"
    );
}

fn print_row(day: &DailyStats) {
    println!(
        "{:<12} {:>8} {:>6} {:>7.1}% {:>10}",
        day.date,
        day.total_checks,
        day.good_posture_count,
        day.average_posture_score,
        format_duration(day.total_duration_secs)
    );
}

fn format_duration(secs: u64) -> String {
    format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
}
