//! postured - Posture Sentinel daemon
//!
//! This daemon:
//! 1. Loads user settings and process configuration
//! 2. Opens the webcam and the keypoint detector
//! 3. Samples posture every `check_interval` seconds on a background thread
//! 4. Logs good/bad spans to the statistics database and raises alerts
//!
//! Commands are read line by line from stdin: start, stop, toggle, stats, reload,
//! exit. Ctrl-C is treated as exit. A failed command is logged and the daemon keeps
//! running.

use anyhow::{anyhow, Result};
use std::io::BufRead;
use std::sync::mpsc;

use posture_sentinel::monitor::ShellResponse;
use posture_sentinel::{
    CameraSource, KeypointDetector, LogNotifier, Monitor, MonitorCommand, MonitorConfig,
    SettingsStore, Shell, SqliteStatisticsStore, StubBackend,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = MonitorConfig::load()?;
    let settings_store = SettingsStore::new(cfg.settings_path.clone());
    let settings = settings_store.load_or_default();
    log::info!(
        "settings: interval {}s, sensitivity {:.2}, notifications {}",
        settings.check_interval_secs(),
        settings.posture_sensitivity(),
        if settings.notifications_enabled { "on" } else { "off" }
    );

    let store = SqliteStatisticsStore::open(&cfg.db_path)?;
    let reader = SqliteStatisticsStore::open(&cfg.db_path)?;
    log::info!("statistics database: {}", cfg.db_path);

    let camera = CameraSource::new(cfg.camera.clone())?;
    let detector = build_detector(&cfg)?;
    let auto_start = settings.auto_start;

    let mut monitor = Monitor::new(
        camera,
        detector,
        Box::new(store),
        Box::new(LogNotifier),
        settings,
    )
    .with_policy(cfg.no_detection)
    .with_away_threshold(cfg.away_threshold);
    monitor.prepare()?;

    let mut shell = Shell::new(monitor, Box::new(reader), settings_store);

    let (tx, rx) = mpsc::channel::<MonitorCommand>();
    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(MonitorCommand::Exit);
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    std::thread::Builder::new()
        .name("postured-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<MonitorCommand>() {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("{}", e),
                }
            }
        })?;

    if auto_start {
        shell.dispatch(MonitorCommand::Start, posture_sentinel::now_s()?)?;
    } else {
        log::info!("auto start disabled; send 'start' to begin monitoring");
    }

    serve(&mut shell, &rx);
    log::info!("postured stopped");
    Ok(())
}

/// Dispatch commands until `Exit` arrives or every sender is gone.
fn serve(shell: &mut Shell, rx: &mpsc::Receiver<MonitorCommand>) {
    while let Ok(command) = rx.recv() {
        let now_s = match posture_sentinel::now_s() {
            Ok(now_s) => now_s,
            Err(e) if command != MonitorCommand::Exit => {
                log::error!("{:?} failed: {:#}", command, e);
                continue;
            }
            Err(_) => 0,
        };
        match shell.dispatch(command, now_s) {
            Ok(ShellResponse::Statistics(stats)) => log::info!(
                "today: {} checks, {:.1}% good posture, {}s tracked",
                stats.total_checks,
                stats.average_posture_score,
                stats.total_duration_secs
            ),
            Ok(ShellResponse::SettingsApplied(settings)) => log::info!(
                "settings applied: interval {}s, sensitivity {:.2}, notifications {}",
                settings.check_interval_secs(),
                settings.posture_sensitivity(),
                if settings.notifications_enabled { "on" } else { "off" }
            ),
            Ok(ShellResponse::Exiting) => break,
            Ok(response) => log::info!("{:?}", response),
            Err(e) => {
                log::error!("{:?} failed: {:#}", command, e);
                if command == MonitorCommand::Exit {
                    break;
                }
            }
        }
    }
}

fn build_detector(cfg: &MonitorConfig) -> Result<Box<dyn KeypointDetector>> {
    match &cfg.model_path {
        Some(path) => load_model(path, cfg),
        None => {
            log::warn!("POSTURE_MODEL_PATH not set; using the synthetic stub detector");
            Ok(Box::new(StubBackend::upright()))
        }
    }
}

#[cfg(feature = "backend-tract")]
fn load_model(path: &std::path::Path, cfg: &MonitorConfig) -> Result<Box<dyn KeypointDetector>> {
    let backend =
        posture_sentinel::TractBackend::new(path, cfg.camera.width, cfg.camera.height)?;
    log::info!("loaded pose model {}", path.display());
    Ok(Box::new(backend))
}

#[cfg(not(feature = "backend-tract"))]
fn load_model(path: &std::path::Path, _cfg: &MonitorConfig) -> Result<Box<dyn KeypointDetector>> {
    Err(anyhow!(
        "pose model {} requires building with the backend-tract feature",
        path.display()
    ))
}
