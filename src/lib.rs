//! Posture Sentinel
//!
//! Periodically samples a webcam, runs a pose-keypoint detector over the frame and
//! scores sitting posture from the geometry of the head, shoulders and spine.
//! Bad posture raises an alert; good/bad spans are logged to a local SQLite store
//! and can be summarized per day or week.
//!
//! # Module Structure
//!
//! - `keypoint`: BODY_25 keypoint layout and per-frame slots
//! - `scoring`: the pure posture scorer (keypoints in, verdict out)
//! - `session`: turns sampled verdicts into timed posture events
//! - `history`: bounded rolling score history
//! - `storage`: SQLite statistics store and daily/weekly aggregates
//! - `notify`: alert delivery and cooldown
//! - `config`: user settings file and process configuration
//! - `frame` / `ingest` / `detect`: webcam capture and detector backends
//! - `monitor`: the sampling loop and its command shell
//!
//! Raw frames never leave the process: they are handed to the detector and
//! zeroized on drop. Only keypoints, scores and event durations are retained.

use anyhow::Result;
use rand::RngCore;
use rusqlite::{Connection, OpenFlags};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod config;
pub mod detect;
pub mod frame;
pub mod history;
pub mod ingest;
pub mod keypoint;
pub mod monitor;
pub mod notify;
pub mod scoring;
pub mod session;
pub mod storage;

pub use config::{MonitorConfig, Settings, SettingsStore};
pub use detect::{KeypointDetector, ScriptedBackend, StubBackend};
pub use frame::RawFrame;
pub use history::ScoreHistory;
pub use ingest::CameraSource;
pub use keypoint::{BodyPart, DetectedKeypoint, Keypoint, KeypointFrame, KEYPOINT_COUNT};
pub use monitor::{Monitor, MonitorCommand, MonitorHandle, NoDetectionPolicy, SampleOutcome, Shell};
pub use notify::{LogNotifier, NotificationGate, Notifier};
pub use scoring::{evaluate, PostureCheck, PostureScorer, PostureVerdict, ScoringConfig};
pub use session::{PostureEvent, SessionTracker};
pub use storage::{DailyStats, SqliteStatisticsStore, StatisticsStore};

#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;

/// Current time in seconds since the Unix epoch.
pub fn now_s() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// URI for a private in-memory database that several connections can share.
pub fn shared_memory_uri() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!(
        "file:posture_sentinel_{:x}?mode=memory&cache=shared",
        u64::from_le_bytes(bytes)
    )
}

pub(crate) fn open_db_connection(db_path: &str) -> Result<Connection> {
    if db_path.starts_with("file:") {
        return Ok(Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?);
    }
    Ok(Connection::open(db_path)?)
}
