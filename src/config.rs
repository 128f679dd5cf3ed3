use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::monitor::NoDetectionPolicy;
use crate::scoring::{clamp_sensitivity, ScoringConfig};
use crate::session::DEFAULT_AWAY_THRESHOLD;
use crate::storage::DEFAULT_DB_FILE;

const APP_DIR_WINDOWS: &str = "PostureSentinel";
const APP_DIR_UNIX: &str = "posture-sentinel";
const SETTINGS_FILE: &str = "settings.json";

pub const MIN_CHECK_INTERVAL_SECS: u32 = 10;
pub const MAX_CHECK_INTERVAL_SECS: u32 = 300;

const DEFAULT_NOTIFICATIONS: bool = true;
const DEFAULT_CHECK_INTERVAL_SECS: u32 = 30;
const DEFAULT_SENSITIVITY: f32 = 0.5;
const DEFAULT_AUTO_START: bool = true;

const DEFAULT_CAMERA: &str = "stub://webcam";
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;

// -------------------- User settings --------------------

#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    notifications_enabled: Option<bool>,
    check_interval: Option<i64>,
    posture_sensitivity: Option<f64>,
    auto_start: Option<bool>,
}

/// User-facing settings persisted as `settings.json`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settings {
    pub notifications_enabled: bool,
    #[serde(rename = "check_interval")]
    check_interval_secs: u32,
    posture_sensitivity: f32,
    pub auto_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: DEFAULT_NOTIFICATIONS,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            posture_sensitivity: DEFAULT_SENSITIVITY,
            auto_start: DEFAULT_AUTO_START,
        }
    }
}

impl Settings {
    fn from_file(file: SettingsFile) -> Self {
        let mut settings = Self::default();
        if let Some(enabled) = file.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
        if let Some(interval) = file.check_interval {
            let interval = interval.clamp(
                MIN_CHECK_INTERVAL_SECS as i64,
                MAX_CHECK_INTERVAL_SECS as i64,
            );
            settings.set_check_interval_secs(interval as u32);
        }
        if let Some(sensitivity) = file.posture_sensitivity {
            settings.set_posture_sensitivity(sensitivity as f32);
        }
        if let Some(auto_start) = file.auto_start {
            settings.auto_start = auto_start;
        }
        settings
    }

    pub fn check_interval_secs(&self) -> u32 {
        self.check_interval_secs
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs as u64)
    }

    pub fn set_check_interval_secs(&mut self, seconds: u32) {
        self.check_interval_secs = seconds.clamp(MIN_CHECK_INTERVAL_SECS, MAX_CHECK_INTERVAL_SECS);
    }

    pub fn posture_sensitivity(&self) -> f32 {
        self.posture_sensitivity
    }

    pub fn set_posture_sensitivity(&mut self, sensitivity: f32) {
        self.posture_sensitivity = clamp_sensitivity(sensitivity);
    }

    /// Scoring thresholds for one evaluation, derived from these settings.
    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig::default().with_sensitivity(self.posture_sensitivity)
    }
}

/// File-backed settings.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings, writing a default file first if none exists.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            let settings = Settings::default();
            self.save(&settings)?;
            log::info!("created default settings at {}", self.path.display());
            return Ok(settings);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow!("failed to read settings {}: {}", self.path.display(), e))?;
        let file: SettingsFile = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid settings {}: {}", self.path.display(), e))?;
        Ok(Settings::from_file(file))
    }

    /// Like `load`, but any failure yields defaults.
    pub fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("using default settings: {:#}", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create settings dir {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write settings {}", self.path.display()))?;
        Ok(())
    }
}

/// Per-user directory for configuration files.
pub fn config_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        return local_app_data();
    }
    if let Some(dir) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir).join(APP_DIR_UNIX));
    }
    let home = non_empty_env("HOME").ok_or_else(|| anyhow!("HOME is not set"))?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR_UNIX))
}

/// Per-user directory for application data.
pub fn data_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        return local_app_data();
    }
    if let Some(dir) = non_empty_env("XDG_DATA_HOME") {
        return Ok(PathBuf::from(dir).join(APP_DIR_UNIX));
    }
    let home = non_empty_env("HOME").ok_or_else(|| anyhow!("HOME is not set"))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join(APP_DIR_UNIX))
}

fn local_app_data() -> Result<PathBuf> {
    let base = non_empty_env("LOCALAPPDATA").ok_or_else(|| anyhow!("LOCALAPPDATA is not set"))?;
    Ok(PathBuf::from(base).join(APP_DIR_WINDOWS))
}

pub fn default_settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DEFAULT_DB_FILE))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// -------------------- Daemon wiring --------------------

#[derive(Clone, Debug)]
pub struct CameraSettings {
    /// `stub://...` for a synthetic camera, otherwise a device path.
    pub device: String,
    pub width: u32,
    pub height: u32,
}

/// Process-level configuration for `postured`, taken from the environment.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub settings_path: PathBuf,
    pub db_path: String,
    pub camera: CameraSettings,
    pub model_path: Option<PathBuf>,
    pub away_threshold: Duration,
    pub no_detection: NoDetectionPolicy,
}

impl MonitorConfig {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::defaults()?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn defaults() -> Result<Self> {
        let settings_path = match non_empty_env("POSTURE_SETTINGS") {
            Some(path) => PathBuf::from(path),
            None => default_settings_path()?,
        };
        let db_path = match non_empty_env("POSTURE_DB_PATH") {
            Some(path) => path,
            None => default_db_path()?.to_string_lossy().into_owned(),
        };
        Ok(Self {
            settings_path,
            db_path,
            camera: CameraSettings {
                device: DEFAULT_CAMERA.to_string(),
                width: DEFAULT_CAMERA_WIDTH,
                height: DEFAULT_CAMERA_HEIGHT,
            },
            model_path: None,
            away_threshold: DEFAULT_AWAY_THRESHOLD,
            no_detection: NoDetectionPolicy::default(),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(device) = non_empty_env("POSTURE_CAMERA") {
            self.camera.device = device;
        }
        if let Some(width) = non_empty_env("POSTURE_CAMERA_WIDTH") {
            self.camera.width = width
                .parse()
                .map_err(|_| anyhow!("POSTURE_CAMERA_WIDTH must be an integer"))?;
        }
        if let Some(height) = non_empty_env("POSTURE_CAMERA_HEIGHT") {
            self.camera.height = height
                .parse()
                .map_err(|_| anyhow!("POSTURE_CAMERA_HEIGHT must be an integer"))?;
        }
        if let Some(model) = non_empty_env("POSTURE_MODEL_PATH") {
            self.model_path = Some(PathBuf::from(model));
        }
        if let Some(away) = non_empty_env("POSTURE_AWAY_SECS") {
            let seconds: u64 = away.parse().map_err(|_| {
                anyhow!("POSTURE_AWAY_SECS must be an integer number of seconds")
            })?;
            self.away_threshold = Duration::from_secs(seconds);
        }
        if let Some(policy) = non_empty_env("POSTURE_NO_DETECTION") {
            self.no_detection = policy.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        if self.away_threshold.as_secs() == 0 {
            return Err(anyhow!("away threshold must be greater than zero"));
        }
        if self.db_path.trim().is_empty() {
            return Err(anyhow!("database path must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() -> Result<()> {
        let file: SettingsFile = serde_json::from_str(r#"{"auto_start": false}"#)?;
        let settings = Settings::from_file(file);
        assert!(!settings.auto_start);
        assert!(settings.notifications_enabled);
        assert_eq!(settings.check_interval_secs(), 30);
        assert_eq!(settings.posture_sensitivity(), 0.5);
        Ok(())
    }

    #[test]
    fn out_of_range_values_are_clamped() -> Result<()> {
        let file: SettingsFile = serde_json::from_str(
            r#"{"check_interval": 5000, "posture_sensitivity": -2.0}"#,
        )?;
        let settings = Settings::from_file(file);
        assert_eq!(settings.check_interval_secs(), MAX_CHECK_INTERVAL_SECS);
        assert_eq!(settings.posture_sensitivity(), 0.1);

        let mut settings = Settings::default();
        settings.set_check_interval_secs(1);
        assert_eq!(settings.check_interval_secs(), MIN_CHECK_INTERVAL_SECS);
        Ok(())
    }

    #[test]
    fn settings_serialize_with_file_keys() -> Result<()> {
        let json = serde_json::to_value(Settings::default())?;
        assert_eq!(json["notifications_enabled"], true);
        assert_eq!(json["check_interval"], 30);
        assert_eq!(json["posture_sensitivity"], 0.5);
        assert_eq!(json["auto_start"], true);
        Ok(())
    }

    #[test]
    fn scoring_config_carries_sensitivity() {
        let mut settings = Settings::default();
        settings.set_posture_sensitivity(0.8);
        assert_eq!(settings.scoring_config().sensitivity, 0.8);
    }
}
