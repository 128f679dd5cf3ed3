//! Sampling loop: camera -> detector -> scorer -> session -> store / notifier.
//!
//! `Monitor` performs one sample at a time and owns every piece of mutable state.
//! `MonitorHandle` runs it on a background thread, and `Shell` maps user commands
//! onto start/stop of that thread.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::{Settings, SettingsStore};
use crate::detect::KeypointDetector;
use crate::history::ScoreHistory;
use crate::ingest::CameraSource;
use crate::keypoint::KeypointFrame;
use crate::notify::{NotificationGate, Notifier, ALERT_MESSAGE, ALERT_TITLE};
use crate::scoring::{PostureScorer, PostureVerdict, ScoringConfig};
use crate::session::{PostureEvent, SessionTracker};
use crate::storage::{DailyStats, StatisticsStore};

/// What to record when a sample yields no usable keypoints, either because
/// capture/detection failed or because nobody is in view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoDetectionPolicy {
    /// Count the sample as good posture. Never alerts.
    #[default]
    AssumeGood,
    /// Record nothing; the session anchor is left untouched.
    Skip,
    /// Use the scorer's verdict (score 0, every check failed).
    Strict,
}

impl NoDetectionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AssumeGood => "assume-good",
            Self::Skip => "skip",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for NoDetectionPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assume-good" | "assume_good" => Ok(Self::AssumeGood),
            "skip" => Ok(Self::Skip),
            "strict" => Ok(Self::Strict),
            other => Err(anyhow!(
                "unknown no-detection policy '{}' (expected assume-good, skip or strict)",
                other
            )),
        }
    }
}

impl fmt::Display for NoDetectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single `Monitor::sample`.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleOutcome {
    /// Scorer output. `None` when nothing was detected and the policy did not
    /// ask for a strict verdict.
    pub verdict: Option<PostureVerdict>,
    /// Posture attributed to this sample; `None` when the sample was skipped.
    pub is_good_posture: Option<bool>,
    /// Event handed to the statistics store, if any.
    pub event: Option<PostureEvent>,
    /// Mean score over the rolling window, including this sample.
    pub recent_average: Option<f32>,
    pub notified: bool,
}

impl SampleOutcome {
    fn skipped() -> Self {
        Self {
            verdict: None,
            is_good_posture: None,
            event: None,
            recent_average: None,
            notified: false,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.is_good_posture.is_none()
    }
}

/// Number of check intervals the alerting average spans.
const ROLLING_WINDOW_INTERVALS: u32 = 3;

pub struct Monitor {
    camera: CameraSource,
    detector: Box<dyn KeypointDetector>,
    store: Box<dyn StatisticsStore>,
    notifier: Box<dyn Notifier>,
    scorer: PostureScorer,
    settings: Settings,
    scoring: ScoringConfig,
    policy: NoDetectionPolicy,
    session: SessionTracker,
    history: ScoreHistory,
    gate: NotificationGate,
}

impl Monitor {
    pub fn new(
        camera: CameraSource,
        detector: Box<dyn KeypointDetector>,
        store: Box<dyn StatisticsStore>,
        notifier: Box<dyn Notifier>,
        settings: Settings,
    ) -> Self {
        Self {
            camera,
            detector,
            store,
            notifier,
            scorer: PostureScorer::new(),
            scoring: settings.scoring_config(),
            settings,
            policy: NoDetectionPolicy::default(),
            session: SessionTracker::default(),
            history: ScoreHistory::new(),
            gate: NotificationGate::default(),
        }
    }

    pub fn with_policy(mut self, policy: NoDetectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_away_threshold(mut self, away_threshold: Duration) -> Self {
        self.session = SessionTracker::new(away_threshold);
        self
    }

    pub fn with_notification_cooldown(mut self, cooldown: Duration) -> Self {
        self.gate = NotificationGate::new(cooldown);
        self
    }

    /// Open the camera and warm up the detector so startup problems surface early.
    pub fn prepare(&mut self) -> Result<()> {
        self.camera.connect().context("connect camera")?;
        self.detector
            .warm_up()
            .with_context(|| format!("warm up {} detector", self.detector.name()))?;
        log::info!(
            "monitor ready: camera {}, detector {}, no-detection policy {}",
            self.camera.stats().device,
            self.detector.name(),
            self.policy
        );
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the user settings; takes effect on the next sample.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.scoring = settings.scoring_config();
        self.settings = settings;
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn statistics(&self, now_s: u64) -> Result<DailyStats> {
        self.store.daily_stats(now_s)
    }

    /// Forget the previous sample time, so a pause is never logged as posture.
    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    /// Take one sample at `now_s` (seconds since epoch).
    ///
    /// Capture and detection errors fall back to the no-detection policy. Store and
    /// notifier errors are logged and do not affect the outcome.
    pub fn sample(&mut self, now_s: u64) -> SampleOutcome {
        let frame = match self.observe() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("posture sample failed: {:#}", err);
                KeypointFrame::empty()
            }
        };

        let verdict = self.scorer.evaluate(&frame, &self.scoring);
        let verdict = if verdict.usable_keypoints() > 0 {
            Some(verdict)
        } else {
            match self.policy {
                NoDetectionPolicy::AssumeGood => None,
                NoDetectionPolicy::Skip => {
                    log::debug!("no usable keypoints; sample skipped");
                    return SampleOutcome::skipped();
                }
                NoDetectionPolicy::Strict => Some(verdict),
            }
        };
        let is_good_posture = verdict.as_ref().map_or(true, PostureVerdict::is_good);

        if let Some(verdict) = &verdict {
            self.history.push(now_s, verdict.score());
            log::debug!(
                "posture score {:.1} (failed: {:?})",
                verdict.score(),
                verdict.failed_checks()
            );
        }

        let event = self.session.observe(now_s, is_good_posture);
        if let Some(event) = &event {
            if let Err(err) = self.store.record_event(event, now_s) {
                log::warn!("failed to record posture event: {:#}", err);
            }
        }

        // Alerts gate on the rolling average, not on this sample alone.
        let window = self.settings.check_interval() * ROLLING_WINDOW_INTERVALS;
        let recent_average = self.history.recent_average(now_s, window);
        if let Some(average) = recent_average {
            log::debug!("rolling average score {:.2} over {}s", average, window.as_secs());
        }

        let mut notified = false;
        let slouching = verdict.is_some()
            && recent_average.map_or(false, |avg| avg < self.scoring.good_posture_score_threshold);
        if slouching && self.gate.ready(now_s, self.settings.notifications_enabled) {
            match self.notifier.notify(ALERT_TITLE, ALERT_MESSAGE) {
                Ok(()) => {
                    self.gate.mark_sent(now_s);
                    notified = true;
                }
                Err(err) => log::warn!("failed to deliver posture alert: {:#}", err),
            }
        }

        SampleOutcome {
            verdict,
            is_good_posture: Some(is_good_posture),
            event,
            recent_average,
            notified,
        }
    }

    fn observe(&mut self) -> Result<KeypointFrame> {
        if !self.camera.is_healthy() {
            log::info!("camera unhealthy; reconnecting");
            self.camera.connect()?;
        }
        let frame = self.camera.next_frame()?;
        log::debug!(
            "captured {} bytes at {}",
            frame.byte_len(),
            frame.captured_at_s
        );
        frame.run_detector(&mut *self.detector)
    }
}

// -------------------- Background loop --------------------

/// A monitor running on its own thread.
///
/// Stopping is cooperative: the flag is checked once per iteration and the
/// sleeping thread is unparked, so a sample already in progress completes first.
pub struct MonitorHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<Monitor>,
}

impl MonitorHandle {
    pub fn spawn(mut monitor: Monitor, interval: Duration) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("posture-monitor".to_string())
            .spawn(move || {
                log::info!("monitoring started (every {}s)", interval.as_secs());
                while flag.load(Ordering::SeqCst) {
                    match crate::now_s() {
                        Ok(now_s) => {
                            let outcome = monitor.sample(now_s);
                            if outcome.notified {
                                log::info!("posture alert sent");
                            }
                        }
                        Err(err) => log::warn!("system clock unavailable: {:#}", err),
                    }
                    let deadline = Instant::now() + interval;
                    while flag.load(Ordering::SeqCst) {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        thread::park_timeout(deadline - now);
                    }
                }
                monitor.reset_session();
                log::info!("monitoring stopped");
                monitor
            })
            .context("spawn monitor thread")?;
        Ok(Self { running, thread })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.thread.is_finished()
    }

    /// Stop the loop and hand the monitor back.
    pub fn stop(self) -> Result<Monitor> {
        self.running.store(false, Ordering::SeqCst);
        self.thread.thread().unpark();
        self.thread
            .join()
            .map_err(|_| anyhow!("monitor thread panicked"))
    }
}

// -------------------- Command shell --------------------

/// User commands, as issued from a tray menu or a terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorCommand {
    Start,
    Stop,
    Toggle,
    ShowStatistics,
    /// Re-read the settings file and apply it to the monitor.
    ReloadSettings,
    Exit,
}

impl FromStr for MonitorCommand {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "toggle" => Ok(Self::Toggle),
            "stats" | "statistics" => Ok(Self::ShowStatistics),
            "reload" | "settings" => Ok(Self::ReloadSettings),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(anyhow!("unknown command '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShellResponse {
    Started,
    Stopped,
    AlreadyRunning,
    AlreadyStopped,
    Statistics(DailyStats),
    SettingsApplied(Settings),
    Exiting,
}

enum ShellState {
    Idle(Monitor),
    Running(MonitorHandle),
    // Only observable if a stop failed part way.
    Gone,
}

/// Command dispatcher owning the monitor, a read-side statistics store and the
/// settings file.
pub struct Shell {
    state: ShellState,
    stats: Box<dyn StatisticsStore>,
    settings: SettingsStore,
}

impl Shell {
    pub fn new(monitor: Monitor, stats: Box<dyn StatisticsStore>, settings: SettingsStore) -> Self {
        Self {
            state: ShellState::Idle(monitor),
            stats,
            settings,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(&self.state, ShellState::Running(handle) if handle.is_running())
    }

    pub fn dispatch(&mut self, command: MonitorCommand, now_s: u64) -> Result<ShellResponse> {
        log::debug!("shell command {:?}", command);
        match command {
            MonitorCommand::Start => self.start(),
            MonitorCommand::Stop => self.stop(),
            MonitorCommand::Toggle => {
                if matches!(self.state, ShellState::Running(_)) {
                    self.stop()
                } else {
                    self.start()
                }
            }
            MonitorCommand::ShowStatistics => {
                Ok(ShellResponse::Statistics(self.stats.daily_stats(now_s)?))
            }
            MonitorCommand::ReloadSettings => self.reload_settings(),
            MonitorCommand::Exit => {
                self.stop()?;
                Ok(ShellResponse::Exiting)
            }
        }
    }

    fn start(&mut self) -> Result<ShellResponse> {
        match std::mem::replace(&mut self.state, ShellState::Gone) {
            ShellState::Idle(monitor) => self.spawn(monitor),
            ShellState::Running(handle) if handle.is_running() => {
                self.state = ShellState::Running(handle);
                Ok(ShellResponse::AlreadyRunning)
            }
            ShellState::Running(handle) => {
                // The loop exited on its own; joining surfaces a panic.
                log::warn!("monitor thread is no longer running; restarting");
                let monitor = handle.stop()?;
                self.spawn(monitor)
            }
            ShellState::Gone => Err(anyhow!("monitor is no longer available")),
        }
    }

    fn spawn(&mut self, monitor: Monitor) -> Result<ShellResponse> {
        let interval = monitor.settings().check_interval();
        self.state = ShellState::Running(MonitorHandle::spawn(monitor, interval)?);
        Ok(ShellResponse::Started)
    }

    /// The loop interval is fixed at spawn, so a running monitor is restarted.
    fn reload_settings(&mut self) -> Result<ShellResponse> {
        let settings = self.settings.load_or_default();
        let was_running = matches!(self.state, ShellState::Running(_));
        if was_running {
            self.stop()?;
        }
        match &mut self.state {
            ShellState::Idle(monitor) => monitor.apply_settings(settings.clone()),
            _ => return Err(anyhow!("monitor is no longer available")),
        }
        if was_running {
            self.start()?;
        }
        log::info!(
            "settings reloaded from {}: interval {}s, sensitivity {:.2}",
            self.settings.path().display(),
            settings.check_interval_secs(),
            settings.posture_sensitivity()
        );
        Ok(ShellResponse::SettingsApplied(settings))
    }

    fn stop(&mut self) -> Result<ShellResponse> {
        match std::mem::replace(&mut self.state, ShellState::Gone) {
            ShellState::Running(handle) => {
                self.state = ShellState::Idle(handle.stop()?);
                Ok(ShellResponse::Stopped)
            }
            ShellState::Idle(monitor) => {
                self.state = ShellState::Idle(monitor);
                Ok(ShellResponse::AlreadyStopped)
            }
            ShellState::Gone => Err(anyhow!("monitor is no longer available")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraSettings;
    use crate::detect::{ScriptedBackend, StubBackend};
    use crate::keypoint::{BodyPart, DetectedKeypoint};
    use crate::notify::RecordingNotifier;
    use crate::storage::SqliteStatisticsStore;
    use tempfile::TempDir;

    const T0: u64 = 1_700_049_600;

    fn camera() -> CameraSource {
        CameraSource::new(CameraSettings {
            device: "stub://monitor".to_string(),
            width: 64,
            height: 48,
        })
        .unwrap()
    }

    fn monitor(
        detector: Box<dyn KeypointDetector>,
        notifier: RecordingNotifier,
        policy: NoDetectionPolicy,
    ) -> Monitor {
        let store = SqliteStatisticsStore::open(":memory:").unwrap();
        Monitor::new(
            camera(),
            detector,
            Box::new(store),
            Box::new(notifier),
            Settings::default(),
        )
        .with_policy(policy)
    }

    fn upright_keypoints() -> Vec<DetectedKeypoint> {
        let kp = |part: BodyPart, x: f32, y: f32| DetectedKeypoint {
            index: part.index(),
            x,
            y,
            confidence: 0.9,
        };
        vec![
            kp(BodyPart::Nose, 32.0, 10.0),
            kp(BodyPart::Neck, 32.0, 17.0),
            kp(BodyPart::RightShoulder, 24.0, 18.0),
            kp(BodyPart::LeftShoulder, 40.0, 18.0),
            kp(BodyPart::MidHip, 32.0, 40.0),
        ]
    }

    /// Fails the first `failures` deliveries, then records like `RecordingNotifier`.
    struct FlakyNotifier {
        failures: usize,
        inner: RecordingNotifier,
    }

    impl Notifier for FlakyNotifier {
        fn notify(&mut self, title: &str, message: &str) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(anyhow!("notification daemon unavailable"));
            }
            self.inner.notify(title, message)
        }
    }

    struct PanickingDetector;

    impl KeypointDetector for PanickingDetector {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<DetectedKeypoint>> {
            panic!("detector crashed");
        }
    }

    fn idle_shell(detector: Box<dyn KeypointDetector>, settings_path: &std::path::Path) -> Result<Shell> {
        let uri = crate::shared_memory_uri();
        let store = SqliteStatisticsStore::open(&uri)?;
        let reader = SqliteStatisticsStore::open(&uri)?;
        let mut settings = Settings::default();
        settings.notifications_enabled = false;
        let monitor = Monitor::new(
            camera(),
            detector,
            Box::new(store),
            Box::new(RecordingNotifier::default()),
            settings,
        );
        Ok(Shell::new(
            monitor,
            Box::new(reader),
            SettingsStore::new(settings_path),
        ))
    }

    #[test]
    fn policy_parses_from_env_values() -> Result<()> {
        assert_eq!("assume-good".parse::<NoDetectionPolicy>()?, NoDetectionPolicy::AssumeGood);
        assert_eq!(" Strict ".parse::<NoDetectionPolicy>()?, NoDetectionPolicy::Strict);
        assert_eq!("skip".parse::<NoDetectionPolicy>()?, NoDetectionPolicy::Skip);
        assert!("maybe".parse::<NoDetectionPolicy>().is_err());
        Ok(())
    }

    #[test]
    fn slouching_samples_record_bad_time_and_alert_once() {
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(
            Box::new(StubBackend::slouching()),
            notifier.clone(),
            NoDetectionPolicy::AssumeGood,
        );

        let first = monitor.sample(T0);
        assert_eq!(first.is_good_posture, Some(false));
        assert!(first.event.is_none());
        assert!(first.notified);

        let second = monitor.sample(T0 + 30);
        assert_eq!(
            second.event,
            Some(PostureEvent {
                is_good_posture: false,
                duration_secs: 30
            })
        );
        assert!(!second.notified);
        assert_eq!(notifier.sent().len(), 1);

        let stats = monitor.statistics(T0 + 30).unwrap();
        assert_eq!(stats.total_checks, 1);
        assert_eq!(stats.good_posture_count, 0);
        assert_eq!(monitor.history().len(), 2);
    }

    #[test]
    fn detector_failure_follows_policy() {
        let script = || {
            ScriptedBackend::new()
                .then_detect(upright_keypoints())
                .then_fail()
        };

        let mut assume_good = monitor(
            Box::new(script()),
            RecordingNotifier::default(),
            NoDetectionPolicy::AssumeGood,
        );
        assume_good.sample(T0);
        let outcome = assume_good.sample(T0 + 30);
        assert!(outcome.verdict.is_none());
        assert_eq!(outcome.is_good_posture, Some(true));
        assert_eq!(outcome.event.map(|e| e.is_good_posture), Some(true));

        let mut skip = monitor(
            Box::new(script()),
            RecordingNotifier::default(),
            NoDetectionPolicy::Skip,
        );
        skip.sample(T0);
        assert!(skip.sample(T0 + 30).is_skipped());
        assert_eq!(skip.history().len(), 1);

        let notifier = RecordingNotifier::default();
        let mut strict = monitor(Box::new(script()), notifier.clone(), NoDetectionPolicy::Strict);
        strict.sample(T0);
        let outcome = strict.sample(T0 + 30);
        assert_eq!(outcome.verdict.map(|v| v.score()), Some(0.0));
        assert_eq!(outcome.is_good_posture, Some(false));
        assert!(outcome.notified);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn disabled_notifications_are_not_sent() {
        let notifier = RecordingNotifier::default();
        let mut monitor = monitor(
            Box::new(StubBackend::slouching()),
            notifier.clone(),
            NoDetectionPolicy::AssumeGood,
        );
        let mut settings = Settings::default();
        settings.notifications_enabled = false;
        monitor.apply_settings(settings);

        assert!(!monitor.sample(T0).notified);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn failed_delivery_does_not_start_the_cooldown() {
        let observer = RecordingNotifier::default();
        let notifier = FlakyNotifier {
            failures: 1,
            inner: observer.clone(),
        };
        let store = SqliteStatisticsStore::open(":memory:").unwrap();
        let mut monitor = Monitor::new(
            camera(),
            Box::new(StubBackend::slouching()),
            Box::new(store),
            Box::new(notifier),
            Settings::default(),
        );

        assert!(!monitor.sample(T0).notified);
        assert!(monitor.sample(T0 + 30).notified);
        assert!(!monitor.sample(T0 + 60).notified);
        assert_eq!(observer.sent().len(), 1);
    }

    #[test]
    fn shell_toggles_background_loop() -> Result<()> {
        let dir = TempDir::new()?;
        let mut shell = idle_shell(
            Box::new(StubBackend::upright()),
            &dir.path().join("settings.json"),
        )?;
        assert_eq!(shell.dispatch(MonitorCommand::Stop, T0)?, ShellResponse::AlreadyStopped);
        assert_eq!(shell.dispatch(MonitorCommand::Toggle, T0)?, ShellResponse::Started);
        assert!(shell.is_running());
        assert_eq!(shell.dispatch(MonitorCommand::Start, T0)?, ShellResponse::AlreadyRunning);
        assert_eq!(shell.dispatch(MonitorCommand::Toggle, T0)?, ShellResponse::Stopped);
        assert!(!shell.is_running());
        assert!(matches!(
            shell.dispatch(MonitorCommand::ShowStatistics, T0)?,
            ShellResponse::Statistics(_)
        ));
        assert_eq!(shell.dispatch(MonitorCommand::Exit, T0)?, ShellResponse::Exiting);
        Ok(())
    }

    #[test]
    fn reloading_settings_applies_them_idle_and_running() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("settings.json");
        let mut shell = idle_shell(Box::new(StubBackend::upright()), &path)?;
        let store = SettingsStore::new(&path);

        let mut edited = Settings::default();
        edited.set_check_interval_secs(60);
        edited.notifications_enabled = false;
        store.save(&edited)?;
        assert_eq!(
            shell.dispatch(MonitorCommand::ReloadSettings, T0)?,
            ShellResponse::SettingsApplied(edited.clone())
        );
        assert!(!shell.is_running());

        shell.dispatch(MonitorCommand::Start, T0)?;
        edited.set_posture_sensitivity(0.9);
        store.save(&edited)?;
        assert_eq!(
            shell.dispatch(MonitorCommand::ReloadSettings, T0)?,
            ShellResponse::SettingsApplied(edited)
        );
        assert!(shell.is_running());
        assert_eq!(shell.dispatch(MonitorCommand::Exit, T0)?, ShellResponse::Exiting);
        Ok(())
    }

    #[test]
    fn start_reports_a_crashed_monitor_thread() -> Result<()> {
        let dir = TempDir::new()?;
        let mut shell = idle_shell(Box::new(PanickingDetector), &dir.path().join("settings.json"))?;
        assert_eq!(shell.dispatch(MonitorCommand::Start, T0)?, ShellResponse::Started);

        let deadline = Instant::now() + Duration::from_secs(5);
        while shell.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!shell.is_running());

        let err = shell.dispatch(MonitorCommand::Start, T0).unwrap_err();
        assert!(err.to_string().contains("panicked"));
        Ok(())
    }

    #[test]
    fn commands_parse() -> Result<()> {
        assert_eq!("stats".parse::<MonitorCommand>()?, MonitorCommand::ShowStatistics);
        assert_eq!("QUIT".parse::<MonitorCommand>()?, MonitorCommand::Exit);
        assert_eq!("reload".parse::<MonitorCommand>()?, MonitorCommand::ReloadSettings);
        assert!("pause".parse::<MonitorCommand>().is_err());
        Ok(())
    }
}
