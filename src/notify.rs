//! Posture alerts.
//!
//! Delivery is fire-and-forget: a notifier error is logged by the caller and never
//! interrupts sampling.

use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ALERT_TITLE: &str = "Posture Check";
pub const ALERT_MESSAGE: &str = "Please correct your posture!";

/// Minimum spacing between two alerts.
pub const DEFAULT_NOTIFICATION_COOLDOWN: Duration = Duration::from_secs(5 * 60);

pub trait Notifier: Send {
    fn notify(&mut self, title: &str, message: &str) -> Result<()>;
}

/// Emits alerts through the log facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, title: &str, message: &str) -> Result<()> {
        log::warn!("{}: {}", title, message);
        Ok(())
    }
}

/// Keeps every alert in memory. Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, title: &str, message: &str) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("notification record poisoned"))?
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

/// Rate limits alerts so a long slouch does not produce one per sample.
#[derive(Clone, Debug)]
pub struct NotificationGate {
    cooldown: Duration,
    last_sent_s: Option<u64>,
}

impl NotificationGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent_s: None,
        }
    }

    /// Whether an alert may be sent at `now_s`. Does not arm the cooldown.
    pub fn ready(&self, now_s: u64, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        match self.last_sent_s {
            None => true,
            Some(last) => now_s.saturating_sub(last) >= self.cooldown.as_secs() || now_s < last,
        }
    }

    /// Arm the cooldown once an alert has actually been delivered.
    pub fn mark_sent(&mut self, now_s: u64) {
        self.last_sent_s = Some(now_s);
    }
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_enforces_cooldown() {
        let mut gate = NotificationGate::new(Duration::from_secs(300));
        assert!(gate.ready(0, true));
        gate.mark_sent(0);
        assert!(!gate.ready(30, true));
        assert!(!gate.ready(299, true));
        assert!(gate.ready(300, true));
    }

    #[test]
    fn disabled_gate_never_fires() {
        let gate = NotificationGate::default();
        assert!(!gate.ready(0, false));
        assert!(gate.ready(1, true));
    }

    #[test]
    fn gate_stays_open_until_an_alert_is_delivered() {
        let mut gate = NotificationGate::new(Duration::from_secs(300));
        assert!(gate.ready(0, true));
        // delivery failed, nothing marked
        assert!(gate.ready(30, true));
        gate.mark_sent(30);
        assert!(!gate.ready(60, true));
    }

    #[test]
    fn recording_notifier_keeps_messages() -> Result<()> {
        let observer = RecordingNotifier::default();
        let mut notifier = observer.clone();
        notifier.notify(ALERT_TITLE, ALERT_MESSAGE)?;
        let sent = observer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ALERT_TITLE);
        Ok(())
    }
}
