use anyhow::{anyhow, Result};
use std::collections::VecDeque;

use crate::detect::backend::KeypointDetector;
use crate::keypoint::DetectedKeypoint;

/// Replays a fixed sequence of detector outputs, one per `detect` call.
///
/// `None` entries simulate a detector failure. Once the script is exhausted every
/// call returns an empty detection.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBackend {
    script: VecDeque<Option<Vec<DetectedKeypoint>>>,
    calls: u64,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_detect(mut self, keypoints: Vec<DetectedKeypoint>) -> Self {
        self.script.push_back(Some(keypoints));
        self
    }

    pub fn then_fail(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl KeypointDetector for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<DetectedKeypoint>> {
        self.calls += 1;
        match self.script.pop_front() {
            Some(Some(keypoints)) => Ok(keypoints),
            Some(None) => Err(anyhow!("scripted detector failure (call {})", self.calls)),
            None => Ok(Vec::new()),
        }
    }
}
