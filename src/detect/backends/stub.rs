use anyhow::Result;
use rand::Rng;

use crate::detect::backend::KeypointDetector;
use crate::keypoint::{BodyPart, DetectedKeypoint};

/// Pixel jitter applied to every synthetic landmark.
const JITTER_PX: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pose {
    Upright,
    Slouching,
}

/// Stub backend for dry runs. Ignores pixel content and reports a synthetic
/// skeleton proportional to the frame size.
pub struct StubBackend {
    pose: Pose,
    confidence: f32,
}

impl StubBackend {
    /// A seated person with level shoulders and a straight back.
    pub fn upright() -> Self {
        Self {
            pose: Pose::Upright,
            confidence: 0.9,
        }
    }

    /// Head pushed forward, one shoulder dropped, torso leaning.
    pub fn slouching() -> Self {
        Self {
            pose: Pose::Slouching,
            confidence: 0.9,
        }
    }

    /// Fractions of (width, height) for each emitted landmark.
    fn layout(&self) -> &'static [(BodyPart, f32, f32)] {
        match self.pose {
            Pose::Upright => &[
                (BodyPart::Nose, 0.50, 0.20),
                (BodyPart::Neck, 0.50, 0.35),
                (BodyPart::RightShoulder, 0.38, 0.38),
                (BodyPart::LeftShoulder, 0.62, 0.38),
                (BodyPart::RightElbow, 0.34, 0.58),
                (BodyPart::LeftElbow, 0.66, 0.58),
                (BodyPart::MidHip, 0.50, 0.85),
                (BodyPart::RightHip, 0.44, 0.85),
                (BodyPart::LeftHip, 0.56, 0.85),
            ],
            Pose::Slouching => &[
                (BodyPart::Nose, 0.65, 0.33),
                (BodyPart::Neck, 0.50, 0.35),
                (BodyPart::RightShoulder, 0.38, 0.38),
                (BodyPart::LeftShoulder, 0.62, 0.45),
                (BodyPart::RightElbow, 0.36, 0.60),
                (BodyPart::LeftElbow, 0.64, 0.64),
                (BodyPart::MidHip, 0.75, 0.85),
                (BodyPart::RightHip, 0.69, 0.85),
                (BodyPart::LeftHip, 0.81, 0.85),
            ],
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::upright()
    }
}

impl KeypointDetector for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], width: u32, height: u32) -> Result<Vec<DetectedKeypoint>> {
        let mut rng = rand::thread_rng();
        let (w, h) = (width as f32, height as f32);
        Ok(self
            .layout()
            .iter()
            .map(|(part, fx, fy)| DetectedKeypoint {
                index: part.index(),
                x: fx * w + rng.gen_range(-JITTER_PX..=JITTER_PX),
                y: fy * h + rng.gen_range(-JITTER_PX..=JITTER_PX),
                confidence: self.confidence,
            })
            .collect())
    }
}
