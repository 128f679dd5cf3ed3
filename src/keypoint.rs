//! Fixed-slot keypoint frames.
//!
//! Keypoints are identified by position in the OpenPose BODY_25 layout, never by
//! name. A `KeypointFrame` always holds exactly `KEYPOINT_COUNT` slots; a slot is
//! either a detected landmark or empty. Indexing by `BodyPart` therefore never needs
//! a bounds check, only a confidence check.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of slots in the BODY_25 layout.
pub const KEYPOINT_COUNT: usize = 25;

/// Anatomical landmarks of the BODY_25 layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    Neck = 1,
    RightShoulder = 2,
    RightElbow = 3,
    RightWrist = 4,
    LeftShoulder = 5,
    LeftElbow = 6,
    LeftWrist = 7,
    MidHip = 8,
    RightHip = 9,
    RightKnee = 10,
    RightAnkle = 11,
    LeftHip = 12,
    LeftKnee = 13,
    LeftAnkle = 14,
    RightEye = 15,
    LeftEye = 16,
    RightEar = 17,
    LeftEar = 18,
    LeftBigToe = 19,
    LeftSmallToe = 20,
    LeftHeel = 21,
    RightBigToe = 22,
    RightSmallToe = 23,
    RightHeel = 24,
}

impl BodyPart {
    /// The head landmark used by the neck check.
    pub const HEAD: BodyPart = BodyPart::Nose;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One detected landmark in frame pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// Raw detector output for a single landmark, before slotting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectedKeypoint {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// All keypoints detected in one camera frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeypointFrame {
    slots: [Option<Keypoint>; KEYPOINT_COUNT],
}

impl KeypointFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Slot detector output into a frame.
    ///
    /// Indices outside the layout are dropped. Confidence is clamped to `[0, 1]`.
    /// Landmarks with non-finite coordinates leave their slot empty.
    pub fn from_detections<I>(detections: I) -> Self
    where
        I: IntoIterator<Item = DetectedKeypoint>,
    {
        let mut frame = Self::empty();
        for det in detections {
            if det.index >= KEYPOINT_COUNT {
                log::debug!("dropping keypoint with out-of-layout index {}", det.index);
                continue;
            }
            if !det.x.is_finite() || !det.y.is_finite() {
                log::debug!("dropping keypoint {} with non-finite position", det.index);
                frame.slots[det.index] = None;
                continue;
            }
            let confidence = if det.confidence.is_nan() {
                0.0
            } else {
                det.confidence.clamp(0.0, 1.0)
            };
            frame.slots[det.index] = Some(Keypoint::new(det.x, det.y, confidence));
        }
        frame
    }

    pub fn set(&mut self, part: BodyPart, keypoint: Keypoint) {
        self.slots[part.index()] = Some(keypoint);
    }

    pub fn clear(&mut self, part: BodyPart) {
        self.slots[part.index()] = None;
    }

    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        self.slots[part.index()].as_ref()
    }

    /// Returns the keypoint only when it is present and meets `threshold`.
    pub fn usable(&self, part: BodyPart, threshold: f32) -> Option<&Keypoint> {
        self.get(part).filter(|kp| kp.confidence >= threshold)
    }

    pub fn usable_count(&self, threshold: f32) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|kp| kp.confidence >= threshold)
            .count()
    }

    pub fn slots(&self) -> &[Option<Keypoint>; KEYPOINT_COUNT] {
        &self.slots
    }
}

impl Serialize for KeypointFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeypointFrame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slots: Vec<Option<Keypoint>> = Vec::deserialize(deserializer)?;
        if slots.len() != KEYPOINT_COUNT {
            return Err(D::Error::custom(format!(
                "keypoint frame must have {} slots, got {}",
                KEYPOINT_COUNT,
                slots.len()
            )));
        }
        let mut frame = Self::empty();
        for (index, slot) in slots.into_iter().enumerate() {
            frame.slots[index] = slot;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_detections_drops_out_of_layout_indices() {
        let frame = KeypointFrame::from_detections([
            DetectedKeypoint {
                index: 1,
                x: 10.0,
                y: 20.0,
                confidence: 0.9,
            },
            DetectedKeypoint {
                index: KEYPOINT_COUNT,
                x: 1.0,
                y: 1.0,
                confidence: 0.9,
            },
        ]);
        assert_eq!(frame.get(BodyPart::Neck), Some(&Keypoint::new(10.0, 20.0, 0.9)));
        assert_eq!(frame.usable_count(0.0), 1);
    }

    #[test]
    fn from_detections_clamps_confidence_and_rejects_nan_positions() {
        let frame = KeypointFrame::from_detections([
            DetectedKeypoint {
                index: 0,
                x: 1.0,
                y: 2.0,
                confidence: 1.7,
            },
            DetectedKeypoint {
                index: 2,
                x: f32::NAN,
                y: 2.0,
                confidence: 0.9,
            },
            DetectedKeypoint {
                index: 5,
                x: 3.0,
                y: 4.0,
                confidence: f32::NAN,
            },
        ]);
        assert_eq!(frame.get(BodyPart::Nose).unwrap().confidence, 1.0);
        assert!(frame.get(BodyPart::RightShoulder).is_none());
        assert_eq!(frame.get(BodyPart::LeftShoulder).unwrap().confidence, 0.0);
    }

    #[test]
    fn usable_respects_threshold_inclusively() {
        let mut frame = KeypointFrame::empty();
        frame.set(BodyPart::Neck, Keypoint::new(0.0, 0.0, 0.5));
        assert!(frame.usable(BodyPart::Neck, 0.5).is_some());
        assert!(frame.usable(BodyPart::Neck, 0.51).is_none());
        assert!(frame.usable(BodyPart::MidHip, 0.0).is_none());
    }

    #[test]
    fn frame_json_requires_full_layout() {
        let mut frame = KeypointFrame::empty();
        frame.set(BodyPart::MidHip, Keypoint::new(5.0, 6.0, 0.8));
        let json = serde_json::to_string(&frame).unwrap();
        let parsed: KeypointFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);

        assert!(serde_json::from_str::<KeypointFrame>("[null, null]").is_err());
    }
}
