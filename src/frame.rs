//! Raw camera frames.
//!
//! Webcam pixels never leave the process: a `RawFrame` has no byte accessor and no
//! `Clone`. The only consumer of the pixel data is a `KeypointDetector`, reached
//! through `RawFrame::run_detector`. Pixels are zeroized when the frame drops.

use anyhow::{anyhow, Result};
use zeroize::Zeroize;

use crate::detect::KeypointDetector;
use crate::keypoint::KeypointFrame;

/// Opaque raw frame. Bytes are private.
pub struct RawFrame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture time, seconds since epoch.
    pub captured_at_s: u64,
}

// Explicitly NOT implementing Clone or AsRef<[u8]>.

impl RawFrame {
    /// Called only by the ingestion layer.
    pub(crate) fn new(data: Vec<u8>, width: u32, height: u32, captured_at_s: u64) -> Self {
        Self {
            data,
            width,
            height,
            captured_at_s,
        }
    }

    /// Run a detector over this frame and slot its output.
    pub fn run_detector(&self, detector: &mut dyn KeypointDetector) -> Result<KeypointFrame> {
        if self.data.is_empty() {
            return Err(anyhow!("frame has no pixel data"));
        }
        let detections = detector.detect(&self.data, self.width, self.height)?;
        log::debug!(
            "{} produced {} keypoints for {}x{} frame",
            detector.name(),
            detections.len(),
            self.width,
            self.height
        );
        Ok(KeypointFrame::from_detections(detections))
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.data.len()
    }
}

impl Drop for RawFrame {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}
