use anyhow::Result;

use crate::keypoint::DetectedKeypoint;

/// Detector backend trait.
///
/// Implementations treat the pixel slice as read-only and ephemeral: they must not
/// keep it beyond the `detect` call, write it to disk or send it anywhere.
/// Keypoint indices follow the BODY_25 layout; coordinates are frame pixels.
pub trait KeypointDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run the pose model on one RGB frame.
    ///
    /// An empty result means nobody was detected; it is not an error.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<DetectedKeypoint>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
