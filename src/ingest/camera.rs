use anyhow::Result;

use crate::config::CameraSettings;
use crate::frame::RawFrame;

#[cfg(feature = "ingest-v4l2")]
use super::device::DeviceCamera;

/// Webcam frame source.
///
/// `stub://` devices produce synthetic frames; anything else is opened as a V4L2
/// device node when the `ingest-v4l2` feature is enabled.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCamera),
    #[cfg(feature = "ingest-v4l2")]
    Device(DeviceCamera),
}

/// Capture statistics for a camera.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub device: String,
}

impl CameraSource {
    pub fn new(settings: CameraSettings) -> Result<Self> {
        if settings.device.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCamera::new(settings)),
            });
        }
        Self::open_device(settings)
    }

    #[cfg(feature = "ingest-v4l2")]
    fn open_device(settings: CameraSettings) -> Result<Self> {
        Ok(Self {
            backend: CameraBackend::Device(DeviceCamera::new(settings)),
        })
    }

    #[cfg(not(feature = "ingest-v4l2"))]
    fn open_device(settings: CameraSettings) -> Result<Self> {
        Err(anyhow::anyhow!(
            "camera {} requires the ingest-v4l2 feature",
            settings.device
        ))
    }

    /// Open the camera. Must be called before `next_frame`.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.connect(),
        }
    }

    /// Capture the next frame as tightly packed RGB.
    pub fn next_frame(&mut self) -> Result<RawFrame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.next_frame(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.is_healthy(),
        }
    }

    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.stats(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic camera (stub://)
// ----------------------------------------------------------------------------

struct SyntheticCamera {
    settings: CameraSettings,
    connected: bool,
    frame_count: u64,
}

impl SyntheticCamera {
    fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            connected: false,
            frame_count: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        log::info!("CameraSource: connected to {} (synthetic)", self.settings.device);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RawFrame> {
        if !self.connected {
            return Err(anyhow::anyhow!(
                "camera {} not connected",
                self.settings.device
            ));
        }
        self.frame_count += 1;
        let captured_at_s = crate::now_s()?;
        Ok(RawFrame::new(
            self.generate_pixels(),
            self.settings.width,
            self.settings.height,
            captured_at_s,
        ))
    }

    /// Flat grey gradient that shifts slightly each frame.
    fn generate_pixels(&self) -> Vec<u8> {
        let len = self.settings.width as usize * self.settings.height as usize * 3;
        (0..len)
            .map(|i| ((i as u64 / 3 + self.frame_count) % 256) as u8)
            .collect()
    }

    fn is_healthy(&self) -> bool {
        self.connected
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.settings.device.clone(),
        }
    }
}
