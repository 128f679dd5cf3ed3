//! V4L2 webcam capture.
//!
//! Frames are captured into memory-mapped buffers and converted to RGB before they
//! leave this module. Buffers are never written to disk or retained.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};

use super::camera::CameraStats;
use super::pixel::{to_rgb, PixelFormat};
use crate::config::CameraSettings;
use crate::frame::RawFrame;

/// A camera with no frame for this long is reported unhealthy.
const HEALTH_GRACE: Duration = Duration::from_secs(10);

pub(crate) struct DeviceCamera {
    settings: CameraSettings,
    state: Option<DeviceState>,
    format: PixelFormat,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
    active_width: u32,
    active_height: u32,
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl DeviceCamera {
    pub(crate) fn new(settings: CameraSettings) -> Self {
        Self {
            active_width: settings.width,
            active_height: settings.height,
            settings,
            state: None,
            format: PixelFormat::Rgb24,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
        }
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let device = v4l::Device::with_path(&self.settings.device)
            .with_context(|| format!("open camera {}", self.settings.device))?;
        let mut format = device.format().context("read camera format")?;
        format.width = self.settings.width;
        format.height = self.settings.height;
        format.fourcc = v4l::FourCC::new(b"YUYV");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "CameraSource: failed to set format on {}: {}",
                    self.settings.device,
                    err
                );
                device
                    .format()
                    .context("read camera format after set failure")?
            }
        };

        self.format = PixelFormat::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            anyhow!(
                "camera {} negotiated unsupported format {}",
                self.settings.device,
                format.fourcc
            )
        })?;
        self.active_width = format.width;
        self.active_height = format.height;
        self.last_error = None;

        let state = DeviceStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create camera buffer stream"))
            },
        }
        .try_build()
        .map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;
        self.state = Some(state);

        log::info!(
            "CameraSource: connected to {} ({}x{} {:?})",
            self.settings.device,
            self.active_width,
            self.active_height,
            self.format
        );
        Ok(())
    }

    pub(crate) fn next_frame(&mut self) -> Result<RawFrame> {
        use v4l::io::traits::CaptureStream;

        let (width, height, format) = (self.active_width, self.active_height, self.format);
        let state = self.state.as_mut().context("camera not connected")?;
        let captured = state.with_mut(|fields| {
            fields
                .stream
                .next()
                .map_err(|err| anyhow::Error::new(err).context("capture camera frame"))
                .and_then(|(buf, _meta)| to_rgb(buf, width, height, format))
        });
        let pixels = captured.map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());
        self.last_error = None;

        Ok(RawFrame::new(pixels, width, height, crate::now_s()?))
    }

    pub(crate) fn is_healthy(&self) -> bool {
        if self.state.is_none() || self.last_error.is_some() {
            return false;
        }
        match self.last_frame_at {
            Some(at) => at.elapsed() <= HEALTH_GRACE,
            None => true,
        }
    }

    pub(crate) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.settings.device.clone(),
        }
    }
}
