//! Webcam frame ingestion.
//!
//! - Synthetic camera (`stub://...`) for dry runs and tests
//! - USB/V4L2 webcams (feature: ingest-v4l2)
//!
//! Sources produce `RawFrame` instances that are handed straight to a detector.
//! The ingestion layer MUST NOT:
//! - Store raw frames to disk
//! - Transmit raw frames over network
//! - Log raw frame content

mod camera;
#[cfg(feature = "ingest-v4l2")]
mod device;
#[cfg(feature = "ingest-v4l2")]
mod pixel;

pub use camera::{CameraSource, CameraStats};
