//! Keypoint detector backends.
//!
//! The pose model is an opaque oracle: pixels in, `(index, x, y, confidence)` out.
//! Backends are selected at startup; the scorer never sees them.

mod backend;
mod backends;

pub use backend::KeypointDetector;
pub use backends::{ScriptedBackend, StubBackend};

#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
