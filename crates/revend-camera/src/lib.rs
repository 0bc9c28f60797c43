//! Frame sources for the deposit camera.
//!
//! The session worker only sees the `FrameSource` trait; the V4L2 backend is
//! compiled in with the `v4l2` feature.

pub mod config;
pub mod convert;
pub mod error;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::CameraConfig;
pub use error::CameraError;
pub use traits::FrameSource;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
