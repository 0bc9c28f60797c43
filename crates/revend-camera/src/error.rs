use std::fmt;

/// Reasons a frame could not be produced.
///
/// None of these are fatal to the session worker: a failed read just skips
/// that loop iteration.
#[derive(Debug)]
pub enum CameraError {
    Device(String),
    Stream(String),
    Channel(String),
    Decode(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Device(msg) => write!(f, "camera device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "camera stream error: {msg}"),
            CameraError::Channel(msg) => write!(f, "camera channel error: {msg}"),
            CameraError::Decode(msg) => write!(f, "frame decode error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Device(err.to_string())
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::Decode(err.to_string())
    }
}

impl From<revend_base::TensorError> for CameraError {
    fn from(err: revend_base::TensorError) -> Self {
        CameraError::Stream(err.to_string())
    }
}
