pub mod classifier;
pub mod detection;
pub mod error;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{Classifier, DEFAULT_MIN_SCORE, DEFAULT_TARGET_CLASS};
pub use detection::{Detection, Detector};
pub use error::ClassifyError;

#[cfg(feature = "onnx")]
pub use onnx::OnnxDetector;
