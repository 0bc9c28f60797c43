use crate::ClassifyError;
use revend_base::Tensor;

/// One object proposal from a detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: i64,
    pub score: f32,
}

/// Object detector over a single RGB frame.
///
/// Implementations return only the valid detections (the first
/// `num_detections` rows of the model output), unfiltered by score.
/// `Classifier` calls `detect` on tokio's blocking pool, so it may block.
pub trait Detector {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        (**self).detect(frame)
    }
}
