use crate::{ClassifyError, Detection, Detector};
use revend_base::Tensor;
use std::sync::{Arc, Mutex};

/// COCO label-map id for "bottle".
pub const DEFAULT_TARGET_CLASS: i64 = 44;
pub const DEFAULT_MIN_SCORE: f32 = 0.3;

/// Reduces a detector's output to "is the target object in this frame".
///
/// Inference runs on tokio's blocking pool so a slow model never stalls the
/// runtime thread driving the session.
#[derive(Debug)]
pub struct Classifier<D> {
    detector: Arc<Mutex<D>>,
    target_class_id: i64,
    min_score: f32,
}

impl<D: Detector + Send + 'static> Classifier<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector: Arc::new(Mutex::new(detector)),
            target_class_id: DEFAULT_TARGET_CLASS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub fn with_target_class(mut self, class_id: i64) -> Self {
        self.target_class_id = class_id;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn target_class_id(&self) -> i64 {
        self.target_class_id
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    pub fn detector(&self) -> &Arc<Mutex<D>> {
        &self.detector
    }

    /// Run the detector once and report whether the target class is present.
    ///
    /// Must be called inside a tokio runtime. A panic inside the detector is
    /// reported as `ClassifyError::Backend`.
    pub async fn classify(&self, frame: Arc<Tensor<u8>>) -> Result<bool, ClassifyError> {
        let detector = Arc::clone(&self.detector);

        let detections = tokio::task::spawn_blocking(move || {
            let mut detector = detector
                .lock()
                .map_err(|_| ClassifyError::Backend("detector lock poisoned".to_string()))?;
            detector.detect(&frame)
        })
        .await
        .map_err(|e| ClassifyError::Backend(format!("inference task failed: {e}")))??;

        let found = contains_target(&detections, self.target_class_id, self.min_score);
        log::debug!(
            "{} detections, target {} {}",
            detections.len(),
            self.target_class_id,
            if found { "present" } else { "absent" }
        );
        Ok(found)
    }
}

/// True iff some detection scoring at least `min_score` has class `target_class_id`.
pub fn contains_target(detections: &[Detection], target_class_id: i64, min_score: f32) -> bool {
    detections
        .iter()
        .filter(|d| d.score >= min_score)
        .any(|d| d.class_id == target_class_id)
}
