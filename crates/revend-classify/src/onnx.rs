use crate::{ClassifyError, Detection, Detector};
use ndarray::Array4;
use ort::{inputs, session::Session, value::TensorRef};
use revend_base::Tensor;
use std::path::Path;

const NUM_DETECTIONS: &str = "num_detections";
const DETECTION_CLASSES: &str = "detection_classes";
const DETECTION_SCORES: &str = "detection_scores";

/// SSD-style detector exported from the TensorFlow object detection API.
///
/// Expects a single `uint8` input of shape `[1, height, width, 3]` and the
/// standard `num_detections`, `detection_classes` and `detection_scores`
/// outputs (all `float32`, batch-major).
pub struct OnnxDetector {
    session: Session,
    input_name: String,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("input_name", &self.input_name)
            .finish()
    }
}

impl OnnxDetector {
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = model_path.as_ref();
        let session = Session::builder()
            .map_err(|e| ClassifyError::Backend(format!("failed to create session builder: {e}")))?
            .commit_from_file(path)
            .map_err(|e| {
                ClassifyError::Backend(format!("failed to load model {}: {e}", path.display()))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| ClassifyError::Shape("model has no inputs".to_string()))?;

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();
        for required in [NUM_DETECTIONS, DETECTION_CLASSES, DETECTION_SCORES] {
            if !output_names.iter().any(|name| name == required) {
                return Err(ClassifyError::Shape(format!(
                    "model output '{required}' missing (have {output_names:?})"
                )));
            }
        }

        log::info!("loaded detector {} (input '{}')", path.display(), input_name);
        Ok(Self {
            session,
            input_name,
        })
    }
}

impl Detector for OnnxDetector {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        let (h, w, c) = frame.hwc()?;
        if c != 3 {
            return Err(ClassifyError::Shape(format!("expected 3 channels, got {c}")));
        }

        let batch = Array4::from_shape_vec((1, h, w, c), frame.data.clone())
            .map_err(|e| ClassifyError::Shape(e.to_string()))?;
        let input = TensorRef::from_array_view(batch.view())
            .map_err(|e| ClassifyError::Backend(format!("failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(inputs![self.input_name.as_str() => input])
            .map_err(|e| ClassifyError::Backend(format!("inference failed: {e}")))?;

        let extract = |name: &str| -> Result<Vec<f32>, ClassifyError> {
            outputs[name]
                .try_extract_array::<f32>()
                .map(|array| array.iter().copied().collect())
                .map_err(|e| ClassifyError::Backend(format!("output '{name}' is not f32: {e}")))
        };

        let count = extract(NUM_DETECTIONS)?
            .first()
            .map(|&n| n.max(0.0) as usize)
            .unwrap_or(0);
        let classes = extract(DETECTION_CLASSES)?;
        let scores = extract(DETECTION_SCORES)?;

        Ok(classes
            .iter()
            .zip(scores.iter())
            .take(count)
            .map(|(&class_id, &score)| Detection {
                class_id: class_id as i64,
                score,
            })
            .collect())
    }
}
